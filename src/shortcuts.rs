//! Keyboard shortcuts
//!
//! Maps a key press to a `WidgetCommand`. Shortcuts are ignored while the
//! preference is off or while focus sits in a text field.

use serde::{Deserialize, Serialize};

use crate::commands::WidgetCommand;
use crate::personality::PersonalityMode;
use crate::store::{WidgetState, WidgetStore};

/// A key press as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyEvent {
    /// Key value, e.g. `"t"`, `"Escape"`, `" "`
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    /// Focus is inside an input, textarea or select
    pub in_text_field: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    fn command_shift(&self, letter: char) -> bool {
        (self.ctrl || self.meta) && self.shift && self.key.eq_ignore_ascii_case(&letter.to_string())
    }

    fn alt_only(&self) -> bool {
        self.alt && !self.ctrl && !self.meta && !self.shift
    }
}

/// Resolve a key press against the current widget state
pub fn resolve(event: &KeyEvent, store: &WidgetStore) -> Option<WidgetCommand> {
    if !store.preferences().keyboard_shortcuts || event.in_text_field {
        return None;
    }

    if event.command_shift('t') {
        return Some(WidgetCommand::ToggleVisibility);
    }
    if event.command_shift('e') {
        return Some(WidgetCommand::ToggleExpanded);
    }
    if event.command_shift('s') {
        return Some(WidgetCommand::ToggleSettings);
    }

    if event.alt_only() {
        let digit = event.key.parse::<u32>().ok();
        if let Some(mode) = digit.and_then(PersonalityMode::from_digit) {
            return Some(WidgetCommand::SelectPersonality(mode));
        }
    }

    match event.key.as_str() {
        "Escape" => Some(WidgetCommand::Dismiss),
        " " if store.state() == WidgetState::Expanded => Some(WidgetCommand::ToggleListening),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShortcutInfo {
    pub keys: &'static [&'static str],
    pub description: &'static str,
}

/// Shortcut listing for help screens
pub fn shortcut_list() -> &'static [ShortcutInfo] {
    const LIST: &[ShortcutInfo] = &[
        ShortcutInfo {
            keys: &["Ctrl/Cmd", "Shift", "T"],
            description: "Toggle widget visibility",
        },
        ShortcutInfo {
            keys: &["Ctrl/Cmd", "Shift", "E"],
            description: "Expand/Collapse widget",
        },
        ShortcutInfo {
            keys: &["Ctrl/Cmd", "Shift", "S"],
            description: "Toggle settings",
        },
        ShortcutInfo {
            keys: &["Alt", "1-6"],
            description: "Switch personality modes",
        },
        ShortcutInfo {
            keys: &["Escape"],
            description: "Collapse widget or close settings",
        },
        ShortcutInfo {
            keys: &["Space"],
            description: "Toggle voice listening (when expanded)",
        },
    ];
    LIST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_shift_letters() {
        let store = WidgetStore::default();
        assert_eq!(
            resolve(&KeyEvent::new("T").ctrl().shift(), &store),
            Some(WidgetCommand::ToggleVisibility)
        );
        assert_eq!(
            resolve(&KeyEvent::new("e").meta().shift(), &store),
            Some(WidgetCommand::ToggleExpanded)
        );
        assert_eq!(
            resolve(&KeyEvent::new("s").ctrl().shift(), &store),
            Some(WidgetCommand::ToggleSettings)
        );
        // Shift is required
        assert_eq!(resolve(&KeyEvent::new("t").ctrl(), &store), None);
    }

    #[test]
    fn test_alt_digits_select_personality() {
        let store = WidgetStore::default();
        assert_eq!(
            resolve(&KeyEvent::new("1").alt(), &store),
            Some(WidgetCommand::SelectPersonality(PersonalityMode::Serious))
        );
        assert_eq!(
            resolve(&KeyEvent::new("6").alt(), &store),
            Some(WidgetCommand::SelectPersonality(PersonalityMode::Casual))
        );
        assert_eq!(resolve(&KeyEvent::new("7").alt(), &store), None);
        assert_eq!(resolve(&KeyEvent::new("2").alt().ctrl(), &store), None);
    }

    #[test]
    fn test_space_only_when_expanded() {
        let mut store = WidgetStore::default();
        assert_eq!(resolve(&KeyEvent::new(" "), &store), None);
        store.set_state(WidgetState::Expanded);
        assert_eq!(
            resolve(&KeyEvent::new(" "), &store),
            Some(WidgetCommand::ToggleListening)
        );
    }

    #[test]
    fn test_escape_dismisses() {
        let store = WidgetStore::default();
        assert_eq!(
            resolve(&KeyEvent::new("Escape"), &store),
            Some(WidgetCommand::Dismiss)
        );
    }

    #[test]
    fn test_ignored_in_text_field_or_when_disabled() {
        let mut store = WidgetStore::default();
        let typing = KeyEvent {
            in_text_field: true,
            ..KeyEvent::new("Escape")
        };
        assert_eq!(resolve(&typing, &store), None);

        store.update_preferences(|p| p.keyboard_shortcuts = false);
        assert_eq!(resolve(&KeyEvent::new("Escape"), &store), None);
    }

    #[test]
    fn test_shortcut_list() {
        let list = shortcut_list();
        assert_eq!(list.len(), 6);
        assert_eq!(list[0].keys, &["Ctrl/Cmd", "Shift", "T"]);
    }
}
