//! Discrete commands gestures and shortcuts resolve to
//!
//! Commands are plain data; `apply` is the single place that turns them
//! into store mutations.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::personality::PersonalityMode;
use crate::store::{WidgetState, WidgetStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetCommand {
    /// Collapsed becomes expanded, any other state collapses
    ToggleCollapsed,
    /// Expanded collapses, any other state expands
    ToggleExpanded,
    Expand,
    Collapse,
    NextPersonality,
    PreviousPersonality,
    SelectPersonality(PersonalityMode),
    ToggleSettings,
    TogglePersonalitySelector,
    ToggleQuickActions,
    ToggleVisibility,
    Hide,
    /// Collapse an expanded widget, otherwise close open settings
    Dismiss,
    /// Flip voice listening while expanded and voice activation is on
    ToggleListening,
}

impl WidgetCommand {
    pub fn apply(self, store: &mut WidgetStore) {
        info!(command = ?self, state = ?store.state(), "Applying widget command");
        match self {
            WidgetCommand::ToggleCollapsed => {
                let next = if store.state() == WidgetState::Collapsed {
                    WidgetState::Expanded
                } else {
                    WidgetState::Collapsed
                };
                store.set_state(next);
            }
            WidgetCommand::ToggleExpanded => {
                let next = if store.state() == WidgetState::Expanded {
                    WidgetState::Collapsed
                } else {
                    WidgetState::Expanded
                };
                store.set_state(next);
            }
            WidgetCommand::Expand => store.set_state(WidgetState::Expanded),
            WidgetCommand::Collapse => store.set_state(WidgetState::Collapsed),
            WidgetCommand::NextPersonality => {
                let next = store.current_personality().next();
                store.switch_personality(next);
            }
            WidgetCommand::PreviousPersonality => {
                let prev = store.current_personality().previous();
                store.switch_personality(prev);
            }
            WidgetCommand::SelectPersonality(mode) => store.switch_personality(mode),
            WidgetCommand::ToggleSettings => store.toggle_settings(),
            WidgetCommand::TogglePersonalitySelector => store.toggle_personality_selector(),
            WidgetCommand::ToggleQuickActions => store.toggle_quick_actions(),
            WidgetCommand::ToggleVisibility => {
                let visible = store.is_visible();
                store.set_visibility(!visible);
            }
            WidgetCommand::Hide => store.set_visibility(false),
            WidgetCommand::Dismiss => {
                if store.state() == WidgetState::Expanded {
                    store.set_state(WidgetState::Collapsed);
                } else if store.show_settings() {
                    store.toggle_settings();
                }
            }
            WidgetCommand::ToggleListening => {
                if store.state() == WidgetState::Expanded && store.preferences().voice_activation {
                    store.update_voice_state(|voice| voice.is_listening = !voice.is_listening);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_collapsed_from_hover_collapses() {
        let mut store = WidgetStore::default();
        store.set_state(WidgetState::Hover);
        WidgetCommand::ToggleCollapsed.apply(&mut store);
        assert_eq!(store.state(), WidgetState::Collapsed);
        WidgetCommand::ToggleCollapsed.apply(&mut store);
        assert_eq!(store.state(), WidgetState::Expanded);
    }

    #[test]
    fn test_toggle_expanded_from_hover_expands() {
        let mut store = WidgetStore::default();
        store.set_state(WidgetState::Hover);
        WidgetCommand::ToggleExpanded.apply(&mut store);
        assert_eq!(store.state(), WidgetState::Expanded);
        WidgetCommand::ToggleExpanded.apply(&mut store);
        assert_eq!(store.state(), WidgetState::Collapsed);
    }

    #[test]
    fn test_personality_cycling() {
        let mut store = WidgetStore::default();
        WidgetCommand::NextPersonality.apply(&mut store);
        assert_eq!(store.current_personality(), PersonalityMode::Professional);
        WidgetCommand::PreviousPersonality.apply(&mut store);
        WidgetCommand::PreviousPersonality.apply(&mut store);
        assert_eq!(store.current_personality(), PersonalityMode::Creative);
    }

    #[test]
    fn test_dismiss_prefers_collapse() {
        let mut store = WidgetStore::default();
        store.set_state(WidgetState::Expanded);
        store.toggle_settings();
        WidgetCommand::Dismiss.apply(&mut store);
        assert_eq!(store.state(), WidgetState::Collapsed);
        assert!(store.show_settings());
        WidgetCommand::Dismiss.apply(&mut store);
        assert!(!store.show_settings());
    }

    #[test]
    fn test_toggle_listening_only_when_expanded() {
        let mut store = WidgetStore::default();
        WidgetCommand::ToggleListening.apply(&mut store);
        assert!(!store.voice().is_listening);
        store.set_state(WidgetState::Expanded);
        WidgetCommand::ToggleListening.apply(&mut store);
        assert!(store.voice().is_listening);
    }

    #[test]
    fn test_toggle_listening_needs_voice_activation() {
        let mut store = WidgetStore::default();
        store.set_state(WidgetState::Expanded);
        store.update_preferences(|prefs| prefs.voice_activation = false);
        WidgetCommand::ToggleListening.apply(&mut store);
        assert!(!store.voice().is_listening);
    }

    #[test]
    fn test_panel_toggles() {
        let mut store = WidgetStore::default();
        WidgetCommand::TogglePersonalitySelector.apply(&mut store);
        WidgetCommand::ToggleQuickActions.apply(&mut store);
        assert!(store.show_personality_selector());
        assert!(store.show_quick_actions());
        WidgetCommand::ToggleQuickActions.apply(&mut store);
        assert!(!store.show_quick_actions());
        assert!(!store.show_settings());
    }
}
