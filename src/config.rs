//! Engine configuration
//!
//! JSON file under the user's config dir, every field optional. Environment
//! variables override the file; values are clamped into safe ranges after
//! both are applied. The file is only ever read.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::constants::config as keys;
use crate::context::ContextSettings;
use crate::gesture::GestureSettings;
use crate::positioning::PositioningSettings;
use crate::store::Preferences;
use crate::transparency::TransparencySettings;
use crate::types::ScreenSize;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub screen: ScreenSize,
    pub preferences: Preferences,
    pub gesture: GestureSettings,
    pub transparency: TransparencySettings,
    pub positioning: PositioningSettings,
    pub context: ContextSettings,
}

impl EngineConfig {
    pub fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(keys::APP_DIR);
        path.push(keys::FILENAME);
        path
    }

    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing default file yields defaults; a missing explicit file or a
    /// file that fails to parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    info!(path = %default_path.display(), "No config file found, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides();
        config.validate_and_clamp();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|var| env::var(var).ok());
    }

    /// Apply overrides from any variable source
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = parse_var(&lookup, keys::ENV_TRANSPARENCY) {
            self.preferences.transparency_level = level;
        }
        if let Some(snap) = parse_var(&lookup, keys::ENV_SNAP_TO_EDGES) {
            self.preferences.snap_to_edges = snap;
        }
        if let Some(enabled) = parse_var(&lookup, keys::ENV_KEYBOARD_SHORTCUTS) {
            self.preferences.keyboard_shortcuts = enabled;
        }
        if let Some(width) = parse_var(&lookup, keys::ENV_SCREEN_WIDTH) {
            self.screen.width = width;
        }
        if let Some(height) = parse_var(&lookup, keys::ENV_SCREEN_HEIGHT) {
            self.screen.height = height;
        }
    }

    /// Validate and clamp config values to safe ranges
    pub fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        let level = self.preferences.transparency_level;
        if !(0.0..=1.0).contains(&level) || level.is_nan() {
            let clamped = if level.is_nan() { 1.0 } else { level.clamp(0.0, 1.0) };
            warn!(
                transparency_level = level,
                using = clamped,
                "transparency_level outside 0..=1, clamping"
            );
            self.preferences.transparency_level = clamped;
        }

        let screen = [
            ("screen.width", &mut self.screen.width),
            ("screen.height", &mut self.screen.height),
        ];
        for (name, value) in screen {
            if *value < MIN_SCREEN || value.is_nan() {
                warn!(field = name, value = *value, min = MIN_SCREEN, "screen size below minimum");
                *value = MIN_SCREEN;
            } else if *value > MAX_SCREEN {
                warn!(field = name, value = *value, max = MAX_SCREEN, "screen size too large");
                *value = MAX_SCREEN;
            }
        }

        let timers = [
            ("gesture.long_press_ms", &mut self.gesture.long_press_ms),
            ("gesture.double_tap_window_ms", &mut self.gesture.double_tap_window_ms),
            ("gesture.min_trace_ms", &mut self.gesture.min_trace_ms),
            ("transparency.animation_ms", &mut self.transparency.animation_ms),
            ("transparency.mouse_idle_ms", &mut self.transparency.mouse_idle_ms),
            ("positioning.debounce_ms", &mut self.positioning.debounce_ms),
            ("positioning.post_drag_ms", &mut self.positioning.post_drag_ms),
            ("context.user_idle_ms", &mut self.context.user_idle_ms),
            ("context.refresh_ms", &mut self.context.refresh_ms),
        ];
        for (name, value) in timers {
            if *value > MAX_TIMER_MS {
                warn!(field = name, value = *value, max = MAX_TIMER_MS, "timer exceeds maximum");
                *value = MAX_TIMER_MS;
            }
        }
        // A zero refresh interval would re-fire on every tick
        if self.context.refresh_ms == 0 {
            let fallback = ContextSettings::default().refresh_ms;
            warn!(using = fallback, "context.refresh_ms is zero, using default");
            self.context.refresh_ms = fallback;
        }

        if !(0.0..=1.0).contains(&self.transparency.hysteresis) {
            warn!(
                hysteresis = self.transparency.hysteresis,
                "hysteresis outside 0..=1, using default"
            );
            self.transparency.hysteresis = TransparencySettings::default().hysteresis;
        }

        let distances = [
            ("transparency.proximity_buffer", &mut self.transparency.proximity_buffer),
            ("positioning.edge_buffer", &mut self.positioning.edge_buffer),
            ("positioning.snap_threshold", &mut self.positioning.snap_threshold),
            ("positioning.cursor_buffer", &mut self.positioning.cursor_buffer),
            ("positioning.move_threshold", &mut self.positioning.move_threshold),
            ("positioning.night_inset", &mut self.positioning.night_inset),
            ("positioning.rehome_inset", &mut self.positioning.rehome_inset),
        ];
        for (name, value) in distances {
            if *value < 0.0 || value.is_nan() {
                warn!(field = name, value = *value, "negative distance, clamping to 0");
                *value = 0.0;
            }
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var)?;
    raw.trim()
        .parse::<T>()
        .inspect_err(|e| error!(var = %var, value = %raw, error = %e, "failed to parse env var"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"preferences": {{"snap_to_edges": false}}, "gesture": {{"long_press_ms": 800}}}}"#
        )
        .unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert!(!config.preferences.snap_to_edges);
        assert_eq!(config.preferences.transparency_level, 0.95);
        assert_eq!(config.gesture.long_press_ms, 800);
        assert_eq!(config.gesture.double_tap_window_ms, 300);
        assert_eq!(config.screen, ScreenSize::new(1920.0, 1080.0));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(EngineConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = EngineConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_overrides() {
        let mut config = EngineConfig::default();
        config.apply_overrides_from(vars(&[
            ("WIDGET_TRANSPARENCY", "0.5"),
            ("WIDGET_SNAP_TO_EDGES", "false"),
            ("WIDGET_SCREEN_WIDTH", " 1280 "),
            ("WIDGET_SCREEN_HEIGHT", "tall"),
        ]));
        assert_eq!(config.preferences.transparency_level, 0.5);
        assert!(!config.preferences.snap_to_edges);
        assert!(config.preferences.keyboard_shortcuts);
        assert_eq!(config.screen.width, 1280.0);
        // Unparseable values are ignored
        assert_eq!(config.screen.height, 1080.0);
    }

    #[test]
    fn test_validate_and_clamp() {
        let mut config = EngineConfig::default();
        config.preferences.transparency_level = 1.8;
        config.screen.width = 10.0;
        config.gesture.long_press_ms = u64::MAX;
        config.context.refresh_ms = 0;
        config.positioning.edge_buffer = -4.0;
        config.validate_and_clamp();

        assert_eq!(config.preferences.transparency_level, 1.0);
        assert_eq!(config.screen.width, 100.0);
        assert_eq!(config.gesture.long_press_ms, 3_600_000);
        assert_eq!(config.context.refresh_ms, 30_000);
        assert_eq!(config.positioning.edge_buffer, 0.0);
    }
}
