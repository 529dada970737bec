//! Data held by the widget store

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, sizes};
use crate::types::{Dimensions, ScreenSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    #[default]
    Collapsed,
    Hover,
    Expanded,
    Minimized,
    Hidden,
}

impl WidgetState {
    /// Footprint the render layer gives the widget in this state
    pub fn size(self) -> Dimensions {
        match self {
            WidgetState::Collapsed => sizes::COLLAPSED.into(),
            WidgetState::Hover => sizes::HOVER.into(),
            WidgetState::Expanded => sizes::EXPANDED.into(),
            WidgetState::Minimized => sizes::MINIMIZED.into(),
            WidgetState::Hidden => sizes::HIDDEN.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceState {
    pub is_listening: bool,
    pub is_processing: bool,
    pub is_speaking: bool,
    pub volume: f64,
}

impl VoiceState {
    pub fn is_active(&self) -> bool {
        self.is_listening || self.is_processing || self.is_speaking
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    #[default]
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// 5-11 morning, 12-16 afternoon, 17-21 evening, otherwise night
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserActivity {
    #[default]
    Active,
    Idle,
    Away,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemLoad {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    #[default]
    Online,
    Offline,
    Limited,
}

/// Environmental snapshot read by the transparency and positioning engines
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WidgetContext {
    pub time_of_day: TimeOfDay,
    pub user_activity: UserActivity,
    pub system_load: SystemLoad,
    /// Fraction in [0, 1]; `None` when the host cannot report it
    pub battery_level: Option<f64>,
    pub network_status: NetworkStatus,
    pub screen: ScreenSize,
    pub multi_monitor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl AnimationSpeed {
    /// Multiplier applied to transition durations
    pub fn scale(self) -> f64 {
        match self {
            AnimationSpeed::Slow => 1.5,
            AnimationSpeed::Normal => 1.0,
            AnimationSpeed::Fast => 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Opacity of the collapsed widget and fallback when no rule applies
    pub transparency_level: f64,
    pub snap_to_edges: bool,
    pub keyboard_shortcuts: bool,
    pub animation_speed: AnimationSpeed,
    /// Space toggles listening only while this is on
    pub voice_activation: bool,
    /// Forwarded to the render surface
    pub always_on_top: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            transparency_level: defaults::TRANSPARENCY_LEVEL,
            snap_to_edges: true,
            keyboard_shortcuts: true,
            animation_speed: AnimationSpeed::Normal,
            voice_activation: true,
            always_on_top: true,
        }
    }
}
