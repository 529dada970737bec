//! Animation budget under battery and load pressure
//!
//! Low-power mode has hysteresis: it starts below 20% battery and only ends
//! above 50%, so a battery hovering around one threshold does not flap.

use serde::Serialize;
use tracing::info;

use crate::constants::performance as consts;
use crate::scheduler::Millis;
use crate::store::{AnimationSpeed, SystemLoad, WidgetStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationBudget {
    Full,
    /// Short transitions only
    Reduced,
    /// Jump straight to the target
    Off,
}

#[derive(Debug, Default)]
pub struct PerformanceGovernor {
    low_power: bool,
}

impl PerformanceGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_low_power(&self) -> bool {
        self.low_power
    }

    /// Feed a battery reading; returns whether low-power mode flipped
    ///
    /// An unknown level leaves the mode as it is.
    pub fn observe_battery(&mut self, level: Option<f64>) -> bool {
        let next = match level {
            Some(level) if level < consts::LOW_POWER_ENTER => true,
            Some(level) if level > consts::LOW_POWER_EXIT => false,
            _ => self.low_power,
        };
        if next == self.low_power {
            return false;
        }
        self.low_power = next;
        info!(low_power = next, battery = ?level, "Power saving mode changed");
        true
    }

    /// Heavy load turns animations off; medium load does too for fast animations
    pub fn budget(&self, load: SystemLoad, speed: AnimationSpeed) -> AnimationBudget {
        let load_allows = match load {
            SystemLoad::High => false,
            SystemLoad::Medium => speed != AnimationSpeed::Fast,
            SystemLoad::Low => true,
        };
        if !load_allows {
            AnimationBudget::Off
        } else if self.low_power {
            AnimationBudget::Reduced
        } else {
            AnimationBudget::Full
        }
    }

    /// Opacity transition length for the store's current context and preferences
    pub fn animation_ms(&self, base_ms: Millis, store: &WidgetStore) -> Millis {
        let speed = store.preferences().animation_speed;
        match self.budget(store.context().system_load, speed) {
            AnimationBudget::Off => 0,
            AnimationBudget::Reduced => base_ms.min(consts::LOW_POWER_ANIMATION_MS),
            AnimationBudget::Full => (base_ms as f64 * speed.scale()).round() as Millis,
        }
    }
}
