//! Transparency rules as data plus one central evaluator

use serde::{Deserialize, Serialize};

use crate::constants::transparency::{IDLE_DIM_FACTOR, LOW_BATTERY_LEVEL};
use crate::geometry::Rect;
use crate::store::{SystemLoad, TimeOfDay, UserActivity, WidgetState, WidgetStore};
use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum RuleCondition {
    StateIs { state: WidgetState },
    VoiceActive,
    ActivityIs { activity: UserActivity },
    TimeIs { time: TimeOfDay },
    PointerNear,
    SystemLoadIs { load: SystemLoad },
    /// Unknown battery never matches
    BatteryBelow { level: f64 },
    CollapsedAndPointerIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOpacity {
    Fixed(f64),
    /// Multiple of the user's transparency preference
    PreferenceScaled(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransparencyRule {
    pub name: String,
    pub condition: RuleCondition,
    pub opacity: RuleOpacity,
    pub priority: i32,
}

impl TransparencyRule {
    fn new(name: &str, condition: RuleCondition, opacity: RuleOpacity, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            condition,
            opacity,
            priority,
        }
    }

    pub fn opacity_for(&self, store: &WidgetStore) -> f64 {
        match self.opacity {
            RuleOpacity::Fixed(value) => value,
            RuleOpacity::PreferenceScaled(factor) => {
                store.preferences().transparency_level * factor
            }
        }
    }
}

/// Everything a rule condition may look at
#[derive(Debug, Clone, Copy)]
pub struct RuleInputs<'a> {
    pub store: &'a WidgetStore,
    /// Last known pointer position, `None` before the first move
    pub pointer: Option<Point>,
    pub pointer_idle: bool,
    pub proximity_buffer: f64,
}

/// The built-in rule table: interaction beats ambient context beats idle defaults
pub fn default_rules() -> Vec<TransparencyRule> {
    use RuleCondition as C;
    use RuleOpacity::{Fixed, PreferenceScaled};
    let rule = TransparencyRule::new;
    let state = |state| C::StateIs { state };
    let activity = |activity| C::ActivityIs { activity };

    vec![
        rule("expanded-state", state(WidgetState::Expanded), Fixed(1.0), 10),
        rule("hover-state", state(WidgetState::Hover), Fixed(0.95), 9),
        rule("voice-active", C::VoiceActive, Fixed(1.0), 8),
        rule("user-idle", activity(UserActivity::Idle), Fixed(0.3), 7),
        rule("user-away", activity(UserActivity::Away), Fixed(0.2), 6),
        rule("night-time", C::TimeIs { time: TimeOfDay::Night }, Fixed(0.6), 5),
        rule("mouse-proximity", C::PointerNear, Fixed(0.4), 4),
        rule("high-system-load", C::SystemLoadIs { load: SystemLoad::High }, Fixed(0.5), 3),
        rule("low-battery", C::BatteryBelow { level: LOW_BATTERY_LEVEL }, Fixed(0.4), 2),
        rule("collapsed-idle", C::CollapsedAndPointerIdle, PreferenceScaled(IDLE_DIM_FACTOR), 1),
        rule("collapsed-default", state(WidgetState::Collapsed), PreferenceScaled(1.0), 0),
    ]
}

/// Pointer within `buffer` px of the widget's bounding box (inclusive)
pub fn is_pointer_near(pointer: Option<Point>, store: &WidgetStore, buffer: f64) -> bool {
    pointer.is_some_and(|p| {
        Rect::at(store.position(), store.size())
            .inflate(buffer)
            .contains(p)
    })
}

pub fn evaluate(condition: &RuleCondition, inputs: &RuleInputs<'_>) -> bool {
    let store = inputs.store;
    let context = store.context();
    match *condition {
        RuleCondition::StateIs { state } => store.state() == state,
        RuleCondition::VoiceActive => store.voice().is_active(),
        RuleCondition::ActivityIs { activity } => context.user_activity == activity,
        RuleCondition::TimeIs { time } => context.time_of_day == time,
        RuleCondition::PointerNear => {
            is_pointer_near(inputs.pointer, store, inputs.proximity_buffer)
        }
        RuleCondition::SystemLoadIs { load } => context.system_load == load,
        RuleCondition::BatteryBelow { level } => {
            context.battery_level.is_some_and(|battery| battery < level)
        }
        RuleCondition::CollapsedAndPointerIdle => {
            store.state() == WidgetState::Collapsed && inputs.pointer_idle
        }
    }
}

/// The satisfied rule with the highest priority; ties keep the first declared
pub fn resolve<'r>(
    rules: &'r [TransparencyRule],
    inputs: &RuleInputs<'_>,
) -> Option<&'r TransparencyRule> {
    rules
        .iter()
        .filter(|rule| evaluate(&rule.condition, inputs))
        .fold(None, |best: Option<&TransparencyRule>, rule| match best {
            Some(current) if current.priority >= rule.priority => Some(current),
            _ => Some(rule),
        })
}

/// Target opacity for the current inputs
///
/// A hidden widget is always fully transparent; with no satisfied rule the
/// user's transparency preference applies.
pub fn calculate_optimal_opacity(rules: &[TransparencyRule], inputs: &RuleInputs<'_>) -> f64 {
    if !inputs.store.is_visible() {
        return 0.0;
    }
    match resolve(rules, inputs) {
        Some(rule) => rule.opacity_for(inputs.store),
        None => inputs.store.preferences().transparency_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn inputs(store: &WidgetStore) -> RuleInputs<'_> {
        RuleInputs {
            store,
            pointer: None,
            pointer_idle: false,
            proximity_buffer: 100.0,
        }
    }

    fn collapsed() -> RuleCondition {
        RuleCondition::StateIs {
            state: WidgetState::Collapsed,
        }
    }

    #[test]
    fn test_collapsed_default_uses_preference() {
        let store = WidgetStore::default();
        let rules = default_rules();
        assert_eq!(resolve(&rules, &inputs(&store)).unwrap().name, "collapsed-default");
        assert_eq!(calculate_optimal_opacity(&rules, &inputs(&store)), 0.95);
    }

    #[test]
    fn test_expanded_beats_idle() {
        let mut store = WidgetStore::default();
        store.set_state(WidgetState::Expanded);
        store.update_context(|ctx| ctx.user_activity = UserActivity::Idle);
        let rules = default_rules();
        assert_eq!(calculate_optimal_opacity(&rules, &inputs(&store)), 1.0);
    }

    #[test]
    fn test_idle_beats_night() {
        let mut store = WidgetStore::default();
        store.update_context(|ctx| {
            ctx.user_activity = UserActivity::Idle;
            ctx.time_of_day = TimeOfDay::Night;
        });
        let rules = default_rules();
        assert_eq!(resolve(&rules, &inputs(&store)).unwrap().name, "user-idle");
        assert_eq!(calculate_optimal_opacity(&rules, &inputs(&store)), 0.3);
    }

    #[test]
    fn test_unknown_battery_does_not_apply() {
        let mut store = WidgetStore::default();
        store.set_state(WidgetState::Minimized);
        let rules = default_rules();
        assert!(resolve(&rules, &inputs(&store)).is_none());

        store.update_context(|ctx| ctx.battery_level = Some(0.1));
        assert_eq!(resolve(&rules, &inputs(&store)).unwrap().name, "low-battery");
    }

    #[test]
    fn test_no_rule_falls_back_to_preference() {
        let mut store = WidgetStore::default();
        store.set_state(WidgetState::Minimized);
        store.update_preferences(|p| p.transparency_level = 0.8);
        let rules = default_rules();
        assert_eq!(calculate_optimal_opacity(&rules, &inputs(&store)), 0.8);
    }

    #[test]
    fn test_hidden_widget_is_transparent() {
        let mut store = WidgetStore::default();
        store.set_state(WidgetState::Expanded);
        store.set_visibility(false);
        assert_eq!(calculate_optimal_opacity(&default_rules(), &inputs(&store)), 0.0);
    }

    #[test]
    fn test_pointer_proximity() {
        let mut store = WidgetStore::default();
        store.set_position(Position::new(500.0, 500.0));
        assert!(is_pointer_near(Some(Point::new(400.0, 400.0)), &store, 100.0));
        assert!(is_pointer_near(Some(Point::new(660.0, 660.0)), &store, 100.0));
        assert!(!is_pointer_near(Some(Point::new(399.0, 500.0)), &store, 100.0));
        assert!(!is_pointer_near(None, &store, 100.0));
    }

    #[test]
    fn test_collapsed_idle_dims_preference() {
        let store = WidgetStore::default();
        let rules = default_rules();
        let idle = RuleInputs {
            pointer_idle: true,
            ..inputs(&store)
        };
        let opacity = calculate_optimal_opacity(&rules, &idle);
        assert!((opacity - 0.95 * 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_priority_tie_keeps_first_declared() {
        let store = WidgetStore::default();
        let rules = vec![
            TransparencyRule::new("first", collapsed(), RuleOpacity::Fixed(0.1), 5),
            TransparencyRule::new("second", collapsed(), RuleOpacity::Fixed(0.9), 5),
        ];
        assert_eq!(resolve(&rules, &inputs(&store)).unwrap().name, "first");
    }

    #[test]
    fn test_priority_not_declaration_order() {
        let store = WidgetStore::default();
        let rules = vec![
            TransparencyRule::new("low", collapsed(), RuleOpacity::Fixed(0.1), 1),
            TransparencyRule::new("high", collapsed(), RuleOpacity::Fixed(0.9), 3),
        ];
        assert_eq!(calculate_optimal_opacity(&rules, &inputs(&store)), 0.9);
    }

    #[test]
    fn test_rules_roundtrip_through_json() {
        let rules = default_rules();
        let json = serde_json::to_string(&rules).unwrap();
        let back: Vec<TransparencyRule> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rules);
    }
}
