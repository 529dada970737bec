//! Built-in gesture library

use serde::Serialize;

use crate::commands::WidgetCommand;
use crate::constants::gesture::{CIRCLE_THRESHOLD, SWIPE_THRESHOLD, TIMING_THRESHOLD};
use crate::types::GesturePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureId {
    DoubleTap,
    SwipeRight,
    SwipeLeft,
    SwipeUp,
    SwipeDown,
    CircleClockwise,
    LongPress,
}

impl GestureId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DoubleTap => "double-tap",
            Self::SwipeRight => "swipe-right",
            Self::SwipeLeft => "swipe-left",
            Self::SwipeUp => "swipe-up",
            Self::SwipeDown => "swipe-down",
            Self::CircleClockwise => "circle-clockwise",
            Self::LongPress => "long-press",
        }
    }
}

/// A reference shape and the command it triggers
///
/// Timing-based gestures carry an empty pattern and are skipped by the
/// shape matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTemplate {
    pub id: GestureId,
    pub name: &'static str,
    pub pattern: Vec<GesturePoint>,
    pub action: WidgetCommand,
    pub threshold: f64,
}

impl GestureTemplate {
    pub fn is_shape(&self) -> bool {
        !self.pattern.is_empty()
    }
}

fn p(x: f64, y: f64, timestamp: f64) -> GesturePoint {
    GesturePoint::new(x, y, timestamp)
}

/// The fixed template set, in matching order
pub fn builtin_templates() -> Vec<GestureTemplate> {
    vec![
        GestureTemplate {
            id: GestureId::DoubleTap,
            name: "Double Tap",
            pattern: Vec::new(),
            action: WidgetCommand::ToggleCollapsed,
            threshold: TIMING_THRESHOLD,
        },
        GestureTemplate {
            id: GestureId::SwipeRight,
            name: "Swipe Right",
            pattern: vec![p(0.0, 0.0, 0.0), p(100.0, 0.0, 300.0)],
            action: WidgetCommand::NextPersonality,
            threshold: SWIPE_THRESHOLD,
        },
        GestureTemplate {
            id: GestureId::SwipeLeft,
            name: "Swipe Left",
            pattern: vec![p(100.0, 0.0, 0.0), p(0.0, 0.0, 300.0)],
            action: WidgetCommand::PreviousPersonality,
            threshold: SWIPE_THRESHOLD,
        },
        GestureTemplate {
            id: GestureId::SwipeUp,
            name: "Swipe Up",
            pattern: vec![p(0.0, 100.0, 0.0), p(0.0, 0.0, 300.0)],
            action: WidgetCommand::Expand,
            threshold: SWIPE_THRESHOLD,
        },
        GestureTemplate {
            id: GestureId::SwipeDown,
            name: "Swipe Down",
            pattern: vec![p(0.0, 0.0, 0.0), p(0.0, 100.0, 300.0)],
            action: WidgetCommand::Collapse,
            threshold: SWIPE_THRESHOLD,
        },
        GestureTemplate {
            id: GestureId::CircleClockwise,
            name: "Circle Clockwise",
            pattern: vec![
                p(0.0, 0.0, 0.0),
                p(50.0, -50.0, 200.0),
                p(100.0, 0.0, 400.0),
                p(50.0, 50.0, 600.0),
                p(0.0, 0.0, 800.0),
            ],
            action: WidgetCommand::ToggleSettings,
            threshold: CIRCLE_THRESHOLD,
        },
        GestureTemplate {
            id: GestureId::LongPress,
            name: "Long Press",
            pattern: Vec::new(),
            action: WidgetCommand::Hide,
            threshold: TIMING_THRESHOLD,
        },
    ]
}

/// Look up a template by id
pub fn find(templates: &[GestureTemplate], id: GestureId) -> Option<&GestureTemplate> {
    templates.iter().find(|t| t.id == id)
}
