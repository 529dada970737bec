//! Host event vocabulary
//!
//! Everything the embedding shell reports to the widget. Events are plain
//! serde data so a recorded session can be replayed from JSON.

use serde::{Deserialize, Serialize};

use crate::commands::WidgetCommand;
use crate::positioning::DisplayInfo;
use crate::scheduler::Millis;
use crate::shortcuts::KeyEvent;
use crate::store::{NetworkStatus, Preferences, SystemLoad, VoiceState};
use crate::types::Point;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    TouchStart { x: f64, y: f64 },
    TouchMove { x: f64, y: f64 },
    TouchEnd,
    /// Pointer entered the widget container
    PointerEnter,
    /// Pointer left the widget container
    PointerLeave,
    Click,
    DragStart { x: f64, y: f64 },
    DragMove { x: f64, y: f64 },
    DragEnd,
    Key(KeyEvent),
    Resize {
        width: f64,
        height: f64,
        #[serde(default)]
        multi_monitor: bool,
    },
    /// Monitor layout; more than one entry means a multi-monitor setup
    Displays { displays: Vec<DisplayInfo> },
    Online,
    Offline,
    NetworkStatus { status: NetworkStatus },
    /// Page/tab visibility
    Visibility { visible: bool },
    Focus,
    Blur,
    Battery { level: Option<f64> },
    SystemLoad { load: SystemLoad },
    ObstacleAdded { id: String, x: f64, y: f64, width: f64, height: f64 },
    ObstacleRemoved { id: String },
    Voice(VoiceState),
    /// A UI control issued a command directly
    Command { command: WidgetCommand },
    /// Settings panel saved new preferences
    UpdatePreferences { preferences: Preferences },
    /// Time passes, nothing else
    Tick,
}

impl HostEvent {
    /// Pointer position carried by pointer and touch events
    pub fn point(&self) -> Option<Point> {
        match *self {
            HostEvent::PointerDown { x, y }
            | HostEvent::PointerMove { x, y }
            | HostEvent::TouchStart { x, y }
            | HostEvent::TouchMove { x, y }
            | HostEvent::DragStart { x, y }
            | HostEvent::DragMove { x, y } => Some(Point::new(x, y)),
            _ => None,
        }
    }

    /// Input that counts as user activity
    pub fn is_user_activity(&self) -> bool {
        matches!(
            self,
            HostEvent::PointerDown { .. }
                | HostEvent::PointerMove { .. }
                | HostEvent::TouchStart { .. }
                | HostEvent::TouchMove { .. }
                | HostEvent::Key(_)
                | HostEvent::Click
                | HostEvent::DragStart { .. }
                | HostEvent::DragMove { .. }
        )
    }
}

/// An event stamped with the host's monotonic clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at: Millis,
    #[serde(flatten)]
    pub event: HostEvent,
}
