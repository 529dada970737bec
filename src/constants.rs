//! Application-wide constants
//!
//! This module contains the magic numbers used by the behavior engines,
//! providing a single source of truth for timings, thresholds and buffers.

/// Gesture recognition constants
pub mod gesture {
    /// A press held this long (ms) fires the long-press action
    pub const LONG_PRESS_MS: u64 = 1000;

    /// Two releases closer than this (ms) count as a double tap
    pub const DOUBLE_TAP_WINDOW_MS: u64 = 300;

    /// Traces shorter than this (ms) are treated as accidental taps
    pub const MIN_TRACE_MS: u64 = 100;

    /// Traces need at least this many points before shape matching
    pub const MIN_TRACE_POINTS: usize = 2;

    /// Side of the normalization box for spatial coordinates
    pub const NORMALIZED_EXTENT: f64 = 100.0;

    /// Length of the normalization box for timestamps
    pub const NORMALIZED_DURATION: f64 = 1000.0;

    /// Threshold shared by the four swipe templates
    pub const SWIPE_THRESHOLD: f64 = 0.7;

    /// Threshold of the clockwise circle template
    pub const CIRCLE_THRESHOLD: f64 = 0.6;

    /// Nominal threshold of the timing-based templates (never used for scoring)
    pub const TIMING_THRESHOLD: f64 = 0.8;
}

/// Transparency resolution constants
pub mod transparency {
    /// Length of an opacity transition
    pub const ANIMATION_MS: u64 = 300;

    /// Targets closer than this to the current opacity do not animate
    pub const HYSTERESIS: f64 = 0.05;

    /// Pointer counts as idle after this long without movement
    pub const MOUSE_IDLE_MS: u64 = 3000;

    /// Pointer within this many pixels of the widget counts as near
    pub const PROXIMITY_BUFFER: f64 = 100.0;

    /// Battery levels below this fraction count as low
    pub const LOW_BATTERY_LEVEL: f64 = 0.2;

    /// Idle collapsed widget dims to this fraction of the preferred transparency
    pub const IDLE_DIM_FACTOR: f64 = 0.7;
}

/// Smart positioning constants
pub mod positioning {
    /// Inset kept between the widget and every screen edge
    pub const EDGE_BUFFER: f64 = 10.0;

    /// Drag releases within this distance of an edge snap onto it
    pub const SNAP_THRESHOLD: f64 = 50.0;

    /// Half-side of the square kept clear around the cursor
    pub const CURSOR_BUFFER: f64 = 100.0;

    /// Repositions shorter than this are discarded as jitter
    pub const MOVE_THRESHOLD: f64 = 20.0;

    /// Delay after the last pointer motion before re-evaluating placement
    pub const DEBOUNCE_MS: u64 = 500;

    /// Delay after a drag ends before re-evaluating placement
    pub const POST_DRAG_MS: u64 = 1000;

    /// Inset of the night-time target position from the bottom-right corner
    pub const NIGHT_INSET: f64 = 20.0;

    /// Inset from the primary display's top-right corner when re-homing
    pub const REHOME_INSET: f64 = 20.0;

    /// Priority tag of the cursor obstacle
    pub const CURSOR_PRIORITY: i32 = 1;

    /// Priority tag of host-marked obstacle elements
    pub const ELEMENT_PRIORITY: i32 = 2;
}

/// Power saving thresholds
pub mod performance {
    /// Battery fraction below which low-power mode starts
    pub const LOW_POWER_ENTER: f64 = 0.2;

    /// Battery fraction above which low-power mode ends
    pub const LOW_POWER_EXIT: f64 = 0.5;

    /// Longest opacity transition allowed in low-power mode
    pub const LOW_POWER_ANIMATION_MS: u64 = 100;
}

/// Context awareness constants
pub mod context {
    /// User counts as idle after this long without input
    pub const USER_IDLE_MS: u64 = 5 * 60 * 1000;

    /// Interval of the periodic context refresh
    pub const REFRESH_MS: u64 = 30_000;
}

/// Widget footprint per state (width, height)
pub mod sizes {
    pub const COLLAPSED: (f64, f64) = (60.0, 60.0);
    pub const HOVER: (f64, f64) = (280.0, 120.0);
    pub const EXPANDED: (f64, f64) = (400.0, 300.0);
    pub const MINIMIZED: (f64, f64) = (40.0, 40.0);
    pub const HIDDEN: (f64, f64) = (0.0, 0.0);
}

/// Defaults used before the host reports anything
pub mod defaults {
    /// Screen size assumed until the host reports a resize
    pub const SCREEN_WIDTH: f64 = 1920.0;
    pub const SCREEN_HEIGHT: f64 = 1080.0;

    /// Distance of the initial position from the right screen edge
    pub const RIGHT_OFFSET: f64 = 80.0;

    /// Initial vertical position
    pub const TOP_OFFSET: f64 = 100.0;

    /// Preferred opacity of the collapsed widget
    pub const TRANSPARENCY_LEVEL: f64 = 0.95;

    /// Interval between animation frames in live mode
    pub const FRAME_MS: u64 = 16;
}

/// Configuration file location and environment overrides
pub mod config {
    /// Application directory name under the user's config dir
    pub const APP_DIR: &str = "floating-widget";

    /// Config file name
    pub const FILENAME: &str = "config.json";

    pub const ENV_TRANSPARENCY: &str = "WIDGET_TRANSPARENCY";
    pub const ENV_SNAP_TO_EDGES: &str = "WIDGET_SNAP_TO_EDGES";
    pub const ENV_KEYBOARD_SHORTCUTS: &str = "WIDGET_KEYBOARD_SHORTCUTS";
    pub const ENV_SCREEN_WIDTH: &str = "WIDGET_SCREEN_WIDTH";
    pub const ENV_SCREEN_HEIGHT: &str = "WIDGET_SCREEN_HEIGHT";
}

/// Validation bounds for config values
pub mod validation {
    /// Smallest screen edge the engines accept
    pub const MIN_SCREEN: f64 = 100.0;

    /// Largest screen edge the engines accept
    pub const MAX_SCREEN: f64 = 16384.0;

    /// Longest timer a config may set (ms)
    pub const MAX_TIMER_MS: u64 = 60 * 60 * 1000;
}
