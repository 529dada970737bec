//! Gesture recognition engine
//!
//! Trace lifecycle: `Idle -> Recording -> {recognized, discarded}`. A press
//! inside the widget starts recording and arms the long-press task; moves
//! append points; the release either discards a too-short trace or scores it
//! against the template library. Double tap is judged on release timing
//! alone and may fire alongside a shape match.

pub mod matcher;
pub mod templates;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::gesture as consts;
use crate::geometry::Rect;
use crate::scheduler::{Millis, ScheduledTask};
use crate::store::WidgetStore;
use crate::types::{GesturePoint, Point};

pub use templates::{builtin_templates, GestureId, GestureTemplate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    pub long_press_ms: Millis,
    pub double_tap_window_ms: Millis,
    pub min_trace_ms: Millis,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            long_press_ms: consts::LONG_PRESS_MS,
            double_tap_window_ms: consts::DOUBLE_TAP_WINDOW_MS,
            min_trace_ms: consts::MIN_TRACE_MS,
        }
    }
}

/// A gesture that fired and had its command applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiredGesture {
    pub id: GestureId,
    /// Shape score, absent for timing-based gestures
    pub similarity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TracePhase {
    Idle,
    Recording { started_at: Millis },
}

#[derive(Debug)]
pub struct GestureRecognizer {
    settings: GestureSettings,
    templates: Vec<GestureTemplate>,
    phase: TracePhase,
    trace: Vec<GesturePoint>,
    long_press: ScheduledTask,
    last_release: Option<Millis>,
}

impl GestureRecognizer {
    pub fn new(settings: GestureSettings) -> Self {
        Self::with_templates(settings, builtin_templates())
    }

    pub fn with_templates(settings: GestureSettings, templates: Vec<GestureTemplate>) -> Self {
        Self {
            settings,
            templates,
            phase: TracePhase::Idle,
            trace: Vec::new(),
            long_press: ScheduledTask::new("long-press"),
            last_release: None,
        }
    }

    pub fn templates(&self) -> &[GestureTemplate] {
        &self.templates
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.phase, TracePhase::Recording { .. })
    }

    pub fn trace(&self) -> &[GesturePoint] {
        &self.trace
    }

    pub fn long_press_task(&self) -> &ScheduledTask {
        &self.long_press
    }

    /// Start recording if `point` lies inside the widget
    /// Returns whether recording started
    pub fn press(&mut self, now: Millis, point: Point, store: &WidgetStore) -> bool {
        // A hidden widget has no hit region
        let size = store.size();
        if !store.is_visible() || size.width <= 0.0 || size.height <= 0.0 {
            return false;
        }
        let bounds = Rect::at(store.position(), size);
        if !bounds.contains(point) {
            return false;
        }

        self.phase = TracePhase::Recording { started_at: now };
        self.trace.clear();
        self.trace.push(GesturePoint::new(point.x, point.y, 0.0));
        self.long_press.arm(now, self.settings.long_press_ms);
        debug!(x = point.x, y = point.y, "Gesture recording started");
        true
    }

    pub fn move_to(&mut self, now: Millis, point: Point) {
        if let TracePhase::Recording { started_at } = self.phase {
            let elapsed = now.saturating_sub(started_at) as f64;
            self.trace.push(GesturePoint::new(point.x, point.y, elapsed));
        }
    }

    /// Finish the trace, apply whatever fired and return it in firing order
    pub fn release(&mut self, now: Millis, store: &mut WidgetStore) -> Vec<FiredGesture> {
        let TracePhase::Recording { started_at } = self.phase else {
            return Vec::new();
        };
        self.phase = TracePhase::Idle;
        self.long_press.cancel();

        let mut fired = Vec::new();
        let trace = std::mem::take(&mut self.trace);
        let duration = now.saturating_sub(started_at);

        if duration < self.settings.min_trace_ms {
            debug!(duration, "Trace too short, discarded");
        } else if let Some((template, score)) = matcher::recognize(&trace, &self.templates) {
            info!(gesture = template.name, similarity = score, "Gesture recognized");
            template.action.apply(store);
            fired.push(FiredGesture {
                id: template.id,
                similarity: Some(score),
            });
        } else {
            debug!(points = trace.len(), "Trace matched no template");
        }

        let window = self.settings.double_tap_window_ms;
        let is_double_tap = self
            .last_release
            .is_some_and(|previous| now.saturating_sub(previous) < window);
        if is_double_tap
            && let Some(template) = templates::find(&self.templates, GestureId::DoubleTap)
        {
            info!(gesture = template.name, "Gesture recognized");
            template.action.apply(store);
            fired.push(FiredGesture {
                id: GestureId::DoubleTap,
                similarity: None,
            });
        }
        self.last_release = Some(now);

        fired
    }

    /// Fire the long-press task if due; recording ends when it fires
    pub fn on_timer(&mut self, now: Millis, store: &mut WidgetStore) -> Option<FiredGesture> {
        if !self.long_press.fire_if_due(now) || !self.is_recording() {
            return None;
        }
        self.phase = TracePhase::Idle;
        self.trace.clear();

        let template = templates::find(&self.templates, GestureId::LongPress)?;
        info!(gesture = template.name, "Gesture recognized");
        template.action.apply(store);
        Some(FiredGesture {
            id: GestureId::LongPress,
            similarity: None,
        })
    }

    /// Drop any in-flight trace and its long-press task
    pub fn abort(&mut self) {
        if self.is_recording() {
            debug!(points = self.trace.len(), "Gesture trace aborted");
        }
        self.phase = TracePhase::Idle;
        self.trace.clear();
        self.long_press.cancel();
    }
}
