//! Smart positioning engine
//!
//! Keeps the widget on screen and out of the way. Placement is a pure search
//! over obstacles and eight fixed candidates; the engine wraps it with the
//! triggers that decide when to run it (pointer debounce, drag end, resize,
//! night) and the dampening that decides whether to apply the result.

pub mod displays;
pub mod obstacles;
pub mod snap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::positioning as consts;
use crate::geometry::{self, Rect};
use crate::scheduler::{Millis, ScheduledTask};
use crate::store::{TimeOfDay, WidgetStore};
use crate::types::{Dimensions, Point, Position, ScreenSize};

pub use displays::DisplayInfo;
pub use obstacles::{detect_obstacles, ObstacleKind, ObstacleRect, ObstacleRegistry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningSettings {
    pub edge_buffer: f64,
    pub snap_threshold: f64,
    pub cursor_buffer: f64,
    pub move_threshold: f64,
    pub debounce_ms: Millis,
    pub post_drag_ms: Millis,
    pub night_inset: f64,
    pub rehome_inset: f64,
}

impl Default for PositioningSettings {
    fn default() -> Self {
        Self {
            edge_buffer: consts::EDGE_BUFFER,
            snap_threshold: consts::SNAP_THRESHOLD,
            cursor_buffer: consts::CURSOR_BUFFER,
            move_threshold: consts::MOVE_THRESHOLD,
            debounce_ms: consts::DEBOUNCE_MS,
            post_drag_ms: consts::POST_DRAG_MS,
            night_inset: consts::NIGHT_INSET,
            rehome_inset: consts::REHOME_INSET,
        }
    }
}

/// A fixed placement tried when the target conflicts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: Position,
    pub score: u8,
}

/// Corners then edge centers, best first
pub fn candidates(size: Dimensions, screen: ScreenSize, buffer: f64) -> [Candidate; 8] {
    let left = buffer;
    let right = screen.width - size.width - buffer;
    let top = buffer;
    let bottom = screen.height - size.height - buffer;
    let center_x = (screen.width - size.width) / 2.0;
    let center_y = (screen.height - size.height) / 2.0;

    let at = |x, y, score| Candidate {
        position: Position::new(x, y),
        score,
    };
    [
        at(right, top, 10),
        at(left, top, 9),
        at(right, bottom, 8),
        at(left, bottom, 7),
        at(right, center_y, 6),
        at(left, center_y, 5),
        at(center_x, top, 4),
        at(center_x, bottom, 3),
    ]
}

/// Place a widget of `size` as close to `target` as the obstacles allow
///
/// A conflict-free target is only clamped into the screen. Otherwise the
/// best conflict-free candidate wins, and the top-right corner is returned
/// when every candidate conflicts.
pub fn find_position(
    target: Position,
    size: Dimensions,
    screen: ScreenSize,
    obstacles: &[ObstacleRect],
    buffer: f64,
) -> Position {
    if !obstacles::conflicts(&Rect::at(target, size), obstacles) {
        return geometry::clamp_to_screen(target, size, screen, buffer);
    }

    let all = candidates(size, screen, buffer);
    all.iter()
        .filter(|c| !obstacles::conflicts(&Rect::at(c.position, size), obstacles))
        .max_by_key(|c| c.score)
        .unwrap_or(&all[0])
        .position
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragGrab {
    offset: Point,
}

#[derive(Debug)]
pub struct PositioningEngine {
    settings: PositioningSettings,
    pointer: Option<Point>,
    registry: ObstacleRegistry,
    displays: Vec<DisplayInfo>,
    grab: Option<DragGrab>,
    debounce: ScheduledTask,
    post_drag: ScheduledTask,
}

impl PositioningEngine {
    pub fn new(settings: PositioningSettings) -> Self {
        Self {
            settings,
            pointer: None,
            registry: ObstacleRegistry::new(),
            displays: Vec::new(),
            grab: None,
            debounce: ScheduledTask::new("positioning-debounce"),
            post_drag: ScheduledTask::new("post-drag-reposition"),
        }
    }

    pub fn settings(&self) -> &PositioningSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ObstacleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObstacleRegistry {
        &mut self.registry
    }

    pub fn displays(&self) -> &[DisplayInfo] {
        &self.displays
    }

    /// Replace the known display layout and pull the widget back if stranded
    pub fn set_displays(&mut self, displays: Vec<DisplayInfo>, store: &mut WidgetStore) -> bool {
        debug!(count = displays.len(), "Display layout changed");
        self.displays = displays;
        self.optimize_for_displays(store)
    }

    /// Move the widget to the primary display when it sits on none of them
    /// Returns whether the widget moved
    pub fn optimize_for_displays(&self, store: &mut WidgetStore) -> bool {
        let Some(home) = displays::rehome(
            store.position(),
            store.size(),
            &self.displays,
            self.settings.rehome_inset,
        ) else {
            return false;
        };
        info!(x = home.x, y = home.y, "Widget outside every display, moved to primary");
        store.set_position(home);
        true
    }

    pub fn debounce_task(&self) -> &ScheduledTask {
        &self.debounce
    }

    pub fn post_drag_task(&self) -> &ScheduledTask {
        &self.post_drag
    }

    pub fn detect_obstacles(&self) -> Vec<ObstacleRect> {
        detect_obstacles(self.pointer, self.settings.cursor_buffer, &self.registry)
    }

    /// Best placement for the widget, aiming at `target` or the current position
    pub fn calculate_optimal_position(
        &self,
        store: &WidgetStore,
        target: Option<Position>,
    ) -> Position {
        find_position(
            target.unwrap_or(store.position()),
            store.size(),
            store.screen(),
            &self.detect_obstacles(),
            self.settings.edge_buffer,
        )
    }

    /// Move the widget to its optimal position if that is far enough away
    /// Returns whether the widget moved
    pub fn perform_smart_repositioning(&self, store: &mut WidgetStore) -> bool {
        if store.is_dragging() {
            return false;
        }

        let current = store.position();
        let optimal = self.calculate_optimal_position(store, None);
        let distance = current.distance_to(optimal);
        if distance <= self.settings.move_threshold {
            debug!(distance, "Reposition below move threshold, skipped");
            return false;
        }

        info!(
            from_x = current.x,
            from_y = current.y,
            to_x = optimal.x,
            to_y = optimal.y,
            "Widget repositioned"
        );
        store.set_position(optimal);
        true
    }

    /// Track the pointer and restart the settle countdown
    pub fn pointer_moved(&mut self, now: Millis, point: Point) {
        self.pointer = Some(point);
        self.debounce.arm(now, self.settings.debounce_ms);
    }

    /// Fire due tasks; returns whether the widget moved
    pub fn on_timer(&mut self, now: Millis, store: &mut WidgetStore) -> bool {
        let mut moved = false;
        if self.debounce.fire_if_due(now) && store.preferences().snap_to_edges {
            moved |= self.perform_smart_repositioning(store);
        }
        if self.post_drag.fire_if_due(now) {
            moved |= self.perform_smart_repositioning(store);
        }
        moved
    }

    /// Pure re-clamp into the current screen, no obstacle search
    pub fn handle_resize(&self, store: &mut WidgetStore) {
        let clamped = geometry::clamp_to_screen(
            store.position(),
            store.size(),
            store.screen(),
            self.settings.edge_buffer,
        );
        if clamped != store.position() {
            debug!(x = clamped.x, y = clamped.y, "Widget clamped into screen");
            store.set_position(clamped);
        }
    }

    /// Bias toward the bottom-right corner when night falls
    pub fn handle_time_of_day(&self, time_of_day: TimeOfDay, store: &mut WidgetStore) {
        if time_of_day != TimeOfDay::Night || !store.preferences().snap_to_edges {
            return;
        }
        let screen = store.screen();
        let size = store.size();
        let target = Position::new(
            screen.width - size.width - self.settings.night_inset,
            screen.height - size.height - self.settings.night_inset,
        );
        let night = self.calculate_optimal_position(store, Some(target));
        info!(x = night.x, y = night.y, "Night placement");
        store.set_position(night);
    }

    /// Edge snap for a drag release; a no-op when snapping is disabled
    pub fn snap_to_edge(&self, position: Position, store: &WidgetStore) -> Position {
        if !store.preferences().snap_to_edges {
            return position;
        }
        snap::find_edge_snap(
            position,
            store.size(),
            store.screen(),
            self.settings.snap_threshold,
            self.settings.edge_buffer,
        )
        .unwrap_or(position)
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    pub fn drag_start(&mut self, point: Point, store: &mut WidgetStore) {
        let position = store.position();
        self.grab = Some(DragGrab {
            offset: Point::new(point.x - position.x, point.y - position.y),
        });
        self.post_drag.cancel();
        store.set_dragging(true);
        debug!(x = point.x, y = point.y, "Drag started");
    }

    /// Follow the pointer, keeping the widget fully on screen
    pub fn drag_move(&mut self, point: Point, store: &mut WidgetStore) {
        let Some(grab) = self.grab else {
            return;
        };
        let screen = store.screen();
        let size = store.size();
        let max_x = (screen.width - size.width).max(0.0);
        let max_y = (screen.height - size.height).max(0.0);
        store.set_position(Position::new(
            (point.x - grab.offset.x).clamp(0.0, max_x),
            (point.y - grab.offset.y).clamp(0.0, max_y),
        ));
    }

    pub fn drag_end(&mut self, now: Millis, store: &mut WidgetStore) {
        if self.grab.take().is_none() {
            return;
        }
        store.set_dragging(false);
        let snapped = self.snap_to_edge(store.position(), store);
        if snapped != store.position() {
            debug!(x = snapped.x, y = snapped.y, "Snapped to edge");
            store.set_position(snapped);
        }
        self.post_drag.arm(now, self.settings.post_drag_ms);
    }

    /// Cancel pending tasks and forget transient input
    pub fn teardown(&mut self) {
        self.debounce.cancel();
        self.post_drag.cancel();
        self.grab = None;
        self.pointer = None;
        self.registry.clear();
        self.displays.clear();
    }
}
