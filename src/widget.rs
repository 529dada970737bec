//! The mounted widget
//!
//! Owns the store and the engines, routes host events to them and reacts to
//! store changes. Time only moves through the `now` values the host passes
//! in; `advance` fires whatever tasks fell due and renders one frame.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::constants::defaults::FRAME_MS;
use crate::context::ContextMonitor;
use crate::events::HostEvent;
use crate::geometry::Rect;
use crate::gesture::GestureRecognizer;
use crate::performance::PerformanceGovernor;
use crate::personality::PersonalityMode;
use crate::positioning::PositioningEngine;
use crate::render::RenderSurface;
use crate::scheduler::{next_deadline, Millis};
use crate::shortcuts;
use crate::store::{StoreChange, VoiceState, WidgetContext, WidgetState, WidgetStore};
use crate::transparency::TransparencyEngine;
use crate::types::{Dimensions, Point, Position, ScreenSize};

/// Everything a host needs to draw the widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetSnapshot {
    pub state: WidgetState,
    pub position: Position,
    pub size: Dimensions,
    pub is_visible: bool,
    pub is_dragging: bool,
    pub opacity: f64,
    pub personality: PersonalityMode,
    pub show_settings: bool,
    pub show_personality_selector: bool,
    pub show_quick_actions: bool,
    pub voice: VoiceState,
    pub context: WidgetContext,
    pub low_power: bool,
    pub always_on_top: bool,
}

#[derive(Debug)]
pub struct Widget {
    store: WidgetStore,
    gestures: GestureRecognizer,
    transparency: TransparencyEngine,
    positioning: PositioningEngine,
    context: ContextMonitor,
    performance: PerformanceGovernor,
    mounted: bool,
    last_bounds: Option<(Position, Dimensions)>,
    last_on_top: Option<bool>,
}

impl Widget {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_context_monitor(config, ContextMonitor::new(config.context.clone()))
    }

    pub fn with_context_monitor(config: &EngineConfig, context: ContextMonitor) -> Self {
        Self {
            store: WidgetStore::new(config.screen, config.preferences.clone()),
            gestures: GestureRecognizer::new(config.gesture.clone()),
            transparency: TransparencyEngine::new(config.transparency.clone()),
            positioning: PositioningEngine::new(config.positioning.clone()),
            context,
            performance: PerformanceGovernor::new(),
            mounted: false,
            last_bounds: None,
            last_on_top: None,
        }
    }

    pub fn store(&self) -> &WidgetStore {
        &self.store
    }

    /// Direct store access for listeners and host-driven mutations
    /// Changes made here are reacted to on the next `handle` or `advance`
    pub fn store_mut(&mut self) -> &mut WidgetStore {
        &mut self.store
    }

    pub fn gestures(&self) -> &GestureRecognizer {
        &self.gestures
    }

    pub fn transparency(&self) -> &TransparencyEngine {
        &self.transparency
    }

    /// Escape hatches (`set_opacity`, `fade_in`, ...) live on the engine
    pub fn transparency_mut(&mut self) -> &mut TransparencyEngine {
        &mut self.transparency
    }

    pub fn positioning(&self) -> &PositioningEngine {
        &self.positioning
    }

    pub fn context_monitor(&self) -> &ContextMonitor {
        &self.context
    }

    pub fn performance(&self) -> &PerformanceGovernor {
        &self.performance
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn opacity(&self) -> f64 {
        self.transparency.current_opacity()
    }

    pub fn mount(&mut self, now: Millis, surface: &mut dyn RenderSurface) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.context.start(now, &mut self.store);
        self.react(now);
        self.apply_performance_budget();
        self.transparency.update_opacity(now, &self.store);

        let _ = surface
            .apply_opacity(self.opacity())
            .inspect_err(|err| debug!(error = %err, "Skipped opacity write"));
        self.sync_bounds(surface);
        self.sync_stacking(surface);

        let position = self.store.position();
        info!(x = position.x, y = position.y, state = ?self.store.state(), "Widget mounted");
    }

    /// Release every task, listener and transient input
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.gestures.abort();
        self.transparency.teardown();
        self.positioning.teardown();
        self.context.teardown();
        self.store.teardown();
        self.last_bounds = None;
        self.last_on_top = None;
        self.mounted = false;
        info!("Widget unmounted");
    }

    pub fn handle(&mut self, now: Millis, event: &HostEvent) {
        if !self.mounted {
            debug!(event = ?event, "Event ignored, widget not mounted");
            return;
        }
        if event.is_user_activity() {
            self.context.record_activity(now, &mut self.store);
        }

        match event {
            HostEvent::PointerDown { .. } | HostEvent::TouchStart { .. } => {
                if let Some(point) = event.point() {
                    self.gestures.press(now, point, &self.store);
                }
            }
            HostEvent::PointerMove { x, y } => {
                let point = Point::new(*x, *y);
                self.gestures.move_to(now, point);
                self.transparency.pointer_moved(now, point, &self.store);
                self.positioning.pointer_moved(now, point);
            }
            HostEvent::TouchMove { x, y } => {
                self.gestures.move_to(now, Point::new(*x, *y));
            }
            HostEvent::PointerUp | HostEvent::TouchEnd => {
                let fired = self.gestures.release(now, &mut self.store);
                if !fired.is_empty() {
                    debug!(count = fired.len(), "Gestures fired on release");
                }
            }
            HostEvent::PointerEnter => {
                if self.store.state() == WidgetState::Collapsed {
                    self.store.set_state(WidgetState::Hover);
                }
            }
            HostEvent::PointerLeave => {
                if self.store.state() == WidgetState::Hover {
                    self.store.set_state(WidgetState::Collapsed);
                }
            }
            HostEvent::Click => {
                if matches!(self.store.state(), WidgetState::Collapsed | WidgetState::Hover) {
                    self.store.set_state(WidgetState::Expanded);
                }
            }
            HostEvent::DragStart { .. } => {
                if let Some(point) = event.point() {
                    self.gestures.abort();
                    self.positioning.drag_start(point, &mut self.store);
                }
            }
            HostEvent::DragMove { .. } => {
                if let Some(point) = event.point() {
                    self.positioning.drag_move(point, &mut self.store);
                }
            }
            HostEvent::DragEnd => self.positioning.drag_end(now, &mut self.store),
            HostEvent::Key(key) => {
                if let Some(command) = shortcuts::resolve(key, &self.store) {
                    command.apply(&mut self.store);
                }
            }
            HostEvent::Resize {
                width,
                height,
                multi_monitor,
            } => {
                let screen = ScreenSize::new(*width, *height);
                self.context.resize(screen, *multi_monitor, &mut self.store);
                self.positioning.optimize_for_displays(&mut self.store);
            }
            HostEvent::Displays { displays } => {
                let screen = self.store.screen();
                self.context.resize(screen, displays.len() > 1, &mut self.store);
                self.positioning.set_displays(displays.clone(), &mut self.store);
            }
            HostEvent::Online => self.context.set_online(true, &mut self.store),
            HostEvent::Offline => self.context.set_online(false, &mut self.store),
            HostEvent::NetworkStatus { status } => {
                self.context.set_network_status(*status, &mut self.store);
            }
            HostEvent::Visibility { visible } => {
                if *visible {
                    self.context.refresh(&mut self.store);
                }
                self.transparency.update_opacity(now, &self.store);
            }
            HostEvent::Focus | HostEvent::Blur => {
                self.transparency.update_opacity(now, &self.store);
            }
            HostEvent::Battery { level } => {
                self.context.set_battery_level(*level, &mut self.store);
            }
            HostEvent::SystemLoad { load } => {
                self.context.set_system_load(*load, &mut self.store);
            }
            HostEvent::ObstacleAdded {
                id,
                x,
                y,
                width,
                height,
            } => {
                self.positioning
                    .registry_mut()
                    .register(id.clone(), Rect::new(*x, *y, *width, *height));
            }
            HostEvent::ObstacleRemoved { id } => {
                if self.positioning.registry_mut().remove(id).is_none() {
                    debug!(id = %id, "Unknown obstacle removed");
                }
            }
            HostEvent::Voice(voice) => {
                self.store.update_voice_state(|current| *current = voice.clone());
            }
            HostEvent::Command { command } => command.apply(&mut self.store),
            HostEvent::UpdatePreferences { preferences } => {
                self.store.update_preferences(|current| *current = preferences.clone());
            }
            HostEvent::Tick => {}
        }

        self.react(now);
    }

    /// Fire due tasks and render one frame
    pub fn advance(&mut self, now: Millis, surface: &mut dyn RenderSurface) {
        if !self.mounted {
            return;
        }
        self.gestures.on_timer(now, &mut self.store);
        self.transparency.on_timer(now, &self.store);
        self.positioning.on_timer(now, &mut self.store);
        self.context.on_timer(now, &mut self.store);
        self.react(now);

        self.transparency.frame(now, surface);
        self.sync_bounds(surface);
        self.sync_stacking(surface);
    }

    /// When the host should call `advance` next, if at all
    pub fn next_wake(&self, now: Millis) -> Option<Millis> {
        if !self.mounted {
            return None;
        }
        let frame = self
            .transparency
            .is_animating()
            .then(|| now + FRAME_MS);
        let timers = next_deadline([
            self.gestures.long_press_task(),
            self.transparency.mouse_idle_task(),
            self.positioning.debounce_task(),
            self.positioning.post_drag_task(),
            self.context.user_idle_task(),
            self.context.refresh_task(),
        ]);
        match (frame, timers) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            state: self.store.state(),
            position: self.store.position(),
            size: self.store.size(),
            is_visible: self.store.is_visible(),
            is_dragging: self.store.is_dragging(),
            opacity: self.opacity(),
            personality: self.store.current_personality(),
            show_settings: self.store.show_settings(),
            show_personality_selector: self.store.show_personality_selector(),
            show_quick_actions: self.store.show_quick_actions(),
            voice: self.store.voice().clone(),
            context: self.store.context().clone(),
            low_power: self.performance.is_low_power(),
            always_on_top: self.store.preferences().always_on_top,
        }
    }

    /// Drain store changes and let the engines respond until nothing changes
    fn react(&mut self, now: Millis) {
        let mut changed = false;
        let mut budget_stale = false;
        loop {
            let changes = self.store.take_changes();
            if changes.is_empty() {
                break;
            }
            changed = true;
            for change in changes {
                match change {
                    StoreChange::State { from, to } => {
                        debug!(from = ?from, to = ?to, "Widget state changed");
                        self.gestures.abort();
                        self.store.set_size(to.size());
                    }
                    StoreChange::Size(_) | StoreChange::Screen(_) => {
                        self.positioning.handle_resize(&mut self.store);
                    }
                    StoreChange::TimeOfDay(time_of_day) => {
                        self.positioning.handle_time_of_day(time_of_day, &mut self.store);
                    }
                    StoreChange::BatteryLevel(_)
                    | StoreChange::SystemLoad(_)
                    | StoreChange::Preferences(_) => budget_stale = true,
                    _ => {}
                }
            }
        }
        if budget_stale {
            self.apply_performance_budget();
        }
        if changed {
            self.transparency.update_opacity(now, &self.store);
        }
    }

    /// Size opacity transitions for battery, load and the speed preference
    fn apply_performance_budget(&mut self) {
        self.performance.observe_battery(self.store.context().battery_level);
        let base = self.transparency.settings().animation_ms;
        let ms = self.performance.animation_ms(base, &self.store);
        self.transparency.set_animation_ms(ms);
    }

    fn sync_bounds(&mut self, surface: &mut dyn RenderSurface) {
        let bounds = (self.store.position(), self.store.size());
        if self.last_bounds == Some(bounds) {
            return;
        }
        match surface.apply_bounds(bounds.0, bounds.1) {
            Ok(()) => self.last_bounds = Some(bounds),
            Err(err) => debug!(error = %err, "Skipped bounds write"),
        }
    }

    fn sync_stacking(&mut self, surface: &mut dyn RenderSurface) {
        let on_top = self.store.preferences().always_on_top;
        if self.last_on_top == Some(on_top) {
            return;
        }
        match surface.apply_always_on_top(on_top) {
            Ok(()) => self.last_on_top = Some(on_top),
            Err(err) => debug!(error = %err, "Skipped stacking write"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextSettings;
    use crate::render::RecordingSurface;
    use crate::shortcuts::KeyEvent;
    use crate::store::{TimeOfDay, UserActivity};

    fn mounted() -> (Widget, RecordingSurface) {
        let config = EngineConfig::default();
        let monitor = ContextMonitor::with_hour_source(ContextSettings::default(), || 10);
        let mut widget = Widget::with_context_monitor(&config, monitor);
        let mut surface = RecordingSurface::new();
        widget.mount(0, &mut surface);
        (widget, surface)
    }

    fn settle(widget: &mut Widget, surface: &mut RecordingSurface, from: Millis, until: Millis) {
        let mut now = from;
        while let Some(wake) = widget.next_wake(now)
            && wake <= until
        {
            now = wake;
            widget.advance(now, surface);
        }
    }

    #[test]
    fn test_mount_writes_initial_bounds() {
        let (widget, surface) = mounted();
        assert!(widget.is_mounted());
        assert_eq!(
            surface.last_bounds(),
            Some((Position::new(1840.0, 100.0), Dimensions::new(60.0, 60.0)))
        );
        assert_eq!(surface.last_opacity(), Some(1.0));
        assert_eq!(widget.store().context().time_of_day, TimeOfDay::Morning);
    }

    #[test]
    fn test_click_expands_resizes_and_clamps() {
        let (mut widget, mut surface) = mounted();
        widget.handle(10, &HostEvent::Click);
        assert_eq!(widget.store().state(), WidgetState::Expanded);
        assert_eq!(widget.store().size(), Dimensions::new(400.0, 300.0));
        assert_eq!(widget.store().position(), Position::new(1510.0, 100.0));

        widget.advance(26, &mut surface);
        assert_eq!(
            surface.last_bounds(),
            Some((Position::new(1510.0, 100.0), Dimensions::new(400.0, 300.0)))
        );
    }

    #[test]
    fn test_hover_enter_and_leave() {
        let (mut widget, _) = mounted();
        widget.handle(0, &HostEvent::PointerEnter);
        assert_eq!(widget.store().state(), WidgetState::Hover);
        assert_eq!(widget.store().size(), Dimensions::new(280.0, 120.0));
        widget.handle(5, &HostEvent::PointerLeave);
        assert_eq!(widget.store().state(), WidgetState::Collapsed);
    }

    #[test]
    fn test_long_press_hides_widget() {
        let (mut widget, mut surface) = mounted();
        widget.handle(100, &HostEvent::PointerDown { x: 1850.0, y: 110.0 });
        settle(&mut widget, &mut surface, 100, 1500);
        assert!(!widget.store().is_visible());
        assert_eq!(widget.opacity(), 0.0);
    }

    #[test]
    fn test_double_tap_through_events() {
        let (mut widget, _) = mounted();
        widget.handle(100, &HostEvent::PointerDown { x: 1850.0, y: 110.0 });
        widget.handle(140, &HostEvent::PointerUp);
        widget.handle(200, &HostEvent::PointerDown { x: 1850.0, y: 110.0 });
        widget.handle(240, &HostEvent::PointerUp);
        assert_eq!(widget.store().state(), WidgetState::Expanded);
    }

    #[test]
    fn test_state_change_aborts_trace() {
        let (mut widget, _) = mounted();
        widget.handle(100, &HostEvent::PointerDown { x: 1850.0, y: 110.0 });
        assert!(widget.gestures().is_recording());
        widget.handle(120, &HostEvent::Key(KeyEvent::new("e").ctrl().shift()));
        assert_eq!(widget.store().state(), WidgetState::Expanded);
        assert!(!widget.gestures().is_recording());
        assert!(!widget.gestures().long_press_task().is_armed());
    }

    #[test]
    fn test_user_idle_dims_widget() {
        let (mut widget, mut surface) = mounted();
        settle(&mut widget, &mut surface, 0, 300_400);
        assert_eq!(widget.store().context().user_activity, UserActivity::Idle);
        assert_eq!(widget.opacity(), 0.3);

        widget.handle(300_500, &HostEvent::Key(KeyEvent::new("x")));
        assert_eq!(widget.store().context().user_activity, UserActivity::Active);
        assert_eq!(widget.transparency().animation_target(), Some(0.95));
    }

    #[test]
    fn test_swipe_event_sequence_cycles_personality() {
        let (mut widget, _) = mounted();
        widget.handle(1000, &HostEvent::PointerDown { x: 1845.0, y: 130.0 });
        widget.handle(1150, &HostEvent::PointerMove { x: 1870.0, y: 130.0 });
        widget.handle(1300, &HostEvent::PointerMove { x: 1895.0, y: 130.0 });
        widget.handle(1300, &HostEvent::PointerUp);
        assert_eq!(widget.store().current_personality(), PersonalityMode::Professional);
    }

    #[test]
    fn test_detached_surface_recovers() {
        let (mut widget, mut surface) = mounted();
        surface.set_detached(true);
        widget.handle(10, &HostEvent::Click);
        widget.advance(26, &mut surface);
        surface.set_detached(false);
        widget.advance(42, &mut surface);
        assert_eq!(
            surface.last_bounds(),
            Some((widget.store().position(), widget.store().size()))
        );
    }

    #[test]
    fn test_unmount_releases_everything() {
        let (mut widget, mut surface) = mounted();
        widget.store_mut().subscribe(|_| {});
        widget.handle(100, &HostEvent::PointerMove { x: 5.0, y: 5.0 });
        widget.handle(110, &HostEvent::PointerDown { x: 1850.0, y: 110.0 });
        widget.unmount();

        assert!(!widget.is_mounted());
        assert_eq!(widget.next_wake(200), None);
        assert_eq!(widget.store().listener_count(), 0);
        assert!(!widget.gestures().is_recording());

        // Events after unmount are ignored
        widget.handle(300, &HostEvent::Click);
        widget.advance(400, &mut surface);
        assert_eq!(widget.store().state(), WidgetState::Collapsed);
    }

    #[test]
    fn test_remount_restarts_context() {
        let (mut widget, mut surface) = mounted();
        widget.unmount();
        widget.mount(1000, &mut surface);
        assert_eq!(widget.context_monitor().refresh_task().deadline(), Some(31_000));
    }
}
