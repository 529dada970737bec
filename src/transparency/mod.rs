//! Adaptive transparency engine
//!
//! Resolves a target opacity from the rule table on every trigger and eases
//! toward it. The engine keeps the animation's running value as the single
//! "current opacity"; nothing else assigns it.

pub mod easing;
pub mod rules;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::transparency as consts;
use crate::render::RenderSurface;
use crate::scheduler::{Millis, ScheduledTask};
use crate::store::WidgetStore;
use crate::types::Point;

use easing::OpacityTween;
use rules::{RuleInputs, TransparencyRule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransparencySettings {
    pub animation_ms: Millis,
    pub hysteresis: f64,
    pub mouse_idle_ms: Millis,
    pub proximity_buffer: f64,
}

impl Default for TransparencySettings {
    fn default() -> Self {
        Self {
            animation_ms: consts::ANIMATION_MS,
            hysteresis: consts::HYSTERESIS,
            mouse_idle_ms: consts::MOUSE_IDLE_MS,
            proximity_buffer: consts::PROXIMITY_BUFFER,
        }
    }
}

#[derive(Debug)]
pub struct TransparencyEngine {
    settings: TransparencySettings,
    rules: Vec<TransparencyRule>,
    /// Transition length in use; starts at the configured one
    animation_ms: Millis,
    current: f64,
    animation: Option<OpacityTween>,
    pointer: Option<Point>,
    pointer_idle: bool,
    mouse_idle: ScheduledTask,
}

impl TransparencyEngine {
    pub fn new(settings: TransparencySettings) -> Self {
        Self::with_rules(settings, rules::default_rules())
    }

    pub fn with_rules(settings: TransparencySettings, rules: Vec<TransparencyRule>) -> Self {
        Self {
            animation_ms: settings.animation_ms,
            settings,
            rules,
            current: 1.0,
            animation: None,
            pointer: None,
            pointer_idle: false,
            mouse_idle: ScheduledTask::new("mouse-idle"),
        }
    }

    pub fn settings(&self) -> &TransparencySettings {
        &self.settings
    }

    pub fn rules(&self) -> &[TransparencyRule] {
        &self.rules
    }

    pub fn animation_ms(&self) -> Millis {
        self.animation_ms
    }

    /// Length of transitions started from now on; zero makes them instant
    pub fn set_animation_ms(&mut self, animation_ms: Millis) {
        if animation_ms != self.animation_ms {
            debug!(animation_ms, "Opacity transition length changed");
            self.animation_ms = animation_ms;
        }
    }

    pub fn current_opacity(&self) -> f64 {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn animation_target(&self) -> Option<f64> {
        self.animation.map(|a| a.target)
    }

    pub fn is_pointer_idle(&self) -> bool {
        self.pointer_idle
    }

    pub fn mouse_idle_task(&self) -> &ScheduledTask {
        &self.mouse_idle
    }

    fn inputs<'s>(&self, store: &'s WidgetStore) -> RuleInputs<'s> {
        RuleInputs {
            store,
            pointer: self.pointer,
            pointer_idle: self.pointer_idle,
            proximity_buffer: self.settings.proximity_buffer,
        }
    }

    pub fn is_pointer_near(&self, store: &WidgetStore) -> bool {
        rules::is_pointer_near(self.pointer, store, self.settings.proximity_buffer)
    }

    pub fn calculate_optimal_opacity(&self, store: &WidgetStore) -> f64 {
        let inputs = self.inputs(store);
        if let Some(rule) = rules::resolve(&self.rules, &inputs) {
            debug!(rule = %rule.name, priority = rule.priority, "Transparency rule applied");
        }
        rules::calculate_optimal_opacity(&self.rules, &inputs)
    }

    /// Re-resolve the target and start a transition if it moved past the hysteresis band
    ///
    /// A transition already heading for the same target is left alone; one
    /// heading elsewhere while the new target sits inside the band is dropped.
    pub fn update_opacity(&mut self, now: Millis, store: &WidgetStore) {
        let target = self.calculate_optimal_opacity(store);
        if self.animation_target() == Some(target) {
            return;
        }
        if (target - self.current).abs() > self.settings.hysteresis {
            self.animate_to(now, target);
        } else if self.animation.take().is_some() {
            debug!(target, current = self.current, "Opacity animation dropped");
        }
    }

    fn animate_to(&mut self, now: Millis, target: f64) {
        if let Some(previous) = self.animation.replace(OpacityTween::new(
            self.current,
            target,
            now,
            self.animation_ms,
        )) {
            debug!(replaced_target = previous.target, target, "Opacity animation superseded");
        } else {
            debug!(from = self.current, target, "Opacity animation started");
        }
    }

    /// Pointer moved: track it, restart the idle countdown, re-resolve at once
    pub fn pointer_moved(&mut self, now: Millis, point: Point, store: &WidgetStore) {
        self.pointer = Some(point);
        self.pointer_idle = false;
        self.mouse_idle.arm(now, self.settings.mouse_idle_ms);
        self.update_opacity(now, store);
    }

    /// Fire the mouse-idle task if due; returns whether the pointer just went idle
    pub fn on_timer(&mut self, now: Millis, store: &WidgetStore) -> bool {
        if !self.mouse_idle.fire_if_due(now) {
            return false;
        }
        debug!("Pointer idle");
        self.pointer_idle = true;
        self.update_opacity(now, store);
        true
    }

    /// Advance the running animation by one display frame
    ///
    /// A failed surface write is logged and ignored; the internal value keeps
    /// advancing so the next successful write catches up.
    pub fn frame(&mut self, now: Millis, surface: &mut dyn RenderSurface) -> Option<f64> {
        let tween = self.animation?;
        self.current = tween.value_at(now);
        if tween.is_finished(now) {
            self.animation = None;
        }
        let _ = surface
            .apply_opacity(self.current)
            .inspect_err(|err| debug!(error = %err, "Skipped opacity write"));
        Some(self.current)
    }

    /// Animate to an explicit value, bypassing the rules
    pub fn set_opacity(&mut self, now: Millis, opacity: f64) {
        self.animate_to(now, opacity.clamp(0.0, 1.0));
    }

    pub fn fade_in(&mut self, now: Millis) {
        self.animate_to(now, 1.0);
    }

    pub fn fade_out(&mut self, now: Millis) {
        self.animate_to(now, 0.0);
    }

    /// Return control to the rule table
    pub fn reset_opacity(&mut self, now: Millis, store: &WidgetStore) {
        self.update_opacity(now, store);
    }

    /// Cancel the animation and idle countdown
    pub fn teardown(&mut self) {
        self.animation = None;
        self.mouse_idle.cancel();
    }
}
