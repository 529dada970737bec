//! Context awareness
//!
//! Keeps `WidgetContext` current: time of day from the local clock, user
//! activity from input timing, and whatever the host reports about network,
//! battery, load and screen.

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::context as consts;
use crate::scheduler::{Millis, ScheduledTask};
use crate::store::{NetworkStatus, SystemLoad, TimeOfDay, UserActivity, WidgetStore};
use crate::types::ScreenSize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    pub user_idle_ms: Millis,
    pub refresh_ms: Millis,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            user_idle_ms: consts::USER_IDLE_MS,
            refresh_ms: consts::REFRESH_MS,
        }
    }
}

/// Hour of the local wall clock
pub fn local_hour() -> u32 {
    Local::now().hour()
}

pub struct ContextMonitor {
    settings: ContextSettings,
    hour_source: Box<dyn Fn() -> u32>,
    user_idle: ScheduledTask,
    refresh: ScheduledTask,
}

impl std::fmt::Debug for ContextMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextMonitor")
            .field("settings", &self.settings)
            .field("user_idle", &self.user_idle)
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}

impl ContextMonitor {
    pub fn new(settings: ContextSettings) -> Self {
        Self::with_hour_source(settings, local_hour)
    }

    /// Monitor reading the hour from `source` instead of the local clock
    pub fn with_hour_source(
        mut settings: ContextSettings,
        source: impl Fn() -> u32 + 'static,
    ) -> Self {
        // The refresh task re-arms itself, so a zero period never lets time advance
        if settings.refresh_ms == 0 {
            warn!(fallback = consts::REFRESH_MS, "Context refresh period of 0 ms, using default");
            settings.refresh_ms = consts::REFRESH_MS;
        }
        Self {
            settings,
            hour_source: Box::new(source),
            user_idle: ScheduledTask::new("user-idle"),
            refresh: ScheduledTask::new("context-refresh"),
        }
    }

    pub fn user_idle_task(&self) -> &ScheduledTask {
        &self.user_idle
    }

    pub fn refresh_task(&self) -> &ScheduledTask {
        &self.refresh
    }

    /// Initial refresh and timers
    pub fn start(&mut self, now: Millis, store: &mut WidgetStore) {
        self.refresh(store);
        self.refresh.arm(now, self.settings.refresh_ms);
        self.user_idle.arm(now, self.settings.user_idle_ms);
    }

    /// Re-derive the clock-based fields
    pub fn refresh(&self, store: &mut WidgetStore) {
        let time_of_day = TimeOfDay::from_hour((self.hour_source)());
        store.update_context(|ctx| ctx.time_of_day = time_of_day);
    }

    /// Pointer, key or touch input: back to active, restart the idle countdown
    pub fn record_activity(&mut self, now: Millis, store: &mut WidgetStore) {
        if store.context().user_activity == UserActivity::Idle {
            debug!("User active again");
            store.update_context(|ctx| ctx.user_activity = UserActivity::Active);
        }
        self.user_idle.arm(now, self.settings.user_idle_ms);
    }

    /// Fire due tasks
    pub fn on_timer(&mut self, now: Millis, store: &mut WidgetStore) {
        if self.user_idle.fire_if_due(now) {
            info!("User idle");
            store.update_context(|ctx| ctx.user_activity = UserActivity::Idle);
        }
        if self.refresh.fire_if_due(now) {
            self.refresh(store);
            self.refresh.arm(now, self.settings.refresh_ms);
        }
    }

    pub fn set_online(&self, online: bool, store: &mut WidgetStore) {
        let status = if online {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        };
        store.update_context(|ctx| ctx.network_status = status);
    }

    pub fn set_network_status(&self, status: NetworkStatus, store: &mut WidgetStore) {
        store.update_context(|ctx| ctx.network_status = status);
    }

    /// `None` when the host lost access to the battery
    pub fn set_battery_level(&self, level: Option<f64>, store: &mut WidgetStore) {
        let level = level.filter(|l| l.is_finite()).map(|l| l.clamp(0.0, 1.0));
        store.update_context(|ctx| ctx.battery_level = level);
    }

    pub fn set_system_load(&self, load: SystemLoad, store: &mut WidgetStore) {
        store.update_context(|ctx| ctx.system_load = load);
    }

    pub fn resize(&self, screen: ScreenSize, multi_monitor: bool, store: &mut WidgetStore) {
        store.update_context(|ctx| {
            ctx.screen = screen;
            ctx.multi_monitor = multi_monitor;
        });
    }

    pub fn teardown(&mut self) {
        self.user_idle.cancel();
        self.refresh.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn monitor_at(hour: u32) -> ContextMonitor {
        ContextMonitor::with_hour_source(ContextSettings::default(), move || hour)
    }

    #[test]
    fn test_start_derives_time_of_day() {
        let mut store = WidgetStore::default();
        let mut monitor = monitor_at(23);
        monitor.start(0, &mut store);
        assert_eq!(store.context().time_of_day, TimeOfDay::Night);
        assert_eq!(monitor.refresh_task().deadline(), Some(30_000));
        assert_eq!(monitor.user_idle_task().deadline(), Some(300_000));
    }

    #[test]
    fn test_zero_refresh_period_falls_back() {
        let settings = ContextSettings {
            refresh_ms: 0,
            ..ContextSettings::default()
        };
        let mut store = WidgetStore::default();
        let mut monitor = ContextMonitor::with_hour_source(settings, || 10);
        monitor.start(0, &mut store);
        assert_eq!(monitor.refresh_task().deadline(), Some(30_000));
        monitor.on_timer(30_000, &mut store);
        assert_eq!(monitor.refresh_task().deadline(), Some(60_000));
    }

    #[test]
    fn test_idle_after_five_minutes_and_back() {
        let mut store = WidgetStore::default();
        let mut monitor = monitor_at(10);
        monitor.start(0, &mut store);

        monitor.record_activity(1000, &mut store);
        monitor.on_timer(300_999, &mut store);
        assert_eq!(store.context().user_activity, UserActivity::Active);
        monitor.on_timer(301_000, &mut store);
        assert_eq!(store.context().user_activity, UserActivity::Idle);

        monitor.record_activity(302_000, &mut store);
        assert_eq!(store.context().user_activity, UserActivity::Active);
    }

    #[test]
    fn test_periodic_refresh_follows_clock() {
        let hour = Rc::new(Cell::new(16));
        let source = Rc::clone(&hour);
        let mut monitor =
            ContextMonitor::with_hour_source(ContextSettings::default(), move || source.get());
        let mut store = WidgetStore::default();
        monitor.start(0, &mut store);
        assert_eq!(store.context().time_of_day, TimeOfDay::Afternoon);

        hour.set(17);
        monitor.on_timer(30_000, &mut store);
        assert_eq!(store.context().time_of_day, TimeOfDay::Evening);
        assert_eq!(monitor.refresh_task().deadline(), Some(60_000));
    }

    #[test]
    fn test_battery_is_clamped_or_unknown() {
        let mut store = WidgetStore::default();
        let monitor = monitor_at(10);
        monitor.set_battery_level(Some(1.7), &mut store);
        assert_eq!(store.context().battery_level, Some(1.0));
        monitor.set_battery_level(Some(f64::NAN), &mut store);
        assert_eq!(store.context().battery_level, None);
    }

    #[test]
    fn test_online_offline() {
        let mut store = WidgetStore::default();
        let monitor = monitor_at(10);
        monitor.set_online(false, &mut store);
        assert_eq!(store.context().network_status, NetworkStatus::Offline);
        monitor.set_online(true, &mut store);
        assert_eq!(store.context().network_status, NetworkStatus::Online);
    }

    #[test]
    fn test_teardown_cancels_timers() {
        let mut store = WidgetStore::default();
        let mut monitor = monitor_at(10);
        monitor.start(0, &mut store);
        monitor.teardown();
        assert!(!monitor.user_idle_task().is_armed());
        assert!(!monitor.refresh_task().is_armed());
    }
}
