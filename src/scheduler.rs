//! Cancelable one-shot timers driven by an external clock
//!
//! Every debounce/idle/long-press timer in the engines is a `ScheduledTask`
//! owned by the engine instance. Arming an armed task replaces the pending
//! deadline, so a stale callback can never fire. Time is a monotonic
//! millisecond counter supplied by the host.

/// Monotonic milliseconds
pub type Millis = u64;

#[derive(Debug, Clone, Default)]
pub struct ScheduledTask {
    name: &'static str,
    deadline: Option<Millis>,
}

impl ScheduledTask {
    pub const fn new(name: &'static str) -> Self {
        Self { name, deadline: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Arm (or re-arm) the task to fire `delay` ms after `now`
    pub fn arm(&mut self, now: Millis, delay: Millis) {
        self.deadline = Some(now.saturating_add(delay));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    /// Disarm and report `true` if the deadline has passed
    pub fn fire_if_due(&mut self, now: Millis) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest deadline among a set of tasks
pub fn next_deadline<'a>(tasks: impl IntoIterator<Item = &'a ScheduledTask>) -> Option<Millis> {
    tasks.into_iter().filter_map(ScheduledTask::deadline).min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_at_deadline() {
        let mut task = ScheduledTask::new("idle");
        task.arm(100, 50);
        assert!(!task.fire_if_due(149));
        assert!(task.fire_if_due(150));
        assert!(!task.fire_if_due(500));
        assert!(!task.is_armed());
    }

    #[test]
    fn test_rearm_supersedes_pending() {
        let mut task = ScheduledTask::new("debounce");
        task.arm(0, 500);
        task.arm(400, 500);
        assert!(!task.fire_if_due(500));
        assert!(task.fire_if_due(900));
    }

    #[test]
    fn test_cancel() {
        let mut task = ScheduledTask::new("long-press");
        task.arm(0, 1000);
        task.cancel();
        assert!(!task.fire_if_due(5000));
        assert_eq!(task.deadline(), None);
    }

    #[test]
    fn test_next_deadline() {
        let mut a = ScheduledTask::new("a");
        let mut b = ScheduledTask::new("b");
        let c = ScheduledTask::new("c");
        a.arm(0, 300);
        b.arm(0, 100);
        assert_eq!(next_deadline([&a, &b, &c]), Some(100));
        assert_eq!(next_deadline([&c]), None);
    }
}
