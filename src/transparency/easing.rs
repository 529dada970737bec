//! Easing and opacity tweening

use crate::scheduler::Millis;

/// Cubic ease-out on a progress value, clamped to [0, 1]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// `start + (target - start) * ease_out_cubic(fraction)`
pub fn interpolate(start: f64, target: f64, fraction: f64) -> f64 {
    start + (target - start) * ease_out_cubic(fraction)
}

/// An in-flight opacity transition anchored on the host clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityTween {
    pub start: f64,
    pub target: f64,
    pub started_at: Millis,
    pub duration: Millis,
}

impl OpacityTween {
    pub fn new(start: f64, target: f64, started_at: Millis, duration: Millis) -> Self {
        Self {
            start,
            target,
            started_at,
            duration,
        }
    }

    /// Elapsed fraction at `now`; zero-length tweens are complete immediately
    pub fn progress(&self, now: Millis) -> f64 {
        if self.duration == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at) as f64;
        (elapsed / self.duration as f64).min(1.0)
    }

    /// Eased value at `now`; exactly `target` once the tween is complete
    pub fn value_at(&self, now: Millis) -> f64 {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.target;
        }
        interpolate(self.start, self.target, progress)
    }

    pub fn is_finished(&self, now: Millis) -> bool {
        self.progress(now) >= 1.0
    }
}
