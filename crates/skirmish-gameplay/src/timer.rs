//! Simulation-time countdowns.
//!
//! Nothing in the simulation waits on a wall clock. Every timed effect (dash
//! length, telegraph, invulnerability, post-evade window, burst and fatigue)
//! is a [`Countdown`] carried on its owner and advanced by the tick's `dt`.
//!
//! A countdown reports its zero crossing exactly once. Cancelling it before
//! the crossing suppresses the report entirely.

use serde::{Deserialize, Serialize};

/// Remaining-time counter that fires once when it reaches zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    remaining_ms: f32,
    running: bool,
}

impl Countdown {
    /// An idle countdown.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            remaining_ms: 0.0,
            running: false,
        }
    }

    /// A countdown already started with `duration_ms`.
    #[must_use]
    pub fn started(duration_ms: f32) -> Self {
        let mut countdown = Self::idle();
        countdown.start(duration_ms);
        countdown
    }

    /// (Re)starts the countdown.
    pub fn start(&mut self, duration_ms: f32) {
        self.remaining_ms = duration_ms.max(0.0);
        self.running = true;
    }

    /// Stops the countdown without firing.
    pub fn cancel(&mut self) {
        self.remaining_ms = 0.0;
        self.running = false;
    }

    /// Advances by `dt_ms`. Returns `true` on the tick that crosses zero.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        if !self.running {
            return false;
        }
        self.remaining_ms -= dt_ms;
        if self.remaining_ms <= 0.0 {
            self.remaining_ms = 0.0;
            self.running = false;
            return true;
        }
        false
    }

    /// Whether the countdown is still running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Milliseconds left; zero when idle.
    #[must_use]
    pub const fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }
}

/// Elapsed-time tracker for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTimer {
    elapsed_secs: f32,
    duration_secs: f32,
    completed: bool,
}

impl RunTimer {
    /// Creates a timer for a run of `duration_secs`.
    #[must_use]
    pub fn new(duration_secs: f32) -> Self {
        Self {
            elapsed_secs: 0.0,
            duration_secs: duration_secs.max(0.0),
            completed: false,
        }
    }

    /// Advances by `dt_ms`. Returns `true` once, on the tick the run time is used up.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        if self.completed {
            return false;
        }
        self.elapsed_secs = (self.elapsed_secs + dt_ms / 1000.0).min(self.duration_secs);
        if self.elapsed_secs >= self.duration_secs {
            self.completed = true;
            return true;
        }
        false
    }

    /// Seconds elapsed since the run started.
    #[must_use]
    pub const fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds left before the run completes.
    #[must_use]
    pub fn remaining_secs(&self) -> f32 {
        (self.duration_secs - self.elapsed_secs).max(0.0)
    }

    /// Configured run length.
    #[must_use]
    pub const fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    /// Whether the full duration has elapsed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed
    }

    /// Formats the remaining time as `M:SS`.
    #[must_use]
    pub fn format_remaining(&self) -> String {
        let secs = self.remaining_secs().ceil() as u32;
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_fires_exactly_once() {
        let mut c = Countdown::started(180.0);
        assert!(!c.tick(100.0));
        assert!(c.tick(100.0));
        assert!(!c.tick(100.0));
        assert!(!c.is_running());
    }

    #[test]
    fn test_countdown_cancel_suppresses_fire() {
        let mut c = Countdown::started(50.0);
        c.cancel();
        assert!(!c.tick(100.0));
        assert_eq!(c.remaining_ms(), 0.0);
    }

    #[test]
    fn test_countdown_restart() {
        let mut c = Countdown::started(10.0);
        assert!(c.tick(10.0));
        c.start(20.0);
        assert!(c.is_running());
        assert!(!c.tick(10.0));
        assert!(c.tick(10.0));
    }

    #[test]
    fn test_run_timer_completes_once() {
        let mut timer = RunTimer::new(1.0);
        assert!(!timer.tick(500.0));
        assert!(timer.tick(600.0));
        assert!(timer.is_complete());
        assert!(!timer.tick(16.0));
        assert_eq!(timer.elapsed_secs(), 1.0);
    }

    #[test]
    fn test_run_timer_format() {
        let mut timer = RunTimer::new(120.0);
        assert_eq!(timer.format_remaining(), "2:00");
        timer.tick(45_500.0);
        assert_eq!(timer.format_remaining(), "1:15");
    }
}
