//! Elapsed-time gates and tick-driven phase clocks.
//!
//! This module provides:
//! - `Cooldown`, a countdown that gates an action until it has elapsed
//! - `PhaseClock`, a small state holder for multi-step timed actions
//!
//! Everything here advances only when the owner calls `tick`, so timed
//! behaviour stays deterministic under a fixed-step simulation.

use serde::{Deserialize, Serialize};

/// A countdown gate. Ready once the remaining time reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cooldown {
    duration: f32,
    remaining: f32,
}

impl Cooldown {
    /// Create a cooldown that is ready immediately.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            remaining: 0.0,
        }
    }

    /// Create a cooldown that starts armed.
    #[must_use]
    pub fn armed(duration: f32) -> Self {
        let mut cooldown = Self::new(duration);
        cooldown.trigger();
        cooldown
    }

    /// Configured duration.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds until ready.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Whether the gate is open.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Arm the gate for the full duration.
    pub fn trigger(&mut self) {
        self.remaining = self.duration;
    }

    /// Arm the gate for a specific time instead of the configured duration.
    pub fn trigger_for(&mut self, seconds: f32) {
        self.remaining = seconds.max(0.0);
    }

    /// Open the gate immediately.
    pub fn reset(&mut self) {
        self.remaining = 0.0;
    }

    /// Advance time. Returns true on the tick the gate opens.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining <= 0.0
    }

    /// Fraction of the duration already elapsed (1.0 when ready).
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Current phase of a multi-step timed action plus time spent in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseClock<P> {
    phase: P,
    elapsed: f32,
}

impl<P: Copy + PartialEq> PhaseClock<P> {
    /// Start in `phase` with no elapsed time.
    #[must_use]
    pub fn new(phase: P) -> Self {
        Self { phase, elapsed: 0.0 }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> P {
        self.phase
    }

    /// Seconds spent in the current phase.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Check the current phase.
    #[must_use]
    pub fn is(&self, phase: P) -> bool {
        self.phase == phase
    }

    /// Add time to the current phase.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Jump to `phase`, discarding elapsed time.
    pub fn enter(&mut self, phase: P) {
        self.phase = phase;
        self.elapsed = 0.0;
    }

    /// Leave the current phase after `duration` seconds, carrying the
    /// overshoot into `next`. Returns false if the phase has not finished.
    pub fn try_complete(&mut self, duration: f32, next: P) -> bool {
        if self.elapsed < duration {
            return false;
        }
        self.elapsed -= duration.max(0.0);
        self.phase = next;
        true
    }

    /// Fraction of `duration` spent in the current phase.
    #[must_use]
    pub fn progress(&self, duration: f32) -> f32 {
        if duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / duration).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Step {
        First,
        Second,
    }

    #[test]
    fn test_cooldown_gate() {
        let mut cd = Cooldown::new(1.5);
        assert!(cd.is_ready());

        cd.trigger();
        assert!(!cd.is_ready());
        assert!(!cd.tick(1.0));
        assert!(cd.tick(0.5));
        assert!(cd.is_ready());
        assert!(!cd.tick(0.5));
    }

    #[test]
    fn test_cooldown_progress() {
        let mut cd = Cooldown::armed(2.0);
        assert_eq!(cd.progress(), 0.0);
        cd.tick(1.0);
        assert!((cd.progress() - 0.5).abs() < 1e-6);
        cd.reset();
        assert_eq!(cd.progress(), 1.0);
    }

    #[test]
    fn test_zero_duration_cooldown_never_blocks() {
        let mut cd = Cooldown::new(0.0);
        cd.trigger();
        assert!(cd.is_ready());
    }

    #[test]
    fn test_phase_clock_carries_overshoot() {
        let mut clock = PhaseClock::new(Step::First);
        clock.advance(0.35);
        assert!(clock.try_complete(0.3, Step::Second));
        assert!(clock.is(Step::Second));
        assert!((clock.elapsed() - 0.05).abs() < 1e-6);
        assert!(!clock.try_complete(0.3, Step::First));
    }
}
