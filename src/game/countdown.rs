//! Round Countdown
//!
//! A stopwatch against a fixed duration. Time only flows while running; a
//! stopped countdown keeps the elapsed value it had when stopped, which is what
//! the score reads.

use crate::core::clock::Millis;

/// Countdown for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    duration: Millis,
    started_at: Option<Millis>,
    /// Frozen elapsed time once stopped.
    frozen: Option<Millis>,
}

impl Countdown {
    /// Idle countdown of `duration`.
    pub fn new(duration: Millis) -> Self {
        Self {
            duration,
            started_at: None,
            frozen: None,
        }
    }

    /// Start from zero, discarding any previous run.
    pub fn start(&mut self, now: Millis) {
        self.started_at = Some(now);
        self.frozen = None;
    }

    /// Stop and freeze elapsed time. No-op when not running.
    pub fn stop(&mut self, now: Millis) {
        if self.is_running() {
            self.frozen = Some(self.elapsed(now));
        }
    }

    /// Back to never-started.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.frozen = None;
    }

    /// Whether time is flowing.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.frozen.is_none()
    }

    /// Time used, capped at the duration.
    pub fn elapsed(&self, now: Millis) -> Millis {
        if let Some(frozen) = self.frozen {
            return frozen;
        }
        match self.started_at {
            Some(start) => now.saturating_sub(start).min(self.duration),
            None => 0,
        }
    }

    /// Time left.
    pub fn remaining(&self, now: Millis) -> Millis {
        self.duration - self.elapsed(now)
    }

    /// Whether a running countdown has reached zero.
    pub fn is_expired(&self, now: Millis) -> bool {
        self.is_running() && self.elapsed(now) >= self.duration
    }

    /// Configured duration.
    pub fn duration(&self) -> Millis {
        self.duration
    }
}
