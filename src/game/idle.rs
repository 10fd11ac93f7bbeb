//! Idle Activity Monitor
//!
//! Two-state machine (`Active` / `Idle`) driven by pointer activity and a
//! periodic check. The periodic check is virtual: [`IdleMonitor::poll`] only
//! evaluates once per `check_interval_ms`, whatever the caller's tick rate, and
//! does nothing while stopped. Starting and stopping leaves nothing behind.

use serde::{Deserialize, Serialize};

use crate::core::clock::Millis;

/// Idle detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Inactivity before the player counts as idle.
    pub threshold_ms: Millis,
    /// Granularity of the periodic check.
    pub check_interval_ms: Millis,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            threshold_ms: 3000,
            check_interval_ms: 500,
        }
    }
}

/// Player activity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityState {
    /// Recent pointer activity.
    Active,
    /// No activity for at least the threshold.
    Idle,
}

/// Transition reported by the monitor. At most one per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleEvent {
    /// Crossed the idle threshold.
    BecameIdle {
        /// Time since the last activity when detected.
        idle_for: Millis,
    },
    /// Activity while idle.
    BecameActive,
}

/// Inactivity detector for one round.
#[derive(Debug, Clone)]
pub struct IdleMonitor {
    config: IdleConfig,
    state: ActivityState,
    running: bool,
    last_activity: Millis,
    next_check: Millis,
}

impl IdleMonitor {
    /// Create a stopped monitor.
    pub fn new(config: IdleConfig) -> Self {
        Self {
            config,
            state: ActivityState::Active,
            running: false,
            last_activity: 0,
            next_check: 0,
        }
    }

    /// Begin periodic checking. No-op when already running.
    pub fn start(&mut self, now: Millis) {
        if self.running {
            return;
        }
        self.running = true;
        self.state = ActivityState::Active;
        self.last_activity = now;
        self.next_check = now + self.config.check_interval_ms;
    }

    /// Halt periodic checking.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Re-arm as if just started, keeping the running flag.
    pub fn reset(&mut self, now: Millis) {
        self.state = ActivityState::Active;
        self.last_activity = now;
        self.next_check = now + self.config.check_interval_ms;
    }

    /// Record pointer activity.
    ///
    /// Returns [`IdleEvent::BecameActive`] when this ends an idle episode.
    pub fn record_activity(&mut self, now: Millis) -> Option<IdleEvent> {
        self.last_activity = now;
        if self.state == ActivityState::Idle {
            self.state = ActivityState::Active;
            return Some(IdleEvent::BecameActive);
        }
        None
    }

    /// Periodic check. Fires [`IdleEvent::BecameIdle`] once per idle episode.
    pub fn poll(&mut self, now: Millis) -> Option<IdleEvent> {
        if !self.running || now < self.next_check {
            return None;
        }
        self.next_check = now + self.config.check_interval_ms;

        let elapsed = now.saturating_sub(self.last_activity);
        if self.state == ActivityState::Active && elapsed >= self.config.threshold_ms {
            self.state = ActivityState::Idle;
            return Some(IdleEvent::BecameIdle { idle_for: elapsed });
        }
        None
    }

    /// Current state.
    pub fn state(&self) -> ActivityState {
        self.state
    }

    /// Whether currently idle.
    pub fn is_idle(&self) -> bool {
        self.state == ActivityState::Idle
    }

    /// Whether the periodic check is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time since last activity while idle, zero while active.
    pub fn idle_time(&self, now: Millis) -> Millis {
        if self.is_idle() {
            now.saturating_sub(self.last_activity)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> IdleMonitor {
        IdleMonitor::new(IdleConfig::default())
    }

    #[test]
    fn test_becomes_idle_after_threshold() {
        let mut m = monitor();
        m.start(0);
        assert_eq!(m.poll(500), None);
        assert_eq!(m.poll(2500), None);
        assert_eq!(m.poll(3000), Some(IdleEvent::BecameIdle { idle_for: 3000 }));
        assert!(m.is_idle());
        assert_eq!(m.idle_time(4200), 4200);
    }

    #[test]
    fn test_idle_fires_once_per_episode() {
        let mut m = monitor();
        m.start(0);
        let fired: Vec<_> = (1..=40).filter_map(|i| m.poll(i * 500)).collect();
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn test_activity_ends_episode() {
        let mut m = monitor();
        m.start(0);
        m.poll(3000);
        assert_eq!(m.record_activity(3100), Some(IdleEvent::BecameActive));
        assert_eq!(m.record_activity(3200), None);
        assert_eq!(m.idle_time(3300), 0);

        // A second episode fires again.
        assert_eq!(m.poll(5500), None);
        assert_eq!(m.poll(6200), Some(IdleEvent::BecameIdle { idle_for: 3000 }));
    }

    #[test]
    fn test_check_granularity() {
        let mut m = monitor();
        m.start(0);
        // Threshold crossed at 3000 but the check after 2600 is due at 3100.
        assert_eq!(m.poll(2600), None);
        assert_eq!(m.poll(3000), None);
        assert!(matches!(m.poll(3100), Some(IdleEvent::BecameIdle { .. })));
    }

    #[test]
    fn test_stopped_monitor_never_fires() {
        let mut m = monitor();
        for i in 0..100 {
            m.start(i * 10);
            m.stop();
        }
        assert!(!m.is_running());
        assert_eq!(m.poll(1_000_000), None);
    }

    #[test]
    fn test_reset_rearms() {
        let mut m = monitor();
        m.start(0);
        m.poll(3000);
        assert!(m.is_idle());
        m.reset(10_000);
        assert_eq!(m.state(), ActivityState::Active);
        assert_eq!(m.poll(12_000), None);
        assert!(matches!(m.poll(13_000), Some(IdleEvent::BecameIdle { .. })));
    }

    #[test]
    fn test_start_twice_keeps_first_timestamp() {
        let mut m = monitor();
        m.start(0);
        m.start(2000);
        assert!(matches!(m.poll(3000), Some(IdleEvent::BecameIdle { idle_for: 3000 })));
    }
}
