//! Dark-realm survival timer.
//!
//! A cancellable countdown advanced by frame deltas:
//!
//! | From | Event | To |
//! |------|-------|----|
//! | `Stopped` | `start` | `Running` (elapsed 0) |
//! | `Running` | `tick` reaches duration | `Expired` (reported once) |
//! | any | `cancel` | `Stopped` |
//!
//! ```
//! use realmshift_logic::timer::{SurvivalTimer, TimerEvent};
//!
//! let mut timer = SurvivalTimer::default();
//! timer.start(1.0);
//! assert_eq!(timer.tick(0.6), TimerEvent::Counting);
//! assert_eq!(timer.tick(0.6), TimerEvent::Expired);
//! assert_eq!(timer.tick(0.6), TimerEvent::Idle);
//! ```

use serde::{Deserialize, Serialize};

/// Countdown state. Owned by the dimension state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SurvivalTimer {
    #[default]
    Stopped,
    Running {
        elapsed: f32,
        duration: f32,
    },
    Expired,
}

/// What a single `tick` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Not running, nothing happened.
    Idle,
    /// Still counting down.
    Counting,
    /// Reached zero on this tick.
    Expired,
}

/// Values for the on-screen countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerReadout {
    /// Slider value: seconds left.
    pub slider: f32,
    /// Seconds left, two decimals.
    pub text: String,
}

impl SurvivalTimer {
    /// Fresh countdown, never carrying over elapsed time.
    pub fn start(&mut self, duration: f32) {
        *self = SurvivalTimer::Running {
            elapsed: 0.0,
            duration: duration.max(0.0),
        };
    }

    pub fn cancel(&mut self) {
        *self = SurvivalTimer::Stopped;
    }

    pub fn is_running(&self) -> bool {
        matches!(self, SurvivalTimer::Running { .. })
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, SurvivalTimer::Expired)
    }

    /// Advance by one frame delta.
    pub fn tick(&mut self, dt: f32) -> TimerEvent {
        match self {
            SurvivalTimer::Running { elapsed, duration } => {
                *elapsed += dt.max(0.0);
                if *elapsed >= *duration {
                    *self = SurvivalTimer::Expired;
                    TimerEvent::Expired
                } else {
                    TimerEvent::Counting
                }
            }
            SurvivalTimer::Stopped | SurvivalTimer::Expired => TimerEvent::Idle,
        }
    }

    /// Seconds left while running.
    pub fn remaining(&self) -> Option<f32> {
        match *self {
            SurvivalTimer::Running { elapsed, duration } => Some((duration - elapsed).max(0.0)),
            _ => None,
        }
    }

    /// Fraction of the countdown used up, 0.0..=1.0.
    pub fn progress(&self) -> Option<f32> {
        match *self {
            SurvivalTimer::Running { elapsed, duration } if duration > 0.0 => {
                Some((elapsed / duration).clamp(0.0, 1.0))
            }
            SurvivalTimer::Running { .. } | SurvivalTimer::Expired => Some(1.0),
            SurvivalTimer::Stopped => None,
        }
    }

    /// HUD values while running; `None` hides the countdown.
    pub fn readout(&self) -> Option<TimerReadout> {
        self.remaining().map(|left| TimerReadout {
            slider: left,
            text: format!("{:.2}", left),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stopped() {
        let mut timer = SurvivalTimer::default();
        assert_eq!(timer, SurvivalTimer::Stopped);
        assert_eq!(timer.tick(1.0), TimerEvent::Idle);
        assert!(timer.remaining().is_none());
        assert!(timer.readout().is_none());
    }

    #[test]
    fn test_start_is_fresh() {
        let mut timer = SurvivalTimer::default();
        timer.start(5.0);
        timer.tick(3.0);
        timer.start(5.0);
        assert_eq!(timer.remaining(), Some(5.0));
    }

    #[test]
    fn test_expires_once() {
        let mut timer = SurvivalTimer::default();
        timer.start(1.0);
        assert_eq!(timer.tick(0.5), TimerEvent::Counting);
        assert_eq!(timer.tick(0.5), TimerEvent::Expired);
        assert!(timer.is_expired());
        for _ in 0..10 {
            assert_eq!(timer.tick(0.5), TimerEvent::Idle);
        }
    }

    #[test]
    fn test_zero_duration_expires_first_tick() {
        let mut timer = SurvivalTimer::default();
        timer.start(0.0);
        assert_eq!(timer.tick(0.0), TimerEvent::Expired);
    }

    #[test]
    fn test_cancel_from_any_state() {
        let mut timer = SurvivalTimer::default();
        timer.start(1.0);
        timer.cancel();
        assert_eq!(timer, SurvivalTimer::Stopped);
        timer.start(0.1);
        timer.tick(1.0);
        timer.cancel();
        assert_eq!(timer, SurvivalTimer::Stopped);
    }

    #[test]
    fn test_negative_dt_ignored() {
        let mut timer = SurvivalTimer::default();
        timer.start(1.0);
        timer.tick(-5.0);
        assert_eq!(timer.remaining(), Some(1.0));
    }

    #[test]
    fn test_progress() {
        let mut timer = SurvivalTimer::default();
        assert_eq!(timer.progress(), None);
        timer.start(4.0);
        timer.tick(1.0);
        assert_eq!(timer.progress(), Some(0.25));
        timer.tick(10.0);
        assert_eq!(timer.progress(), Some(1.0));
    }

    #[test]
    fn test_readout_two_decimals() {
        let mut timer = SurvivalTimer::default();
        timer.start(10.0);
        timer.tick(2.5);
        let readout = timer.readout().unwrap();
        assert_eq!(readout.text, "7.50");
        assert!((readout.slider - 7.5).abs() < 1e-6);
    }
}
