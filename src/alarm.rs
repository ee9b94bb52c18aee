//! Single daily alarm with timed auto-silence.
//!
//! The alarm is checked once per elapsed second, after the clock has advanced.
//! An idle alarm starts ringing when the current time equals the alarm time in
//! all four digits. A ringing alarm counts the seconds since it started and
//! falls silent once the count reaches the configured ring duration.
//!
//! Matching only happens from [`AlarmState::Idle`], so a time that still
//! matches on the next check cannot restart the ring.

use crate::time::BcdTime;

/// Default ring duration in seconds.
pub const ALARM_RING_SECONDS: u8 = 30;

/// Ringing sub-state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmState {
    #[default]
    Idle,
    /// Seconds elapsed since the alarm started.
    Ringing { seconds: u8 },
}

/// Transitions reported by [`Alarm::check`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmEvent {
    /// Idle -> ringing. The alarm output should be asserted.
    Started,
    /// Ringing -> idle. The alarm output should be released.
    Silenced,
}

/// Alarm time plus its ringing state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm {
    time: BcdTime,
    state: AlarmState,
    ring_seconds: u8,
}

impl Alarm {
    /// An idle alarm at `time` that rings for `ring_seconds`.
    pub const fn new(time: BcdTime, ring_seconds: u8) -> Self {
        Self {
            time,
            state: AlarmState::Idle,
            ring_seconds,
        }
    }

    pub const fn time(&self) -> BcdTime {
        self.time
    }

    pub const fn state(&self) -> AlarmState {
        self.state
    }

    pub const fn is_ringing(&self) -> bool {
        matches!(self.state, AlarmState::Ringing { .. })
    }

    /// Runs one second of the alarm state machine against the current time.
    pub fn check(&mut self, now: &BcdTime) -> Option<AlarmEvent> {
        match self.state {
            AlarmState::Idle if *now == self.time => {
                self.state = AlarmState::Ringing { seconds: 0 };
                Some(AlarmEvent::Started)
            }
            AlarmState::Idle => None,
            AlarmState::Ringing { seconds } => {
                let seconds = seconds.saturating_add(1);
                if seconds >= self.ring_seconds {
                    self.state = AlarmState::Idle;
                    Some(AlarmEvent::Silenced)
                } else {
                    self.state = AlarmState::Ringing { seconds };
                    None
                }
            }
        }
    }
}

impl Default for Alarm {
    fn default() -> Self {
        Self::new(BcdTime::MIDNIGHT, ALARM_RING_SECONDS)
    }
}
