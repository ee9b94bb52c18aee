//! Clock state owned by the control loop.
//!
//! [`ClockState`] holds the time, the alarm, the display mode, the format
//! button debouncer and the second counter. It has no hardware access: the
//! controller feeds it button samples and ticks and acts on what it returns.

use crate::alarm::{Alarm, AlarmEvent};
use crate::button::{ButtonEdge, Debouncer};
use crate::time::{to_display, BcdTime, TimeRepresentation};
use crate::Config;

/// Counts loop ticks and reports each completed second.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecondCounter {
    ticks: u32,
    ticks_per_second: u32,
}

impl SecondCounter {
    pub const fn new(ticks_per_second: u32) -> Self {
        Self {
            ticks: 0,
            ticks_per_second,
        }
    }

    /// Ticks counted toward the current second.
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Counts one tick. Returns `true` when it completes a second.
    pub fn tick(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks >= self.ticks_per_second {
            self.ticks = 0;
            true
        } else {
            false
        }
    }
}

/// What happened when a second elapsed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecondEvent {
    /// The time after advancing.
    pub time: BcdTime,
    /// Alarm transition caused by this second, if any.
    pub alarm: Option<AlarmEvent>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockState {
    time: BcdTime,
    alarm: Alarm,
    mode: TimeRepresentation,
    button: Debouncer,
    seconds: SecondCounter,
}

impl ClockState {
    /// Power-on state: 00:00, alarm idle, mode and thresholds from `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            time: BcdTime::MIDNIGHT,
            alarm: Alarm::new(config.alarm, config.ring_seconds),
            mode: config.time_representation,
            button: Debouncer::new(config.debounce_ticks),
            seconds: SecondCounter::new(config.ticks_per_second()),
        }
    }

    pub const fn time(&self) -> BcdTime {
        self.time
    }

    pub const fn alarm(&self) -> &Alarm {
        &self.alarm
    }

    pub const fn mode(&self) -> TimeRepresentation {
        self.mode
    }

    pub const fn button(&self) -> &Debouncer {
        &self.button
    }

    pub const fn seconds(&self) -> &SecondCounter {
        &self.seconds
    }

    /// Feeds one format-button sample; a confirmed press toggles the display mode.
    pub fn sample_button(&mut self, pressed: bool) -> Option<ButtonEdge> {
        let edge = self.button.update(pressed);
        if edge == Some(ButtonEdge::Pressed) {
            self.mode = self.mode.toggled();
            debug!("display mode: {:?}", self.mode);
        }
        edge
    }

    /// Hour digits `(tens, ones)` in the current display mode.
    pub fn display_hours(&self) -> (u8, u8) {
        to_display(self.time.hour_tens(), self.time.hour_ones(), self.mode)
    }

    /// Day-period indicator, from the 24-hour time regardless of display mode.
    pub const fn is_am(&self) -> bool {
        self.time.is_am()
    }

    /// Counts one loop tick; runs [`ClockState::on_second`] when a second completes.
    pub fn tick(&mut self) -> Option<SecondEvent> {
        if self.seconds.tick() {
            Some(self.on_second())
        } else {
            None
        }
    }

    /// Advances the time, then runs the alarm check.
    pub fn on_second(&mut self) -> SecondEvent {
        self.time.advance();
        let alarm = self.alarm.check(&self.time);
        match alarm {
            Some(AlarmEvent::Started) => {
                info!(
                    "alarm ringing at {}{}:{}{}",
                    self.time.hour_tens(),
                    self.time.hour_ones(),
                    self.time.minutes_tens(),
                    self.time.minutes_ones()
                );
            }
            Some(AlarmEvent::Silenced) => info!("alarm silenced"),
            None => {}
        }
        SecondEvent {
            time: self.time,
            alarm,
        }
    }
}
