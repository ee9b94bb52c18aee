//! Firmware core for a four-digit seven-segment clock with a daily alarm.
//!
//! The [`Controller`] owns a [`hardware::Gpio`] backend and a delay. Each
//! call to [`Controller::step`] samples the format button, lights one digit
//! of the multiplexed display, updates the AM indicator, waits one tick, and
//! once per second advances the clock and checks the alarm.
//!
//! ```rust,ignore
//! use segclock::{registers::MemoryMappedGpio, Config, Controller};
//!
//! let gpio = unsafe { MemoryMappedGpio::stm32l053() };
//! let mut clock = Controller::new(gpio, delay, Config::default())?;
//! clock.init()?;
//! clock.run()?;
//! ```
//!
//! Enable the `async` feature for [`asynch::Controller`], which waits with
//! `embedded-hal-async`. The `log` and `defmt` features route the crate's
//! diagnostics to the matching backend.
#![no_std]

#[macro_use]
mod fmt;

pub mod alarm;
pub mod button;
pub mod clock;
pub mod display;
pub mod hardware;
pub mod registers;
pub mod segments;
pub mod time;

mod engine;
#[cfg(test)]
mod sim;

#[cfg(feature = "async")]
pub mod asynch;

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

pub use crate::alarm::ALARM_RING_SECONDS;
use crate::clock::{ClockState, SecondEvent};
use crate::engine::Engine;
use crate::hardware::{Gpio, GpioSetup, Wiring};
use crate::segments::Polarity;
use crate::time::{BcdTime, TimeRepresentation};

/// Outer-loop delay on the reference board.
pub const TICK_INTERVAL_MS: u32 = 5;
/// Loop iterations per simulated second at [`TICK_INTERVAL_MS`].
pub const TICKS_PER_SECOND: u32 = 1000 / TICK_INTERVAL_MS;
/// Agreeing samples needed before a button change is accepted.
pub const DEBOUNCE_TICKS: u8 = 5;
/// Factory alarm time, 03:05.
pub const DEFAULT_ALARM: BcdTime = match BcdTime::from_hm(3, 5) {
    Ok(time) => time,
    Err(_) => BcdTime::MIDNIGHT,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub time_representation: TimeRepresentation,
    pub alarm: BcdTime,
    pub tick_interval_ms: u32,
    pub debounce_ticks: u8,
    pub ring_seconds: u8,
    pub polarity: Polarity,
    pub wiring: Wiring,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_representation: TimeRepresentation::TwentyFourHour,
            alarm: DEFAULT_ALARM,
            tick_interval_ms: TICK_INTERVAL_MS,
            debounce_ticks: DEBOUNCE_TICKS,
            ring_seconds: ALARM_RING_SECONDS,
            polarity: Polarity::CommonCathode,
            wiring: Wiring::NUCLEO_L053,
        }
    }
}

impl Config {
    /// Loop iterations per second. Zero only for a config that fails [`Config::validate`].
    pub const fn ticks_per_second(&self) -> u32 {
        match self.tick_interval_ms {
            0 => 0,
            ms => 1000 / ms,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.tick_interval_ms {
            0 => return Err(ConfigError::ZeroTickInterval),
            ms if 1000 % ms != 0 => return Err(ConfigError::UnevenTickInterval(ms)),
            _ => {}
        }
        if self.debounce_ticks == 0 {
            return Err(ConfigError::ZeroDebounceTicks);
        }
        if self.ring_seconds == 0 {
            return Err(ConfigError::ZeroRingSeconds);
        }
        self.wiring.validate()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroTickInterval,
    /// The tick interval in milliseconds does not divide one second.
    UnevenTickInterval(u32),
    ZeroDebounceTicks,
    ZeroRingSeconds,
    /// The enable mask for this digit slot is not exactly one pin.
    DigitEnableNotSinglePin(usize),
    /// Eight segment lines shifted this far do not fit in a 16-pin bank.
    SegmentShiftTooLarge(u8),
    /// Two outputs, or an output and the button, share a pin.
    PinConflict,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroTickInterval => write!(f, "tick interval is zero"),
            ConfigError::UnevenTickInterval(ms) => {
                write!(f, "tick interval {ms} ms does not divide one second")
            }
            ConfigError::ZeroDebounceTicks => write!(f, "debounce threshold is zero"),
            ConfigError::ZeroRingSeconds => write!(f, "alarm ring duration is zero"),
            ConfigError::DigitEnableNotSinglePin(slot) => {
                write!(f, "digit {slot} enable is not a single pin")
            }
            ConfigError::SegmentShiftTooLarge(shift) => {
                write!(f, "segment shift {shift} does not fit in a bank")
            }
            ConfigError::PinConflict => write!(f, "pin assigned twice"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ClockError<E> {
    Gpio(E),
}

impl<E> From<E> for ClockError<E> {
    fn from(e: E) -> Self {
        ClockError::Gpio(e)
    }
}

/// Blocking clock controller.
#[derive(Debug)]
pub struct Controller<G, D> {
    engine: Engine<G>,
    delay: D,
}

impl<G: Gpio, D: DelayNs> Controller<G, D> {
    /// Checks `config` and builds the power-on state. Touches no hardware.
    pub fn new(gpio: G, delay: D, config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: Engine::new(gpio, config)?,
            delay,
        })
    }

    /// Runs one loop iteration. Returns the second's event when one elapsed.
    pub fn step(&mut self) -> Result<Option<SecondEvent>, ClockError<G::Error>> {
        self.engine.refresh()?;
        self.delay.delay_ms(self.engine.config.tick_interval_ms);
        Ok(self.engine.finish_tick()?)
    }

    /// Steps forever; returns only on a GPIO error.
    pub fn run(&mut self) -> Result<Infallible, ClockError<G::Error>> {
        loop {
            self.step()?;
        }
    }

    pub fn state(&self) -> &ClockState {
        &self.engine.state
    }

    pub fn gpio(&self) -> &G {
        &self.engine.gpio
    }

    pub fn config(&self) -> &Config {
        &self.engine.config
    }

    /// Gives back the GPIO backend and the delay.
    pub fn release(self) -> (G, D) {
        (self.engine.gpio, self.delay)
    }
}

impl<G: GpioSetup, D: DelayNs> Controller<G, D> {
    /// Enables the GPIO clocks, sets pin modes and blanks the display.
    pub fn init(&mut self) -> Result<(), ClockError<G::Error>> {
        Ok(self.engine.init()?)
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use crate::alarm::{AlarmEvent, AlarmState};
    use crate::hardware::{Bank, Pin, Pull};
    use crate::sim::{BusFault, DeadGpio, Op, SimGpio};
    use alloc::vec::Vec;
    use embedded_hal_mock::eh1::delay::NoopDelay;

    /// Records the total nanoseconds of each delay request.
    #[derive(Debug, Default)]
    struct RecordingDelay {
        total_ns: u64,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn controller(config: Config) -> Controller<SimGpio, NoopDelay> {
        let mut clock = Controller::new(SimGpio::default(), NoopDelay::new(), config).unwrap();
        clock.init().unwrap();
        clock
    }

    fn hm(hour: u8, minute: u8) -> BcdTime {
        BcdTime::from_hm(hour, minute).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ticks_per_second(), TICKS_PER_SECOND);
        assert_eq!(config.ticks_per_second(), 200);
        assert_eq!(config.alarm, hm(3, 5));
        assert_eq!(config.ring_seconds, 30);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cases = [
            (
                Config {
                    tick_interval_ms: 0,
                    ..Config::default()
                },
                ConfigError::ZeroTickInterval,
            ),
            (
                Config {
                    tick_interval_ms: 7,
                    ..Config::default()
                },
                ConfigError::UnevenTickInterval(7),
            ),
            (
                Config {
                    debounce_ticks: 0,
                    ..Config::default()
                },
                ConfigError::ZeroDebounceTicks,
            ),
            (
                Config {
                    ring_seconds: 0,
                    ..Config::default()
                },
                ConfigError::ZeroRingSeconds,
            ),
        ];
        for (config, expected) in cases {
            let result = Controller::new(SimGpio::default(), NoopDelay::new(), config);
            assert_eq!(result.err(), Some(expected));
        }
    }

    #[test]
    fn test_init_enables_each_bank_once() {
        let clock = controller(Config::default());
        let gpio = clock.gpio();
        for bank in Bank::ALL {
            assert_eq!(gpio.clock_enables(bank), 1);
        }
        assert!(gpio
            .ops
            .contains(&Op::Input(Bank::C, 1 << 13, Pull::None)));
        assert!(gpio.ops.contains(&Op::Output(Bank::B, 0x01FF)));
        assert!(gpio.ops.contains(&Op::Output(Bank::C, 0x0360)));
        assert!(gpio.ops.contains(&Op::Output(Bank::A, 1 << 5)));
        assert_eq!(gpio.output(Bank::C) & 0x0360, 0);
        assert!(!gpio.is_high(Wiring::NUCLEO_L053.alarm_led));
    }

    #[test]
    fn test_init_skips_unused_bank() {
        let wiring = Wiring {
            am_led: Pin::new(Bank::B, 9),
            ..Wiring::NUCLEO_L053
        };
        let clock = controller(Config {
            wiring,
            ..Config::default()
        });
        assert_eq!(clock.gpio().clock_enables(Bank::A), 0);
        assert_eq!(clock.gpio().clock_enables(Bank::B), 1);
        assert_eq!(clock.gpio().clock_enables(Bank::C), 1);
    }

    #[test]
    fn test_step_waits_one_tick() {
        let mut clock =
            Controller::new(SimGpio::default(), RecordingDelay::default(), Config::default())
                .unwrap();
        for _ in 0..3 {
            clock.step().unwrap();
        }
        let (_, delay) = clock.release();
        assert_eq!(delay.total_ns, 3 * 5_000_000);
    }

    #[test]
    fn test_one_second_per_200_steps() {
        let mut clock = controller(Config::default());
        for _ in 0..199 {
            assert_eq!(clock.step().unwrap(), None);
        }
        let event = clock.step().unwrap().unwrap();
        assert_eq!(event.time, hm(0, 1));
        assert_eq!(event.alarm, None);
        assert_eq!(clock.state().time(), hm(0, 1));
    }

    #[test]
    fn test_steps_cycle_through_digits() {
        let mut clock = controller(Config::default());
        let wiring = clock.config().wiring;
        let mut lit = Vec::new();
        for _ in 0..8 {
            clock.step().unwrap();
            lit.push(clock.gpio().output(Bank::C) & wiring.all_digits_mask());
        }
        let expected: Vec<u16> = wiring
            .digit_enables
            .iter()
            .chain(wiring.digit_enables.iter())
            .copied()
            .collect();
        assert_eq!(lit, expected);
    }

    #[test]
    fn test_button_toggles_display_mode() {
        let mut clock = controller(Config::default());
        let button = clock.config().wiring.button;
        clock.engine.gpio.drive_input(button, true);
        for _ in 0..10 {
            clock.step().unwrap();
        }
        assert_eq!(clock.state().mode(), TimeRepresentation::TwelveHour);

        // holding the button does not toggle again
        for _ in 0..50 {
            clock.step().unwrap();
        }
        assert_eq!(clock.state().mode(), TimeRepresentation::TwelveHour);

        clock.engine.gpio.drive_input(button, false);
        for _ in 0..10 {
            clock.step().unwrap();
        }
        clock.engine.gpio.drive_input(button, true);
        for _ in 0..10 {
            clock.step().unwrap();
        }
        assert_eq!(clock.state().mode(), TimeRepresentation::TwentyFourHour);
    }

    #[test]
    fn test_short_glitch_ignored() {
        let mut clock = controller(Config::default());
        let button = clock.config().wiring.button;
        clock.engine.gpio.drive_input(button, true);
        for _ in 0..3 {
            clock.step().unwrap();
        }
        clock.engine.gpio.drive_input(button, false);
        for _ in 0..20 {
            clock.step().unwrap();
        }
        assert_eq!(clock.state().mode(), TimeRepresentation::TwentyFourHour);
    }

    #[test]
    fn test_active_low_button_with_pull_up() {
        let button = Pin::new(Bank::A, 0);
        let wiring = Wiring {
            button,
            button_active: hardware::ActiveLevel::Low,
            button_pull: Pull::Up,
            ..Wiring::NUCLEO_L053
        };
        let mut clock = controller(Config {
            wiring,
            ..Config::default()
        });
        assert!(clock.gpio().ops.contains(&Op::Input(Bank::A, 1, Pull::Up)));

        // idle line reads high
        clock.engine.gpio.drive_input(button, true);
        for _ in 0..20 {
            clock.step().unwrap();
        }
        assert_eq!(clock.state().mode(), TimeRepresentation::TwentyFourHour);
        clock.engine.gpio.drive_input(button, false);
        for _ in 0..10 {
            clock.step().unwrap();
        }
        assert_eq!(clock.state().mode(), TimeRepresentation::TwelveHour);
    }

    #[test]
    fn test_alarm_led_follows_alarm() {
        let mut clock = controller(Config {
            alarm: hm(0, 1),
            ..Config::default()
        });
        let led = clock.config().wiring.alarm_led;
        let ticks = clock.config().ticks_per_second();

        for _ in 0..ticks - 1 {
            clock.step().unwrap();
        }
        assert!(!clock.gpio().is_high(led));
        let event = clock.step().unwrap().unwrap();
        assert_eq!(event.alarm, Some(AlarmEvent::Started));
        assert!(clock.gpio().is_high(led));

        let mut silenced = 0;
        for second in 1..=30 {
            for _ in 0..ticks {
                if let Some(event) = clock.step().unwrap() {
                    if event.alarm == Some(AlarmEvent::Silenced) {
                        silenced = second;
                    }
                }
            }
        }
        assert_eq!(silenced, 30);
        assert!(!clock.gpio().is_high(led));
        assert_eq!(clock.state().alarm().state(), AlarmState::Idle);
    }

    #[test]
    fn test_am_led_tracks_day_period() {
        let mut clock = controller(Config::default());
        let led = clock.config().wiring.am_led;
        clock.step().unwrap();
        assert!(clock.gpio().is_high(led));

        // 12 hours of one-minute seconds
        for _ in 0..12 * 60 * TICKS_PER_SECOND {
            clock.step().unwrap();
        }
        assert_eq!(clock.state().time(), hm(12, 0));
        clock.step().unwrap();
        assert!(!clock.gpio().is_high(led));
    }

    #[test]
    fn test_gpio_error_propagates() {
        let mut clock = Controller::new(DeadGpio, NoopDelay::new(), Config::default()).unwrap();
        assert_eq!(clock.step(), Err(ClockError::Gpio(BusFault)));
        assert_eq!(clock.run().err(), Some(ClockError::Gpio(BusFault)));
        assert_eq!(clock.state().time(), BcdTime::MIDNIGHT);
    }

    #[test]
    fn test_release_returns_parts() {
        let mut clock = controller(Config::default());
        clock.step().unwrap();
        let (gpio, _delay) = clock.release();
        assert!(gpio.ops.contains(&Op::Read(Bank::C)));
    }
}
