//! Async clock controller.
//!
//! Same loop as [`crate::Controller`], but the per-tick wait goes through
//! `embedded-hal-async`, so an executor can run other tasks while the display
//! holds the current digit. Only available with the `async` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use segclock::{asynch::Controller, Config};
//!
//! let mut clock = Controller::new(gpio, delay, Config::default())?;
//! clock.init()?;
//! clock.run().await?;
//! ```

use core::convert::Infallible;

use embedded_hal_async::delay::DelayNs;

use crate::clock::{ClockState, SecondEvent};
use crate::engine::Engine;
use crate::hardware::{Gpio, GpioSetup};
use crate::{ClockError, Config, ConfigError};

/// Async clock controller.
///
/// GPIO writes stay blocking; only the tick delay is awaited.
#[derive(Debug)]
pub struct Controller<G, D> {
    engine: Engine<G>,
    delay: D,
}

impl<G: Gpio, D: DelayNs> Controller<G, D> {
    /// Checks `config` and builds the power-on state.
    ///
    /// # Errors
    /// Returns the [`ConfigError`] from [`Config::validate`].
    pub fn new(gpio: G, delay: D, config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: Engine::new(gpio, config)?,
            delay,
        })
    }

    /// Runs one loop iteration, awaiting the tick delay.
    ///
    /// # Returns
    /// * `Ok(Some(event))` when the tick completed a second
    /// * `Ok(None)` otherwise
    /// * `Err(ClockError)` when a GPIO call failed
    pub async fn step(&mut self) -> Result<Option<SecondEvent>, ClockError<G::Error>> {
        self.engine.refresh()?;
        self.delay.delay_ms(self.engine.config.tick_interval_ms).await;
        Ok(self.engine.finish_tick()?)
    }

    /// Steps until a GPIO call fails.
    pub async fn run(&mut self) -> Result<Infallible, ClockError<G::Error>> {
        loop {
            self.step().await?;
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
