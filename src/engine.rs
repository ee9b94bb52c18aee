//! The per-iteration work shared by the blocking and async controllers.
//!
//! One outer iteration is: sample the button, pick the cursor digit, update
//! the AM LED, drive the digit ([`Engine::refresh`]), wait, then count the
//! tick and run the once-per-second clock and alarm updates
//! ([`Engine::finish_tick`]). The controllers only add the wait.

use crate::alarm::AlarmEvent;
use crate::clock::{ClockState, SecondEvent};
use crate::display::{slot_pattern, DigitSlot, Multiplexer};
use crate::hardware::{write_pin, Bank, Gpio, GpioSetup};
use crate::{Config, ConfigError};

#[derive(Debug)]
pub(crate) struct Engine<G> {
    pub(crate) gpio: G,
    pub(crate) config: Config,
    pub(crate) state: ClockState,
    mux: Multiplexer,
}

impl<G: Gpio> Engine<G> {
    pub(crate) fn new(gpio: G, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            gpio,
            state: ClockState::new(&config),
            mux: Multiplexer::new(),
            config,
        })
    }

    /// Everything before the loop delay. Returns the digit slot that was lit.
    pub(crate) fn refresh(&mut self) -> Result<DigitSlot, G::Error> {
        let wiring = self.config.wiring;

        let levels = self.gpio.read_input(wiring.button.bank)?;
        self.state
            .sample_button(wiring.button_active.is_active(levels, wiring.button.mask));

        let pattern = slot_pattern(self.mux.cursor(), &self.state.time(), self.state.mode());
        write_pin(&mut self.gpio, wiring.am_led, self.state.is_am())?;
        self.mux
            .drive(&mut self.gpio, &wiring, self.config.polarity, pattern)
    }

    /// Everything after the loop delay.
    pub(crate) fn finish_tick(&mut self) -> Result<Option<SecondEvent>, G::Error> {
        let event = self.state.tick();
        if let Some(SecondEvent {
            alarm: Some(alarm), ..
        }) = event
        {
            write_pin(
                &mut self.gpio,
                self.config.wiring.alarm_led,
                alarm == AlarmEvent::Started,
            )?;
        }
        Ok(event)
    }
}

impl<G: GpioSetup> Engine<G> {
    /// Enables each used bank once, sets pin modes, and leaves every digit
    /// and the alarm LED off.
    pub(crate) fn init(&mut self) -> Result<(), G::Error> {
        let wiring = self.config.wiring;
        for bank in Bank::ALL {
            if wiring.uses(bank) {
                self.gpio.enable_clock(bank)?;
            }
        }
        debug!("gpio clocks enabled");

        let outputs = wiring.output_masks();
        for bank in Bank::ALL {
            let mask = outputs[bank.index()];
            if mask != 0 {
                self.gpio.configure_output(bank, mask)?;
            }
        }
        self.gpio
            .configure_input(wiring.button.bank, wiring.button.mask, wiring.button_pull)?;

        self.gpio
            .clear_output(wiring.digit_bank, wiring.all_digits_mask())?;
        write_pin(&mut self.gpio, wiring.alarm_led, false)?;
        info!(
            "clock ready: {} ticks per second, alarm at {}{}:{}{}",
            self.config.ticks_per_second(),
            self.config.alarm.hour_tens(),
            self.config.alarm.hour_ones(),
            self.config.alarm.minutes_tens(),
            self.config.alarm.minutes_ones()
        );
        Ok(())
    }
}
