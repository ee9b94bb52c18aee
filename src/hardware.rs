//! Hardware I/O surface.
//!
//! The controller only talks to GPIO through [`Gpio`]: set pins, clear pins,
//! read a bank's input levels. Bring-up (peripheral clocks, pin modes) goes
//! through [`GpioSetup`] and runs once before the loop starts.
//!
//! [`Wiring`] says which bank and pins carry each signal.

use crate::ConfigError;

/// A GPIO port.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    A = 0,
    B = 1,
    C = 2,
}

impl Bank {
    /// All banks, in clock-enable bit order.
    pub const ALL: [Bank; 3] = [Bank::A, Bank::B, Bank::C];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One or more pins within a bank.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin {
    pub bank: Bank,
    pub mask: u16,
}

impl Pin {
    /// Pin `number` (0..=15) of `bank`.
    pub const fn new(bank: Bank, number: u8) -> Self {
        Self {
            bank,
            mask: 1 << (number & 0x0F),
        }
    }
}

/// Input pull resistor selection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    #[default]
    None,
    Up,
    Down,
}

/// Input level that means "pressed".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Pressed reads high (external pull-down).
    #[default]
    High,
    /// Pressed reads low (pull-up).
    Low,
}

impl ActiveLevel {
    /// Converts a raw bank read into a logical "pressed" sample.
    pub const fn is_active(self, levels: u16, mask: u16) -> bool {
        let high = levels & mask != 0;
        match self {
            ActiveLevel::High => high,
            ActiveLevel::Low => !high,
        }
    }
}

/// Pin-level access used by the running loop.
pub trait Gpio {
    type Error;

    /// Drives every pin in `mask` high.
    fn set_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error>;

    /// Drives every pin in `mask` low.
    fn clear_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error>;

    /// Reads the input levels of a whole bank.
    fn read_input(&mut self, bank: Bank) -> Result<u16, Self::Error>;
}

/// One-time bring-up of banks and pin modes.
pub trait GpioSetup: Gpio {
    /// Enables the peripheral clock of `bank`. Must run before any other access to it.
    fn enable_clock(&mut self, bank: Bank) -> Result<(), Self::Error>;

    /// Push-pull outputs, no pull resistors.
    fn configure_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error>;

    /// Inputs with the given pull resistor.
    fn configure_input(&mut self, bank: Bank, mask: u16, pull: Pull) -> Result<(), Self::Error>;
}

impl<T: Gpio + ?Sized> Gpio for &mut T {
    type Error = T::Error;

    fn set_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error> {
        T::set_output(self, bank, mask)
    }

    fn clear_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error> {
        T::clear_output(self, bank, mask)
    }

    fn read_input(&mut self, bank: Bank) -> Result<u16, Self::Error> {
        T::read_input(self, bank)
    }
}

impl<T: GpioSetup + ?Sized> GpioSetup for &mut T {
    fn enable_clock(&mut self, bank: Bank) -> Result<(), Self::Error> {
        T::enable_clock(self, bank)
    }

    fn configure_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error> {
        T::configure_output(self, bank, mask)
    }

    fn configure_input(&mut self, bank: Bank, mask: u16, pull: Pull) -> Result<(), Self::Error> {
        T::configure_input(self, bank, mask, pull)
    }
}

/// Drives `pin` high when `on`, low otherwise.
pub(crate) fn write_pin<G: Gpio>(gpio: &mut G, pin: Pin, on: bool) -> Result<(), G::Error> {
    if on {
        gpio.set_output(pin.bank, pin.mask)
    } else {
        gpio.clear_output(pin.bank, pin.mask)
    }
}

/// Pin assignment of the display, LEDs and button.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Wiring {
    /// Bank carrying the eight shared segment lines.
    pub segment_bank: Bank,
    /// Bit position of segment `a`; `a..dp` occupy eight consecutive pins.
    pub segment_shift: u8,
    /// Bank carrying the digit-enable lines.
    pub digit_bank: Bank,
    /// Enable line per slot: minutes-ones, minutes-tens, hours-ones, hours-tens.
    pub digit_enables: [u16; 4],
    /// Lit before noon.
    pub am_led: Pin,
    /// Lit while the alarm rings.
    pub alarm_led: Pin,
    /// 12/24-hour toggle button.
    pub button: Pin,
    pub button_active: ActiveLevel,
    pub button_pull: Pull,
}

impl Wiring {
    /// Nucleo-L053R8 layout: segments on PB0..PB7, digits on PC5/PC6/PC8/PC9,
    /// AM LED on PA5 (LD2), alarm LED on PB8, format button B1 on PC13.
    pub const NUCLEO_L053: Wiring = Wiring {
        segment_bank: Bank::B,
        segment_shift: 0,
        digit_bank: Bank::C,
        digit_enables: [1 << 5, 1 << 6, 1 << 8, 1 << 9],
        am_led: Pin::new(Bank::A, 5),
        alarm_led: Pin::new(Bank::B, 8),
        button: Pin::new(Bank::C, 13),
        button_active: ActiveLevel::High,
        button_pull: Pull::None,
    };

    /// Mask of all eight segment lines within `segment_bank`.
    pub const fn segment_mask(&self) -> u16 {
        match 0x00FF_u16.checked_shl(self.segment_shift as u32) {
            Some(mask) => mask,
            None => 0,
        }
    }

    /// Mask of all digit-enable lines within `digit_bank`.
    pub const fn all_digits_mask(&self) -> u16 {
        self.digit_enables[0] | self.digit_enables[1] | self.digit_enables[2] | self.digit_enables[3]
    }

    /// Whether any signal lives on `bank`.
    pub fn uses(&self, bank: Bank) -> bool {
        self.segment_bank == bank
            || self.digit_bank == bank
            || self.am_led.bank == bank
            || self.alarm_led.bank == bank
            || self.button.bank == bank
    }

    /// Output pins grouped per bank, indexed by [`Bank::index`].
    pub fn output_masks(&self) -> [u16; 3] {
        let mut masks = [0; 3];
        masks[self.segment_bank.index()] |= self.segment_mask();
        masks[self.digit_bank.index()] |= self.all_digits_mask();
        masks[self.am_led.bank.index()] |= self.am_led.mask;
        masks[self.alarm_led.bank.index()] |= self.alarm_led.mask;
        masks
    }

    /// Checks that every signal has its own pin.
    ///
    /// # Errors
    /// Returns [`ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segment_shift > 8 {
            return Err(ConfigError::SegmentShiftTooLarge(self.segment_shift));
        }
        for (slot, mask) in self.digit_enables.iter().enumerate() {
            if mask.count_ones() != 1 {
                return Err(ConfigError::DigitEnableNotSinglePin(slot));
            }
        }
        if self.all_digits_mask().count_ones() != 4 {
            return Err(ConfigError::PinConflict);
        }
        for pin in [self.am_led, self.alarm_led, self.button] {
            if pin.mask.count_ones() != 1 {
                return Err(ConfigError::PinConflict);
            }
        }

        let pins = [
            (self.segment_bank, self.segment_mask()),
            (self.digit_bank, self.all_digits_mask()),
            (self.am_led.bank, self.am_led.mask),
            (self.alarm_led.bank, self.alarm_led.mask),
            (self.button.bank, self.button.mask),
        ];
        for (i, (bank, mask)) in pins.iter().enumerate() {
            for (other_bank, other_mask) in pins.iter().skip(i + 1) {
                if bank == other_bank && mask & other_mask != 0 {
                    return Err(ConfigError::PinConflict);
                }
            }
        }
        Ok(())
    }
}

impl Default for Wiring {
    fn default() -> Self {
        Self::NUCLEO_L053
    }
}
