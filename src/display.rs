//! Four-digit display multiplexing.
//!
//! All four digits share one set of segment lines; each has its own enable
//! line. Every loop iteration lights exactly one digit, and the cursor moves
//! to the next slot, so at 5 ms per iteration the full display refreshes at
//! about 50 Hz.
//!
//! Both hour digits carry a lit decimal point as the hour/minute separator.
//! In 12-hour mode a leading zero on the hour is blanked.

use crate::hardware::{Gpio, Wiring};
use crate::segments::{encode, Glyph, Polarity, SegmentPattern};
use crate::time::{to_display, BcdTime, TimeRepresentation};

/// Position on the display, in drive order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitSlot {
    #[default]
    MinutesOnes = 0,
    MinutesTens = 1,
    HoursOnes = 2,
    HoursTens = 3,
}

impl DigitSlot {
    pub const ALL: [DigitSlot; 4] = [
        DigitSlot::MinutesOnes,
        DigitSlot::MinutesTens,
        DigitSlot::HoursOnes,
        DigitSlot::HoursTens,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The slot driven after this one; wraps after the hours-tens digit.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            DigitSlot::MinutesOnes => DigitSlot::MinutesTens,
            DigitSlot::MinutesTens => DigitSlot::HoursOnes,
            DigitSlot::HoursOnes => DigitSlot::HoursTens,
            DigitSlot::HoursTens => DigitSlot::MinutesOnes,
        }
    }
}

/// The segments lit in `slot` for `time` shown in `mode`.
pub fn slot_pattern(slot: DigitSlot, time: &BcdTime, mode: TimeRepresentation) -> SegmentPattern {
    let (hour_tens, hour_ones) = to_display(time.hour_tens(), time.hour_ones(), mode);
    match slot {
        DigitSlot::MinutesOnes => encode(Glyph::Digit(time.minutes_ones())),
        DigitSlot::MinutesTens => encode(Glyph::Digit(time.minutes_tens())),
        DigitSlot::HoursOnes => encode(Glyph::Digit(hour_ones)).with_decimal_point(),
        DigitSlot::HoursTens => {
            let glyph = if mode == TimeRepresentation::TwelveHour && hour_tens == 0 {
                Glyph::Blank
            } else {
                Glyph::Digit(hour_tens)
            };
            encode(glyph).with_decimal_point()
        }
    }
}

/// Digit cursor plus the pin sequence that drives one slot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Multiplexer {
    cursor: DigitSlot,
}

impl Multiplexer {
    pub const fn new() -> Self {
        Self {
            cursor: DigitSlot::MinutesOnes,
        }
    }

    /// The slot the next [`Multiplexer::drive`] lights.
    pub const fn cursor(&self) -> DigitSlot {
        self.cursor
    }

    /// Lights the cursor slot with `pattern` and moves the cursor on.
    ///
    /// All enables are released first, then only the cursor's enable is
    /// asserted, then the segment lines are rewritten. Returns the slot driven.
    pub fn drive<G: Gpio>(
        &mut self,
        gpio: &mut G,
        wiring: &Wiring,
        polarity: Polarity,
        pattern: SegmentPattern,
    ) -> Result<DigitSlot, G::Error> {
        let slot = self.cursor;
        gpio.clear_output(wiring.digit_bank, wiring.all_digits_mask())?;
        gpio.set_output(wiring.digit_bank, wiring.digit_enables[slot.index()])?;

        let levels = u16::from(pattern.levels(polarity))
            .checked_shl(u32::from(wiring.segment_shift))
            .unwrap_or(0);
        gpio.clear_output(wiring.segment_bank, wiring.segment_mask())?;
        gpio.set_output(wiring.segment_bank, levels)?;

        self.cursor = slot.next();
        Ok(slot)
    }
}
