//! BCD time-of-day and hour formatting.
//!
//! [`BcdTime`] keeps a 24-hour `HH:MM` value as four separate decimal digits.
//! It only wraps at 24:00; there is no date.
//!
//! # Conversion
//!
//! - [`BcdTime::from_hm`] validates an hour/minute pair.
//! - `TryFrom<chrono::NaiveTime>` and `From<BcdTime> for chrono::NaiveTime`
//!   convert to and from chrono (seconds are dropped on the way in).
//!
//! [`to_display`] maps the internal hour digits onto the digits actually shown
//! for a [`TimeRepresentation`].

use chrono::{NaiveTime, Timelike};

/// Errors building a [`BcdTime`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// Hour is not in 0..=23
    InvalidHour(u8),
    /// Minute is not in 0..=59
    InvalidMinute(u8),
}

impl core::fmt::Display for TimeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimeError::InvalidHour(hour) => write!(f, "hour {hour} is not in 0..=23"),
            TimeError::InvalidMinute(minute) => write!(f, "minute {minute} is not in 0..=59"),
        }
    }
}

/// How hours are shown on the display.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    #[default]
    TwentyFourHour,
    /// 12-hour format (1-12)
    TwelveHour,
}

impl TimeRepresentation {
    /// The other representation.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            TimeRepresentation::TwentyFourHour => TimeRepresentation::TwelveHour,
            TimeRepresentation::TwelveHour => TimeRepresentation::TwentyFourHour,
        }
    }
}

/// A 24-hour time of day stored as BCD digits.
///
/// Every value reachable through the public API decodes to a time in
/// `[00:00, 23:59]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BcdTime {
    minutes_ones: u8,
    minutes_tens: u8,
    hour_ones: u8,
    hour_tens: u8,
}

impl BcdTime {
    /// 00:00
    pub const MIDNIGHT: Self = BcdTime {
        minutes_ones: 0,
        minutes_tens: 0,
        hour_ones: 0,
        hour_tens: 0,
    };

    /// Builds a time from a 24-hour hour and a minute.
    ///
    /// # Errors
    /// Returns [`TimeError`] if `hour > 23` or `minute > 59`.
    pub const fn from_hm(hour: u8, minute: u8) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::InvalidHour(hour));
        }
        if minute > 59 {
            return Err(TimeError::InvalidMinute(minute));
        }
        Ok(BcdTime {
            minutes_ones: minute % 10,
            minutes_tens: minute / 10,
            hour_ones: hour % 10,
            hour_tens: hour / 10,
        })
    }

    pub const fn minutes_ones(&self) -> u8 {
        self.minutes_ones
    }

    pub const fn minutes_tens(&self) -> u8 {
        self.minutes_tens
    }

    pub const fn hour_ones(&self) -> u8 {
        self.hour_ones
    }

    pub const fn hour_tens(&self) -> u8 {
        self.hour_tens
    }

    /// Hour in 0..=23.
    pub const fn hour(&self) -> u8 {
        self.hour_tens * 10 + self.hour_ones
    }

    /// Minute in 0..=59.
    pub const fn minute(&self) -> u8 {
        self.minutes_tens * 10 + self.minutes_ones
    }

    /// True before noon. Drives the day-period indicator.
    pub const fn is_am(&self) -> bool {
        self.hour() < 12
    }

    /// Steps the least significant digit by one and carries.
    ///
    /// Minutes carry into hours in the same call. Hours wrap 23 -> 00.
    pub fn advance(&mut self) {
        self.minutes_ones += 1;
        if self.minutes_ones <= 9 {
            return;
        }
        self.minutes_ones = 0;

        self.minutes_tens += 1;
        if self.minutes_tens <= 5 {
            return;
        }
        self.minutes_tens = 0;

        if self.hour_tens == 2 {
            // 20..23
            if self.hour_ones >= 3 {
                self.hour_ones = 0;
                self.hour_tens = 0;
            } else {
                self.hour_ones += 1;
            }
        } else if self.hour_ones >= 9 {
            // 09 -> 10, 19 -> 20
            self.hour_ones = 0;
            self.hour_tens += 1;
        } else {
            self.hour_ones += 1;
        }
    }
}

impl TryFrom<NaiveTime> for BcdTime {
    type Error = TimeError;

    fn try_from(time: NaiveTime) -> Result<Self, Self::Error> {
        let hour = u8::try_from(time.hour()).map_err(|_| TimeError::InvalidHour(u8::MAX))?;
        let minute = u8::try_from(time.minute()).map_err(|_| TimeError::InvalidMinute(u8::MAX))?;
        BcdTime::from_hm(hour, minute)
    }
}

impl From<BcdTime> for NaiveTime {
    fn from(time: BcdTime) -> Self {
        NaiveTime::from_hms_opt(u32::from(time.hour()), u32::from(time.minute()), 0)
            .unwrap_or_default()
    }
}

/// Returns the `(tens, ones)` hour digits to show for a 24-hour BCD hour.
///
/// In 12-hour mode the hour maps onto 1..=12 (00 shows as 12, 13 as 01).
/// Leading-zero blanking is left to the display.
pub fn to_display(hour_tens: u8, hour_ones: u8, mode: TimeRepresentation) -> (u8, u8) {
    match mode {
        TimeRepresentation::TwentyFourHour => (hour_tens, hour_ones),
        TimeRepresentation::TwelveHour => {
            let hour24 = u16::from(hour_tens) * 10 + u16::from(hour_ones);
            let hour12 = match hour24 % 12 {
                0 => 12,
                h => h,
            };
            // hour12 is in 1..=12
            ((hour12 / 10) as u8, (hour12 % 10) as u8)
        }
    }
}
