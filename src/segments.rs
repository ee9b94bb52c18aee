//! Seven-segment glyph encoding.
//!
//! Segment bits are ordered `[a, b, c, d, e, f, g, dp]` from bit 0 to bit 7.
//! The digit table is written for common-anode wiring (a segment lights when
//! its line is driven low); common-cathode levels are the bitwise complement
//! of the full byte.

use bitfield::bitfield;

/// Common-anode drive levels for the digits 0 through 9.
pub const COMMON_ANODE_DIGITS: [u8; 10] = [
    0b1100_0000, // 0
    0b1111_1001, // 1
    0b1010_0100, // 2
    0b1011_0000, // 3
    0b1001_1001, // 4
    0b1001_0010, // 5
    0b1000_0010, // 6
    0b1111_1000, // 7
    0b1000_0000, // 8
    0b1001_0000, // 9
];

/// Common-anode drive level with every segment dark.
pub const COMMON_ANODE_BLANK: u8 = 0b1111_1111;

/// Which level lights a segment on the attached display.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Segment lines are active-high.
    #[default]
    CommonCathode,
    /// Segment lines are active-low.
    CommonAnode,
}

bitfield! {
    /// The set of lit segments of one digit. A set bit means "segment on",
    /// independent of the display polarity.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct SegmentPattern(u8);
    impl Debug;
    pub a, set_a: 0;
    pub b, set_b: 1;
    pub c, set_c: 2;
    pub d, set_d: 3;
    pub e, set_e: 4;
    pub f, set_f: 5;
    pub g, set_g: 6;
    pub dp, set_dp: 7;
}

#[cfg(feature = "defmt")]
impl defmt::Format for SegmentPattern {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SegmentPattern({=u8:b})", self.0);
    }
}

impl SegmentPattern {
    /// All segments dark.
    pub const BLANK: Self = SegmentPattern(0);

    /// Builds a pattern from a common-anode (active-low) drive byte.
    pub const fn from_common_anode(levels: u8) -> Self {
        SegmentPattern(!levels)
    }

    /// Returns the same pattern with the decimal point lit.
    #[must_use]
    pub const fn with_decimal_point(self) -> Self {
        SegmentPattern(self.0 | (1 << 7))
    }

    /// Line levels to drive for the given display polarity.
    pub const fn levels(self, polarity: Polarity) -> u8 {
        match polarity {
            Polarity::CommonCathode => self.0,
            Polarity::CommonAnode => !self.0,
        }
    }
}

impl From<SegmentPattern> for u8 {
    fn from(v: SegmentPattern) -> Self {
        v.0
    }
}

/// Something the display can show in one digit cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Glyph {
    /// A decimal digit. Values above 9 render blank.
    Digit(u8),
    /// Every segment dark.
    Blank,
}

impl Glyph {
    /// Maps any integer to a glyph; anything outside 0..=9 becomes [`Glyph::Blank`].
    pub fn from_value<T: TryInto<u8>>(value: T) -> Self {
        match value.try_into() {
            Ok(digit) if digit <= 9 => Glyph::Digit(digit),
            _ => Glyph::Blank,
        }
    }
}

/// Encodes a glyph as a lit-segment pattern.
pub const fn encode(glyph: Glyph) -> SegmentPattern {
    match glyph {
        Glyph::Digit(digit) if digit <= 9 => {
            SegmentPattern::from_common_anode(COMMON_ANODE_DIGITS[digit as usize])
        }
        _ => SegmentPattern::from_common_anode(COMMON_ANODE_BLANK),
    }
}

/// Encodes an integer; out-of-range values (negative or above 9) render blank.
pub fn encode_value<T: TryInto<u8>>(value: T) -> SegmentPattern {
    encode(Glyph::from_value(value))
}
