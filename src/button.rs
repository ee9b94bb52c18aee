//! Counter-based pushbutton debouncing.
//!
//! The debouncer is fed one raw sample per polling tick. A change of level
//! restarts the agreement counter; once `threshold` further samples agree the
//! new level becomes the confirmed state. Pulses that do not survive that long
//! are ignored.

/// A confirmed change of the debounced level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    /// Released -> pressed
    Pressed,
    /// Pressed -> released
    Released,
}

/// Debounce state for one button. Samples are logical: `true` means pressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    last_sample: bool,
    stable: bool,
    count: u8,
    threshold: u8,
}

impl Debouncer {
    /// A released button that needs `threshold` agreeing samples to change state.
    pub const fn new(threshold: u8) -> Self {
        Self {
            last_sample: false,
            stable: false,
            count: 0,
            threshold,
        }
    }

    /// The confirmed level.
    pub const fn is_pressed(&self) -> bool {
        self.stable
    }

    /// Feeds one sample. Returns the edge when the confirmed level changes.
    pub fn update(&mut self, pressed: bool) -> Option<ButtonEdge> {
        if pressed != self.last_sample {
            self.last_sample = pressed;
            self.count = 0;
        } else if self.count < self.threshold {
            self.count += 1;
        }

        if self.count == self.threshold && pressed != self.stable {
            self.stable = pressed;
            return Some(if pressed {
                ButtonEdge::Pressed
            } else {
                ButtonEdge::Released
            });
        }
        None
    }
}
