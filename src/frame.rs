//! The 24-bit frame latched into the output shift-register chain.

use crate::segments::{SegmentPattern, DIGITS};

/// An active-low digit-select mask, as the second byte of a [`BusFrame`]. These are created by
/// conversion from `DigitSelect`. It is a newtype around `u8` so that only masks from the board's
/// wiring table reach the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DigitSelectMask(pub(crate) u8);

impl From<DigitSelectMask> for u8 {
    /// Convert a `DigitSelectMask` into the byte shifted onto the bus.
    fn from(mask: DigitSelectMask) -> u8 {
        mask.0
    }
}

/// Which display digits a frame lights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigitSelect {
    /// No digit lit. Relays are still latched.
    None,

    /// A single digit position, 0 (leftmost) to 3. This is what the multiplexed refresh uses.
    /// Positions past 3 select nothing.
    Digit(u8),

    /// The first `n` positions together, `n` in 2 to 4, all showing the same pattern. Only useful
    /// for single-shot writes such as a lamp test. `Leading(0)` and `Leading(1)` behave like
    /// `None` and `Digit(0)`; counts past 4 select all four.
    Leading(u8),
}

impl From<DigitSelect> for DigitSelectMask {
    /// Convert a `DigitSelect` into its wiring-table mask.
    fn from(select: DigitSelect) -> DigitSelectMask {
        use self::DigitSelect::*;
        DigitSelectMask(match select {
            None => 0b1111_1111,
            Digit(pos) if (pos as usize) < DIGITS => !(1u8 << pos),
            Digit(_) => 0b1111_1111,
            Leading(0) => 0b1111_1111,
            Leading(1) => 0b1111_1110,
            Leading(2) => 0b1111_1100,
            Leading(3) => 0b1111_1000,
            Leading(_) => 0b1111_0000,
        })
    }
}

/// One transmission on the output chain: relay byte, digit-select byte, segment byte, shifted in
/// that order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusFrame {
    pub relays: u8,
    pub digits: DigitSelectMask,
    pub segments: SegmentPattern,
}

impl BusFrame {
    pub fn new(relays: u8, select: DigitSelect, segments: SegmentPattern) -> Self {
        Self {
            relays,
            digits: select.into(),
            segments,
        }
    }

    /// The bytes in shift order. The first byte ends up in the last register of the chain.
    pub fn to_bytes(&self) -> [u8; 3] {
        [self.relays, self.digits.into(), self.segments.into()]
    }
}
