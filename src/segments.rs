//! Seven-segment encoding of characters, text, integers and floats.
//!
//! Every function here is pure: it produces a [`DisplayBuffer`] that the [`Board`](crate::Board)
//! stores and the [`Refresher`](crate::Refresher) multiplexes onto the display.

use core::fmt::Write;

use heapless::String;

/// Number of physical digit positions on the display.
pub const DIGITS: usize = 4;

/// Text rendered whenever a number cannot be represented in four positions.
pub const OVERFLOW_TEXT: &str = " -- ";

/// Segment bits for one digit position: bit 7 is the decimal point, bits 0 to 6 are segments `a`
/// to `g`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SegmentPattern(pub(crate) u8);

impl SegmentPattern {
    /// All segments off.
    pub const BLANK: Self = SegmentPattern(0);

    /// The decimal point alone.
    pub const DECIMAL_POINT: Self = SegmentPattern(0b1000_0000);

    /// Return this pattern with the decimal point lit.
    pub fn with_decimal_point(self) -> Self {
        SegmentPattern(self.0 | Self::DECIMAL_POINT.0)
    }

    /// Whether the decimal point bit is set.
    pub fn has_decimal_point(self) -> bool {
        self.0 & Self::DECIMAL_POINT.0 != 0
    }
}

impl From<SegmentPattern> for u8 {
    fn from(pattern: SegmentPattern) -> u8 {
        pattern.0
    }
}

/// The full logical contents of the display, left to right.
pub type DisplayBuffer = [SegmentPattern; DIGITS];

/// A display with every position dark.
pub const BLANK_DISPLAY: DisplayBuffer = [SegmentPattern::BLANK; DIGITS];

/// Convert a character into its segment pattern. Characters the display cannot draw map to
/// [`SegmentPattern::BLANK`].
pub fn char_to_segments(c: char) -> SegmentPattern {
    SegmentPattern(match c {
        '0' => 0b0011_1111,
        '1' => 0b0000_0110,
        '2' => 0b0101_1011,
        '3' => 0b0100_1111,
        '4' => 0b0110_0110,
        '5' => 0b0110_1101,
        '6' => 0b0111_1101,
        '7' => 0b0000_0111,
        '8' => 0b0111_1111,
        '9' => 0b0110_1111,
        ' ' => 0b0000_0000,
        '.' => 0b1000_0000,
        '-' => 0b0100_0000,
        '_' => 0b0000_1000,
        'A' => 0b0111_0111,
        'a' => 0b0101_1111,
        'B' | 'b' => 0b0111_1100,
        'C' => 0b0011_1001,
        'c' => 0b0101_1000,
        'D' | 'd' => 0b0101_1110,
        'E' => 0b0111_1001,
        'e' => 0b0111_1011,
        'F' | 'f' => 0b0111_0001,
        'G' | 'g' => 0b0110_1111,
        'H' => 0b0111_0110,
        'h' => 0b0111_0100,
        'I' => 0b0000_0110,
        'i' => 0b0001_0000,
        'J' | 'j' => 0b0001_1110,
        'L' => 0b0011_1000,
        'l' => 0b0001_1000,
        'M' | 'm' => 0b0011_0111,
        'N' | 'n' => 0b0101_0100,
        'O' | 'o' => 0b0101_1100,
        'P' | 'p' => 0b0111_0011,
        'Q' | 'q' => 0b0110_0111,
        'R' | 'r' => 0b0101_0000,
        'S' | 's' => 0b0110_1101,
        'T' | 't' => 0b0111_1000,
        'U' => 0b0011_1110,
        'u' => 0b0001_1100,
        'Y' | 'y' => 0b0110_0110,
        'Z' | 'z' => 0b0101_1011,
        _ => 0b0000_0000,
    })
}

/// Encode up to four characters of `text`, one per position. Extra characters are ignored and
/// missing ones are left blank.
pub fn encode_text(text: &str) -> DisplayBuffer {
    let mut buffer = BLANK_DISPLAY;
    for (slot, c) in buffer.iter_mut().zip(text.chars()) {
        *slot = char_to_segments(c);
    }
    buffer
}

/// Encode an integer right-justified in four positions. Values outside `-999..=9999` render
/// [`OVERFLOW_TEXT`].
pub fn encode_int(number: i32) -> DisplayBuffer {
    if !(-999..=9999).contains(&number) {
        return encode_text(OVERFLOW_TEXT);
    }
    let mut text: String<DIGITS> = String::new();
    match write!(text, "{:>4}", number) {
        Ok(()) => encode_text(&text),
        Err(_) => encode_text(OVERFLOW_TEXT),
    }
}

/// Number of positions the integer part of `magnitude` needs, or `None` past four.
fn integer_digits(magnitude: f32) -> Option<usize> {
    match magnitude {
        m if m < 10.0 => Some(1),
        m if m < 100.0 => Some(2),
        m if m < 1_000.0 => Some(3),
        m if m < 10_000.0 => Some(4),
        _ => None,
    }
}

/// Encode a float in four positions.
///
/// The value is rounded to `3 - n` decimals, where `n` is the number of digits in its integer
/// part; a minus sign does not change the decimal count. The decimal point rides on the high bit
/// of the digit to its left and never takes a position of its own. A four-digit integer part with
/// a non-zero fraction, anything wider, NaN, infinities and any result that needs more than four
/// positions once the sign is added all render [`OVERFLOW_TEXT`].
pub fn encode_float(number: f32) -> DisplayBuffer {
    if !number.is_finite() {
        return encode_text(OVERFLOW_TEXT);
    }
    let negative = number < 0.0;
    let magnitude = if negative { -number } else { number };
    let integer_width = match integer_digits(magnitude) {
        Some(digits) => digits,
        None => return encode_text(OVERFLOW_TEXT),
    };
    if integer_width == DIGITS && magnitude != (magnitude as u32) as f32 {
        return encode_text(OVERFLOW_TEXT);
    }
    let decimals = (DIGITS - 1).saturating_sub(integer_width);

    // Worst case is "-" plus four digits plus the point.
    let mut formatted: String<8> = String::new();
    if write!(formatted, "{:.*}", decimals, magnitude).is_err() {
        return encode_text(OVERFLOW_TEXT);
    }
    let rounds_to_zero = formatted.chars().all(|c| c == '0' || c == '.');

    let mut digits: heapless::Vec<SegmentPattern, 8> = heapless::Vec::new();
    if negative && !rounds_to_zero && digits.push(char_to_segments('-')).is_err() {
        return encode_text(OVERFLOW_TEXT);
    }
    for c in formatted.chars() {
        let pushed = if c == '.' {
            match digits.last_mut() {
                Some(prev) => {
                    *prev = prev.with_decimal_point();
                    Ok(())
                }
                None => digits.push(SegmentPattern::DECIMAL_POINT),
            }
        } else {
            digits.push(char_to_segments(c))
        };
        if pushed.is_err() {
            return encode_text(OVERFLOW_TEXT);
        }
    }
    if digits.len() > DIGITS {
        return encode_text(OVERFLOW_TEXT);
    }

    let mut buffer = BLANK_DISPLAY;
    buffer[DIGITS - digits.len()..].copy_from_slice(&digits);
    buffer
}

/// Anything that can be shown on the four-digit display.
pub trait Displayable {
    /// Encode `self` into the four display positions.
    fn to_segments(&self) -> DisplayBuffer;
}

impl Displayable for str {
    fn to_segments(&self) -> DisplayBuffer {
        encode_text(self)
    }
}

impl<T: Displayable + ?Sized> Displayable for &T {
    fn to_segments(&self) -> DisplayBuffer {
        (**self).to_segments()
    }
}

impl Displayable for i32 {
    fn to_segments(&self) -> DisplayBuffer {
        encode_int(*self)
    }
}

impl Displayable for f32 {
    fn to_segments(&self) -> DisplayBuffer {
        encode_float(*self)
    }
}

impl Displayable for f64 {
    fn to_segments(&self) -> DisplayBuffer {
        encode_float(*self as f32)
    }
}

impl Displayable for DisplayBuffer {
    fn to_segments(&self) -> DisplayBuffer {
        *self
    }
}
