//! Board-level settings: reset state and bus timing.

/// Default time each multiplexed digit stays lit, in microseconds.
pub const DEFAULT_DIGIT_DWELL_US: u32 = 1_000;

/// Default wait around each edge on the input shift register, in microseconds.
pub const DEFAULT_INPUT_DELAY_US: u32 = 5;

/// A `BoardConfig` holds the settings the driver applies at construction and on
/// [`Board::reset`](crate::Board::reset), plus the timing handed to the bus drivers. Start from
/// `BoardConfig::default()` and chain the setters:
///
/// ```
/// # use es32a08::BoardConfig;
/// let config = BoardConfig::default()
///     .reset_relays_on(false)
///     .digit_dwell_us(800);
/// assert_eq!(config.digit_dwell(), 800);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "Settings have no effect unless the config is handed to the driver"]
pub struct BoardConfig {
    relays_on: bool,
    led_on: bool,
    digit_dwell_us: u32,
    input_delay_us: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            relays_on: false,
            led_on: true,
            digit_dwell_us: DEFAULT_DIGIT_DWELL_US,
            input_delay_us: DEFAULT_INPUT_DELAY_US,
        }
    }
}

impl BoardConfig {
    /// Whether all relays are closed (`true`) or open (`false`) at start-up and after a reset.
    pub fn reset_relays_on(mut self, on: bool) -> Self {
        self.relays_on = on;
        self
    }

    /// Whether the "PWR" LED is lit after a reset.
    pub fn reset_led_on(mut self, on: bool) -> Self {
        self.led_on = on;
        self
    }

    /// How long each digit stays latched before the refresh moves on. Four digits per cycle, so
    /// the full display repaints every `4 * us` microseconds; much past 5000 and it flickers.
    pub fn digit_dwell_us(mut self, us: u32) -> Self {
        self.digit_dwell_us = us;
        self
    }

    /// The wait after the input load strobe and before sampling each input bit.
    pub fn input_delay_us(mut self, us: u32) -> Self {
        self.input_delay_us = us;
        self
    }

    /// The relay byte applied at start-up and on reset.
    pub fn reset_relays(&self) -> u8 {
        if self.relays_on {
            0b1111_1111
        } else {
            0b0000_0000
        }
    }

    /// Whether the PWR LED is lit after a reset.
    pub fn reset_led(&self) -> bool {
        self.led_on
    }

    /// Digit dwell time in microseconds.
    pub fn digit_dwell(&self) -> u32 {
        self.digit_dwell_us
    }

    /// Input shift-register toggle delay in microseconds.
    pub fn input_delay(&self) -> u32 {
        self.input_delay_us
    }
}
