//! Scaling for the four 4-20 mA and four 0-10 V analog inputs.
//!
//! The board divides each input down into the MCU's 12-bit ADC range. Sampling is left to the
//! platform through [`AdcReader`]; this module only picks the channel and applies the board's
//! fixed scale.

/// Number of channels of each kind.
pub const CHANNELS: u8 = 4;

/// Full-scale reading of the 12-bit ADC.
pub const ADC_FULL_SCALE: f32 = 4095.0;

/// Gain of the board's input divider, measured on the reference board.
pub const DIVIDER_GAIN: f32 = 2.0692;

/// Span of the current loop input, 4 to 20 mA.
const CURRENT_SPAN_MA: f32 = 20.0 - 4.0;

/// Span of the voltage input, 0 to 10 V.
const VOLTAGE_SPAN_V: f32 = 10.0;

/// One analog input terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalogInput {
    /// 4-20 mA input `I1`..`I4`, channel 0 to 3.
    Current(u8),
    /// 0-10 V input `V1`..`V4`, channel 0 to 3.
    Voltage(u8),
}

impl AnalogInput {
    fn channel(self) -> u8 {
        match self {
            AnalogInput::Current(c) | AnalogInput::Voltage(c) => c,
        }
    }

    pub fn is_valid(self) -> bool {
        self.channel() < CHANNELS
    }
}

/// ADC reading trait for platform abstraction.
pub trait AdcReader {
    type Error;
    /// Sample `input` and return the raw 12-bit reading (0 to 4095).
    fn read(&mut self, input: AnalogInput) -> Result<u16, Self::Error>;
}

/// Convert a raw reading from a current input into milliamps.
pub fn milliamps(raw: u16) -> f32 {
    (raw as f32 / ADC_FULL_SCALE) * CURRENT_SPAN_MA * DIVIDER_GAIN
}

/// Convert a raw reading from a voltage input into volts.
pub fn volts(raw: u16) -> f32 {
    (raw as f32 / ADC_FULL_SCALE) * VOLTAGE_SPAN_V * DIVIDER_GAIN
}

/// The eight analog inputs behind one ADC.
pub struct AnalogInputs<ADC: AdcReader> {
    adc: ADC,
}

impl<ADC: AdcReader> AnalogInputs<ADC> {
    pub fn new(adc: ADC) -> Self {
        Self { adc }
    }

    /// Raw reading of `input`. Channels past 3 read 0 without sampling.
    pub fn read_raw(&mut self, input: AnalogInput) -> Result<u16, ADC::Error> {
        if !input.is_valid() {
            log::warn!("no analog input {:?}", input);
            return Ok(0);
        }
        self.adc.read(input)
    }

    /// Current on 4-20 mA channel `channel`, in mA. Invalid channels read 0.
    pub fn read_milliamps(&mut self, channel: u8) -> Result<f32, ADC::Error> {
        let input = AnalogInput::Current(channel);
        if !input.is_valid() {
            log::warn!("no analog input {:?}", input);
            return Ok(0.0);
        }
        self.adc.read(input).map(milliamps)
    }

    /// Voltage on 0-10 V channel `channel`, in volts. Invalid channels read 0.
    pub fn read_volts(&mut self, channel: u8) -> Result<f32, ADC::Error> {
        let input = AnalogInput::Voltage(channel);
        if !input.is_valid() {
            log::warn!("no analog input {:?}", input);
            return Ok(0.0);
        }
        self.adc.read(input).map(volts)
    }

    pub fn release(self) -> ADC {
        self.adc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAdc {
        raw: u16,
        reads: Vec<AnalogInput>,
    }

    impl AdcReader for FixedAdc {
        type Error = core::convert::Infallible;
        fn read(&mut self, input: AnalogInput) -> Result<u16, Self::Error> {
            self.reads.push(input);
            Ok(self.raw)
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn scale_endpoints() {
        assert_eq!(milliamps(0), 0.0);
        assert_eq!(volts(0), 0.0);
        assert!(close(milliamps(4095), 16.0 * 2.0692));
        assert!(close(volts(4095), 10.0 * 2.0692));
    }

    #[test]
    fn scale_midpoint() {
        assert!(close(volts(2048), 2048.0 / 4095.0 * 20.692));
    }

    #[test]
    fn reads_valid_channels() {
        let mut inputs = AnalogInputs::new(FixedAdc {
            raw: 4095,
            reads: Vec::new(),
        });
        assert!(close(inputs.read_volts(3).unwrap(), 20.692));
        assert!(close(inputs.read_milliamps(0).unwrap(), 33.1072));
        assert_eq!(inputs.read_raw(AnalogInput::Voltage(1)), Ok(4095));
        assert_eq!(
            inputs.release().reads,
            vec![
                AnalogInput::Voltage(3),
                AnalogInput::Current(0),
                AnalogInput::Voltage(1)
            ]
        );
    }

    #[test]
    fn invalid_channels_read_zero() {
        let mut inputs = AnalogInputs::new(FixedAdc {
            raw: 4095,
            reads: Vec::new(),
        });
        assert_eq!(inputs.read_volts(4), Ok(0.0));
        assert_eq!(inputs.read_milliamps(200), Ok(0.0));
        assert_eq!(inputs.read_raw(AnalogInput::Current(4)), Ok(0));
        assert!(inputs.release().reads.is_empty());
    }
}
