//! Shims between `embedded-hal` pins and the board's two serial shift-register chains.
//!
//! The output chain is three cascaded 74HC595s carrying relays, digit select and segments. The
//! input chain is a single 74HC165 carrying the eight digital inputs. Both are bit-banged over
//! plain GPIOs.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::frame::BusFrame;

/// The output chain implements this trait, which latches one whole [`BusFrame`] per call.
pub trait OutputBus {
    /// The type of error that a transmission may return.
    type Error;
    /// Shift `frame` out and latch it, then hold the outputs for the settle time before
    /// returning. The settle time doubles as the dwell time of a multiplexed digit.
    fn transmit(&mut self, frame: &BusFrame) -> Result<(), Self::Error>;
}

/// The input chain implements this trait, which samples all eight inputs per call.
pub trait InputBus {
    /// The type of error that a read may return.
    type Error;
    /// Strobe the parallel load and shift the eight input bits back. The first bit shifted in
    /// lands in bit 7 of the result.
    fn shift_in(&mut self) -> Result<u8, Self::Error>;
}

// This is here (and has to be pub) for doctests only. It's useless otherwise.
#[doc(hidden)]
pub mod noop {
    use super::{InputBus, OutputBus};
    use crate::frame::BusFrame;
    pub struct NoopBus;
    impl OutputBus for NoopBus {
        type Error = core::convert::Infallible;
        fn transmit(&mut self, _frame: &BusFrame) -> Result<(), Self::Error> {
            Ok(())
        }
    }
    impl InputBus for NoopBus {
        type Error = core::convert::Infallible;
        fn shift_in(&mut self) -> Result<u8, Self::Error> {
            Ok(0u8)
        }
    }
}

pub mod shift_out {
    //! The 74HC595 output chain: serial data, shift clock and storage latch.

    use super::*;

    /// The union of all errors that may occur on the output chain, one variant per pin.
    #[derive(Debug)]
    pub enum ShiftOutError<DE, CE, LE> {
        /// The serial data GPIO threw an error.
        DataError(DE),
        /// The shift clock GPIO threw an error.
        ClockError(CE),
        /// The storage latch GPIO threw an error.
        LatchError(LE),
    }

    impl<DE, CE, LE> ShiftOutError<DE, CE, LE> {
        fn from_data(e: DE) -> Self {
            Self::DataError(e)
        }
        fn from_clock(e: CE) -> Self {
            Self::ClockError(e)
        }
        fn from_latch(e: LE) -> Self {
            Self::LatchError(e)
        }
    }

    /// A configured `OutputBus` driving the 74HC595 chain.
    pub struct ShiftOutBus<DATA, CLOCK, LATCH, D> {
        /// GPIO output connected to the serial data input of the first register.
        data: DATA,
        /// GPIO output connected to the shift clock of every register.
        clock: CLOCK,
        /// GPIO output connected to the storage (latch) clock of every register.
        latch: LATCH,
        delay: D,
        settle_us: u32,
    }

    impl<DATA, CLOCK, LATCH, D> ShiftOutBus<DATA, CLOCK, LATCH, D>
    where
        DATA: OutputPin,
        CLOCK: OutputPin,
        LATCH: OutputPin,
        D: DelayNs,
    {
        /// Create the output chain driver. The pins must already be configured as push-pull
        /// outputs. `settle_us` is how long each latched frame is held before `transmit` returns
        /// (see [`BoardConfig::digit_dwell_us`](crate::BoardConfig::digit_dwell_us)).
        pub fn new(data: DATA, clock: CLOCK, latch: LATCH, delay: D, settle_us: u32) -> Self {
            Self {
                data,
                clock,
                latch,
                delay,
                settle_us,
            }
        }

        /// Give back the pins and the delay provider.
        pub fn release(self) -> (DATA, CLOCK, LATCH, D) {
            (self.data, self.clock, self.latch, self.delay)
        }

        fn shift_byte(
            &mut self,
            byte: u8,
        ) -> Result<(), ShiftOutError<DATA::Error, CLOCK::Error, LATCH::Error>> {
            for bit in (0..8).rev() {
                self.data
                    .set_state(PinState::from(byte & (1 << bit) != 0))
                    .map_err(ShiftOutError::from_data)?;
                self.clock.set_high().map_err(ShiftOutError::from_clock)?;
                self.clock.set_low().map_err(ShiftOutError::from_clock)?;
            }
            Ok(())
        }
    }

    impl<DATA, CLOCK, LATCH, D> OutputBus for ShiftOutBus<DATA, CLOCK, LATCH, D>
    where
        DATA: OutputPin,
        CLOCK: OutputPin,
        LATCH: OutputPin,
        D: DelayNs,
    {
        type Error = ShiftOutError<DATA::Error, CLOCK::Error, LATCH::Error>;

        fn transmit(&mut self, frame: &BusFrame) -> Result<(), Self::Error> {
            // Outputs keep their old state while the latch is low, so the three bytes appear at
            // the pins together on the rising edge.
            self.latch.set_low().map_err(ShiftOutError::from_latch)?;
            for byte in frame.to_bytes() {
                self.shift_byte(byte)?;
            }
            self.latch.set_high().map_err(ShiftOutError::from_latch)?;
            self.delay.delay_us(self.settle_us);
            Ok(())
        }
    }
}

pub mod shift_in {
    //! The 74HC165 input register: parallel load strobe, shift clock and serial data out.

    use super::*;

    /// The union of all errors that may occur on the input register, one variant per pin.
    #[derive(Debug)]
    pub enum ShiftInError<LE, CE, DE> {
        /// The parallel load GPIO threw an error.
        LoadError(LE),
        /// The shift clock GPIO threw an error.
        ClockError(CE),
        /// The serial data GPIO threw an error.
        DataError(DE),
    }

    impl<LE, CE, DE> ShiftInError<LE, CE, DE> {
        fn from_load(e: LE) -> Self {
            Self::LoadError(e)
        }
        fn from_clock(e: CE) -> Self {
            Self::ClockError(e)
        }
        fn from_data(e: DE) -> Self {
            Self::DataError(e)
        }
    }

    /// A configured `InputBus` reading the 74HC165.
    pub struct ShiftInBus<LOAD, CLOCK, DATA, D> {
        load: LOAD,
        clock: CLOCK,
        data: DATA,
        delay: D,
        toggle_us: u32,
    }

    impl<LOAD, CLOCK, DATA, D> ShiftInBus<LOAD, CLOCK, DATA, D>
    where
        LOAD: OutputPin,
        CLOCK: OutputPin,
        DATA: InputPin,
        D: DelayNs,
    {
        /// Create the input register driver. `load` should idle high. `toggle_us` is the wait
        /// after the load strobe and before sampling each bit (see
        /// [`BoardConfig::input_delay_us`](crate::BoardConfig::input_delay_us)).
        pub fn new(load: LOAD, clock: CLOCK, data: DATA, delay: D, toggle_us: u32) -> Self {
            Self {
                load,
                clock,
                data,
                delay,
                toggle_us,
            }
        }

        /// Give back the pins and the delay provider.
        pub fn release(self) -> (LOAD, CLOCK, DATA, D) {
            (self.load, self.clock, self.data, self.delay)
        }
    }

    impl<LOAD, CLOCK, DATA, D> InputBus for ShiftInBus<LOAD, CLOCK, DATA, D>
    where
        LOAD: OutputPin,
        CLOCK: OutputPin,
        DATA: InputPin,
        D: DelayNs,
    {
        type Error = ShiftInError<LOAD::Error, CLOCK::Error, DATA::Error>;

        fn shift_in(&mut self) -> Result<u8, Self::Error> {
            self.load.set_low().map_err(ShiftInError::from_load)?;
            self.delay.delay_us(self.toggle_us);
            self.load.set_high().map_err(ShiftInError::from_load)?;

            let mut inputs = 0u8;
            for i in 0..8 {
                self.clock.set_low().map_err(ShiftInError::from_clock)?;
                self.delay.delay_us(self.toggle_us);
                if self.data.is_high().map_err(ShiftInError::from_data)? {
                    inputs |= 1 << (7 - i);
                }
                self.clock.set_high().map_err(ShiftInError::from_clock)?;
            }
            Ok(inputs)
        }
    }
}
