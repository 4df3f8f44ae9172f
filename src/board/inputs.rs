//! The board's inputs, plus the one LED that is wired straight to a GPIO.
//!
//! None of these share state with the display refresh, so they are plain owned wrappers with no
//! locking. Numbering follows the silkscreen: inputs 1 to 8, buttons 1 to 4.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::BoardConfig;
use crate::interface::InputBus;

/// Number of digital inputs on the 74HC165.
pub const DIGITAL_INPUTS: u8 = 8;

/// Number of onboard buttons.
pub const BUTTONS: u8 = 4;

/// The eight opto-isolated digital inputs, read through the input shift register.
pub struct DigitalInputs<B: InputBus> {
    bus: B,
}

impl<B: InputBus> DigitalInputs<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Read all eight inputs in one shift. Bit `n - 1` is input `n`.
    pub fn read_all(&mut self) -> Result<u8, B::Error> {
        self.bus.shift_in()
    }

    /// Read input `input`, 1 to 8. Any other number reads `false` without touching the bus.
    pub fn read(&mut self, input: u8) -> Result<bool, B::Error> {
        if !(1..=DIGITAL_INPUTS).contains(&input) {
            log::warn!("no digital input {}", input);
            return Ok(false);
        }
        Ok(self.read_all()? & (1 << (input - 1)) != 0)
    }

    pub fn release(self) -> B {
        self.bus
    }
}

/// The four onboard push buttons. They pull their pin low when pressed, so the pins need pull-ups
/// (internal or external) configured by the caller.
pub struct Buttons<P: InputPin> {
    pins: [P; BUTTONS as usize],
}

impl<P: InputPin> Buttons<P> {
    pub fn new(pins: [P; BUTTONS as usize]) -> Self {
        Self { pins }
    }

    /// Whether button `button`, 1 to 4, is held down. Any other number reads `false`.
    pub fn is_pressed(&mut self, button: u8) -> Result<bool, P::Error> {
        match button {
            1..=BUTTONS => self.pins[(button - 1) as usize].is_low(),
            _ => {
                log::warn!("no button {}", button);
                Ok(false)
            }
        }
    }

    /// All four buttons at once. Bit `n - 1` is set while button `n` is held.
    pub fn pressed(&mut self) -> Result<u8, P::Error> {
        let mut mask = 0u8;
        for (i, pin) in self.pins.iter_mut().enumerate() {
            if pin.is_low()? {
                mask |= 1 << i;
            }
        }
        Ok(mask)
    }

    pub fn release(self) -> [P; BUTTONS as usize] {
        self.pins
    }
}

/// The "PWR" LED. It is wired active-low.
pub struct PowerLed<P: OutputPin> {
    pin: P,
}

impl<P: OutputPin> PowerLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn set(&mut self, on: bool) -> Result<(), P::Error> {
        if on {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        }
    }

    /// Put the LED in the state `config` asks for after a board reset.
    pub fn reset(&mut self, config: &BoardConfig) -> Result<(), P::Error> {
        self.set(config.reset_led())
    }

    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::InputSpy;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as T};

    #[test]
    fn read_all_passes_through() {
        let spy = InputSpy::new(0b1000_0011);
        let mut inputs = DigitalInputs::new(spy.split());
        assert_eq!(inputs.read_all(), Ok(0b1000_0011));
        assert_eq!(spy.reads(), 1);
    }

    #[test]
    fn read_single_inputs() {
        let spy = InputSpy::new(0b1000_0001);
        let mut inputs = DigitalInputs::new(spy.split());
        assert_eq!(inputs.read(1), Ok(true));
        assert_eq!(inputs.read(2), Ok(false));
        assert_eq!(inputs.read(8), Ok(true));

        spy.set(0b0000_0000);
        assert_eq!(inputs.read(8), Ok(false));
    }

    #[test]
    fn read_out_of_range_skips_bus() {
        let spy = InputSpy::new(0xFF);
        let mut inputs = DigitalInputs::new(spy.split());
        assert_eq!(inputs.read(0), Ok(false));
        assert_eq!(inputs.read(9), Ok(false));
        assert_eq!(spy.reads(), 0);
    }

    #[test]
    fn buttons_active_low() {
        let pins = [
            PinMock::new(&[T::get(State::Low), T::get(State::Low)]),
            PinMock::new(&[T::get(State::High), T::get(State::High)]),
            PinMock::new(&[T::get(State::High)]),
            PinMock::new(&[T::get(State::Low)]),
        ];
        let mut buttons = Buttons::new(pins);
        assert!(buttons.is_pressed(1).unwrap());
        assert!(!buttons.is_pressed(2).unwrap());
        assert!(!buttons.is_pressed(0).unwrap());
        assert!(!buttons.is_pressed(5).unwrap());
        assert_eq!(buttons.pressed().unwrap(), 0b1001);

        for mut pin in buttons.release() {
            pin.done();
        }
    }

    #[test]
    fn power_led_active_low() {
        let pin = PinMock::new(&[
            T::set(State::Low),
            T::set(State::High),
            T::set(State::Low),
        ]);
        let mut led = PowerLed::new(pin);
        assert!(led.set(true).is_ok());
        assert!(led.set(false).is_ok());
        assert!(led.reset(&BoardConfig::default()).is_ok());
        led.release().done();
    }
}
