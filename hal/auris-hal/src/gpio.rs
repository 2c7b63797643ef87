//! GPIO pin abstractions
//!
//! Digital input and output traits, plus adapters that lift any
//! `embedded-hal` 1.0 pin into them.

use embedded_hal::digital::{InputPin as EhInputPin, OutputPin as EhOutputPin};

/// Digital output pin
///
/// Used for the coprocessor power switch and the I2S activity indicator.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
///
/// Sampling takes `&mut self` so that `embedded-hal` inputs (which
/// require it) can be adapted without interior mutability.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }
}

/// Adapter for an `embedded-hal` output pin
///
/// Tracks the last commanded level so `is_set_high` does not need a
/// stateful pin. Driver errors are dropped: GPIO writes on the supported
/// boards are infallible.
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P: EhOutputPin> EhOutput<P> {
    /// Wrap a pin whose current level is `initially_high`
    pub fn new(pin: P, initially_high: bool) -> Self {
        Self {
            pin,
            high: initially_high,
        }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: EhOutputPin> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Adapter for an `embedded-hal` input pin
///
/// A failed read is reported as high (inactive for the active-low lines
/// this firmware samples).
pub struct EhInput<P> {
    pin: P,
}

impl<P: EhInputPin> EhInput<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: EhInputPin> InputPin for EhInput<P> {
    fn is_high(&mut self) -> bool {
        self.pin.is_high().unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    #[test]
    fn test_output_tracks_commanded_level() {
        let expectations = [
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ];
        let mut pin = EhOutput::new(PinMock::new(&expectations), true);

        pin.set_state(false);
        assert!(pin.is_set_low());
        pin.set_high();
        assert!(pin.is_set_high());

        pin.into_inner().done();
    }

    #[test]
    fn test_input_reads_level() {
        let expectations = [
            Transaction::get(State::Low),
            Transaction::get(State::High),
        ];
        let mut pin = EhInput::new(PinMock::new(&expectations));

        assert!(pin.is_low());
        assert!(pin.is_high());

        pin.into_inner().done();
    }
}
