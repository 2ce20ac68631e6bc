//! `embedded-hal` 1.0 pin adapter
//!
//! Wraps any `embedded_hal::digital` pin so it can be used where the
//! gsmlink-hal traits are expected. Pin errors are swallowed: a failed
//! write leaves the cached level unchanged and a failed read reports low.

use embedded_hal::digital::{InputPin as EhInputPin, OutputPin as EhOutputPin};
use gsmlink_hal::{InputPin, OutputPin};

/// Adapter from an `embedded-hal` pin
pub struct HalPin<P> {
    pin: P,
    level: bool,
}

impl<P> HalPin<P> {
    /// Wrap `pin`; the cached output level starts low
    pub fn new(pin: P) -> Self {
        Self { pin, level: false }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: EhOutputPin> OutputPin for HalPin<P> {
    fn set_state(&mut self, high: bool) {
        let driven = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if driven.is_ok() {
            self.level = high;
        }
    }

    fn is_set_high(&self) -> bool {
        self.level
    }
}

impl<P: EhInputPin> InputPin for HalPin<P> {
    fn is_high(&mut self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }
}
