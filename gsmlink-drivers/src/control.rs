//! Modem control lines over GPIO
//!
//! Most modules are switched with an open-collector transistor on the
//! PWRKEY input, so the pin that drives it is usually active-high on the
//! MCU side even though the module sees an active-low key. The status
//! output of the module is active-high on SIMCom and Quectel parts but
//! some carrier boards invert it. Both polarities are configurable.

use gsmlink_core::ModemControl;
use gsmlink_hal::{InputPin, OutputPin};

/// Placeholder for boards without a reset line
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin;

impl OutputPin for NoPin {
    fn set_state(&mut self, _high: bool) {}

    fn is_set_high(&self) -> bool {
        false
    }
}

/// Line polarities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Polarity {
    /// If true, key pressed = pin LOW
    pub power_key_inverted: bool,
    /// If true, module on = status pin LOW
    pub status_inverted: bool,
    /// If true, reset asserted = pin LOW
    pub reset_inverted: bool,
}

/// GPIO-backed modem control
pub struct PinControl<K, S, R = NoPin> {
    power_key: K,
    status: S,
    reset: Option<R>,
    polarity: Polarity,
    pressed: bool,
    asserted: bool,
}

impl<K: OutputPin, S: InputPin> PinControl<K, S, NoPin> {
    /// Control lines without a reset pin
    pub fn new(power_key: K, status: S, polarity: Polarity) -> Self {
        Self::build(power_key, status, None, polarity)
    }
}

impl<K: OutputPin, S: InputPin, R: OutputPin> PinControl<K, S, R> {
    /// Control lines with a hardware reset pin
    pub fn with_reset(power_key: K, status: S, reset: R, polarity: Polarity) -> Self {
        Self::build(power_key, status, Some(reset), polarity)
    }

    fn build(power_key: K, status: S, reset: Option<R>, polarity: Polarity) -> Self {
        let mut control = Self {
            power_key,
            status,
            reset,
            polarity,
            pressed: false,
            asserted: false,
        };
        // Key released and reset released before the driver takes over
        control.set_power_key(false);
        control.set_reset(false);
        control
    }

    /// Whether a reset pin is wired
    pub fn has_reset(&self) -> bool {
        self.reset.is_some()
    }

    /// Give the pins back
    pub fn release(self) -> (K, S, Option<R>) {
        (self.power_key, self.status, self.reset)
    }
}

impl<K: OutputPin, S: InputPin, R: OutputPin> ModemControl for PinControl<K, S, R> {
    fn is_powered(&mut self) -> bool {
        self.status.is_high() != self.polarity.status_inverted
    }

    fn set_power_key(&mut self, pressed: bool) {
        self.pressed = pressed;
        self.power_key
            .set_state(pressed != self.polarity.power_key_inverted);
    }

    fn is_power_key_pressed(&self) -> bool {
        self.pressed
    }

    fn set_reset(&mut self, asserted: bool) {
        let Some(pin) = self.reset.as_mut() else {
            return;
        };
        self.asserted = asserted;
        pin.set_state(asserted != self.polarity.reset_inverted);
    }

    fn is_reset_asserted(&self) -> bool {
        self.asserted
    }
}
