//! Modem control lines
//!
//! A board drives two lines into the module (power key, optional reset) and
//! senses one coming out of it (status). The traits here speak in raw pin
//! levels; which level means "pressed" or "on" is decided by
//! `gsmlink_drivers::PinControl` from the board's polarity settings.

/// Line driven by the board (power key, reset)
pub trait OutputPin {
    /// Drive the line high (`true`) or low (`false`)
    fn set_state(&mut self, high: bool);

    /// Level last driven onto the line
    ///
    /// The power-off sequence polls this to know whether the key is still
    /// held, so it must report the driven level without reading the pad.
    fn is_set_high(&self) -> bool;
}

/// Line sensed by the board (module status)
///
/// Reading takes `&mut self` because `embedded-hal` 1.0 input reads do.
pub trait InputPin {
    /// Whether the line currently reads high
    fn is_high(&mut self) -> bool;
}
