//! Modem control line trait

/// Power key, reset and status lines of the modem
///
/// Implementations map logical states to pin levels; the driver only ever
/// speaks in terms of "pressed", "asserted" and "powered".
pub trait ModemControl {
    /// Whether the status line reports the module as powered
    ///
    /// Takes `&mut self` because input reads typically require mutable access.
    fn is_powered(&mut self) -> bool;

    /// Press (`true`) or release (`false`) the power key
    fn set_power_key(&mut self, pressed: bool);

    /// Whether the power key is currently pressed
    fn is_power_key_pressed(&self) -> bool;

    /// Assert (`true`) or release (`false`) the hardware reset line
    ///
    /// Boards without a reset line keep the default no-op.
    fn set_reset(&mut self, _asserted: bool) {}

    /// Whether the reset line is currently asserted
    fn is_reset_asserted(&self) -> bool {
        false
    }
}
