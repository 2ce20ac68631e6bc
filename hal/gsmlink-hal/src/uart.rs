//! Serial communication abstractions
//!
//! The modem driver never blocks on the serial port: it asks whether the
//! transmitter can accept a byte or whether a received byte is waiting, and
//! only then moves a single byte.

/// Non-blocking serial transmitter
pub trait SerialTx {
    /// Error type for transmit operations
    type Error;

    /// Whether the transmitter can accept another byte right now
    fn is_tx_idle(&mut self) -> bool;

    /// Hand one byte to the transmitter
    ///
    /// Only called after [`SerialTx::is_tx_idle`] returned true.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;
}

/// Non-blocking serial receiver
pub trait SerialRx {
    /// Error type for receive operations
    type Error;

    /// Whether at least one received byte is waiting
    fn is_rx_ready(&mut self) -> bool;

    /// Take one received byte
    ///
    /// Only called after [`SerialRx::is_rx_ready`] returned true.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;
}
