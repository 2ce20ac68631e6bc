//! Serial transport trait

/// Errors reported by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Receiver overrun; bytes were lost in hardware
    Overrun,
    /// Framing, parity or noise error on a received byte
    Corrupted,
    /// Transmitter refused the byte
    WriteFailed,
    /// Any other peripheral error
    Other,
}

/// Non-blocking serial link to the modem
///
/// Every call must return immediately. The driver only sends when
/// [`Transport::is_tx_idle`] is true and only receives when
/// [`Transport::is_rx_ready`] is true.
pub trait Transport {
    /// Whether another byte can be handed to the transmitter
    fn is_tx_idle(&mut self) -> bool;

    /// Send one byte
    fn send_byte(&mut self, byte: u8) -> Result<(), TransportError>;

    /// Whether a received byte is waiting
    fn is_rx_ready(&mut self) -> bool;

    /// Take one received byte
    fn recv_byte(&mut self) -> Result<u8, TransportError>;
}
