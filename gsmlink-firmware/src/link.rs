//! Non-blocking serial halves over the UART channels

use gsmlink_core::traits::TransportError;
use gsmlink_drivers::serial::SerialError;
use gsmlink_hal::{SerialRx, SerialTx};

use crate::channels::{MODEM_RX, MODEM_TX};

/// Channel access failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The outbound channel was full
    Full,
    /// The inbound channel was empty
    Empty,
}

impl SerialError for LinkError {
    fn classify(&self) -> TransportError {
        match self {
            LinkError::Full => TransportError::WriteFailed,
            LinkError::Empty => TransportError::Other,
        }
    }
}

/// Transmit half feeding the UART TX task
pub struct ChannelTx;

impl SerialTx for ChannelTx {
    type Error = LinkError;

    fn is_tx_idle(&mut self) -> bool {
        !MODEM_TX.is_full()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        MODEM_TX.try_send(byte).map_err(|_| LinkError::Full)
    }
}

/// Receive half fed by the UART RX task
pub struct ChannelRx;

impl SerialRx for ChannelRx {
    type Error = LinkError;

    fn is_rx_ready(&mut self) -> bool {
        !MODEM_RX.is_empty()
    }

    fn read_byte(&mut self) -> Result<u8, LinkError> {
        MODEM_RX.try_receive().map_err(|_| LinkError::Empty)
    }
}
