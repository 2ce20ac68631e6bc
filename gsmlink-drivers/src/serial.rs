//! Serial transport over UART halves
//!
//! [`SerialTransport`] joins a transmit half and a receive half that
//! implement the gsmlink-hal serial traits into the driver's
//! [`Transport`]. [`IoSerial`] provides those halves for any port that
//! implements the non-blocking `embedded-io` readiness traits.

use embedded_io::{ErrorKind, Read, ReadReady, Write, WriteReady};
use gsmlink_core::traits::{Transport, TransportError};
use gsmlink_hal::{SerialRx, SerialTx};

/// Error classification for serial halves
pub trait SerialError {
    /// Map into the driver's transport error
    fn classify(&self) -> TransportError;
}

impl SerialError for core::convert::Infallible {
    fn classify(&self) -> TransportError {
        match *self {}
    }
}

/// Transport built from separate transmit and receive halves
pub struct SerialTransport<TX, RX> {
    tx: TX,
    rx: RX,
}

impl<TX, RX> SerialTransport<TX, RX>
where
    TX: SerialTx,
    RX: SerialRx,
    TX::Error: SerialError,
    RX::Error: SerialError,
{
    /// Combine a transmit and a receive half
    pub fn new(tx: TX, rx: RX) -> Self {
        Self { tx, rx }
    }

    /// Give the halves back
    pub fn release(self) -> (TX, RX) {
        (self.tx, self.rx)
    }
}

impl<TX, RX> Transport for SerialTransport<TX, RX>
where
    TX: SerialTx,
    RX: SerialRx,
    TX::Error: SerialError,
    RX::Error: SerialError,
{
    fn is_tx_idle(&mut self) -> bool {
        self.tx.is_tx_idle()
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.tx.write_byte(byte).map_err(|e| e.classify())
    }

    fn is_rx_ready(&mut self) -> bool {
        self.rx.is_rx_ready()
    }

    fn recv_byte(&mut self) -> Result<u8, TransportError> {
        self.rx.read_byte().map_err(|e| e.classify())
    }
}

/// Error of an [`IoSerial`] port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// The port reported an error of this kind
    Port(IoErrorKind),
    /// The port accepted or returned zero bytes
    NoProgress,
}

/// Reduced `embedded_io::ErrorKind`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoErrorKind {
    InvalidData,
    OutOfMemory,
    Other,
}

impl From<ErrorKind> for IoErrorKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidData => IoErrorKind::InvalidData,
            ErrorKind::OutOfMemory => IoErrorKind::OutOfMemory,
            _ => IoErrorKind::Other,
        }
    }
}

impl SerialError for IoError {
    fn classify(&self) -> TransportError {
        match self {
            IoError::Port(IoErrorKind::InvalidData) => TransportError::Corrupted,
            IoError::Port(IoErrorKind::OutOfMemory) => TransportError::Overrun,
            IoError::Port(IoErrorKind::Other) => TransportError::Other,
            IoError::NoProgress => TransportError::WriteFailed,
        }
    }
}

fn port_error<E: embedded_io::Error>(e: E) -> IoError {
    IoError::Port(e.kind().into())
}

/// Serial halves over an `embedded-io` port
///
/// Readiness is asked of the port first, so reads and writes never block.
/// A port that reports an error while being asked for readiness is treated
/// as not ready; the error surfaces on the next transfer attempt instead.
pub struct IoSerial<P> {
    port: P,
}

impl<P> IoSerial<P> {
    /// Wrap an `embedded-io` port
    pub fn new(port: P) -> Self {
        Self { port }
    }

    pub fn inner(&self) -> &P {
        &self.port
    }

    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_inner(self) -> P {
        self.port
    }
}

impl<P: Write + WriteReady> SerialTx for IoSerial<P> {
    type Error = IoError;

    fn is_tx_idle(&mut self) -> bool {
        self.port.write_ready().unwrap_or(false)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), IoError> {
        match self.port.write(&[byte]).map_err(port_error)? {
            0 => Err(IoError::NoProgress),
            _ => Ok(()),
        }
    }
}

impl<P: Read + ReadReady> SerialRx for IoSerial<P> {
    type Error = IoError;

    fn is_rx_ready(&mut self) -> bool {
        self.port.read_ready().unwrap_or(false)
    }

    fn read_byte(&mut self) -> Result<u8, IoError> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte).map_err(port_error)? {
            0 => Err(IoError::NoProgress),
            _ => Ok(byte[0]),
        }
    }
}

// A single bidirectional port is a transport on its own
impl<P> Transport for IoSerial<P>
where
    P: Read + ReadReady + Write + WriteReady,
{
    fn is_tx_idle(&mut self) -> bool {
        SerialTx::is_tx_idle(self)
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.write_byte(byte).map_err(|e| e.classify())
    }

    fn is_rx_ready(&mut self) -> bool {
        SerialRx::is_rx_ready(self)
    }

    fn recv_byte(&mut self) -> Result<u8, TransportError> {
        self.read_byte().map_err(|e| e.classify())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::{Deque, Vec};

    #[derive(Debug)]
    struct MockError(ErrorKind);

    impl embedded_io::Error for MockError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    /// Port with a receive FIFO and a bounded transmit buffer
    struct MockPort {
        rx: Deque<u8, 16>,
        tx: Vec<u8, 4>,
        fail: Option<ErrorKind>,
    }

    impl MockPort {
        fn new(incoming: &[u8]) -> Self {
            let mut rx = Deque::new();
            for &b in incoming {
                rx.push_back(b).ok();
            }
            Self {
                rx,
                tx: Vec::new(),
                fail: None,
            }
        }
    }

    impl embedded_io::ErrorType for MockPort {
        type Error = MockError;
    }

    impl Read for MockPort {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, MockError> {
            if let Some(kind) = self.fail {
                return Err(MockError(kind));
            }
            match self.rx.pop_front() {
                Some(b) if !buf.is_empty() => {
                    buf[0] = b;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    impl ReadReady for MockPort {
        fn read_ready(&mut self) -> Result<bool, MockError> {
            Ok(!self.rx.is_empty())
        }
    }

    impl Write for MockPort {
        fn write(&mut self, buf: &[u8]) -> Result<usize, MockError> {
            match buf.first() {
                Some(&b) if self.tx.push(b).is_ok() => Ok(1),
                _ => Ok(0),
            }
        }

        fn flush(&mut self) -> Result<(), MockError> {
            Ok(())
        }
    }

    impl WriteReady for MockPort {
        fn write_ready(&mut self) -> Result<bool, MockError> {
            Ok(!self.tx.is_full())
        }
    }

    #[test]
    fn test_reads_until_empty() {
        let mut port = IoSerial::new(MockPort::new(b"OK"));
        assert!(Transport::is_rx_ready(&mut port));
        assert_eq!(port.recv_byte(), Ok(b'O'));
        assert_eq!(port.recv_byte(), Ok(b'K'));
        assert!(!Transport::is_rx_ready(&mut port));
    }

    #[test]
    fn test_write_stops_when_full() {
        let mut port = IoSerial::new(MockPort::new(&[]));
        for &b in b"AT\r\n" {
            assert!(Transport::is_tx_idle(&mut port));
            assert_eq!(port.send_byte(b), Ok(()));
        }
        assert!(!Transport::is_tx_idle(&mut port));
        assert_eq!(port.send_byte(b'X'), Err(TransportError::WriteFailed));
        assert_eq!(port.inner().tx.as_slice(), b"AT\r\n");
    }

    #[test]
    fn test_error_classification() {
        let mut port = MockPort::new(b"x");
        port.fail = Some(ErrorKind::InvalidData);
        let mut port = IoSerial::new(port);
        assert_eq!(port.recv_byte(), Err(TransportError::Corrupted));

        port.inner_mut().fail = Some(ErrorKind::OutOfMemory);
        assert_eq!(port.recv_byte(), Err(TransportError::Overrun));

        port.inner_mut().fail = Some(ErrorKind::TimedOut);
        assert_eq!(port.recv_byte(), Err(TransportError::Other));
    }

    struct Halves {
        pending: Option<u8>,
        sent: Vec<u8, 8>,
    }

    impl SerialTx for Halves {
        type Error = core::convert::Infallible;

        fn is_tx_idle(&mut self) -> bool {
            true
        }

        fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
            self.sent.push(byte).ok();
            Ok(())
        }
    }

    impl SerialRx for Halves {
        type Error = core::convert::Infallible;

        fn is_rx_ready(&mut self) -> bool {
            self.pending.is_some()
        }

        fn read_byte(&mut self) -> Result<u8, Self::Error> {
            Ok(self.pending.take().unwrap_or(0))
        }
    }

    #[test]
    fn test_joins_halves() {
        let tx = Halves {
            pending: None,
            sent: Vec::new(),
        };
        let rx = Halves {
            pending: Some(b'>'),
            sent: Vec::new(),
        };
        let mut transport = SerialTransport::new(tx, rx);
        assert!(transport.is_rx_ready());
        assert_eq!(transport.recv_byte(), Ok(b'>'));
        assert!(!transport.is_rx_ready());
        assert_eq!(transport.send_byte(0x1A), Ok(()));

        let (tx, _) = transport.release();
        assert_eq!(tx.sent.as_slice(), &[0x1A]);
    }
}
