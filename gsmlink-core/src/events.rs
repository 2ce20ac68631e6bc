//! Events delivered to the application
//!
//! Events are delivered synchronously through [`EventSink::on_event`] and
//! borrow their payload from the driver. A sink must copy anything it needs
//! before returning.

use gsmlink_protocol::{DateTime, DateTimeError};
use heapless::String;

/// SIM PIN supplied by the application
pub type PinCode = String<8>;

/// Notification from the driver
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event<'a> {
    // Clock
    /// The module clock was read
    ClockRead(Result<DateTime, DateTimeError>),
    /// The module clock is about to be set; fill in the value to write
    ClockWriteRequest(&'a mut DateTime),

    // Identity and SIM
    /// The module reported its IMEI
    IdentityRead(&'a str),
    /// The SIM needs a PIN; fill it in, or leave it empty to decline
    PinRequested(&'a mut PinCode),
    /// The SIM rejected the PIN; the driver stops until power is cycled
    PinIncorrect,

    // Calls
    /// An incoming call rang; carries the caller id
    MissedCall(&'a str),

    // Messaging
    /// A message was read
    MessageReceived { originator: &'a str, text: &'a str },
    /// An outgoing message was stored on the module
    MessageDrafted,
    /// An outgoing message was dropped before it was sent
    MessageDiscarded,
    /// An outgoing message was sent
    MessageSent,
    /// An outgoing message could not be sent
    MessageSendFailed,

    // Data session
    /// The data session could not complete the request
    DataSessionFailed,
    /// The HTTP request finished with an error status
    HttpResultError(&'a str),
    /// One line of an HTTP response body
    HttpResponseLine(&'a [u8]),
}

/// Numeric event codes
///
/// Codes sit in the state range of the category that raises them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EventKind {
    ClockRead = 150,
    ClockWriteRequest = 151,
    IdentityRead = 20,
    PinRequested = 30,
    PinIncorrect = 31,
    MissedCall = 70,
    MessageReceived = 80,
    MessageDrafted = 81,
    MessageDiscarded = 82,
    MessageSent = 83,
    MessageSendFailed = 84,
    DataSessionFailed = 110,
    HttpResultError = 111,
    HttpResponseLine = 112,
}

impl Event<'_> {
    /// Payload-free kind of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ClockRead(_) => EventKind::ClockRead,
            Event::ClockWriteRequest(_) => EventKind::ClockWriteRequest,
            Event::IdentityRead(_) => EventKind::IdentityRead,
            Event::PinRequested(_) => EventKind::PinRequested,
            Event::PinIncorrect => EventKind::PinIncorrect,
            Event::MissedCall(_) => EventKind::MissedCall,
            Event::MessageReceived { .. } => EventKind::MessageReceived,
            Event::MessageDrafted => EventKind::MessageDrafted,
            Event::MessageDiscarded => EventKind::MessageDiscarded,
            Event::MessageSent => EventKind::MessageSent,
            Event::MessageSendFailed => EventKind::MessageSendFailed,
            Event::DataSessionFailed => EventKind::DataSessionFailed,
            Event::HttpResultError(_) => EventKind::HttpResultError,
            Event::HttpResponseLine(_) => EventKind::HttpResponseLine,
        }
    }

    /// Check if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::PinIncorrect
                | Event::MessageDiscarded
                | Event::MessageSendFailed
                | Event::DataSessionFailed
                | Event::HttpResultError(_)
        )
    }
}

/// Receiver of driver events
pub trait EventSink {
    /// Handle one event
    ///
    /// Called from inside [`crate::ModemDriver::poll`]; must not block.
    fn on_event(&mut self, event: Event<'_>);
}

impl<F> EventSink for F
where
    F: FnMut(Event<'_>),
{
    fn on_event(&mut self, event: Event<'_>) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(Event::IdentityRead("1").kind() as u8, 20);
        assert_eq!(Event::PinIncorrect.kind() as u8, 31);
        assert_eq!(Event::MissedCall("").kind() as u8, 70);
        assert_eq!(Event::MessageSendFailed.kind() as u8, 84);
        assert_eq!(Event::HttpResponseLine(b"").kind() as u8, 112);
        assert_eq!(Event::ClockRead(Err(DateTimeError::MissingDate)).kind() as u8, 150);
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::PinIncorrect.is_failure());
        assert!(Event::DataSessionFailed.is_failure());
        assert!(!Event::MessageSent.is_failure());
        assert!(!Event::MissedCall("+15551234").is_failure());
    }

    #[test]
    fn test_closure_sink_fills_pin() {
        let mut sink = |event: Event<'_>| {
            if let Event::PinRequested(pin) = event {
                let _ = pin.push_str("1234");
            }
        };
        let mut pin = PinCode::new();
        sink.on_event(Event::PinRequested(&mut pin));
        assert_eq!(pin.as_str(), "1234");
    }
}
