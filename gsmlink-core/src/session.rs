//! Session bookkeeping shared with extensions
//!
//! Readiness, pending message operations and the data session request.
//! The built-in dialogue only sets and clears these flags; the messaging
//! and data session extensions do the actual work.

use gsmlink_protocol::{Identifier, MAX_ID_LEN};
use heapless::{String, Vec};

/// Longest text message body
pub const MAX_MESSAGE_LEN: usize = 160;

/// Longest HTTP URL
pub const MAX_URL_LEN: usize = 128;

/// Longest HTTP POST body
pub const MAX_BODY_LEN: usize = 256;

/// Errors from public session requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// A data session is already running
    Busy,
    /// Text, destination, URL or body does not fit
    TooLong,
}

/// Power and network readiness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readiness {
    /// The module was switched on and should stay on
    pub expect_on: bool,
    /// Network registration confirmed
    pub registered: bool,
}

/// Pending message operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageFlags {
    pub delete: bool,
    pub write: bool,
    pub read: bool,
    pub send: bool,
}

impl MessageFlags {
    /// Whether any message operation is outstanding
    pub fn any(&self) -> bool {
        self.delete || self.write || self.read || self.send
    }
}

/// Message queued by the application
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutgoingMessage {
    pub destination: Identifier,
    pub text: String<MAX_MESSAGE_LEN>,
}

/// Data session flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataFlags {
    /// A request is waiting to start
    pub pending: bool,
    /// A request is being carried out
    pub in_progress: bool,
    /// Keep the HTTP connection open between requests
    pub keep_alive: bool,
    /// The module restarted since the data session last ran
    pub restart: bool,
}

/// HTTP request queued by the application
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HttpRequest {
    pub url: String<MAX_URL_LEN>,
    /// POST body; `None` for GET
    pub body: Option<Vec<u8, MAX_BODY_LEN>>,
}

/// Session state
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub readiness: Readiness,
    pub message: MessageFlags,
    /// A message notification arrived since standby was last entered
    pub message_just_arrived: bool,
    pub outgoing: Option<OutgoingMessage>,
    pub data: DataFlags,
    pub request: Option<HttpRequest>,
}

impl Session {
    /// Nothing pending, not ready
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text message, replacing any unsent one
    pub fn send_message(&mut self, text: &str, destination: &str) -> Result<(), SessionError> {
        if destination.len() > MAX_ID_LEN {
            return Err(SessionError::TooLong);
        }
        let mut message = OutgoingMessage {
            destination: Identifier::new(),
            text: String::new(),
        };
        message
            .destination
            .push_str(destination)
            .map_err(|_| SessionError::TooLong)?;
        message
            .text
            .push_str(text)
            .map_err(|_| SessionError::TooLong)?;

        self.outgoing = Some(message);
        self.message.write = true;
        Ok(())
    }

    /// Whether a queued message has not been written to the module yet
    pub fn message_send_pending(&self) -> bool {
        self.message.write
    }

    /// Drop a queued message that has not been written yet
    pub fn cancel_message(&mut self) {
        self.message.write = false;
        self.outgoing = None;
    }

    /// Queue an HTTP GET
    pub fn http_get(&mut self, url: &str) -> Result<(), SessionError> {
        self.queue_request(url, None)
    }

    /// Queue an HTTP POST
    pub fn http_post(&mut self, url: &str, body: &[u8]) -> Result<(), SessionError> {
        let body = Vec::from_slice(body).map_err(|_| SessionError::TooLong)?;
        self.queue_request(url, Some(body))
    }

    fn queue_request(
        &mut self,
        url: &str,
        body: Option<Vec<u8, MAX_BODY_LEN>>,
    ) -> Result<(), SessionError> {
        if self.data.in_progress {
            return Err(SessionError::Busy);
        }
        let mut request = HttpRequest {
            url: String::new(),
            body,
        };
        request.url.push_str(url).map_err(|_| SessionError::TooLong)?;

        self.request = Some(request);
        self.data.pending = true;
        Ok(())
    }

    /// Whether a data request is queued or running
    pub fn data_pending(&self) -> bool {
        self.data.pending || self.data.in_progress
    }

    /// Drop a queued data request that has not started
    pub fn cancel_data(&mut self) {
        self.data.pending = false;
    }

    pub fn set_http_keep_alive(&mut self, keep_alive: bool) {
        self.data.keep_alive = keep_alive;
    }

    /// Reset the flags that do not survive a module restart
    pub(crate) fn module_restarted(&mut self) {
        self.readiness.expect_on = true;
        self.readiness.registered = false;
        // A queued outgoing message survives the restart
        self.message.delete = false;
        self.message.read = false;
        self.message.send = false;
        self.data.restart = true;
        self.data.in_progress = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message() {
        let mut session = Session::new();
        assert!(!session.message_send_pending());

        session.send_message("Pump failed", "+15551234").unwrap();
        assert!(session.message_send_pending());
        assert!(session.message.any());
        let outgoing = session.outgoing.as_ref().unwrap();
        assert_eq!(outgoing.destination.as_str(), "+15551234");
        assert_eq!(outgoing.text.as_str(), "Pump failed");

        session.cancel_message();
        assert!(!session.message_send_pending());
        assert!(session.outgoing.is_none());
    }

    #[test]
    fn test_send_message_rejects_long_destination() {
        let mut session = Session::new();
        assert_eq!(
            session.send_message("hi", "+1234567890123456"),
            Err(SessionError::TooLong)
        );
        assert!(!session.message_send_pending());
    }

    #[test]
    fn test_http_busy_while_in_progress() {
        let mut session = Session::new();
        session.http_get("http://example.com/a").unwrap();
        assert!(session.data_pending());

        session.data.pending = false;
        session.data.in_progress = true;
        assert_eq!(
            session.http_post("http://example.com/b", b"x=1"),
            Err(SessionError::Busy)
        );
        assert!(session.data_pending());
    }

    #[test]
    fn test_http_post_keeps_body() {
        let mut session = Session::new();
        session.http_post("http://example.com/log", b"t=21.5").unwrap();
        let request = session.request.as_ref().unwrap();
        assert_eq!(request.body.as_deref(), Some(&b"t=21.5"[..]));

        session.cancel_data();
        assert!(!session.data_pending());
    }

    #[test]
    fn test_restart_keeps_outgoing_message() {
        let mut session = Session::new();
        session.send_message("hello", "123").unwrap();
        session.message.read = true;
        session.data.in_progress = true;
        session.readiness.registered = true;

        session.module_restarted();
        assert!(session.message.write);
        assert!(!session.message.read);
        assert!(!session.data.in_progress);
        assert!(session.data.restart);
        assert!(session.readiness.expect_on);
        assert!(!session.readiness.registered);
    }
}
