//! AT command line protocol
//!
//! This crate covers the byte-level side of talking to a cellular modem:
//! splitting the receive stream into lines, the command vocabulary, and
//! parsing the few structured replies the driver acts on.
//!
//! # Protocol Overview
//!
//! Every exchange is a command line followed by zero or more response lines
//! and a final result line:
//! ```text
//! → AT+CREG?\r\n
//! ← \r\n+CREG: 0,1\r\n
//! ← \r\nOK\r\n
//! ```
//!
//! Unsolicited lines (`RING`, `+CLIP`, `+CMTI`) may arrive at any time and
//! are interleaved with replies.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod at;
pub mod datetime;
pub mod framer;
pub mod response;

pub use datetime::{ClockText, DateTime, DateTimeError};
pub use framer::{Ingest, LineFramer, MAX_PENDING_LINES, QUIET_RESET_TICKS, RX_BUFFER_SIZE};
pub use response::{
    is_numeric, pin_status, quoted_identifier, registration, Identifier, PinStatus, Registration,
    MAX_ID_LEN,
};
