//! Board-agnostic modem dialogue engine
//!
//! This crate contains everything between the serial bytes and the
//! application that does not depend on specific hardware:
//!
//! - Collaborator traits (serial transport, power/reset/status lines)
//! - Ordered non-blocking transmit queue
//! - State engine (delays, timeouts, priority diversions)
//! - The modem dialogue table (power sequencing, PIN, registration, standby)
//! - Extension dispatch for messaging, data sessions and module quirks
//! - The [`ModemDriver`] aggregate with its tick and poll entry points

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod dialogue;
pub mod driver;
pub mod events;
pub mod extension;
pub mod session;
pub mod state;
pub mod traits;
pub mod txqueue;

pub use config::{DriverConfig, RxMode, Timings};
pub use driver::ModemDriver;
pub use events::{Event, EventKind, EventSink, PinCode};
pub use extension::{Claim, Context, ExtensionError, ExtensionKind, ProtocolExtension};
pub use session::{HttpRequest, OutgoingMessage, Session, SessionError};
pub use state::{StateEngine, StateId};
pub use traits::{ModemControl, Transport};
pub use txqueue::{TxQueue, TxQueueError};
