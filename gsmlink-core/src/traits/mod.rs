//! Collaborator traits
//!
//! These traits define the interface between the dialogue engine and the
//! board: the serial link to the modem and the modem's control lines.

pub mod control;
pub mod transport;

pub use control::ModemControl;
pub use transport::{Transport, TransportError};
