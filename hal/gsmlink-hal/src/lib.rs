//! Board interface of the gsmlink modem driver
//!
//! Everything the driver needs from a board: the power key, reset and
//! status lines in [`gpio`], and a byte-at-a-time serial port in [`uart`].
//! `gsmlink-drivers` builds the driver's control and transport
//! collaborators on top of these, and adapts `embedded-hal` pins and
//! `embedded-io` ports to them.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::{InputPin, OutputPin};
pub use uart::{SerialRx, SerialTx};
