//! Board-side driver implementations
//!
//! This crate provides concrete implementations of the collaborator traits
//! defined in gsmlink-core, plus module-specific dialogue extensions:
//!
//! - Control lines (power key, reset, status) over GPIO pins
//! - Serial transport over UART halves
//! - Adapters from `embedded-hal` 1.0 pins and `embedded-io` serial ports
//! - Quectel module extension (network time sync at setup)

#![no_std]
#![deny(unsafe_code)]

pub mod control;
pub mod modules;
pub mod pins;
pub mod serial;

pub use control::{NoPin, PinControl, Polarity};
pub use modules::quectel::Quectel;
pub use pins::HalPin;
pub use serial::{IoSerial, SerialTransport};
