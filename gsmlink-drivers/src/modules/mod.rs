//! Module-specific dialogue extensions
//!
//! Each extension claims the setup hook of the built-in dialogue and adds
//! whatever the module needs before network registration.

pub mod quectel;
