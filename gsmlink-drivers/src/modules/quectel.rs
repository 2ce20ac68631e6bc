//! Quectel modules (M95, UC15, EC2x)
//!
//! Enables automatic time zone and clock update from the network, so the
//! clock read diversion returns local network time once registered.
//!
//! ```text
//!   SETUP_HOOK_IN ──► ENABLE_NETWORK_TIME ──(OK)──► SETUP_HOOK_OUT
//!                            │
//!                       (no OK x3)
//!                            ▼
//!                      POWER_OFF_PRE
//! ```

use gsmlink_core::{Claim, Context, ExtensionKind, ProtocolExtension, StateId};

/// Update the RTC from network time and keep it updated
const ENABLE_NETWORK_TIME_CMD: &str = "AT+CTZU=2";

/// Quectel module extension
#[derive(Debug, Default, Clone, Copy)]
pub struct Quectel;

impl Quectel {
    /// Send the network time command
    pub const ENABLE_NETWORK_TIME: StateId = StateId(200);

    /// Create the extension; register it with the driver to take effect
    pub fn new() -> Self {
        Self
    }

    /// Name of a state owned by this extension
    pub fn state_name(state: StateId) -> Option<&'static str> {
        match state {
            Self::ENABLE_NETWORK_TIME => Some("EnableNetworkTime"),
            _ => None,
        }
    }
}

impl ProtocolExtension for Quectel {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Module
    }

    fn try_handle(&mut self, state: StateId, ctx: &mut Context<'_>) -> Claim {
        match state {
            StateId::SETUP_HOOK_IN => {
                ctx.engine.goto(Self::ENABLE_NETWORK_TIME, true);
            }
            Self::ENABLE_NETWORK_TIME => {
                ctx.command_ok(ENABLE_NETWORK_TIME_CMD, StateId::SETUP_HOOK_OUT, None);
            }
            _ => return Claim::NotHandled,
        }
        Claim::Handled
    }
}
