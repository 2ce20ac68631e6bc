//! Driver configuration
//!
//! Every timing constant and retry limit of the modem dialogue lives here,
//! with defaults matching common SIMCom/Quectel 2G modules. Times are in
//! milliseconds, which is also the tick period of [`crate::ModemDriver::tick`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use gsmlink_protocol::QUIET_RESET_TICKS;

/// Where received bytes are pulled into the line framer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RxMode {
    /// A couple of bytes per tick, remainder in poll
    #[default]
    Tick,
    /// Only in poll; poll must run often enough not to lose bytes
    Poll,
}

/// Dialogue timings in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timings {
    /// Wait for OK after a command sent by the command-OK primitive
    pub command_timeout_ms: u32,
    /// Wait for the reply to a status query (IMEI, PIN, registration, clock)
    pub query_timeout_ms: u32,
    /// Wait for the reply to a PIN submission
    pub pin_timeout_ms: u32,
    /// Wait for the trailing OK after a parsed reply
    pub ok_timeout_ms: u32,
    /// Power key held to switch the module on
    pub power_on_press_ms: u32,
    /// Time allowed for the status line to report on after a power-on pulse
    pub power_on_confirm_ms: u32,
    /// Settle time after the module first reports on
    pub stabilise_ms: u32,
    /// Longest power key press while switching off
    pub power_off_press_ms: u32,
    /// Status line must read off this long before the key is released early
    pub power_off_confirm_ms: u32,
    /// Give up waiting for the module to switch off and press again
    pub power_off_give_up_ms: u32,
    /// Rest after the module reports off
    pub power_off_rest_ms: u32,
    /// Reset line pulse length
    pub reset_pulse_ms: u32,
    /// Wait after releasing the reset line
    pub reset_release_ms: u32,
    /// SIM initialisation time after a PIN is accepted
    pub sim_settle_ms: u32,
    /// Back-off between message alert enable attempts
    pub alert_backoff_ms: u32,
    /// Total time allowed to register before power cycling
    pub registration_window_ms: u32,
    /// Re-query delay while not registered
    pub registration_retry_ms: u32,
    /// Quiet time in standby before re-checking registration
    pub idle_recheck_ms: u32,
    /// Wait for +CLIP after RING
    pub caller_id_timeout_ms: u32,
    /// Wait for NO CARRIER (reset by each RING)
    pub call_end_timeout_ms: u32,
    /// Status line must read off this long before power loss is assumed
    pub power_loss_confirm_ms: u32,
    /// Delay before restarting after an unexpected power loss
    pub power_loss_restart_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            command_timeout_ms: 1000,
            query_timeout_ms: 500,
            pin_timeout_ms: 2500,
            ok_timeout_ms: 250,
            power_on_press_ms: 1000,
            power_on_confirm_ms: 5000,
            stabilise_ms: 10_000,
            power_off_press_ms: 1500,
            power_off_confirm_ms: 100,
            power_off_give_up_ms: 20_000,
            power_off_rest_ms: 5000,
            reset_pulse_ms: 500,
            reset_release_ms: 1000,
            sim_settle_ms: 5000,
            alert_backoff_ms: 5000,
            registration_window_ms: 60_000,
            registration_retry_ms: 5000,
            idle_recheck_ms: 60_000,
            caller_id_timeout_ms: 500,
            call_end_timeout_ms: 5000,
            power_loss_confirm_ms: 100,
            power_loss_restart_ms: 2500,
        }
    }
}

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriverConfig {
    /// Receive path
    pub rx_mode: RxMode,
    /// Bytes ingested per tick in [`RxMode::Tick`]
    pub bytes_per_tick: u8,
    /// Ticks of receive silence before the buffer is discarded
    pub quiet_ticks: u8,
    /// Whether a hardware reset line is wired
    pub reset_enabled: bool,
    /// Sends of one command before the command-OK primitive gives up
    pub command_attempts: u8,
    /// Status queries before giving up (IMEI, PIN, clock)
    pub query_attempts: u8,
    /// Message alert enable rounds before power cycling
    pub alert_attempts: u8,
    /// Power-off presses before the reset line is used
    pub power_off_attempts: u8,
    pub timings: Timings,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            rx_mode: RxMode::Tick,
            bytes_per_tick: 2,
            quiet_ticks: QUIET_RESET_TICKS,
            reset_enabled: false,
            command_attempts: 3,
            query_attempts: 3,
            alert_attempts: 5,
            power_off_attempts: 3,
            timings: Timings::default(),
        }
    }
}
