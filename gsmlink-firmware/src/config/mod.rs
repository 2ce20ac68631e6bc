//! Configuration loading and parsing
//!
//! The configuration is compiled in from `modem.toml` and parsed at start
//! by a custom no_std parser. `build.rs` has already validated the file,
//! so a parse failure here means the two have drifted apart.

pub mod toml;

use defmt::*;

use gsmlink_core::{DriverConfig, PinCode, RxMode};
use gsmlink_drivers::Polarity;

pub use self::toml::{parse_config, ParseError};

/// Embedded configuration (compiled into firmware)
/// Edit modem.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../modem.toml");

/// Cellular module fitted to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleKind {
    /// Plain 3GPP command set, no module-specific setup
    #[default]
    Generic,
    /// Quectel M95 / UC15 / EC2x
    Quectel,
}

/// Board wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    /// Modem UART baud rate
    pub baudrate: u32,
    /// Control line polarities
    pub polarity: Polarity,
    pub module: ModuleKind,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200,
            polarity: Polarity::default(),
            module: ModuleKind::Generic,
        }
    }
}

/// Complete firmware configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareConfig {
    pub board: BoardConfig,
    /// SIM PIN; empty if the card has none
    pub sim_pin: PinCode,
    pub driver: DriverConfig,
}

/// Parse the embedded configuration, falling back to defaults
pub fn load_config() -> FirmwareConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            log_config_summary(&config);
            config
        }
        Err(e) => {
            warn!("Embedded config parse error: {:?}", e);
            warn!("Using default configuration");
            FirmwareConfig::default()
        }
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &FirmwareConfig) {
    info!("Configuration loaded successfully");
    debug!("  module: {:?}", config.board.module);
    debug!("  baudrate: {}", config.board.baudrate);
    debug!("  polarity: {:?}", config.board.polarity);
    debug!("  SIM PIN set: {}", !config.sim_pin.is_empty());
    debug!(
        "  rx mode: {}",
        match config.driver.rx_mode {
            RxMode::Tick => "tick",
            RxMode::Poll => "poll",
        }
    );
    debug!("  reset line: {}", config.driver.reset_enabled);
    debug!(
        "  command timeout {} ms x {}",
        config.driver.timings.command_timeout_ms, config.driver.command_attempts
    );
}
