//! AT command vocabulary
//!
//! Command strings are sent as-is followed by [`NEWLINE`]. Response tokens
//! are matched against the start of a received line.

/// Line terminator for outgoing commands
pub const NEWLINE: &str = "\r\n";

/// Command prefix
pub const AT: &str = "AT";

// Commands
pub const QUERY_IMEI: &str = "AT+CGSN";
pub const QUERY_PIN: &str = "AT+CPIN?";
pub const ENTER_PIN: &str = "AT+CPIN=";
pub const ENABLE_CLIP: &str = "AT+CLIP=1";
pub const TEXT_MODE: &str = "AT+CMGF=1";
pub const MESSAGE_ALERTS: &str = "AT+CNMI=2,1";
pub const QUERY_REGISTRATION: &str = "AT+CREG?";
pub const QUERY_CLOCK: &str = "AT+CCLK?";
pub const SET_CLOCK: &str = "AT+CCLK=";
pub const QUERY_SIGNAL: &str = "AT+CSQ";

// Response tokens
pub const OK: &[u8] = b"OK";
pub const ERROR: &[u8] = b"ERROR";
pub const READY: &[u8] = b"READY";
pub const RING: &[u8] = b"RING";
pub const NO_CARRIER: &[u8] = b"NO CARRIER";
pub const CPIN: &[u8] = b"+CPIN";
pub const CREG: &[u8] = b"+CREG";
pub const CCLK: &[u8] = b"+CCLK";
pub const CLIP: &[u8] = b"+CLIP";
pub const CMTI: &[u8] = b"+CMTI";
pub const CSQ: &[u8] = b"+CSQ";
