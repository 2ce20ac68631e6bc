//! Classifiers for modem response lines
//!
//! All functions operate on a single received line with the terminator
//! already stripped.

use heapless::String;

use crate::at;

/// Maximum length of a caller / originator / destination identifier
pub const MAX_ID_LEN: usize = 15;

/// Identifier text such as a phone number
pub type Identifier = String<MAX_ID_LEN>;

/// SIM lock state reported by `+CPIN`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinStatus {
    /// SIM unlocked
    Ready,
    /// SIM waits for its PIN
    PinRequired,
    /// SIM blocked; needs the PUK entered elsewhere
    PukRequired,
    /// Anything else (PH-SIM PIN, SIM PIN2, ...)
    Other,
}

/// Network registration state reported by `+CREG`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Registration {
    /// Registered on the home network
    Home,
    /// Registered while roaming
    Roaming,
    /// Any other stat code (searching, denied, unknown)
    NotRegistered,
}

impl Registration {
    /// Whether the module can be used for traffic
    pub fn is_registered(self) -> bool {
        matches!(self, Registration::Home | Registration::Roaming)
    }
}

/// Whether `line` is a non-empty run of ASCII digits (an IMEI reply)
pub fn is_numeric(line: &[u8]) -> bool {
    !line.is_empty() && line.iter().all(u8::is_ascii_digit)
}

/// Classify a `+CPIN: <code>` line
///
/// Returns `None` if the line is not a PIN status report.
pub fn pin_status(line: &[u8]) -> Option<PinStatus> {
    if !line.starts_with(at::CPIN) {
        return None;
    }
    // "+CPIN: READY" / "+CPIN: SIM PIN" / "+CPIN: SIM PUK"
    let status = if line.get(7..).is_some_and(|s| s.starts_with(at::READY)) {
        PinStatus::Ready
    } else if line.get(11..).is_some_and(|s| s.starts_with(b"PIN")) {
        PinStatus::PinRequired
    } else if line.get(11..).is_some_and(|s| s.starts_with(b"PUK")) {
        PinStatus::PukRequired
    } else {
        PinStatus::Other
    };
    Some(status)
}

/// Classify a `+CREG: <n>,<stat>` line
///
/// Returns `None` if the line is not a registration report.
pub fn registration(line: &[u8]) -> Option<Registration> {
    if !line.starts_with(at::CREG) {
        return None;
    }
    let status = match line.get(9) {
        Some(b'1') => Registration::Home,
        Some(b'5') => Registration::Roaming,
        _ => Registration::NotRegistered,
    };
    Some(status)
}

/// Extract the first quoted field of a line, e.g. the number in
/// `+CLIP: "+15551234",145,...`
///
/// The opening quote must appear within the first 30 bytes. Returns `None`
/// if either quote is missing or the field is longer than [`MAX_ID_LEN`].
pub fn quoted_identifier(line: &[u8]) -> Option<Identifier> {
    let open = line.iter().take(30).position(|&b| b == b'"')?;
    let rest = &line[open + 1..];
    let close = rest.iter().position(|&b| b == b'"')?;
    let field = core::str::from_utf8(&rest[..close]).ok()?;

    let mut id = Identifier::new();
    id.push_str(field).ok()?;
    Some(id)
}
