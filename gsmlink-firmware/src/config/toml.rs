//! Reader for the embedded `modem.toml`
//!
//! Accepts exactly what `modem.toml` uses: `[section]` headers, `key =
//! value` lines with quoted strings, integers (underscores allowed) and
//! booleans, and `#` comments. The build script has already checked the
//! file against its schema; this pass is allocation-free and still rejects
//! unknown sections and keys rather than skipping them.

use gsmlink_core::{DriverConfig, PinCode, RxMode, Timings};

use super::{BoardConfig, FirmwareConfig, ModuleKind};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header (line number)
    InvalidSection(u16),
    /// Key not valid in its section (line number)
    UnknownKey(u16),
    /// Value of the wrong type or out of range (line number)
    InvalidValue(u16),
    /// Line is neither a header nor `key = value` (line number)
    Malformed(u16),
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Board,
    Sim,
    Driver,
    Timings,
}

/// Parse TOML configuration into [`FirmwareConfig`]
pub fn parse_config(input: &str) -> Result<FirmwareConfig, ParseError> {
    let mut config = FirmwareConfig::default();
    let mut section = Section::Root;

    for (index, line) in input.lines().enumerate() {
        let line_no = (index + 1).min(u16::MAX as usize) as u16;
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(ParseError::InvalidSection(line_no))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::Malformed(line_no))?;
        let applied = match section {
            Section::Root => Err(Problem::UnknownKey),
            Section::Board => apply_board(&mut config.board, key, value),
            Section::Sim => apply_sim(&mut config.sim_pin, key, value),
            Section::Driver => apply_driver(&mut config.driver, key, value),
            Section::Timings => apply_timing(&mut config.driver.timings, key, value),
        };
        applied.map_err(|p| match p {
            Problem::UnknownKey => ParseError::UnknownKey(line_no),
            Problem::InvalidValue => ParseError::InvalidValue(line_no),
        })?;
    }

    Ok(config)
}

enum Problem {
    UnknownKey,
    InvalidValue,
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "board" => Some(Section::Board),
        "sim" => Some(Section::Sim),
        "driver" => Some(Section::Driver),
        "timings" => Some(Section::Timings),
        _ => None,
    }
}

/// Remove a trailing comment, ignoring `#` inside strings
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse a quoted string value
fn parse_string(value: &str) -> Result<&str, Problem> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(Problem::InvalidValue)
}

/// Parse an integer value (underscores allowed as in TOML)
fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, Problem> {
    let mut n: u64 = 0;
    let mut digits = 0;
    for c in value.chars() {
        match c {
            '_' if digits > 0 => {}
            '0'..='9' => {
                n = n
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(c as u64 - '0' as u64))
                    .ok_or(Problem::InvalidValue)?;
                digits += 1;
            }
            _ => return Err(Problem::InvalidValue),
        }
    }
    if digits == 0 {
        return Err(Problem::InvalidValue);
    }
    T::try_from(n).map_err(|_| Problem::InvalidValue)
}

/// Parse a non-zero count
fn parse_count(value: &str) -> Result<u8, Problem> {
    match parse_int::<u8>(value)? {
        0 => Err(Problem::InvalidValue),
        n => Ok(n),
    }
}

/// `true` or `false`
fn parse_bool(value: &str) -> Result<bool, Problem> {
    value.parse().map_err(|_| Problem::InvalidValue)
}

fn apply_board(board: &mut BoardConfig, key: &str, value: &str) -> Result<(), Problem> {
    match key {
        "baudrate" => board.baudrate = parse_int(value)?,
        "power_key_inverted" => board.polarity.power_key_inverted = parse_bool(value)?,
        "status_inverted" => board.polarity.status_inverted = parse_bool(value)?,
        "reset_inverted" => board.polarity.reset_inverted = parse_bool(value)?,
        "module" => {
            board.module = match parse_string(value)? {
                "generic" => ModuleKind::Generic,
                "quectel" => ModuleKind::Quectel,
                _ => return Err(Problem::InvalidValue),
            }
        }
        _ => return Err(Problem::UnknownKey),
    }
    Ok(())
}

fn apply_sim(pin: &mut PinCode, key: &str, value: &str) -> Result<(), Problem> {
    match key {
        "pin" => {
            let text = parse_string(value)?;
            if !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Problem::InvalidValue);
            }
            *pin = PinCode::try_from(text).map_err(|_| Problem::InvalidValue)?;
        }
        _ => return Err(Problem::UnknownKey),
    }
    Ok(())
}

fn apply_driver(driver: &mut DriverConfig, key: &str, value: &str) -> Result<(), Problem> {
    match key {
        "rx_mode" => {
            driver.rx_mode = match parse_string(value)? {
                "tick" => RxMode::Tick,
                "poll" => RxMode::Poll,
                _ => return Err(Problem::InvalidValue),
            }
        }
        "bytes_per_tick" => driver.bytes_per_tick = parse_count(value)?,
        "quiet_ticks" => driver.quiet_ticks = parse_count(value)?,
        "reset_enabled" => driver.reset_enabled = parse_bool(value)?,
        "command_attempts" => driver.command_attempts = parse_count(value)?,
        "query_attempts" => driver.query_attempts = parse_count(value)?,
        "alert_attempts" => driver.alert_attempts = parse_count(value)?,
        "power_off_attempts" => driver.power_off_attempts = parse_count(value)?,
        _ => return Err(Problem::UnknownKey),
    }
    Ok(())
}

fn apply_timing(timings: &mut Timings, key: &str, value: &str) -> Result<(), Problem> {
    let slot = match key {
        "command_timeout_ms" => &mut timings.command_timeout_ms,
        "query_timeout_ms" => &mut timings.query_timeout_ms,
        "pin_timeout_ms" => &mut timings.pin_timeout_ms,
        "ok_timeout_ms" => &mut timings.ok_timeout_ms,
        "power_on_press_ms" => &mut timings.power_on_press_ms,
        "power_on_confirm_ms" => &mut timings.power_on_confirm_ms,
        "stabilise_ms" => &mut timings.stabilise_ms,
        "power_off_press_ms" => &mut timings.power_off_press_ms,
        "power_off_confirm_ms" => &mut timings.power_off_confirm_ms,
        "power_off_give_up_ms" => &mut timings.power_off_give_up_ms,
        "power_off_rest_ms" => &mut timings.power_off_rest_ms,
        "reset_pulse_ms" => &mut timings.reset_pulse_ms,
        "reset_release_ms" => &mut timings.reset_release_ms,
        "sim_settle_ms" => &mut timings.sim_settle_ms,
        "alert_backoff_ms" => &mut timings.alert_backoff_ms,
        "registration_window_ms" => &mut timings.registration_window_ms,
        "registration_retry_ms" => &mut timings.registration_retry_ms,
        "idle_recheck_ms" => &mut timings.idle_recheck_ms,
        "caller_id_timeout_ms" => &mut timings.caller_id_timeout_ms,
        "call_end_timeout_ms" => &mut timings.call_end_timeout_ms,
        "power_loss_confirm_ms" => &mut timings.power_loss_confirm_ms,
        "power_loss_restart_ms" => &mut timings.power_loss_restart_ms,
        _ => return Err(Problem::UnknownKey),
    };
    *slot = parse_int(value)?;
    Ok(())
}
