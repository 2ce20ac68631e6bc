//! Build script for gsmlink-firmware
//!
//! Puts memory.x on the linker path and checks modem.toml against the
//! schema below, so a typo fails the build instead of silently falling
//! back to a default at run time.

use std::env;
use std::fs;
use std::path::PathBuf;

/// Keys accepted in each section, with their expected kind
const SCHEMA: &[(&str, &[(&str, Kind)])] = &[
    (
        "board",
        &[
            ("baudrate", Kind::Integer(1200, 921_600)),
            ("power_key_inverted", Kind::Boolean),
            ("status_inverted", Kind::Boolean),
            ("reset_inverted", Kind::Boolean),
            ("module", Kind::Choice(&["generic", "quectel"])),
        ],
    ),
    ("sim", &[("pin", Kind::Pin)]),
    (
        "driver",
        &[
            ("rx_mode", Kind::Choice(&["tick", "poll"])),
            ("bytes_per_tick", Kind::Integer(1, 255)),
            ("quiet_ticks", Kind::Integer(1, 255)),
            ("reset_enabled", Kind::Boolean),
            ("command_attempts", Kind::Integer(1, 255)),
            ("query_attempts", Kind::Integer(1, 255)),
            ("alert_attempts", Kind::Integer(1, 255)),
            ("power_off_attempts", Kind::Integer(1, 255)),
        ],
    ),
    (
        "timings",
        &[
            ("command_timeout_ms", Kind::Millis),
            ("query_timeout_ms", Kind::Millis),
            ("pin_timeout_ms", Kind::Millis),
            ("ok_timeout_ms", Kind::Millis),
            ("power_on_press_ms", Kind::Millis),
            ("power_on_confirm_ms", Kind::Millis),
            ("stabilise_ms", Kind::Millis),
            ("power_off_press_ms", Kind::Millis),
            ("power_off_confirm_ms", Kind::Millis),
            ("power_off_give_up_ms", Kind::Millis),
            ("power_off_rest_ms", Kind::Millis),
            ("reset_pulse_ms", Kind::Millis),
            ("reset_release_ms", Kind::Millis),
            ("sim_settle_ms", Kind::Millis),
            ("alert_backoff_ms", Kind::Millis),
            ("registration_window_ms", Kind::Millis),
            ("registration_retry_ms", Kind::Millis),
            ("idle_recheck_ms", Kind::Millis),
            ("caller_id_timeout_ms", Kind::Millis),
            ("call_end_timeout_ms", Kind::Millis),
            ("power_loss_confirm_ms", Kind::Millis),
            ("power_loss_restart_ms", Kind::Millis),
        ],
    ),
];

#[derive(Clone, Copy)]
enum Kind {
    Boolean,
    Integer(i64, i64),
    Millis,
    Choice(&'static [&'static str]),
    Pin,
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));
    fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")).expect("writing memory.x");
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=modem.toml");

    let text = match fs::read_to_string("modem.toml") {
        Ok(text) => text,
        Err(e) => panic!("modem.toml: {} (the firmware embeds it at build time)", e),
    };
    let config: toml::Value = match toml::from_str(&text) {
        Ok(value) => value,
        Err(e) => panic!("modem.toml is not valid TOML:\n{}", e),
    };

    let errors = validate_sections(&config);
    if !errors.is_empty() {
        panic!("modem.toml has {} error(s):\n  {}", errors.len(), errors.join("\n  "));
    }
}

/// Check every section and key against the schema
fn validate_sections(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return vec!["top level must be a table".to_string()],
    };

    for (section, body) in root {
        let keys = match SCHEMA.iter().find(|(name, _)| *name == section.as_str()) {
            Some((_, keys)) => *keys,
            None => {
                errors.push(format!("unknown section [{}]", section));
                continue;
            }
        };

        let table = match body.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
        };

        for (key, value) in table {
            match keys.iter().find(|(name, _)| *name == key.as_str()) {
                Some((_, kind)) => {
                    if let Some(problem) = check_value(*kind, value) {
                        errors.push(format!("[{}] {} {}", section, key, problem));
                    }
                }
                None => errors.push(format!("[{}] unknown key '{}'", section, key)),
            }
        }
    }

    // Timeouts shorter than a couple of ticks never see a reply
    if let Some(timings) = config.get("timings").and_then(|t| t.as_table()) {
        for key in ["command_timeout_ms", "query_timeout_ms", "ok_timeout_ms"] {
            if let Some(toml::Value::Integer(ms)) = timings.get(key) {
                if *ms < 10 {
                    errors.push(format!("[timings] {} must be at least 10", key));
                }
            }
        }
    }

    errors
}

fn check_value(kind: Kind, value: &toml::Value) -> Option<String> {
    match (kind, value) {
        (Kind::Boolean, toml::Value::Boolean(_)) => None,
        (Kind::Boolean, _) => Some("must be true or false".to_string()),
        (Kind::Integer(min, max), toml::Value::Integer(n)) => {
            if *n < min || *n > max {
                Some(format!("must be {}-{}", min, max))
            } else {
                None
            }
        }
        (Kind::Millis, toml::Value::Integer(n)) => {
            if *n < 0 || *n > u32::MAX as i64 {
                Some("must fit in 32 bits".to_string())
            } else {
                None
            }
        }
        (Kind::Integer(..) | Kind::Millis, _) => Some("must be an integer".to_string()),
        (Kind::Choice(options), toml::Value::String(s)) => {
            if options.contains(&s.as_str()) {
                None
            } else {
                Some(format!("must be one of {}", options.join(", ")))
            }
        }
        (Kind::Pin, toml::Value::String(s)) => {
            if s.len() <= 8 && s.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                Some("must be up to 8 digits".to_string())
            }
        }
        (Kind::Choice(_) | Kind::Pin, _) => Some("must be a string".to_string()),
    }
}
