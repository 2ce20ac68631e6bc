//! Simulated modem for driver scenarios

#![allow(dead_code)]

use std::collections::VecDeque;

use gsmlink_core::events::{Event, EventKind, EventSink};
use gsmlink_core::traits::{ModemControl, Transport, TransportError};
use gsmlink_core::{DriverConfig, ModemDriver, StateId};
use gsmlink_protocol::{DateTime, DateTimeError};

/// Serial side of a modem that answers from a fixed script
pub struct ScriptedModem {
    script: Vec<(&'static str, Vec<&'static str>)>,
    inbox: VecDeque<u8>,
    line: Vec<u8>,
    pub commands: Vec<String>,
}

impl ScriptedModem {
    pub fn new(script: &[(&'static str, &[&'static str])]) -> Self {
        Self {
            script: script.iter().map(|(c, r)| (*c, r.to_vec())).collect(),
            inbox: VecDeque::new(),
            line: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// A modem that never answers
    pub fn silent() -> Self {
        Self::new(&[])
    }

    /// Queue raw bytes with no terminator
    pub fn inject_raw(&mut self, bytes: &str) {
        self.inbox.extend(bytes.bytes());
    }

    /// Queue an unsolicited line
    pub fn inject(&mut self, line: &str) {
        self.inbox.extend(line.bytes());
        self.inbox.extend(b"\r\n");
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands.iter().filter(|c| *c == command).count()
    }
}

impl Transport for ScriptedModem {
    fn is_tx_idle(&mut self) -> bool {
        true
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.line.push(byte);
        if self.line.ends_with(b"\r\n") {
            let command = String::from_utf8_lossy(&self.line[..self.line.len() - 2]).into_owned();
            self.line.clear();
            let replies = self
                .script
                .iter()
                .find(|(c, _)| *c == command)
                .map(|(_, r)| r.clone())
                .unwrap_or_default();
            for reply in replies {
                self.inject(reply);
            }
            self.commands.push(command);
        }
        Ok(())
    }

    fn is_rx_ready(&mut self) -> bool {
        !self.inbox.is_empty()
    }

    fn recv_byte(&mut self) -> Result<u8, TransportError> {
        self.inbox.pop_front().ok_or(TransportError::Other)
    }
}

/// Control lines of a module that toggles power when the key is released
///
/// A `stuck` module ignores its power key; asserting reset switches it off.
pub struct SimControl {
    pub powered: bool,
    key: bool,
    pub presses: u32,
    pub stuck: bool,
    pub reset: bool,
    pub resets: u32,
}

impl SimControl {
    pub fn new(powered: bool) -> Self {
        Self {
            powered,
            key: false,
            presses: 0,
            stuck: false,
            reset: false,
            resets: 0,
        }
    }
}

impl ModemControl for SimControl {
    fn is_powered(&mut self) -> bool {
        self.powered
    }

    fn set_power_key(&mut self, pressed: bool) {
        if pressed && !self.key {
            self.presses += 1;
        }
        if !pressed && self.key && !self.stuck {
            self.powered = !self.powered;
        }
        self.key = pressed;
    }

    fn is_power_key_pressed(&self) -> bool {
        self.key
    }

    fn set_reset(&mut self, asserted: bool) {
        if asserted && !self.reset {
            self.resets += 1;
            self.powered = false;
            self.stuck = false;
        }
        self.reset = asserted;
    }

    fn is_reset_asserted(&self) -> bool {
        self.reset
    }
}

/// Event sink that records everything it is told
#[derive(Default)]
pub struct Recorder {
    pub pin: &'static str,
    pub kinds: Vec<EventKind>,
    pub callers: Vec<String>,
    pub identities: Vec<String>,
    pub clock_reads: Vec<Result<DateTime, DateTimeError>>,
}

impl Recorder {
    pub fn with_pin(pin: &'static str) -> Self {
        Self {
            pin,
            ..Self::default()
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.kinds.iter().filter(|k| **k == kind).count()
    }
}

impl EventSink for Recorder {
    fn on_event(&mut self, event: Event<'_>) {
        self.kinds.push(event.kind());
        match event {
            Event::PinRequested(pin) => {
                pin.push_str(self.pin).unwrap();
            }
            Event::MissedCall(caller) => self.callers.push(caller.to_string()),
            Event::IdentityRead(imei) => self.identities.push(imei.to_string()),
            Event::ClockRead(reading) => self.clock_reads.push(reading),
            Event::ClockWriteRequest(now) => {
                *now = DateTime {
                    year: 24,
                    month: 5,
                    day: 17,
                    hour: 10,
                    minute: 20,
                    second: 30,
                };
            }
            _ => {}
        }
    }
}

pub type Driver<'a> = ModemDriver<'a, ScriptedModem, SimControl, Recorder>;

/// Replies of a healthy modem with an unlocked SIM on a home network
pub const HEALTHY: &[(&str, &[&str])] = &[
    ("AT+CGSN", &["861234567890123", "OK"]),
    ("AT+CPIN?", &["+CPIN: READY", "OK"]),
    ("AT+CLIP=1", &["OK"]),
    ("AT+CMGF=1", &["OK"]),
    ("AT+CNMI=2,1", &["OK"]),
    ("AT+CREG?", &["+CREG: 0,1", "OK"]),
    ("AT+CCLK?", &["+CCLK: \"24/05/17,10:20:30+04\"", "OK"]),
    ("AT+CCLK=\"24/05/17,10:20:30+00\"", &["OK"]),
];

pub fn driver<'a>(modem: ScriptedModem, powered: bool, events: Recorder) -> Driver<'a> {
    driver_with(modem, powered, events, DriverConfig::default())
}

pub fn driver_with<'a>(
    modem: ScriptedModem,
    powered: bool,
    events: Recorder,
    config: DriverConfig,
) -> Driver<'a> {
    ModemDriver::new(modem, SimControl::new(powered), events, config)
}

const POLLS_PER_MS: usize = 8;

/// Advance `ms` milliseconds, polling several times per tick
pub fn run(driver: &mut Driver<'_>, ms: u32) {
    for _ in 0..ms {
        driver.tick();
        for _ in 0..POLLS_PER_MS {
            driver.poll();
        }
    }
}

/// Advance until `done` holds after a poll, for at most `max_ms`
///
/// Returns the elapsed milliseconds.
pub fn run_until(
    driver: &mut Driver<'_>,
    max_ms: u32,
    mut done: impl FnMut(&Driver<'_>) -> bool,
) -> Option<u32> {
    for ms in 0..max_ms {
        driver.tick();
        for _ in 0..POLLS_PER_MS {
            driver.poll();
            if done(driver) {
                return Some(ms + 1);
            }
        }
    }
    None
}

/// Like [`run`], recording every state seen after a poll
pub fn trace(driver: &mut Driver<'_>, ms: u32, states: &mut Vec<StateId>) {
    for _ in 0..ms {
        driver.tick();
        for _ in 0..POLLS_PER_MS {
            driver.poll();
            let state = driver.state();
            if states.last() != Some(&state) {
                states.push(state);
            }
        }
    }
}
