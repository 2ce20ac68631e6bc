//! Driver event handling
//!
//! Answers the driver's synchronous requests (SIM PIN) and logs every
//! event.

use defmt::*;

use gsmlink_core::{Event, EventSink, PinCode};

/// Event sink of the firmware
pub struct LogSink {
    sim_pin: PinCode,
}

impl LogSink {
    pub fn new(sim_pin: PinCode) -> Self {
        Self { sim_pin }
    }
}

impl EventSink for LogSink {
    fn on_event(&mut self, event: Event<'_>) {
        match event {
            Event::PinRequested(pin) => {
                if self.sim_pin.is_empty() {
                    warn!("SIM asks for a PIN but none is configured");
                } else {
                    info!("Supplying SIM PIN");
                    *pin = self.sim_pin.clone();
                }
            }
            Event::ClockRead(Ok(time)) => {
                info!(
                    "Modem clock: 20{:02}-{:02}-{:02} {:02}:{:02}:{:02}",
                    time.year, time.month, time.day, time.hour, time.minute, time.second
                );
            }
            Event::PinIncorrect => {
                error!("SIM rejected the configured PIN; modem stopped");
            }
            other => {
                if other.is_failure() {
                    warn!("Modem event: {:?}", other);
                } else {
                    info!("Modem event: {:?}", other);
                }
            }
        }
    }
}
