//! Modem task
//!
//! Owns the [`ModemDriver`]. Each wake-up first replays the milliseconds
//! counted by the tick task, then runs one poll step.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_rp::gpio::{Input, Output};

use gsmlink_core::{ModemDriver, StateId};
use gsmlink_drivers::{HalPin, PinControl, Quectel, SerialTransport};

use crate::channels::{MODEM_WAKE, PENDING_TICKS};
use crate::config::{FirmwareConfig, ModuleKind};
use crate::link::{ChannelRx, ChannelTx};
use crate::sink::LogSink;

/// Power key, status and reset lines of the board
pub type BoardControl =
    PinControl<HalPin<Output<'static>>, HalPin<Input<'static>>, HalPin<Output<'static>>>;

/// Modem task - runs the AT dialogue
#[embassy_executor::task]
pub async fn modem_task(control: BoardControl, config: FirmwareConfig) {
    info!("Modem task started");

    let transport = SerialTransport::new(ChannelTx, ChannelRx);
    let sink = LogSink::new(config.sim_pin.clone());

    // Declared before the driver, which borrows it for its whole life
    let mut quectel = Quectel::new();
    let mut driver = ModemDriver::new(transport, control, sink, config.driver);

    if config.board.module == ModuleKind::Quectel {
        match driver.register_extension(&mut quectel) {
            Ok(()) => info!("Quectel extension registered"),
            Err(e) => warn!("Quectel extension not registered: {:?}", e),
        }
    }

    let mut state = driver.state();
    let mut ready = driver.is_ready();

    loop {
        MODEM_WAKE.wait().await;

        let ticks = PENDING_TICKS.swap(0, Ordering::Relaxed);
        if ticks > 1_000 {
            warn!("Modem task fell {} ms behind", ticks);
        }
        for _ in 0..ticks {
            driver.tick();
        }

        driver.poll();

        if driver.state() != state {
            state = driver.state();
            trace!("Modem state {}", state_label(state));
        }
        if driver.is_ready() != ready {
            ready = driver.is_ready();
            if ready {
                info!("Modem registered on the network");
            } else {
                info!("Modem not ready");
            }
        }
    }
}

fn state_label(state: StateId) -> &'static str {
    state
        .name()
        .or_else(|| Quectel::state_name(state))
        .unwrap_or("extension")
}
