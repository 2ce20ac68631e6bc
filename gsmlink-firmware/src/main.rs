//! gsmlink - GSM modem firmware
//!
//! Main firmware binary for RP2040 boards carrying a SIMCom or Quectel
//! cellular module on UART0.
//!
//! # Pin assignments
//!
//! | Signal    | GPIO |
//! |-----------|------|
//! | UART0 TX  | 0    |
//! | UART0 RX  | 1    |
//! | PWRKEY    | 2    |
//! | STATUS    | 3    |
//! | RESET     | 4    |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use gsmlink_drivers::{HalPin, PinControl};

use crate::config::load_config;

mod channels;
mod config;
mod link;
mod sink;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("gsmlink firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // Modem UART
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.board.baudrate;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", config.board.baudrate);

    // Control lines; PinControl drives them to their released levels
    let power_key = HalPin::new(Output::new(p.PIN_2, Level::Low));
    let status = HalPin::new(Input::new(p.PIN_3, Pull::Down));
    let reset = HalPin::new(Output::new(p.PIN_4, Level::Low));
    let control = PinControl::with_reset(power_key, status, reset, config.board.polarity);

    info!("Control lines initialized");

    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::uart_rx_task(rx)).unwrap();
    spawner.spawn(tasks::uart_tx_task(tx)).unwrap();
    spawner.spawn(tasks::modem_task(control, config)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
