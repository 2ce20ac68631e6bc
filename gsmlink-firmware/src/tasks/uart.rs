//! Modem UART tasks
//!
//! Move bytes between the buffered UART and the modem channels.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};

use crate::channels::{MODEM_RX, MODEM_TX, MODEM_WAKE};

/// Largest burst written to the UART at once
const TX_BURST: usize = 32;

/// UART RX task - forwards received bytes to the driver
#[embassy_executor::task]
pub async fn uart_rx_task(mut rx: BufferedUartRx) {
    info!("Modem UART RX task started");

    let mut buf = [0u8; 32];

    loop {
        match rx.read(&mut buf).await {
            Ok(len) if len > 0 => {
                for &byte in &buf[..len] {
                    MODEM_RX.send(byte).await;
                }
                MODEM_WAKE.signal(());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Modem UART RX error: {:?}", e);
            }
        }
    }
}

/// UART TX task - writes bytes queued by the driver
#[embassy_executor::task]
pub async fn uart_tx_task(mut tx: BufferedUartTx) {
    info!("Modem UART TX task started");

    let mut buf = [0u8; TX_BURST];

    loop {
        buf[0] = MODEM_TX.receive().await;
        let mut len = 1;
        while len < TX_BURST {
            match MODEM_TX.try_receive() {
                Ok(byte) => {
                    buf[len] = byte;
                    len += 1;
                }
                Err(_) => break,
            }
        }

        if let Err(e) = tx.write_all(&buf[..len]).await {
            warn!("Modem UART TX error: {:?}", e);
        } else {
            trace!("{} bytes sent to modem", len);
        }
    }
}
