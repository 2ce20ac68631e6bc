//! Tick task for the driver's millisecond timers
//!
//! The driver itself lives in the modem task; this task only counts
//! elapsed milliseconds, so a tick can never interleave with a poll.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::channels::{MODEM_WAKE, PENDING_TICKS};

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1;

/// Tick task - counts milliseconds for the modem task
#[embassy_executor::task]
pub async fn tick_task() {
    info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));

    loop {
        ticker.next().await;
        PENDING_TICKS.fetch_add(1, Ordering::Relaxed);
        MODEM_WAKE.signal(());
    }
}
