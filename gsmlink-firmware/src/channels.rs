//! Inter-task communication channels
//!
//! The UART tasks move bytes between the buffered UART and these channels;
//! the modem task reaches them without blocking through [`crate::link`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::AtomicU32;

/// Bytes received from the modem, not yet taken by the driver
const RX_CHANNEL_SIZE: usize = 256;

/// Bytes queued by the driver, not yet written to the UART
const TX_CHANNEL_SIZE: usize = 64;

/// Modem to driver
pub static MODEM_RX: Channel<CriticalSectionRawMutex, u8, RX_CHANNEL_SIZE> = Channel::new();

/// Driver to modem
pub static MODEM_TX: Channel<CriticalSectionRawMutex, u8, TX_CHANNEL_SIZE> = Channel::new();

/// Milliseconds elapsed that the driver has not been ticked for yet
pub static PENDING_TICKS: AtomicU32 = AtomicU32::new(0);

/// Wakes the modem task: a tick elapsed or bytes arrived
pub static MODEM_WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
