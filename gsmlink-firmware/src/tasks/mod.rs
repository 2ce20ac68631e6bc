//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod modem;
pub mod tick;
pub mod uart;

pub use modem::{modem_task, BoardControl};
pub use tick::tick_task;
pub use uart::{uart_rx_task, uart_tx_task};
