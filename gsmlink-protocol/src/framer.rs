//! Line framing for the modem's receive stream.
//!
//! The modem answers with text lines terminated by CR LF. Bytes are fed one
//! at a time by whichever context drains the serial port; completed lines
//! queue up in a single fixed buffer until the dialogue layer consumes them,
//! oldest first.
//!
//! Buffer layout:
//! ```text
//! ┌──────────┬──────────┬─────────────────┬──────────────┐
//! │ line 0   │ line 1   │ partial line    │ free         │
//! └──────────┴──────────┴─────────────────┴──────────────┘
//!  0     ends[0]    ends[1]           len()        capacity
//! ```
//!
//! Terminators are stripped, so lines are stored back to back and their
//! boundaries live in a separate end-offset queue.

use heapless::{Deque, Vec};

/// Receive buffer capacity in bytes
pub const RX_BUFFER_SIZE: usize = 256;

/// Maximum number of completed lines waiting to be consumed
pub const MAX_PENDING_LINES: usize = 16;

/// Ticks of silence after which the whole buffer is discarded
pub const QUIET_RESET_TICKS: u8 = 100;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Outcome of feeding one byte to the framer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ingest {
    /// Byte appended to the line being received
    Partial,
    /// Byte completed a CR LF terminated line
    LineComplete,
    /// Buffer ran out of room; the current contents were force-completed
    /// or the byte was dropped
    Overflow,
}

/// Accumulates received bytes into CR LF terminated lines
#[derive(Debug, Clone)]
pub struct LineFramer {
    buffer: Vec<u8, RX_BUFFER_SIZE>,
    /// Exclusive end offset of every completed line, oldest first
    line_ends: Deque<usize, MAX_PENDING_LINES>,
    /// Set when bytes were lost or a line was forced out; cleared on read
    chars_lost: bool,
    quiet_ticks: u8,
    quiet_threshold: u8,
    reset_requested: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    /// Create an empty framer with the default quiet threshold
    pub fn new() -> Self {
        Self::with_quiet_threshold(QUIET_RESET_TICKS)
    }

    /// Create an empty framer that requests a reset after `ticks` of silence
    pub fn with_quiet_threshold(ticks: u8) -> Self {
        Self {
            buffer: Vec::new(),
            line_ends: Deque::new(),
            chars_lost: false,
            quiet_ticks: 0,
            quiet_threshold: ticks.max(1),
            reset_requested: false,
        }
    }

    /// Start offset of the line currently being received
    fn partial_start(&self) -> usize {
        self.line_ends.back().copied().unwrap_or(0)
    }

    /// Feed a single received byte
    pub fn ingest(&mut self, byte: u8) -> Ingest {
        self.quiet_ticks = 0;
        self.reset_requested = false;

        if self.buffer.is_full() {
            // Nothing more fits until the consumer catches up. Make sure the
            // consumer has something to work on so it is never starved.
            self.chars_lost = true;
            if self.line_ends.is_empty() {
                self.complete_line();
            }
            return Ingest::Overflow;
        }

        if byte == LF
            && self.buffer.len() > self.partial_start()
            && self.buffer.last() == Some(&CR)
        {
            self.buffer.pop();
            return if self.complete_line() {
                Ingest::LineComplete
            } else {
                Ingest::Overflow
            };
        }

        // Checked above, so the push cannot fail
        let _ = self.buffer.push(byte);

        if self.buffer.is_full() {
            self.complete_line();
            self.chars_lost = true;
            return Ingest::Overflow;
        }

        Ingest::Partial
    }

    /// Mark the partial line as complete
    ///
    /// Returns false if the line queue was full and the line was discarded.
    fn complete_line(&mut self) -> bool {
        let end = self.buffer.len();
        if self.line_ends.push_back(end).is_err() {
            let start = self.partial_start();
            self.buffer.truncate(start);
            self.chars_lost = true;
            return false;
        }
        true
    }

    /// Whether at least one completed line is waiting
    pub fn is_line_ready(&self) -> bool {
        !self.line_ends.is_empty()
    }

    /// Number of completed lines waiting
    pub fn lines_ready(&self) -> usize {
        self.line_ends.len()
    }

    /// The oldest completed line, terminator stripped
    pub fn line(&self) -> Option<&[u8]> {
        let end = *self.line_ends.front()?;
        Some(&self.buffer[..end])
    }

    /// Bytes of the line currently being received
    pub fn partial(&self) -> &[u8] {
        &self.buffer[self.partial_start()..]
    }

    /// Total bytes held (completed lines plus partial line)
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds nothing at all
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Remove the oldest completed line and repack the rest to the front
    ///
    /// Does nothing if no line is ready.
    pub fn consume_one(&mut self) {
        let Some(end) = self.line_ends.pop_front() else {
            return;
        };

        let remaining = self.buffer.len() - end;
        self.buffer.copy_within(end.., 0);
        self.buffer.truncate(remaining);

        for line_end in self.line_ends.iter_mut() {
            *line_end -= end;
        }
    }

    /// Drop the unterminated fragment being received, keeping completed lines
    pub fn discard_partial(&mut self) {
        let start = self.partial_start();
        self.buffer.truncate(start);
    }

    /// Discard everything
    ///
    /// Returns true if anything was discarded.
    pub fn clear(&mut self) -> bool {
        let had_data = !self.buffer.is_empty() || !self.line_ends.is_empty();
        self.buffer.clear();
        self.line_ends.clear();
        self.reset_requested = false;
        had_data
    }

    /// Advance the quiet timer by one tick
    ///
    /// Requests a reset exactly when the threshold is reached; the reset is
    /// carried out by [`LineFramer::take_reset_request`] in the poll context.
    pub fn tick(&mut self) {
        if self.quiet_ticks < u8::MAX {
            self.quiet_ticks += 1;
        }
        if self.quiet_ticks == self.quiet_threshold {
            self.reset_requested = true;
        }
    }

    /// Take a pending quiet-period reset request, if any
    pub fn take_reset_request(&mut self) -> bool {
        core::mem::take(&mut self.reset_requested)
    }

    /// Take the overflow flag, clearing it
    pub fn take_overflow(&mut self) -> bool {
        core::mem::take(&mut self.chars_lost)
    }
}
