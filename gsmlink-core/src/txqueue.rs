//! Ordered, non-blocking transmit queue
//!
//! Strings and single bytes are kept in separate backing queues, and a third
//! queue records the kind of every pending item so they drain in exactly
//! the order they were submitted. Each [`TxQueue::drain_step`] moves at most
//! one byte to the transport.

use heapless::{Deque, String};

use crate::traits::{Transport, TransportError};

/// Maximum queued strings
pub const TX_QUEUE_STRINGS: usize = 8;

/// Maximum queued single bytes
pub const TX_QUEUE_BYTES: usize = 8;

/// Maximum length of a string copied into the queue
pub const MAX_TEXT_LEN: usize = 64;

const ORDER_CAPACITY: usize = TX_QUEUE_STRINGS + TX_QUEUE_BYTES;

/// Errors from enqueueing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxQueueError {
    /// No room for the item; nothing was queued
    Full,
    /// Text longer than [`MAX_TEXT_LEN`]; nothing was queued
    TextTooLong,
}

/// A queued string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxText {
    /// Command vocabulary and other constants
    Static(&'static str),
    /// Text built at runtime (PIN, clock value, message body)
    Owned(String<MAX_TEXT_LEN>),
}

impl TxText {
    fn as_bytes(&self) -> &[u8] {
        match self {
            TxText::Static(s) => s.as_bytes(),
            TxText::Owned(s) => s.as_bytes(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Byte,
}

/// Transmit queue
#[derive(Debug, Clone)]
pub struct TxQueue {
    texts: Deque<TxText, TX_QUEUE_STRINGS>,
    bytes: Deque<u8, TX_QUEUE_BYTES>,
    order: Deque<Kind, ORDER_CAPACITY>,
    /// Next byte of the head string
    cursor: usize,
}

impl Default for TxQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TxQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            texts: Deque::new(),
            bytes: Deque::new(),
            order: Deque::new(),
            cursor: 0,
        }
    }

    /// Queue a static string. Empty strings are accepted and ignored.
    pub fn enqueue_str(&mut self, text: &'static str) -> Result<(), TxQueueError> {
        if text.is_empty() {
            return Ok(());
        }
        self.push_text(TxText::Static(text))
    }

    /// Queue a copy of `text`. Empty strings are accepted and ignored.
    pub fn enqueue_text(&mut self, text: &str) -> Result<(), TxQueueError> {
        if text.is_empty() {
            return Ok(());
        }
        let mut owned = String::new();
        owned
            .push_str(text)
            .map_err(|_| TxQueueError::TextTooLong)?;
        self.push_text(TxText::Owned(owned))
    }

    fn push_text(&mut self, text: TxText) -> Result<(), TxQueueError> {
        if self.texts.is_full() {
            return Err(TxQueueError::Full);
        }
        // The order queue holds one slot per backing slot, so it has room
        let _ = self.texts.push_back(text);
        let _ = self.order.push_back(Kind::Text);
        Ok(())
    }

    /// Queue a single byte
    pub fn enqueue_byte(&mut self, byte: u8) -> Result<(), TxQueueError> {
        if self.bytes.push_back(byte).is_err() {
            return Err(TxQueueError::Full);
        }
        let _ = self.order.push_back(Kind::Byte);
        Ok(())
    }

    /// Number of strings that can still be queued
    pub fn text_slots_free(&self) -> usize {
        TX_QUEUE_STRINGS - self.texts.len()
    }

    /// Number of items waiting (partially sent string included)
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop everything not yet sent
    pub fn clear(&mut self) {
        self.texts.clear();
        self.bytes.clear();
        self.order.clear();
        self.cursor = 0;
    }

    /// Move at most one byte to the transport
    ///
    /// Nothing is sent if the transport is busy. On a transport error the
    /// byte stays queued and is retried on the next step. Returns whether
    /// anything remains queued.
    pub fn drain_step<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
    ) -> Result<bool, TransportError> {
        let Some(&kind) = self.order.front() else {
            return Ok(false);
        };
        if !transport.is_tx_idle() {
            return Ok(true);
        }

        match kind {
            Kind::Text => {
                let Some(text) = self.texts.front() else {
                    // Order and backing queues always move together
                    self.order.pop_front();
                    return Ok(!self.order.is_empty());
                };
                let bytes = text.as_bytes();
                transport.send_byte(bytes[self.cursor])?;
                self.cursor += 1;
                if self.cursor >= bytes.len() {
                    self.texts.pop_front();
                    self.order.pop_front();
                    self.cursor = 0;
                }
            }
            Kind::Byte => {
                if let Some(&byte) = self.bytes.front() {
                    transport.send_byte(byte)?;
                    self.bytes.pop_front();
                }
                self.order.pop_front();
            }
        }

        Ok(!self.order.is_empty())
    }
}
