//! Protocol extensions
//!
//! Extensions add states to the dialogue without touching the built-in
//! table. Before each poll step the driver offers the current state to the
//! registered extensions in a fixed order:
//!
//! ```text
//!   Module-specific ──► Messaging ──► Data session ──► built-in table
//!        │                  │               │
//!     Handled            Handled         Handled        (no claim)
//! ```
//!
//! The first extension that returns [`Claim::Handled`] ends the step. An
//! extension may also claim a built-in hook state (module setup hook,
//! message hook, data hook) to replace its default behaviour.
//!
//! Each category owns a reserved range of [`StateId`]s for its own states.
//! Extensions must only allow diversions (`goto(.., true)`) at points where
//! none of their timeouts, counters or commands are in use.

use gsmlink_protocol::{at, LineFramer};

use crate::config::DriverConfig;
use crate::events::{Event, EventSink};
use crate::session::Session;
use crate::state::{StateEngine, StateId};
use crate::traits::ModemControl;
use crate::txqueue::{TxQueue, TxQueueError};

/// Whether an extension processed the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Claim {
    Handled,
    NotHandled,
}

/// Extension category, also its dispatch priority (highest first)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtensionKind {
    /// Module-specific setup and quirks
    Module,
    /// Text messaging
    Messaging,
    /// Packet data / HTTP
    DataSession,
}

impl ExtensionKind {
    /// State identifiers reserved for this category
    pub fn reserved(self) -> core::ops::RangeInclusive<u8> {
        match self {
            ExtensionKind::Module => 200..=255,
            ExtensionKind::Messaging => 80..=109,
            ExtensionKind::DataSession => 110..=139,
        }
    }

    /// Whether `state` lies in this category's reserved range
    pub fn owns(self, state: StateId) -> bool {
        self.reserved().contains(&state.0)
    }

    fn slot(self) -> usize {
        match self {
            ExtensionKind::Module => 0,
            ExtensionKind::Messaging => 1,
            ExtensionKind::DataSession => 2,
        }
    }
}

/// Errors from registering an extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtensionError {
    /// An extension of the same category is already registered
    SlotTaken,
}

/// A pluggable part of the modem dialogue
pub trait ProtocolExtension {
    /// Category of this extension
    fn kind(&self) -> ExtensionKind;

    /// Process `state` if this extension owns it
    ///
    /// Called once per poll step while the transmit queue is empty. Return
    /// [`Claim::NotHandled`] for every state the extension does not own.
    fn try_handle(&mut self, state: StateId, ctx: &mut Context<'_>) -> Claim;
}

/// Everything a state handler may touch during one poll step
pub struct Context<'c> {
    pub engine: &'c mut StateEngine,
    pub rx: &'c mut LineFramer,
    pub tx: &'c mut TxQueue,
    pub session: &'c mut Session,
    pub control: &'c mut dyn ModemControl,
    pub events: &'c mut dyn EventSink,
    pub config: &'c DriverConfig,
}

impl Context<'_> {
    /// Queue `command` followed by a line terminator
    ///
    /// Either both parts are queued or neither is.
    pub fn send_command(&mut self, command: &'static str) -> Result<(), TxQueueError> {
        if self.tx.text_slots_free() < 2 {
            return Err(TxQueueError::Full);
        }
        self.send_static(command)?;
        self.send_static(at::NEWLINE)
    }

    /// Queue static text
    pub fn send_static(&mut self, text: &'static str) -> Result<(), TxQueueError> {
        self.tx.enqueue_str(text)
    }

    /// Queue a copy of `text`
    pub fn send_text(&mut self, text: &str) -> Result<(), TxQueueError> {
        self.tx.enqueue_text(text)
    }

    /// Queue a single byte
    pub fn send_byte(&mut self, byte: u8) -> Result<(), TxQueueError> {
        self.tx.enqueue_byte(byte)
    }

    /// Give up on a command that could not be queued
    ///
    /// Whatever part of it was queued is dropped, so the module never sees
    /// half a command, and the dialogue moves straight to `fallback`
    /// instead of waiting out a reply timeout.
    pub fn abandon_send(&mut self, error: TxQueueError, fallback: StateId) {
        warn!("command not queued ({}), going to {}", error, fallback);
        self.tx.clear();
        self.engine.cancel_timeout();
        self.engine.goto(fallback, false);
    }

    /// Wait for `OK`, then continue at `after_ok`; on timeout go to `retry`
    ///
    /// Any unterminated fragment is dropped so the reply starts clean.
    pub fn wait_ok(&mut self, after_ok: StateId, timeout_ms: u32, retry: StateId) {
        self.engine.issue_command_wait_ok(after_ok, timeout_ms, retry);
        self.rx.discard_partial();
    }

    /// Send `command` until acknowledged (see
    /// [`StateEngine::issue_command_with_retry`])
    pub fn command_ok(
        &mut self,
        command: &'static str,
        after_ok: StateId,
        on_failure: Option<StateId>,
    ) {
        self.engine.issue_command_with_retry(command, after_ok, on_failure);
    }

    /// Re-check network registration, then continue at `after`
    ///
    /// This is a divert-safe point.
    pub fn wait_registration(&mut self, after: StateId) {
        self.engine.goto(StateId::REGISTRATION_PRE, true);
        self.engine.set_after_registration(Some(after));
    }

    /// Deliver an event to the application
    pub fn emit(&mut self, event: Event<'_>) {
        self.events.on_event(event);
    }

    /// Whether the status line reports the module on
    pub fn is_powered(&mut self) -> bool {
        self.control.is_powered()
    }
}

/// Registered extensions in dispatch order
pub struct ExtensionSet<'a> {
    slots: [Option<&'a mut dyn ProtocolExtension>; 3],
}

impl Default for ExtensionSet<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ExtensionSet<'a> {
    /// Empty set; every state falls through to the built-in table
    pub fn new() -> Self {
        Self {
            slots: [None, None, None],
        }
    }

    /// Register an extension in its category's slot
    pub fn register(
        &mut self,
        extension: &'a mut dyn ProtocolExtension,
    ) -> Result<(), ExtensionError> {
        let slot = &mut self.slots[extension.kind().slot()];
        if slot.is_some() {
            return Err(ExtensionError::SlotTaken);
        }
        *slot = Some(extension);
        Ok(())
    }

    /// Whether an extension of `kind` is registered
    pub fn has(&self, kind: ExtensionKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    /// Offer `state` to each extension in priority order
    pub fn dispatch(&mut self, state: StateId, ctx: &mut Context<'_>) -> Claim {
        for extension in self.slots.iter_mut().flatten() {
            if extension.try_handle(state, ctx) == Claim::Handled {
                return Claim::Handled;
            }
        }
        Claim::NotHandled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Claims {
        kind: ExtensionKind,
        state: StateId,
        seen: u32,
    }

    impl ProtocolExtension for Claims {
        fn kind(&self) -> ExtensionKind {
            self.kind
        }

        fn try_handle(&mut self, state: StateId, _ctx: &mut Context<'_>) -> Claim {
            self.seen += 1;
            if state == self.state {
                Claim::Handled
            } else {
                Claim::NotHandled
            }
        }
    }

    struct NoLines;

    impl ModemControl for NoLines {
        fn is_powered(&mut self) -> bool {
            true
        }
        fn set_power_key(&mut self, _pressed: bool) {}
        fn is_power_key_pressed(&self) -> bool {
            false
        }
    }

    struct Parts {
        engine: StateEngine,
        rx: LineFramer,
        tx: TxQueue,
        session: Session,
        control: NoLines,
        events: fn(Event<'_>),
        config: DriverConfig,
    }

    impl Parts {
        fn new() -> Self {
            Self {
                engine: StateEngine::new(),
                rx: LineFramer::new(),
                tx: TxQueue::new(),
                session: Session::new(),
                control: NoLines,
                events: |_| {},
                config: DriverConfig::default(),
            }
        }

        fn context(&mut self) -> Context<'_> {
            Context {
                engine: &mut self.engine,
                rx: &mut self.rx,
                tx: &mut self.tx,
                session: &mut self.session,
                control: &mut self.control,
                events: &mut self.events,
                config: &self.config,
            }
        }
    }

    #[test]
    fn test_reserved_ranges_disjoint() {
        let kinds = [
            ExtensionKind::Module,
            ExtensionKind::Messaging,
            ExtensionKind::DataSession,
        ];
        for state in 0..=255u8 {
            let owners = kinds.iter().filter(|k| k.owns(StateId(state))).count();
            assert!(owners <= 1, "state {} has {} owners", state, owners);
        }
        assert!(ExtensionKind::Module.owns(StateId(200)));
        assert!(ExtensionKind::Messaging.owns(StateId::MESSAGE_HOOK));
        assert!(ExtensionKind::DataSession.owns(StateId::DATA_HOOK));
    }

    #[test]
    fn test_register_rejects_second_of_kind() {
        let mut a = Claims {
            kind: ExtensionKind::Messaging,
            state: StateId(80),
            seen: 0,
        };
        let mut b = Claims {
            kind: ExtensionKind::Messaging,
            state: StateId(81),
            seen: 0,
        };
        let mut set = ExtensionSet::new();
        assert!(set.register(&mut a).is_ok());
        assert_eq!(set.register(&mut b), Err(ExtensionError::SlotTaken));
        assert!(set.has(ExtensionKind::Messaging));
        assert!(!set.has(ExtensionKind::Module));
    }

    #[test]
    fn test_dispatch_priority() {
        // Both claim the same hook; the module-specific one wins
        let mut data = Claims {
            kind: ExtensionKind::DataSession,
            state: StateId::SETUP_HOOK_IN,
            seen: 0,
        };
        let mut module = Claims {
            kind: ExtensionKind::Module,
            state: StateId::SETUP_HOOK_IN,
            seen: 0,
        };
        let mut parts = Parts::new();
        {
            let mut set = ExtensionSet::new();
            set.register(&mut data).unwrap();
            set.register(&mut module).unwrap();

            let mut ctx = parts.context();
            assert_eq!(set.dispatch(StateId::SETUP_HOOK_IN, &mut ctx), Claim::Handled);
            assert_eq!(set.dispatch(StateId::STANDBY, &mut ctx), Claim::NotHandled);
        }
        assert_eq!(module.seen, 2);
        // Only offered the state nobody earlier claimed
        assert_eq!(data.seen, 1);
    }

    #[test]
    fn test_context_send_command() {
        let mut parts = Parts::new();
        let mut ctx = parts.context();
        ctx.send_command(at::QUERY_SIGNAL).unwrap();
        assert_eq!(ctx.tx.len(), 2);
    }

    #[test]
    fn test_send_command_all_or_nothing() {
        let mut parts = Parts::new();
        let mut ctx = parts.context();
        // Leave a single text slot
        for _ in 0..crate::txqueue::TX_QUEUE_STRINGS - 1 {
            ctx.send_static("AT").unwrap();
        }
        let before = ctx.tx.len();
        assert_eq!(ctx.send_command(at::QUERY_SIGNAL), Err(TxQueueError::Full));
        assert_eq!(ctx.tx.len(), before);
    }

    #[test]
    fn test_send_text_too_long() {
        let mut parts = Parts::new();
        let mut ctx = parts.context();
        let long = "0".repeat(crate::txqueue::MAX_TEXT_LEN + 1);
        assert_eq!(ctx.send_text(&long), Err(TxQueueError::TextTooLong));
        assert!(ctx.tx.is_empty());
    }

    #[test]
    fn test_abandon_send_drops_partial_command() {
        let mut parts = Parts::new();
        let mut ctx = parts.context();
        ctx.engine.goto(StateId::PIN_RESPONSE, false);
        ctx.engine.set_timeout(1_000, StateId::PIN_COMMAND);
        ctx.send_static(at::ENTER_PIN).unwrap();

        ctx.abandon_send(TxQueueError::TextTooLong, StateId::PIN_COMMAND);
        assert!(ctx.tx.is_empty());
        assert!(!ctx.engine.timeout_armed());
        assert_eq!(ctx.engine.state(), StateId::PIN_COMMAND);
    }

    #[test]
    fn test_command_not_queued_retries_without_waiting() {
        let mut parts = Parts::new();
        parts
            .engine
            .issue_command_with_retry(at::ENABLE_CLIP, StateId::SET_TEXT_MODE, None);
        for _ in 0..crate::txqueue::TX_QUEUE_STRINGS - 1 {
            parts.tx.enqueue_str("AT").unwrap();
        }

        let mut ctx = parts.context();
        crate::dialogue::step(&mut ctx);
        // Counted as an attempt, nothing left queued, no reply awaited
        assert_eq!(ctx.engine.state(), StateId::COMMAND_OK);
        assert_eq!(ctx.engine.command_attempts(), 1);
        assert!(ctx.tx.is_empty());
        assert!(!ctx.engine.timeout_armed());

        crate::dialogue::step(&mut ctx);
        assert_eq!(ctx.engine.state(), StateId::WAITING_OK);
        assert_eq!(ctx.engine.command_attempts(), 2);
        assert_eq!(ctx.tx.len(), 2);
    }

    #[test]
    fn test_query_not_queued_moves_to_retry() {
        let mut parts = Parts::new();
        parts.engine.goto(StateId::IMEI_QUERY, false);
        for _ in 0..crate::txqueue::TX_QUEUE_STRINGS {
            parts.tx.enqueue_str("AT").unwrap();
        }

        let mut ctx = parts.context();
        crate::dialogue::step(&mut ctx);
        assert_eq!(ctx.engine.state(), StateId::IMEI_QUERY);
        assert_eq!(ctx.engine.retries, 1);
        assert!(ctx.tx.is_empty());
        assert!(!ctx.engine.timeout_armed());
    }

    #[test]
    fn test_wait_registration_sets_target() {
        let mut parts = Parts::new();
        let mut ctx = parts.context();
        ctx.wait_registration(StateId(85));
        assert_eq!(ctx.engine.state(), StateId::REGISTRATION_PRE);
        assert_eq!(ctx.engine.after_registration(), Some(StateId(85)));
    }
}
