//! Modem driver aggregate
//!
//! [`ModemDriver`] owns every piece of driver state and is driven from two
//! entry points:
//!
//! ```text
//!   every 1 ms                      as often as possible
//!   ┌──────────┐                    ┌──────────────────────────────┐
//!   │  tick()  │ timers, ≤2 bytes   │           poll()             │
//!   └────┬─────┘ ─────────┐         │ 1. drain received bytes      │
//!        │                ▼         │ 2. quiet reset / overflow    │
//!        │          LineFramer ◄────│ 3. one unit of tx (or return)│
//!        ▼                          │ 4. extensions, then dialogue │
//!   StateEngine timers              │ 5. power-loss supervision    │
//!                                   │ 6. timeout check             │
//!                                   └──────────────────────────────┘
//! ```
//!
//! Both take `&mut self`, so the caller serialises them (the firmware
//! replays counted ticks from the same task that polls). Nothing is
//! allocated after construction.

use gsmlink_protocol::LineFramer;

use crate::config::{DriverConfig, RxMode};
use crate::dialogue;
use crate::events::EventSink;
use crate::extension::{Claim, Context, ExtensionError, ExtensionSet, ProtocolExtension};
use crate::session::{Session, SessionError};
use crate::state::{StateEngine, StateId, Stopwatch};
use crate::traits::{ModemControl, Transport};
use crate::txqueue::TxQueue;

/// Cellular modem driver
pub struct ModemDriver<'a, T: Transport, C: ModemControl, E: EventSink> {
    engine: StateEngine,
    rx: LineFramer,
    tx: TxQueue,
    session: Session,
    config: DriverConfig,
    transport: T,
    control: C,
    events: E,
    extensions: ExtensionSet<'a>,
    /// Time the status line has read off while the module should be on
    power_loss: Stopwatch,
}

impl<'a, T: Transport, C: ModemControl, E: EventSink> ModemDriver<'a, T, C, E> {
    /// Create a driver in the power-on state
    ///
    /// The power key and reset line are released.
    pub fn new(transport: T, mut control: C, events: E, config: DriverConfig) -> Self {
        control.set_power_key(false);
        if config.reset_enabled {
            control.set_reset(false);
        }
        Self {
            engine: StateEngine::new(),
            rx: LineFramer::with_quiet_threshold(config.quiet_ticks),
            tx: TxQueue::new(),
            session: Session::new(),
            config,
            transport,
            control,
            events,
            extensions: ExtensionSet::new(),
            power_loss: Stopwatch::new(),
        }
    }

    /// Register a protocol extension
    ///
    /// Only one extension per [`crate::ExtensionKind`] is accepted.
    pub fn register_extension(
        &mut self,
        extension: &'a mut dyn ProtocolExtension,
    ) -> Result<(), ExtensionError> {
        self.extensions.register(extension)
    }

    /// Advance all timers by one millisecond
    ///
    /// In [`RxMode::Tick`] a few waiting bytes are also pulled into the line
    /// framer so the hardware FIFO cannot overrun between polls.
    pub fn tick(&mut self) {
        if self.config.rx_mode == RxMode::Tick {
            for _ in 0..self.config.bytes_per_tick {
                if !self.receive_one() {
                    break;
                }
            }
        }
        self.engine.tick();
        self.rx.tick();
        self.power_loss.tick();
    }

    /// Run one driver step
    pub fn poll(&mut self) {
        while self.receive_one() {}

        if self.rx.take_reset_request() && self.rx.clear() {
            warn!("rx quiet, buffer cleared");
        }
        if self.rx.take_overflow() {
            warn!("rx overflow, characters lost");
        }

        // One exchange at a time: nothing advances until the command is out
        match self.tx.drain_step(&mut self.transport) {
            Ok(false) => {}
            Ok(true) => return,
            Err(e) => {
                warn!("tx error: {}", e);
                return;
            }
        }

        self.step();
        self.supervise();
        self.check_timeout();
    }

    fn receive_one(&mut self) -> bool {
        if !self.transport.is_rx_ready() {
            return false;
        }
        match self.transport.recv_byte() {
            Ok(byte) => {
                self.rx.ingest(byte);
                true
            }
            Err(e) => {
                warn!("rx error: {}", e);
                false
            }
        }
    }

    fn step(&mut self) {
        let state = self.engine.state();
        let mut ctx = Context {
            engine: &mut self.engine,
            rx: &mut self.rx,
            tx: &mut self.tx,
            session: &mut self.session,
            control: &mut self.control,
            events: &mut self.events,
            config: &self.config,
        };
        if self.extensions.dispatch(state, &mut ctx) == Claim::NotHandled {
            dialogue::step(&mut ctx);
        }
    }

    /// Restart after the module loses power unexpectedly
    fn supervise(&mut self) {
        if self.session.readiness.expect_on && !self.control.is_powered() {
            if self.power_loss.elapsed() > self.config.timings.power_loss_confirm_ms {
                warn!("module lost power");
                self.session.readiness.expect_on = false;
                self.session.readiness.registered = false;
                let restart = self.config.timings.power_loss_restart_ms;
                self.engine.goto_after_delay(restart, StateId::POWER_ON);
                self.engine.cancel_timeout();
            }
        } else {
            self.power_loss.reset();
        }
    }

    fn check_timeout(&mut self) {
        if let Some(fallback) = self.engine.expired_timeout() {
            warn!("timed out in {}", self.engine.state());
            self.engine.goto(fallback, false);
            self.engine.cancel_timeout();
            self.rx.clear();
        }
    }

    /// Switch the module on, or off and keep it off
    pub fn request_power(&mut self, on: bool) {
        self.engine.diversions.power_off = !on;
    }

    /// Whether the module is registered on the network
    pub fn is_ready(&self) -> bool {
        self.session.readiness.registered
    }

    /// Read the module clock at the next divert-safe point
    pub fn request_clock_read(&mut self) {
        self.engine.diversions.clock_read = true;
    }

    /// Set the module clock at the next divert-safe point
    ///
    /// The value is requested through [`crate::Event::ClockWriteRequest`].
    pub fn request_clock_write(&mut self) {
        self.engine.diversions.clock_write = true;
    }

    /// Queue a text message to `destination`
    pub fn send_message(&mut self, text: &str, destination: &str) -> Result<(), SessionError> {
        self.session.send_message(text, destination)
    }

    pub fn message_send_pending(&self) -> bool {
        self.session.message_send_pending()
    }

    pub fn cancel_message(&mut self) {
        self.session.cancel_message();
    }

    /// Whether a message notification arrived since standby was entered
    pub fn message_just_arrived(&self) -> bool {
        self.session.message_just_arrived
    }

    /// Queue an HTTP GET; fails with [`SessionError::Busy`] while a request
    /// is running
    pub fn http_get(&mut self, url: &str) -> Result<(), SessionError> {
        self.session.http_get(url)
    }

    /// Queue an HTTP POST; fails with [`SessionError::Busy`] while a request
    /// is running
    pub fn http_post(&mut self, url: &str, body: &[u8]) -> Result<(), SessionError> {
        self.session.http_post(url, body)
    }

    pub fn data_pending(&self) -> bool {
        self.session.data_pending()
    }

    pub fn cancel_data(&mut self) {
        self.session.cancel_data();
    }

    pub fn set_http_keep_alive(&mut self, keep_alive: bool) {
        self.session.set_http_keep_alive(keep_alive);
    }

    /// Current dialogue state
    pub fn state(&self) -> StateId {
        self.engine.state()
    }

    pub fn engine(&self) -> &StateEngine {
        &self.engine
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut C {
        &mut self.control
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    /// Give back the collaborators
    pub fn release(self) -> (T, C, E) {
        (self.transport, self.control, self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, EventKind};
    use crate::traits::TransportError;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Loopback {
        inbox: VecDeque<u8>,
        sent: std::vec::Vec<u8>,
    }

    impl Transport for Loopback {
        fn is_tx_idle(&mut self) -> bool {
            true
        }
        fn send_byte(&mut self, byte: u8) -> Result<(), TransportError> {
            self.sent.push(byte);
            Ok(())
        }
        fn is_rx_ready(&mut self) -> bool {
            !self.inbox.is_empty()
        }
        fn recv_byte(&mut self) -> Result<u8, TransportError> {
            self.inbox.pop_front().ok_or(TransportError::Other)
        }
    }

    struct Lines {
        powered: bool,
        key: bool,
    }

    impl ModemControl for Lines {
        fn is_powered(&mut self) -> bool {
            self.powered
        }
        fn set_power_key(&mut self, pressed: bool) {
            self.key = pressed;
        }
        fn is_power_key_pressed(&self) -> bool {
            self.key
        }
    }

    #[derive(Default)]
    struct Kinds(std::vec::Vec<EventKind>);

    impl EventSink for Kinds {
        fn on_event(&mut self, event: Event<'_>) {
            self.0.push(event.kind());
        }
    }

    fn driver(powered: bool) -> ModemDriver<'static, Loopback, Lines, Kinds> {
        ModemDriver::new(
            Loopback::default(),
            Lines { powered, key: true },
            Kinds::default(),
            DriverConfig::default(),
        )
    }

    #[test]
    fn test_new_releases_power_key() {
        let d = driver(false);
        assert!(!d.control().key);
        assert_eq!(d.state(), StateId::POWER_ON);
    }

    #[test]
    fn test_power_on_presses_key_when_off() {
        let mut d = driver(false);
        d.poll();
        assert!(d.control().key);
        assert_eq!(d.state(), StateId::DELAY);
    }

    #[test]
    fn test_powered_module_goes_to_identity() {
        let mut d = driver(true);
        d.poll();
        assert_eq!(d.state(), StateId::IMEI_PRE);
        assert!(d.session().readiness.expect_on);
        d.poll();
        assert_eq!(d.state(), StateId::IMEI_QUERY);
        d.poll();
        assert_eq!(d.state(), StateId::IMEI_RESPONSE);
        // Engine does not advance while the command is still going out
        for _ in 0..20 {
            d.poll();
        }
        assert_eq!(d.transport().sent, b"AT+CGSN\r\n");
    }

    #[test]
    fn test_tick_mode_ingests_two_bytes() {
        let mut d = driver(true);
        d.transport_mut().inbox.extend(b"OK\r\n");
        d.tick();
        assert_eq!(d.transport().inbox.len(), 2);
        d.tick();
        assert!(d.transport().inbox.is_empty());
    }

    #[test]
    fn test_poll_mode_leaves_bytes_for_poll() {
        let config = DriverConfig {
            rx_mode: RxMode::Poll,
            ..DriverConfig::default()
        };
        let mut d = ModemDriver::new(
            Loopback::default(),
            Lines { powered: true, key: false },
            Kinds::default(),
            config,
        );
        d.transport_mut().inbox.extend(b"OK\r\n");
        d.tick();
        assert_eq!(d.transport().inbox.len(), 4);
        d.poll();
        assert!(d.transport().inbox.is_empty());
    }

    #[test]
    fn test_unexpected_power_loss_restarts() {
        let mut d = driver(true);
        d.poll();
        assert!(d.session().readiness.expect_on);

        d.control_mut().powered = false;
        for _ in 0..100 {
            d.tick();
            d.poll();
        }
        assert!(d.session().readiness.expect_on);
        d.tick();
        d.poll();
        assert!(!d.session().readiness.expect_on);
        assert_eq!(d.state(), StateId::DELAY);
        assert_eq!(d.engine().delay_target(), StateId::POWER_ON);
    }

    #[test]
    fn test_public_requests() {
        let mut d = driver(true);
        d.request_power(false);
        d.request_clock_read();
        d.request_clock_write();
        assert_eq!(d.engine().diversions.pending(), Some(StateId::POWER_OFF_PRE));
        d.request_power(true);
        assert_eq!(d.engine().diversions.pending(), Some(StateId::CLOCK_READ_PRE));

        d.send_message("hello", "+15551234").unwrap();
        assert!(d.message_send_pending());
        d.cancel_message();
        assert!(!d.message_send_pending());

        d.http_get("http://example.com").unwrap();
        assert!(d.data_pending());
        d.cancel_data();
        assert!(!d.data_pending());
        d.set_http_keep_alive(true);
        assert!(d.session().data.keep_alive);
        assert!(!d.is_ready());
    }
}
