//! Generic state engine
//!
//! Holds the current dialogue state and the small set of transition
//! primitives every state is written in terms of: direct transitions,
//! delayed transitions, an independent timeout, the two command helpers and
//! priority diversions.
//!
//! # Diversions
//!
//! A diversion interrupts the normal sequence for urgent housekeeping. It
//! is only honoured by [`StateEngine::goto`] with `allow_diversion` set,
//! which the dialogue passes only where nothing else is in flight: no
//! timeout armed for another state, no retry counter or command in use, and
//! never from inside another diversion. Extensions must follow the same
//! rule.

use super::StateId;

/// Millisecond stopwatch advanced by the driver tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stopwatch(u32);

impl Stopwatch {
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn tick(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    /// Milliseconds since the last reset
    pub fn elapsed(&self) -> u32 {
        self.0
    }
}

/// Outstanding diversion requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diversions {
    /// Switch the module off (and keep it off)
    pub power_off: bool,
    /// Read the module's real-time clock
    pub clock_read: bool,
    /// Set the module's real-time clock
    pub clock_write: bool,
}

impl Diversions {
    /// Entry state of the highest-priority pending diversion
    ///
    /// Priority: power-off, clock read, clock write.
    pub fn pending(&self) -> Option<StateId> {
        if self.power_off {
            Some(StateId::POWER_OFF_PRE)
        } else if self.clock_read {
            Some(StateId::CLOCK_READ_PRE)
        } else if self.clock_write {
            Some(StateId::CLOCK_WRITE_PRE)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Delay {
    target: StateId,
    duration_ms: u32,
    timer: Stopwatch,
}

#[derive(Debug, Clone, Copy)]
struct Timeout {
    fallback: Option<StateId>,
    duration_ms: u32,
    timer: Stopwatch,
}

/// Dialogue state storage and transition primitives
#[derive(Debug, Clone)]
pub struct StateEngine {
    state: StateId,
    delay: Delay,
    timeout: Timeout,
    after_ok: StateId,
    after_command_failure: StateId,
    command: &'static str,
    command_attempts: u8,
    return_state: StateId,
    after_registration: Option<StateId>,

    /// Outstanding diversion requests
    pub diversions: Diversions,
    /// General-purpose retry counter, owned by whichever state sequence is
    /// running
    pub retries: u8,
    /// General-purpose flag
    pub flag: bool,
    /// General-purpose timer for short waits
    pub timer: Stopwatch,
    /// General-purpose timer for long windows (registration, idle)
    pub long_timer: Stopwatch,
}

impl Default for StateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateEngine {
    /// Create an engine in the power-on state
    pub fn new() -> Self {
        Self {
            state: StateId::POWER_ON,
            delay: Delay {
                target: StateId::POWER_ON,
                duration_ms: 0,
                timer: Stopwatch::new(),
            },
            timeout: Timeout {
                fallback: None,
                duration_ms: 0,
                timer: Stopwatch::new(),
            },
            after_ok: StateId::POWER_ON,
            after_command_failure: StateId::POWER_OFF_PRE,
            command: "",
            command_attempts: 0,
            return_state: StateId::POWER_ON,
            after_registration: None,
            diversions: Diversions::default(),
            retries: 0,
            flag: false,
            timer: Stopwatch::new(),
            long_timer: Stopwatch::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> StateId {
        self.state
    }

    /// Transition to `next`
    ///
    /// With `allow_diversion`, `next` is first recorded as the return state
    /// and the highest-priority pending diversion, if any, is entered
    /// instead. Only pass `true` from divert-safe points.
    pub fn goto(&mut self, next: StateId, allow_diversion: bool) {
        let mut next = next;
        if allow_diversion {
            self.return_state = next;
            if let Some(diversion) = self.diversions.pending() {
                next = diversion;
            }
        }
        if next != self.state {
            debug!("state {} -> {}", self.state, next);
            self.state = next;
        }
    }

    /// Wait `ms`, then transition (without diversion) to `target`
    pub fn goto_after_delay(&mut self, ms: u32, target: StateId) {
        self.goto(StateId::DELAY, false);
        self.delay = Delay {
            target,
            duration_ms: ms,
            timer: Stopwatch::new(),
        };
        trace!("delay {=u32} ms -> {}", ms, target);
    }

    /// Whether the running delay has elapsed
    pub fn delay_expired(&self) -> bool {
        self.delay.timer.elapsed() >= self.delay.duration_ms
    }

    /// State entered when the delay elapses
    pub fn delay_target(&self) -> StateId {
        self.delay.target
    }

    /// Arm the timeout: unless cancelled within `ms`, the engine is forced
    /// to `fallback` from whatever state it is in
    pub fn set_timeout(&mut self, ms: u32, fallback: StateId) {
        self.timeout = Timeout {
            fallback: Some(fallback),
            duration_ms: ms,
            timer: Stopwatch::new(),
        };
    }

    /// Disarm the timeout
    pub fn cancel_timeout(&mut self) {
        self.timeout.fallback = None;
    }

    /// Restart the timeout window without changing its fallback
    pub fn restart_timeout(&mut self) {
        self.timeout.timer.reset();
    }

    /// Whether a timeout is armed
    pub fn timeout_armed(&self) -> bool {
        self.timeout.fallback.is_some()
    }

    /// Fallback state of an armed timeout that has run out
    pub fn expired_timeout(&self) -> Option<StateId> {
        let fallback = self.timeout.fallback?;
        (self.timeout.timer.elapsed() >= self.timeout.duration_ms).then_some(fallback)
    }

    /// Wait for `OK`, then go to `after_ok`; after `timeout_ms` without one,
    /// go to `retry` instead
    pub fn issue_command_wait_ok(&mut self, after_ok: StateId, timeout_ms: u32, retry: StateId) {
        self.goto(StateId::WAITING_OK, false);
        self.after_ok = after_ok;
        self.set_timeout(timeout_ms, retry);
    }

    /// Send `command` and wait for `OK`, resending on timeout
    ///
    /// After the configured number of attempts the engine goes to
    /// `on_failure`, or to the power-cycle sequence if none is given.
    pub fn issue_command_with_retry(
        &mut self,
        command: &'static str,
        after_ok: StateId,
        on_failure: Option<StateId>,
    ) {
        self.command = command;
        self.command_attempts = 0;
        self.after_ok = after_ok;
        self.after_command_failure = on_failure.unwrap_or(StateId::POWER_OFF_PRE);
        self.goto(StateId::COMMAND_OK, false);
    }

    /// Command being issued by the command-OK state
    pub fn command(&self) -> &'static str {
        self.command
    }

    /// Number of times the current command has been sent
    pub fn command_attempts(&self) -> u8 {
        self.command_attempts
    }

    pub(crate) fn count_command_attempt(&mut self) {
        self.command_attempts = self.command_attempts.saturating_add(1);
    }

    /// Target of a successful `OK`
    pub fn after_ok(&self) -> StateId {
        self.after_ok
    }

    /// Target once the command-OK attempts are used up
    pub fn after_command_failure(&self) -> StateId {
        self.after_command_failure
    }

    /// State to resume once a diversion completes
    pub fn return_state(&self) -> StateId {
        self.return_state
    }

    /// Set where the registration check continues once registered
    pub fn set_after_registration(&mut self, state: Option<StateId>) {
        self.after_registration = state;
    }

    /// Where the registration check continues once registered
    pub fn after_registration(&self) -> Option<StateId> {
        self.after_registration
    }

    /// Take the post-registration target, resetting it to the default
    pub fn take_after_registration(&mut self) -> Option<StateId> {
        self.after_registration.take()
    }

    /// Advance every timer by one millisecond
    pub fn tick(&mut self) {
        self.delay.timer.tick();
        self.timeout.timer.tick();
        self.timer.tick();
        self.long_timer.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_n(engine: &mut StateEngine, n: u32) {
        for _ in 0..n {
            engine.tick();
        }
    }

    #[test]
    fn test_starts_in_power_on() {
        let engine = StateEngine::new();
        assert_eq!(engine.state(), StateId::POWER_ON);
        assert!(!engine.timeout_armed());
    }

    #[test]
    fn test_goto_without_diversion_ignores_pending() {
        let mut engine = StateEngine::new();
        engine.diversions.power_off = true;
        engine.goto(StateId::IMEI_PRE, false);
        assert_eq!(engine.state(), StateId::IMEI_PRE);
    }

    #[test]
    fn test_diversion_priority() {
        let mut engine = StateEngine::new();
        engine.diversions.clock_write = true;
        engine.diversions.clock_read = true;
        engine.diversions.power_off = true;

        engine.goto(StateId::STANDBY_PRE, true);
        assert_eq!(engine.state(), StateId::POWER_OFF_PRE);
        assert_eq!(engine.return_state(), StateId::STANDBY_PRE);

        engine.diversions.power_off = false;
        engine.goto(StateId::STANDBY_PRE, true);
        assert_eq!(engine.state(), StateId::CLOCK_READ_PRE);

        engine.diversions.clock_read = false;
        engine.goto(StateId::STANDBY_PRE, true);
        assert_eq!(engine.state(), StateId::CLOCK_WRITE_PRE);

        engine.diversions.clock_write = false;
        engine.goto(StateId::STANDBY_PRE, true);
        assert_eq!(engine.state(), StateId::STANDBY_PRE);
    }

    #[test]
    fn test_delay() {
        let mut engine = StateEngine::new();
        engine.goto_after_delay(100, StateId::POWERING_ON);
        assert_eq!(engine.state(), StateId::DELAY);
        assert_eq!(engine.delay_target(), StateId::POWERING_ON);

        tick_n(&mut engine, 99);
        assert!(!engine.delay_expired());
        engine.tick();
        assert!(engine.delay_expired());
    }

    #[test]
    fn test_timeout_arm_restart_cancel() {
        let mut engine = StateEngine::new();
        engine.set_timeout(500, StateId::IMEI_QUERY);
        tick_n(&mut engine, 400);
        assert_eq!(engine.expired_timeout(), None);

        engine.restart_timeout();
        tick_n(&mut engine, 499);
        assert_eq!(engine.expired_timeout(), None);
        engine.tick();
        assert_eq!(engine.expired_timeout(), Some(StateId::IMEI_QUERY));

        engine.cancel_timeout();
        assert_eq!(engine.expired_timeout(), None);
        assert!(!engine.timeout_armed());
    }

    #[test]
    fn test_command_with_retry_defaults_to_power_cycle() {
        let mut engine = StateEngine::new();
        engine.retries = 4;
        engine.issue_command_with_retry("AT+CLIP=1", StateId::SET_TEXT_MODE, None);

        assert_eq!(engine.state(), StateId::COMMAND_OK);
        assert_eq!(engine.command(), "AT+CLIP=1");
        assert_eq!(engine.after_ok(), StateId::SET_TEXT_MODE);
        assert_eq!(engine.after_command_failure(), StateId::POWER_OFF_PRE);
        assert_eq!(engine.command_attempts(), 0);
        // The generic counter belongs to the caller
        assert_eq!(engine.retries, 4);
    }

    #[test]
    fn test_wait_ok_arms_timeout() {
        let mut engine = StateEngine::new();
        engine.issue_command_wait_ok(StateId::PIN_CHECK_PRE, 250, StateId::PIN_CHECK_PRE);
        assert_eq!(engine.state(), StateId::WAITING_OK);
        assert_eq!(engine.after_ok(), StateId::PIN_CHECK_PRE);
        assert!(engine.timeout_armed());
    }

    #[test]
    fn test_stopwatch_saturates() {
        let mut sw = Stopwatch(u32::MAX - 1);
        sw.tick();
        sw.tick();
        assert_eq!(sw.elapsed(), u32::MAX);
    }
}
