//! Clock diversions
//!
//! Both diversions end by resuming the state that was interrupted. A read
//! that gets no reply stays pending and is retried at the next divert-safe
//! point; so does a write whose attempts run out.

use gsmlink_protocol::{at, DateTime};

use crate::events::Event;
use crate::extension::Context;
use crate::state::StateId;
use crate::txqueue::TxQueueError;

pub(super) fn read_pre(ctx: &mut Context<'_>) {
    ctx.engine.retries = 0;
    ctx.engine.goto(StateId::CLOCK_READ_QUERY, false);
}

pub(super) fn read_query(ctx: &mut Context<'_>) {
    ctx.rx.discard_partial();
    if ctx.engine.retries < ctx.config.query_attempts {
        match ctx.send_command(at::QUERY_CLOCK) {
            Ok(()) => {
                ctx.engine.goto(StateId::CLOCK_READ_RESPONSE, false);
                let timeout = ctx.config.timings.query_timeout_ms;
                ctx.engine.set_timeout(timeout, StateId::CLOCK_READ_QUERY);
            }
            Err(e) => ctx.abandon_send(e, StateId::CLOCK_READ_QUERY),
        }
    } else {
        warn!("no clock reply, giving up for now");
        ctx.engine.cancel_timeout();
        let back = ctx.engine.return_state();
        ctx.engine.goto(back, false);
    }
    ctx.engine.retries = ctx.engine.retries.saturating_add(1);
}

pub(super) fn read_response(ctx: &mut Context<'_>) {
    let Some(line) = ctx.rx.line() else {
        return;
    };
    ctx.engine.restart_timeout();

    if line.starts_with(at::CCLK) {
        let reading = DateTime::parse(line);
        ctx.engine.cancel_timeout();
        ctx.emit(Event::ClockRead(reading));
        ctx.engine.diversions.clock_read = false;
        let back = ctx.engine.return_state();
        let timeout = ctx.config.timings.ok_timeout_ms;
        ctx.wait_ok(back, timeout, back);
    }
    ctx.rx.consume_one();
}

pub(super) fn write_pre(ctx: &mut Context<'_>) {
    ctx.engine.retries = 0;
    ctx.engine.goto(StateId::CLOCK_WRITE, false);
}

pub(super) fn write(ctx: &mut Context<'_>) {
    let back = ctx.engine.return_state();
    if ctx.engine.retries < ctx.config.query_attempts {
        let mut now = DateTime::default();
        ctx.emit(Event::ClockWriteRequest(&mut now));
        let text = match now.format() {
            Ok(text) => text,
            Err(e) => {
                warn!("clock value rejected: {}", e);
                ctx.engine.diversions.clock_write = false;
                ctx.engine.goto(back, false);
                return;
            }
        };

        match send_clock(ctx, &text) {
            Ok(()) => {
                let timeout = ctx.config.timings.ok_timeout_ms;
                ctx.wait_ok(back, timeout, StateId::CLOCK_WRITE);
                ctx.engine.diversions.clock_write = false;
            }
            Err(e) => ctx.abandon_send(e, StateId::CLOCK_WRITE),
        }
    } else {
        warn!("clock write not acknowledged, giving up for now");
        ctx.engine.diversions.clock_write = true;
        ctx.engine.goto(back, false);
    }
    ctx.engine.retries = ctx.engine.retries.saturating_add(1);
}

fn send_clock(ctx: &mut Context<'_>, text: &str) -> Result<(), TxQueueError> {
    ctx.send_static(at::SET_CLOCK)?;
    ctx.send_static("\"")?;
    ctx.send_text(text)?;
    ctx.send_static("\"")?;
    ctx.send_static(at::NEWLINE)
}
