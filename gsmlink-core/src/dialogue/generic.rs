//! States shared by every exchange

use gsmlink_protocol::at;

use crate::extension::Context;
use crate::state::StateId;

pub(super) fn delay(ctx: &mut Context<'_>) {
    if ctx.engine.delay_expired() {
        trace!("delay complete");
        let target = ctx.engine.delay_target();
        ctx.engine.goto(target, false);
    }
}

pub(super) fn waiting_ok(ctx: &mut Context<'_>) {
    let Some(line) = ctx.rx.line() else {
        return;
    };
    if line == at::OK {
        let after_ok = ctx.engine.after_ok();
        ctx.engine.goto(after_ok, false);
        ctx.engine.cancel_timeout();
    }
    ctx.rx.consume_one();
}

pub(super) fn command_ok(ctx: &mut Context<'_>) {
    ctx.rx.discard_partial();
    if ctx.engine.command_attempts() < ctx.config.command_attempts {
        let command = ctx.engine.command();
        ctx.engine.count_command_attempt();
        match ctx.send_command(command) {
            Ok(()) => {
                let after_ok = ctx.engine.after_ok();
                let timeout = ctx.config.timings.command_timeout_ms;
                ctx.wait_ok(after_ok, timeout, StateId::COMMAND_OK);
            }
            Err(e) => ctx.abandon_send(e, StateId::COMMAND_OK),
        }
    } else {
        warn!("no OK to {=str}", ctx.engine.command());
        let fail = ctx.engine.after_command_failure();
        ctx.engine.goto(fail, false);
    }
}

/// Terminal state; only a diversion (power-off, clock) leaves it
pub(super) fn die(ctx: &mut Context<'_>) {
    if ctx.engine.diversions.pending().is_some() {
        ctx.engine.goto(StateId::DIE, true);
    }
}
