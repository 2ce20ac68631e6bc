//! Idle dispatch, incoming calls and the default extension hooks

use gsmlink_protocol::{at, quoted_identifier};

use crate::events::Event;
use crate::extension::Context;
use crate::state::StateId;

pub(super) fn standby_pre(ctx: &mut Context<'_>) {
    ctx.engine.timer.reset();
    ctx.engine.long_timer.reset();
    ctx.session.message_just_arrived = false;
    // Nothing can be in progress once back in standby
    ctx.session.data.in_progress = false;
    ctx.engine.goto(StateId::STANDBY, false);
}

/// Idle dispatch
///
/// Checked in order: received line (ring, then new message), pending message
/// operation, pending data request, pending diversion, idle re-check.
pub(super) fn standby(ctx: &mut Context<'_>) {
    if let Some(line) = ctx.rx.line() {
        ctx.engine.long_timer.reset();
        if line == at::RING {
            ctx.engine.goto(StateId::WAITING_CLIP, false);
            let timeout = ctx.config.timings.caller_id_timeout_ms;
            ctx.engine.set_timeout(timeout, StateId::STANDBY_PRE);
        } else if line.starts_with(at::CMTI) && !ctx.session.message.any() {
            ctx.session.message_just_arrived = true;
            ctx.session.message.read = true;
            ctx.engine.goto(StateId::MESSAGE_HOOK, false);
        }
        ctx.rx.consume_one();
    } else if ctx.session.message.any() {
        ctx.engine.goto(StateId::MESSAGE_HOOK, true);
    } else if ctx.session.data.pending {
        ctx.engine.goto(StateId::DATA_HOOK, true);
    } else if ctx.engine.diversions.pending().is_some() {
        ctx.engine.goto(StateId::REGISTRATION_PRE, true);
    } else if ctx.engine.long_timer.elapsed() >= ctx.config.timings.idle_recheck_ms {
        ctx.engine.goto(StateId::REGISTRATION_PRE, true);
    }
}

pub(super) fn waiting_clip(ctx: &mut Context<'_>) {
    let Some(line) = ctx.rx.line() else {
        return;
    };
    let caller = if line.starts_with(at::CLIP) {
        quoted_identifier(line)
    } else {
        None
    };
    if let Some(caller) = caller {
        info!("missed call from {=str}", caller.as_str());
        ctx.engine.cancel_timeout();
        ctx.emit(Event::MissedCall(&caller));
        ctx.engine.goto(StateId::WAITING_NO_CARRIER, false);
        let timeout = ctx.config.timings.call_end_timeout_ms;
        ctx.engine.set_timeout(timeout, StateId::STANDBY_PRE);
    }
    ctx.rx.consume_one();
}

/// Wait for the caller to hang up; each further ring restarts the wait
pub(super) fn waiting_no_carrier(ctx: &mut Context<'_>) {
    let Some(line) = ctx.rx.line() else {
        return;
    };
    if line == at::RING {
        ctx.engine.restart_timeout();
    } else if line == at::NO_CARRIER {
        ctx.engine.goto(StateId::STANDBY_PRE, true);
        ctx.engine.cancel_timeout();
    }
    ctx.rx.consume_one();
}

/// Message hook with no messaging extension: drop every pending operation
pub(super) fn message_hook(ctx: &mut Context<'_>) {
    if ctx.session.message.write {
        ctx.emit(Event::MessageDiscarded);
    }
    ctx.session.message.write = false;
    ctx.session.message.read = false;
    ctx.session.message.send = false;
    ctx.session.message.delete = false;
    ctx.session.outgoing = None;
    ctx.engine.goto(StateId::STANDBY_PRE, true);
}

/// Data hook with no data session extension: fail the request
pub(super) fn data_hook(ctx: &mut Context<'_>) {
    ctx.emit(Event::DataSessionFailed);
    ctx.session.data.pending = false;
    ctx.session.request = None;
    ctx.engine.goto(StateId::STANDBY_PRE, true);
}
