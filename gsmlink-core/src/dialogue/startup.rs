//! Start-up handshake: identity, SIM PIN, module setup and registration

use gsmlink_protocol::{at, is_numeric, pin_status, registration, PinStatus};

use crate::events::{Event, PinCode};
use crate::extension::Context;
use crate::state::StateId;
use crate::txqueue::TxQueueError;

pub(super) fn imei_pre(ctx: &mut Context<'_>) {
    ctx.engine.retries = 0;
    ctx.engine.goto(StateId::IMEI_QUERY, false);
}

pub(super) fn imei_query(ctx: &mut Context<'_>) {
    ctx.rx.discard_partial();
    if ctx.engine.retries < ctx.config.query_attempts {
        match ctx.send_command(at::QUERY_IMEI) {
            Ok(()) => {
                ctx.engine.goto(StateId::IMEI_RESPONSE, false);
                let timeout = ctx.config.timings.query_timeout_ms;
                ctx.engine.set_timeout(timeout, StateId::IMEI_QUERY);
            }
            Err(e) => ctx.abandon_send(e, StateId::IMEI_QUERY),
        }
    } else {
        // The IMEI is informational only
        warn!("no IMEI reply, continuing");
        ctx.engine.cancel_timeout();
        ctx.engine.goto(StateId::PIN_CHECK_PRE, false);
    }
    ctx.engine.retries = ctx.engine.retries.saturating_add(1);
}

pub(super) fn imei_response(ctx: &mut Context<'_>) {
    let Some(line) = ctx.rx.line() else {
        return;
    };
    ctx.engine.restart_timeout();

    let numeric = is_numeric(line);
    if numeric {
        if let Ok(imei) = core::str::from_utf8(line) {
            ctx.events.on_event(Event::IdentityRead(imei));
        }
    }
    if numeric {
        ctx.engine.cancel_timeout();
        let timeout = ctx.config.timings.ok_timeout_ms;
        ctx.wait_ok(StateId::PIN_CHECK_PRE, timeout, StateId::PIN_CHECK_PRE);
    }
    ctx.rx.consume_one();
}

pub(super) fn pin_check_pre(ctx: &mut Context<'_>) {
    ctx.engine.retries = 0;
    ctx.engine.goto(StateId::PIN_CHECK_QUERY, false);
}

pub(super) fn pin_check_query(ctx: &mut Context<'_>) {
    ctx.rx.discard_partial();
    if ctx.engine.retries < ctx.config.query_attempts {
        match ctx.send_command(at::QUERY_PIN) {
            Ok(()) => {
                ctx.engine.goto(StateId::PIN_CHECK_RESPONSE, false);
                let timeout = ctx.config.timings.query_timeout_ms;
                ctx.engine.set_timeout(timeout, StateId::PIN_CHECK_QUERY);
            }
            Err(e) => ctx.abandon_send(e, StateId::PIN_CHECK_QUERY),
        }
    } else {
        warn!("no PIN status reply, restarting module");
        ctx.engine.cancel_timeout();
        ctx.engine.goto(StateId::POWER_OFF_PRE, false);
    }
    ctx.engine.retries = ctx.engine.retries.saturating_add(1);
}

pub(super) fn pin_check_response(ctx: &mut Context<'_>) {
    let Some(line) = ctx.rx.line() else {
        return;
    };
    ctx.engine.restart_timeout();

    if let Some(status) = pin_status(line) {
        ctx.engine.cancel_timeout();
        let next = match status {
            PinStatus::Ready => StateId::SETUP_HOOK_IN,
            PinStatus::PinRequired => StateId::PIN_PRE,
            PinStatus::PukRequired => {
                warn!("SIM blocked, PUK required");
                StateId::POWER_OFF_PRE
            }
            PinStatus::Other => StateId::PIN_CHECK_QUERY,
        };
        let timeout = ctx.config.timings.ok_timeout_ms;
        ctx.wait_ok(next, timeout, next);
    }
    ctx.rx.consume_one();
}

pub(super) fn pin_pre(ctx: &mut Context<'_>) {
    ctx.engine.retries = 0;
    ctx.engine.goto(StateId::PIN_COMMAND, false);
}

pub(super) fn pin_command(ctx: &mut Context<'_>) {
    ctx.rx.discard_partial();
    if ctx.engine.retries < ctx.config.command_attempts {
        let mut pin = PinCode::new();
        ctx.emit(Event::PinRequested(&mut pin));
        if pin.is_empty() {
            warn!("PIN request declined");
            ctx.engine.cancel_timeout();
            ctx.engine.goto(StateId::DIE, true);
            return;
        }
        match send_pin(ctx, &pin) {
            Ok(()) => {
                ctx.engine.goto(StateId::PIN_RESPONSE, false);
                let timeout = ctx.config.timings.pin_timeout_ms;
                ctx.engine.set_timeout(timeout, StateId::PIN_COMMAND);
            }
            Err(e) => ctx.abandon_send(e, StateId::PIN_COMMAND),
        }
    } else {
        warn!("no reply to PIN, restarting module");
        ctx.engine.cancel_timeout();
        ctx.engine.goto(StateId::POWER_OFF_PRE, false);
    }
    ctx.engine.retries = ctx.engine.retries.saturating_add(1);
}

pub(super) fn pin_response(ctx: &mut Context<'_>) {
    let Some(line) = ctx.rx.line() else {
        return;
    };
    ctx.engine.restart_timeout();

    if line.starts_with(at::OK) {
        ctx.engine.cancel_timeout();
        // Give the SIM time to initialise
        let settle = ctx.config.timings.sim_settle_ms;
        ctx.engine.goto_after_delay(settle, StateId::SETUP_HOOK_IN);
        ctx.engine.goto(StateId::DELAY, true);
    } else if line.starts_with(at::ERROR) {
        warn!("PIN rejected");
        ctx.engine.cancel_timeout();
        ctx.emit(Event::PinIncorrect);
        ctx.engine.goto(StateId::DIE, true);
    }
    ctx.rx.consume_one();
}

fn send_pin(ctx: &mut Context<'_>, pin: &str) -> Result<(), TxQueueError> {
    ctx.send_static(at::ENTER_PIN)?;
    ctx.send_text(pin)?;
    ctx.send_static(at::NEWLINE)
}

/// Module-specific setup hook (claimed by module extensions)
pub(super) fn setup_hook_in(ctx: &mut Context<'_>) {
    ctx.engine.goto(StateId::SETUP_HOOK_OUT, true);
}

pub(super) fn setup_hook_out(ctx: &mut Context<'_>) {
    ctx.engine.goto(StateId::ENABLE_CLIP, true);
}

pub(super) fn enable_clip(ctx: &mut Context<'_>) {
    ctx.command_ok(at::ENABLE_CLIP, StateId::SET_TEXT_MODE, None);
}

pub(super) fn set_text_mode(ctx: &mut Context<'_>) {
    ctx.command_ok(at::TEXT_MODE, StateId::MESSAGE_ALERT_PRE, None);
}

pub(super) fn message_alert_pre(ctx: &mut Context<'_>) {
    ctx.engine.retries = 0;
    ctx.engine.flag = false;
    ctx.engine.goto(StateId::MESSAGE_ALERT, false);
}

/// Alert enabling is retried in rounds separated by a back-off; `flag`
/// marks that a round has been issued
pub(super) fn message_alert(ctx: &mut Context<'_>) {
    if ctx.engine.flag {
        let backoff = ctx.config.timings.alert_backoff_ms;
        ctx.engine.goto_after_delay(backoff, StateId::MESSAGE_ALERT);
        ctx.engine.flag = false;
        ctx.engine.retries = ctx.engine.retries.saturating_add(1);
    } else if ctx.engine.retries < ctx.config.alert_attempts {
        ctx.command_ok(
            at::MESSAGE_ALERTS,
            StateId::REGISTRATION_PRE,
            Some(StateId::MESSAGE_ALERT),
        );
        ctx.engine.flag = true;
    } else {
        warn!("message alerts not enabled, restarting module");
        ctx.engine.goto(StateId::POWER_OFF_PRE, false);
    }
}

pub(super) fn registration_pre(ctx: &mut Context<'_>) {
    ctx.engine.long_timer.reset();
    ctx.engine.goto(StateId::REGISTRATION_QUERY, false);
    if ctx.engine.after_registration().is_none() {
        ctx.engine.set_after_registration(Some(StateId::STANDBY_PRE));
        // Pick up anything that arrived while away
        ctx.session.message.read = true;
    }
}

pub(super) fn registration_query(ctx: &mut Context<'_>) {
    ctx.rx.discard_partial();
    if ctx.engine.long_timer.elapsed() < ctx.config.timings.registration_window_ms {
        match ctx.send_command(at::QUERY_REGISTRATION) {
            Ok(()) => {
                ctx.engine.goto(StateId::REGISTRATION_RESPONSE, false);
                let timeout = ctx.config.timings.query_timeout_ms;
                ctx.engine.set_timeout(timeout, StateId::REGISTRATION_QUERY);
            }
            Err(e) => ctx.abandon_send(e, StateId::REGISTRATION_QUERY),
        }
    } else {
        warn!("not registered, restarting module");
        ctx.engine.cancel_timeout();
        ctx.engine.goto(StateId::POWER_OFF_PRE, false);
    }
}

pub(super) fn registration_response(ctx: &mut Context<'_>) {
    let Some(line) = ctx.rx.line() else {
        return;
    };
    ctx.engine.restart_timeout();

    if let Some(status) = registration(line) {
        ctx.engine.cancel_timeout();
        if status.is_registered() {
            let next = ctx
                .engine
                .take_after_registration()
                .unwrap_or(StateId::STANDBY_PRE);
            let timeout = ctx.config.timings.ok_timeout_ms;
            ctx.wait_ok(next, timeout, next);
            if !ctx.session.readiness.registered {
                info!("registered on network");
            }
            ctx.session.readiness.registered = true;
        } else {
            let retry = ctx.config.timings.registration_retry_ms;
            ctx.engine.goto_after_delay(retry, StateId::REGISTRATION_QUERY);
            ctx.session.readiness.registered = false;
        }
    }
    ctx.rx.consume_one();
}
