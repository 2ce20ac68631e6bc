//! Power sequencing
//!
//! The module is switched with a pulse on its power key and reports its
//! state on the status line. Switching off holds the key until the status
//! line has read off for a short confirmation window, or for at most one
//! press length. A module that will not switch off is pressed again, and
//! with a reset line wired, eventually reset.

use crate::extension::Context;
use crate::state::StateId;

pub(super) fn power_off_pre(ctx: &mut Context<'_>) {
    ctx.engine.retries = 0;
    if ctx.config.reset_enabled && ctx.control.is_reset_asserted() {
        // Released after a forced reset; let the module come back first
        ctx.control.set_reset(false);
        let release = ctx.config.timings.reset_release_ms;
        ctx.engine.goto_after_delay(release, StateId::POWER_OFF);
    } else {
        ctx.engine.goto(StateId::POWER_OFF, false);
    }
}

pub(super) fn power_off(ctx: &mut Context<'_>) {
    if ctx.control.is_powered() {
        info!("switching module off");
        ctx.session.readiness.expect_on = false;
        ctx.session.readiness.registered = false;
        ctx.control.set_power_key(true);
        ctx.engine.long_timer.reset();
        ctx.engine.flag = false;
        ctx.engine.goto(StateId::POWERING_OFF, false);
    } else if !ctx.engine.diversions.power_off {
        ctx.engine.goto(StateId::POWER_ON, false);
    }
    // Otherwise stay here, held off until power is requested again
}

pub(super) fn powering_off(ctx: &mut Context<'_>) {
    let timings = ctx.config.timings;
    let powered = ctx.control.is_powered();

    if ctx.control.is_power_key_pressed() {
        let confirmed_off =
            ctx.engine.flag && !powered && ctx.engine.timer.elapsed() > timings.power_off_confirm_ms;
        if confirmed_off || ctx.engine.long_timer.elapsed() > timings.power_off_press_ms {
            ctx.control.set_power_key(false);
            ctx.engine.long_timer.reset();
        } else if !powered {
            if !ctx.engine.flag {
                ctx.engine.flag = true;
                ctx.engine.timer.reset();
            }
        } else {
            ctx.engine.flag = false;
        }
    } else if !powered {
        ctx.engine.goto_after_delay(timings.power_off_rest_ms, StateId::POWER_OFF);
    } else if ctx.engine.long_timer.elapsed() > timings.power_off_give_up_ms {
        if !ctx.config.reset_enabled || ctx.engine.retries < ctx.config.power_off_attempts {
            warn!("module still on, pressing again");
            ctx.engine.retries = ctx.engine.retries.saturating_add(1);
            ctx.engine.goto(StateId::POWER_OFF, false);
        } else {
            warn!("module still on, asserting reset");
            ctx.control.set_reset(true);
            ctx.engine.goto_after_delay(timings.reset_pulse_ms, StateId::POWER_OFF_PRE);
        }
    }
}

pub(super) fn power_on(ctx: &mut Context<'_>) {
    if ctx.engine.diversions.power_off {
        ctx.engine.goto(StateId::POWER_OFF, false);
    } else if !ctx.control.is_powered() {
        info!("switching module on");
        ctx.control.set_power_key(true);
        let press = ctx.config.timings.power_on_press_ms;
        ctx.engine.goto_after_delay(press, StateId::POWERING_ON);
    } else {
        ctx.session.module_restarted();
        ctx.engine.long_timer.reset();
        ctx.engine.goto(StateId::IMEI_PRE, true);
    }
}

pub(super) fn powering_on(ctx: &mut Context<'_>) {
    if ctx.control.is_power_key_pressed() {
        ctx.control.set_power_key(false);
        ctx.engine.timer.reset();
    } else if ctx.control.is_powered() {
        let stabilise = ctx.config.timings.stabilise_ms;
        ctx.engine.goto_after_delay(stabilise, StateId::POWER_ON);
    } else if ctx.engine.timer.elapsed() > ctx.config.timings.power_on_confirm_ms {
        warn!("module did not switch on, retrying");
        ctx.engine.goto(StateId::POWER_ON, false);
    }
}
