//! Built-in modem dialogue
//!
//! One call to [`step`] processes the current state once. States that wait
//! for a reply inspect at most one received line per step and always mark it
//! processed, whether or not it was the reply they expected.
//!
//! ```text
//!   PowerOn ──► Imei ──► PinCheck ──► [Pin] ──► Setup hooks ──► Clip
//!      ▲                     │                                   │
//!      │                     ▼                                   ▼
//!   PowerOff ◄── failures   Die                         TextMode, Alerts
//!                                                                │
//!   Standby ◄──────────────── Registration ◄─────────────────────┘
//!      │  ▲
//!      ▼  │
//!   calls, message hook, data hook, diversions (power-off, clock)
//! ```
//!
//! Divert-safe points are the transitions made with `goto(.., true)`:
//! leaving power-on, the PIN settle delay, the setup hooks, entering
//! registration from standby, leaving the hooks and calls, and `Die`.

mod clock;
mod generic;
mod power;
mod standby;
mod startup;

use crate::extension::Context;
use crate::state::StateId;

/// Process the current state once
pub fn step(ctx: &mut Context<'_>) {
    let state = ctx.engine.state();
    match state {
        StateId::DELAY => generic::delay(ctx),
        StateId::WAITING_OK => generic::waiting_ok(ctx),
        StateId::COMMAND_OK => generic::command_ok(ctx),
        StateId::DIE => generic::die(ctx),

        StateId::POWER_OFF_PRE => power::power_off_pre(ctx),
        StateId::POWER_OFF => power::power_off(ctx),
        StateId::POWERING_OFF => power::powering_off(ctx),
        StateId::POWER_ON => power::power_on(ctx),
        StateId::POWERING_ON => power::powering_on(ctx),

        StateId::IMEI_PRE => startup::imei_pre(ctx),
        StateId::IMEI_QUERY => startup::imei_query(ctx),
        StateId::IMEI_RESPONSE => startup::imei_response(ctx),
        StateId::PIN_CHECK_PRE => startup::pin_check_pre(ctx),
        StateId::PIN_CHECK_QUERY => startup::pin_check_query(ctx),
        StateId::PIN_CHECK_RESPONSE => startup::pin_check_response(ctx),
        StateId::PIN_PRE => startup::pin_pre(ctx),
        StateId::PIN_COMMAND => startup::pin_command(ctx),
        StateId::PIN_RESPONSE => startup::pin_response(ctx),
        StateId::SETUP_HOOK_IN => startup::setup_hook_in(ctx),
        StateId::SETUP_HOOK_OUT => startup::setup_hook_out(ctx),
        StateId::ENABLE_CLIP => startup::enable_clip(ctx),
        StateId::SET_TEXT_MODE => startup::set_text_mode(ctx),
        StateId::MESSAGE_ALERT_PRE => startup::message_alert_pre(ctx),
        StateId::MESSAGE_ALERT => startup::message_alert(ctx),
        StateId::REGISTRATION_PRE => startup::registration_pre(ctx),
        StateId::REGISTRATION_QUERY => startup::registration_query(ctx),
        StateId::REGISTRATION_RESPONSE => startup::registration_response(ctx),

        StateId::STANDBY_PRE => standby::standby_pre(ctx),
        StateId::STANDBY => standby::standby(ctx),
        StateId::WAITING_CLIP => standby::waiting_clip(ctx),
        StateId::WAITING_NO_CARRIER => standby::waiting_no_carrier(ctx),
        StateId::MESSAGE_HOOK => standby::message_hook(ctx),
        StateId::DATA_HOOK => standby::data_hook(ctx),

        StateId::CLOCK_READ_PRE => clock::read_pre(ctx),
        StateId::CLOCK_READ_QUERY => clock::read_query(ctx),
        StateId::CLOCK_READ_RESPONSE => clock::read_response(ctx),
        StateId::CLOCK_WRITE_PRE => clock::write_pre(ctx),
        StateId::CLOCK_WRITE => clock::write(ctx),

        unknown => {
            warn!("state {} not defined", unknown);
            ctx.engine.goto(StateId::POWER_ON, false);
        }
    }
}
