//! State identifiers
//!
//! States form an open `u8` space so extensions can add their own. Values
//! below 80 and from 140 to 199 belong to the built-in dialogue; the
//! remaining ranges are reserved per extension category (see
//! [`crate::ExtensionKind::reserved`]).

/// Identifier of a dialogue state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub u8);

impl StateId {
    // Generic
    pub const DELAY: Self = Self(1);
    pub const WAITING_OK: Self = Self(2);
    pub const COMMAND_OK: Self = Self(3);
    pub const DIE: Self = Self(9);

    // Power sequencing
    pub const POWER_OFF_PRE: Self = Self(10);
    pub const POWER_OFF: Self = Self(11);
    pub const POWERING_OFF: Self = Self(12);
    pub const POWER_ON: Self = Self(13);
    pub const POWERING_ON: Self = Self(14);

    // Identity
    pub const IMEI_PRE: Self = Self(20);
    pub const IMEI_QUERY: Self = Self(21);
    pub const IMEI_RESPONSE: Self = Self(22);

    // SIM PIN
    pub const PIN_CHECK_PRE: Self = Self(30);
    pub const PIN_CHECK_QUERY: Self = Self(31);
    pub const PIN_CHECK_RESPONSE: Self = Self(32);
    pub const PIN_PRE: Self = Self(33);
    pub const PIN_COMMAND: Self = Self(34);
    pub const PIN_RESPONSE: Self = Self(35);

    // Module setup
    pub const SETUP_HOOK_IN: Self = Self(40);
    pub const SETUP_HOOK_OUT: Self = Self(41);
    pub const ENABLE_CLIP: Self = Self(42);
    pub const SET_TEXT_MODE: Self = Self(43);
    pub const MESSAGE_ALERT_PRE: Self = Self(44);
    pub const MESSAGE_ALERT: Self = Self(45);

    // Network registration
    pub const REGISTRATION_PRE: Self = Self(50);
    pub const REGISTRATION_QUERY: Self = Self(51);
    pub const REGISTRATION_RESPONSE: Self = Self(52);

    // Idle
    pub const STANDBY_PRE: Self = Self(60);
    pub const STANDBY: Self = Self(61);

    // Incoming call
    pub const WAITING_CLIP: Self = Self(70);
    pub const WAITING_NO_CARRIER: Self = Self(71);

    // Extension hooks
    pub const MESSAGE_HOOK: Self = Self(109);
    pub const DATA_HOOK: Self = Self(110);

    // Clock diversions
    pub const CLOCK_READ_PRE: Self = Self(150);
    pub const CLOCK_READ_QUERY: Self = Self(151);
    pub const CLOCK_READ_RESPONSE: Self = Self(152);
    pub const CLOCK_WRITE_PRE: Self = Self(160);
    pub const CLOCK_WRITE: Self = Self(161);

    /// Human-readable name of a built-in state
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::DELAY => "Delay",
            Self::WAITING_OK => "WaitingOk",
            Self::COMMAND_OK => "CommandOk",
            Self::DIE => "Die",
            Self::POWER_OFF_PRE => "PowerOffPre",
            Self::POWER_OFF => "PowerOff",
            Self::POWERING_OFF => "PoweringOff",
            Self::POWER_ON => "PowerOn",
            Self::POWERING_ON => "PoweringOn",
            Self::IMEI_PRE => "ImeiPre",
            Self::IMEI_QUERY => "ImeiQuery",
            Self::IMEI_RESPONSE => "ImeiResponse",
            Self::PIN_CHECK_PRE => "PinCheckPre",
            Self::PIN_CHECK_QUERY => "PinCheckQuery",
            Self::PIN_CHECK_RESPONSE => "PinCheckResponse",
            Self::PIN_PRE => "PinPre",
            Self::PIN_COMMAND => "PinCommand",
            Self::PIN_RESPONSE => "PinResponse",
            Self::SETUP_HOOK_IN => "SetupHookIn",
            Self::SETUP_HOOK_OUT => "SetupHookOut",
            Self::ENABLE_CLIP => "EnableClip",
            Self::SET_TEXT_MODE => "SetTextMode",
            Self::MESSAGE_ALERT_PRE => "MessageAlertPre",
            Self::MESSAGE_ALERT => "MessageAlert",
            Self::REGISTRATION_PRE => "RegistrationPre",
            Self::REGISTRATION_QUERY => "RegistrationQuery",
            Self::REGISTRATION_RESPONSE => "RegistrationResponse",
            Self::STANDBY_PRE => "StandbyPre",
            Self::STANDBY => "Standby",
            Self::WAITING_CLIP => "WaitingClip",
            Self::WAITING_NO_CARRIER => "WaitingNoCarrier",
            Self::MESSAGE_HOOK => "MessageHook",
            Self::DATA_HOOK => "DataHook",
            Self::CLOCK_READ_PRE => "ClockReadPre",
            Self::CLOCK_READ_QUERY => "ClockReadQuery",
            Self::CLOCK_READ_RESPONSE => "ClockReadResponse",
            Self::CLOCK_WRITE_PRE => "ClockWritePre",
            Self::CLOCK_WRITE => "ClockWrite",
            _ => return None,
        };
        Some(name)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StateId {
    fn format(&self, f: defmt::Formatter) {
        match self.name() {
            Some(name) => defmt::write!(f, "{=str}", name),
            None => defmt::write!(f, "State({=u8})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        assert_eq!(StateId::POWER_ON.name(), Some("PowerOn"));
        assert_eq!(StateId::CLOCK_WRITE.name(), Some("ClockWrite"));
        assert_eq!(StateId(200).name(), None);
    }
}
