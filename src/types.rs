//! This module contains the small value types shared by the regulation screens.

use strum_macros::{EnumCount, EnumIter, IntoStaticStr};

use crate::hw::Channel;

/// The two electrical quantities a screen holds a setpoint and a readback for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumCount, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Quantity {
    /// Output voltage. Held internally in centivolts.
    Voltage = 0,
    /// Output current. Held internally in milliamperes.
    Current = 1,
}

impl Quantity {
    /// Long parameter name, e.g. `"voltage"`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Short parameter alias, e.g. `"u"`.
    pub const fn alias(self) -> &'static str {
        match self {
            Quantity::Voltage => "u",
            Quantity::Current => "i",
        }
    }

    pub const fn unit(self) -> Unit {
        match self {
            Quantity::Voltage => Unit::Volt,
            Quantity::Current => Unit::Ampere,
        }
    }

    /// Slot index used to build the persistence key of this quantity.
    pub const fn slot(self) -> u32 {
        self as u32
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Physical unit a parameter is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum Unit {
    #[strum(serialize = "V")]
    Volt,
    #[strum(serialize = "A")]
    Ampere,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        self.into()
    }
}

/// SI prefix of the decimal integers exchanged through the parameter gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum SiPrefix {
    #[strum(serialize = "m")]
    Milli,
}

impl SiPrefix {
    pub fn symbol(self) -> &'static str {
        self.into()
    }
}

/// Represents the two possible power supply control modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ControlMode {
    /// Constant voltage regulation mode. Current is the limit quantity.
    Cv,
    /// Constant current regulation mode. Voltage is the limit quantity.
    Cc,
}

impl ControlMode {
    /// The quantity the control loop holds at its setpoint.
    pub const fn regulated(self) -> Quantity {
        match self {
            ControlMode::Cv => Quantity::Voltage,
            ControlMode::Cc => Quantity::Current,
        }
    }

    /// The quantity capped while the regulated one moves freely.
    pub const fn limited(self) -> Quantity {
        match self {
            ControlMode::Cv => Quantity::Current,
            ControlMode::Cc => Quantity::Voltage,
        }
    }

    /// Register that follows the user's current setpoint.
    ///
    /// * CV - the current limit register.
    /// * CC - the current output register.
    pub const fn current_channel(self) -> Channel {
        match self {
            ControlMode::Cv => Channel::CurrentLimit,
            ControlMode::Cc => Channel::CurrentOut,
        }
    }

    /// Register driven to the configured current ceiling on enable.
    pub const fn current_ceiling_channel(self) -> Channel {
        match self {
            ControlMode::Cv => Channel::CurrentOut,
            ControlMode::Cc => Channel::CurrentLimit,
        }
    }
}

/// Used to be less ambiguous and whether something is on or off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    /// Disabled.
    #[default]
    Off,
    /// Enabled.
    On,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}
