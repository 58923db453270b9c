//! Configuration tables for the regulation screens.
//!
//! The CV and CC screens share one implementation and differ only in the
//! values below.

use fugit::MillisDurationU32;

use crate::{
    scaling::{FRONT_PANEL, ScalingFactors},
    types::{ControlMode, Quantity, SiPrefix, Unit},
};

/// Highest current the power stage can regulate, in milliamperes.
pub const MAX_CURRENT_MA: i32 = 5000;

/// How often the active screen refreshes its readbacks.
pub const TICK_PERIOD: MillisDurationU32 = MillisDurationU32::millis(100);

/// An externally addressable parameter of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub quantity: Quantity,
    /// SI prefix of the decimal integers exchanged for this parameter.
    pub prefix: SiPrefix,
}

impl Parameter {
    pub const fn new(quantity: Quantity) -> Self {
        Self {
            quantity,
            prefix: SiPrefix::Milli,
        }
    }

    pub fn name(&self) -> &'static str {
        self.quantity.name()
    }

    pub const fn alias(&self) -> &'static str {
        self.quantity.alias()
    }

    pub const fn unit(&self) -> Unit {
        self.quantity.unit()
    }

    /// Exact match against the long name or the short alias.
    pub fn matches(&self, name: &str) -> bool {
        name == self.name() || name == self.alias()
    }
}

/// Parameters exposed by both built-in screens.
pub const PARAMETERS: &[Parameter] = &[
    Parameter::new(Quantity::Voltage),
    Parameter::new(Quantity::Current),
];

/// Everything that distinguishes one regulation screen from another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenConfig {
    /// Stable id. Also the top byte of every persistence key of the screen.
    pub id: u8,
    pub name: &'static str,
    pub mode: ControlMode,
    /// Static ceiling of the current setpoint, in milliamperes.
    pub max_current_ma: i32,
    pub scaling: ScalingFactors,
    pub parameters: &'static [Parameter],
}

impl ScreenConfig {
    /// Look a parameter up by long name or alias.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.matches(name))
    }
}

/// Constant voltage: regulate voltage, limit current.
pub const CV: ScreenConfig = ScreenConfig {
    id: 1,
    name: "cv",
    mode: ControlMode::Cv,
    max_current_ma: MAX_CURRENT_MA,
    scaling: FRONT_PANEL,
    parameters: PARAMETERS,
};

/// Constant current: regulate current, limit voltage.
pub const CC: ScreenConfig = ScreenConfig {
    id: 2,
    name: "cc",
    mode: ControlMode::Cc,
    max_current_ma: MAX_CURRENT_MA,
    scaling: FRONT_PANEL,
    parameters: PARAMETERS,
};
