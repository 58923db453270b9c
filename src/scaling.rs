//! Scaling factors between the screen's fixed-point values and SI milli-units.
//!
//! The front panel shows voltage with two decimals (centivolts) and current with
//! three (milliamperes), while the hardware driver and the parameter gateway
//! work in millivolts and milliamperes. This module defines that conversion.

use crate::types::Quantity;

/// Scaling factors for converting internal values to SI milli-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingFactors {
    /// Multiplier for voltage values (e.g., 10 means internal value is in centivolts, multiply by 10 to get mV)
    pub voltage_divisor: i32,
    /// Multiplier for current values (e.g., 1 means internal value is already in mA)
    pub current_divisor: i32,
}

/// Centivolt voltage and milliampere current, as shown on the front panel.
pub const FRONT_PANEL: ScalingFactors = ScalingFactors::new(10, 1);

impl Default for ScalingFactors {
    /// Default to no scaling.
    fn default() -> Self {
        Self {
            voltage_divisor: 1,
            current_divisor: 1,
        }
    }
}

impl ScalingFactors {
    /// Create a new `ScalingFactors` instance with the specified divisor values.
    ///
    /// # Arguments
    ///
    /// * `voltage_divisor` - Multiplier for voltage values (internal to mV).
    /// * `current_divisor` - Multiplier for current values (internal to mA).
    pub const fn new(voltage_divisor: i32, current_divisor: i32) -> Self {
        Self {
            voltage_divisor,
            current_divisor,
        }
    }

    #[inline]
    pub const fn divisor(&self, quantity: Quantity) -> i32 {
        match quantity {
            Quantity::Voltage => self.voltage_divisor,
            Quantity::Current => self.current_divisor,
        }
    }

    /// Convert an SI milli-unit value to the internal representation.
    ///
    /// Integer division truncates toward zero, so `5009` mV becomes `500` cV.
    #[inline]
    pub const fn si_to_internal(&self, quantity: Quantity, si: i32) -> i32 {
        si / self.divisor(quantity)
    }

    /// Convert an internal value back to SI milli-units.
    #[inline]
    pub const fn internal_to_si(&self, quantity: Quantity, value: i32) -> i32 {
        value.saturating_mul(self.divisor(quantity))
    }

    /// Convert an internal value to the unsigned milli-unit value a hardware channel takes.
    ///
    /// Negative values never reach the regulator; they map to zero.
    #[inline]
    pub fn internal_to_channel(&self, quantity: Quantity, value: i32) -> u32 {
        u32::try_from(self.internal_to_si(quantity, value)).unwrap_or(0)
    }

    /// Convert a measured milli-unit value to the internal representation.
    #[inline]
    pub fn measured_to_internal(&self, quantity: Quantity, measured: u32) -> i32 {
        let measured = i32::try_from(measured).unwrap_or(i32::MAX);
        self.si_to_internal(quantity, measured)
    }
}
