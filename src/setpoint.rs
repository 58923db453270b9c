//! Editable setpoints and their live readback mirrors.

use crate::error::{Error, Result};

/// A user-editable, bounds-checked target value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setpoint {
    value: i32,
    /// Inclusive lower bound.
    min: i32,
    /// Inclusive upper bound.
    max: i32,
}

impl Setpoint {
    /// Create a setpoint holding zero, or `min` if zero is below it.
    pub const fn new(min: i32, max: i32) -> Self {
        let value = if min > 0 { min } else { 0 };
        Self { value, min, max }
    }

    pub const fn value(&self) -> i32 {
        self.value
    }

    pub const fn min(&self) -> i32 {
        self.min
    }

    pub const fn max(&self) -> i32 {
        self.max
    }

    /// Whether `value` lies inside `[min, max]`.
    pub const fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Store `value` if it lies inside the bounds. Nothing changes otherwise.
    pub fn set(&mut self, value: i32) -> Result<()> {
        if !self.contains(value) {
            return Err(Error::RangeError);
        }
        self.value = value;
        Ok(())
    }

    /// Move the upper bound.
    ///
    /// The held value is not clamped: a value that was in bounds can be left
    /// above a shrinking ceiling until the next edit.
    pub fn set_max(&mut self, max: i32) {
        self.max = max;
    }

    /// Overwrite the value with one read back from storage, bypassing the bounds.
    pub(crate) fn restore(&mut self, value: i32) {
        self.value = value;
    }
}

/// Display-only mirror of a measured quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readback {
    value: i32,
}

impl Readback {
    pub const fn value(&self) -> i32 {
        self.value
    }

    /// Take a new measurement. Returns `true` when the value changed.
    pub fn update(&mut self, value: i32) -> bool {
        if value == self.value {
            return false;
        }
        self.value = value;
        true
    }
}
