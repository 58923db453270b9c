//! Interfaces to the collaborators the screens drive: the power stage, the ADC
//! and the display.
//!
//! The screens never own these. The application context hands them in on each
//! call, which keeps the hardware regulator a single-writer resource.

use crate::types::Quantity;

/// A register of the power stage the screens may program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Output voltage DAC. Value in millivolts.
    VoltageOut,
    /// Output current DAC. Value in milliamperes.
    CurrentOut,
    /// Current limit comparator. Value in milliamperes.
    CurrentLimit,
}

/// Write side of the power stage driver.
///
/// The driver accepts any value inside its own range and reports nothing back.
/// Setpoint bounds keep the screens inside that range.
pub trait PowerControl {
    /// Set the output voltage in millivolts.
    fn set_vout_mv(&mut self, voltage_mv: u32);

    /// Set the output current in milliamperes.
    fn set_iout_ma(&mut self, current_ma: u32);

    /// Set the current limit in milliamperes.
    fn set_ilimit_ma(&mut self, current_ma: u32);

    /// Switch the output stage on or off.
    fn enable_output(&mut self, enable: bool);

    /// Write `value` to the given register.
    fn program(&mut self, channel: Channel, value: u32) {
        match channel {
            Channel::VoltageOut => self.set_vout_mv(value),
            Channel::CurrentOut => self.set_iout_ma(value),
            Channel::CurrentLimit => self.set_ilimit_ma(value),
        }
    }
}

/// One set of raw ADC codes, sampled together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdcSample {
    pub i_out_raw: u16,
    pub v_in_raw: u16,
    pub v_out_raw: u16,
}

/// Read side of the power stage driver.
pub trait Sensors {
    /// Return the latest raw ADC codes. Must not block.
    fn sample(&mut self) -> AdcSample;

    /// Coefficients mapping raw codes to physical values.
    fn calibration(&self) -> &Calibration;
}

/// Linear `k * raw + c` models mapping raw ADC codes to milli-units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub vin_k: f32,
    pub vin_c: f32,
    pub vout_k: f32,
    pub vout_c: f32,
    pub iout_k: f32,
    pub iout_c: f32,
}

impl Calibration {
    /// Coefficients measured on a 50 V / 5 A stage.
    ///
    /// The input rail model carries a one-code trim folded into `vin_c`.
    pub const DPS5005: Calibration = Calibration {
        vin_k: 16.746,
        vin_c: 47.366,
        vout_k: 13.164,
        vout_c: -100.751,
        iout_k: 1.713,
        iout_c: -118.51,
    };

    /// Raw codes are already milli-units.
    pub const UNITY: Calibration = Calibration {
        vin_k: 1.0,
        vin_c: 0.0,
        vout_k: 1.0,
        vout_c: 0.0,
        iout_k: 1.0,
        iout_c: 0.0,
    };

    /// Input rail voltage in millivolts.
    pub fn vin_mv(&self, raw: u16) -> u32 {
        Self::linear(self.vin_k, self.vin_c, raw)
    }

    /// Output voltage in millivolts.
    pub fn vout_mv(&self, raw: u16) -> u32 {
        Self::linear(self.vout_k, self.vout_c, raw)
    }

    /// Output current in milliamperes.
    pub fn iout_ma(&self, raw: u16) -> u32 {
        Self::linear(self.iout_k, self.iout_c, raw)
    }

    /// Measured value of `quantity` from a sample.
    pub fn measured(&self, quantity: Quantity, sample: &AdcSample) -> u32 {
        match quantity {
            Quantity::Voltage => self.vout_mv(sample.v_out_raw),
            Quantity::Current => self.iout_ma(sample.i_out_raw),
        }
    }

    // Float to int casts saturate, so readings below zero come out as 0.
    fn linear(k: f32, c: f32, raw: u16) -> u32 {
        (k * f32::from(raw) + c) as u32
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::DPS5005
    }
}

/// Something the display can redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    /// The editable setpoint of a quantity.
    Setpoint(Quantity),
    /// The live measured value of a quantity.
    Readback(Quantity),
}

/// Redraw hook of the UI framework.
pub trait Display {
    /// Redraw `item` of the screen with the given id.
    fn draw(&mut self, screen: u8, item: Item);
}
