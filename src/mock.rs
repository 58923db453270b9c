//! We use this mocking module in unit tests to emulate the power stage, its
//! ADC and the display.

use crate::hw::{AdcSample, Calibration, Display, Item, PowerControl, Sensors};

/// One call made on the power stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCall {
    Vout(u32),
    Iout(u32),
    Ilimit(u32),
    Enable(bool),
}

/// Our mock type used to record every power stage command.
pub struct MockPower {
    calls: heapless::Vec<PowerCall, 64>,
}

impl MockPower {
    pub fn new() -> Self {
        Self {
            calls: heapless::Vec::new(),
        }
    }

    /// Every call since creation or the last [`Self::clear_calls`].
    pub fn calls(&self) -> &[PowerCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: PowerCall) {
        self.calls.push(call).expect("mock power call log full");
    }
}

impl PowerControl for MockPower {
    fn set_vout_mv(&mut self, voltage_mv: u32) {
        self.record(PowerCall::Vout(voltage_mv));
    }

    fn set_iout_ma(&mut self, current_ma: u32) {
        self.record(PowerCall::Iout(current_ma));
    }

    fn set_ilimit_ma(&mut self, current_ma: u32) {
        self.record(PowerCall::Ilimit(current_ma));
    }

    fn enable_output(&mut self, enable: bool) {
        self.record(PowerCall::Enable(enable));
    }
}

/// Scripted ADC. Uses [`Calibration::UNITY`], so raw codes are milli-units.
pub struct MockSensors {
    sample: AdcSample,
    calibration: Calibration,
    /// Number of samples taken
    samples_taken: usize,
}

impl MockSensors {
    pub fn new() -> Self {
        Self {
            sample: AdcSample::default(),
            calibration: Calibration::UNITY,
            samples_taken: 0,
        }
    }

    pub fn set_input_mv(&mut self, voltage_mv: u16) {
        self.sample.v_in_raw = voltage_mv;
    }

    pub fn set_output(&mut self, voltage_mv: u16, current_ma: u16) {
        self.sample.v_out_raw = voltage_mv;
        self.sample.i_out_raw = current_ma;
    }

    pub fn samples_taken(&self) -> usize {
        self.samples_taken
    }
}

impl Sensors for MockSensors {
    fn sample(&mut self) -> AdcSample {
        self.samples_taken += 1;
        self.sample
    }

    fn calibration(&self) -> &Calibration {
        &self.calibration
    }
}

/// Display that records which items were redrawn.
pub struct MockDisplay {
    draws: heapless::Vec<(u8, Item), 64>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self {
            draws: heapless::Vec::new(),
        }
    }

    pub fn draws(&self) -> &[(u8, Item)] {
        &self.draws
    }

    pub fn clear(&mut self) {
        self.draws.clear();
    }
}

impl Display for MockDisplay {
    fn draw(&mut self, screen: u8, item: Item) {
        self.draws.push((screen, item)).expect("mock draw log full");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quantity;

    #[test]
    fn test_power_records_calls() {
        let mut power = MockPower::new();
        power.set_vout_mv(5000);
        power.enable_output(true);
        assert_eq!(power.calls(), &[PowerCall::Vout(5000), PowerCall::Enable(true)]);

        power.clear_calls();
        assert!(power.calls().is_empty());
    }

    #[test]
    fn test_sensors_return_script() {
        let mut sensors = MockSensors::new();
        sensors.set_input_mv(12_000);
        sensors.set_output(5_000, 100);
        let sample = sensors.sample();
        assert_eq!(sample.v_in_raw, 12_000);
        assert_eq!(sample.v_out_raw, 5_000);
        assert_eq!(sample.i_out_raw, 100);
        assert_eq!(sensors.samples_taken(), 1);
    }

    #[test]
    fn test_display_records_draws() {
        let mut display = MockDisplay::new();
        display.draw(1, Item::Readback(Quantity::Voltage));
        assert_eq!(display.draws(), &[(1, Item::Readback(Quantity::Voltage))]);
        display.clear();
        assert!(display.draws().is_empty());
    }
}
