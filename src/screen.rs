//! The regulation screen shared by the constant voltage and constant current modes.
//!
//! A screen holds two setpoints (voltage and current) and two readbacks showing
//! what the output is actually doing. Output is only commanded from two places:
//! [`RegulationScreen::enable`] and [`RegulationScreen::commit`]. Everything
//! else, UI edits and remote parameter sets included, goes through those.

use log::{debug, info, warn};
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    config::ScreenConfig,
    error::Result,
    hw::{Channel, Display, Item, PowerControl, Sensors},
    past::{Past, PastError, PastKey, decode_unit, encode_unit},
    setpoint::{Readback, Setpoint},
    types::Quantity,
};

pub struct RegulationScreen {
    config: &'static ScreenConfig,
    /// Indexed by [`Quantity`].
    setpoints: [Setpoint; Quantity::COUNT],
    /// Indexed by [`Quantity`].
    readbacks: [Readback; Quantity::COUNT],
    enabled: bool,
}

impl RegulationScreen {
    /// Create a screen with both setpoints at zero.
    ///
    /// The voltage ceiling stays at zero until [`Self::init`] or the first tick.
    pub fn new(config: &'static ScreenConfig) -> Self {
        Self {
            config,
            setpoints: [Setpoint::new(0, 0), Setpoint::new(0, config.max_current_ma)],
            readbacks: [Readback::default(); Quantity::COUNT],
            enabled: false,
        }
    }

    /// Seed the voltage ceiling from the input rail.
    pub fn init(&mut self, sensors: &mut impl Sensors) {
        let sample = sensors.sample();
        let ceiling = self.voltage_ceiling(sensors.calibration().vin_mv(sample.v_in_raw));
        self.setpoint_mut(Quantity::Voltage).set_max(ceiling);
        info!("[{}] init, voltage ceiling {}", self.config.name, ceiling);
    }

    pub fn config(&self) -> &'static ScreenConfig {
        self.config
    }

    pub fn id(&self) -> u8 {
        self.config.id
    }

    pub fn name(&self) -> &'static str {
        self.config.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn setpoint(&self, quantity: Quantity) -> &Setpoint {
        &self.setpoints[quantity.index()]
    }

    pub fn readback(&self, quantity: Quantity) -> &Readback {
        &self.readbacks[quantity.index()]
    }

    fn setpoint_mut(&mut self, quantity: Quantity) -> &mut Setpoint {
        &mut self.setpoints[quantity.index()]
    }

    /// Switch the output on or off.
    ///
    /// Turning on programs all three registers from the held setpoints, then
    /// enables the output stage. Turning off leaves the setpoints alone so the
    /// next enable resumes from the same values.
    pub fn enable(&mut self, enabled: bool, power: &mut impl PowerControl) {
        let mode = self.config.mode;
        debug!(
            "[{}] {} output (regulate {}, limit {})",
            self.config.name,
            if enabled { "Enable" } else { "Disable" },
            mode.regulated().name(),
            mode.limited().name()
        );
        self.enabled = enabled;
        if enabled {
            let ceiling = u32::try_from(self.config.max_current_ma).unwrap_or(0);
            self.push(Quantity::Voltage, power);
            power.program(mode.current_ceiling_channel(), ceiling);
            self.push(Quantity::Current, power);
            power.enable_output(true);
        } else {
            power.enable_output(false);
        }
    }

    /// Commit a new setpoint value.
    ///
    /// This is the one path for both UI edits and remote sets: the value is
    /// bounds-checked, stored, written to the hardware and redrawn. An out of
    /// range value changes nothing and reaches neither hardware nor display.
    pub fn commit(
        &mut self,
        quantity: Quantity,
        value: i32,
        power: &mut impl PowerControl,
        display: &mut impl Display,
    ) -> Result<()> {
        let name = self.config.name;
        let setpoint = self.setpoint_mut(quantity);
        if let Err(err) = setpoint.set(value) {
            warn!(
                "[{}] {} {} is out of range (min:{} max:{})",
                name,
                quantity.name(),
                value,
                setpoint.min(),
                setpoint.max()
            );
            return Err(err);
        }
        debug!("[{}] Setting {} to {}", name, quantity.name(), value);
        self.push(quantity, power);
        display.draw(self.config.id, Item::Setpoint(quantity));
        Ok(())
    }

    /// Register that follows the setpoint of `quantity` in this mode.
    pub fn channel(&self, quantity: Quantity) -> Channel {
        match quantity {
            Quantity::Voltage => Channel::VoltageOut,
            Quantity::Current => self.config.mode.current_channel(),
        }
    }

    fn push(&self, quantity: Quantity, power: &mut impl PowerControl) {
        let value = self
            .config
            .scaling
            .internal_to_channel(quantity, self.setpoint(quantity).value());
        power.program(self.channel(quantity), value);
    }

    /// Periodic refresh.
    ///
    /// Moves the voltage ceiling to follow the input rail and updates both
    /// readbacks, redrawing a readback only when its value changed. The held
    /// setpoint values and the hardware are left untouched.
    pub fn tick(&mut self, sensors: &mut impl Sensors, display: &mut impl Display) {
        let sample = sensors.sample();
        let calibration = *sensors.calibration();

        let ceiling = self.voltage_ceiling(calibration.vin_mv(sample.v_in_raw));
        self.setpoint_mut(Quantity::Voltage).set_max(ceiling);

        for quantity in Quantity::iter() {
            let measured = calibration.measured(quantity, &sample);
            let value = self.config.scaling.measured_to_internal(quantity, measured);
            if self.readbacks[quantity.index()].update(value) {
                display.draw(self.config.id, Item::Readback(quantity));
            }
        }
    }

    fn voltage_ceiling(&self, vin_mv: u32) -> i32 {
        self.config.scaling.measured_to_internal(Quantity::Voltage, vin_mv)
    }

    /// Persist both setpoints.
    ///
    /// Both units are attempted even if the first write fails. The first
    /// failure is logged and returned; the in-memory values are unaffected.
    pub fn save(&self, past: &mut impl Past) -> core::result::Result<(), PastError> {
        let mut result = Ok(());
        for quantity in Quantity::iter() {
            let key = self.past_key(quantity);
            let unit = encode_unit(self.setpoint(quantity).value());
            if let Err(err) = past.write_unit(key, &unit) {
                warn!("[{}] failed to save {}: {}", self.config.name, quantity.name(), err);
                result = result.and(Err(err));
            }
        }
        result
    }

    /// Restore both setpoints from storage.
    ///
    /// Missing or foreign-width units keep the current value. Bounds are not
    /// stored, so a restored value is taken as-is and checked on the next edit.
    pub fn restore(&mut self, past: &impl Past) {
        let name = self.config.name;
        for quantity in Quantity::iter() {
            let key = self.past_key(quantity);
            let Some(unit) = past.read_unit(key) else {
                continue;
            };
            let Some(value) = decode_unit(unit) else {
                warn!(
                    "[{}] ignoring {} byte unit for {}",
                    name,
                    unit.len(),
                    quantity.name()
                );
                continue;
            };
            let setpoint = self.setpoint_mut(quantity);
            setpoint.restore(value);
            if !setpoint.contains(value) {
                warn!(
                    "[{}] restored {} {} is outside (min:{} max:{})",
                    name,
                    quantity.name(),
                    value,
                    setpoint.min(),
                    setpoint.max()
                );
            }
            info!("[{}] restored {} = {}", name, quantity.name(), value);
        }
    }

    /// Key of the stored unit for `quantity`.
    pub fn past_key(&self, quantity: Quantity) -> PastKey {
        PastKey::for_slot(self.config.id, quantity.slot())
    }
}
