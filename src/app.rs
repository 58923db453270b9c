//! The application context: owns the screens and the hardware they drive.
//!
//! Everything runs on one cooperative control stream. Call [`App::poll`] from
//! the main loop and route panel edits, the output button and remote parameter
//! requests through the other methods; each completes without blocking.

use fugit::{MillisDurationU32, TimerInstantU32};
use log::info;

use crate::{
    config::ScreenConfig,
    error::{Error, Result},
    gateway::ParamValue,
    hw::{Display, PowerControl, Sensors},
    past::{Past, PastError},
    screen::RegulationScreen,
    types::{Quantity, State},
};

/// Millisecond timestamps from the system tick.
pub type Instant = TimerInstantU32<1000>;

/// You can create an `App` from any power stage, ADC and display implementing
/// [`PowerControl`], [`Sensors`] and [`Display`].
///
/// Up to `N` screens can be registered. Only the active screen is ticked and
/// receives edits, output toggles and parameter requests.
pub struct App<P, S, D, const N: usize = 2> {
    power: P,
    sensors: S,
    display: D,
    screens: heapless::Vec<RegulationScreen, N>,
    active: usize,
    output: State,
    tick_period: MillisDurationU32,
    last_tick: Option<Instant>,
}

impl<P: PowerControl, S: Sensors, D: Display, const N: usize> App<P, S, D, N> {
    pub fn new(power: P, sensors: S, display: D, tick_period: MillisDurationU32) -> Self {
        Self {
            power,
            sensors,
            display,
            screens: heapless::Vec::new(),
            active: 0,
            output: State::Off,
            tick_period,
            last_tick: None,
        }
    }

    /// Create, initialise and register a screen. The first one registered is active.
    pub fn register(&mut self, config: &'static ScreenConfig) -> Result<()> {
        if self.screen(config.id).is_some() {
            return Err(Error::DuplicateScreen(config.id));
        }
        let mut screen = RegulationScreen::new(config);
        screen.init(&mut self.sensors);
        self.screens.push(screen).map_err(|_| Error::RegistryFull)?;
        info!("registered screen '{}' (id {})", config.name, config.id);
        Ok(())
    }

    pub fn screens(&self) -> &[RegulationScreen] {
        &self.screens
    }

    pub fn screen(&self, id: u8) -> Option<&RegulationScreen> {
        self.screens.iter().find(|screen| screen.id() == id)
    }

    pub fn active_screen(&self) -> Option<&RegulationScreen> {
        self.screens.get(self.active)
    }

    /// Make another screen active.
    ///
    /// The output is switched off first if it was on, so the new screen
    /// always starts from a disabled output. The new screen is ticked once
    /// so its voltage ceiling follows the present input rail before any edit.
    pub fn select(&mut self, id: u8) -> Result<()> {
        let index = self
            .screens
            .iter()
            .position(|screen| screen.id() == id)
            .ok_or(Error::UnknownScreen(id))?;
        if index == self.active {
            return Ok(());
        }
        if self.output == State::On {
            self.set_output(false)?;
        }
        self.active = index;
        self.last_tick = None;
        let screen = &mut self.screens[index];
        screen.tick(&mut self.sensors, &mut self.display);
        info!("selected screen '{}'", screen.name());
        Ok(())
    }

    /// Current state of the output button.
    pub fn output(&self) -> State {
        self.output
    }

    /// Switch the output of the active screen on or off.
    pub fn set_output(&mut self, enable: impl Into<State>) -> Result<()> {
        let state = enable.into();
        let screen = self.screens.get_mut(self.active).ok_or(Error::NoScreen)?;
        screen.enable(state.into(), &mut self.power);
        self.output = state;
        Ok(())
    }

    /// A setpoint edited on the panel.
    pub fn edit(&mut self, quantity: Quantity, value: i32) -> Result<()> {
        let screen = self.screens.get_mut(self.active).ok_or(Error::NoScreen)?;
        screen.commit(quantity, value, &mut self.power, &mut self.display)
    }

    /// Run the active screen's tick if a tick period has passed since the last one.
    ///
    /// Returns whether a tick ran. The first poll after start or after
    /// [`Self::select`] always ticks.
    ///
    /// Elapsed time is measured with wrapping arithmetic, so a timer wrap
    /// between two polls is handled like any other interval.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = match self.last_tick {
            None => true,
            // `now` more than half the timer range after `last` reads as
            // being before it. Tick rather than stall.
            Some(last) => now
                .checked_duration_since(last)
                .is_none_or(|elapsed| elapsed >= self.tick_period),
        };
        if !due {
            return false;
        }
        let Some(screen) = self.screens.get_mut(self.active) else {
            return false;
        };
        screen.tick(&mut self.sensors, &mut self.display);
        self.last_tick = Some(now);
        true
    }

    /// Set a parameter of the active screen. See [`RegulationScreen::set_parameter`].
    pub fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        let screen = self.screens.get_mut(self.active).ok_or(Error::NoScreen)?;
        screen.set_parameter(name, value, &mut self.power, &mut self.display)
    }

    /// Read a parameter of the active screen.
    pub fn get_parameter(&self, name: &str) -> Result<ParamValue> {
        self.active_screen()
            .ok_or(Error::NoScreen)?
            .get_parameter(name)
    }

    /// Save the setpoints of every screen.
    ///
    /// A failing screen does not stop the others. The first error is returned.
    pub fn save(&self, past: &mut impl Past) -> core::result::Result<(), PastError> {
        let mut result = Ok(());
        for screen in self.screens.iter() {
            result = result.and(screen.save(past));
        }
        result
    }

    /// Restore the setpoints of every screen.
    pub fn restore(&mut self, past: &impl Past) {
        for screen in self.screens.iter_mut() {
            screen.restore(past);
        }
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn power_mut(&mut self) -> &mut P {
        &mut self.power
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{CC, CV, MAX_CURRENT_MA, TICK_PERIOD},
        mock::{MockDisplay, MockPower, MockSensors, PowerCall},
        past::MemoryPast,
    };

    type TestApp = App<MockPower, MockSensors, MockDisplay>;

    fn at(ms: u32) -> Instant {
        Instant::from_ticks(ms)
    }

    /// Both screens registered against a 12.00V input rail, CV active.
    fn app() -> TestApp {
        let mut sensors = MockSensors::new();
        sensors.set_input_mv(12_000);
        let mut app = App::new(MockPower::new(), sensors, MockDisplay::new(), TICK_PERIOD);
        app.register(&CV).unwrap();
        app.register(&CC).unwrap();
        app
    }

    #[test]
    fn register_initialises_screens() {
        let app = app();
        assert_eq!(app.screens().len(), 2);
        assert_eq!(app.active_screen().map(|s| s.id()), Some(CV.id));
        for screen in app.screens() {
            assert_eq!(screen.setpoint(Quantity::Voltage).max(), 1200);
        }
    }

    #[test]
    fn register_rejects_duplicates_and_overflow() {
        let mut app = app();
        assert_eq!(app.register(&CV), Err(Error::DuplicateScreen(CV.id)));

        static EXTRA: ScreenConfig = ScreenConfig { id: 9, ..CV };
        assert_eq!(app.register(&EXTRA), Err(Error::RegistryFull));
    }

    #[test]
    fn empty_app_reports_no_screen() {
        let mut app: TestApp = App::new(MockPower::new(), MockSensors::new(), MockDisplay::new(), TICK_PERIOD);
        assert_eq!(app.set_output(true), Err(Error::NoScreen));
        assert_eq!(app.edit(Quantity::Voltage, 0), Err(Error::NoScreen));
        assert_eq!(app.get_parameter("u"), Err(Error::NoScreen));
        assert!(!app.poll(at(0)));
        assert!(app.power().calls().is_empty());
    }

    #[test]
    fn poll_ticks_once_per_period() {
        let mut app = app();
        app.sensors_mut().set_output(5_000, 100);

        assert!(app.poll(at(0)));
        assert!(!app.poll(at(50)));
        assert!(!app.poll(at(99)));
        assert!(app.poll(at(100)));
        assert!(!app.poll(at(150)));
        assert!(app.poll(at(260)));

        // Unchanged sensors after the first tick: two readback redraws only.
        assert_eq!(app.display().draws().len(), 2);
    }

    #[test]
    fn poll_across_timer_wrap() {
        let mut app = app();
        assert!(app.poll(at(u32::MAX - 10)));
        // 16 ms after the last tick.
        assert!(!app.poll(at(5)));
        // 100 ms after the last tick.
        assert!(app.poll(at(89)));
    }

    #[test]
    fn poll_long_stall_ticks() {
        let mut app = app();
        assert!(app.poll(at(0)));
        assert!(app.poll(at(0x8000_0100)));
    }

    #[test]
    fn only_active_screen_ticks() {
        let mut app = app();
        app.sensors_mut().set_output(5_000, 100);
        app.poll(at(0));
        assert!(app.display().draws().iter().all(|(id, _)| *id == CV.id));
        let cc = app.screen(CC.id).unwrap();
        assert_eq!(cc.readback(Quantity::Voltage).value(), 0);
    }

    #[test]
    fn select_switches_output_off() {
        let mut app = app();
        app.edit(Quantity::Voltage, 500).unwrap();
        app.set_output(true).unwrap();
        assert_eq!(app.output(), State::On);
        app.power_mut().clear_calls();

        app.select(CC.id).unwrap();
        assert_eq!(app.output(), State::Off);
        assert_eq!(app.power().calls(), &[PowerCall::Enable(false)]);
        assert_eq!(app.active_screen().map(|s| s.id()), Some(CC.id));
        assert!(!app.screen(CV.id).unwrap().is_enabled());
    }

    #[test]
    fn select_unknown_screen() {
        let mut app = app();
        assert_eq!(app.select(42), Err(Error::UnknownScreen(42)));
        assert_eq!(app.active_screen().map(|s| s.id()), Some(CV.id));
    }

    #[test]
    fn select_refreshes_voltage_ceiling() {
        let mut app = app();
        // The rail sags while CC is inactive.
        app.sensors_mut().set_input_mv(9_000);
        app.select(CC.id).unwrap();

        let cc = app.screen(CC.id).unwrap();
        assert_eq!(cc.setpoint(Quantity::Voltage).max(), 900);
        assert_eq!(app.set_parameter("voltage", "10000"), Err(Error::RangeError));
        assert_eq!(app.set_parameter("voltage", "9000"), Ok(()));
    }

    #[test]
    fn select_resets_tick_schedule() {
        let mut app = app();
        assert!(app.poll(at(0)));
        app.select(CC.id).unwrap();
        assert!(app.poll(at(10)));
    }

    #[test]
    fn cc_output_uses_current_setpoint() {
        let mut app = app();
        app.select(CC.id).unwrap();
        app.set_parameter("voltage", "9000").unwrap();
        app.set_parameter("current", "300").unwrap();
        app.power_mut().clear_calls();

        app.set_output(true).unwrap();
        assert_eq!(
            app.power().calls(),
            &[
                PowerCall::Vout(9000),
                PowerCall::Ilimit(MAX_CURRENT_MA as u32),
                PowerCall::Iout(300),
                PowerCall::Enable(true),
            ]
        );
    }

    #[test]
    fn gateway_goes_to_active_screen() {
        let mut app = app();
        app.set_parameter("u", "5000").unwrap();
        assert_eq!(app.get_parameter("u").unwrap().as_str(), "5000");

        app.select(CC.id).unwrap();
        assert_eq!(app.get_parameter("u").unwrap().as_str(), "0");
        assert_eq!(app.set_parameter("watts", "1"), Err(Error::UnknownName));
    }

    #[test]
    fn save_and_restore_all_screens() {
        let mut app = app();
        app.edit(Quantity::Voltage, 500).unwrap();
        app.edit(Quantity::Current, 1000).unwrap();
        app.select(CC.id).unwrap();
        app.edit(Quantity::Voltage, 1100).unwrap();
        app.edit(Quantity::Current, 200).unwrap();

        let mut past: MemoryPast<8> = MemoryPast::new();
        app.save(&mut past).unwrap();
        assert_eq!(past.len(), 4);

        let mut restored = self::app();
        restored.restore(&past);
        let cv = restored.screen(CV.id).unwrap();
        assert_eq!(cv.setpoint(Quantity::Voltage).value(), 500);
        assert_eq!(cv.setpoint(Quantity::Current).value(), 1000);
        let cc = restored.screen(CC.id).unwrap();
        assert_eq!(cc.setpoint(Quantity::Voltage).value(), 1100);
        assert_eq!(cc.setpoint(Quantity::Current).value(), 200);
    }

    #[test]
    fn save_continues_after_failure() {
        let app = app();
        // Room for one screen only.
        let mut past: MemoryPast<2> = MemoryPast::new();
        let result = app.save(&mut past);
        assert!(matches!(result, Err(PastError::Full(_))));
        assert_eq!(past.len(), 2);
    }
}
