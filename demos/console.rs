use std::time::Instant as StdInstant;

use inquire::{CustomType, Select};
use psu_regulation::{
    app::{App, Instant},
    config::{CC, CV, TICK_PERIOD},
    hw::{AdcSample, Calibration, Display, Item, PowerControl, Sensors},
    past::MemoryPast,
    types::{Quantity, State},
};

// Simulated bench setup - adjust to taste
const INPUT_RAIL_MV: u16 = 24_000;
const LOAD_OHMS: u32 = 10;

/// Register file of the simulated power stage.
#[derive(Default)]
struct SimPower {
    vout_mv: u32,
    iout_ma: u32,
    ilimit_ma: u32,
    enabled: bool,
}

impl PowerControl for SimPower {
    fn set_vout_mv(&mut self, voltage_mv: u32) {
        println!("  power: vout = {voltage_mv} mV");
        self.vout_mv = voltage_mv;
    }

    fn set_iout_ma(&mut self, current_ma: u32) {
        println!("  power: iout = {current_ma} mA");
        self.iout_ma = current_ma;
    }

    fn set_ilimit_ma(&mut self, current_ma: u32) {
        println!("  power: ilimit = {current_ma} mA");
        self.ilimit_ma = current_ma;
    }

    fn enable_output(&mut self, enable: bool) {
        println!("  power: output {}", if enable { "on" } else { "off" });
        self.enabled = enable;
    }
}

impl SimPower {
    /// Output of the stage into a resistive load, in (mV, mA).
    ///
    /// The output voltage and both current registers cap the load current.
    fn output(&self) -> (u32, u32) {
        if !self.enabled {
            return (0, 0);
        }
        let current = (self.vout_mv / LOAD_OHMS)
            .min(self.iout_ma)
            .min(self.ilimit_ma);
        (current * LOAD_OHMS, current)
    }
}

/// ADC that reads back whatever the simulated stage produces.
struct SimSensors {
    sample: AdcSample,
    calibration: Calibration,
}

impl SimSensors {
    fn new() -> Self {
        Self {
            sample: AdcSample {
                v_in_raw: INPUT_RAIL_MV,
                ..AdcSample::default()
            },
            calibration: Calibration::UNITY,
        }
    }

    fn follow(&mut self, (voltage_mv, current_ma): (u32, u32)) {
        self.sample.v_out_raw = u16::try_from(voltage_mv).unwrap_or(u16::MAX);
        self.sample.i_out_raw = u16::try_from(current_ma).unwrap_or(u16::MAX);
    }
}

impl Sensors for SimSensors {
    fn sample(&mut self) -> AdcSample {
        self.sample
    }

    fn calibration(&self) -> &Calibration {
        &self.calibration
    }
}

struct ConsoleDisplay;

impl Display for ConsoleDisplay {
    fn draw(&mut self, screen: u8, item: Item) {
        println!("  display: screen {screen} redraw {item:?}");
    }
}

type Bench = App<SimPower, SimSensors, ConsoleDisplay>;

const ACTIONS: &[&str] = &[
    "Show",
    "Toggle output",
    "Edit setpoint",
    "Set parameter",
    "Select screen",
    "Save",
    "Restore",
    "Quit",
];

fn show(app: &Bench) {
    let Some(screen) = app.active_screen() else {
        return;
    };
    println!("Screen '{}' output {:?}", screen.name(), app.output());
    for quantity in [Quantity::Voltage, Quantity::Current] {
        let setpoint = screen.setpoint(quantity);
        let value = app
            .get_parameter(quantity.name())
            .map(|v| v.to_string())
            .unwrap_or_default();
        println!(
            "  {:<8} set {:>6} m{} (raw {} in {}..={}) read {}",
            quantity.name(),
            value,
            quantity.unit().symbol(),
            setpoint.value(),
            setpoint.min(),
            setpoint.max(),
            screen.readback(quantity).value(),
        );
    }
}

fn pick_quantity() -> Option<Quantity> {
    Select::new("Quantity:", vec!["voltage", "current"])
        .prompt()
        .ok()
        .map(|name| match name {
            "voltage" => Quantity::Voltage,
            _ => Quantity::Current,
        })
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let mut app: Bench = App::new(SimPower::default(), SimSensors::new(), ConsoleDisplay, TICK_PERIOD);
    app.register(&CV).expect("Failed to register CV screen");
    app.register(&CC).expect("Failed to register CC screen");

    let mut past: MemoryPast<8> = MemoryPast::new();
    let start = StdInstant::now();

    loop {
        let now = Instant::from_ticks(start.elapsed().as_millis() as u32);
        let output = app.power().output();
        app.sensors_mut().follow(output);
        app.poll(now);

        let Ok(action) = Select::new("Action:", ACTIONS.to_vec()).prompt() else {
            break;
        };

        let result = match action {
            "Show" => {
                show(&app);
                Ok(())
            }
            "Toggle output" => {
                let next = app.output() == State::Off;
                app.set_output(next)
            }
            "Edit setpoint" => {
                let Some(quantity) = pick_quantity() else {
                    continue;
                };
                let Ok(value) = CustomType::<i32>::new("Raw value:").prompt() else {
                    continue;
                };
                app.edit(quantity, value)
            }
            "Set parameter" => {
                let Ok(name) = inquire::Text::new("Name:").prompt() else {
                    continue;
                };
                let Ok(value) = inquire::Text::new("Value (milli-units):").prompt() else {
                    continue;
                };
                app.set_parameter(&name, &value)
            }
            "Select screen" => {
                let Ok(name) = Select::new("Screen:", vec![CV.name, CC.name]).prompt() else {
                    continue;
                };
                let id = if name == CV.name { CV.id } else { CC.id };
                app.select(id)
            }
            "Save" => {
                if let Err(err) = app.save(&mut past) {
                    println!("Save failed: {err}");
                }
                Ok(())
            }
            "Restore" => {
                app.restore(&past);
                Ok(())
            }
            _ => break,
        };

        if let Err(err) = result {
            println!("Error: {err}");
        }
    }
}
