//! Binds `iron-core`'s collaborator traits to the [`crate::plant::ThermalPlant`]
//! and a handful of host-side fakes, playing the same role `ports_impl` plays
//! in the firmware crate but against a simulated plant instead of real
//! peripherals.

use crate::plant::ThermalPlant;
use iron_core::ports::{
    AvgMode, Buzzer, ChecksumSource, ColdJunction, FatalSink, PidCompute, PwmTimer, SaveMode,
    SettingsPersist, SupplyVoltage, TipSensor, UnitConvert,
};
use iron_core::{FatalError, Profile, SystemSettings, TempUnit};
use tracing::{error, info, warn};

/// Simple PI controller over the deci-degree ADC scale `SimDeps` uses,
/// standing in for the teacher's `heater.rs::PidController` on a host where
/// fixed-point isn't required.
struct HostPid {
    kp: f32,
    ki: f32,
    integral: f32,
    dt_s: f32,
}

impl HostPid {
    fn new(kp: f32, ki: f32, dt_s: f32) -> Self {
        Self {
            kp,
            ki,
            integral: 0.0,
            dt_s,
        }
    }

    /// Caller guarantees `setpoint_adc != 0` (the core skips this call
    /// entirely when the setpoint is invalid, see `tick.rs`).
    fn compute(&mut self, setpoint_adc: u16, measured_adc: u16) -> f32 {
        let error = setpoint_adc as f32 - measured_adc as f32;
        self.integral += error * self.dt_s;
        self.integral = self.integral.clamp(-2000.0, 2000.0);
        let output = self.kp * error + self.ki * self.integral;
        output.clamp(0.0, 1.0)
    }
}

/// Every collaborator `ControlCore::tick` needs, bound to a [`ThermalPlant`]
/// instead of hardware. `pwm_limit` is tracked so `duty` can be derived for
/// the plant the same way a real PWM timer would report it.
pub struct SimDeps {
    pub plant: ThermalPlant,
    pid: HostPid,
    pwm_limit: u16,
    pub compare: u16,
    pub supply_v_x10: u32,
    pub cold_junction_x10: i16,
    pub saves: u32,
    pub fatal: Option<FatalError>,
}

impl SimDeps {
    pub fn new(plant: ThermalPlant) -> Self {
        Self {
            plant,
            pid: HostPid::new(0.02, 0.002, 0.2),
            pwm_limit: 0,
            compare: 0,
            supply_v_x10: 120,
            cold_junction_x10: 250,
            saves: 0,
            fatal: None,
        }
    }

    /// Duty fraction the plant should apply this tick, derived from the
    /// compare register `ControlTick` just loaded.
    pub fn duty(&self) -> f32 {
        if self.pwm_limit == 0 {
            0.0
        } else {
            self.compare as f32 / self.pwm_limit as f32
        }
    }
}

/// Deci-degree fixed scale for the simulated ADC, matching the firmware's
/// `ports_impl::EmbassyDeps::human_to_adc` affine placeholder.
const ADC_SCALE: f32 = 10.0;

impl TipSensor for SimDeps {
    fn read_compensated(&mut self, _update: bool, _avg: AvgMode) -> u16 {
        self.plant.temperature_c.max(0.0) as u16
    }

    fn read_avg_adc(&mut self) -> u16 {
        (self.plant.temperature_c.max(0.0) * ADC_SCALE) as u16
    }

    fn read_raw_avg(&mut self) -> u16 {
        (self.plant.temperature_c.max(0.0) * ADC_SCALE) as u16
    }
}

impl ColdJunction for SimDeps {
    fn read_x10(&mut self, _unit: TempUnit) -> i16 {
        self.cold_junction_x10
    }
}

impl SupplyVoltage for SimDeps {
    fn read_v_x10(&mut self) -> u32 {
        self.supply_v_x10
    }
}

impl PidCompute for SimDeps {
    fn compute(&mut self, setpoint_adc: u16, measured_adc: u16) -> f32 {
        self.pid.compute(setpoint_adc, measured_adc)
    }
}

impl UnitConvert for SimDeps {
    fn human_to_adc(&self, temperature: u16, _unit: TempUnit) -> u16 {
        temperature.saturating_mul(ADC_SCALE as u16)
    }

    fn convert(&self, temperature: u16, from: TempUnit, to: TempUnit) -> u16 {
        match (from, to) {
            (TempUnit::Celsius, TempUnit::Fahrenheit) => temperature.saturating_mul(9) / 5 + 32,
            (TempUnit::Fahrenheit, TempUnit::Celsius) => {
                (temperature.saturating_sub(32)).saturating_mul(5) / 9
            }
            _ => temperature,
        }
    }
}

impl ChecksumSource for SimDeps {
    fn checksum_settings(&self, settings: &SystemSettings) -> u32 {
        fold_checksum(&[
            settings.current_profile as u32,
            settings.save_settings_delay_s,
            settings.temp_unit as u32,
            settings.no_iron_delay_ms,
            settings.wake_on_button as u32,
            settings.init_mode as u32,
            settings.setup_mode as u32,
        ])
    }

    fn checksum_profile(&self, profile: &Profile) -> u32 {
        fold_checksum(&[
            profile.user_setpoint as u32,
            profile.pwm_period as u32,
            profile.pwm_delay as u32,
            profile.pid_tick_period_ms,
            profile.sleep_timeout_min as u32,
            profile.no_iron_value as u32,
            profile.impedance_x10,
            profile.power_limit_w,
            profile.temp_unit as u32,
        ])
    }
}

fn fold_checksum(words: &[u32]) -> u32 {
    words.iter().fold(0x811c_9dc5u32, |acc, w| (acc ^ w).wrapping_mul(0x0100_0193))
}

impl SettingsPersist for SimDeps {
    fn save(&mut self, mode: SaveMode) {
        self.saves += 1;
        info!(mode = ?mode, "settings save");
    }
}

impl Buzzer for SimDeps {
    fn short_beep(&mut self) {
        info!("short beep");
    }

    fn long_beep(&mut self) {
        info!("long beep");
    }

    fn alarm_start(&mut self) {
        warn!("alarm start");
    }

    fn alarm_stop(&mut self) {
        info!("alarm stop");
    }
}

impl PwmTimer for SimDeps {
    fn set_autoreload(&mut self, _pwm_period: u16, _pwm_delay: u16) {}

    fn set_compare(&mut self, duty: u16) {
        self.compare = duty;
    }

    fn start(&mut self, _complementary: bool) {}
}

impl FatalSink for SimDeps {
    fn fatal(&mut self, err: FatalError) {
        self.compare = 0;
        self.fatal = Some(err);
        error!(code = err.code(), "FATAL");
    }
}

/// `ControlCore::iron_init` programs `pwm_limit` via `PwmTimer::set_autoreload`
/// internally; the scenario runner mirrors that computation once at boot so
/// [`SimDeps::duty`] has a denominator before the first tick.
pub fn note_pwm_limit(deps: &mut SimDeps, pwm_limit: u16) {
    deps.pwm_limit = pwm_limit;
}
