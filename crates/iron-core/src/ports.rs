//! Collaborator contracts.
//!
//! Everything the spec calls out of scope (PID math, ADC driver, unit
//! conversion, settings persistence, buzzer, fatal-error handler) is a narrow
//! trait here. `iron-firmware` implements these against real `embassy-stm32`
//! peripherals; `iron-sim` and the test suite implement them against a plant
//! model or a hand-fed fixture. The core itself never depends on a hardware
//! crate.

use crate::error::FatalError;
use crate::model::{Profile, SystemSettings, TempUnit};

/// Whether a tip-temperature read should use the instantaneous sample or
/// the ADC driver's running average. The original firmware calls this
/// `read_Avg` vs. an instantaneous read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvgMode {
    Instantaneous,
    Average,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    KeepProfiles,
    Full,
}

/// Compensated tip temperature, in the active unit. `update` requests a
/// fresh sample be latched before the read; without it, callers get the
/// ADC driver's last published value.
pub trait TipSensor {
    fn read_compensated(&mut self, update: bool, avg: AvgMode) -> u16;
    /// Filtered ADC average in raw ADC units (`TIP.last_avg` in the
    /// original firmware) — the measured value fed to the PID block.
    fn read_avg_adc(&mut self) -> u16;
    /// Raw (unfiltered) averaged ADC count (`TIP.last_RawAvg`), used by
    /// [`crate::presence`] to detect an open tip.
    fn read_raw_avg(&mut self) -> u16;
}

pub trait ColdJunction {
    /// Cold-junction temperature, degrees x10, in the given unit.
    fn read_x10(&mut self, unit: TempUnit) -> i16;
}

pub trait SupplyVoltage {
    /// Supply voltage, volts x10.
    fn read_v_x10(&mut self) -> u32;
}

/// The PID math block. Pure function of setpoint and measured value, both
/// in ADC units; output is clamped to `[0, 1]` by the caller (this core),
/// not by the collaborator. The core also never calls this with
/// `setpoint_adc == 0` (an invalid setpoint from [`UnitConvert::human_to_adc`]
/// skips the call entirely, see `tick.rs`) — implementations don't need to
/// guard against it themselves.
pub trait PidCompute {
    fn compute(&mut self, setpoint_adc: u16, measured_adc: u16) -> f32;
}

pub trait UnitConvert {
    /// Converts a human-readable setpoint to ADC units; `0` if invalid.
    fn human_to_adc(&self, temperature: u16, unit: TempUnit) -> u16;
    /// Converts a temperature between units, used by `set_system_temp_unit`.
    fn convert(&self, temperature: u16, from: TempUnit, to: TempUnit) -> u16;
}

pub trait ChecksumSource {
    fn checksum_settings(&self, settings: &SystemSettings) -> u32;
    fn checksum_profile(&self, profile: &Profile) -> u32;
}

pub trait SettingsPersist {
    fn save(&mut self, mode: SaveMode);
}

pub trait Buzzer {
    fn short_beep(&mut self);
    fn long_beep(&mut self);
    fn alarm_start(&mut self);
    fn alarm_stop(&mut self);
}

/// Hardware PWM/delay timer primitives. `set_compare` loads the duty that
/// the ISR will apply at the next period boundary (see spec §5's ordering
/// guarantee); the core never touches a register directly.
pub trait PwmTimer {
    fn set_autoreload(&mut self, pwm_period: u16, pwm_delay: u16);
    fn set_compare(&mut self, duty: u16);
    /// `CHx` (true) vs `CHxN` complementary (false) output, selected once
    /// at init — see spec §4.8.
    fn start(&mut self, complementary: bool);
}

/// Sink for unrecoverable conditions. Real hardware never returns from this
/// (it halts control and shows the code); host test doubles just record the
/// code so assertions can run afterwards — see DESIGN.md for why the
/// signature doesn't use `-> !`.
pub trait FatalSink {
    fn fatal(&mut self, err: FatalError);
}

/// Umbrella over every collaborator the core needs for one `tick`. Anything
/// implementing all the individual ports gets this for free.
pub trait IronDeps:
    TipSensor
    + ColdJunction
    + SupplyVoltage
    + PidCompute
    + UnitConvert
    + ChecksumSource
    + SettingsPersist
    + Buzzer
    + PwmTimer
    + FatalSink
{
}

impl<T> IronDeps for T where
    T: TipSensor
        + ColdJunction
        + SupplyVoltage
        + PidCompute
        + UnitConvert
        + ChecksumSource
        + SettingsPersist
        + Buzzer
        + PwmTimer
        + FatalSink
{
}
