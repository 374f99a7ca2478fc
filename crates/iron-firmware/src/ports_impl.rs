//! Binds `iron-core`'s collaborator traits to real `embassy-stm32`
//! peripherals. This is the only place in the firmware that both depends on
//! `iron-core` and touches hardware registers directly.

use crate::fixed_point::Fixed16_16;
use crate::shared::{self, BeepRequest};
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_stm32::timer::{Channel, Instance as TimerInstance};
use iron_core::ports::{AvgMode, ChecksumSource, ColdJunction, FatalSink, PidCompute, PwmTimer, SaveMode, SettingsPersist, SupplyVoltage, TipSensor, UnitConvert};
use iron_core::{FatalError, Profile, SystemSettings, TempUnit};

/// 16.16 fixed-point PID, matching the teacher's `heater.rs::PidController`
/// internals but exposed through `iron-core::ports::PidCompute`'s
/// `f32`-in-`[0,1]` contract.
pub struct FixedPid {
    kp: Fixed16_16,
    ki: Fixed16_16,
    kd: Fixed16_16,
    integral: Fixed16_16,
    prev_error: Fixed16_16,
    integral_max: Fixed16_16,
}

impl FixedPid {
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        let ki_fixed = Fixed16_16::from_float(ki);
        let integral_max = if ki_fixed > Fixed16_16::ZERO {
            Fixed16_16::ONE / ki_fixed
        } else {
            Fixed16_16::ZERO
        };
        Self {
            kp: Fixed16_16::from_float(kp),
            ki: ki_fixed,
            kd: Fixed16_16::from_float(kd),
            integral: Fixed16_16::ZERO,
            prev_error: Fixed16_16::ZERO,
            integral_max,
        }
    }
}

impl PidCompute for FixedPid {
    /// Caller guarantees `setpoint_adc != 0` (the core skips this call
    /// entirely when the setpoint is invalid, see `tick.rs`).
    fn compute(&mut self, setpoint_adc: u16, measured_adc: u16) -> f32 {
        let error = Fixed16_16::from_float(setpoint_adc as f32 - measured_adc as f32);
        let dt = Fixed16_16::from_float(0.2); // matches Profile::default().pid_tick_period_ms

        let p_term = self.kp * error;

        self.integral = self.integral + (error * dt);
        if self.integral > self.integral_max {
            self.integral = self.integral_max;
        } else if self.integral < Fixed16_16::ZERO - self.integral_max {
            self.integral = Fixed16_16::ZERO - self.integral_max;
        }
        let i_term = self.ki * self.integral;

        let derivative = (error - self.prev_error) / dt;
        self.prev_error = error;
        let d_term = self.kd * derivative;

        let mut output = p_term + i_term + d_term;
        if output < Fixed16_16::ZERO {
            output = Fixed16_16::ZERO;
        } else if output > Fixed16_16::ONE {
            output = Fixed16_16::ONE;
        }
        output.to_float()
    }
}

/// Every collaborator `ControlCore::tick` needs, bound to real peripherals.
pub struct EmbassyDeps<'a, T: TimerInstance> {
    pub pid: FixedPid,
    pub pwm: SimplePwm<'a, T>,
    pub channel: Channel,
}

impl<'a, T: TimerInstance> TipSensor for EmbassyDeps<'a, T> {
    fn read_compensated(&mut self, _update: bool, _avg: AvgMode) -> u16 {
        shared::TIP_SAMPLE.lock(|cell| cell.borrow().compensated)
    }

    fn read_avg_adc(&mut self) -> u16 {
        shared::TIP_SAMPLE.lock(|cell| cell.borrow().avg_adc)
    }

    fn read_raw_avg(&mut self) -> u16 {
        shared::TIP_SAMPLE.lock(|cell| cell.borrow().raw_avg)
    }
}

impl<'a, T: TimerInstance> ColdJunction for EmbassyDeps<'a, T> {
    fn read_x10(&mut self, _unit: TempUnit) -> i16 {
        shared::COLD_JUNCTION_X10.lock(|cell| *cell.borrow())
    }
}

impl<'a, T: TimerInstance> SupplyVoltage for EmbassyDeps<'a, T> {
    fn read_v_x10(&mut self) -> u32 {
        shared::SUPPLY_V_X10.lock(|cell| *cell.borrow())
    }
}

impl<'a, T: TimerInstance> PidCompute for EmbassyDeps<'a, T> {
    fn compute(&mut self, setpoint_adc: u16, measured_adc: u16) -> f32 {
        self.pid.compute(setpoint_adc, measured_adc)
    }
}

/// Board-specific ADC-to-degrees and degrees-to-ADC mapping. This is a
/// placeholder affine fit; real calibration data belongs in a per-tip
/// lookup table loaded from flash, out of scope here.
impl<'a, T: TimerInstance> UnitConvert for EmbassyDeps<'a, T> {
    fn human_to_adc(&self, temperature: u16, _unit: TempUnit) -> u16 {
        temperature.saturating_mul(10)
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

impl<'a, T: TimerInstance> ChecksumSource for EmbassyDeps<'a, T> {
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

impl<'a, T: TimerInstance> SettingsPersist for EmbassyDeps<'a, T> {
    fn save(&mut self, mode: SaveMode) {
        // TODO: write through embassy-stm32's flash driver once the on-flash
        // settings layout is finalized. For now this just marks the save
        // point in the log so scenario replay against a trace is possible.
        defmt::info!("settings save requested, mode={}", mode as u8);
    }
}

impl<'a, T: TimerInstance> iron_core::ports::Buzzer for EmbassyDeps<'a, T> {
    fn short_beep(&mut self) {
        shared::BEEP_REQUEST.lock(|cell| *cell.borrow_mut() = BeepRequest::Short);
    }

    fn long_beep(&mut self) {
        shared::BEEP_REQUEST.lock(|cell| *cell.borrow_mut() = BeepRequest::Long);
    }

    fn alarm_start(&mut self) {
        shared::ALARM_ACTIVE.store(true, core::sync::atomic::Ordering::Relaxed);
    }

    fn alarm_stop(&mut self) {
        shared::ALARM_ACTIVE.store(false, core::sync::atomic::Ordering::Relaxed);
    }
}

impl<'a, T: TimerInstance> PwmTimer for EmbassyDeps<'a, T> {
    fn set_autoreload(&mut self, pwm_period: u16, _pwm_delay: u16) {
        self.pwm.set_duty(self.channel, 0);
        let _ = pwm_period; // period is fixed by the timer's clock config at construction
    }

    fn set_compare(&mut self, duty: u16) {
        self.pwm.set_duty(self.channel, duty);
    }

    fn start(&mut self, _complementary: bool) {
        self.pwm.enable(self.channel);
    }
}

impl<'a, T: TimerInstance> FatalSink for EmbassyDeps<'a, T> {
    fn fatal(&mut self, err: FatalError) {
        self.pwm.set_duty(self.channel, 0);
        defmt::error!("FATAL: {}", err.code());
        shared::ALARM_ACTIVE.store(true, core::sync::atomic::Ordering::Relaxed);
        loop {
            cortex_m::asm::nop();
        }
    }
}
