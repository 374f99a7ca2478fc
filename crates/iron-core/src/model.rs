//! Data model: [`IronState`], [`Profile`], [`SystemSettings`] and the small
//! enums that describe an iron's operating mode, presence, and runaway tier.

use crate::millis::Millis;

/// Operating mode. The design leaves room for `boost`/`standby` (see the
/// original firmware's commented-out match arms) but both collapse to
/// `Sleep` here, matching the spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    Run,
    Sleep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Presence {
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailState {
    Off,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugMode {
    Off,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunawayStatus {
    Ok,
    Triggered,
}

/// Over-setpoint tiers, ordered from least to most severe. `Ok` must stay
/// first: runaway scanning relies on the discriminant order to find "the
/// highest tier satisfied".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunawayLevel {
    Ok,
    L25,
    L50,
    L75,
    L100,
    L500,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TempUnit {
    Celsius,
    Fahrenheit,
}

/// Which tip-family profile is active. `None` is a valid (if degenerate)
/// value: it is what forces `fail_state` on in [`crate::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProfileId {
    None,
    T12,
    C245,
    C210,
}

/// Source of a wake request, mirroring the original `source_wakeButton` /
/// encoder distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeSource {
    WakeButton,
    Encoder,
}

/// Per-tip-family parameters, mutated by an external UI and read by the
/// core every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Profile {
    pub user_setpoint: u16,
    pub pwm_period: u16,
    pub pwm_delay: u16,
    pub pid_tick_period_ms: u32,
    pub sleep_timeout_min: u16,
    pub no_iron_value: u16,
    pub impedance_x10: u32,
    pub power_limit_w: u32,
    pub temp_unit: TempUnit,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            user_setpoint: 320,
            pwm_period: crate::timers::DEFAULT_PWM_PERIOD,
            pwm_delay: crate::timers::DEFAULT_PWM_DELAY,
            pid_tick_period_ms: 200,
            sleep_timeout_min: 10,
            no_iron_value: 4000,
            impedance_x10: 80,
            power_limit_w: 60,
            temp_unit: TempUnit::Celsius,
        }
    }
}

/// System-wide settings, orthogonal to the per-tip `Profile`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemSettings {
    pub current_profile: ProfileId,
    pub save_settings_delay_s: u32,
    pub temp_unit: TempUnit,
    pub no_iron_delay_ms: u32,
    pub wake_on_button: bool,
    pub init_mode: Mode,
    pub setup_mode: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            current_profile: ProfileId::T12,
            save_settings_delay_s: 3,
            temp_unit: TempUnit::Celsius,
            no_iron_delay_ms: 400,
            wake_on_button: true,
            init_mode: Mode::Sleep,
            setup_mode: false,
        }
    }
}

/// Live, process-wide state of the controller. Owned by [`crate::ControlCore`]
/// rather than a global `static mut`, per the spec's design notes — callers
/// hold a handle (or the whole `ControlCore`) and pass it through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IronState {
    pub current_mode: Mode,
    pub current_setpoint: u16,
    pub debug_mode: DebugMode,
    pub debug_setpoint: u16,
    /// Signed percent in `[-99, 100]`; `-99` is the PWM-failure sentinel.
    pub current_power_percent: i8,
    pub pwm_out: u16,
    pub pwm_max: u16,
    pub pwm_limit: u16,
    pub presence: Presence,
    pub fail_state: FailState,
    pub runaway_status: RunawayStatus,
    pub runaway_level: RunawayLevel,
    pub prev_runaway_level: RunawayLevel,

    pub last_mode_change: Millis,
    pub current_mode_timer: Millis,
    pub last_no_present: Millis,
    pub runaway_timer: Millis,
    pub last_activity: Millis,

    pub update_mode: bool,
    pub change_mode: Mode,
    pub update_pwm: bool,
    pub cal_reached_flag: bool,
    pub new_activity: bool,
    /// Transient calibration-in-progress flag. Calibration itself is out of
    /// scope (only the setpoint-reached hook is used by it); this exists
    /// purely so `ControlTick` can honor the "not calibrating" guard on the
    /// settings watcher and sleep-timeout checks, same as
    /// `original_source/Core/Src/iron.c`'s `Iron.calibrating`.
    pub calibrating: bool,
}

impl IronState {
    pub fn new(init_mode: Mode) -> Self {
        Self {
            current_mode: init_mode,
            current_setpoint: 0,
            debug_mode: DebugMode::Off,
            debug_setpoint: 0,
            current_power_percent: 0,
            pwm_out: 0,
            pwm_max: 0,
            pwm_limit: 0,
            presence: Presence::Present,
            fail_state: FailState::Off,
            runaway_status: RunawayStatus::Ok,
            runaway_level: RunawayLevel::Ok,
            prev_runaway_level: RunawayLevel::Ok,
            last_mode_change: Millis::ZERO,
            current_mode_timer: Millis::ZERO,
            last_no_present: Millis::ZERO,
            runaway_timer: Millis::ZERO,
            last_activity: Millis::ZERO,
            update_mode: false,
            change_mode: Mode::Sleep,
            update_pwm: false,
            cal_reached_flag: false,
            new_activity: false,
            calibrating: false,
        }
    }
}
