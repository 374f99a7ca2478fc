#![cfg_attr(not(feature = "std"), no_std)]

//! # iron-core
//!
//! Control core for a soldering-iron controller: periodic control-loop
//! sequencing, a run/sleep mode state machine, power-limited PWM duty
//! computation, a thermal-runaway supervisor, and a tip-presence detector.
//!
//! Everything hardware-, persistence-, or UI-shaped is a trait in
//! [`ports`] — this crate owns none of it. `iron-firmware` implements those
//! traits against real peripherals; `iron-sim` and this crate's own test
//! suite implement them against a plant model or a hand-fed fixture.
//!
//! - **`no_std` support**: the default build target is bare metal.
//! - **Optional `serde` support**: for shaping what a host would persist.
//! - **Optional `defmt` support**: structured logging on target.

pub mod callbacks;
pub mod error;
pub mod millis;
pub mod mode;
pub mod model;
pub mod ports;
pub mod power;
pub mod presence;
pub mod runaway;
pub mod settings_watch;
mod tick;
pub mod timers;

pub use callbacks::{CallbackRegistry, RegistryFull};
pub use error::FatalError;
pub use millis::Millis;
pub use model::{
    DebugMode, FailState, IronState, Mode, Presence, Profile, ProfileId, RunawayLevel,
    RunawayStatus, SystemSettings, TempUnit, WakeSource,
};
pub use ports::{AvgMode, Buzzer, IronDeps, PwmTimer, SaveMode};

/// Rounds to the nearest multiple of 10, ties rounding up. Used only by
/// `set_system_temp_unit` when converting a setpoint across units, matching
/// `original_source/Core/Src/iron.c`'s `setSystemTempUnit` rounding.
fn round_to_10(value: u16) -> u16 {
    let rem = value % 10;
    if rem > 5 {
        value + (10 - rem)
    } else {
        value - rem
    }
}

/// Owns the live [`IronState`], the active [`Profile`] and [`SystemSettings`],
/// and the bookkeeping `ControlTick` needs across calls (debounce timers,
/// the settings-watcher's checksum history, registered callbacks).
///
/// `profile` and `settings` are public: an external UI task mutates them
/// directly (there is no setter for every field, matching the spec's
/// "read by the core, mutated by external UI" framing), and `tick` reads
/// whatever is current at the top of each pass.
pub struct ControlCore {
    pub state: IronState,
    pub profile: Profile,
    pub settings: SystemSettings,
    callbacks: CallbackRegistry,
    settings_watch: settings_watch::SettingsWatcherState,
    pid_last: Millis,
    persisted_sys_sum: u32,
    persisted_tip_sum: u32,
    last_set_temp_profile: ProfileId,
}

impl ControlCore {
    pub fn new(profile: Profile, settings: SystemSettings) -> Self {
        let state = IronState::new(settings.init_mode);
        Self {
            state,
            profile,
            settings,
            callbacks: CallbackRegistry::new(),
            settings_watch: settings_watch::SettingsWatcherState::default(),
            pid_last: Millis::ZERO,
            persisted_sys_sum: 0,
            persisted_tip_sum: 0,
            last_set_temp_profile: ProfileId::None,
        }
    }

    /// Programs the PWM/delay timer pair (spec §4.8) and applies the
    /// configured initial mode. Call once at boot, before the first `tick`.
    ///
    /// Takes a single unified `deps` (rather than separate `pwm`/`buzzer`
    /// parameters) so callers can pass the same collaborator value without
    /// running into two simultaneous mutable borrows of it.
    pub fn iron_init(&mut self, deps: &mut impl IronDeps, complementary: bool, now: Millis) {
        let (period, delay) = if self.settings.current_profile != ProfileId::None {
            (self.profile.pwm_period, self.profile.pwm_delay)
        } else {
            (timers::DEFAULT_PWM_PERIOD, timers::DEFAULT_PWM_DELAY)
        };
        deps.set_autoreload(period, delay);
        deps.start(complementary);
        self.state.pwm_limit = timers::pwm_limit(period, delay);

        let mode = self.settings.init_mode;
        let user_setpoint = self.profile.user_setpoint;
        self.state
            .apply_mode(mode, true, now, user_setpoint, deps, &self.callbacks);
    }

    /// Sets the active setpoint. A no-op if the value and the active
    /// profile are both unchanged, preserving `cal_reached_flag` across
    /// redundant UI writes (matches `original_source/Core/Src/iron.c`'s
    /// `setTemperature` guard).
    pub fn set_set_temperature(&mut self, temperature: u16) {
        if self.state.current_setpoint != temperature
            || self.last_set_temp_profile != self.settings.current_profile
        {
            self.profile.user_setpoint = temperature;
            self.state.current_setpoint = temperature;
            self.state.cal_reached_flag = false;
            self.last_set_temp_profile = self.settings.current_profile;
        }
    }

    pub fn get_set_temperature(&self) -> u16 {
        self.state.current_setpoint
    }

    pub fn get_current_mode(&self) -> Mode {
        self.state.current_mode
    }

    /// Signed percent in `[-99, 100]`; `-99` is the PWM-failure/fail-state
    /// sentinel (see `tick`'s early-return branch).
    pub fn get_current_power(&self) -> i8 {
        self.state.current_power_percent
    }

    pub fn set_current_mode(&mut self, mode: Mode, force: bool, now: Millis, buzzer: &mut impl Buzzer) {
        let user_setpoint = self.profile.user_setpoint;
        self.state
            .apply_mode(mode, force, now, user_setpoint, buzzer, &self.callbacks);
    }

    /// Records a debounced mode-change request from a cradle/stand switch;
    /// `tick` applies it once it has been stable for `MODE_DEBOUNCE_MS`.
    pub fn set_mode_from_stand(&mut self, mode: Mode, now: Millis) {
        self.state.request_mode_from_stand(mode, now);
    }

    /// Wakes the iron into `Run` mode, gated by `wake_on_button` for a
    /// button-sourced wake (an encoder turn always wakes).
    pub fn iron_wake(&mut self, source: WakeSource, now: Millis, buzzer: &mut impl Buzzer) {
        if !mode::wake_allowed(source, self.settings.wake_on_button) {
            return;
        }
        self.state.new_activity = true;
        self.state.last_activity = now;
        let user_setpoint = self.profile.user_setpoint;
        self.state
            .apply_mode(Mode::Run, false, now, user_setpoint, buzzer, &self.callbacks);
    }

    pub fn set_debug_mode(&mut self, mode: DebugMode) {
        self.state.debug_mode = mode;
    }

    /// `setpoint_adc` is an ADC-unit setpoint, fed to the PID block
    /// directly (no `human_to_adc` conversion), matching
    /// `original_source/Core/Src/iron.c`'s debug path.
    pub fn set_debug_temp(&mut self, setpoint_adc: u16) {
        self.state.debug_setpoint = setpoint_adc;
    }

    /// Rejects the new delay if it wouldn't stay below the current period.
    /// Returns `false` when accepted, `true` when rejected (spec §7 tier 4
    /// polarity — reads backwards for a Rust `bool`, kept to match the spec).
    pub fn set_pwm_delay(&mut self, delay: u16) -> bool {
        if delay < self.profile.pwm_period {
            self.profile.pwm_delay = delay;
            self.state.update_pwm = true;
            false
        } else {
            true
        }
    }

    /// Rejects the new period if it wouldn't stay above the current delay.
    /// Same `false` = accepted / `true` = rejected polarity as
    /// [`Self::set_pwm_delay`].
    pub fn set_pwm_period(&mut self, period: u16) -> bool {
        if period > self.profile.pwm_delay {
            self.profile.pwm_period = period;
            self.state.update_pwm = true;
            false
        } else {
            true
        }
    }

    pub fn set_no_iron_value(&mut self, value: u16) {
        self.profile.no_iron_value = value;
    }

    /// Switches both the system-wide and the active profile's temperature
    /// unit, converting and rounding the active setpoint, then reapplies
    /// the current mode (forced) so the converted setpoint takes effect
    /// immediately — mirrors `setSystemTempUnit`'s `setCurrentMode(..., true)`
    /// tail call. Per spec §9 design notes, this does not itself clear
    /// `cal_reached_flag`; the forced `apply_mode` call does that for us.
    pub fn set_system_temp_unit(&mut self, unit: TempUnit, now: Millis, deps: &mut impl IronDeps) {
        if self.settings.temp_unit != unit {
            self.settings.temp_unit = unit;
        }
        if self.profile.temp_unit != unit {
            let from = self.profile.temp_unit;
            self.profile.temp_unit = unit;
            let converted = deps.convert(self.profile.user_setpoint, from, unit);
            self.profile.user_setpoint = round_to_10(converted);
        }
        let mode = self.state.current_mode;
        let user_setpoint = self.profile.user_setpoint;
        self.state
            .apply_mode(mode, true, now, user_setpoint, deps, &self.callbacks);
    }

    pub fn get_iron_presence(&self) -> bool {
        self.state.presence == Presence::Present
    }

    /// Setting `On` immediately zeroes PWM output and loads the hardware
    /// compare register, independent of the next `tick`.
    pub fn set_fail_state(&mut self, fail: FailState, pwm: &mut impl PwmTimer) {
        self.state.fail_state = fail;
        if fail == FailState::On {
            self.state.pwm_out = 0;
            pwm.set_compare(0);
        }
    }

    pub fn get_fail_state(&self) -> bool {
        self.state.fail_state == FailState::On
    }

    /// Registers a callback fired once the tip enters the ±3° band around
    /// the setpoint. `Err` when the fixed-size registry (spec §4.7) is
    /// full — callers should treat this as fatal, same as the original
    /// firmware's malloc failure on registration.
    pub fn add_setpoint_reached_callback(&mut self, f: fn(u16)) -> Result<(), RegistryFull> {
        self.callbacks.add_setpoint_reached(f)
    }

    /// Registers a callback fired on every effective mode change. Same
    /// full-registry semantics as [`Self::add_setpoint_reached_callback`].
    pub fn add_mode_changed_callback(&mut self, f: fn(Mode)) -> Result<(), RegistryFull> {
        self.callbacks.add_mode_changed(f)
    }
}
