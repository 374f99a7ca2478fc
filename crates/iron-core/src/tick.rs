//! `ControlTick` (spec §4.1): the single entry point invoked from the
//! foreground loop every pass. Owns per-tick sequencing; every other module
//! in this crate is a pure function or small state machine that `tick`
//! drives in a fixed order.

use crate::error::FatalError;
use crate::millis::Millis;
use crate::mode::MODE_DEBOUNCE_MS;
use crate::model::{DebugMode, Mode, Presence, RunawayLevel, RunawayStatus};
use crate::ports::{AvgMode, IronDeps, SaveMode};
use crate::power;
use crate::presence::{self, PresenceTransition};
use crate::runaway::{self, RunawayOutcome};
use crate::timers;
use crate::ControlCore;

impl ControlCore {
    /// Runs one control-loop tick. `now` is the caller's monotonic clock
    /// reading; `deps` is every collaborator this tick might touch.
    ///
    /// Ordering mirrors `original_source/Core/Src/iron.c`'s `handleIron()`
    /// exactly: a reordering here would violate invariant I1 or I4 (see
    /// spec §3/§8), so don't move steps without re-checking those.
    pub fn tick(&mut self, now: Millis, deps: &mut impl IronDeps) {
        let tip_t = deps.read_compensated(true, AvgMode::Average);

        if self.settings.current_profile == crate::model::ProfileId::None
            && self.state.fail_state == crate::model::FailState::Off
        {
            self.state.fail_state = crate::model::FailState::On;
        }

        self.run_settings_watch(now, deps);
        self.run_presence(now, deps);

        if self.state.fail_state == crate::model::FailState::On
            || self.state.presence == Presence::Absent
        {
            self.state.current_power_percent = -99;
            self.state.pwm_out = 0;
            deps.set_compare(0);
            runaway::reset(now, &mut self.state.prev_runaway_level, &mut self.state.runaway_timer);
            self.state.runaway_level = RunawayLevel::Ok;
            return;
        }

        if self.state.update_mode && now.since(self.state.last_mode_change) >= MODE_DEBOUNCE_MS {
            self.state.update_mode = false;
            let mode = self.state.change_mode;
            let user_setpoint = self.profile.user_setpoint;
            self.state
                .apply_mode(mode, false, now, user_setpoint, deps, &self.callbacks);
        }

        if self.state.current_mode == Mode::Run
            && !self.state.calibrating
            && self.profile.sleep_timeout_min > 0
            && now.since(self.state.current_mode_timer)
                > (self.profile.sleep_timeout_min as u32) * 60_000
        {
            let user_setpoint = self.profile.user_setpoint;
            self.state
                .apply_mode(Mode::Sleep, true, now, user_setpoint, deps, &self.callbacks);
            deps.long_beep();
        }

        if now.since(self.pid_last) < self.profile.pid_tick_period_ms || now.0 < 1000 {
            return;
        }
        self.pid_last = now;

        if self.state.update_pwm {
            self.state.update_pwm = false;
            deps.set_autoreload(self.profile.pwm_period, self.profile.pwm_delay);
            self.state.pwm_limit = timers::pwm_limit(self.profile.pwm_period, self.profile.pwm_delay);
        }

        let measured = deps.read_avg_adc();
        let set = if self.state.debug_mode == DebugMode::On {
            deps.compute(self.state.debug_setpoint, measured)
        } else if self.state.current_setpoint > 99 {
            let setpoint_adc = deps.human_to_adc(self.state.current_setpoint, self.profile.temp_unit);
            if setpoint_adc != 0 {
                deps.compute(setpoint_adc, measured)
            } else {
                0.0
            }
        } else {
            0.0
        };
        let set = set.max(0.0);

        if set > 0.0 {
            let supply_v_x10 = deps.read_v_x10();
            let result = power::limit_power(
                set,
                supply_v_x10,
                self.profile.impedance_x10,
                self.profile.power_limit_w,
                self.profile.pwm_period,
                self.state.pwm_limit,
            );
            self.state.pwm_max = result.pwm_max;
            self.state.pwm_out = result.pwm_out;
            self.state.current_power_percent = result.current_power_percent;
        } else {
            self.state.pwm_out = 0;
            self.state.current_power_percent = 0;
        }

        if self.state.pwm_out > self.state.pwm_limit {
            self.state.pwm_out = 0;
            deps.set_compare(0);
            deps.fatal(FatalError::PwmOverLimit);
            return;
        }
        deps.set_compare(self.state.pwm_out);

        if !self.state.cal_reached_flag {
            let diff = tip_t.abs_diff(self.state.current_setpoint);
            if diff <= 3 {
                self.state.cal_reached_flag = true;
                self.callbacks.fire_setpoint_reached(tip_t);
            }
        }

        self.run_runaway(now, tip_t, deps);
    }

    fn run_settings_watch(&mut self, now: Millis, deps: &mut impl IronDeps) {
        if self.state.fail_state == crate::model::FailState::On
            || self.settings.setup_mode
            || self.state.calibrating
            || self.settings.save_settings_delay_s == 0
        {
            return;
        }

        let sys_sum = deps.checksum_settings(&self.settings);
        let tip_sum = deps.checksum_profile(&self.profile);
        let should_save = crate::settings_watch::watch(
            &mut self.settings_watch,
            now,
            sys_sum,
            tip_sum,
            self.persisted_sys_sum,
            self.persisted_tip_sum,
            self.settings.save_settings_delay_s,
        );
        if should_save {
            deps.save(SaveMode::Full);
            self.persisted_sys_sum = sys_sum;
            self.persisted_tip_sum = tip_sum;
        }
    }

    fn run_presence(&mut self, now: Millis, deps: &mut impl IronDeps) {
        let tip_raw_avg = deps.read_raw_avg();
        let cold_junction_x10 = deps.read_x10(self.settings.temp_unit);

        let (presence, transition) = presence::evaluate(
            self.state.presence,
            tip_raw_avg,
            self.profile.no_iron_value,
            cold_junction_x10,
            now,
            &mut self.state.last_no_present,
            self.settings.no_iron_delay_ms,
        );
        self.state.presence = presence;

        match transition {
            PresenceTransition::JustDisconnected => {
                #[cfg(feature = "defmt")]
                defmt::warn!("tip removed, forcing sleep");
                deps.alarm_start();
                let user_setpoint = self.profile.user_setpoint;
                self.state
                    .apply_mode(Mode::Sleep, true, now, user_setpoint, deps, &self.callbacks);
            }
            PresenceTransition::JustReconnected => {
                #[cfg(feature = "defmt")]
                defmt::info!("tip reconnected, resuming run mode");
                deps.alarm_stop();
                let user_setpoint = self.profile.user_setpoint;
                self.state
                    .apply_mode(Mode::Run, true, now, user_setpoint, deps, &self.callbacks);
            }
            PresenceTransition::None => {}
        }
    }

    fn run_runaway(&mut self, now: Millis, tip_t: u16, deps: &mut impl IronDeps) {
        let entered = runaway::entry_condition(
            self.state.pwm_out,
            self.state.runaway_status,
            self.state.debug_mode,
            tip_t,
            self.state.current_setpoint,
        );

        if !entered {
            runaway::reset(now, &mut self.state.prev_runaway_level, &mut self.state.runaway_timer);
            self.state.runaway_level = RunawayLevel::Ok;
            return;
        }

        let (tier, outcome) = runaway::supervise(
            tip_t,
            self.state.current_setpoint,
            self.profile.temp_unit,
            now,
            &mut self.state.prev_runaway_level,
            &mut self.state.runaway_timer,
        );
        if tier != self.state.runaway_level {
            #[cfg(feature = "defmt")]
            defmt::warn!("runaway tier changed: {} -> {}", self.state.runaway_level, tier);
        }
        self.state.runaway_level = tier;

        if let RunawayOutcome::Tripped(err) = outcome {
            self.state.runaway_status = RunawayStatus::Triggered;
            self.state.pwm_out = 0;
            deps.set_compare(0);
            deps.fatal(err);
        }
    }
}
