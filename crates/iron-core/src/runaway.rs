//! Thermal-runaway supervisor (spec §4.4).
//!
//! Lower tiers get generous windows because they can be a transient
//! overshoot (e.g. after a large setpoint drop); higher tiers are
//! near-catastrophic and must trip fast. The absolute cap defends against a
//! broken thermocouple shorted to the heater, independent of setpoint.

use crate::millis::Millis;
use crate::model::{DebugMode, RunawayLevel, RunawayStatus, TempUnit};

const CELSIUS_STEP: u16 = 25;
const CELSIUS_ABSOLUTE_LIMIT: u16 = 500;
const FAHRENHEIT_STEP: u16 = 45;
const FAHRENHEIT_ABSOLUTE_LIMIT: u16 = 950;

fn time_limit_ms(tier: RunawayLevel) -> Option<u32> {
    match tier {
        RunawayLevel::Ok => None,
        RunawayLevel::L25 => Some(20_000),
        RunawayLevel::L50 => Some(10_000),
        RunawayLevel::L75 => Some(3_000),
        RunawayLevel::L100 => Some(1_000),
        RunawayLevel::L500 => Some(1_000),
    }
}

/// Scans from the highest tier down to `Ok` and returns the first one
/// satisfied by `tip_t - setpoint`, then overrides to `L500` if the tip is
/// past the unit's absolute cap.
fn highest_tier(tip_t: u16, setpoint: u16, unit: TempUnit) -> RunawayLevel {
    let (step, absolute_limit) = match unit {
        TempUnit::Celsius => (CELSIUS_STEP, CELSIUS_ABSOLUTE_LIMIT),
        TempUnit::Fahrenheit => (FAHRENHEIT_STEP, FAHRENHEIT_ABSOLUTE_LIMIT),
    };

    let over = tip_t.saturating_sub(setpoint);
    let mut tier = RunawayLevel::Ok;
    for candidate in [
        RunawayLevel::L100,
        RunawayLevel::L75,
        RunawayLevel::L50,
        RunawayLevel::L25,
    ] {
        let tier_steps = match candidate {
            RunawayLevel::L100 => 4,
            RunawayLevel::L75 => 3,
            RunawayLevel::L50 => 2,
            RunawayLevel::L25 => 1,
            _ => unreachable!(),
        };
        if over > step * tier_steps {
            tier = candidate;
            break;
        }
    }

    if tip_t > absolute_limit {
        tier = RunawayLevel::L500;
    }
    tier
}

/// Outcome of one [`supervise`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunawayOutcome {
    /// No tier exceeded, or supervision not entered this tick.
    Ok,
    /// A tier is being timed but hasn't exceeded its window yet.
    Watching(RunawayLevel),
    /// The tier's time limit elapsed: this is fatal.
    Tripped(crate::error::FatalError),
}

/// Entry condition from spec §4.4: `pwm_out > 0 && runaway_status == Ok &&
/// debug_mode == Off && tip_t > setpoint`. When false, the timer and
/// `prev_runaway_level` are reset by the caller.
pub fn entry_condition(
    pwm_out: u16,
    runaway_status: RunawayStatus,
    debug_mode: DebugMode,
    tip_t: u16,
    setpoint: u16,
) -> bool {
    pwm_out > 0 && runaway_status == RunawayStatus::Ok && debug_mode == DebugMode::Off && tip_t > setpoint
}

/// Runs one supervision step. Caller is expected to have already checked
/// [`entry_condition`]; `prev_runaway_level` and `runaway_timer` are updated
/// in place.
pub fn supervise(
    tip_t: u16,
    setpoint: u16,
    unit: TempUnit,
    now: Millis,
    prev_runaway_level: &mut RunawayLevel,
    runaway_timer: &mut Millis,
) -> (RunawayLevel, RunawayOutcome) {
    let tier = highest_tier(tip_t, setpoint, unit);

    if tier == RunawayLevel::Ok {
        *runaway_timer = now;
        *prev_runaway_level = RunawayLevel::Ok;
        return (tier, RunawayOutcome::Ok);
    }

    if *prev_runaway_level == RunawayLevel::Ok {
        *prev_runaway_level = tier;
        *runaway_timer = now;
        return (tier, RunawayOutcome::Watching(tier));
    }

    let Some(limit) = time_limit_ms(tier) else {
        return (tier, RunawayOutcome::Ok);
    };

    if now.since(*runaway_timer) > limit {
        let err = match tier {
            RunawayLevel::L25 => crate::error::FatalError::Runaway25,
            RunawayLevel::L50 => crate::error::FatalError::Runaway50,
            RunawayLevel::L75 => crate::error::FatalError::Runaway75,
            RunawayLevel::L100 => crate::error::FatalError::Runaway100,
            RunawayLevel::L500 => crate::error::FatalError::Runaway500,
            RunawayLevel::Ok => unreachable!(),
        };
        (tier, RunawayOutcome::Tripped(err))
    } else {
        (tier, RunawayOutcome::Watching(tier))
    }
}

/// Resets tracking when the entry condition is false (PWM off, debug mode,
/// or already triggered).
pub fn reset(now: Millis, prev_runaway_level: &mut RunawayLevel, runaway_timer: &mut Millis) {
    *runaway_timer = now;
    *prev_runaway_level = RunawayLevel::Ok;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_runaway_l75_trips_after_time_limit() {
        let mut prev = RunawayLevel::Ok;
        let mut timer = Millis(0);
        // First detection at t=0: 380 - 300 = 80 > 75 => L75, starts timer.
        let (_, outcome) = supervise(380, 300, TempUnit::Celsius, Millis(0), &mut prev, &mut timer);
        assert_eq!(outcome, RunawayOutcome::Watching(RunawayLevel::L75));

        // Held at 3001ms => fatal.
        let (_, outcome) = supervise(380, 300, TempUnit::Celsius, Millis(3001), &mut prev, &mut timer);
        assert_eq!(
            outcome,
            RunawayOutcome::Tripped(crate::error::FatalError::Runaway75)
        );
    }

    #[test]
    fn scenario_runaway_l75_no_trip_before_limit_then_resets() {
        let mut prev = RunawayLevel::Ok;
        let mut timer = Millis(0);
        supervise(380, 300, TempUnit::Celsius, Millis(0), &mut prev, &mut timer);
        let (_, outcome) = supervise(380, 300, TempUnit::Celsius, Millis(2999), &mut prev, &mut timer);
        assert_eq!(outcome, RunawayOutcome::Watching(RunawayLevel::L75));

        // Drops back to 310 (10 over) -> tier Ok, timer resets.
        let (tier, outcome) = supervise(310, 300, TempUnit::Celsius, Millis(3500), &mut prev, &mut timer);
        assert_eq!(tier, RunawayLevel::Ok);
        assert_eq!(outcome, RunawayOutcome::Ok);
        assert_eq!(prev, RunawayLevel::Ok);
        assert_eq!(timer, Millis(3500));
    }

    #[test]
    fn absolute_cap_overrides_tier_scan() {
        let mut prev = RunawayLevel::Ok;
        let mut timer = Millis(0);
        let (tier, _) = supervise(501, 300, TempUnit::Celsius, Millis(0), &mut prev, &mut timer);
        assert_eq!(tier, RunawayLevel::L500);
    }

    #[test]
    fn fahrenheit_uses_45_degree_steps_and_950_cap() {
        let mut prev = RunawayLevel::Ok;
        let mut timer = Millis(0);
        // 46F over setpoint => L25 in F mode (step 45).
        let (tier, _) = supervise(746, 700, TempUnit::Fahrenheit, Millis(0), &mut prev, &mut timer);
        assert_eq!(tier, RunawayLevel::L25);

        let mut prev2 = RunawayLevel::Ok;
        let mut timer2 = Millis(0);
        let (tier2, _) = supervise(951, 700, TempUnit::Fahrenheit, Millis(0), &mut prev2, &mut timer2);
        assert_eq!(tier2, RunawayLevel::L500);
    }

    #[test]
    fn entry_condition_requires_pwm_on_and_debug_off() {
        assert!(!entry_condition(0, RunawayStatus::Ok, DebugMode::Off, 400, 300));
        assert!(!entry_condition(
            100,
            RunawayStatus::Ok,
            DebugMode::On,
            400,
            300
        ));
        assert!(!entry_condition(
            100,
            RunawayStatus::Triggered,
            DebugMode::Off,
            400,
            300
        ));
        assert!(entry_condition(100, RunawayStatus::Ok, DebugMode::Off, 400, 300));
    }
}
