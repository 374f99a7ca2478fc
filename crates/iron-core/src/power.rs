//! Power limiter (spec §4.3): converts the PID output to a PWM duty bounded
//! by the instantaneous electrical power budget.
//!
//! The arithmetic is plain fixed-point integer math, following
//! `original_source/Core/Src/iron.c`'s `handleIron()` power-limit block
//! exactly — the spec calls out that the integer rounding at each step must
//! be preserved to avoid off-by-one duty drift, so this is a direct,
//! unrounded port rather than a float computation.

use num_traits::Float;

/// Output of one [`limit_power`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerLimitResult {
    pub pwm_max: u16,
    pub pwm_out: u16,
    pub current_power_percent: i8,
}

/// `set` must already be clamped to `(0, 1]` by the caller.
///
/// Steps mirror spec §4.3 literally:
/// 1. `v2 = (V_x10 * V_x10) / 10` (`V^2 x10`), floored at 1 to avoid div-by-0.
/// 2. `max_power = v2 / impedance_x10` (`V^2/R`, worst-case watts).
/// 3. `pwm_max` is either `pwm_limit` (power budget not binding) or
///    `pwm_period * power_limit_w / max_power`, clamped to `pwm_limit`.
/// 4. `current_power_percent = round(set * 100)`.
/// 5. `pwm_out = set * pwm_max`, truncated to integer ticks.
pub fn limit_power(
    set: f32,
    supply_v_x10: u32,
    impedance_x10: u32,
    power_limit_w: u32,
    pwm_period: u16,
    pwm_limit: u16,
) -> PowerLimitResult {
    let mut v2 = (supply_v_x10 * supply_v_x10) / 10;
    if v2 == 0 {
        v2 = 1;
    }
    let max_power = v2 / impedance_x10.max(1);

    let pwm_max = if power_limit_w >= max_power {
        pwm_limit
    } else {
        let uncapped = (pwm_period as u32 * power_limit_w) / max_power.max(1);
        uncapped.min(pwm_limit as u32) as u16
    };

    let current_power_percent = (set * 100.0).round() as i8;
    let pwm_out = (set * pwm_max as f32) as u16;

    PowerLimitResult {
        pwm_max,
        pwm_out,
        current_power_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Spec §8 scenario 2, pinned exactly.
    #[test]
    fn scenario_power_throttle_math() {
        let result = limit_power(1.0, 200, 80, 25, 20000, 19999);
        // v2 = 200*200/10 = 4000; max_power = 4000/80 = 50
        // power_limit(25) < max_power(50) => pwm_max = 20000*25/50 = 10000
        assert_eq!(result.pwm_max, 10000);
    }

    #[test]
    fn power_budget_not_binding_uses_pwm_limit() {
        // max_power with 12V/8ohm: v2=120*120/10=1440, max_power=1440/80=18W
        // power_limit 60W >= 18W => no throttle beyond pwm_limit.
        let result = limit_power(1.0, 120, 80, 60, 19999, 19980);
        assert_eq!(result.pwm_max, 19980);
        assert_eq!(result.pwm_out, 19980);
    }

    #[test]
    fn zero_voltage_does_not_divide_by_zero() {
        let result = limit_power(1.0, 0, 80, 25, 20000, 19999);
        assert_eq!(result.pwm_max, 0);
    }

    #[test]
    fn current_power_percent_rounds_to_nearest() {
        let result = limit_power(0.504, 120, 80, 60, 19999, 19980);
        assert_eq!(result.current_power_percent, 50);
        let result = limit_power(0.506, 120, 80, 60, 19999, 19980);
        assert_eq!(result.current_power_percent, 51);
    }
}
