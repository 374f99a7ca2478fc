//! Fatal error taxonomy.
//!
//! These are the only errors the core ever raises through [`crate::ports::FatalSink`].
//! Everything else is a recoverable state (`fail_state`, `presence`) or a
//! rejected-configuration `bool`, per the spec's error-handling design.

/// An unrecoverable condition. Once raised, [`crate::model::RunawayStatus::Triggered`]
/// (for the runaway variants) is absorbing — see invariant I4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FatalError {
    Runaway25,
    Runaway50,
    Runaway75,
    Runaway100,
    Runaway500,
    RunawayUnknown,
    /// `pwm_out > pwm_limit`: invariant I1 was about to be violated.
    PwmOverLimit,
}

impl FatalError {
    pub const fn code(self) -> &'static str {
        match self {
            FatalError::Runaway25 => "RUNAWAY25",
            FatalError::Runaway50 => "RUNAWAY50",
            FatalError::Runaway75 => "RUNAWAY75",
            FatalError::Runaway100 => "RUNAWAY100",
            FatalError::Runaway500 => "RUNAWAY500",
            FatalError::RunawayUnknown => "RUNAWAY_UNKNOWN",
            FatalError::PwmOverLimit => "PWM_OVER_LIMIT",
        }
    }
}

impl core::fmt::Display for FatalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FatalError {}
