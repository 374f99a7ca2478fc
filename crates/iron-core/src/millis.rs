//! Monotonic millisecond timestamp.
//!
//! The core never reads a wall clock. Every operation that needs "now" takes
//! it as an explicit [`Millis`] parameter, which is what makes the timing
//! properties in the spec (debounce, sleep timeout, runaway windows)
//! deterministic under test.

/// Milliseconds since boot, matching the original firmware's 32-bit tick
/// counter. Arithmetic uses wrapping subtraction so a rollover after ~49.7
/// days doesn't panic or misbehave on an overflow check build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Millis(pub u32);

impl Millis {
    pub const ZERO: Self = Self(0);

    /// `self - earlier`, using wrapping arithmetic so a rollover of the
    /// underlying tick counter still yields the correct elapsed time.
    pub fn since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    pub fn add_ms(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }
}

impl From<u32> for Millis {
    fn from(v: u32) -> Self {
        Millis(v)
    }
}
