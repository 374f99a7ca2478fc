//! Independent watchdog supervision. Thermal-runaway detection itself lives
//! in `iron_core::runaway` now; this module only guards against the
//! foreground loop hanging outright (a stuck `tick`, a deadlocked mutex).
//!
//! Trimmed down from the teacher's `safety.rs`, which additionally tracked
//! per-heater rate-of-change and sensor-range faults — that responsibility
//! is `iron_core::RunawaySupervisor`'s job here, so carrying a second,
//! independent thermal-fault path would just be two sources of truth for
//! the same condition.

use embassy_stm32::wdg::IndependentWatchdog;

pub struct Watchdog<'a> {
    inner: IndependentWatchdog<'a>,
}

impl<'a> Watchdog<'a> {
    pub fn new(mut inner: IndependentWatchdog<'a>) -> Self {
        inner.unleash();
        Self { inner }
    }

    #[inline]
    pub fn feed(&mut self) {
        self.inner.feed();
    }
}
