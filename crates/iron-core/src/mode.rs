//! Mode state machine (spec §4.2): `run`/`sleep`, debounced external
//! transitions, and setpoint selection.

use crate::millis::Millis;
use crate::model::{IronState, Mode};
use crate::ports::Buzzer;

/// Debounce window for a stand-switch-initiated mode change (invariant I5).
pub const MODE_DEBOUNCE_MS: u32 = 500;

impl IronState {
    /// Applies `mode` immediately. Called by `ControlCore` both for direct
    /// API calls (`set_current_mode`) and for debounced/forced transitions
    /// from `ControlTick`.
    pub(crate) fn apply_mode(
        &mut self,
        mode: Mode,
        force: bool,
        now: Millis,
        user_setpoint: u16,
        buzzer: &mut impl Buzzer,
        callbacks: &crate::callbacks::CallbackRegistry,
    ) {
        self.current_mode_timer = now;

        if self.current_mode != mode || force {
            self.current_mode = mode;
            self.cal_reached_flag = false;
            buzzer.short_beep();
            self.current_setpoint = match mode {
                Mode::Run => user_setpoint,
                Mode::Sleep => 0,
            };
            callbacks.fire_mode_changed(mode);
        }
    }

    /// Records a debounced mode-change request from an external source
    /// (e.g. a cradle switch). The actual transition is applied by
    /// `ControlTick` once the request has been stable for
    /// [`MODE_DEBOUNCE_MS`].
    pub(crate) fn request_mode_from_stand(&mut self, mode: Mode, now: Millis) {
        self.change_mode = mode;
        self.last_mode_change = now;
        self.update_mode = true;
    }
}

/// Standalone helper used by `ControlCore::iron_wake` — kept free of the
/// `IronState` impl because it needs `SystemSettings.wake_on_button`, which
/// `IronState` doesn't own.
pub(crate) fn wake_allowed(source: crate::model::WakeSource, wake_on_button: bool) -> bool {
    match source {
        crate::model::WakeSource::WakeButton => wake_on_button,
        crate::model::WakeSource::Encoder => true,
    }
}
