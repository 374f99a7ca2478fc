//! Cross-context shared state between the ADC task (which owns the actual
//! peripheral and ISR) and the foreground iron-control task.
//!
//! `iron-core`'s ports are synchronous fns, so the cell is a
//! `blocking_mutex` (critical-section guarded, no `.await`) rather than
//! `embassy_sync::mutex::Mutex` the way the teacher's `HeaterSharedState`
//! uses for its async heater task.

use core::cell::RefCell;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Tip reading, as published by the ADC task once per sample window.
#[derive(Debug, Clone, Copy, Default)]
pub struct TipSample {
    /// Compensated temperature in the active unit (`TipSensor::read_compensated`).
    pub compensated: u16,
    /// Filtered ADC average, fed to the PID block (`TipSensor::read_avg_adc`).
    pub avg_adc: u16,
    /// Raw (unfiltered) ADC average, used by the presence detector.
    pub raw_avg: u16,
}

pub static TIP_SAMPLE: Mutex<CriticalSectionRawMutex, RefCell<TipSample>> =
    Mutex::new(RefCell::new(TipSample {
        compensated: 0,
        avg_adc: 0,
        raw_avg: 0,
    }));

/// Cold-junction reading, degrees x10 in the active unit.
pub static COLD_JUNCTION_X10: Mutex<CriticalSectionRawMutex, RefCell<i16>> =
    Mutex::new(RefCell::new(250));

/// Supply-rail reading, volts x10.
pub static SUPPLY_V_X10: Mutex<CriticalSectionRawMutex, RefCell<u32>> = Mutex::new(RefCell::new(120));

/// One-shot beep request from the foreground task, drained by
/// `buzzer_task`. `Buzzer::short_beep`/`long_beep` only ever write this;
/// timing lives in the task that owns the pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeepRequest {
    None,
    Short,
    Long,
}

pub static BEEP_REQUEST: Mutex<CriticalSectionRawMutex, RefCell<BeepRequest>> =
    Mutex::new(RefCell::new(BeepRequest::None));

/// Continuous alarm state, set by `Buzzer::alarm_start`/`alarm_stop` and
/// polled by `buzzer_task` every cycle.
pub static ALARM_ACTIVE: core::sync::atomic::AtomicBool = core::sync::atomic::AtomicBool::new(false);
