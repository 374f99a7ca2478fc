//! Observer registries for `setpoint_reached` and `mode_changed` events.
//!
//! The original firmware backs these with a singly-linked list allocated on
//! registration (`malloc`, fatal on OOM). Since registration only ever
//! happens once at init, the spec's own design notes call for a fixed-size
//! array instead: no heap, no allocation-failure path, and (per the open
//! question in the spec about a dangling-tail bug in the C list-append
//! logic) no pointer chasing to get wrong in the first place.

use crate::model::Mode;

const MAX_CALLBACKS: usize = 4;

type SetpointReachedFn = fn(u16);
type ModeChangedFn = fn(Mode);

pub struct CallbackRegistry {
    setpoint_reached: [Option<SetpointReachedFn>; MAX_CALLBACKS],
    mode_changed: [Option<ModeChangedFn>; MAX_CALLBACKS],
}

/// Returned by a registration call when every slot is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryFull;

impl CallbackRegistry {
    pub const fn new() -> Self {
        Self {
            setpoint_reached: [None; MAX_CALLBACKS],
            mode_changed: [None; MAX_CALLBACKS],
        }
    }

    pub fn add_setpoint_reached(&mut self, f: SetpointReachedFn) -> Result<(), RegistryFull> {
        for slot in self.setpoint_reached.iter_mut() {
            if slot.is_none() {
                *slot = Some(f);
                return Ok(());
            }
        }
        Err(RegistryFull)
    }

    pub fn add_mode_changed(&mut self, f: ModeChangedFn) -> Result<(), RegistryFull> {
        for slot in self.mode_changed.iter_mut() {
            if slot.is_none() {
                *slot = Some(f);
                return Ok(());
            }
        }
        Err(RegistryFull)
    }

    /// Fired once the tip enters the ±3° band around the setpoint.
    pub fn fire_setpoint_reached(&self, temperature: u16) {
        for slot in self.setpoint_reached.iter().flatten() {
            slot(temperature);
        }
    }

    /// Fired on every effective mode change. Guarded the same way as
    /// `fire_setpoint_reached` — the spec's open question ("an unchecked
    /// function value is invoked" for this list in the original source) is
    /// resolved as "guard both", which is also the only representable state
    /// in a `[Option<fn(...)>; N]` array.
    pub fn fire_mode_changed(&self, mode: Mode) {
        for slot in self.mode_changed.iter().flatten() {
            slot(mode);
        }
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    static HITS: AtomicU32 = AtomicU32::new(0);
    static LAST_TEMP: AtomicU32 = AtomicU32::new(0);

    fn record_temp(t: u16) {
        HITS.fetch_add(1, Ordering::SeqCst);
        LAST_TEMP.store(t as u32, Ordering::SeqCst);
    }

    #[test]
    fn fires_in_registration_order_and_all_slots() {
        HITS.store(0, Ordering::SeqCst);
        let mut reg = CallbackRegistry::new();
        reg.add_setpoint_reached(record_temp).unwrap();
        reg.add_setpoint_reached(record_temp).unwrap();
        reg.fire_setpoint_reached(320);
        assert_eq!(HITS.load(Ordering::SeqCst), 2);
        assert_eq!(LAST_TEMP.load(Ordering::SeqCst), 320);
    }

    #[test]
    fn registry_full_is_reported() {
        let mut reg = CallbackRegistry::new();
        for _ in 0..MAX_CALLBACKS {
            reg.add_setpoint_reached(record_temp).unwrap();
        }
        assert_eq!(reg.add_setpoint_reached(record_temp), Err(RegistryFull));
    }

    #[test]
    fn empty_registry_fires_nothing() {
        let reg = CallbackRegistry::new();
        reg.fire_mode_changed(Mode::Run); // must not panic
    }
}
