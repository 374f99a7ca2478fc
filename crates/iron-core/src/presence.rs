//! Iron-presence detector (spec §4.5): hysteretic, time-gated detection of
//! tip attachment. Disconnect is immediate; reconnect is debounced by
//! `no_iron_delay` to avoid chatter when re-seating the tip.

use crate::millis::Millis;
use crate::model::Presence;

/// One evaluation of the presence state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    None,
    /// The tip just disconnected: caller must force sleep, zero PWM, and
    /// start the alarm.
    JustDisconnected,
    /// The tip reconnected after the debounce window: caller must stop the
    /// alarm and force run mode.
    JustReconnected,
}

/// `tip_raw_avg > no_iron_value`, or an open cold-junction NTC
/// (`cold_junction_x10 < -600`), means the tip (or handle) is detached.
fn disconnected(tip_raw_avg: u16, no_iron_value: u16, cold_junction_x10: i16) -> bool {
    tip_raw_avg > no_iron_value || cold_junction_x10 < -600
}

/// Evaluates one tick of the presence state machine. `last_no_present` is
/// read and, on a fresh disconnect, updated in place.
pub fn evaluate(
    presence: Presence,
    tip_raw_avg: u16,
    no_iron_value: u16,
    cold_junction_x10: i16,
    now: Millis,
    last_no_present: &mut Millis,
    no_iron_delay_ms: u32,
) -> (Presence, PresenceTransition) {
    let gone = disconnected(tip_raw_avg, no_iron_value, cold_junction_x10);

    match presence {
        Presence::Present if gone => {
            *last_no_present = now;
            (Presence::Absent, PresenceTransition::JustDisconnected)
        }
        Presence::Absent if !gone && now.since(*last_no_present) > no_iron_delay_ms => {
            (Presence::Present, PresenceTransition::JustReconnected)
        }
        other => (other, PresenceTransition::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_presence_flap() {
        let mut last_no_present = Millis(0);
        // Raw exceeds threshold for one tick: disconnects immediately.
        let (presence, transition) =
            evaluate(Presence::Present, 5000, 4000, 250, Millis(100), &mut last_no_present, 400);
        assert_eq!(presence, Presence::Absent);
        assert_eq!(transition, PresenceTransition::JustDisconnected);
        assert_eq!(last_no_present, Millis(100));

        // Raw drops back below threshold, but debounce hasn't elapsed yet.
        let (presence, transition) =
            evaluate(Presence::Absent, 100, 4000, 250, Millis(300), &mut last_no_present, 400);
        assert_eq!(presence, Presence::Absent);
        assert_eq!(transition, PresenceTransition::None);

        // After the delay, reconnects.
        let (presence, transition) =
            evaluate(Presence::Absent, 100, 4000, 250, Millis(600), &mut last_no_present, 400);
        assert_eq!(presence, Presence::Present);
        assert_eq!(transition, PresenceTransition::JustReconnected);
    }

    #[test]
    fn open_cold_junction_ntc_counts_as_disconnected() {
        let mut last_no_present = Millis(0);
        let (presence, transition) =
            evaluate(Presence::Present, 100, 4000, -700, Millis(0), &mut last_no_present, 400);
        assert_eq!(presence, Presence::Absent);
        assert_eq!(transition, PresenceTransition::JustDisconnected);
    }

    #[test]
    fn stays_present_when_nothing_indicates_disconnect() {
        let mut last_no_present = Millis(0);
        let (presence, transition) =
            evaluate(Presence::Present, 100, 4000, 250, Millis(50), &mut last_no_present, 400);
        assert_eq!(presence, Presence::Present);
        assert_eq!(transition, PresenceTransition::None);
    }
}
