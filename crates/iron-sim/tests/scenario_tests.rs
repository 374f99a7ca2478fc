//! End-to-end scenarios driving `ControlCore` against the thermal plant
//! model, standing in for the teacher's socket-trace `run_sim` example now
//! that the harness is a synchronous function-call loop.

use iron_core::{Mode, Profile, SystemSettings};
use iron_sim::{ScenarioRunner, ThermalPlant};

fn warm_settings() -> SystemSettings {
    SystemSettings {
        current_profile: iron_core::ProfileId::T12,
        init_mode: Mode::Run,
        ..Default::default()
    }
}

#[test]
fn iron_heats_toward_setpoint_and_reaches_it() {
    let profile = Profile {
        user_setpoint: 300,
        pid_tick_period_ms: 100,
        sleep_timeout_min: 0,
        ..Default::default()
    };
    let mut sim = ScenarioRunner::new(profile, warm_settings(), ThermalPlant::new(25.0));

    // 20 minutes of simulated time in 100ms steps.
    sim.run_for(100, 12_000);

    let last = sim.trace().last().unwrap();
    assert!(
        (last.temperature_c - 300.0).abs() < 10.0,
        "expected to settle near 300C, got {}",
        last.temperature_c
    );
    assert!(sim.deps.fatal.is_none());
}

#[test]
fn removing_the_tip_forces_sleep_and_stops_heating() {
    let profile = Profile {
        user_setpoint: 300,
        no_iron_value: 4000,
        ..Default::default()
    };
    let mut sim = ScenarioRunner::new(profile, warm_settings(), ThermalPlant::new(25.0));

    sim.run_for(100, 100);
    assert_eq!(sim.core.get_current_mode(), Mode::Run);

    // Push the simulated tip temperature (and thus the ADC reading) above
    // `no_iron_value` by overheating the plant far past the setpoint.
    sim.deps.plant.temperature_c = 500.0;
    sim.step(100);

    assert_eq!(sim.core.get_current_mode(), Mode::Sleep);
    assert!(!sim.core.get_iron_presence());
}

#[test]
fn initial_settings_are_persisted_after_the_debounce_delay() {
    let profile = Profile {
        user_setpoint: 300,
        ..Default::default()
    };
    let settings = SystemSettings {
        save_settings_delay_s: 1,
        ..warm_settings()
    };
    let mut sim = ScenarioRunner::new(profile, settings, ThermalPlant::new(25.0));

    // The boot-time checksum differs from `ControlCore`'s zeroed persisted
    // sums, so the watcher should save once things settle.
    sim.run_for(500, 10);

    assert!(sim.deps.saves >= 1);
}
