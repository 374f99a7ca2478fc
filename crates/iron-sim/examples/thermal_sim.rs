//! Runs a heat-up scenario and prints a trace, the iron-sim analog of the
//! teacher's `thermal::examples::thermal_sim` PID-tuning harness.

use iron_core::{Mode, Profile, SystemSettings};
use iron_sim::{ScenarioRunner, ThermalPlant};

fn main() {
    tracing_subscriber::fmt::init();

    let profile = Profile {
        user_setpoint: 350,
        sleep_timeout_min: 0,
        ..Default::default()
    };
    let settings = SystemSettings {
        current_profile: iron_core::ProfileId::T12,
        init_mode: Mode::Run,
        ..Default::default()
    };

    let mut sim = ScenarioRunner::new(profile, settings, ThermalPlant::new(22.0));

    println!("time_ms, temp_c, setpoint, mode, power_percent");
    for _ in 0..2400 {
        sim.step(500);
        let e = sim.trace().last().unwrap();
        println!(
            "{}, {:.1}, {}, {}, {}",
            e.time_ms, e.temperature_c, e.setpoint, e.mode, e.power_percent
        );
    }

    let _ = std::fs::create_dir_all("golden_traces");
    sim.dump_trace(std::path::Path::new("golden_traces/heat_up.json"))
        .expect("failed to write trace");
}
