//! Drives a `ControlCore` against a [`SimDeps`]/[`ThermalPlant`] pair
//! tick-by-tick and records a trace, the synchronous counterpart to the
//! teacher's `SimHost` trace-recording harness.

use crate::deps::{self, SimDeps};
use crate::plant::ThermalPlant;
use iron_core::{ControlCore, Millis, Profile, SystemSettings};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::instrument;

#[derive(Serialize, Debug, Clone)]
pub struct TraceEntry {
    pub time_ms: u32,
    pub temperature_c: f32,
    pub setpoint: u16,
    pub mode: &'static str,
    pub power_percent: i8,
    pub presence: bool,
}

/// Owns the `ControlCore` under test and its simulated collaborators, and
/// accumulates a [`TraceEntry`] per tick for scenario assertions or a golden
/// trace dump.
pub struct ScenarioRunner {
    pub core: ControlCore,
    pub deps: SimDeps,
    pub now: Millis,
    trace: Vec<TraceEntry>,
}

impl ScenarioRunner {
    pub fn new(profile: Profile, settings: SystemSettings, plant: ThermalPlant) -> Self {
        let mut core = ControlCore::new(profile, settings);
        let mut sim_deps = SimDeps::new(plant);
        core.iron_init(&mut sim_deps, true, Millis::ZERO);
        deps::note_pwm_limit(&mut sim_deps, core.state.pwm_limit);

        Self {
            core,
            deps: sim_deps,
            now: Millis::ZERO,
            trace: Vec::new(),
        }
    }

    /// Advances the control core by one tick and the plant by `dt_ms`,
    /// recording a trace entry afterward.
    #[instrument(skip(self))]
    pub fn step(&mut self, dt_ms: u32) {
        self.now = self.now.add_ms(dt_ms);
        self.core.tick(self.now, &mut self.deps);
        deps::note_pwm_limit(&mut self.deps, self.core.state.pwm_limit);

        let duty = self.deps.duty();
        self.deps.plant.step(duty, dt_ms);

        self.trace.push(TraceEntry {
            time_ms: self.now.0,
            temperature_c: self.deps.plant.temperature_c,
            setpoint: self.core.get_set_temperature(),
            mode: match self.core.get_current_mode() {
                iron_core::Mode::Run => "run",
                iron_core::Mode::Sleep => "sleep",
            },
            power_percent: self.core.get_current_power(),
            presence: self.core.get_iron_presence(),
        });
    }

    /// Convenience for running many ticks of the same duration.
    pub fn run_for(&mut self, dt_ms: u32, steps: u32) {
        for _ in 0..steps {
            self.step(dt_ms);
        }
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Dumps the recorded trace to a file as pretty JSON, for golden-trace
    /// comparison in CI the way `sim::harness::SimHost::dump_trace` did.
    pub fn dump_trace(&self, path: &Path) -> io::Result<()> {
        tracing::info!(path = %path.display(), "dumping trace file");
        let mut file = File::create(path)?;
        let json = serde_json::to_string_pretty(&self.trace)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        file.write_all(json.as_bytes())
    }
}
