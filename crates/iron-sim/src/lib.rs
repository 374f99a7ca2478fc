//! # iron-sim
//!
//! A deterministic, host-side thermal plant model that drives
//! `iron_core::ControlCore` tick-by-tick, for scenario testing and PID
//! tuning without physical hardware. Synchronous by design: the control
//! core has no asynchronous surface, so unlike the teacher's socket-based
//! `sim` crate this one is a plain function-call loop.

pub mod deps;
pub mod plant;
pub mod scenario;

pub use deps::SimDeps;
pub use plant::ThermalPlant;
pub use scenario::{ScenarioRunner, TraceEntry};
