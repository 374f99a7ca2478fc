#![no_std]
#![no_main]

use defmt_rtt as _; // global logger
use panic_probe as _;

pub mod adc;
pub mod fixed_point;
pub mod iron_task;
pub mod ports_impl;
pub mod shared;
pub mod watchdog;

#[cfg(feature = "embassy-rt")]
mod embassy_main;
#[cfg(feature = "embassy-rt")]
use embassy_main as _;
