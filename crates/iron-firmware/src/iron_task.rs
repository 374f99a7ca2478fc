//! Foreground control-loop task: owns the `iron_core::ControlCore` instance
//! and calls `tick` on a fixed period, mirroring the teacher's
//! `heater_task`'s `Ticker`-driven loop shape.

use crate::ports_impl::EmbassyDeps;
use crate::watchdog::Watchdog;
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_stm32::timer::{Channel, Instance as TimerInstance};
use embassy_time::{Duration, Instant, Ticker};
use iron_core::{ControlCore, Millis, Profile, SystemSettings};

const TICK_PERIOD_MS: u64 = 50;

/// Runs `ControlCore::iron_init` once, then ticks it forever, feeding the
/// independent watchdog every pass so a hung tick (stuck peripheral,
/// deadlocked mutex) resets the board instead of leaving the heater in
/// whatever state it was last driven to.
#[embassy_executor::task]
pub async fn iron_task(
    pwm: SimplePwm<'static, embassy_stm32::peripherals::TIM3>,
    channel: Channel,
    mut watchdog: Watchdog<'static>,
) {
    defmt::info!("iron control task started");

    let mut core = ControlCore::new(Profile::default(), SystemSettings::default());
    let mut deps = EmbassyDeps {
        pid: crate::ports_impl::FixedPid::new(18.0, 0.6, 4.0),
        pwm,
        channel,
    };

    let boot = Instant::now();
    let now = Millis(boot.as_millis() as u32);
    core.iron_init(&mut deps, true, now);

    let mut ticker = Ticker::every(Duration::from_millis(TICK_PERIOD_MS));
    loop {
        let now = Millis(Instant::now().as_millis().wrapping_sub(boot.as_millis()) as u32);
        core.tick(now, &mut deps);
        watchdog.feed();
        ticker.next().await;
    }
}
