//! # Embassy Main
//!
//! Entry point for the firmware when built with the Embassy executor (the
//! default runtime). Initializes the board, spawns the ADC, iron-control,
//! and buzzer tasks, and lets the executor take over.

use crate::watchdog::Watchdog;
use crate::{adc, iron_task, shared};
use boards::stm32f407::pins::BoardPins;
use embassy_executor::Spawner;
use embassy_stm32::adc::Adc;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::timer::Channel;
use embassy_stm32::time::khz;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_stm32::Config;
use embassy_time::{Duration, Timer};

/// Independent watchdog timeout. Must clear `TICK_PERIOD_MS` (50ms, see
/// `iron_task`) by a wide margin so a single slow peripheral access doesn't
/// trip a reset.
const WATCHDOG_TIMEOUT_US: u32 = 2_000_000;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("Initializing iron control firmware...");

    let config = Config::default();
    let p = embassy_stm32::init(config);
    let board_pins = BoardPins::new(p.PB1, p.PA0, p.PA8, p.PC13, p.PB4, p.PB5);

    let pwm_pin = PwmPin::new_ch1(p.PC6, embassy_stm32::gpio::OutputType::PushPull);
    let pwm = SimplePwm::new(
        p.TIM3,
        Some(pwm_pin),
        None,
        None,
        None,
        khz(10),
        Default::default(),
    );

    let adc = Adc::new(p.ADC1);
    let watchdog = Watchdog::new(IndependentWatchdog::new(p.IWDG, WATCHDOG_TIMEOUT_US));

    spawner.spawn(adc::adc_task(adc, board_pins.tip_sense)).unwrap();
    spawner
        .spawn(iron_task::iron_task(pwm, Channel::Ch1, watchdog))
        .unwrap();
    spawner.spawn(buzzer_task(board_pins.buzzer)).unwrap();
    spawner.spawn(led_task(board_pins.led)).unwrap();

    defmt::info!("Initialization complete. All tasks are running.");
}

/// Drains `shared::BEEP_REQUEST` one-shot beeps and honors
/// `shared::ALARM_ACTIVE` as a repeating tone, both set by
/// `ports_impl::EmbassyDeps`'s `Buzzer` impl.
#[embassy_executor::task]
async fn buzzer_task(buzzer_pin: embassy_stm32::gpio::AnyPin) {
    use embassy_stm32::gpio::{Level, Output, Speed};
    let mut buzzer = Output::new(buzzer_pin, Level::Low, Speed::Low);

    loop {
        let request = shared::BEEP_REQUEST.lock(|cell| {
            let req = *cell.borrow();
            *cell.borrow_mut() = shared::BeepRequest::None;
            req
        });

        let beep_ms = match request {
            shared::BeepRequest::Short => Some(60),
            shared::BeepRequest::Long => Some(400),
            shared::BeepRequest::None => None,
        };

        if let Some(ms) = beep_ms {
            buzzer.set_high();
            Timer::after(Duration::from_millis(ms)).await;
            buzzer.set_low();
        } else if shared::ALARM_ACTIVE.load(core::sync::atomic::Ordering::Relaxed) {
            buzzer.set_high();
            Timer::after(Duration::from_millis(100)).await;
            buzzer.set_low();
            Timer::after(Duration::from_millis(100)).await;
        } else {
            Timer::after(Duration::from_millis(20)).await;
        }
    }
}

/// Heartbeat LED, unrelated to control logic, kept to confirm the executor
/// is alive during bring-up.
#[embassy_executor::task]
async fn led_task(led_pin: embassy_stm32::gpio::AnyPin) {
    use embassy_stm32::gpio::{Level, Output, Speed};
    let mut led = Output::new(led_pin, Level::High, Speed::Low);

    loop {
        led.toggle();
        Timer::after(Duration::from_millis(500)).await;
    }
}
