//! Pin mapping for the iron-control reference board.
//! A starting point — adjust against the actual handle/station schematic.

use embassy_stm32::gpio::{AnyPin, Pin};
use embassy_stm32::peripherals::{PB1, PB4, PB5, PA0, PA8, PC13};

pub struct BoardPins {
    pub led: AnyPin,
    pub tip_sense: AnyPin,
    pub buzzer: AnyPin,
    pub wake_button: AnyPin,
    pub encoder_a: AnyPin,
    pub encoder_b: AnyPin,
}

impl BoardPins {
    /// Takes only the six pins it maps, by value, so a caller can still use
    /// the rest of `embassy_stm32::Peripherals` (timers, ADC) afterward
    /// instead of having the whole struct moved in here.
    pub fn new(led: PB1, tip_sense: PA0, buzzer: PA8, wake_button: PC13, encoder_a: PB4, encoder_b: PB5) -> Self {
        Self {
            led: led.degrade(),
            tip_sense: tip_sense.degrade(),
            buzzer: buzzer.degrade(),
            wake_button: wake_button.degrade(),
            encoder_a: encoder_a.degrade(),
            encoder_b: encoder_b.degrade(),
        }
    }
}
