//! Periodic compare-match interrupts from the AVR 16bit timer/counters.
//!
//! Given a target frequency, pick a prescaler and compare value that
//! approximate it, then arm the timer in CTC mode so the compare-match
//! interrupt fires once per period. The whole register write happens with
//! global interrupts suppressed.

#![cfg_attr(not(test), no_std)]

mod timer;

#[cfg(feature = "device-selected")]
pub use avr_device;
pub use embedded_hal;
pub use fugit;
pub use nb;
pub use timer::*;
pub use void;

pub mod prelude {
    pub use embedded_hal::timer::CountDown as _;
}

#[cfg(feature = "atmega1280")]
pub use avr_device::atmega1280 as pac;
#[cfg(feature = "atmega1284p")]
pub use avr_device::atmega1284p as pac;
#[cfg(feature = "atmega168")]
pub use avr_device::atmega168 as pac;
#[cfg(feature = "atmega2560")]
pub use avr_device::atmega2560 as pac;
#[cfg(feature = "atmega328p")]
pub use avr_device::atmega328p as pac;
#[cfg(feature = "atmega328pb")]
pub use avr_device::atmega328pb as pac;
#[cfg(feature = "atmega32u4")]
pub use avr_device::atmega32u4 as pac;
#[cfg(feature = "atmega48p")]
pub use avr_device::atmega48p as pac;
