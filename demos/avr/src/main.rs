//! Emits one synthetic sine sample over the serial port per timer interrupt.

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use core::cell::{Cell, RefCell};

use avr_device::interrupt::Mutex;
use avr_timer_interrupt::TimerInterrupt1;
use panic_halt as _;

const SAMPLE_RATE_HZ: f32 = 2.0;

type Serial = arduino_hal::hal::usart::Usart0<arduino_hal::DefaultClock>;

static SERIAL: Mutex<RefCell<Option<Serial>>> = Mutex::new(RefCell::new(None));
static SAMPLE_INDEX: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

#[avr_device::interrupt(atmega328p)]
fn TIMER1_COMPA() {
    avr_device::interrupt::free(|cs| {
        let index = SAMPLE_INDEX.borrow(cs);
        let i = index.get();
        index.set(i.wrapping_add(1));

        // sine amplitude in thousandths, ufmt has no float formatting
        let sample = (libm::sinf(i as f32 * 50.0 / 360.0) * 1000.0) as i16;
        if let Some(serial) = SERIAL.borrow(cs).borrow_mut().as_mut() {
            let _ = ufmt::uwriteln!(serial, "{}\r", sample);
        }
    });
}

#[arduino_hal::entry]
fn main() -> ! {
    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);
    let serial = arduino_hal::default_serial!(dp, pins, 9600);

    avr_device::interrupt::free(|cs| {
        SERIAL.borrow(cs).replace(Some(serial));
    });

    const CPU_FREQ: u32 = 16_000_000; //16MHz
    let mut timer = TimerInterrupt1::<{ CPU_FREQ }>::new(dp.TC1);
    // the compare-match interrupt is live once this returns
    timer.configure_frequency(SAMPLE_RATE_HZ);

    loop {}
}
