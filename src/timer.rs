//! Prescaler selection and CTC-mode arming for the 16bit timer/counters.

/// Clock-select divisors available to the 16bit timer/counters, ascending.
pub const PRESCALERS: [u16; 5] = [1, 8, 64, 256, 1024];

const COUNTER_SPACE: u32 = 1 << 16;

/// TC origin clock input is cpu-freq, divided by one of [`PRESCALERS`].
/// Picks the smallest prescaler whose compare value for `frequency_hz`
/// fits the 16bit counter, together with that compare value.
///
/// The compare value is `clock_hz / (frequency_hz * prescale) - 1`,
/// truncated. If the frequency is too low for even the largest prescaler,
/// the largest prescaler and its out-of-range compare value are returned
/// as-is; the 16bit register write then wraps it and the timer runs with a
/// shorter period than requested. Zero or negative frequencies are not
/// validated and yield a meaningless result.
pub fn to_prescale_top(clock_hz: u32, frequency_hz: f32) -> (u16, u32) {
    let mut prescale = PRESCALERS[0];
    let mut top = 0u32;

    for &p in PRESCALERS.iter() {
        prescale = p;
        top = (clock_hz as f32 / (frequency_hz * p as f32) - 1.0) as u32;
        if top < COUNTER_SPACE {
            break;
        }
    }

    (prescale, top)
}

/// Register-level operations [`arm_ctc`] needs from a 16bit timer/counter.
///
/// Implemented for the hardware peripherals by [`impl_tc_interrupt!`]; a
/// software register model can stand in for deterministic host-side tests.
pub trait CtcRegisters {
    /// Globally suppress interrupt delivery (cli).
    fn suppress_interrupts(&mut self);
    /// Restore global interrupt delivery (sei).
    fn resume_interrupts(&mut self);
    /// Zero the control registers and the counter.
    fn reset(&mut self);
    /// Write the compare threshold the counter resets at.
    fn write_top(&mut self, top: u16);
    /// Select clear-on-compare-match counting.
    fn set_ctc_mode(&mut self);
    /// Route the prescaled clock to the counter. A prescale value outside
    /// [`PRESCALERS`] leaves the counter unclocked.
    fn set_clock_source(&mut self, prescale: u16);
    /// Unmask the output-compare interrupt.
    fn enable_compare_interrupt(&mut self);
    /// Read and clear the output-compare flag, true if it was set. Other
    /// event flags of the peripheral must be left untouched.
    fn take_compare_event(&mut self) -> bool;
}

/// Programs the timer for a repeating compare-match interrupt.
///
/// Interrupt delivery is suppressed across the register writes, so the
/// handler can only ever observe a fully-disarmed or fully-armed timer.
/// Once this returns, the interrupt fires every
/// `(top + 1) * prescale / clock` seconds until the peripheral is reset.
pub fn arm_ctc<T: CtcRegisters>(tc: &mut T, prescale: u16, top: u16) {
    tc.suppress_interrupts();
    tc.reset();
    tc.write_top(top);
    tc.set_ctc_mode();
    tc.set_clock_source(prescale);
    tc.enable_compare_interrupt();
    tc.resume_interrupts();
}

/// Selects a prescaler/compare pair for `frequency_hz` and arms the timer.
///
/// The compare value is truncated to the counter width without being
/// checked, see [`to_prescale_top`].
pub fn configure_frequency<T: CtcRegisters>(tc: &mut T, clock_hz: u32, frequency_hz: f32) {
    let (prescale, top) = to_prescale_top(clock_hz, frequency_hz);
    arm_ctc(tc, prescale, top as u16);
}

#[macro_export]
macro_rules! impl_tc_interrupt {
    (
        name: $Name:tt,
        peripheral: $tc:ty,
        reset: |$reset_var:ident| $reset:block,
        write_top: |$wtop_var:ident, $top:ident| $write_top:block,
        set_ctc_mode: |$mode_var:ident| $set_ctc_mode:block,
        set_clock_source: |$clk_var:ident, $prescale:ident| $set_clock_source:block,
        enable_compare_interrupt: |$irq_var:ident| $enable_irq:block,
        take_compare_event: |$poll_var:ident| -> bool $take_event:block,
    ) => {
        /// Drives the owned timer/counter in clear-on-compare mode.
        /// CPU_FREQ should be the reference clock in Hz, e.g. 16_000_000.
        pub struct $Name<const CPU_FREQ: u32> {
            tc: $tc,
        }

        impl<const CPU_FREQ: u32> $Name<CPU_FREQ> {
            /// Take exclusive ownership of the peripheral. Nothing is
            /// programmed until [`Self::configure_frequency`] or
            /// `CountDown::start` is called.
            pub fn new(tc: $tc) -> Self {
                Self { tc }
            }

            /// Arm a repeating compare-match interrupt at approximately
            /// `frequency_hz`. Interrupt delivery is globally suppressed
            /// while the registers are written and re-enabled before
            /// returning; from then on the handler bound to this timer's
            /// compare vector runs once per period.
            ///
            /// Re-configuring an already armed timer is not supported.
            pub fn configure_frequency(&mut self, frequency_hz: f32) {
                $crate::configure_frequency(self, CPU_FREQ, frequency_hz)
            }

            /// Release the underlying peripheral.
            pub fn release(self) -> $tc {
                self.tc
            }
        }

        impl<const CPU_FREQ: u32> $crate::CtcRegisters for $Name<CPU_FREQ> {
            fn suppress_interrupts(&mut self) {
                $crate::avr_device::interrupt::disable();
            }
            fn resume_interrupts(&mut self) {
                unsafe { $crate::avr_device::interrupt::enable() };
            }
            fn reset(&mut self) {
                let $reset_var = &self.tc;
                $reset
            }
            fn write_top(&mut self, top: u16) {
                let $wtop_var = &self.tc;
                let $top = top;
                $write_top
            }
            fn set_ctc_mode(&mut self) {
                let $mode_var = &self.tc;
                $set_ctc_mode
            }
            fn set_clock_source(&mut self, prescale: u16) {
                let $clk_var = &self.tc;
                let $prescale = prescale;
                $set_clock_source
            }
            fn enable_compare_interrupt(&mut self) {
                let $irq_var = &self.tc;
                $enable_irq
            }
            fn take_compare_event(&mut self) -> bool {
                let $poll_var = &self.tc;
                $take_event
            }
        }

        impl<const CPU_FREQ: u32> $crate::embedded_hal::timer::CountDown for $Name<CPU_FREQ> {
            type Time = $crate::fugit::MicrosDurationU32;

            /// Run the counter with period `timeout` without unmasking the
            /// compare interrupt; pair with `wait`.
            fn start<T>(&mut self, timeout: T)
            where
                T: Into<Self::Time>,
            {
                use $crate::CtcRegisters;

                let micros = timeout.into().ticks();
                let (prescale, top) =
                    $crate::to_prescale_top(CPU_FREQ, 1_000_000.0 / micros as f32);
                self.reset();
                self.write_top(top as u16);
                self.set_ctc_mode();
                self.set_clock_source(prescale);
            }

            fn wait(&mut self) -> $crate::nb::Result<(), $crate::void::Void> {
                use $crate::CtcRegisters;

                if self.take_compare_event() {
                    Ok(())
                } else {
                    Err($crate::nb::Error::WouldBlock)
                }
            }
        }

        impl<const CPU_FREQ: u32> $crate::embedded_hal::timer::Periodic for $Name<CPU_FREQ> {}
    };
}

#[macro_export]
macro_rules! impl_atmega_tc1 {
    (
        name: $Name:tt,
    ) => {
        $crate::impl_tc_interrupt! {
            name: $Name,
            peripheral: $crate::pac::TC1,
            reset: |periph| {
                periph.tccr1a.reset();
                periph.tccr1b.reset();
                periph.tcnt1.reset();
            },
            write_top: |periph, top| {
                periph.ocr1a.write(|w| unsafe { w.bits(top) });
            },
            set_ctc_mode: |periph| {
                // WGM13:10 = 0100, clear counter on OCR1A match
                periph.tccr1b.modify(|_, w| w.wgm1().bits(0b01));
            },
            set_clock_source: |periph, prescale| {
                periph.tccr1b.modify(|_, w| match prescale {
                    1 => w.cs1().direct(),
                    8 => w.cs1().prescale_8(),
                    64 => w.cs1().prescale_64(),
                    256 => w.cs1().prescale_256(),
                    1024 => w.cs1().prescale_1024(),
                    _ => w.cs1().no_clock(),
                });
            },
            enable_compare_interrupt: |periph| {
                periph.timsk1.modify(|_, w| w.ocie1a().set_bit());
            },
            take_compare_event: |periph| -> bool {
                if periph.tifr1.read().ocf1a().bit_is_set() {
                    // flags clear by writing '1'; a plain write leaves the
                    // other TIFR1 flags untouched
                    periph.tifr1.write(|w| w.ocf1a().set_bit());
                    true
                } else {
                    false
                }
            },
        }
    };
}

#[cfg(any(
    feature = "atmega32u4",
    feature = "atmega48p",
    feature = "atmega168",
    feature = "atmega328p",
    feature = "atmega328pb",
    feature = "atmega2560",
    feature = "atmega1280",
    feature = "atmega1284p"
))]
impl_atmega_tc1! {
    name: TimerInterrupt1,
}
