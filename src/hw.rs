//! Register layer for the MSP430FR2355 LaunchPad build
//!
//! Wires the portable state machines to the board: TB0 free-runs off
//! SMCLK as the shared timebase, with CCR1 capturing both edges of the IR
//! receiver on P1.6 (timer input A) and CCR2 as the self-re-arming compare
//! register of the software PWM. TB1 runs in up mode off ACLK and fires
//! the 100 ms auto-repeat cadence. The LED sits on P1.0 and is driven
//! from the compare ISR.
//!
//! Clocks are left at their reset defaults, DCO-sourced SMCLK at 1 MHz
//! (1 tick = 1 µs on TB0) and REFO-sourced ACLK at 32768 Hz, the same
//! rates the timing constants in [`crate::nec`] assume.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use msp430fr2355 as pac;

/// Ticks of the software PWM period (1 kHz output at 1 µs ticks)
pub const PWM_PERIOD_TICKS: u16 = 1000;
/// ACLK counts per auto-repeat cadence tick (~100 ms at 32768 Hz)
pub const CADENCE_TICKS: u16 = 3277;

const LED_BIT: u8 = 1 << 0; // P1.0
const IR_BIT: u8 = 1 << 6; // P1.6, TB0.1 input A

const WDT_PASSWORD: u8 = 0x5A;

// TBSSEL field encodings
const TBSSEL_ACLK: u8 = 1;
const TBSSEL_SMCLK: u8 = 2;

/// Stop the watchdog and unlock the GPIO pins from their high-impedance
/// reset state. Call once, before anything else touches the ports.
pub fn init_board(wdt: pac::WDT_A, pmm: pac::PMM) {
    wdt.wdtctl
        .write(|w| unsafe { w.wdtpw().bits(WDT_PASSWORD) }.wdthold().hold());
    pmm.pm5ctl0.write(|w| w.locklpm5().locklpm5_0());
}

/// LED output on P1.0
///
/// Claims the whole P1 port: besides the LED it routes P1.6 to the TB0
/// capture input (SEL1) so the IR receiver reaches the timer.
pub struct Led(pac::P1);

impl Led {
    /// Configure P1.0 as a low output and P1.6 as the capture input.
    pub fn setup(p1: pac::P1) -> Self {
        unsafe {
            p1.p1out.clear_bits(|w| w.bits(LED_BIT));
            p1.p1dir.set_bits(|w| w.bits(LED_BIT));
            // P1.6 alternate function 2 = TB0.1 input A
            p1.p1dir.clear_bits(|w| w.bits(IR_BIT));
            p1.p1sel0.clear_bits(|w| w.bits(IR_BIT));
            p1.p1sel1.set_bits(|w| w.bits(IR_BIT));
        }
        Led(p1)
    }

    /// Drive the pin to the given level
    #[inline]
    pub fn set_level(&mut self, level: PinState) {
        match level {
            PinState::High => unsafe { self.0.p1out.set_bits(|w| w.bits(LED_BIT)) },
            PinState::Low => unsafe { self.0.p1out.clear_bits(|w| w.bits(LED_BIT)) },
        }
    }
}

impl ErrorType for Led {
    type Error = Infallible;
}

impl OutputPin for Led {
    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_level(PinState::Low);
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_level(PinState::High);
        Ok(())
    }
}

/// Error returned when a capture was overwritten before being read
pub struct OverCapture(pub u16);

/// Interrupt source behind the shared TB0 vector
pub enum TimerSource {
    /// Nothing pending
    None,
    /// CCR1 captured an IR edge
    IrEdge,
    /// CCR2 compare: the current PWM phase ended
    PwmCompare,
    /// Main timer wraparound (unused, the wrapping math absorbs it)
    Overflow,
}

/// TB0 as shared timebase: edge capture on CCR1, PWM compare on CCR2
pub struct CaptureTimer(pac::TB0);

impl CaptureTimer {
    /// Put TB0 in continuous mode off SMCLK, CCR1 capturing both edges
    /// of input A with capture interrupts on, CCR2 in compare mode (still
    /// quiet; see [`CaptureTimer::start_pwm`]).
    pub fn setup(tb0: pac::TB0) -> Self {
        tb0.tb0ctl.write(|w| w.tbssel().bits(TBSSEL_SMCLK).id().bits(0));
        tb0.tb0cctl1.write(|w| {
            w.cap()
                .capture()
                .scs()
                .sync()
                .cm()
                .bits(3) // both edges
                .ccis()
                .bits(0) // input A
                .ccie()
                .set_bit()
        });
        tb0.tb0cctl2.write(|w| w.outmod().bits(0));
        tb0.tb0ctl.modify(|r, w| {
            unsafe { w.bits(r.bits()) }
                .tbclr()
                .set_bit()
                .tbifg()
                .clear_bit()
                .mc()
                .continuous()
        });
        CaptureTimer(tb0)
    }

    /// Current free-running counter value
    #[inline]
    pub fn now(&self) -> u16 {
        self.0.tb0r.read().bits()
    }

    /// Read the TB0 interrupt vector, clearing the flag it reports.
    #[inline]
    pub fn interrupt_source(&mut self) -> TimerSource {
        match self.0.tb0iv.read().bits() {
            0x02 => TimerSource::IrEdge,
            0x04 => TimerSource::PwmCompare,
            0x0E => TimerSource::Overflow,
            _ => TimerSource::None,
        }
    }

    /// Read the captured timestamp after the interrupt vector reported an
    /// IR edge. The vector read already cleared the interrupt flag, so
    /// only the overflow bit is left to check.
    pub fn read_capture(&mut self) -> Result<u16, OverCapture> {
        let stamp = self.0.tb0ccr1.read().bits();
        if self.0.tb0cctl1.read().cov().bit() {
            unsafe { self.0.tb0cctl1.clear_bits(|w| w.cov().clear_bit()) };
            Err(OverCapture(stamp))
        } else {
            Ok(stamp)
        }
    }

    /// Current level of the capture input, from the synchronized CCI bit.
    /// After a lost edge this is what decides which polarity the pulse
    /// clock re-arms for.
    #[inline]
    pub fn line_level(&self) -> PinState {
        if self.0.tb0cctl1.read().cci().bit() {
            PinState::High
        } else {
            PinState::Low
        }
    }

    /// Arm the PWM compare one period from now and enable its interrupt.
    pub fn start_pwm(&mut self) {
        let target = self.now().wrapping_add(PWM_PERIOD_TICKS);
        self.0.tb0ccr2.write(|w| unsafe { w.bits(target) });
        unsafe { self.0.tb0cctl2.set_bits(|w| w.ccie().set_bit()) };
    }

    /// Advance the PWM compare target by the length of the phase just
    /// started. Advancing relative to the previous target, not to `now`,
    /// keeps the period free of ISR-latency drift.
    #[inline]
    pub fn advance_pwm_compare(&mut self, ticks: u16) {
        let next = self.0.tb0ccr2.read().bits().wrapping_add(ticks);
        self.0.tb0ccr2.write(|w| unsafe { w.bits(next) });
    }
}

/// TB1 as the fixed 100 ms auto-repeat cadence
pub struct CadenceTimer(pac::TB1);

impl CadenceTimer {
    /// Put TB1 in up mode off ACLK with CCR0 interrupts on. The CCR0
    /// flag is cleared by hardware when its dedicated vector is serviced.
    pub fn setup(tb1: pac::TB1) -> Self {
        tb1.tb1ctl.write(|w| w.tbssel().bits(TBSSEL_ACLK).id().bits(0));
        tb1.tb1ccr0.write(|w| unsafe { w.bits(CADENCE_TICKS) });
        tb1.tb1cctl0.write(|w| w.ccie().set_bit());
        tb1.tb1ctl.modify(|r, w| {
            unsafe { w.bits(r.bits()) }
                .tbclr()
                .set_bit()
                .tbifg()
                .clear_bit()
                .mc()
                .up()
        });
        CadenceTimer(tb1)
    }
}
