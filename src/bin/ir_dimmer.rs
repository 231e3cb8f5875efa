#![no_main]
#![no_std]
#![feature(abi_msp430_interrupt)]

// IR remote dimmer for the MSP430FR2355 LaunchPad. An IR receiver on
// P1.6 feeds the TB0 capture unit; the decoded NEC commands set the duty
// cycle of a software PWM on the P1.0 LED, with volume buttons stepping
// the brightness and auto-repeating while held.

use core::cell::RefCell;

use critical_section::{with, Mutex};
use msp430::interrupt::enable;
use msp430_rt::entry;
use msp430fr2355::interrupt;

use ir_dimmer::dimmer::Dimmer;
use ir_dimmer::hw::{self, CadenceTimer, CaptureTimer, Led, TimerSource};
use ir_dimmer::mailbox::CommandLatch;
use ir_dimmer::nec::{NecDecoder, NecEvent};
use ir_dimmer::pulse::{Edge, PulseClock};

use embedded_hal::digital::PinState;

use panic_msp430 as _;

static CAPTURE: Mutex<RefCell<Option<CaptureTimer>>> = Mutex::new(RefCell::new(None));
static LED: Mutex<RefCell<Option<Led>>> = Mutex::new(RefCell::new(None));
static CLOCK: Mutex<RefCell<PulseClock>> = Mutex::new(RefCell::new(PulseClock::new()));
static DECODER: Mutex<RefCell<NecDecoder>> = Mutex::new(RefCell::new(NecDecoder::new()));
static DIMMER: Mutex<RefCell<Dimmer>> =
    Mutex::new(RefCell::new(Dimmer::new(hw::PWM_PERIOD_TICKS)));
static FRAMES: CommandLatch = CommandLatch::new();

#[entry]
fn main() -> ! {
    let periph = match msp430fr2355::Peripherals::take() {
        Some(periph) => periph,
        None => loop {},
    };

    hw::init_board(periph.WDT_A, periph.PMM);
    let led = Led::setup(periph.P1);
    let mut capture = CaptureTimer::setup(periph.TB0);
    capture.start_pwm();
    let _cadence = CadenceTimer::setup(periph.TB1);

    with(|cs| {
        CAPTURE.borrow(cs).replace(Some(capture));
        LED.borrow(cs).replace(Some(led));
    });
    unsafe { enable() };

    // Everything runs in the ISRs; the foreground only drains the latch
    // so completed frames are acknowledged.
    loop {
        let _ = FRAMES.take();
    }
}

// Shared TB0 vector: CCR1 IR edge captures and CCR2 PWM phase ends.
#[interrupt]
fn TIMER0_B1() {
    with(|cs| {
        let mut capture = CAPTURE.borrow_ref_mut(cs);
        let capture = match capture.as_mut() {
            Some(capture) => capture,
            None => return,
        };

        match capture.interrupt_source() {
            TimerSource::IrEdge => match capture.read_capture() {
                Ok(stamp) => {
                    let event = CLOCK.borrow_ref_mut(cs).record(stamp);
                    if let Some(out) = DECODER.borrow_ref_mut(cs).feed(event) {
                        if let NecEvent::Command(raw) = out {
                            FRAMES.publish(raw);
                        }
                        DIMMER.borrow_ref_mut(cs).handle(out);
                    }
                }
                Err(_) => {
                    // A lost edge leaves the polarity tracker out of step
                    // with the line. Re-seed it from the actual input
                    // level: a high line can only fall next, a low one
                    // can only rise.
                    let next = match capture.line_level() {
                        PinState::High => Edge::Falling,
                        PinState::Low => Edge::Rising,
                    };
                    CLOCK.borrow_ref_mut(cs).resync_to(next);
                    DECODER.borrow_ref_mut(cs).reset();
                }
            },
            TimerSource::PwmCompare => {
                let (level, ticks) = DIMMER.borrow_ref_mut(cs).pwm().next_phase();
                if let Some(led) = LED.borrow_ref_mut(cs).as_mut() {
                    led.set_level(level);
                }
                capture.advance_pwm_compare(ticks);
            }
            TimerSource::Overflow | TimerSource::None => {}
        }
    });
}

// TB1 CCR0: the 100 ms auto-repeat cadence.
#[interrupt]
fn TIMER1_B0() {
    with(|cs| DIMMER.borrow_ref_mut(cs).cadence_tick());
}

// Debug builds emit calls to the abort() intrinsic, which MSP430 has no
// runtime support for.
#[no_mangle]
extern "C" fn abort() -> ! {
    panic!();
}
