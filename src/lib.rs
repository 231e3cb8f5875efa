//! NEC infrared remote receiver and LED dimmer for the MSP430FR2355.
//! Here are the [`datasheet`] and [`User's guide`] for reference.
//!
//! A free-running 16-bit timer captures every transition of the IR
//! receiver output; a state machine classifies the pulse widths and
//! reassembles 32-bit NEC frames, which drive the brightness of an LED
//! through a compare-interrupt software PWM. Held buttons keep stepping
//! the brightness through the transmitter's repeat codes until 200 ms
//! pass without one.
//!
//! [`datasheet`]: http://www.ti.com/lit/ds/symlink/msp430fr2355.pdf
//! [`User's guide`]: http://www.ti.com/lit/ug/slau445i/slau445i.pdf
//!
//! # Usage
//!
//! The protocol and actuation modules are plain `no_std` state machines
//! with no register access, so the default build runs (and is tested) on
//! the host. Enabling the `msp430fr2355` feature adds the register layer
//! and the `ir-dimmer` firmware binary; flash that with `mspdebug` as
//! usual for Launchpad boards, with the appropriate `memory.x` in place.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

pub mod dimmer;
pub mod mailbox;
pub mod nec;
pub mod pulse;
pub mod pwm;
pub mod repeat;

#[cfg(feature = "msp430fr2355")]
pub mod hw;

#[cfg(feature = "msp430fr2355")]
pub use msp430fr2355 as pac;
