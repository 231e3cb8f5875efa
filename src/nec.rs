//! NEC protocol decoder
//!
//! Reconstructs 32-bit NEC frames from the pulse-width measurements
//! produced by [`crate::pulse::PulseClock`]. The decoder is a plain state
//! machine with no register access, so the same code runs inside the
//! capture ISR and under the host test suite.
//!
//! An NEC frame on the receiver output looks like:
//!
//! ```text
//! ____          ______ _ __ _ ___     _ _________
//!     |________|      |_|  |_|   ... |_|
//!      9 ms low  4.5 ms  bits (32)     stop
//! ```
//!
//! Every bit is a 560 µs low marker followed by a high space whose length
//! encodes the value: 560 µs for 0, 1.69 ms for 1. A held button sends
//! repeat frames, recognizable by a 2.25 ms space after the lead pulse
//! instead of the 4.5 ms one.
//!
//! All four timing classes sit in disjoint windows with enough margin to
//! absorb clock and receiver jitter. A delta outside every window for the
//! current state drops the in-flight frame and returns to [`DecodeState::Idle`];
//! there is no resynchronization and no partial result. The next valid
//! lead pulse starts a fresh attempt.

use crate::pulse::{Edge, PulseEvent};

/// Inclusive pulse-class window in ticks (µs)
#[derive(Clone, Copy, Debug)]
pub struct Window {
    /// Shortest accepted delta
    pub min: u16,
    /// Longest accepted delta
    pub max: u16,
}

impl Window {
    const fn new(min: u16, max: u16) -> Self {
        Window { min, max }
    }

    /// Whether the delta falls inside this window
    #[inline]
    pub fn contains(self, delta: u16) -> bool {
        delta >= self.min && delta <= self.max
    }
}

/// 9 ms lead pulse
pub const LEAD_PULSE: Window = Window::new(8000, 10_000);
/// 4.5 ms space announcing a new command frame
pub const FRAME_SPACE: Window = Window::new(4000, 5000);
/// 2.25 ms space announcing a repeat of the held button
pub const REPEAT_SPACE: Window = Window::new(2000, 2500);
/// 560 µs bit marker pulse, also the space length of a 0 bit
pub const BIT_PULSE: Window = Window::new(460, 660);
/// 1.69 ms space length of a 1 bit
pub const ONE_SPACE: Window = Window::new(1580, 1780);

/// Decoder position within a frame
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DecodeState {
    /// Waiting for the falling edge that begins a frame
    Idle,
    /// Inside the 9 ms lead pulse
    StartPulse,
    /// Inside the space that selects new-frame vs repeat
    StartSpace,
    /// Inside a 560 µs bit marker
    DataPulse,
    /// Inside the space that encodes the bit value
    DataSpace,
}

/// Something a completed frame tells the consumer to do
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NecEvent {
    /// A full 32-bit frame, bits in arrival order starting at bit 0
    Command(u32),
    /// Repeat code; carries no payload, the consumer reuses the last
    /// decoded command
    Repeat,
}

/// NEC decode state machine
///
/// Feed it one [`PulseEvent`] per input transition. Completed frames come
/// back as [`NecEvent`]s; malformed timing silently drops the frame.
pub struct NecDecoder {
    state: DecodeState,
    bits: u32,
    count: u8,
}

impl NecDecoder {
    /// Decoder in the idle state
    pub const fn new() -> Self {
        NecDecoder {
            state: DecodeState::Idle,
            bits: 0,
            count: 0,
        }
    }

    /// Current state, mostly of interest to tests
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Drop any in-flight frame and wait for the next lead pulse.
    pub fn reset(&mut self) {
        self.state = DecodeState::Idle;
    }

    /// Advance the state machine by one input transition.
    pub fn feed(&mut self, event: PulseEvent) -> Option<NecEvent> {
        match self.state {
            DecodeState::Idle => {
                if event.edge == Edge::Falling {
                    self.state = DecodeState::StartPulse;
                }
                None
            }
            DecodeState::StartPulse => {
                if event.edge == Edge::Rising && LEAD_PULSE.contains(event.delta) {
                    self.state = DecodeState::StartSpace;
                } else {
                    self.state = DecodeState::Idle;
                }
                None
            }
            DecodeState::StartSpace => {
                if event.edge != Edge::Falling {
                    self.state = DecodeState::Idle;
                    None
                } else if FRAME_SPACE.contains(event.delta) {
                    self.bits = 0;
                    self.count = 0;
                    self.state = DecodeState::DataPulse;
                    None
                } else if REPEAT_SPACE.contains(event.delta) {
                    self.state = DecodeState::Idle;
                    Some(NecEvent::Repeat)
                } else {
                    self.state = DecodeState::Idle;
                    None
                }
            }
            DecodeState::DataPulse => {
                if event.edge == Edge::Rising && BIT_PULSE.contains(event.delta) {
                    self.state = DecodeState::DataSpace;
                } else {
                    self.state = DecodeState::Idle;
                }
                None
            }
            DecodeState::DataSpace => {
                if event.edge != Edge::Falling {
                    self.state = DecodeState::Idle;
                    return None;
                }
                let bit = if BIT_PULSE.contains(event.delta) {
                    0u32
                } else if ONE_SPACE.contains(event.delta) {
                    1u32
                } else {
                    self.state = DecodeState::Idle;
                    return None;
                };
                // First bit received lands at accumulator bit 0
                self.bits |= bit << self.count;
                self.count += 1;
                if self.count == 32 {
                    self.state = DecodeState::Idle;
                    Some(NecEvent::Command(self.bits))
                } else {
                    self.state = DecodeState::DataPulse;
                    None
                }
            }
        }
    }
}
