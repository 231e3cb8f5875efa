//! Pulse capture timekeeping
//!
//! The IR receiver output is sampled by a capture register fed from a
//! free-running 16-bit counter (1 tick = 1 µs at the default SMCLK rate).
//! On every input transition the capture ISR hands the raw counter reading
//! to [`PulseClock`], which turns it into a [`PulseEvent`] carrying the
//! elapsed ticks since the previous transition.
//!
//! The elapsed time is computed with wrapping subtraction, which stays
//! correct across counter overflow without any special-casing.

/// Direction of an input transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Edge {
    /// Low-to-high transition, ends a low pulse
    Rising,
    /// High-to-low transition, ends a high space
    Falling,
}

impl Edge {
    /// The opposite transition direction
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Edge::Rising => Edge::Falling,
            Edge::Falling => Edge::Rising,
        }
    }
}

/// One input transition, produced once per capture interrupt and consumed
/// immediately by the decoder.
#[derive(Clone, Copy, Debug)]
pub struct PulseEvent {
    /// Ticks elapsed since the previous transition (wrapping)
    pub delta: u16,
    /// Direction of this transition
    pub edge: Edge,
}

/// Tracks successive capture timestamps and the expected polarity of the
/// next edge.
///
/// The polarity is inverted on every recorded capture, so after each edge
/// the clock expects the opposite transition. The receiver line idles high,
/// so a fresh clock expects a falling edge first. If the caller ever loses
/// an edge it must re-seed the polarity from the actual line level via
/// [`PulseClock::resync_to`]; guessing would leave the labels inverted for
/// every edge that follows, since labels and physical edges both strictly
/// alternate.
pub struct PulseClock {
    last: u16,
    next_edge: Edge,
}

impl PulseClock {
    /// Clock primed for the falling edge that begins an NEC frame
    pub const fn new() -> Self {
        PulseClock {
            last: 0,
            next_edge: Edge::Falling,
        }
    }

    /// Polarity the next capture is expected to have
    pub fn next_edge(&self) -> Edge {
        self.next_edge
    }

    /// Record a raw counter reading taken at an input transition and
    /// return the event for it.
    pub fn record(&mut self, stamp: u16) -> PulseEvent {
        let delta = stamp.wrapping_sub(self.last);
        let edge = self.next_edge;
        self.last = stamp;
        self.next_edge = edge.flip();
        PulseEvent { delta, edge }
    }

    /// Re-seed the polarity tracker after a lost edge. `next` is the
    /// direction of the next physical transition, which the caller reads
    /// off the line itself: a high line can only fall, a low line can only
    /// rise. The last timestamp stays as the reference point; a stale
    /// first delta at worst wastes one frame attempt downstream.
    pub fn resync_to(&mut self, next: Edge) {
        self.next_edge = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_between_captures() {
        let mut clock = PulseClock::new();
        clock.record(100);
        let ev = clock.record(9100);
        assert_eq!(ev.delta, 9000);
    }

    #[test]
    fn delta_wraps_across_counter_overflow() {
        let mut clock = PulseClock::new();
        clock.record(0xFFF0);
        let ev = clock.record(0x0560);
        // 0x0560 - 0xFFF0 mod 2^16 = 0x570
        assert_eq!(ev.delta, 0x0570);
    }

    #[test]
    fn polarity_alternates_every_capture() {
        let mut clock = PulseClock::new();
        assert_eq!(clock.record(0).edge, Edge::Falling);
        assert_eq!(clock.record(10).edge, Edge::Rising);
        assert_eq!(clock.record(20).edge, Edge::Falling);
    }

    #[test]
    fn resync_seeds_polarity_from_caller() {
        let mut clock = PulseClock::new();
        clock.record(0);
        assert_eq!(clock.next_edge(), Edge::Rising);
        // A lost edge with the line low: the next transition must rise,
        // same as the tracker already expects
        clock.resync_to(Edge::Rising);
        assert_eq!(clock.next_edge(), Edge::Rising);
        assert_eq!(clock.record(100).edge, Edge::Rising);
        // With the line high it must fall
        clock.resync_to(Edge::Falling);
        assert_eq!(clock.next_edge(), Edge::Falling);
    }
}
