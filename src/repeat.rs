//! Auto-repeat ticker
//!
//! While a step button on the remote is held down, the transmitter stops
//! sending full frames and emits repeat codes instead. This module re-applies
//! the held step at a fixed 100 ms cadence, driven by its own up-mode timer
//! interrupt, until 200 ms pass without any fresh IR event. The timeout
//! tolerates one missed refresh.
//!
//! Ordering at the timeout boundary: the tick at exactly 200 ms of silence
//! still applies its step, and the hold is cleared immediately after. So a
//! hold that is never refreshed steps at 100 ms and at 200 ms, then stops.

/// Cadence of the repeat timer interrupt
pub const TICK_MS: u16 = 100;
/// Silence after which the hold is dropped
pub const TIMEOUT_MS: u16 = 200;

/// Direction of a held step command
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepKind {
    /// Brightness up
    Increment,
    /// Brightness down
    Decrement,
}

/// Hold-and-repeat state for the last step command
pub struct AutoRepeat {
    held: Option<StepKind>,
    elapsed_ms: u16,
}

impl AutoRepeat {
    /// Inactive ticker
    pub const fn new() -> Self {
        AutoRepeat {
            held: None,
            elapsed_ms: 0,
        }
    }

    /// Whether a step is currently held
    pub fn is_active(&self) -> bool {
        self.held.is_some()
    }

    /// Begin (or restart) holding a step command.
    pub fn hold(&mut self, kind: StepKind) {
        self.held = Some(kind);
        self.elapsed_ms = 0;
    }

    /// A fresh IR event arrived for the held button; restart the silence
    /// clock. Does nothing when inactive.
    pub fn refresh(&mut self) {
        if self.held.is_some() {
            self.elapsed_ms = 0;
        }
    }

    /// Drop the hold immediately, regardless of elapsed time.
    pub fn cancel(&mut self) {
        self.held = None;
        self.elapsed_ms = 0;
    }

    /// Advance one cadence tick. Returns the step to apply on this tick,
    /// or `None` when inactive.
    pub fn tick(&mut self) -> Option<StepKind> {
        let kind = self.held?;
        self.elapsed_ms = self.elapsed_ms.saturating_add(TICK_MS);
        if self.elapsed_ms >= TIMEOUT_MS {
            self.held = None;
            self.elapsed_ms = 0;
        }
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_until_timeout_boundary_inclusive() {
        let mut rep = AutoRepeat::new();
        rep.hold(StepKind::Increment);
        // 100 ms elapsed
        assert_eq!(rep.tick(), Some(StepKind::Increment));
        assert!(rep.is_active());
        // 200 ms elapsed: boundary tick still steps, then disables
        assert_eq!(rep.tick(), Some(StepKind::Increment));
        assert!(!rep.is_active());
        assert_eq!(rep.tick(), None);
    }

    #[test]
    fn refresh_extends_the_hold() {
        let mut rep = AutoRepeat::new();
        rep.hold(StepKind::Decrement);
        assert_eq!(rep.tick(), Some(StepKind::Decrement));
        rep.refresh();
        assert_eq!(rep.tick(), Some(StepKind::Decrement));
        assert!(rep.is_active());
        assert_eq!(rep.tick(), Some(StepKind::Decrement));
        assert!(!rep.is_active());
    }

    #[test]
    fn cancel_stops_repeating_at_once() {
        let mut rep = AutoRepeat::new();
        rep.hold(StepKind::Increment);
        rep.cancel();
        assert_eq!(rep.tick(), None);
    }

    #[test]
    fn new_hold_resets_silence_clock() {
        let mut rep = AutoRepeat::new();
        rep.hold(StepKind::Increment);
        rep.tick();
        rep.hold(StepKind::Decrement);
        assert_eq!(rep.tick(), Some(StepKind::Decrement));
        assert!(rep.is_active());
    }

    #[test]
    fn refresh_on_inactive_ticker_is_a_no_op() {
        let mut rep = AutoRepeat::new();
        rep.refresh();
        assert_eq!(rep.tick(), None);
        assert!(!rep.is_active());
    }
}
