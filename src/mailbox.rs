//! Command-ready latch
//!
//! A one-deep mailbox between the capture ISR (producer) and the
//! foreground loop (consumer). The producer publishes each completed frame
//! exactly once; the consumer reads and clears in a single critical
//! section, so the value and its ready flag can never be observed torn.
//!
//! There is deliberately no queue: if a second frame completes before the
//! first is consumed, the newer value wins and the older one is lost. That
//! matches the lossy latest-wins behavior remote-control firmware wants,
//! where a stale button press is worth less than the current one.

use core::cell::Cell;
use critical_section::Mutex;

/// Latest-wins latch for decoded 32-bit frames
pub struct CommandLatch {
    slot: Mutex<Cell<Option<u32>>>,
}

impl CommandLatch {
    /// Empty latch, usable as a `static`
    pub const fn new() -> Self {
        CommandLatch {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Publish a completed frame, replacing any unconsumed one.
    pub fn publish(&self, raw: u32) {
        critical_section::with(|cs| self.slot.borrow(cs).set(Some(raw)));
    }

    /// Read and clear the pending frame. Returns `None` when nothing new
    /// has arrived since the last call.
    pub fn take(&self) -> Option<u32> {
        critical_section::with(|cs| self.slot.borrow(cs).take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_the_latch() {
        let latch = CommandLatch::new();
        latch.publish(0x00FF_5AA5);
        assert_eq!(latch.take(), Some(0x00FF_5AA5));
        // A second take without a new frame must not re-trigger anything
        assert_eq!(latch.take(), None);
    }

    #[test]
    fn empty_latch_yields_none() {
        let latch = CommandLatch::new();
        assert_eq!(latch.take(), None);
    }

    #[test]
    fn second_publish_wins() {
        let latch = CommandLatch::new();
        latch.publish(0x00FF_5AA5);
        latch.publish(0x00FF_10EF);
        assert_eq!(latch.take(), Some(0x00FF_10EF));
        assert_eq!(latch.take(), None);
    }
}
