//! Counting tick notification
//!
//! The timer interrupt calls [`TickNotifier::fire`]; the real-time task
//! awaits [`TickNotifier::tick`]. Ticks that arrive while the task is busy
//! are counted, not coalesced, and handed out one at a time.

use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::waitqueue::AtomicWaker;
use portable_atomic::{AtomicU32, Ordering};

/// Single-producer, single-consumer counting notification
pub struct TickNotifier {
    /// Monotonic count of timer firings (wraps)
    fired: AtomicU32,
    /// Firings not yet consumed by the waiting task
    pending: AtomicU32,
    waker: AtomicWaker,
}

impl Default for TickNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TickNotifier {
    /// Create a notifier with no ticks
    pub const fn new() -> Self {
        Self {
            fired: AtomicU32::new(0),
            pending: AtomicU32::new(0),
            waker: AtomicWaker::new(),
        }
    }

    /// Record one timer firing and wake the waiting task
    ///
    /// Called from interrupt context. Does no other work.
    pub fn fire(&self) {
        self.fired.fetch_add(1, Ordering::Relaxed);
        self.pending.fetch_add(1, Ordering::Release);
        self.waker.wake();
    }

    /// Ticks fired since start
    pub fn now(&self) -> u32 {
        self.fired.load(Ordering::Relaxed)
    }

    /// Ticks fired but not yet consumed
    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::Acquire)
    }

    /// Consume one pending tick if there is one
    pub fn try_take(&self) -> bool {
        self.pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |p| p.checked_sub(1))
            .is_ok()
    }

    /// Wait until `count` ticks have been consumed
    ///
    /// `tick(0)` returns immediately.
    pub async fn tick(&self, count: u32) {
        for _ in 0..count {
            poll_fn(|cx| {
                if self.try_take() {
                    return Poll::Ready(());
                }
                self.waker.register(cx.waker());
                // A tick may have landed between the check and registering
                if self.try_take() {
                    Poll::Ready(())
                } else {
                    Poll::Pending
                }
            })
            .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::pin::pin;
    use embassy_futures::{block_on, poll_once};

    #[test]
    fn test_fire_counts() {
        let ticks = TickNotifier::new();
        ticks.fire();
        ticks.fire();
        assert_eq!(ticks.now(), 2);
        assert_eq!(ticks.pending(), 2);

        assert!(ticks.try_take());
        assert!(ticks.try_take());
        assert!(!ticks.try_take());
        assert_eq!(ticks.now(), 2);
    }

    #[test]
    fn test_burst_is_drained_one_at_a_time() {
        let ticks = TickNotifier::new();
        for _ in 0..5 {
            ticks.fire();
        }
        block_on(ticks.tick(3));
        assert_eq!(ticks.pending(), 2);
        block_on(ticks.tick(2));
        assert_eq!(ticks.pending(), 0);
    }

    #[test]
    fn test_tick_zero_is_immediate() {
        let ticks = TickNotifier::new();
        block_on(ticks.tick(0));
    }

    #[test]
    fn test_tick_waits_for_fire() {
        let ticks = TickNotifier::new();
        let mut wait = pin!(ticks.tick(2));

        assert!(poll_once(wait.as_mut()).is_pending());
        ticks.fire();
        assert!(poll_once(wait.as_mut()).is_pending());
        ticks.fire();
        assert!(poll_once(wait.as_mut()).is_ready());
    }
}
