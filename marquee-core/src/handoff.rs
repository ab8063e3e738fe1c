//! Content handoff between the control path and the display task
//!
//! The control path writes a message and a scroll delay; the display task
//! picks the message up between frames. Neither side ever waits on the
//! other.
//!
//! The text buffer is guarded by a single state word:
//!
//! ```text
//!            set_text             set_text done         claim              claim dropped
//!   Idle ─────────────▶ Writing ─────────────▶ Pending ───────▶ Claimed ─────────────▶ Idle
//!                          ▲                      │
//!                          └──────────────────────┘
//!                          set_text (replaces an unclaimed message)
//! ```
//!
//! Only the holder of `Writing` or `Claimed` touches the buffer, so the
//! reader always sees one complete message.

#![allow(unsafe_code)]

use core::cell::UnsafeCell;
use core::ops::Deref;

use heapless::String;
use portable_atomic::{AtomicU32, AtomicU8, Ordering};

/// Maximum message length in bytes
pub const MAX_TEXT_LEN: usize = 4096;

const IDLE: u8 = 0;
const WRITING: u8 = 1;
const PENDING: u8 = 2;
const CLAIMED: u8 = 3;

/// Handoff errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandoffError {
    /// The display task is consuming the previous message, or another
    /// write is in progress. Nothing was changed.
    Busy,
}

/// Shared message, scroll delay and pending flag
pub struct ContentHandoff {
    state: AtomicU8,
    text: UnsafeCell<String<MAX_TEXT_LEN>>,
    scroll_delay_ms: AtomicU32,
}

// SAFETY: `text` is only accessed by the party that moved `state` into
// WRITING (writer) or CLAIMED (reader); those transitions are exclusive
// compare-exchanges, and the release stores that leave them publish the
// buffer contents to the next owner.
unsafe impl Sync for ContentHandoff {}

impl ContentHandoff {
    /// Create an empty handoff with the given scroll delay
    pub const fn new(scroll_delay_ms: u32) -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            text: UnsafeCell::new(String::new()),
            scroll_delay_ms: AtomicU32::new(scroll_delay_ms),
        }
    }

    /// Queue a new message for the display task
    ///
    /// Text longer than [`MAX_TEXT_LEN`] bytes is cut at the last char
    /// boundary that fits. A message that is pending but not yet claimed
    /// is replaced. While the display task holds a claim the call is
    /// refused with [`HandoffError::Busy`].
    pub fn set_text(&self, text: &str) -> Result<(), HandoffError> {
        self.state
            .fetch_update(Ordering::Acquire, Ordering::Relaxed, |s| match s {
                IDLE | PENDING => Some(WRITING),
                _ => None,
            })
            .map_err(|_| HandoffError::Busy)?;

        // SAFETY: this thread moved the state to WRITING; nobody else
        // touches the buffer until the release store below.
        let buf = unsafe { &mut *self.text.get() };
        buf.clear();
        // Cannot fail: the slice is at most MAX_TEXT_LEN bytes
        let _ = buf.push_str(truncate(text, MAX_TEXT_LEN));

        self.state.store(PENDING, Ordering::Release);
        Ok(())
    }

    /// Set the scroll delay (milliseconds per one-pixel step)
    ///
    /// Takes effect immediately; zero stops scrolling.
    pub fn set_scroll_delay(&self, millis: u32) {
        self.scroll_delay_ms.store(millis, Ordering::Relaxed);
    }

    /// Current scroll delay in milliseconds
    pub fn scroll_delay(&self) -> u32 {
        self.scroll_delay_ms.load(Ordering::Relaxed)
    }

    /// Whether a message is waiting to be claimed
    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }

    /// Take the pending message, if any
    ///
    /// The message stays claimed, and writers are refused, until the
    /// returned guard is dropped.
    pub fn claim(&self) -> Option<TextClaim<'_>> {
        self.state
            .compare_exchange(PENDING, CLAIMED, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| TextClaim { handoff: self })
    }
}

/// Read access to a claimed message
pub struct TextClaim<'a> {
    handoff: &'a ContentHandoff,
}

impl Deref for TextClaim<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        // SAFETY: the state is CLAIMED for as long as this guard lives,
        // which excludes writers.
        unsafe { (*self.handoff.text.get()).as_str() }
    }
}

impl Drop for TextClaim<'_> {
    fn drop(&mut self) {
        self.handoff.state.store(IDLE, Ordering::Release);
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char
pub fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::string::String as StdString;

    #[test]
    fn test_set_then_claim() {
        let handoff = ContentHandoff::new(50);
        assert!(!handoff.is_pending());
        assert!(handoff.claim().is_none());

        handoff.set_text("Hello").unwrap();
        assert!(handoff.is_pending());

        let text = handoff.claim().unwrap();
        assert_eq!(&*text, "Hello");
        assert!(!handoff.is_pending());
        drop(text);

        // Consumed exactly once
        assert!(handoff.claim().is_none());
    }

    #[test]
    fn test_last_writer_wins_before_claim() {
        let handoff = ContentHandoff::new(50);
        handoff.set_text("A").unwrap();
        handoff.set_text("B").unwrap();

        let text = handoff.claim().unwrap();
        assert_eq!(&*text, "B");
    }

    #[test]
    fn test_write_refused_while_claimed() {
        let handoff = ContentHandoff::new(50);
        handoff.set_text("first").unwrap();

        let text = handoff.claim().unwrap();
        assert_eq!(handoff.set_text("second"), Err(HandoffError::Busy));
        assert_eq!(&*text, "first");
        drop(text);

        // Released after the rebuild; the refused write left nothing behind
        assert!(!handoff.is_pending());
        handoff.set_text("second").unwrap();
        assert_eq!(&*handoff.claim().unwrap(), "second");
    }

    #[test]
    fn test_truncates_to_max_len() {
        let handoff = ContentHandoff::new(50);
        let long: StdString = (0..MAX_TEXT_LEN + 100)
            .map(|i| (b'a' + (i % 26) as u8) as char)
            .collect();

        handoff.set_text(&long).unwrap();
        let text = handoff.claim().unwrap();
        assert_eq!(text.len(), MAX_TEXT_LEN);
        assert_eq!(&*text, &long[..MAX_TEXT_LEN]);
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("héllo", 3), "hé");
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn test_empty_text_is_accepted() {
        let handoff = ContentHandoff::new(50);
        handoff.set_text("").unwrap();
        assert_eq!(&*handoff.claim().unwrap(), "");
    }

    #[test]
    fn test_scroll_delay_applies_immediately() {
        let handoff = ContentHandoff::new(50);
        handoff.set_text("pending").unwrap();
        handoff.set_scroll_delay(10);
        assert_eq!(handoff.scroll_delay(), 10);
        // Independent of the text gate
        assert!(handoff.is_pending());
    }

    #[test]
    fn test_concurrent_writer_never_tears() {
        use std::sync::atomic::{AtomicBool, Ordering as StdOrdering};
        use std::thread;

        static HANDOFF: ContentHandoff = ContentHandoff::new(50);
        static DONE: AtomicBool = AtomicBool::new(false);

        let writer = thread::spawn(|| {
            let a = "A".repeat(300);
            let b = "B".repeat(300);
            for i in 0..20_000 {
                let _ = HANDOFF.set_text(if i % 2 == 0 { &a } else { &b });
            }
            DONE.store(true, StdOrdering::Release);
        });

        let mut seen = 0;
        while !DONE.load(StdOrdering::Acquire) || HANDOFF.is_pending() {
            if let Some(text) = HANDOFF.claim() {
                let first = text.as_bytes().first().copied();
                assert!(text.len() == 300);
                assert!(text.bytes().all(|b| Some(b) == first));
                seen += 1;
            }
        }
        writer.join().unwrap();
        assert!(seen > 0);
    }
}
