//! Public control facade
//!
//! What the outside world (setup code, a future network layer) is allowed
//! to do with a running sign.

use portable_atomic::{AtomicBool, Ordering};

use crate::handoff::{ContentHandoff, HandoffError};

/// Process-lifetime control handle
///
/// Meant to live in a `static` so both the display task and the control
/// path can hold `&'static` references to it.
pub struct SignControl {
    content: ContentHandoff,
    started: AtomicBool,
}

impl SignControl {
    /// Create a stopped sign with the given scroll delay
    pub const fn new(scroll_delay_ms: u32) -> Self {
        Self {
            content: ContentHandoff::new(scroll_delay_ms),
            started: AtomicBool::new(false),
        }
    }

    /// Run `setup` the first time this is called
    ///
    /// Returns `true` if this call ran it. Later calls are no-ops, so a
    /// repeated start never installs a second timer or display task.
    pub fn begin<F: FnOnce()>(&self, setup: F) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            return false;
        }
        setup();
        true
    }

    /// Whether [`begin`](Self::begin) has run
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Request a new message; see [`ContentHandoff::set_text`]
    pub fn set_text(&self, text: &str) -> Result<(), HandoffError> {
        self.content.set_text(text)
    }

    /// Change the scroll delay; zero stops scrolling
    pub fn set_scroll_delay(&self, millis: u32) {
        self.content.set_scroll_delay(millis);
    }

    /// Current scroll delay in milliseconds
    pub fn scroll_delay(&self) -> u32 {
        self.content.scroll_delay()
    }

    /// Whether a message is waiting for the display task
    pub fn is_pending(&self) -> bool {
        self.content.is_pending()
    }

    /// Shared state for the display task
    pub fn content(&self) -> &ContentHandoff {
        &self.content
    }
}
