//! Test doubles for the HAL traits and a trivial font

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use marquee_hal::{OutputPin, QueueError, TransferQueue};

use crate::canvas::Canvas;
use crate::text::GlyphSource;

/// Something the engine did to the hardware
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwEvent {
    /// Named pin driven to a level
    Pin(&'static str, bool),
    /// Bytes handed to the transfer queue
    Transfer(Vec<u8>),
}

/// Shared, ordered hardware event log
#[derive(Debug, Clone, Default)]
pub struct Log(Rc<RefCell<Vec<HwEvent>>>);

impl Log {
    pub fn push(&self, event: HwEvent) {
        self.0.borrow_mut().push(event);
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn take(&self) -> Vec<HwEvent> {
        core::mem::take(&mut *self.0.borrow_mut())
    }
}

/// Output pin that remembers its level and optionally logs changes
#[derive(Debug)]
pub struct RecordingPin {
    name: &'static str,
    high: bool,
    log: Option<Log>,
}

impl RecordingPin {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            high: false,
            log: None,
        }
    }

    pub fn logged(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            high: false,
            log: Some(log.clone()),
        }
    }

    fn record(&mut self, high: bool) {
        self.high = high;
        if let Some(log) = &self.log {
            log.push(HwEvent::Pin(self.name, high));
        }
    }
}

impl OutputPin for RecordingPin {
    fn set_high(&mut self) {
        self.record(true);
    }

    fn set_low(&mut self) {
        self.record(false);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Single-slot queue that records every accepted transfer
///
/// By default a transfer completes as soon as it is reaped.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    transfers: Vec<Vec<u8>>,
    in_flight: bool,
    hold: bool,
    fail_next: Option<QueueError>,
    log: Option<Log>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logged(log: &Log) -> Self {
        Self {
            log: Some(log.clone()),
            ..Self::default()
        }
    }

    /// Never complete transfers: the slot stays busy after the first one
    pub fn hold_completions(&mut self) {
        self.hold = true;
    }

    /// Report `err` for the next completed transfer
    pub fn fail_next(&mut self, err: QueueError) {
        self.fail_next = Some(err);
    }

    pub fn transfers(&self) -> &[Vec<u8>] {
        &self.transfers
    }
}

impl TransferQueue for RecordingQueue {
    fn reap(&mut self) -> Option<Result<(), QueueError>> {
        if !self.in_flight || self.hold {
            return None;
        }
        self.in_flight = false;
        Some(self.fail_next.take().map_or(Ok(()), Err))
    }

    fn try_enqueue(&mut self, data: &[u8]) -> Result<(), QueueError> {
        if self.in_flight {
            return Err(QueueError::Busy);
        }
        self.in_flight = true;
        self.transfers.push(data.to_vec());
        if let Some(log) = &self.log {
            log.push(HwEvent::Transfer(data.to_vec()));
        }
        Ok(())
    }
}

/// Font whose covered glyphs are solid blocks
///
/// Each glyph is `width` pixels wide and `height` tall, followed by a one
/// pixel gap.
#[derive(Debug, Clone, Copy)]
pub struct BlockFont {
    width: u32,
    height: u32,
    first: char,
    last: char,
}

impl BlockFont {
    pub fn new(width: u32, height: u32, first: char, last: char) -> Self {
        Self {
            width,
            height,
            first,
            last,
        }
    }
}

impl GlyphSource for BlockFont {
    fn height(&self) -> u32 {
        self.height
    }

    fn advance(&self, c: char) -> Option<u32> {
        (self.first..=self.last)
            .contains(&c)
            .then_some(self.width + 1)
    }

    fn draw_glyph(&self, canvas: &mut Canvas, c: char, x: i32, y: i32) {
        if self.advance(c).is_none() {
            return;
        }
        let right = (x as i64 + self.width as i64).min(canvas.width() as i64);
        for py in y..y + self.height as i32 {
            for px in x as i64..right {
                canvas.set_pixel(px as i32, py, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_pin_logs_levels() {
        let log = Log::default();
        let mut pin = RecordingPin::logged("oe", &log);
        pin.set_high();
        pin.set_low();
        assert!(!pin.is_set_high());
        assert_eq!(
            log.take(),
            [HwEvent::Pin("oe", true), HwEvent::Pin("oe", false)]
        );
        assert!(!RecordingPin::new("x").is_set_high());
    }
}
