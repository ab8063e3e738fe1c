//! Row multiplexing display engine
//!
//! Drives one row at a time and rotates through all rows fast enough that
//! the panel looks fully lit. Each call to [`Engine::step`] performs one
//! state's worth of output and returns how many ticks to wait before the
//! next call; the caller does the waiting.
//!
//! ```text
//!  RenderFrame ─▶ SelectRow ─▶ Enable ─▶ Disable ─┬─▶ SelectRow (next row)
//!       ▲      (transmit,     (1 tick)            │
//!       │       k ticks)                          ▼
//!       └──────────────── MaybeScroll ◀──── FrameGap
//! ```
//!
//! New text is only picked up in `RenderFrame`, between frames, so a row
//! is never drawn from a half-built canvas.

use marquee_hal::{Line, OutputPin, RowAddress, TransferQueue};

use crate::canvas::{Canvas, CanvasError};
use crate::channel::{TransmitChannel, MAX_ROW_BYTES};
use crate::handoff::ContentHandoff;
use crate::layout::PanelLayout;
use crate::scroll::{self, ScrollDirection};
use crate::text::{self, GlyphSource};
use crate::timing::{DisplayTiming, ScrollClock};

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Start of a frame; rebuild the canvas if a message is pending
    RenderFrame,
    /// Address the current row and start its transmission
    SelectRow,
    /// Transmission budget elapsed; light the row
    Enable,
    /// Enable pulse elapsed; blank the row
    Disable,
    /// All rows shown; idle out the rest of the frame period
    FrameGap,
    /// Take a scroll step if one is due
    MaybeScroll,
}

/// Static engine parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Module chain geometry
    pub layout: PanelLayout,
    /// Tick budgets
    pub timing: DisplayTiming,
    /// Scroll direction
    pub direction: ScrollDirection,
}

/// Result of picking up a new message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RebuildOutcome {
    /// The canvas was replaced
    Applied {
        /// New canvas width in pixels
        width: u32,
        /// Message length in bytes
        text_len: usize,
    },
    /// The canvas could not be allocated; the previous one stays
    Refused(CanvasError),
}

/// Running counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineStats {
    /// Completed frames
    pub frames: u32,
    /// Scroll steps taken
    pub scroll_steps: u32,
    /// Rows dropped because the transfer slot was still busy
    pub dropped_rows: u32,
    /// Messages applied
    pub rebuilds: u32,
    /// Messages refused for lack of memory
    pub refused_rebuilds: u32,
}

/// The display engine
pub struct Engine<'a, P, Q, G, const N: usize = MAX_ROW_BYTES> {
    handoff: &'a ContentHandoff,
    font: G,
    config: EngineConfig,
    address: RowAddress<P>,
    enable: Line<P>,
    channel: TransmitChannel<Q, N>,
    canvas: Canvas,
    phase: Phase,
    row: u8,
    frame_ticks: u32,
    scroll: ScrollClock,
    stats: EngineStats,
    last_rebuild: Option<RebuildOutcome>,
}

impl<'a, P, Q, G, const N: usize> Engine<'a, P, Q, G, N>
where
    P: OutputPin,
    Q: TransferQueue,
    G: GlyphSource,
{
    /// Create an engine showing a blank panel
    pub fn new(
        handoff: &'a ContentHandoff,
        font: G,
        config: EngineConfig,
        address: RowAddress<P>,
        enable: Line<P>,
        channel: TransmitChannel<Q, N>,
    ) -> Result<Self, CanvasError> {
        let canvas = Self::blank_canvas(&config)?;
        Ok(Self::with_canvas(
            handoff, font, config, address, enable, channel, canvas,
        ))
    }

    /// Allocate the blank canvas shown before any message arrives
    pub fn blank_canvas(config: &EngineConfig) -> Result<Canvas, CanvasError> {
        Canvas::new(blank_width(&config.layout), config.timing.rows() as u32)
    }

    /// Create an engine around an already allocated canvas
    pub fn with_canvas(
        handoff: &'a ContentHandoff,
        font: G,
        config: EngineConfig,
        address: RowAddress<P>,
        enable: Line<P>,
        channel: TransmitChannel<Q, N>,
        canvas: Canvas,
    ) -> Self {
        let mut engine = Self {
            handoff,
            font,
            config,
            address,
            enable,
            channel,
            canvas,
            phase: Phase::RenderFrame,
            row: 0,
            frame_ticks: 0,
            scroll: ScrollClock::default(),
            stats: EngineStats::default(),
            last_rebuild: None,
        };
        engine.enable.deactivate();
        engine
    }

    /// Run the current state and return the ticks to wait before the next
    pub fn step(&mut self, now: u32) -> u32 {
        let timing = self.config.timing;

        match self.phase {
            Phase::RenderFrame => {
                self.rebuild(now);
                self.row = 0;
                self.frame_ticks = 0;
                self.phase = Phase::SelectRow;
                0
            }
            Phase::SelectRow => {
                self.enable.deactivate();
                self.address.select(self.row);
                let row = self.canvas.row(self.row as u32);
                self.channel.send_row(&self.config.layout, row);
                self.phase = Phase::Enable;
                self.consume(timing.ticks_per_transmit())
            }
            Phase::Enable => {
                self.enable.activate();
                self.phase = Phase::Disable;
                self.consume(1)
            }
            Phase::Disable => {
                self.enable.deactivate();
                self.row += 1;
                self.phase = if self.row < timing.rows() {
                    Phase::SelectRow
                } else {
                    Phase::FrameGap
                };
                0
            }
            Phase::FrameGap => {
                self.phase = Phase::MaybeScroll;
                let gap = timing.ticks_per_frame().saturating_sub(self.frame_ticks);
                self.consume(gap)
            }
            Phase::MaybeScroll => {
                let delay = self.handoff.scroll_delay();
                if self.scroll.poll(now, delay, &timing) {
                    scroll::shift(&mut self.canvas, self.config.direction);
                    self.stats.scroll_steps = self.stats.scroll_steps.wrapping_add(1);
                }
                self.stats.frames = self.stats.frames.wrapping_add(1);
                self.phase = Phase::RenderFrame;
                0
            }
        }
    }

    /// Current state
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Row being driven
    pub fn row(&self) -> u8 {
        self.row
    }

    /// The canvas being shown
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Running counters
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            dropped_rows: self.channel.dropped(),
            ..self.stats
        }
    }

    /// Rows dropped because the transfer slot was still busy
    pub fn dropped_rows(&self) -> u32 {
        self.channel.dropped()
    }

    /// Finished transfers that reported a bus fault
    pub fn bus_faults(&self) -> u32 {
        self.channel.faults()
    }

    /// Outcome of the most recent message pickup, once
    pub fn take_rebuild(&mut self) -> Option<RebuildOutcome> {
        self.last_rebuild.take()
    }

    /// Access the transmission channel
    pub fn channel(&self) -> &TransmitChannel<Q, N> {
        &self.channel
    }

    /// Access the output enable line
    pub fn enable_line(&self) -> &Line<P> {
        &self.enable
    }

    fn consume(&mut self, ticks: u32) -> u32 {
        self.frame_ticks = self.frame_ticks.saturating_add(ticks);
        ticks
    }

    fn rebuild(&mut self, now: u32) {
        let handoff = self.handoff;
        let Some(text) = handoff.claim() else {
            return;
        };

        let rows = self.config.timing.rows() as u32;
        let canvas = text::measure(&self.font, &text)
            .max(self.config.layout.width())
            .checked_next_multiple_of(8)
            .ok_or(CanvasError::TooLarge)
            .and_then(|width| Canvas::new(width, rows));

        let outcome = match canvas {
            Ok(mut canvas) => {
                text::render(&mut canvas, &self.font, &text);
                let width = canvas.width();
                self.canvas = canvas;
                self.scroll.reset(now);
                self.stats.rebuilds = self.stats.rebuilds.wrapping_add(1);
                RebuildOutcome::Applied {
                    width,
                    text_len: text.len(),
                }
            }
            Err(e) => {
                self.stats.refused_rebuilds = self.stats.refused_rebuilds.wrapping_add(1);
                RebuildOutcome::Refused(e)
            }
        };
        self.last_rebuild = Some(outcome);
        // Dropping the claim releases the handoff for the next message
        drop(text);
    }
}

/// Width of the canvas shown before any message arrives
fn blank_width(layout: &PanelLayout) -> u32 {
    layout.width().next_multiple_of(8)
}
