//! Display task
//!
//! Runs the row multiplexing engine, one state per call, waiting on the
//! display tick between states. Nothing in this loop blocks except the
//! tick wait, and nothing is logged per row.

use defmt::*;
use embedded_graphics::mono_font::ascii::FONT_5X7;

use marquee_core::{
    Canvas, Engine, EngineConfig, GlyphSource, MonoGlyphs, Phase, RebuildOutcome, SignControl,
    TickNotifier, TransmitChannel,
};
use marquee_hal::{Line, RowAddress};
use marquee_hal_rp2040::{RpOutput, SpiTransferQueue};

/// Seconds between stats reports
const REPORT_SECS: u32 = 10;

/// Everything the display task owns
pub struct DisplayParts {
    pub sign: &'static SignControl,
    pub ticks: &'static TickNotifier,
    pub config: EngineConfig,
    pub address: RowAddress<RpOutput>,
    pub enable: Line<RpOutput>,
    pub queue: SpiTransferQueue<'static>,
}

type DisplayEngine = Engine<'static, RpOutput, SpiTransferQueue<'static>, SignFont>;

/// The sign's font: 5x7 printable ASCII
///
/// Zero-sized so the engine, and with it this task's future, stays `Send`
/// for the interrupt executor.
#[derive(Clone, Copy)]
struct SignFont;

impl SignFont {
    fn glyphs() -> MonoGlyphs<'static> {
        MonoGlyphs::ascii(&FONT_5X7)
    }
}

impl GlyphSource for SignFont {
    fn height(&self) -> u32 {
        Self::glyphs().height()
    }

    fn advance(&self, c: char) -> Option<u32> {
        Self::glyphs().advance(c)
    }

    fn draw_glyph(&self, canvas: &mut Canvas, c: char, x: i32, y: i32) {
        Self::glyphs().draw_glyph(canvas, c, x, y)
    }
}

#[embassy_executor::task]
pub async fn display_task(parts: DisplayParts) {
    let DisplayParts {
        sign,
        ticks,
        config,
        address,
        enable,
        queue,
    } = parts;

    let timing = config.timing;

    // The panel stays dark until the first canvas fits in the heap
    let canvas = loop {
        match DisplayEngine::blank_canvas(&config) {
            Ok(canvas) => break canvas,
            Err(e) => {
                error!("Display canvas allocation failed: {}; retrying", e);
                ticks.tick(timing.ticks_per_frame()).await;
            }
        }
    };

    let channel = TransmitChannel::new(queue);
    let mut engine: DisplayEngine = Engine::with_canvas(
        sign.content(),
        SignFont,
        config,
        address,
        enable,
        channel,
        canvas,
    );

    let report_every = timing.ticks_for_millis(REPORT_SECS * 1000);
    info!(
        "Display task started: {} rows, {} ticks/frame, {} ticks/row transmit",
        timing.rows(),
        timing.ticks_per_frame(),
        timing.ticks_per_transmit()
    );

    // Start on a clean tick boundary
    while ticks.try_take() {}
    let mut last_report = ticks.now();

    loop {
        let wait = engine.step(ticks.now());

        if let Some(outcome) = engine.take_rebuild() {
            match outcome {
                RebuildOutcome::Applied { width, text_len } => {
                    info!("New text: {} bytes, canvas {} px wide", text_len, width)
                }
                RebuildOutcome::Refused(e) => {
                    warn!("New text refused, keeping previous canvas: {}", e)
                }
            }
        }

        if engine.phase() == Phase::RenderFrame {
            let now = ticks.now();
            if now.wrapping_sub(last_report) >= report_every {
                last_report = now;
                let stats = engine.stats();
                debug!(
                    "frames={} scroll_steps={} dropped_rows={} bus_faults={} refused={}",
                    stats.frames,
                    stats.scroll_steps,
                    stats.dropped_rows,
                    engine.bus_faults(),
                    stats.refused_rebuilds
                );
            }
        }

        ticks.tick(wait).await;
    }
}
