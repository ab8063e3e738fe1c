//! Board-agnostic display engine for the Marquee scrolling LED sign
//!
//! This crate contains everything that drives the sign except the chip
//! specifics:
//!
//! - Packed 1-bit canvas and the wrap-around scroll engine
//! - Text measurement and rendering over a glyph source
//! - Panel layout (shift-register padding per module)
//! - Timebase math and the counting tick notifier
//! - Lock-free content handoff from the control path
//! - Single-slot transmission channel
//! - The row multiplexing state machine
//! - Configuration types, validation and parsing
//!
//! Hardware is reached only through the `marquee-hal` traits, so the whole
//! engine runs under host tests.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod canvas;
pub mod channel;
pub mod config;
pub mod control;
pub mod engine;
pub mod handoff;
pub mod layout;
pub mod scroll;
pub mod text;
pub mod tick;
pub mod timing;

#[cfg(test)]
mod testutil;

pub use canvas::{Canvas, CanvasError};
pub use channel::{TransmitChannel, MAX_ROW_BYTES};
pub use config::{ConfigError, SignConfig};
pub use control::SignControl;
pub use engine::{Engine, EngineConfig, EngineStats, Phase, RebuildOutcome};
pub use handoff::{ContentHandoff, HandoffError, TextClaim, MAX_TEXT_LEN};
pub use layout::PanelLayout;
pub use scroll::ScrollDirection;
pub use text::{GlyphSource, MonoGlyphs};
pub use tick::TickNotifier;
pub use timing::{DisplayTiming, ScrollClock};
