//! Marquee Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the display engine is written
//! against. Chip-specific crates implement them; the engine in
//! `marquee-core` only ever sees these traits, which is what lets it run
//! under host tests with recording mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  marquee-firmware (tasks, wiring)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  marquee-core (engine, canvas, scroll)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  marquee-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  marquee-hal-rp2040                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output lines (row select, output enable)
//! - [`transfer::TransferQueue`] - Single-slot, non-blocking serial output

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod transfer;

pub use gpio::{Line, OutputPin, RowAddress, ROW_ADDRESS_BITS};
pub use transfer::{QueueError, SpiConfig, TransferQueue};
