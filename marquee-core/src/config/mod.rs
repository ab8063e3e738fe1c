//! Sign configuration
//!
//! Typed configuration with defaults for the reference hardware, a
//! validation step that turns it into tick budgets, and a small reader for
//! the embedded `sign.toml`.

pub mod parse;
pub mod types;

pub use parse::{parse_config, parse_pin};
pub use types::*;
