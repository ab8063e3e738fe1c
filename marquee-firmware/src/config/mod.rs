//! Configuration loading
//!
//! The configuration is `sign.toml`, compiled into the image. It is
//! already checked by `build.rs`; this reads it with the core's line
//! reader and validates the result against the engine's budgets.

use defmt::*;

use marquee_core::config::{parse_config, SignConfig};
use marquee_core::EngineConfig;

/// Embedded configuration (compiled into firmware)
/// Edit sign.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../sign.toml");

/// A configuration that passed validation
pub struct LoadedConfig {
    pub sign: SignConfig,
    pub engine: EngineConfig,
}

/// Load and validate the embedded configuration
///
/// Falls back to the built-in defaults if the file fails to parse or
/// describes a schedule that cannot run.
pub fn load() -> LoadedConfig {
    let parsed = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => Some(config),
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            None
        }
    };

    if let Some(sign) = parsed {
        match sign.engine_config() {
            Ok(engine) => {
                info!("Parsed embedded configuration successfully");
                return LoadedConfig { sign, engine };
            }
            Err(e) => error!("Embedded config rejected: {}", e),
        }
    }

    warn!("Using built-in default configuration");
    let sign = SignConfig::default();
    let engine = unwrap!(sign.engine_config());
    LoadedConfig { sign, engine }
}
