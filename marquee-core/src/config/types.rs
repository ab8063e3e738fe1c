//! Configuration type definitions
//!
//! These types describe one sign: panel geometry, timing, scroll behaviour,
//! pin assignment and the initial message. Defaults describe the reference
//! seven-row, seven-module hardware.

use heapless::{String, Vec};

use marquee_hal::{SpiConfig, ROW_ADDRESS_BITS};

use crate::channel::MAX_ROW_BYTES;
use crate::engine::EngineConfig;
use crate::layout::PanelLayout;
use crate::scroll::ScrollDirection;
use crate::timing::DisplayTiming;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum length of the configured initial message
pub const MAX_MESSAGE_LEN: usize = 256;

/// Maximum length of one rotation entry
pub const MAX_ROTATE_LEN: usize = 64;

/// Maximum rotation entries
pub const MAX_ROTATE: usize = 4;

/// Highest usable GPIO number (RP2040 bank 0)
pub const MAX_GPIO: u8 = 29;

/// Row address lines can select at most this many rows
pub const MAX_ROWS: u8 = 1 << ROW_ADDRESS_BITS;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Tick interval is zero
    ZeroTickInterval,
    /// Frame rate is zero
    ZeroFrameRate,
    /// Row count outside `1..=MAX_ROWS`
    InvalidRows(u8),
    /// Transmission budget is zero ticks
    ZeroTransmitTicks,
    /// All rows do not fit in one frame period
    FrameBudgetExceeded {
        /// Ticks needed for all rows
        row_budget: u32,
        /// Ticks available per frame
        frame_budget: u32,
    },
    /// Zero modules or columns, or fewer outputs than columns
    InvalidGeometry,
    /// A row does not fit in the transmission buffer
    RowTooWide {
        /// Bytes needed per row
        bytes: usize,
    },
    /// Pin number outside the GPIO bank
    InvalidPin(u8),
    /// The same GPIO is assigned twice
    DuplicatePin(u8),
    /// The config text could not be parsed
    Parse {
        /// 1-based line number
        line: u16,
    },
}

/// GPIO assignment with polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO number
    pub pin: u8,
    /// Pin is active-low
    pub inverted: bool,
}

impl PinConfig {
    /// Active-high pin
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Active-low pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

/// Panel geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelConfig {
    /// Multiplexed rows
    pub rows: u8,
    /// Modules in the chain
    pub modules: u16,
    /// LED columns per module
    pub columns_per_module: u16,
    /// Shift-register outputs per module
    pub outputs_per_module: u16,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let layout = PanelLayout::default();
        Self {
            rows: 7,
            modules: layout.modules,
            columns_per_module: layout.columns_per_module,
            outputs_per_module: layout.outputs_per_module,
        }
    }
}

/// Timebase settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Periodic timer interval in microseconds
    pub tick_interval_us: u32,
    /// Target refresh rate
    pub target_fps: u32,
    /// Serial clock for row data
    pub spi_hz: u32,
    /// Ticks reserved per row transmission; derived from `spi_hz` if unset
    pub ticks_per_transmit: Option<u32>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_us: 300,
            target_fps: 60,
            spi_hz: SpiConfig::default().frequency,
            ticks_per_transmit: None,
        }
    }
}

/// Scroll behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScrollConfig {
    /// Milliseconds per one-pixel step; zero disables scrolling
    pub delay_ms: u32,
    /// Direction of travel
    pub direction: ScrollDirection,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            delay_ms: 50,
            direction: ScrollDirection::Left,
        }
    }
}

/// Control lines of the panel
///
/// Serial clock and data are fixed by the board's SPI peripheral and not
/// listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinMap {
    /// Shift-register latch (SPI chip select)
    pub cs: PinConfig,
    /// Output enable
    pub oe: PinConfig,
    /// Row address lines, bit 0 first
    pub row: [PinConfig; ROW_ADDRESS_BITS],
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            cs: PinConfig::inverted(7),
            oe: PinConfig::inverted(0),
            row: [PinConfig::new(1), PinConfig::new(2), PinConfig::new(3)],
        }
    }
}

impl PinMap {
    /// Every assigned pin, control lines first
    pub fn iter(&self) -> impl Iterator<Item = &PinConfig> {
        [&self.cs, &self.oe].into_iter().chain(self.row.iter())
    }
}

/// Messages shown by the control path
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageConfig {
    /// Text applied at startup
    pub text: String<MAX_MESSAGE_LEN>,
    /// Messages cycled through after startup
    pub rotate: Vec<String<MAX_ROTATE_LEN>, MAX_ROTATE>,
    /// Seconds per rotation entry; zero disables rotation
    pub rotate_secs: u32,
}

impl Default for MessageConfig {
    fn default() -> Self {
        let mut text = String::new();
        let _ = text.push_str("Hello");
        Self {
            text,
            rotate: Vec::new(),
            rotate_secs: 0,
        }
    }
}

/// Complete sign configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignConfig {
    pub panel: PanelConfig,
    pub timing: TimingConfig,
    pub scroll: ScrollConfig,
    pub pins: PinMap,
    pub message: MessageConfig,
}

impl SignConfig {
    /// Module chain geometry
    pub fn layout(&self) -> PanelLayout {
        PanelLayout {
            modules: self.panel.modules,
            columns_per_module: self.panel.columns_per_module,
            outputs_per_module: self.panel.outputs_per_module,
        }
    }

    /// Serial bus settings for row data
    pub fn spi(&self) -> SpiConfig {
        SpiConfig {
            frequency: self.timing.spi_hz,
            ..SpiConfig::default()
        }
    }

    /// Ticks reserved per row transmission
    pub fn ticks_per_transmit(&self) -> u32 {
        self.timing.ticks_per_transmit.unwrap_or_else(|| {
            DisplayTiming::transmit_ticks(
                self.layout().output_bits(),
                &self.spi(),
                self.timing.tick_interval_us,
            )
        })
    }

    /// Check the whole configuration and compute tick budgets
    pub fn validate(&self) -> Result<DisplayTiming, ConfigError> {
        let panel = &self.panel;
        if panel.rows == 0 || panel.rows > MAX_ROWS {
            return Err(ConfigError::InvalidRows(panel.rows));
        }
        if panel.modules == 0
            || panel.columns_per_module == 0
            || panel.outputs_per_module < panel.columns_per_module
        {
            return Err(ConfigError::InvalidGeometry);
        }

        let bytes = self.layout().row_bytes();
        if bytes > MAX_ROW_BYTES {
            return Err(ConfigError::RowTooWide { bytes });
        }

        self.validate_pins()?;

        DisplayTiming::new(
            self.timing.tick_interval_us,
            self.timing.target_fps,
            panel.rows,
            self.ticks_per_transmit(),
        )
    }

    /// Validate and collect everything the display engine needs
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        Ok(EngineConfig {
            layout: self.layout(),
            timing: self.validate()?,
            direction: self.scroll.direction,
        })
    }

    fn validate_pins(&self) -> Result<(), ConfigError> {
        let mut seen: u32 = 0;
        for pin in self.pins.iter() {
            if pin.pin > MAX_GPIO {
                return Err(ConfigError::InvalidPin(pin.pin));
            }
            let bit = 1u32 << pin.pin;
            if seen & bit != 0 {
                return Err(ConfigError::DuplicatePin(pin.pin));
            }
            seen |= bit;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_hardware() {
        let config = SignConfig::default();
        let layout = config.layout();
        assert_eq!(layout.width(), 420);
        assert_eq!(layout.row_bytes(), 56);
        assert_eq!(config.scroll.delay_ms, 50);
        assert_eq!(config.message.text.as_str(), "Hello");

        // 448 bits at 1 MHz need two 300 us ticks
        assert_eq!(config.ticks_per_transmit(), 2);
        let timing = config.validate().unwrap();
        assert_eq!(timing.ticks_per_frame(), 55);
        assert_eq!(timing.row_budget(), 21);
    }

    #[test]
    fn test_explicit_transmit_ticks() {
        let mut config = SignConfig::default();
        config.timing.ticks_per_transmit = Some(3);
        let timing = config.validate().unwrap();
        assert_eq!(timing.row_budget(), 28);
        assert_eq!(timing.frame_gap(), 27);
    }

    #[test]
    fn test_slow_bus_exceeds_frame_budget() {
        let mut config = SignConfig::default();
        // 448 us per bit-row at 100 kHz is 4480 us, 15 ticks, 16 per row
        config.timing.spi_hz = 100_000;
        assert_eq!(
            config.validate(),
            Err(ConfigError::FrameBudgetExceeded {
                row_budget: 112,
                frame_budget: 55
            })
        );
    }

    #[test]
    fn test_stopped_bus_exceeds_frame_budget() {
        let mut config = SignConfig::default();
        config.timing.spi_hz = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::FrameBudgetExceeded {
                row_budget: u32::MAX,
                frame_budget: 55
            })
        );
    }

    #[test]
    fn test_rows_limited_by_address_lines() {
        let mut config = SignConfig::default();
        config.panel.rows = 9;
        assert_eq!(config.validate(), Err(ConfigError::InvalidRows(9)));
        config.panel.rows = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidRows(0)));
    }

    #[test]
    fn test_geometry_checks() {
        let mut config = SignConfig::default();
        config.panel.outputs_per_module = 50;
        assert_eq!(config.validate(), Err(ConfigError::InvalidGeometry));

        let mut config = SignConfig::default();
        config.panel.modules = 9;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RowTooWide { bytes: 72 })
        );
    }

    #[test]
    fn test_pin_checks() {
        let mut config = SignConfig::default();
        config.pins.row[2] = PinConfig::new(7);
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(7)));

        let mut config = SignConfig::default();
        config.pins.oe = PinConfig::inverted(30);
        assert_eq!(config.validate(), Err(ConfigError::InvalidPin(30)));
    }

    #[test]
    fn test_engine_config_carries_direction() {
        let mut config = SignConfig::default();
        config.scroll.direction = ScrollDirection::Right;
        let engine = config.engine_config().unwrap();
        assert_eq!(engine.direction, ScrollDirection::Right);
        assert_eq!(engine.layout, config.layout());
    }
}
