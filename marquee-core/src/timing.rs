//! Timebase arithmetic
//!
//! Everything on the real-time path is counted in ticks of the periodic
//! timer. This module turns the configured rates into tick budgets and
//! keeps the scroll cadence locked to the tick count.

use marquee_hal::SpiConfig;

use crate::config::ConfigError;

/// Tick budgets for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayTiming {
    tick_interval_us: u32,
    rows: u8,
    ticks_per_transmit: u32,
    ticks_per_frame: u32,
}

impl DisplayTiming {
    /// Compute budgets, refusing a schedule that cannot fit in a frame
    pub fn new(
        tick_interval_us: u32,
        target_fps: u32,
        rows: u8,
        ticks_per_transmit: u32,
    ) -> Result<Self, ConfigError> {
        if tick_interval_us == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if target_fps == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        if rows == 0 {
            return Err(ConfigError::InvalidRows(rows));
        }
        if ticks_per_transmit == 0 {
            return Err(ConfigError::ZeroTransmitTicks);
        }

        let ticks_per_frame = 1_000_000 / target_fps / tick_interval_us;

        // Overflowing u32 can never fit a frame
        let row_budget = ticks_per_transmit
            .checked_add(1)
            .and_then(|row| row.checked_mul(rows as u32))
            .unwrap_or(u32::MAX);
        if row_budget > ticks_per_frame {
            return Err(ConfigError::FrameBudgetExceeded {
                row_budget,
                frame_budget: ticks_per_frame,
            });
        }

        Ok(Self {
            tick_interval_us,
            rows,
            ticks_per_transmit,
            ticks_per_frame,
        })
    }

    /// Ticks needed to shift `bits` out over `spi`, at least one
    pub fn transmit_ticks(bits: u32, spi: &SpiConfig, tick_interval_us: u32) -> u32 {
        if spi.frequency == 0 || tick_interval_us == 0 {
            return u32::MAX;
        }
        spi.transfer_micros(bits)
            .div_ceil(tick_interval_us)
            .max(1)
    }

    /// Timer period in microseconds
    pub fn tick_interval_us(&self) -> u32 {
        self.tick_interval_us
    }

    /// Multiplexed rows
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Ticks reserved for one row transmission
    pub fn ticks_per_transmit(&self) -> u32 {
        self.ticks_per_transmit
    }

    /// Ticks in one frame period
    pub fn ticks_per_frame(&self) -> u32 {
        self.ticks_per_frame
    }

    /// Ticks spent per row: transmit wait plus the enable pulse
    ///
    /// Cannot overflow: [`DisplayTiming::new`] only accepts budgets that
    /// fit in a frame.
    pub fn row_ticks(&self) -> u32 {
        self.ticks_per_transmit + 1
    }

    /// Ticks spent on all rows of a frame
    pub fn row_budget(&self) -> u32 {
        self.rows as u32 * self.row_ticks()
    }

    /// Idle ticks after the last row, clamped to zero
    pub fn frame_gap(&self) -> u32 {
        self.ticks_per_frame.saturating_sub(self.row_budget())
    }

    /// Ticks in `millis` milliseconds, rounded up
    pub fn ticks_for_millis(&self, millis: u32) -> u32 {
        let us = millis as u64 * 1000;
        us.div_ceil(self.tick_interval_us as u64).min(u32::MAX as u64) as u32
    }
}

/// Drift-free scroll cadence
///
/// Remembers the tick of the last step and advances it by exactly one
/// scroll period each time a step is taken, so a late check does not push
/// the next step later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollClock {
    last_tick: u32,
}

impl ScrollClock {
    /// Start counting from `now`
    pub const fn starting_at(now: u32) -> Self {
        Self { last_tick: now }
    }

    /// Restart the cadence at `now`
    pub fn reset(&mut self, now: u32) {
        self.last_tick = now;
    }

    /// Tick of the last step
    pub fn last_tick(&self) -> u32 {
        self.last_tick
    }

    /// Check whether a step is due at `now`, taking it if so
    ///
    /// A delay of zero disables scrolling. Tick counts wrap.
    pub fn poll(&mut self, now: u32, delay_ms: u32, timing: &DisplayTiming) -> bool {
        if delay_ms == 0 {
            self.last_tick = now;
            return false;
        }

        let elapsed = now.wrapping_sub(self.last_tick);
        let elapsed_us = elapsed as u64 * timing.tick_interval_us() as u64;
        if elapsed_us < delay_ms as u64 * 1000 {
            return false;
        }

        let period = timing.ticks_for_millis(delay_ms);
        if elapsed >= period.saturating_mul(2) {
            // More than one step behind (stall or shortened delay): resync
            // rather than scroll in a burst
            self.last_tick = now;
        } else {
            self.last_tick = self.last_tick.wrapping_add(period);
        }
        true
    }
}
