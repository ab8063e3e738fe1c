//! Serial output abstractions
//!
//! The sign shifts row data out over a serial bus with DMA. The engine
//! never waits on the bus: it queues one transfer into a single slot and
//! comes back a fixed number of ticks later.

/// Errors reported by a transfer queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// The single queue slot still holds an unfinished transfer
    Busy,
    /// The peripheral reported a fault for a finished transfer
    Bus,
}

/// Single-slot, non-blocking transfer queue
///
/// Implementations own whatever buffer the peripheral reads from;
/// `try_enqueue` copies `data` before returning.
pub trait TransferQueue {
    /// Collect the result of the previous transfer if it has finished
    ///
    /// Returns `None` when nothing has completed since the last call.
    fn reap(&mut self) -> Option<Result<(), QueueError>>;

    /// Queue `data` for transmission without waiting
    ///
    /// Fails with [`QueueError::Busy`] if the slot is occupied.
    fn try_enqueue(&mut self, data: &[u8]) -> Result<(), QueueError>;
}

/// SPI bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity and phase
    pub mode: Mode,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz
            mode: Mode::Mode0,
        }
    }
}

impl SpiConfig {
    /// Time to clock `bits` out of the bus, in microseconds (rounded up)
    pub fn transfer_micros(&self, bits: u32) -> u32 {
        if self.frequency == 0 {
            return u32::MAX;
        }
        let us = (bits as u64 * 1_000_000).div_ceil(self.frequency as u64);
        us.min(u32::MAX as u64) as u32
    }
}

/// Clock polarity and phase, numbered as in shift register datasheets
///
/// Board crates map this onto their own SPI configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Idle low, sample on the rising edge
    Mode0,
    /// Idle low, sample on the falling edge
    Mode1,
    /// Idle high, sample on the falling edge
    Mode2,
    /// Idle high, sample on the rising edge
    Mode3,
}
