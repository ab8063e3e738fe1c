//! SPI + DMA transfer queue
//!
//! The display task must never wait on the bus, but `embassy-rp` SPI
//! writes are async. The two are joined by a [`TransferLink`]: the
//! display side ([`SpiTransferQueue`]) drops a row into a one-slot
//! channel and returns; a separate driver loop ([`TransferLink::run`])
//! shifts it out with DMA, pulses the latch, and signals completion.
//!
//! ```text
//!  display task ──try_send──▶ [ 1 row ] ──receive──▶ driver loop ──DMA──▶ SPI
//!       ▲                                                 │
//!       └───────────── try_take ◀── done signal ◀─────────┘
//! ```

use embassy_rp::spi::{Async, Instance, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use marquee_hal::{Line, OutputPin, QueueError, TransferQueue};

/// Largest row the link carries
pub const MAX_TRANSFER: usize = 64;

/// One queued row
#[derive(Clone)]
pub struct RowBuffer {
    data: heapless::Vec<u8, MAX_TRANSFER>,
}

impl RowBuffer {
    /// Copy up to [`MAX_TRANSFER`] bytes
    pub fn from_slice(data: &[u8]) -> Self {
        let len = data.len().min(MAX_TRANSFER);
        let mut buf = heapless::Vec::new();
        // Cannot fail: len <= capacity
        let _ = buf.extend_from_slice(&data[..len]);
        Self { data: buf }
    }

    /// Bytes to shift out
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Shared state between the display side and the bus driver loop
pub struct TransferLink {
    rows: Channel<CriticalSectionRawMutex, RowBuffer, 1>,
    done: Signal<CriticalSectionRawMutex, Result<(), QueueError>>,
}

impl Default for TransferLink {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferLink {
    /// Create an idle link
    pub const fn new() -> Self {
        Self {
            rows: Channel::new(),
            done: Signal::new(),
        }
    }

    /// Display-side handle
    pub fn queue(&self) -> SpiTransferQueue<'_> {
        SpiTransferQueue {
            link: self,
            in_flight: false,
        }
    }

    /// Bus driver loop; run it from its own task
    ///
    /// `latch` is the shift-register strobe (SPI chip select). It is held
    /// active while the row is clocked out and released afterwards; the
    /// release edge latches the data into the output registers.
    pub async fn run<'d, T: Instance, P: OutputPin>(
        &self,
        mut spi: Spi<'d, T, Async>,
        mut latch: Line<P>,
    ) -> ! {
        loop {
            let row = self.rows.receive().await;

            latch.activate();
            let result = spi
                .write(row.as_slice())
                .await
                .map_err(|_| QueueError::Bus);
            latch.deactivate();

            self.done.signal(result);
        }
    }
}

/// [`TransferQueue`] over a [`TransferLink`]
pub struct SpiTransferQueue<'a> {
    link: &'a TransferLink,
    in_flight: bool,
}

impl TransferQueue for SpiTransferQueue<'_> {
    fn reap(&mut self) -> Option<Result<(), QueueError>> {
        if !self.in_flight {
            return None;
        }
        let result = self.link.done.try_take()?;
        self.in_flight = false;
        Some(result)
    }

    fn try_enqueue(&mut self, data: &[u8]) -> Result<(), QueueError> {
        if self.in_flight {
            return Err(QueueError::Busy);
        }
        self.link
            .rows
            .try_send(RowBuffer::from_slice(data))
            .map_err(|_| QueueError::Busy)?;
        self.in_flight = true;
        Ok(())
    }
}
