//! Transmission channel
//!
//! Stages one row at a time in a fixed buffer and hands it to a
//! single-slot [`TransferQueue`]. A send never waits: if the previous
//! transfer is still in flight the row is dropped and counted.

use marquee_hal::TransferQueue;

use crate::layout::PanelLayout;

/// Capacity of the staging buffer (512 shift-register outputs)
pub const MAX_ROW_BYTES: usize = 64;

/// Single-slot, non-blocking row transmitter
pub struct TransmitChannel<Q, const N: usize = MAX_ROW_BYTES> {
    queue: Q,
    buf: [u8; N],
    sent: u32,
    dropped: u32,
    faults: u32,
}

impl<Q: TransferQueue, const N: usize> TransmitChannel<Q, N> {
    /// Wrap a transfer queue
    pub fn new(queue: Q) -> Self {
        Self {
            queue,
            buf: [0; N],
            sent: 0,
            dropped: 0,
            faults: 0,
        }
    }

    /// Queue up to `N` bytes of `data`
    ///
    /// Returns `false` if the row was dropped because the queue was busy.
    pub fn send(&mut self, data: &[u8]) -> bool {
        let len = data.len().min(N);
        self.buf[..len].copy_from_slice(&data[..len]);
        self.submit(len)
    }

    /// Pack a canvas row through `layout` and queue it
    pub fn send_row(&mut self, layout: &PanelLayout, row: &[u8]) -> bool {
        if layout.is_contiguous() && layout.width() as usize == row.len() * 8 {
            return self.send(row);
        }
        let len = layout.pack_row(row, &mut self.buf);
        self.submit(len)
    }

    /// Rows handed to the queue
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Rows dropped because the slot was busy
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Finished transfers that reported a bus fault
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Access the underlying queue
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    fn submit(&mut self, len: usize) -> bool {
        // Free the slot if the previous transfer has finished
        if let Some(Err(_)) = self.queue.reap() {
            self.faults = self.faults.wrapping_add(1);
        }

        match self.queue.try_enqueue(&self.buf[..len]) {
            Ok(()) => {
                self.sent = self.sent.wrapping_add(1);
                true
            }
            Err(_) => {
                self.dropped = self.dropped.wrapping_add(1);
                false
            }
        }
    }
}
