//! Control task
//!
//! Low-priority stand-in for an outside controller: applies the
//! configured message and scroll delay through [`SignControl`], then
//! optionally cycles through the rotation list.

use defmt::*;
use embassy_time::{Duration, Ticker, Timer};

use marquee_core::config::MessageConfig;
use marquee_core::{HandoffError, SignControl};

/// Retry interval while the display task holds the previous message
const BUSY_RETRY_MS: u64 = 20;

#[embassy_executor::task]
pub async fn control_task(sign: &'static SignControl, message: MessageConfig, scroll_delay_ms: u32) {
    info!("Control task started");

    sign.set_scroll_delay(scroll_delay_ms);
    while let Err(HandoffError::Busy) = sign.set_text(&message.text) {
        Timer::after_millis(BUSY_RETRY_MS).await;
    }
    info!("Initial text queued ({} bytes)", message.text.len());

    if message.rotate.is_empty() || message.rotate_secs == 0 {
        return;
    }

    info!(
        "Rotating {} messages every {}s",
        message.rotate.len(),
        message.rotate_secs
    );
    let mut ticker = Ticker::every(Duration::from_secs(message.rotate_secs as u64));
    let mut next = 0;

    loop {
        ticker.next().await;
        let entry = &message.rotate[next];
        match sign.set_text(entry) {
            Ok(()) => {
                debug!("Rotation {}: {}", next, entry.as_str());
                next = (next + 1) % message.rotate.len();
            }
            // Try the same entry again next period
            Err(HandoffError::Busy) => debug!("Sign busy, rotation {} deferred", next),
        }
    }
}
