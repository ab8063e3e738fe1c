//! Periodic display tick from a hardware alarm
//!
//! `embassy-rp`'s time driver owns alarm 0; the display tick uses alarm 1
//! of the same 1 MHz timer. Each firing re-arms the alarm one interval
//! after its previous target, not after the time the handler ran, so the
//! tick does not drift with interrupt latency.
//!
//! The firmware defines the `TIMER_IRQ_1` handler and calls
//! [`PeriodicTimer::on_interrupt`] from it.

use embassy_rp::interrupt::{self, InterruptExt, Priority};
use embassy_rp::pac;
use portable_atomic::{AtomicU32, Ordering};

const ALARM: usize = 1;

static INTERVAL_US: AtomicU32 = AtomicU32::new(0);
static TARGET: AtomicU32 = AtomicU32::new(0);

/// Alarm 1 periodic timer
pub struct PeriodicTimer;

impl PeriodicTimer {
    /// Start firing every `interval_us` microseconds at `priority`
    ///
    /// Call once at startup.
    pub fn start(interval_us: u32, priority: Priority) {
        let timer = pac::TIMER;
        INTERVAL_US.store(interval_us, Ordering::Relaxed);

        let target = timer.timerawl().read().wrapping_add(interval_us);
        TARGET.store(target, Ordering::Relaxed);

        timer.intr().write(|w| w.set_alarm(ALARM, true));
        timer.inte().modify(|w| w.set_alarm(ALARM, true));
        timer.alarm(ALARM).write_value(target);

        interrupt::TIMER_IRQ_1.set_priority(priority);
        // SAFETY: the handler only touches this module's statics and the
        // caller's tick notifier, both interrupt-safe.
        unsafe { interrupt::TIMER_IRQ_1.enable() };
    }

    /// Acknowledge the alarm and arm the next period
    ///
    /// Returns `true` when the alarm had actually fired.
    pub fn on_interrupt() -> bool {
        let timer = pac::TIMER;
        if !timer.ints().read().alarm(ALARM) {
            return false;
        }
        timer.intr().write(|w| w.set_alarm(ALARM, true));

        let interval = INTERVAL_US.load(Ordering::Relaxed);
        let now = timer.timerawl().read();
        let mut target = TARGET.load(Ordering::Relaxed).wrapping_add(interval);
        // Already in the past (handler held off for over a period): skip
        // ahead instead of firing back to back
        if (target.wrapping_sub(now) as i32) <= 0 {
            target = now.wrapping_add(interval);
        }
        TARGET.store(target, Ordering::Relaxed);
        timer.alarm(ALARM).write_value(target);
        true
    }
}
