//! Marquee - Scrolling LED Sign Firmware
//!
//! Main firmware binary for RP2040-based sign controllers. Drives a
//! row-multiplexed shift-register LED matrix from a hardware tick and
//! scrolls the configured message across it.
//!
//! Priorities, highest first:
//! - `TIMER_IRQ_1`: display tick, counts and wakes only
//! - `SWI_IRQ_1` interrupt executor: display and row bus tasks
//! - thread executor: control task and heartbeat

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::spi::{self, Spi};
use embedded_alloc::LlffHeap as Heap;
use {defmt_rtt as _, panic_probe as _};

use marquee_core::config::SignConfig;
use marquee_core::{SignControl, TickNotifier};
use marquee_hal::transfer::Mode;
use marquee_hal::{Line, RowAddress};
use marquee_hal_rp2040::{PeriodicTimer, PinBank, PinError, RpOutput, TransferLink};

use crate::tasks::DisplayParts;

// Heap allocator for the message canvas
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 64KB (a 4096-byte message in 5x7 needs ~22KB, twice during a rebuild)
const HEAP_SIZE: usize = 64 * 1024;

mod config;
mod tasks;

/// Public control handle, shared by every task
static SIGN: SignControl = SignControl::new(50);

/// Display tick, fired from `TIMER_IRQ_1`
static TICKS: TickNotifier = TickNotifier::new();

/// Row hand-over between the display task and the bus task
static TRANSFER: TransferLink = TransferLink::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[interrupt]
fn TIMER_IRQ_1() {
    if PeriodicTimer::on_interrupt() {
        TICKS.fire();
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Marquee firmware starting...");

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let loaded = config::load();
    let config = loaded.sign;
    let engine = loaded.engine;
    info!(
        "Panel: {} rows x {} px, {} bytes per row",
        engine.timing.rows(),
        engine.layout.width(),
        engine.layout.row_bytes()
    );

    // Row data bus: SPI0 on its fixed pins, TX-only with DMA
    let spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, spi_config(&config));

    let mut bank = marquee_hal_rp2040::pin_bank!(p);
    let (address, enable, latch) = match take_control_pins(&mut bank, &config) {
        Ok(pins) => pins,
        Err(e) => {
            error!("Pin setup failed: {}; display disabled", e);
            return;
        }
    };
    info!("Pins initialized");

    let started = SIGN.begin(|| {
        interrupt::SWI_IRQ_1.set_priority(Priority::P2);
        let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);

        high.spawn(tasks::transfer_task(&TRANSFER, spi, latch)).unwrap();
        high.spawn(tasks::display_task(DisplayParts {
            sign: &SIGN,
            ticks: &TICKS,
            config: engine,
            address,
            enable,
            queue: TRANSFER.queue(),
        }))
        .unwrap();

        // Above the executor so a busy display task never delays a tick
        PeriodicTimer::start(engine.timing.tick_interval_us(), Priority::P1);
    });
    if !started {
        warn!("Display already started");
    }

    spawner
        .spawn(tasks::control_task(
            &SIGN,
            config.message.clone(),
            config.scroll.delay_ms,
        ))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// SPI settings for the row data bus
fn spi_config(config: &SignConfig) -> spi::Config {
    let bus = config.spi();
    let mut cfg = spi::Config::default();
    cfg.frequency = bus.frequency;
    (cfg.polarity, cfg.phase) = match bus.mode {
        Mode::Mode0 => (spi::Polarity::IdleLow, spi::Phase::CaptureOnFirstTransition),
        Mode::Mode1 => (spi::Polarity::IdleLow, spi::Phase::CaptureOnSecondTransition),
        Mode::Mode2 => (spi::Polarity::IdleHigh, spi::Phase::CaptureOnFirstTransition),
        Mode::Mode3 => (spi::Polarity::IdleHigh, spi::Phase::CaptureOnSecondTransition),
    };
    cfg
}

/// Claim the row address, output enable and latch lines from `sign.toml`
fn take_control_pins(
    bank: &mut PinBank,
    config: &SignConfig,
) -> Result<(RowAddress<RpOutput>, Line<RpOutput>, Line<RpOutput>), PinError> {
    let pins = &config.pins;

    // Output enable first, so the panel is dark before anything else moves
    let enable = RpOutput::line(bank, pins.oe.pin, pins.oe.inverted)?;
    let latch = RpOutput::line(bank, pins.cs.pin, pins.cs.inverted)?;

    let row = |bank: &mut PinBank, i: usize| {
        let pin = pins.row[i];
        RpOutput::take(bank, pin.pin, pin.inverted)
    };
    let address = RowAddress::new([row(bank, 0)?, row(bank, 1)?, row(bank, 2)?]);

    Ok((address, enable, latch))
}
