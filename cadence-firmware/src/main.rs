//! Cadence - Activity Recognition Firmware
//!
//! Main firmware binary for RP2040-based wearables with an FXOS8700
//! accelerometer and FXAS21002 gyroscope on I2C0.
//!
//! Two executors split the work by urgency:
//! - the interrupt executor (SWI_IRQ_1) runs the sampling task, which must
//!   start a cycle every period regardless of what else is running
//! - the thread-mode executor runs inference, the presenter and the
//!   shutdown button

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use cadence_core::inference::InputLayout;
use cadence_core::{ConfigError, InferenceGate, PipelineConfig, WindowHandoff};
use cadence_drivers::engine::DenseModel;
use cadence_drivers::sensor::MotionSensor;

use crate::channels::Handoff;
use crate::clock::EmbassyClock;
use crate::tasks::{Gate, Sensor};

mod channels;
mod clock;
mod config;
mod presenter;
mod tasks;

/// Embedded model weights (see cadence-drivers `engine::dense` for the format)
static MODEL: &[u8] = include_bytes!("../model/activity.cdm");

/// I2C clock for both motion sensors
const I2C_FREQUENCY_HZ: u32 = 400_000;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 16]> = StaticCell::new();

static HANDOFF: StaticCell<Handoff> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[entry]
fn main() -> ! {
    info!("Cadence firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = match config::load() {
        Ok(config) => config,
        Err(e) => halt("Configuration rejected", e),
    };

    let gate = match build_gate() {
        Ok(gate) => gate,
        Err(e) => halt("Model rejected", e),
    };
    info!("Model loaded ({} bytes)", MODEL.len());

    // Motion sensors: SDA=GPIO4, SCL=GPIO5
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);

    let mut sensor: Sensor = MotionSensor::new(i2c, EmbassyClock);
    if let Err(e) = sensor.init() {
        halt("Motion sensor init failed", e);
    }
    info!("Motion sensors initialized");

    // Display terminal: TX=GPIO0, RX=GPIO1, 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 16]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, _rx) = uart.split();
    info!("UART initialized for display link");

    // Shutdown button, active low
    let button = Input::new(p.PIN_15, Pull::Up);

    let handoff: &'static Handoff = HANDOFF.init(WindowHandoff::new(config.overflow));
    let PipelineConfig {
        sampling, health, ..
    } = config;

    // Sampling preempts everything in thread mode
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    spawner
        .spawn(tasks::sampling_task(sensor, sampling, handoff))
        .unwrap();

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(tasks::inference_task(gate, handoff)).unwrap();
        spawner
            .spawn(tasks::presenter_task(tx, sampling.period_us, health))
            .unwrap();
        spawner.spawn(tasks::shutdown_task(button)).unwrap();
        info!("All tasks spawned, pipeline running");
    })
}

/// Load the embedded model and check it against this firmware
fn build_gate() -> Result<Gate, ConfigError> {
    let model = DenseModel::from_blob(MODEL)?;
    InferenceGate::new(model, InputLayout::v1())
}

/// Log a fatal startup fault and park the core
///
/// The pipeline is never started with a configuration or hardware fault.
fn halt<E: Format>(what: &str, error: E) -> ! {
    error!("{}: {}", what, error);
    loop {
        cortex_m::asm::wfi();
    }
}
