//! Sampling task
//!
//! Reads the motion sensor once per period, fills windows and hands them
//! to inference. Runs until the shutdown flag is set.

use cadence_core::config::SamplingConfig;
use cadence_core::SamplingScheduler;
use cadence_drivers::sensor::MotionSensor;
use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::Delay;

use crate::channels::{Handoff, SHUTDOWN, STATS, WINDOW_SIZE};
use crate::clock::EmbassyClock;

/// Accelerometer and gyroscope on I2C0
pub type Sensor = MotionSensor<I2c<'static, I2C0, Blocking>, EmbassyClock>;

/// Sampling task - owns the sensor and the window being filled
#[embassy_executor::task]
pub async fn sampling_task(mut sensor: Sensor, config: SamplingConfig, handoff: &'static Handoff) {
    info!(
        "Sampling task started ({} us period, {} samples/window)",
        config.period_us, WINDOW_SIZE
    );

    let mut scheduler = SamplingScheduler::<WINDOW_SIZE>::new(&config);
    let mut delay = Delay;

    match scheduler
        .run(&mut sensor, &EmbassyClock, &mut delay, handoff, &STATS, &SHUTDOWN)
        .await
    {
        Ok(cycles) => info!("Sampling stopped after {} cycles", cycles),
        Err(e) => error!("Sampling halted: {}", e),
    }
}
