//! Shutdown button task

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Timer};

use crate::channels::SHUTDOWN;

/// Press must still read low after this long to count
const DEBOUNCE_MS: u64 = 30;

/// Wait for a press on the (active low) button and request shutdown once
#[embassy_executor::task]
pub async fn shutdown_task(mut button: Input<'static>) {
    info!("Shutdown button armed");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
        if button.is_low() {
            break;
        }
    }

    SHUTDOWN.request();
    info!("Shutdown requested");
}
