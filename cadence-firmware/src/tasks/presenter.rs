//! Presenter task
//!
//! Shows each classified label, and once per window interval reports the
//! health indicator and counters. Runs in thread mode, so a slow display
//! link only ever delays this task.

use cadence_core::health::HealthConfig;
use cadence_core::inference::Outcome;
use cadence_core::traits::Presenter;
use cadence_core::HealthMonitor;
use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::BufferedUartTx;
use embassy_time::{Duration, Ticker};

use crate::channels::{INFERENCE_DONE, OUTCOMES, STATS, WINDOW_SIZE};
use crate::presenter::{FramePresenter, LABEL_AT, STATUS_AT};

/// Presenter task - renders outcomes and health on the display terminal
#[embassy_executor::task]
pub async fn presenter_task(tx: BufferedUartTx<'static, UART0>, period_us: u32, health: HealthConfig) {
    info!("Presenter task started");

    let mut presenter = FramePresenter::new(tx);
    let mut monitor = HealthMonitor::new(health, STATS.snapshot());
    let mut ticker = Ticker::every(Duration::from_micros(u64::from(period_us) * WINDOW_SIZE as u64));

    presenter.clear();
    presenter.show_status(monitor.status(), STATUS_AT);

    loop {
        match select3(OUTCOMES.receive(), ticker.next(), INFERENCE_DONE.wait()).await {
            Either3::First(outcome) => show_outcome(&mut presenter, outcome),
            Either3::Second(()) => {
                let previous = monitor.status();
                let snapshot = STATS.snapshot();
                let status = monitor.observe(snapshot);

                if status != previous {
                    if status.is_degraded() {
                        warn!("Pipeline degraded: {}", status);
                    } else {
                        info!("Pipeline nominal again");
                    }
                }
                trace!("Stats: {}", snapshot);

                presenter.show_status(status, STATUS_AT);
                presenter.show_telemetry(snapshot);
            }
            Either3::Third(()) => break,
        }
    }

    // Outcomes published before inference stopped
    while let Ok(outcome) = OUTCOMES.try_receive() {
        show_outcome(&mut presenter, outcome);
    }
    presenter.show_telemetry(STATS.snapshot());

    if presenter.dropped() > 0 {
        warn!("{} display messages dropped", presenter.dropped());
    }
    info!("Presenter stopped");
}

fn show_outcome<P: Presenter>(presenter: &mut P, outcome: Outcome) {
    // A failed window leaves the previous label on screen
    if let Outcome::Classified(result) = outcome {
        presenter.show_label(result.label, LABEL_AT);
    }
}
