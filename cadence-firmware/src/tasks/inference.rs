//! Inference task
//!
//! Classifies each handed-off window and forwards the outcome to the
//! presenter. Exits once sampling has closed the handoff and the last
//! pending window is done.

use cadence_core::inference::{run_inference, Outcome};
use cadence_core::InferenceGate;
use cadence_drivers::engine::DenseModel;
use defmt::*;

use crate::channels::{Handoff, INFERENCE_DONE, MODEL_INPUT, OUTCOMES, STATS, WINDOW_SIZE};

/// Gate over the embedded dense model
pub type Gate = InferenceGate<DenseModel<'static, MODEL_INPUT>, WINDOW_SIZE>;

#[embassy_executor::task]
pub async fn inference_task(mut gate: Gate, handoff: &'static Handoff) {
    info!("Inference task started");

    let handled = run_inference(&mut gate, handoff, &STATS, |outcome| {
        match outcome {
            Outcome::Classified(result) => debug!(
                "Window {}: {} ({})",
                result.window_seq,
                result.label,
                result.confidence()
            ),
            Outcome::Failed { window_seq, error } => {
                warn!("Window {} discarded: {}", window_seq, error)
            }
        }

        if OUTCOMES.try_send(outcome).is_err() {
            warn!("Presenter backlog, outcome dropped");
        }
    })
    .await;

    info!("Inference stopped after {} windows", handled);
    INFERENCE_DONE.signal(());
}
