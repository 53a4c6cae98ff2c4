//! Inference activity loop

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::gate::{InferenceGate, InferenceResult};
use crate::scheduler::WindowHandoff;
use crate::stats::PipelineStats;
use crate::traits::{EngineError, InferenceEngine};

/// What happened to one received window
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Classified(InferenceResult),
    Failed { window_seq: u32, error: EngineError },
}

/// Classify windows until the handoff is closed and drained
///
/// The slot is released before `publish` runs, so a slow presenter never
/// holds up the next window. Returns the number of windows handled.
pub async fn run_inference<E, M, F, const N: usize>(
    gate: &mut InferenceGate<E, N>,
    handoff: &WindowHandoff<M, N>,
    stats: &PipelineStats,
    mut publish: F,
) -> u32
where
    E: InferenceEngine,
    M: RawMutex,
    F: FnMut(Outcome),
{
    let mut handled = 0u32;

    while let Some(in_flight) = handoff.receive().await {
        let window_seq = in_flight.window().seq();
        let outcome = match gate.classify(in_flight.window()) {
            Ok(result) => {
                stats.record_classified();
                Outcome::Classified(result)
            }
            Err(error) => {
                stats.record_engine_error();
                Outcome::Failed { window_seq, error }
            }
        };
        drop(in_flight);

        publish(outcome);
        handled = handled.wrapping_add(1);
    }

    handled
}
