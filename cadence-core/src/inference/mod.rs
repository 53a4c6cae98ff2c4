//! Inference side of the pipeline
//!
//! The gate owns the engine and the input layout contract; the worker loop
//! pulls windows from the handoff and classifies them one at a time.

pub mod gate;
pub mod label;
pub mod layout;
pub mod worker;

pub use gate::{InferenceGate, InferenceResult};
pub use label::{arg_max, Label, N_CLASSES};
pub use layout::{InputLayout, LAYOUT_VERSION};
pub use worker::{run_inference, Outcome};
