//! Hardware abstraction traits
//!
//! These traits define the interface between the pipeline logic and the
//! collaborators it does not own: the motion sensor, the inference engine,
//! the display, and the platform clock.

pub mod clock;
pub mod engine;
pub mod presenter;
pub mod source;

pub use clock::Clock;
pub use engine::{EngineError, InferenceEngine, TensorShape};
pub use presenter::{Point, Presenter};
pub use source::{SampleSource, SensorError};
