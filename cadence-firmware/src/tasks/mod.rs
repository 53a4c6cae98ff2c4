//! Embassy async tasks
//!
//! Sampling runs on the high-priority interrupt executor; everything else
//! runs in thread mode and can be preempted by it at any await point.

pub mod inference;
pub mod presenter;
pub mod sampling;
pub mod shutdown;

pub use inference::{inference_task, Gate};
pub use presenter::presenter_task;
pub use sampling::{sampling_task, Sensor};
pub use shutdown::shutdown_task;
