//! Inference engines

pub mod dense;

pub use dense::{DenseModel, HEADER_LEN, MAGIC, MAX_CLASSES};
