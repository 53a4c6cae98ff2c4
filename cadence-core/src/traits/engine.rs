//! Inference engine trait
//!
//! Models the usual micro-inference interpreter surface: a fixed input
//! tensor the caller fills in place, a synchronous `invoke`, and a fixed
//! output tensor of per-class scores.

/// Errors reported by an inference engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// Input or output tensor does not have the expected shape
    ShapeMismatch,
    /// Tensor arena too small for the model
    Allocation,
    /// Model data is malformed or of an unsupported version
    InvalidModel,
    /// Forward pass failed
    Invoke,
}

/// Two-dimensional tensor shape (rows × columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TensorShape {
    /// Number of time steps (samples per window)
    pub rows: usize,
    /// Values per time step (sensor channels)
    pub cols: usize,
}

impl TensorShape {
    /// Create a shape
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of elements
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// True if the shape holds no elements
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifier over a fixed-shape input tensor
pub trait InferenceEngine {
    /// Shape of the input tensor
    fn input_shape(&self) -> TensorShape;

    /// Number of output scores (one per class)
    fn output_len(&self) -> usize;

    /// Version of the input layout the model was trained against
    fn layout_version(&self) -> u16;

    /// Mutable view of the input tensor, `input_shape().len()` values, row-major
    fn input_mut(&mut self) -> &mut [f32];

    /// Run a forward pass over the current input tensor
    fn invoke(&mut self) -> Result<(), EngineError>;

    /// Output scores from the last successful `invoke`
    fn output(&self) -> &[f32];
}
