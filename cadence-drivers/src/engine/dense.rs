//! Single dense layer classifier
//!
//! Loads a little-endian model blob:
//!
//! ```text
//! offset  size              field
//! 0       4                 magic "CDNM"
//! 4       2                 input layout version
//! 6       2                 window (rows)
//! 8       2                 channels (cols)
//! 10      2                 classes
//! 12      4 * classes * in  weights, one row of `in = rows * cols` per class
//! ...     4 * classes       biases
//! ```
//!
//! Weights stay in the blob (typically flash). The engine owns only the
//! input tensor and the output scores, so its RAM use is fixed by `INPUT`.

use cadence_core::traits::{EngineError, InferenceEngine, TensorShape};
use micromath::F32Ext;

/// Blob magic
pub const MAGIC: [u8; 4] = *b"CDNM";
/// Header size in bytes
pub const HEADER_LEN: usize = 12;
/// Largest class count the output buffer holds
pub const MAX_CLASSES: usize = 16;

fn read_u16(blob: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([blob[offset], blob[offset + 1]])
}

fn read_f32(bytes: &[u8], index: usize) -> f32 {
    let at = index * 4;
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Dense layer + softmax engine with an `INPUT`-value input arena
pub struct DenseModel<'a, const INPUT: usize> {
    shape: TensorShape,
    classes: usize,
    layout_version: u16,
    weights: &'a [u8],
    biases: &'a [u8],
    input: [f32; INPUT],
    output: [f32; MAX_CLASSES],
}

impl<'a, const INPUT: usize> DenseModel<'a, INPUT> {
    /// Parse and size-check a model blob
    pub fn from_blob(blob: &'a [u8]) -> Result<Self, EngineError> {
        if blob.len() < HEADER_LEN || blob[..4] != MAGIC {
            return Err(EngineError::InvalidModel);
        }

        let layout_version = read_u16(blob, 4);
        let rows = usize::from(read_u16(blob, 6));
        let cols = usize::from(read_u16(blob, 8));
        let classes = usize::from(read_u16(blob, 10));

        if rows == 0 || cols == 0 || classes == 0 {
            return Err(EngineError::InvalidModel);
        }

        let inputs = rows * cols;
        if inputs > INPUT || classes > MAX_CLASSES {
            return Err(EngineError::Allocation);
        }

        let weights_len = 4 * classes * inputs;
        let biases_len = 4 * classes;
        if blob.len() != HEADER_LEN + weights_len + biases_len {
            return Err(EngineError::InvalidModel);
        }

        let (weights, biases) = blob[HEADER_LEN..].split_at(weights_len);

        Ok(Self {
            shape: TensorShape::new(rows, cols),
            classes,
            layout_version,
            weights,
            biases,
            input: [0.0; INPUT],
            output: [0.0; MAX_CLASSES],
        })
    }
}

impl<const INPUT: usize> InferenceEngine for DenseModel<'_, INPUT> {
    fn input_shape(&self) -> TensorShape {
        self.shape
    }

    fn output_len(&self) -> usize {
        self.classes
    }

    fn layout_version(&self) -> u16 {
        self.layout_version
    }

    fn input_mut(&mut self) -> &mut [f32] {
        &mut self.input[..self.shape.len()]
    }

    fn invoke(&mut self) -> Result<(), EngineError> {
        let inputs = self.shape.len();
        let x = &self.input[..inputs];

        let mut max = f32::NEG_INFINITY;
        for class in 0..self.classes {
            let row = class * inputs;
            let mut z = read_f32(self.biases, class);
            for (i, &v) in x.iter().enumerate() {
                z += read_f32(self.weights, row + i) * v;
            }
            if !z.is_finite() {
                return Err(EngineError::Invoke);
            }
            self.output[class] = z;
            max = max.max(z);
        }

        // Softmax, shifted by the max logit so exp never overflows
        let mut sum = 0.0f32;
        for z in &mut self.output[..self.classes] {
            *z = (*z - max).exp();
            sum += *z;
        }
        if !(sum.is_finite() && sum > 0.0) {
            return Err(EngineError::Invoke);
        }
        for p in &mut self.output[..self.classes] {
            *p /= sum;
        }

        Ok(())
    }

    fn output(&self) -> &[f32] {
        &self.output[..self.classes]
    }
}
