//! Model input layout
//!
//! The mapping from raw sensor units to the engine's input tensor is part
//! of the trained model's contract. It is versioned so a firmware/model
//! mismatch is caught when the gate is built, not while classifying.

use crate::sample::{Channel, Sample, AXES};
use crate::traits::EngineError;

/// Layout version implemented by [`InputLayout::v1`]
pub const LAYOUT_VERSION: u16 = 1;

/// Channel order and fixed per-channel scaling for the input tensor
///
/// The tensor is row-major: row `i` holds sample `i`, column `j` holds
/// `order[j]` multiplied by `scale[j]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputLayout {
    version: u16,
    order: [Channel; AXES],
    scale: [f32; AXES],
}

impl InputLayout {
    /// Version 1: accel x/y/z (g) then gyro x/y/z (dps), unscaled
    pub const fn v1() -> Self {
        Self {
            version: LAYOUT_VERSION,
            order: Channel::ALL,
            scale: [1.0; AXES],
        }
    }

    /// Custom layout for a model trained with a different convention
    pub const fn custom(version: u16, order: [Channel; AXES], scale: [f32; AXES]) -> Self {
        Self {
            version,
            order,
            scale,
        }
    }

    /// Same channel order with different scale factors
    pub const fn with_scale(mut self, scale: [f32; AXES]) -> Self {
        self.scale = scale;
        self
    }

    /// Layout version number
    pub const fn version(&self) -> u16 {
        self.version
    }

    /// Column order
    pub const fn order(&self) -> &[Channel; AXES] {
        &self.order
    }

    /// Write samples into a row-major input tensor
    ///
    /// `dst` must hold exactly `samples.len() * AXES` values.
    pub fn fill(&self, samples: &[Sample], dst: &mut [f32]) -> Result<(), EngineError> {
        if dst.len() != samples.len() * AXES {
            return Err(EngineError::ShapeMismatch);
        }

        for (row, sample) in dst.chunks_exact_mut(AXES).zip(samples) {
            for (col, value) in row.iter_mut().enumerate() {
                *value = sample.channel(self.order[col]) * self.scale[col];
            }
        }

        Ok(())
    }
}

impl Default for InputLayout {
    fn default() -> Self {
        Self::v1()
    }
}
