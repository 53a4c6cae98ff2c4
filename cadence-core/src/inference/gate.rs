//! Inference gate
//!
//! Converts a completed window into the engine's input layout, runs the
//! engine, and maps the score vector to a [`Label`].

use super::label::{arg_max, Label, N_CLASSES};
use super::layout::InputLayout;
use crate::config::ConfigError;
use crate::sample::AXES;
use crate::traits::{EngineError, InferenceEngine};
use crate::window::Window;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classification of one window
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InferenceResult {
    /// Sequence number of the classified window
    pub window_seq: u32,
    /// Winning label (arg-max, lowest index on ties)
    pub label: Label,
    /// Raw per-class scores in model output order
    pub scores: [f32; N_CLASSES],
}

impl InferenceResult {
    /// Score of the winning label
    pub fn confidence(&self) -> f32 {
        self.scores[self.label.index()]
    }
}

/// Gate between completed windows and the inference engine
///
/// Construction checks the engine against the compiled window size, the
/// channel count, the number of classes and the input layout version.
/// A gate that exists is known to match its model.
pub struct InferenceGate<E, const N: usize> {
    engine: E,
    layout: InputLayout,
}

impl<E: InferenceEngine, const N: usize> InferenceGate<E, N> {
    /// Build a gate, validating the engine against this firmware's contract
    pub fn new(engine: E, layout: InputLayout) -> Result<Self, ConfigError> {
        let shape = engine.input_shape();

        if shape.rows != N {
            return Err(ConfigError::WindowSizeMismatch {
                expected: N,
                found: shape.rows,
            });
        }

        if shape.cols != AXES {
            return Err(ConfigError::ChannelCountMismatch {
                expected: AXES,
                found: shape.cols,
            });
        }

        if engine.output_len() != N_CLASSES {
            return Err(ConfigError::ClassCountMismatch {
                expected: N_CLASSES,
                found: engine.output_len(),
            });
        }

        if engine.layout_version() != layout.version() {
            return Err(ConfigError::LayoutVersionMismatch {
                firmware: layout.version(),
                model: engine.layout_version(),
            });
        }

        Ok(Self { engine, layout })
    }

    /// Classify one window
    ///
    /// Deterministic for a fixed window and model. On error the caller
    /// discards the window.
    pub fn classify(&mut self, window: &Window<N>) -> Result<InferenceResult, EngineError> {
        self.layout.fill(window.samples(), self.engine.input_mut())?;
        self.engine.invoke()?;

        let output = self.engine.output();
        if output.len() != N_CLASSES {
            return Err(EngineError::ShapeMismatch);
        }

        let mut scores = [0.0f32; N_CLASSES];
        scores.copy_from_slice(output);

        // All-NaN output means the forward pass produced garbage
        let index = arg_max(&scores).ok_or(EngineError::Invoke)?;
        let label = Label::from_index(index).ok_or(EngineError::ShapeMismatch)?;

        Ok(InferenceResult {
            window_seq: window.seq(),
            label,
            scores,
        })
    }

    /// Input layout in use
    pub fn layout(&self) -> &InputLayout {
        &self.layout
    }

    /// Underlying engine
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Deterministic engines shared by the inference and pipeline tests

    use super::*;
    use crate::inference::layout::LAYOUT_VERSION;
    use crate::traits::TensorShape;

    /// Engine with a fixed score vector and an optional forced failure
    pub struct MockEngine<const LEN: usize> {
        pub rows: usize,
        pub cols: usize,
        pub classes: usize,
        pub version: u16,
        pub input: [f32; LEN],
        pub scores: [f32; N_CLASSES],
        pub fail: Option<EngineError>,
        pub invocations: u32,
    }

    impl<const LEN: usize> MockEngine<LEN> {
        pub fn new(rows: usize, scores: [f32; N_CLASSES]) -> Self {
            Self {
                rows,
                cols: AXES,
                classes: N_CLASSES,
                version: LAYOUT_VERSION,
                input: [0.0; LEN],
                scores,
                fail: None,
                invocations: 0,
            }
        }
    }

    impl<const LEN: usize> InferenceEngine for MockEngine<LEN> {
        fn input_shape(&self) -> TensorShape {
            TensorShape::new(self.rows, self.cols)
        }

        fn output_len(&self) -> usize {
            self.classes
        }

        fn layout_version(&self) -> u16 {
            self.version
        }

        fn input_mut(&mut self) -> &mut [f32] {
            &mut self.input
        }

        fn invoke(&mut self) -> Result<(), EngineError> {
            self.invocations += 1;
            match self.fail {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn output(&self) -> &[f32] {
            &self.scores
        }
    }
}
