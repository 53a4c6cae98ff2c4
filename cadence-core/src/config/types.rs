//! Pipeline configuration types

use heapless::{String, Vec};

use super::parse::ParseError;
use crate::health::HealthConfig;
use crate::inference::{Label, LAYOUT_VERSION, N_CLASSES};
use crate::traits::EngineError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum label name length
pub const MAX_LABEL_LEN: usize = 16;
/// Maximum number of label names accepted by the parser
pub const MAX_LABELS: usize = 8;

/// Default sampling period (50 Hz)
pub const DEFAULT_PERIOD_US: u32 = 20_000;
/// Default samples per window (2 s at 50 Hz)
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// What to do with a completed window when the consumer is behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverflowPolicy {
    /// Keep the pending window, drop the new one
    #[default]
    DropNewest,
    /// Replace the pending window with the new one
    OverwriteOldest,
}

impl OverflowPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "drop_newest" => Some(Self::DropNewest),
            "overwrite_oldest" => Some(Self::OverwriteOldest),
            _ => None,
        }
    }
}

/// What to append when a sensor read fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReadFailurePolicy {
    /// Repeat the previous sample, stamped with the current cycle start
    #[default]
    RepeatLast,
    /// Append nothing this cycle
    Skip,
}

impl ReadFailurePolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "repeat_last" => Some(Self::RepeatLast),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// Sampling scheduler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplingConfig {
    pub period_us: u32,
    pub read_failure: ReadFailurePolicy,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            period_us: DEFAULT_PERIOD_US,
            read_failure: ReadFailurePolicy::default(),
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    pub sampling: SamplingConfig,
    /// Samples per window; must equal the compiled window size
    pub window_size: usize,
    pub overflow: OverflowPolicy,
    /// Input layout version the deployed model was trained against
    pub layout_version: u16,
    /// Class names in model output order
    pub labels: Vec<String<MAX_LABEL_LEN>, MAX_LABELS>,
    pub health: HealthConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut labels = Vec::new();
        for label in Label::ALL {
            // N_CLASSES <= MAX_LABELS and every name fits MAX_LABEL_LEN
            let mut name = String::new();
            let _ = name.push_str(label.name());
            let _ = labels.push(name);
        }

        Self {
            sampling: SamplingConfig::default(),
            window_size: DEFAULT_WINDOW_SIZE,
            overflow: OverflowPolicy::default(),
            layout_version: LAYOUT_VERSION,
            labels,
            health: HealthConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Check the configuration against a firmware built for `N`-sample windows
    pub fn validate<const N: usize>(&self) -> Result<(), ConfigError> {
        if self.sampling.period_us == 0 {
            return Err(ConfigError::InvalidPeriod);
        }

        if self.window_size != N {
            return Err(ConfigError::WindowSizeMismatch {
                expected: N,
                found: self.window_size,
            });
        }

        if self.labels.len() != N_CLASSES {
            return Err(ConfigError::ClassCountMismatch {
                expected: N_CLASSES,
                found: self.labels.len(),
            });
        }

        for (index, (name, label)) in self.labels.iter().zip(Label::ALL).enumerate() {
            if name.as_str() != label.name() {
                return Err(ConfigError::LabelMismatch { index });
            }
        }

        if self.layout_version != LAYOUT_VERSION {
            return Err(ConfigError::LayoutVersionMismatch {
                firmware: LAYOUT_VERSION,
                model: self.layout_version,
            });
        }

        Ok(())
    }
}

/// Startup configuration error
///
/// Any of these stops the pipeline from starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Sampling period of zero
    InvalidPeriod,
    /// Window size differs from the compiled or model window size
    WindowSizeMismatch { expected: usize, found: usize },
    /// Model input does not have one column per sensor channel
    ChannelCountMismatch { expected: usize, found: usize },
    /// Model or label list has the wrong number of classes
    ClassCountMismatch { expected: usize, found: usize },
    /// Label name at `index` differs from the firmware's label order
    LabelMismatch { index: usize },
    /// Input layout versions disagree
    LayoutVersionMismatch { firmware: u16, model: u16 },
    /// `pipeline.toml` could not be parsed
    Parse(ParseError),
    /// Model could not be loaded
    Model(EngineError),
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<EngineError> for ConfigError {
    fn from(e: EngineError) -> Self {
        ConfigError::Model(e)
    }
}
