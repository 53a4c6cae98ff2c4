//! Pipeline configuration loading
//!
//! `pipeline.toml` is compiled into the image and checked by `build.rs`, so
//! a parse failure here means the file and the firmware parser disagree.

use cadence_core::{ConfigError, PipelineConfig};
use defmt::*;

use crate::channels::WINDOW_SIZE;

/// Embedded configuration (compiled into firmware)
/// Edit pipeline.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../pipeline.toml");

/// Parse and validate the embedded configuration
///
/// Falls back to the built-in defaults when the file does not parse. An
/// error means the pipeline must not start.
pub fn load() -> Result<PipelineConfig, ConfigError> {
    let config = match cadence_core::config::parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            warn!("Using built-in default configuration");
            PipelineConfig::default()
        }
    };

    config.validate::<WINDOW_SIZE>()?;

    info!(
        "Pipeline: {} us period, {} samples/window, overflow {}",
        config.sampling.period_us, config.window_size, config.overflow
    );

    Ok(config)
}
