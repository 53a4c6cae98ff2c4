//! Configuration types
//!
//! Pipeline settings loaded from `pipeline.toml` and checked against the
//! compiled firmware before anything starts.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
