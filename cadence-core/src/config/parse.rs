//! Minimal TOML reader for `pipeline.toml`
//!
//! Handles only the subset the pipeline configuration uses. It does NOT
//! support the full TOML spec.
//!
//! Supported:
//! - `[section]` headers (`sampling`, `window`, `inference`, `health`)
//! - `key = value` with integers, quoted strings and one-line string arrays
//! - `_` digit separators in integers
//! - Comments (`# ...`), including after a value
//!
//! Unknown keys are ignored so newer files still load on older firmware.

use heapless::String;

use super::types::{OverflowPolicy, PipelineConfig, ReadFailurePolicy, MAX_LABEL_LEN, MAX_LABELS};

/// Parse error, with the 1-based line it was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection { line: usize },
    /// Line is neither a header nor `key = value`
    InvalidLine { line: usize },
    /// Value has the wrong type or is out of range
    InvalidValue { line: usize },
    /// Array longer than its fixed capacity
    TooManyItems { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sampling,
    Window,
    Inference,
    Health,
}

/// Parse `pipeline.toml` on top of the built-in defaults
///
/// Keys that are absent keep their default value. The result is not
/// validated; call [`PipelineConfig::validate`] before use.
pub fn parse_config(input: &str) -> Result<PipelineConfig, ParseError> {
    let mut config = PipelineConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(ParseError::InvalidSection { line: line_no })?;
            continue;
        }

        let (key, value) =
            parse_key_value(line).ok_or(ParseError::InvalidLine { line: line_no })?;
        apply_value(section, key, value, &mut config).map_err(|e| e.at(line_no))?;
    }

    Ok(config)
}

/// Value error before the line number is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueError {
    Invalid,
    TooMany,
}

impl ValueError {
    fn at(self, line: usize) -> ParseError {
        match self {
            ValueError::Invalid => ParseError::InvalidValue { line },
            ValueError::TooMany => ParseError::TooManyItems { line },
        }
    }
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "sampling" => Some(Section::Sampling),
        "window" => Some(Section::Window),
        "inference" => Some(Section::Inference),
        "health" => Some(Section::Health),
        _ => None,
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut PipelineConfig,
) -> Result<(), ValueError> {
    match section {
        Section::Sampling => match key {
            "period_us" => config.sampling.period_us = parse_int(value)?,
            "period_ms" => {
                let ms: u32 = parse_int(value)?;
                config.sampling.period_us = ms.checked_mul(1_000).ok_or(ValueError::Invalid)?;
            }
            "read_failure" => {
                config.sampling.read_failure =
                    ReadFailurePolicy::from_name(parse_string(value)?).ok_or(ValueError::Invalid)?;
            }
            _ => {}
        },
        Section::Window => {
            if key == "size" {
                config.window_size = parse_int(value)?;
            }
        }
        Section::Inference => match key {
            "overflow_policy" => {
                config.overflow =
                    OverflowPolicy::from_name(parse_string(value)?).ok_or(ValueError::Invalid)?;
            }
            "layout_version" => config.layout_version = parse_int(value)?,
            "labels" => {
                config.labels.clear();
                for item in parse_array(value)? {
                    let name: String<MAX_LABEL_LEN> =
                        String::try_from(parse_string(item.trim())?).map_err(|_| ValueError::Invalid)?;
                    config.labels.push(name).map_err(|_| ValueError::TooMany)?;
                }
            }
            _ => {}
        },
        Section::Health => match key {
            "overrun_permille" => config.health.overrun_permille = parse_int(value)?,
            "overflow_streak" => config.health.overflow_streak = parse_int(value)?,
            "engine_error_streak" => config.health.engine_error_streak = parse_int(value)?,
            _ => {}
        },
        Section::Root => {}
    }

    Ok(())
}

/// Cut a `#` comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Split "key = value"
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Quoted string contents
fn parse_string(value: &str) -> Result<&str, ValueError> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ValueError::Invalid)
    }
}

/// Unsigned integer, `_` separators allowed
fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ValueError> {
    let mut acc: u64 = 0;
    let mut digits = 0;

    for c in value.chars() {
        if c == '_' {
            continue;
        }
        let d = c.to_digit(10).ok_or(ValueError::Invalid)?;
        acc = acc
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(d)))
            .ok_or(ValueError::Invalid)?;
        digits += 1;
    }

    if digits == 0 {
        return Err(ValueError::Invalid);
    }

    T::try_from(acc).map_err(|_| ValueError::Invalid)
}

/// Items of a one-line `[a, b, c]` array
fn parse_array(value: &str) -> Result<heapless::Vec<&str, MAX_LABELS>, ValueError> {
    if !value.starts_with('[') || !value.ends_with(']') {
        return Err(ValueError::Invalid);
    }
    let inner = value[1..value.len() - 1].trim();

    let mut items = heapless::Vec::new();
    if inner.is_empty() {
        return Ok(items);
    }

    // Trailing comma is allowed
    for item in inner.trim_end_matches(',').split(',') {
        items.push(item).map_err(|_| ValueError::TooMany)?;
    }

    Ok(items)
}
