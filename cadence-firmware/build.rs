//! Build script for cadence-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates pipeline.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Must match `channels::WINDOW_SIZE`
const WINDOW_SIZE: i64 = 100;

const LABELS: [&str; 6] = ["Sitting", "Lying", "Standing", "Jumping", "Walking", "Running"];
const OVERFLOW_POLICIES: [&str; 2] = ["drop_newest", "overwrite_oldest"];
const READ_FAILURE_POLICIES: [&str; 2] = ["repeat_last", "skip"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=model/activity.cdm");
}

/// Validate pipeline.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=pipeline.toml");

    let config_path = Path::new("pipeline.toml");

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read pipeline.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in pipeline.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_sampling(&config, &mut errors);
    validate_window(&config, &mut errors);
    validate_inference(&config, &mut errors);
    validate_health(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid pipeline configuration", &errors);
    }

    println!("cargo:warning=pipeline.toml validated successfully");
}

/// Abort the build with a boxed diagnostic
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let line = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", line)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

fn section<'a>(config: &'a toml::Value, name: &str, errors: &mut Vec<String>) -> Option<&'a toml::value::Table> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => None,
    }
}

fn check_int(table: &toml::value::Table, section: &str, key: &str, min: i64, max: i64, errors: &mut Vec<String>) {
    match table.get(key) {
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => {}
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
        }
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
        None => {}
    }
}

fn check_choice(table: &toml::value::Table, section: &str, key: &str, choices: &[&str], errors: &mut Vec<String>) {
    match table.get(key) {
        Some(toml::Value::String(v)) if choices.contains(&v.as_str()) => {}
        Some(_) => errors.push(format!(
            "[{}] {} must be one of {}",
            section,
            key,
            choices.join(", ")
        )),
        None => {}
    }
}

fn validate_sampling(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(sampling) = section(config, "sampling", errors) else {
        return;
    };

    if sampling.contains_key("period_us") && sampling.contains_key("period_ms") {
        errors.push("[sampling] set period_us or period_ms, not both".to_string());
    }
    check_int(sampling, "sampling", "period_us", 1, i64::from(u32::MAX), errors);
    check_int(sampling, "sampling", "period_ms", 1, i64::from(u32::MAX) / 1000, errors);
    check_choice(sampling, "sampling", "read_failure", &READ_FAILURE_POLICIES, errors);
}

fn validate_window(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(window) = section(config, "window", errors) else {
        return;
    };

    check_int(window, "window", "size", WINDOW_SIZE, WINDOW_SIZE, errors);
}

fn validate_inference(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(inference) = section(config, "inference", errors) else {
        return;
    };

    check_choice(inference, "inference", "overflow_policy", &OVERFLOW_POLICIES, errors);
    check_int(inference, "inference", "layout_version", 0, i64::from(u16::MAX), errors);

    match inference.get("labels") {
        Some(toml::Value::Array(labels)) => {
            let names: Vec<Option<&str>> = labels.iter().map(|l| l.as_str()).collect();
            if names.len() != LABELS.len() {
                errors.push(format!("[inference] labels must list {} classes", LABELS.len()));
            }
            for (i, (name, expected)) in names.iter().zip(LABELS).enumerate() {
                if *name != Some(expected) {
                    errors.push(format!("[inference] label {} must be '{}'", i, expected));
                }
            }
        }
        Some(_) => errors.push("[inference] labels must be an array".to_string()),
        None => {}
    }
}

fn validate_health(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(health) = section(config, "health", errors) else {
        return;
    };

    check_int(health, "health", "overrun_permille", 0, 1000, errors);
    check_int(health, "health", "overflow_streak", 0, i64::from(u8::MAX), errors);
    check_int(health, "health", "engine_error_streak", 0, i64::from(u8::MAX), errors);
}
