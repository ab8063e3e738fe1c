//! Build script for marquee-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sign.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Pins owned by SPI0 (clock, data)
const SPI_PINS: [i64; 2] = [18, 19];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("create memory.x");
    f.write_all(memory_x).expect("write memory.x");

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate sign.toml at compile time
///
/// The firmware's own reader is deliberately small; catching mistakes
/// here means a bad file never reaches the board.
fn validate_config() {
    println!("cargo:rerun-if-changed=sign.toml");

    let config_path = Path::new("sign.toml");
    if !config_path.exists() {
        fail(
            "sign.toml not found",
            &["The firmware embeds sign.toml from the marquee-firmware directory.".into()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read sign.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in sign.toml",
            &e.to_string().lines().map(String::from).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_panel(&config, &mut errors);
    validate_timing(&config, &mut errors);
    validate_scroll(&config, &mut errors);
    validate_pins(&config, &mut errors);
    validate_message(&config, &mut errors);
    validate_layout(&content, &mut errors);

    if !errors.is_empty() {
        fail("Invalid sign.toml", &errors);
    }

    println!("cargo:warning=sign.toml validated successfully");
}

fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|l| {
            let l = if l.chars().count() > 62 {
                format!("{}...", l.chars().take(59).collect::<String>())
            } else {
                l.clone()
            };
            format!("║  • {:<62} ║", l)
        })
        .collect::<Vec<_>>()
        .join("\n");
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        errors.push("top level must be a table".into());
        return;
    };
    for (name, value) in table {
        if !["panel", "timing", "scroll", "pins", "message"].contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

/// Integer `key` in `section`, if present
fn int(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    match config.get(section)?.get(key)? {
        toml::Value::Integer(v) => Some(*v),
        _ => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
    }
}

fn check_range(
    config: &toml::Value,
    section: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> Option<i64> {
    let value = int(config, section, key, errors)?;
    if !range.contains(&value) {
        errors.push(format!(
            "[{}] {} must be {}-{}",
            section,
            key,
            range.start(),
            range.end()
        ));
    }
    Some(value)
}

fn validate_panel(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "panel", "rows", 1..=8, errors);
    let modules = check_range(config, "panel", "modules", 1..=64, errors).unwrap_or(7);
    let columns =
        check_range(config, "panel", "columns_per_module", 1..=512, errors).unwrap_or(60);
    let outputs =
        check_range(config, "panel", "outputs_per_module", 1..=512, errors).unwrap_or(64);

    if outputs < columns {
        errors.push("[panel] outputs_per_module must be >= columns_per_module".into());
    }
    if (modules * outputs + 7) / 8 > 64 {
        errors.push("[panel] one row must fit in 64 bytes (512 outputs)".into());
    }
}

fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "timing", "tick_interval_us", 1..=100_000, errors);
    check_range(config, "timing", "target_fps", 1..=1000, errors);
    check_range(config, "timing", "spi_hz", 1..=62_500_000, errors);
    check_range(config, "timing", "ticks_per_transmit", 1..=10_000, errors);
}

fn validate_scroll(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "scroll", "delay_ms", 0..=60_000, errors);
    if let Some(dir) = config.get("scroll").and_then(|s| s.get("direction")) {
        match dir.as_str() {
            Some("left") | Some("right") => {}
            _ => errors.push("[scroll] direction must be 'left' or 'right'".into()),
        }
    }
}

fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(pins) = config.get("pins") else {
        return;
    };

    let mut used = Vec::new();
    for key in ["cs", "oe", "row0", "row1", "row2"] {
        let Some(value) = pins.get(key) else {
            continue;
        };
        let Some(s) = value.as_str() else {
            errors.push(format!("[pins] {} must be a string like \"gpio7\"", key));
            continue;
        };
        let number = s
            .trim_start_matches('!')
            .strip_prefix("gpio")
            .and_then(|n| n.parse::<i64>().ok());
        match number {
            Some(n) if (0..=29).contains(&n) => {
                if SPI_PINS.contains(&n) {
                    errors.push(format!("[pins] {} uses gpio{}, reserved for SPI0", key, n));
                }
                if used.contains(&n) {
                    errors.push(format!("[pins] gpio{} assigned twice", n));
                }
                used.push(n);
            }
            _ => errors.push(format!("[pins] {} = \"{}\" is not gpio0-gpio29", key, s)),
        }
    }
}

/// Constructs valid TOML that the firmware's line reader does not accept
fn validate_layout(content: &str, errors: &mut Vec<String>) {
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.starts_with("rotate") && line.contains('[') && !line.contains(']') {
            errors.push(format!("line {}: rotate must be written on one line", i + 1));
        }
        if line.contains("= '") || line.contains("['") {
            errors.push(format!("line {}: use double-quoted strings", i + 1));
        }
        if line.contains("\"\"\"") || line.contains("'''") {
            errors.push(format!("line {}: multi-line strings are not supported", i + 1));
        }
    }
}

fn validate_message(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(message) = config.get("message") else {
        return;
    };

    if let Some(text) = message.get("text") {
        match text.as_str() {
            Some(t) if t.len() <= 256 => {}
            Some(_) => errors.push("[message] text must be at most 256 bytes".into()),
            None => errors.push("[message] text must be a string".into()),
        }
    }

    if let Some(rotate) = message.get("rotate") {
        match rotate.as_array() {
            Some(entries) => {
                if entries.len() > 4 {
                    errors.push("[message] rotate holds at most 4 entries".into());
                }
                for entry in entries {
                    match entry.as_str() {
                        Some(t) if t.len() <= 64 => {}
                        _ => errors.push(
                            "[message] rotate entries must be strings of at most 64 bytes"
                                .into(),
                        ),
                    }
                }
            }
            None => errors.push("[message] rotate must be an array of strings".into()),
        }
    }

    check_range(config, "message", "rotate_secs", 0..=86_400, errors);
}
