//! Minimal TOML reader for `sign.toml`
//!
//! Handles only the subset the sign configuration uses:
//! - `[section]` headers (`panel`, `timing`, `scroll`, `pins`, `message`)
//! - `key = value` with integer, quoted string, or single-line string
//!   array values
//! - `#` comments, full-line or trailing
//!
//! Unknown keys are ignored so older firmware accepts newer files.
//! Anything else that does not parse is reported with its line number.

use heapless::String;

use super::types::{ConfigError, PinConfig, SignConfig};
use crate::scroll::ScrollDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Panel,
    Timing,
    Scroll,
    Pins,
    Message,
}

/// Parse a configuration file over the defaults
///
/// Keys not present keep their default value. The result is not
/// validated; call [`SignConfig::validate`] on it.
pub fn parse_config(input: &str) -> Result<SignConfig, ConfigError> {
    let mut config = SignConfig::default();
    let mut section = Section::Root;

    for (index, line) in input.lines().enumerate() {
        let error = ConfigError::Parse {
            line: (index + 1).min(u16::MAX as usize) as u16,
        };
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header.strip_suffix(']').ok_or(error)?;
            section = parse_section(name.trim()).ok_or(error)?;
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(error)?;
        apply(&mut config, section, key.trim(), value.trim()).ok_or(error)?;
    }

    Ok(config)
}

/// Parse a pin like `"gpio7"` or `"!gpio0"` (active-low)
pub fn parse_pin(value: &str) -> Option<PinConfig> {
    let (inverted, rest) = match value.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let number = rest.strip_prefix("gpio")?;
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(PinConfig {
        pin: number.parse().ok()?,
        inverted,
    })
}

fn parse_section(name: &str) -> Option<Section> {
    Some(match name {
        "panel" => Section::Panel,
        "timing" => Section::Timing,
        "scroll" => Section::Scroll,
        "pins" => Section::Pins,
        "message" => Section::Message,
        _ => return None,
    })
}

/// Apply one key; `None` means the value was malformed
fn apply(config: &mut SignConfig, section: Section, key: &str, value: &str) -> Option<()> {
    match (section, key) {
        (Section::Panel, "rows") => config.panel.rows = parse_int(value)?,
        (Section::Panel, "modules") => config.panel.modules = parse_int(value)?,
        (Section::Panel, "columns_per_module") => {
            config.panel.columns_per_module = parse_int(value)?
        }
        (Section::Panel, "outputs_per_module") => {
            config.panel.outputs_per_module = parse_int(value)?
        }

        (Section::Timing, "tick_interval_us") => {
            config.timing.tick_interval_us = parse_int(value)?
        }
        (Section::Timing, "target_fps") => config.timing.target_fps = parse_int(value)?,
        (Section::Timing, "spi_hz") => config.timing.spi_hz = parse_int(value)?,
        (Section::Timing, "ticks_per_transmit") => {
            config.timing.ticks_per_transmit = Some(parse_int(value)?)
        }

        (Section::Scroll, "delay_ms") => config.scroll.delay_ms = parse_int(value)?,
        (Section::Scroll, "direction") => {
            config.scroll.direction = match parse_string::<8>(value)?.as_str() {
                "left" => ScrollDirection::Left,
                "right" => ScrollDirection::Right,
                _ => return None,
            }
        }

        (Section::Pins, "cs") => config.pins.cs = parse_pin(&parse_string::<16>(value)?)?,
        (Section::Pins, "oe") => config.pins.oe = parse_pin(&parse_string::<16>(value)?)?,
        (Section::Pins, "row0") => config.pins.row[0] = parse_pin(&parse_string::<16>(value)?)?,
        (Section::Pins, "row1") => config.pins.row[1] = parse_pin(&parse_string::<16>(value)?)?,
        (Section::Pins, "row2") => config.pins.row[2] = parse_pin(&parse_string::<16>(value)?)?,

        (Section::Message, "text") => config.message.text = parse_string(value)?,
        (Section::Message, "rotate_secs") => config.message.rotate_secs = parse_int(value)?,
        (Section::Message, "rotate") => {
            config.message.rotate.clear();
            let mut rest = value.strip_prefix('[')?.trim_start();
            loop {
                if let Some(after) = rest.strip_prefix(']') {
                    if !after.trim().is_empty() {
                        return None;
                    }
                    break;
                }
                let (entry, after) = take_string(rest)?;
                config.message.rotate.push(entry).ok()?;
                rest = after.trim_start();
                rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
            }
        }

        (Section::Root, _) => return None,
        _ => {}
    }
    Some(())
}

/// Integer literals may use `_` separators (`1_000_000`)
fn parse_int<T: core::str::FromStr>(value: &str) -> Option<T> {
    let mut digits: String<20> = String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).ok()?;
    }
    digits.parse().ok()
}

/// Parse a value that must be exactly one quoted string
fn parse_string<const N: usize>(value: &str) -> Option<String<N>> {
    let (s, rest) = take_string(value)?;
    rest.trim().is_empty().then_some(s)
}

/// Read one quoted string from the start of `input`, returning the rest
///
/// Supports the `\"`, `\\`, `\n` and `\t` escapes.
fn take_string<const N: usize>(input: &str) -> Option<(String<N>, &str)> {
    let body = input.strip_prefix('"')?;
    let mut out = String::new();
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        let c = match c {
            '"' => return Some((out, &body[i + 1..])),
            '\\' => match chars.next()?.1 {
                '"' => '"',
                '\\' => '\\',
                'n' => '\n',
                't' => '\t',
                _ => return None,
            },
            c => c,
        };
        out.push(c).ok()?;
    }
    None
}

/// Cut a trailing `#` comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Marquee sign on the shop window

[panel]
rows = 7
modules = 6            # one module removed
columns_per_module = 60
outputs_per_module = 64

[timing]
tick_interval_us = 300
target_fps = 60
spi_hz = 2_000_000

[scroll]
delay_ms = 40
direction = "right"

[pins]
cs = "gpio9"
oe = "!gpio10"
row0 = "gpio11"
row1 = "gpio12"
row2 = "gpio13"

[message]
text = "Open # come in"
rotate = ["Coffee \"fresh\"", "Tea"]
rotate_secs = 30
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.panel.modules, 6);
        assert_eq!(config.timing.spi_hz, 2_000_000);
        assert_eq!(config.timing.ticks_per_transmit, None);
        assert_eq!(config.scroll.delay_ms, 40);
        assert_eq!(config.scroll.direction, ScrollDirection::Right);
        assert_eq!(config.pins.cs, PinConfig::new(9));
        assert_eq!(config.pins.oe, PinConfig::inverted(10));
        assert_eq!(config.pins.row[2], PinConfig::new(13));
        assert_eq!(config.message.text.as_str(), "Open # come in");
        assert_eq!(config.message.rotate.len(), 2);
        assert_eq!(config.message.rotate[0].as_str(), "Coffee \"fresh\"");
        assert_eq!(config.message.rotate_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config("").unwrap(), SignConfig::default());
        assert_eq!(
            parse_config("# nothing\n\n").unwrap(),
            SignConfig::default()
        );
    }

    #[test]
    fn test_errors_carry_line_number() {
        assert_eq!(
            parse_config("[panel]\nrows = seven\n"),
            Err(ConfigError::Parse { line: 2 })
        );
        assert_eq!(
            parse_config("[wifi]\n"),
            Err(ConfigError::Parse { line: 1 })
        );
        assert_eq!(
            parse_config("[scroll]\ndirection = \"up\"\n"),
            Err(ConfigError::Parse { line: 2 })
        );
        assert_eq!(
            parse_config("rows = 7\n"),
            Err(ConfigError::Parse { line: 1 })
        );
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let config = parse_config("[panel]\nbrightness = 3\nrows = 5\n").unwrap();
        assert_eq!(config.panel.rows, 5);
    }

    #[test]
    fn test_explicit_transmit_ticks() {
        let config = parse_config("[timing]\nticks_per_transmit = 3\n").unwrap();
        assert_eq!(config.timing.ticks_per_transmit, Some(3));
        assert_eq!(config.ticks_per_transmit(), 3);
    }

    #[test]
    fn test_rotate_list_limits() {
        let config = parse_config("[message]\nrotate = []\n").unwrap();
        assert!(config.message.rotate.is_empty());

        let too_many = "[message]\nrotate = [\"a\", \"b\", \"c\", \"d\", \"e\"]\n";
        assert_eq!(parse_config(too_many), Err(ConfigError::Parse { line: 2 }));
    }

    #[test]
    fn test_parse_pin() {
        assert_eq!(parse_pin("gpio7"), Some(PinConfig::new(7)));
        assert_eq!(parse_pin("!gpio0"), Some(PinConfig::inverted(0)));
        assert_eq!(parse_pin("gpio"), None);
        assert_eq!(parse_pin("gpio+1"), None);
        assert_eq!(parse_pin("pa3"), None);
        assert_eq!(parse_pin("gpio300"), None);
    }

    #[test]
    fn test_strip_comment_respects_strings() {
        assert_eq!(strip_comment("a = 1 # note"), "a = 1 ");
        assert_eq!(strip_comment(r#"t = "x # y""#), r#"t = "x # y""#);
        assert_eq!(strip_comment(r##"t = "q\"#" # c"##), r##"t = "q\"#" "##);
    }
}
