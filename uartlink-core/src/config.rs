//! Link configuration
//!
//! Timing and line settings for the link session and the host peer, plus a
//! small parser for the `link.toml` file embedded in the firmware.
//!
//! The parser handles only the subset the file needs:
//! - a single `[link]` section header
//! - `key = value` pairs with integer or double-quoted string values
//! - `#` comments and blank lines
//!
//! Missing keys keep their defaults. The result is range-checked with
//! [`LinkConfig::validate`] before it is returned.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use uartlink_hal::UartConfig;

/// Maximum length of the log tag
pub const MAX_TAG_LEN: usize = 16;

/// Log tag used when none is configured
pub const DEFAULT_TAG: &str = "UART_APP";

/// Section header expected in the config file
const SECTION: &str = "link";

/// Link configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct LinkConfig {
    /// How long the session waits for the first byte of a datagram
    pub read_timeout_ms: u32,
    /// Silence that ends a datagram once bytes have started arriving
    pub frame_gap_ms: u32,
    /// How long the host peer waits for a response byte
    pub response_timeout_ms: u32,
    /// Line rate in bits per second (always 8N1, no flow control)
    pub baudrate: u32,
    /// Tag prefixed to diagnostic messages
    pub tag: String<MAX_TAG_LEN>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        let mut tag = String::new();
        // DEFAULT_TAG is shorter than MAX_TAG_LEN
        let _ = tag.push_str(DEFAULT_TAG);

        Self {
            read_timeout_ms: 100,
            frame_gap_ms: 5,
            response_timeout_ms: 1000,
            baudrate: 115200,
            tag,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Line is neither a section header nor a `key = value` pair
    InvalidLine { line: usize },
    /// Section other than `[link]`
    UnknownSection { line: usize },
    /// Key not recognized (or outside the `[link]` section)
    UnknownKey { line: usize },
    /// Value has the wrong type or does not fit
    InvalidValue { line: usize },
    /// Value parsed but violates a constraint
    OutOfRange { field: &'static str },
}

impl LinkConfig {
    /// Serial line settings derived from this config
    ///
    /// Only the baud rate is configurable. The link always runs 8 data bits,
    /// no parity, one stop bit and no flow control.
    pub fn uart(&self) -> UartConfig {
        UartConfig::with_baudrate(self.baudrate)
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1_200..=921_600).contains(&self.baudrate) {
            return Err(ConfigError::OutOfRange { field: "baudrate" });
        }

        if !(1..=10_000).contains(&self.read_timeout_ms) {
            return Err(ConfigError::OutOfRange {
                field: "read_timeout_ms",
            });
        }

        // The gap must outlast two characters on the wire, or a datagram
        // would be cut in half by ordinary inter-byte spacing
        let min_gap_us = 2 * self.uart().char_time_us();
        if self.frame_gap_ms == 0
            || self.frame_gap_ms > self.read_timeout_ms
            || self.frame_gap_ms.saturating_mul(1000) < min_gap_us
        {
            return Err(ConfigError::OutOfRange {
                field: "frame_gap_ms",
            });
        }

        if !(1..=60_000).contains(&self.response_timeout_ms) {
            return Err(ConfigError::OutOfRange {
                field: "response_timeout_ms",
            });
        }

        if self.tag.is_empty() {
            return Err(ConfigError::OutOfRange { field: "tag" });
        }

        Ok(())
    }
}

/// Parse and validate a link configuration file
pub fn parse_config(input: &str) -> Result<LinkConfig, ConfigError> {
    let mut config = LinkConfig::default();
    let mut in_section = false;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ConfigError::InvalidLine { line: line_no })?
                .trim();
            if name != SECTION {
                return Err(ConfigError::UnknownSection { line: line_no });
            }
            in_section = true;
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or(ConfigError::InvalidLine { line: line_no })?;
        let (key, value) = (key.trim(), value.trim());

        if !in_section {
            return Err(ConfigError::UnknownKey { line: line_no });
        }

        match key {
            "read_timeout_ms" => config.read_timeout_ms = parse_u32(value, line_no)?,
            "frame_gap_ms" => config.frame_gap_ms = parse_u32(value, line_no)?,
            "response_timeout_ms" => config.response_timeout_ms = parse_u32(value, line_no)?,
            "baudrate" => config.baudrate = parse_u32(value, line_no)?,
            "tag" => config.tag = parse_tag(value, line_no)?,
            _ => return Err(ConfigError::UnknownKey { line: line_no }),
        }
    }

    config.validate()?;
    Ok(config)
}

/// Remove a trailing `#` comment, ignoring `#` inside quotes
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse an integer value, allowing `_` digit separators
fn parse_u32(value: &str, line: usize) -> Result<u32, ConfigError> {
    if value.is_empty() || value.starts_with('_') || value.ends_with('_') {
        return Err(ConfigError::InvalidValue { line });
    }

    let mut result: u32 = 0;
    for c in value.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(10).ok_or(ConfigError::InvalidValue { line })?;
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(digit))
            .ok_or(ConfigError::InvalidValue { line })?;
    }
    Ok(result)
}

/// Parse a double-quoted tag
fn parse_tag(value: &str, line: usize) -> Result<String<MAX_TAG_LEN>, ConfigError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ConfigError::InvalidValue { line })?;

    if inner.contains('"') || inner.contains('\\') {
        return Err(ConfigError::InvalidValue { line });
    }

    let mut tag = String::new();
    tag.push_str(inner)
        .map_err(|_| ConfigError::InvalidValue { line })?;
    Ok(tag)
}
