//! Hex byte, binary field and word-reference notation

use lazy_static::lazy_static;
use regex::Regex;
use tmtc_table::text::compact;

use crate::error::{ParseError, Result};

lazy_static! {
    static ref HEX_BYTE: Regex = Regex::new(r"^(?:0[xX])?([0-9A-Fa-f]{1,2})[hH]?$").unwrap();
    static ref BINARY_RUN: Regex = Regex::new(r"[01]+").unwrap();
    static ref WORD_REF: Regex =
        Regex::new(r"[Ww]([0-9]+)(?:\s*[-~～—–]\s*[Ww]?([0-9]+))?").unwrap();
}

/// Parse a hex byte written as `0xNN`, `NNh` or bare `NN`
pub fn parse_hex_byte(text: &str) -> Result<u8> {
    let text = compact(text);
    let byte = HEX_BYTE
        .captures(&text)
        .and_then(|caps| u8::from_str_radix(&caps[1], 16).ok());
    byte.ok_or(ParseError::InvalidHexByte(text))
}

/// Format a byte as `0xNN`
pub fn format_hex_byte(byte: u8) -> String {
    format!("0x{:02X}", byte)
}

/// Canonical form of a command code, used as the merge key
pub fn normalize_code(text: &str) -> Option<String> {
    parse_hex_byte(text).ok().map(format_hex_byte)
}

/// Parse the first contiguous run of `0`/`1` digits as base 2
pub fn parse_binary_field(text: &str) -> Result<u32> {
    BINARY_RUN
        .find(text)
        .and_then(|m| u32::from_str_radix(m.as_str(), 2).ok())
        .ok_or_else(|| ParseError::InvalidBinaryField(text.to_string()))
}

/// Number of payload words referenced in a description
///
/// Ranges such as `W0-W9` count every word they span.
pub fn count_word_refs(text: &str) -> usize {
    WORD_REF
        .captures_iter(text)
        .map(|caps| {
            let start = caps[1].parse::<usize>().ok();
            let end = caps.get(2).map(|m| m.as_str().parse::<usize>().unwrap_or(usize::MAX));
            match (start, end) {
                (Some(start), Some(end)) if end >= start => (end - start).saturating_add(1),
                _ => 1,
            }
        })
        .fold(0, usize::saturating_add)
}
