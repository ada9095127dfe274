//! Byte-sequence and bit-field notation
//!
//! Telemetry tables position each field with document shorthand:
//!
//! ```text
//! W7        word (byte) 7
//! W7-W8     bytes 7 through 8
//! B3        byte 3 (alternate prefix)
//! Dh / Dl   length header, high/low byte
//! SUM       checksum byte
//! ```
//!
//! Sub-byte fields are written in the name column as `b7-b4:desc` or
//! `b0:desc`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::NotationError;

lazy_static! {
    static ref LOWER_PREFIX: Regex = Regex::new(r"[wb][0-9]").unwrap();
    static ref BARE_RANGE: Regex = Regex::new(r"^([WB])([0-9]+)-([0-9]+)$").unwrap();
    static ref BYTE_SEQUENCE: Regex =
        Regex::new(r"^(?:[WB][0-9]+(?:-[WB]?[0-9]+)?|DH|DL|SUM)$").unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();
    static ref BIT_RANGE: Regex =
        Regex::new(r"^\s*[bB]([0-9]{1,2})\s*[-~–—～]\s*[bB]?([0-9]{1,2})\s*[:：]").unwrap();
    static ref BIT_SINGLE: Regex = Regex::new(r"^\s*[bB]([0-9]{1,2})\s*[:：]").unwrap();
    static ref BARE_PREFIX: Regex = Regex::new(r"^\s*([!-9;-~]{2,16}?)\s*[:：]").unwrap();
}

/// Normalize byte-sequence notation
///
/// Strips whitespace, unifies range dashes, uppercases `w`/`b` prefixes and
/// expands bare numeric ranges (`W7-8` becomes `W7-W8`). Idempotent.
pub fn normalize_byte_sequence(raw: &str) -> String {
    let compacted: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '–' | '—' | '~' | '～' => '-',
            c => c,
        })
        .collect();
    let upper = LOWER_PREFIX.replace_all(&compacted, |caps: &regex::Captures| caps[0].to_uppercase());
    BARE_RANGE.replace(&upper, "${1}${2}-${1}${3}").into_owned()
}

/// Returns true if the (normalized) text is byte-sequence notation
pub fn is_byte_sequence(text: &str) -> bool {
    let normalized = normalize_byte_sequence(text).to_uppercase();
    BYTE_SEQUENCE.is_match(&normalized)
}

/// Returns true for the length header bytes `Dh`/`Dl`
pub fn is_length_header(seq: &str) -> bool {
    seq.eq_ignore_ascii_case("dh") || seq.eq_ignore_ascii_case("dl")
}

/// Returns true for checksum notation (`SUM` or 校验和)
pub fn is_checksum(seq: &str) -> bool {
    seq.eq_ignore_ascii_case("sum") || seq.contains("校验和")
}

/// Last byte number in a sequence (`W7-W8` gives 8)
pub fn byte_number(seq: &str) -> Result<u32, NotationError> {
    DIGIT_RUN
        .find_iter(seq)
        .last()
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| NotationError::NoByteNumber(seq.to_string()))
}

/// Extend `prev` into a range ending at the byte number of `next`
///
/// Returns `None` if either side has no byte number, or `next` does not lie
/// past the end of `prev`.
pub fn extend_range(prev: &str, next: &str) -> Option<String> {
    let end = byte_number(prev).ok()?;
    let target = byte_number(next).ok()?;
    if target <= end {
        return None;
    }
    let start = prev.split('-').next().unwrap_or(prev);
    let prefix: String = start.chars().take_while(|c| !c.is_ascii_digit()).collect();
    Some(format!("{}-{}{}", start, prefix, target))
}

/// Best-effort byte length: the first run of digits in the cell
pub fn parse_length(text: &str) -> Result<u32, NotationError> {
    tmtc_table::text::first_number(text).ok_or_else(|| NotationError::InvalidLength(text.to_string()))
}

/// Sub-byte region of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Lowest bit of the region
    pub offset: u32,
    /// Number of bits covered
    pub length: u32,
}

impl BitField {
    /// Build from an inclusive `b<hi>-b<lo>` range (either order)
    pub fn from_range(hi: u32, lo: u32) -> Result<Self, NotationError> {
        let (hi, lo) = if hi >= lo { (hi, lo) } else { (lo, hi) };
        if hi > 63 {
            return Err(NotationError::BitRange { hi, lo });
        }
        Ok(Self {
            offset: lo,
            length: hi - lo + 1,
        })
    }

    /// Parse bit-field notation at the start of a field name
    ///
    /// Recognizes `b7-b4:desc`, `b3:desc`, and a short ASCII prefix carrying
    /// two numbers (`7-4:desc`, `bit7~bit4:desc`).
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(caps) = BIT_RANGE.captures(name) {
            let hi = caps[1].parse().ok()?;
            let lo = caps[2].parse().ok()?;
            return Self::from_range(hi, lo).ok();
        }

        if let Some(caps) = BIT_SINGLE.captures(name) {
            let bit: u32 = caps[1].parse().ok()?;
            return Self::from_range(bit, bit).ok();
        }

        let prefix = BARE_PREFIX.captures(name)?;
        let numbers: Vec<u32> = DIGIT_RUN
            .find_iter(&prefix[1])
            .filter_map(|m| m.as_str().parse().ok())
            .collect();
        match numbers.as_slice() {
            [hi, lo] => Self::from_range(*hi, *lo).ok(),
            _ => None,
        }
    }
}
