//! Unit, enum-mapping and data-type extraction from remark text
//!
//! Remarks are free text. Each extractor tries a short list of patterns in
//! order and takes the first hit, returning an empty string when nothing
//! matches.

use lazy_static::lazy_static;
use regex::Regex;

/// Maximum length (in characters) of an extracted unit
const MAX_UNIT_CHARS: usize = 10;

/// Keywords that mark a description as a range or radix note, not a state
static NON_STATE_KEYWORDS: &[&str] = &["范围", "进制", "~", "～", "至"];

lazy_static! {
    static ref UNIT_PATTERNS: [Regex; 3] = [
        // 单位:V
        Regex::new(r"单位\s*[:：]\s*([^\s,，;；。、)）\]】]+)").unwrap(),
        // 分辨率0.5, 单位为mA
        Regex::new(r"分辨率[^;；\n]*?单位\s*(?:为|是)\s*([^\s,，;；。、)）\]】]+)").unwrap(),
        // 当量:0.01V / 分辨率0.1℃
        Regex::new(
            r"(?:当量|分辨率)\s*[:：为]?\s*[-+]?[0-9]+(?:\.[0-9]+)?(?:[eE][-+]?[0-9]+)?\s*([A-Za-z%°℃Ωμ·²³]+(?:/[A-Za-z]+)?)"
        )
        .unwrap(),
    ];
    static ref ENUM_TRIGGER: Regex =
        Regex::new(r"(?:0[xX][0-9A-Fa-f]+|[0-9]+)\s*[-－—]").unwrap();
    static ref HEX_ENTRY: Regex =
        Regex::new(r"(0[xX][0-9A-Fa-f]+)\s*[-－—:：=]\s*([^|,，;；、\s]+)").unwrap();
    static ref DEC_ENTRY: Regex =
        Regex::new(r"(?:^|[|,，;；、\s])([0-9]+)\s*[-－—:：=]\s*([^|,，;；、\s]+)").unwrap();
    static ref HEX_ONLY: Regex = Regex::new(r"^(?:0[xX])?[0-9A-Fa-f]+[hH]?$").unwrap();
    static ref DATA_TYPE: Regex = Regex::new(
        r"(?i)(?:^|[^A-Za-z0-9])(U?INT(?:8|16|32|64)|FLOAT(?:32|64)?|DOUBLE|BOOL(?:EAN)?|CHAR|BYTE|U?WORD|DWORD|U?LONG|U?SHORT)(?:[^A-Za-z0-9]|$)"
    )
    .unwrap();
}

/// Extract a physical unit, trying the explicit marker first
pub fn extract_unit(text: &str) -> String {
    UNIT_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| clean_unit(&caps[1]))
        .unwrap_or_default()
}

fn clean_unit(raw: &str) -> String {
    raw.trim_end_matches(|c: char| ".,;:，。；：、)）]】".contains(c))
        .trim_start_matches(|c: char| "(（[【".contains(c))
        .chars()
        .take(MAX_UNIT_CHARS)
        .collect()
}

/// Extract a value-to-state mapping such as `0x55-未成功|0xAA-成功`
///
/// Only attempted when the text contains `|` or a code-dash pattern. Hex
/// codes are tried before decimal codes; at least two valid entries are
/// required.
pub fn extract_enum_mapping(text: &str) -> String {
    if !text.contains('|') && !ENUM_TRIGGER.is_match(text) {
        return String::new();
    }

    for pattern in [&*HEX_ENTRY, &*DEC_ENTRY] {
        let entries: Vec<String> = pattern
            .captures_iter(text)
            .filter(|caps| is_state_description(&caps[2]))
            .map(|caps| format!("{}-{}", &caps[1], caps[2].trim()))
            .collect();
        if entries.len() >= 2 {
            return entries.join("|");
        }
    }
    String::new()
}

fn is_state_description(desc: &str) -> bool {
    let desc = desc.trim();
    !desc.is_empty()
        && !HEX_ONLY.is_match(desc)
        && !NON_STATE_KEYWORDS.iter().any(|k| desc.contains(k))
}

/// Extract a data-type hint (`UINT8`, `INT16`, `FLOAT`, ...), uppercased
pub fn extract_data_type(text: &str) -> String {
    DATA_TYPE
        .captures(text)
        .map(|caps| caps[1].to_uppercase())
        .unwrap_or_default()
}
