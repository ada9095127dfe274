//! Document metadata inference
//!
//! Protocol documents rarely state the owning subsystem or byte order in a
//! structured way. Both are recovered from free text: the system name from a
//! subsystem keyword in the title or early paragraphs, the byte order from
//! the first paragraph that declares one.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalyzerConfig;

/// Declared byte order of multi-byte fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Endianness {
    /// 大端: most significant byte first
    #[default]
    Big,
    /// 小端: least significant byte first
    Little,
}

impl Endianness {
    /// Label as written in protocol documents
    pub fn label(&self) -> &'static str {
        match self {
            Endianness::Big => "大端",
            Endianness::Little => "小端",
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Subsystem keyword -> abbreviation. Order matters: the first keyword found
// anywhere in the searched text wins, so specific names precede generic ones.
static SYSTEM_NAMES: &[(&str, &str)] = &[
    ("电源控制器", "PCU"),
    ("电源管理", "PMU"),
    ("蓄电池", "BAT"),
    ("太阳电池阵", "SA"),
    ("电源", "EPS"),
    ("姿轨控", "AOCS"),
    ("姿态控制", "ACS"),
    ("星敏感器", "STS"),
    ("太阳敏感器", "SSS"),
    ("磁强计", "MAG"),
    ("磁力矩器", "MTQ"),
    ("动量轮", "MW"),
    ("反作用飞轮", "RW"),
    ("陀螺", "GYRO"),
    ("推进", "PROP"),
    ("热控", "TCS"),
    ("星务", "OBDH"),
    ("综合电子", "IAE"),
    ("星载计算机", "OBC"),
    ("测控", "TTC"),
    ("应答机", "XPDR"),
    ("数传", "DTS"),
    ("导航接收机", "GNSS"),
    ("GNSS", "GNSS"),
    ("GPS", "GPS"),
    ("相机", "CAM"),
    ("载荷", "PL"),
];

lazy_static! {
    static ref TITLE_SYSTEM: Regex =
        Regex::new(r"([A-Z]{2,6})\s*(GEN|V|v|组件|单机|系统)").unwrap();
}

static BIG_ENDIAN_MARKERS: &[&str] = &["大端", "高字节在前", "big-endian", "big endian"];
static LITTLE_ENDIAN_MARKERS: &[&str] = &["小端", "低字节在前", "little-endian", "little endian"];

/// Infer the owning subsystem's abbreviation
///
/// Searches the title and the first `paragraph_scan_limit` paragraphs for a
/// subsystem keyword (user-supplied pairs first, then the built-in list).
/// Falls back to an uppercase acronym followed by a product suffix in the
/// title, then to the configured default.
pub fn infer_system_name(
    title: &str,
    paragraphs: Option<&[String]>,
    config: &AnalyzerConfig,
) -> String {
    let mut haystack = title.to_string();
    for p in paragraphs
        .unwrap_or_default()
        .iter()
        .take(config.paragraph_scan_limit)
    {
        haystack.push('\n');
        haystack.push_str(p);
    }

    let extra = config
        .extra_system_names
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()));
    let builtin = SYSTEM_NAMES.iter().copied();
    if let Some((keyword, abbr)) = extra.chain(builtin).find(|(k, _)| haystack.contains(k)) {
        debug!("System name {} inferred from keyword {}", abbr, keyword);
        return abbr.to_string();
    }

    if let Some(caps) = TITLE_SYSTEM.captures(title) {
        debug!("System name {} inferred from title acronym", &caps[1]);
        return caps[1].to_string();
    }

    config.default_system_name.clone()
}

/// Infer the declared byte order
///
/// Paragraphs are checked in order; the first one that mentions a byte
/// order decides. Returns `default` when nothing is declared.
pub fn infer_endianness(paragraphs: Option<&[String]>, default: Endianness) -> Endianness {
    for p in paragraphs.unwrap_or_default() {
        let lower = p.to_lowercase();
        if BIG_ENDIAN_MARKERS.iter().any(|m| lower.contains(m)) {
            return Endianness::Big;
        }
        if LITTLE_ENDIAN_MARKERS.iter().any(|m| lower.contains(m)) {
            return Endianness::Little;
        }
    }
    default
}

/// Metadata recovered from a document's free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Subsystem abbreviation (e.g. "PCU")
    pub system_name: String,
    /// Declared byte order
    pub endianness: Endianness,
}

impl DocumentMeta {
    /// Run both inferences with the given configuration
    pub fn infer(title: &str, paragraphs: Option<&[String]>, config: &AnalyzerConfig) -> Self {
        Self {
            system_name: infer_system_name(title, paragraphs, config),
            endianness: infer_endianness(paragraphs, config.default_endianness),
        }
    }
}
