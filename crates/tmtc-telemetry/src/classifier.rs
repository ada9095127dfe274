//! Telemetry table classification
//!
//! A document mixes telemetry field tables with command lists, revision
//! histories and CAN-ID summaries. Telemetry tables are recognized by their
//! header keywords, or failing that by a first column full of byte-sequence
//! notation. Each one is then labelled synchronous or asynchronous from its
//! heading and caption.

use serde::{Deserialize, Serialize};
use tmtc_table::text::{compact, contains_any, header_texts};
use tmtc_table::RawTable;
use tracing::debug;

use crate::config::TelemetryConfig;
use crate::field::ProtocolTelemetryField;
use crate::notation;

/// Header keyword sets; a table matches if every keyword of one set occurs
static HEADER_PATTERNS: &[&[&str]] = &[
    &["字序", "数据内容", "字节长度"],
    &["字序", "参数名称"],
    &["字节序号", "参数名称", "字节数"],
    &["字节", "遥测参数", "长度"],
    &["偏移", "字段", "长度"],
    &["序号", "遥测量", "字节"],
];

/// Header keywords of a CAN-ID summary table
static CAN_ID_KEYWORDS: &[&str] = &[
    "命令", "优先级", "总线标志", "数据类型", "目的地址", "源地址", "帧标识", "帧计数",
];
const CAN_ID_MIN_KEYWORDS: usize = 5;
const CAN_ID_MIN_COLUMNS: usize = 6;

const MIN_TABLE_ROWS: usize = 3;

/// Checked before the synchronous list
static ASYNC_KEYWORDS: &[&str] = &["异步", "非周期", "事件", "应答", "突发"];
static SYNC_KEYWORDS: &[&str] = &["同步", "周期遥测", "常规遥测", "实时遥测"];

/// Semantic type of a telemetry table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelemetryTableType {
    /// Periodic (synchronous) telemetry
    Sync,
    /// Event-driven (asynchronous) telemetry
    Async,
    /// Could not be decided from the heading or caption
    Unknown,
}

impl TelemetryTableType {
    /// Returns a human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryTableType::Sync => "同步遥测",
            TelemetryTableType::Async => "异步遥测",
            TelemetryTableType::Unknown => "未知",
        }
    }
}

/// Classification result for one source table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedTelemetryTable {
    /// Semantic type
    pub table_type: TelemetryTableType,
    /// Heading of the enclosing section (or sheet name)
    pub section_heading: String,
    /// Table caption
    pub title: String,
    /// Index of the table in the document
    pub table_index: usize,
    /// Parsed fields (filled by the analyzer)
    pub fields: Vec<ProtocolTelemetryField>,
}

/// Output of [`TelemetryTableClassifier::detect`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryDetection {
    /// Telemetry field tables, fields not yet parsed
    pub tables: Vec<DetectedTelemetryTable>,
    /// Indices of CAN-ID summary tables
    pub can_id_tables: Vec<usize>,
}

/// Heuristic telemetry table classifier
#[derive(Debug, Clone)]
pub struct TelemetryTableClassifier {
    header_scan_rows: usize,
    content_sample_rows: usize,
    min_content_matches: usize,
}

impl TelemetryTableClassifier {
    /// Create a classifier with default thresholds
    pub fn new() -> Self {
        Self::with_config(&TelemetryConfig::default())
    }

    /// Create a classifier using the thresholds of `config`
    pub fn with_config(config: &TelemetryConfig) -> Self {
        Self {
            header_scan_rows: config.header_scan_rows,
            content_sample_rows: config.content_sample_rows,
            min_content_matches: config.min_content_matches,
        }
    }

    /// Classify every table of a document
    pub fn detect(&self, tables: &[RawTable]) -> TelemetryDetection {
        let mut detection = TelemetryDetection::default();

        for (index, table) in tables.iter().enumerate() {
            if table.is_empty() || table.row_count() < MIN_TABLE_ROWS {
                continue;
            }

            if self.is_telemetry_table(table) {
                let (section_heading, title) = labels(table);
                let table_type = classify_kind(&section_heading, &title);
                debug!("Table {} is a telemetry table ({:?})", index, table_type);
                detection.tables.push(DetectedTelemetryTable {
                    table_type,
                    section_heading,
                    title,
                    table_index: index,
                    fields: Vec::new(),
                });
            } else if self.is_can_id_summary(table) {
                debug!("Table {} is a CAN-ID summary table", index);
                detection.can_id_tables.push(index);
            }
        }

        resolve_unknown(&mut detection.tables);
        detection
    }

    /// Header keyword match, then byte-sequence content heuristic
    pub fn is_telemetry_table(&self, table: &RawTable) -> bool {
        if table.is_empty() || table.row_count() < MIN_TABLE_ROWS {
            return false;
        }
        self.matches_header(table) || self.matches_content(table)
    }

    fn matches_header(&self, table: &RawTable) -> bool {
        let headers = header_texts(table, self.header_scan_rows);
        HEADER_PATTERNS
            .iter()
            .any(|pattern| pattern.iter().all(|kw| headers.iter().any(|h| h.contains(kw))))
    }

    fn matches_content(&self, table: &RawTable) -> bool {
        let matches = (1..table.row_count())
            .take(self.content_sample_rows)
            .filter(|&r| notation::is_byte_sequence(table.value(r, 0)))
            .count();
        matches >= self.min_content_matches
    }

    /// Returns true for a CAN-ID summary table (not a field table)
    pub fn is_can_id_summary(&self, table: &RawTable) -> bool {
        if table.col_count() < CAN_ID_MIN_COLUMNS {
            return false;
        }
        let headers = header_texts(table, self.header_scan_rows);
        let hits = CAN_ID_KEYWORDS
            .iter()
            .filter(|kw| headers.iter().any(|h| h.contains(*kw)))
            .count();
        hits >= CAN_ID_MIN_KEYWORDS
    }
}

impl Default for TelemetryTableClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn labels(table: &RawTable) -> (String, String) {
    let heading = table
        .section_heading()
        .filter(|h| !h.trim().is_empty())
        .or(table.sheet_name())
        .unwrap_or_default()
        .trim()
        .to_string();
    let title = table.title().unwrap_or_default().trim().to_string();
    (heading, title)
}

/// Sync/Async from heading and caption text
pub fn classify_kind(section_heading: &str, title: &str) -> TelemetryTableType {
    let text = compact(&format!("{}{}", section_heading, title));
    if contains_any(&text, ASYNC_KEYWORDS) {
        TelemetryTableType::Async
    } else if contains_any(&text, SYNC_KEYWORDS) {
        TelemetryTableType::Sync
    } else {
        TelemetryTableType::Unknown
    }
}

/// Give the first Unknown table whichever kind is still missing
///
/// Sync is preferred when neither or both kinds are already present. Later
/// Unknown tables are left for the analyzer to default.
fn resolve_unknown(tables: &mut [DetectedTelemetryTable]) {
    let has_sync = tables
        .iter()
        .any(|t| t.table_type == TelemetryTableType::Sync);
    let has_async = tables
        .iter()
        .any(|t| t.table_type == TelemetryTableType::Async);

    if let Some(first) = tables
        .iter_mut()
        .find(|t| t.table_type == TelemetryTableType::Unknown)
    {
        first.table_type = if has_sync && !has_async {
            TelemetryTableType::Async
        } else {
            TelemetryTableType::Sync
        };
        debug!(
            "Unknown table {} resolved to {:?}",
            first.table_index, first.table_type
        );
    }
}
