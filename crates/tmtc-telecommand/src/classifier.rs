//! Telecommand table classification
//!
//! Rules are checked in priority order and the first match wins:
//!
//! 1. CAN-ID summary: at least 5 of the 7 identifier fields
//! 2. Command frame format: 命令 plus `B0`/`B1`/`B7` byte columns
//! 3. Command summary: 指令名称, 指令码 and 指令参数
//! 4. Parameter detail: 编号, 指令名称, 指令码 plus `W<n>` columns
//! 5. Data-type definition: 数据类型 plus a value or meaning column

use serde::{Deserialize, Serialize};
use tmtc_table::text::header_texts;
use tmtc_table::RawTable;
use tracing::debug;

use crate::config::TelecommandConfig;

/// Identifier fields of a CAN-ID summary: Chinese keyword and abbreviation
pub(crate) static CAN_ID_FIELDS: &[(&str, &str)] = &[
    ("优先级", "P"),
    ("总线标志", "LT"),
    ("数据类型", "DT"),
    ("目的地址", "DA"),
    ("源地址", "SA"),
    // 单/复帧标识
    ("帧标识", "FT"),
    ("帧计数", "FC"),
];
const CAN_ID_MIN_FIELDS: usize = 5;

const FRAME_FORMAT_MIN_HITS: usize = 4;

static SUMMARY_KEYWORDS: &[&str] = &["指令名称", "指令码", "指令参数"];
static DETAIL_KEYWORDS: &[&str] = &["编号", "指令名称", "指令码"];
static DATA_TYPE_VALUE_KEYWORDS: &[&str] = &["取值", "含义", "说明", "定义"];

/// Semantic type of a telecommand table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelecommandTableType {
    CanIdSummary,
    CommandFrameFormat,
    CommandSummary,
    ParameterDetail,
    DataTypeDefinition,
}

impl TelecommandTableType {
    /// Returns a human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            TelecommandTableType::CanIdSummary => "CAN-ID汇总表",
            TelecommandTableType::CommandFrameFormat => "指令帧格式表",
            TelecommandTableType::CommandSummary => "指令汇总表",
            TelecommandTableType::ParameterDetail => "指令参数表",
            TelecommandTableType::DataTypeDefinition => "数据类型定义表",
        }
    }
}

/// Classification result for one source table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedTelecommandTable {
    pub table_type: TelecommandTableType,
    /// Index of the table in the document
    pub table_index: usize,
    pub title: String,
    pub section_heading: String,
}

/// Returns true if a header cell names the field by its abbreviation
///
/// The abbreviation must stand alone, e.g. `DT` or `数据类型(DT)`.
pub(crate) fn has_token(cell: &str, token: &str) -> bool {
    cell.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|t| t.eq_ignore_ascii_case(token))
}

/// Returns true if a header cell is a `<prefix><digits>` column label
pub(crate) fn is_indexed_label(cell: &str, prefix: char) -> bool {
    let mut chars = cell.chars();
    chars.next().is_some_and(|c| c.eq_ignore_ascii_case(&prefix))
        && cell.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

/// Heuristic telecommand table classifier
#[derive(Debug, Clone)]
pub struct TelecommandTableClassifier {
    header_scan_rows: usize,
}

impl TelecommandTableClassifier {
    pub fn new() -> Self {
        Self::with_config(&TelecommandConfig::default())
    }

    pub fn with_config(config: &TelecommandConfig) -> Self {
        Self {
            header_scan_rows: config.header_scan_rows,
        }
    }

    /// Classify every table of a document, dropping unmatched tables
    pub fn detect(&self, tables: &[RawTable]) -> Vec<DetectedTelecommandTable> {
        tables
            .iter()
            .enumerate()
            .filter_map(|(index, table)| {
                let table_type = self.classify(table)?;
                debug!("Table {} is a {}", index, table_type.name());
                Some(DetectedTelecommandTable {
                    table_type,
                    table_index: index,
                    title: table.title().unwrap_or_default().trim().to_string(),
                    section_heading: table.section_heading().unwrap_or_default().trim().to_string(),
                })
            })
            .collect()
    }

    /// Type of a single table, if it is a telecommand table at all
    pub fn classify(&self, table: &RawTable) -> Option<TelecommandTableType> {
        if table.is_empty() {
            return None;
        }
        let headers = header_texts(table, self.header_scan_rows);
        let has = |kw: &str| headers.iter().any(|h| h.contains(kw));

        let can_id_hits = CAN_ID_FIELDS
            .iter()
            .filter(|(kw, abbr)| has(kw) || headers.iter().any(|h| has_token(h, abbr)))
            .count();
        if can_id_hits >= CAN_ID_MIN_FIELDS {
            return Some(TelecommandTableType::CanIdSummary);
        }

        let frame_hits = usize::from(has("命令"))
            + ["B0", "B1", "B7"]
                .iter()
                .filter(|b| headers.iter().any(|h| h.eq_ignore_ascii_case(b)))
                .count();
        if frame_hits >= FRAME_FORMAT_MIN_HITS {
            return Some(TelecommandTableType::CommandFrameFormat);
        }

        if SUMMARY_KEYWORDS.iter().all(|kw| has(kw)) {
            return Some(TelecommandTableType::CommandSummary);
        }

        if DETAIL_KEYWORDS.iter().all(|kw| has(kw))
            && headers.iter().any(|h| is_indexed_label(h, 'W'))
        {
            return Some(TelecommandTableType::ParameterDetail);
        }

        if has("数据类型") && DATA_TYPE_VALUE_KEYWORDS.iter().any(|kw| has(kw)) {
            return Some(TelecommandTableType::DataTypeDefinition);
        }

        None
    }
}

impl Default for TelecommandTableClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(rows: Vec<Vec<&str>>) -> Option<TelecommandTableType> {
        TelecommandTableClassifier::new().classify(&RawTable::from_rows(rows))
    }

    #[test]
    fn test_can_id_by_abbreviation() {
        let kind = classify(vec![
            vec!["帧类型", "P", "LT", "DT", "DA", "SA", "通道"],
            vec!["控制短指令", "011", "0", "00010", "01011", "00000", "A"],
        ]);
        assert_eq!(kind, Some(TelecommandTableType::CanIdSummary));
    }

    #[test]
    fn test_can_id_by_keyword() {
        let kind = classify(vec![
            vec!["帧类型", "优先级", "总线标志", "数据类型", "目的地址", "源地址", "单/复帧标识", "帧计数"],
            vec!["遥测请求", "011", "0", "00001", "01011", "00000", "00", "00000001"],
        ]);
        assert_eq!(kind, Some(TelecommandTableType::CanIdSummary));
    }

    #[test]
    fn test_frame_format() {
        let kind = classify(vec![
            vec!["命令", "B0", "B1", "B2", "B3", "B4", "B5", "B6", "B7"],
            vec!["加热器开", "0x21", "00", "00", "00", "00", "00", "00", "00"],
        ]);
        assert_eq!(kind, Some(TelecommandTableType::CommandFrameFormat));
    }

    #[test]
    fn test_summary_and_detail() {
        assert_eq!(
            classify(vec![vec!["序号", "指令名称", "指令码", "指令参数", "备注"]]),
            Some(TelecommandTableType::CommandSummary)
        );
        assert_eq!(
            classify(vec![vec!["编号", "指令名称", "指令码", "W0", "W1"]]),
            Some(TelecommandTableType::ParameterDetail)
        );
        assert_eq!(
            classify(vec![vec!["编号", "指令名称", "指令码", "说明"]]),
            None
        );
    }

    #[test]
    fn test_data_type_definition() {
        assert_eq!(
            classify(vec![vec!["数据类型", "含义"], vec!["00001", "遥测请求"]]),
            Some(TelecommandTableType::DataTypeDefinition)
        );
    }

    #[test]
    fn test_unrelated_and_empty() {
        assert_eq!(classify(vec![vec!["版本", "日期"], vec!["V1.0", "2023"]]), None);
        assert_eq!(classify(vec![]), None);
    }

    #[test]
    fn test_detect_keeps_indices() {
        let tables = vec![
            RawTable::from_rows(vec![vec!["版本", "日期"]]),
            RawTable::from_rows(vec![vec!["指令名称", "指令码", "指令参数"], vec!["开", "01", ""]])
                .with_title("表2 指令汇总"),
        ];
        let detected = TelecommandTableClassifier::new().detect(&tables);
        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].table_index, 1);
        assert_eq!(detected[0].title, "表2 指令汇总");
    }

    #[test]
    fn test_token_helpers() {
        assert!(has_token("数据类型(DT)", "DT"));
        assert!(!has_token("DATA", "DA"));
        assert!(is_indexed_label("W12", 'W'));
        assert!(is_indexed_label("b0", 'B'));
        assert!(!is_indexed_label("W", 'W'));
        assert!(!is_indexed_label("W1-W2", 'W'));
    }
}
