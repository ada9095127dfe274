//! Telemetry protocol analyzer
//!
//! Orchestrates one document: metadata inference, table classification,
//! field parsing, and channel extraction.

use tmtc_table::{DocumentMeta, RawTable};
use tracing::{debug, info, warn};

use crate::channel::{extract_channel_info, ChannelInfo};
use crate::classifier::{TelemetryTableClassifier, TelemetryTableType};
use crate::config::TelemetryConfig;
use crate::parser::TelemetryFieldParser;
use crate::result::ProtocolParseResult;

/// Telemetry protocol analyzer
///
/// Holds only configuration, so one analyzer can serve many documents, in
/// parallel if desired.
#[derive(Debug, Clone, Default)]
pub struct ProtocolAnalyzer {
    config: TelemetryConfig,
}

impl ProtocolAnalyzer {
    /// Create an analyzer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with custom configuration
    pub fn with_config(config: TelemetryConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Analyze every table of one document
    ///
    /// Never fails: malformed rows are skipped and problems are reported as
    /// warnings on the result.
    pub fn analyze(
        &self,
        tables: &[RawTable],
        document_title: &str,
        paragraphs: Option<&[String]>,
    ) -> ProtocolParseResult {
        let meta = DocumentMeta::infer(document_title, paragraphs, &self.config.document);
        let mut result = ProtocolParseResult::new(
            meta.system_name,
            document_title.to_string(),
            meta.endianness,
        );

        let classifier = TelemetryTableClassifier::with_config(&self.config);
        let parser = TelemetryFieldParser::new();
        let detection = classifier.detect(tables);

        for mut detected in detection.tables {
            detected.fields = parser.parse(&tables[detected.table_index]);
            if detected.fields.is_empty() {
                push_warning(
                    &mut result,
                    format!("Table {} yielded no telemetry fields", detected.table_index + 1),
                );
            }

            match detected.table_type {
                TelemetryTableType::Async => result.async_tables.push(detected.clone()),
                TelemetryTableType::Sync => result.sync_tables.push(detected.clone()),
                TelemetryTableType::Unknown => {
                    push_warning(
                        &mut result,
                        format!(
                            "Table {} ({}) could not be classified as sync or async; treated as sync",
                            detected.table_index + 1,
                            detected.title
                        ),
                    );
                    result.sync_tables.push(detected.clone());
                }
            }
            result.all_detected_tables.push(detected);
        }

        result.sync_channels =
            extract_channel_info(tables, &detection.can_id_tables, TelemetryTableType::Sync);
        result.async_channels =
            extract_channel_info(tables, &detection.can_id_tables, TelemetryTableType::Async);
        if result.sync_channels.is_empty() {
            debug!("No sync channels derived, using placeholders");
            result.sync_channels = ChannelInfo::placeholders();
        }
        if result.async_channels.is_empty() {
            debug!("No async channels derived, using placeholders");
            result.async_channels = ChannelInfo::placeholders();
        }

        if result.all_detected_tables.is_empty() {
            push_warning(&mut result, "No telemetry tables found in document".to_string());
        }

        info!(
            "Analyzed {:?}: system {}, {} sync fields, {} async fields, {} warnings",
            document_title,
            result.system_name,
            result.sync_field_count(),
            result.async_field_count(),
            result.warnings.len()
        );
        result
    }
}

fn push_warning(result: &mut ProtocolParseResult, message: String) {
    warn!("{}", message);
    result.warnings.push(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmtc_table::Endianness;

    #[test]
    fn test_empty_document() {
        let result = ProtocolAnalyzer::new().analyze(&[], "空文档", None);
        assert_eq!(result.system_name, "SYS");
        assert_eq!(result.default_endianness, Endianness::Big);
        assert!(result.has_warnings());
        assert_eq!(result.sync_channels, ChannelInfo::placeholders());
        assert_eq!(result.async_channels, ChannelInfo::placeholders());
    }

    #[test]
    fn test_routes_tables_by_type() {
        let sync = RawTable::from_rows(vec![
            vec!["字序", "数据内容", "字节长度"],
            vec!["W0", "同步码", "1"],
            vec!["W1", "状态", "1"],
        ])
        .with_title("同步遥测格式");
        let asynchronous = sync.clone().with_title("异步遥测格式");

        let result = ProtocolAnalyzer::new().analyze(&[sync, asynchronous], "电源控制器协议", None);
        assert_eq!(result.system_name, "PCU");
        assert_eq!(result.sync_tables.len(), 1);
        assert_eq!(result.async_tables.len(), 1);
        assert_eq!(result.sync_field_count(), 2);
        assert_eq!(result.async_field_count(), 2);
        assert_eq!(result.all_detected_tables.len(), 2);
        assert!(!result.has_warnings());
    }
}
