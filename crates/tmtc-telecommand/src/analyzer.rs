//! Telecommand analyzer
//!
//! Runs every detected table through its parser and folds the results into
//! one command list. Summary and frame format tables are merged first;
//! parameter detail tables are attached afterwards so they always find the
//! commands they refer to.

use tmtc_table::{DocumentMeta, RawTable};
use tracing::{debug, info, warn};

use crate::classifier::{DetectedTelecommandTable, TelecommandTableClassifier, TelecommandTableType};
use crate::config::TelecommandConfig;
use crate::error::ParseError;
use crate::frame::COMMAND_FRAME_LEN;
use crate::merge::CommandMap;
use crate::model::{Channel, TelecommandEntry, TelecommandPreset};
use crate::parser;
use crate::result::TelecommandParseResult;

/// Telecommand protocol analyzer
#[derive(Debug, Clone, Default)]
pub struct TelecommandAnalyzer {
    config: TelecommandConfig,
}

impl TelecommandAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TelecommandConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TelecommandConfig {
        &self.config
    }

    /// Analyze every table of one document
    pub fn analyze(
        &self,
        tables: &[RawTable],
        document_title: &str,
        paragraphs: Option<&[String]>,
    ) -> TelecommandParseResult {
        let meta = DocumentMeta::infer(document_title, paragraphs, &self.config.document);
        let mut result = TelecommandParseResult::new(
            meta.system_name,
            document_title.to_string(),
            meta.endianness,
        );

        let detected = TelecommandTableClassifier::with_config(&self.config).detect(tables);
        let mut commands = CommandMap::new();
        let (details, others): (Vec<_>, Vec<_>) = detected
            .iter()
            .partition(|d| d.table_type == TelecommandTableType::ParameterDetail);

        for table in others.into_iter().chain(details) {
            let source = &tables[table.table_index];
            let outcome = match table.table_type {
                TelecommandTableType::CommandSummary => parser::parse_command_summary(source)
                    .map(|entries| entries.into_iter().for_each(|e| commands.insert(e))),
                TelecommandTableType::CommandFrameFormat => {
                    parser::parse_command_frame_format(source)
                        .map(|entries| entries.into_iter().for_each(|e| commands.insert(e)))
                }
                TelecommandTableType::ParameterDetail => parser::parse_parameter_detail(source)
                    .map(|rows| rows.into_iter().for_each(|row| commands.attach_detail(row))),
                TelecommandTableType::CanIdSummary => parser::parse_can_id_summary(source)
                    .map(|infos| result.frame_infos.extend(infos)),
                TelecommandTableType::DataTypeDefinition => {
                    parser::parse_data_type_definitions(source)
                        .map(|types| result.data_types.extend(types))
                }
            };
            if let Err(e) = outcome {
                push_warning(&mut result, skipped_table(table, &e));
            }
        }

        result.commands = commands.into_sorted();
        result.detected_tables = detected;

        if result.commands.is_empty() {
            push_warning(&mut result, "No telecommands found in document".to_string());
        }
        if result.frame_infos.is_empty() {
            push_warning(
                &mut result,
                "No CAN-ID frame information found; fallback headers will be used".to_string(),
            );
        }

        info!(
            "Analyzed {:?}: system {}, {} commands, {} frame infos, {} warnings",
            document_title,
            result.system_name,
            result.commands.len(),
            result.frame_infos.len(),
            result.warnings.len()
        );
        result
    }

    /// Frame carrying the command's default parameter bytes
    pub fn build_command_frame(
        &self,
        result: &TelecommandParseResult,
        entry: &TelecommandEntry,
        channel: Channel,
    ) -> [u8; COMMAND_FRAME_LEN] {
        result
            .frame_builder(&self.config.frame)
            .build_command_frame(entry, channel)
    }

    /// Frame carrying the bytes of a preset
    pub fn build_command_frame_with_preset(
        &self,
        result: &TelecommandParseResult,
        entry: &TelecommandEntry,
        channel: Channel,
        preset: &TelecommandPreset,
    ) -> [u8; COMMAND_FRAME_LEN] {
        result
            .frame_builder(&self.config.frame)
            .build_command_frame_with_preset(entry, channel, preset)
    }
}

fn skipped_table(table: &DetectedTelecommandTable, error: &ParseError) -> String {
    debug!("Table {} not parsed: {}", table.table_index, error);
    format!(
        "Table {} ({}) skipped: {}",
        table.table_index + 1,
        table.table_type.name(),
        error
    )
}

fn push_warning(result: &mut TelecommandParseResult, message: String) {
    warn!("{}", message);
    result.warnings.push(message);
}
