//! Telecommand parse result

use serde::{Deserialize, Serialize};
use tmtc_table::Endianness;

use crate::classifier::DetectedTelecommandTable;
use crate::frame::{FrameBuilder, FrameDefaults};
use crate::model::{CanFrameInfo, DataTypeDefinition, TelecommandEntry};
use crate::notation::normalize_code;

/// Structured telecommand description of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelecommandParseResult {
    pub system_name: String,
    pub document_title: String,
    pub default_endianness: Endianness,
    /// Commands sorted by code, then name
    pub commands: Vec<TelecommandEntry>,
    /// Rows of every CAN-ID summary table
    pub frame_infos: Vec<CanFrameInfo>,
    pub data_types: Vec<DataTypeDefinition>,
    pub detected_tables: Vec<DetectedTelecommandTable>,
    pub warnings: Vec<String>,
}

impl TelecommandParseResult {
    /// Empty result for a document
    pub fn new(system_name: String, document_title: String, default_endianness: Endianness) -> Self {
        Self {
            system_name,
            document_title,
            default_endianness,
            commands: Vec::new(),
            frame_infos: Vec::new(),
            data_types: Vec::new(),
            detected_tables: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Find a command by code text in any accepted notation
    pub fn find_command(&self, code: &str) -> Option<&TelecommandEntry> {
        let code = normalize_code(code)?;
        self.commands.iter().find(|c| c.code == code)
    }

    /// Frame builder over this document's frame information
    pub fn frame_builder<'a>(&'a self, defaults: &'a FrameDefaults) -> FrameBuilder<'a> {
        FrameBuilder::new(&self.frame_infos, &self.data_types, defaults)
    }
}
