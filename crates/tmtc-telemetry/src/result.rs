//! Telemetry parse result

use serde::{Deserialize, Serialize};
use tmtc_table::Endianness;

use crate::channel::ChannelInfo;
use crate::classifier::DetectedTelemetryTable;

/// Structured telemetry description of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParseResult {
    /// Subsystem abbreviation
    pub system_name: String,
    /// Document title as supplied
    pub document_title: String,
    /// Declared byte order
    pub default_endianness: Endianness,
    /// Synchronous telemetry tables with parsed fields
    pub sync_tables: Vec<DetectedTelemetryTable>,
    /// Asynchronous telemetry tables with parsed fields
    pub async_tables: Vec<DetectedTelemetryTable>,
    /// Channels carrying synchronous telemetry
    pub sync_channels: Vec<ChannelInfo>,
    /// Channels carrying asynchronous telemetry
    pub async_channels: Vec<ChannelInfo>,
    /// Every detected telemetry table, in document order
    pub all_detected_tables: Vec<DetectedTelemetryTable>,
    /// Problems worth showing to the user
    pub warnings: Vec<String>,
}

impl ProtocolParseResult {
    /// Empty result for a document
    pub fn new(system_name: String, document_title: String, default_endianness: Endianness) -> Self {
        Self {
            system_name,
            document_title,
            default_endianness,
            sync_tables: Vec::new(),
            async_tables: Vec::new(),
            sync_channels: Vec::new(),
            async_channels: Vec::new(),
            all_detected_tables: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Total fields across synchronous tables
    pub fn sync_field_count(&self) -> usize {
        self.sync_tables.iter().map(|t| t.fields.len()).sum()
    }

    /// Total fields across asynchronous tables
    pub fn async_field_count(&self) -> usize {
        self.async_tables.iter().map(|t| t.fields.len()).sum()
    }

    /// Returns true if any warning was recorded
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
