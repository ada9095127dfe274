//! Telemetry analyzer configuration

use serde::{Deserialize, Serialize};
use tmtc_table::AnalyzerConfig;

/// Configuration for [`ProtocolAnalyzer`](crate::ProtocolAnalyzer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Document metadata inference
    pub document: AnalyzerConfig,
    /// Rows sampled by the byte-sequence content heuristic
    pub content_sample_rows: usize,
    /// Byte-sequence matches needed to accept a table by content
    pub min_content_matches: usize,
    /// Leading rows searched for header keywords
    pub header_scan_rows: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            document: AnalyzerConfig::default(),
            content_sample_rows: 10,
            min_content_matches: 3,
            header_scan_rows: 2,
        }
    }
}
