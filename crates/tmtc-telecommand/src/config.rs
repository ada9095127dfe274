//! Telecommand analyzer configuration

use serde::{Deserialize, Serialize};
use tmtc_table::AnalyzerConfig;

use crate::frame::FrameDefaults;

/// Configuration for [`TelecommandAnalyzer`](crate::TelecommandAnalyzer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelecommandConfig {
    /// Document metadata inference
    pub document: AnalyzerConfig,
    /// Leading rows searched for classification keywords
    pub header_scan_rows: usize,
    /// Fallback CAN header bits
    pub frame: FrameDefaults,
}

impl Default for TelecommandConfig {
    fn default() -> Self {
        Self {
            document: AnalyzerConfig::default(),
            header_scan_rows: 3,
            frame: FrameDefaults::default(),
        }
    }
}
