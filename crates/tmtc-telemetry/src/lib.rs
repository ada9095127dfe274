//! Telemetry Table Library
//!
//! This crate recovers telemetry frame layouts from the tables of a
//! protocol document:
//!
//! - **Classification**: finds telemetry field tables by header keywords or
//!   byte-sequence content, labels them synchronous or asynchronous, and
//!   sets aside CAN-ID summary tables
//! - **Field parsing**: byte-sequence notation (`W7-W8`, `Dh`, `SUM`),
//!   bit-field names (`b7-b4:desc`), units, enum mappings and type hints,
//!   with continuation rows folded into the preceding field
//! - **Channels**: per-channel frame IDs from CAN-ID summary tables
//!
//! # Example
//!
//! ```rust
//! use tmtc_table::RawTable;
//! use tmtc_telemetry::ProtocolAnalyzer;
//!
//! let table = RawTable::from_rows(vec![
//!     vec!["字序", "数据内容", "字节长度", "备注"],
//!     vec!["W0", "同步码", "1", ""],
//!     vec!["W1", "系统状态: 单位:V", "1", ""],
//! ])
//! .with_title("同步遥测数据格式");
//!
//! let result = ProtocolAnalyzer::new().analyze(&[table], "电源控制器通信协议", None);
//! assert_eq!(result.system_name, "PCU");
//! assert_eq!(result.sync_field_count(), 2);
//! assert_eq!(result.sync_tables[0].fields[1].unit, "V");
//! ```

pub mod analyzer;
pub mod channel;
pub mod classifier;
pub mod config;
pub mod error;
pub mod field;
pub mod notation;
pub mod parser;
pub mod remarks;
pub mod result;

pub use analyzer::ProtocolAnalyzer;
pub use channel::{extract_channel_info, ChannelInfo};
pub use classifier::{
    DetectedTelemetryTable, TelemetryDetection, TelemetryTableClassifier, TelemetryTableType,
};
pub use config::TelemetryConfig;
pub use error::NotationError;
pub use field::ProtocolTelemetryField;
pub use parser::TelemetryFieldParser;
pub use result::ProtocolParseResult;
