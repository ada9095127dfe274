//! Telecommand Table Library
//!
//! This crate recovers the command set of a protocol document and encodes
//! commands as CAN frames:
//!
//! - **Classification**: CAN-ID summaries, command frame formats, command
//!   summaries, parameter details and data-type definitions
//! - **Parsing**: hex codes (`0x1A`, `1Ah`, `1A`), binary identifier fields,
//!   editable parameter slots and presets
//! - **Merging**: one entry per command code across all tables
//! - **Frames**: 5-byte extended-ID headers and 13-byte command frames
//!
//! # Example
//!
//! ```rust
//! use tmtc_table::RawTable;
//! use tmtc_telecommand::{Channel, TelecommandAnalyzer};
//!
//! let summary = RawTable::from_rows(vec![
//!     vec!["序号", "指令名称", "指令码", "指令参数"],
//!     vec!["1", "加热器开", "0x21", "无"],
//! ]);
//!
//! let analyzer = TelecommandAnalyzer::new();
//! let result = analyzer.analyze(&[summary], "热控单机通信协议", None);
//! let command = result.find_command("21h").unwrap();
//! assert_eq!(command.alias, "ON");
//!
//! let frame = analyzer.build_command_frame(&result, command, Channel::A);
//! assert_eq!(frame[..6], [0x88, 0x0C, 0x25, 0x80, 0x01, 0x21]);
//! ```

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod error;
pub mod frame;
pub mod merge;
pub mod model;
pub mod notation;
pub mod parser;
pub mod result;

pub use analyzer::TelecommandAnalyzer;
pub use classifier::{DetectedTelecommandTable, TelecommandTableClassifier, TelecommandTableType};
pub use config::TelecommandConfig;
pub use error::ParseError;
pub use frame::{build_frame_header_bytes, FrameBuilder, FrameDefaults, FrameHeaderFields};
pub use merge::{merge_entries, CommandMap};
pub use model::{
    CanFrameInfo, Channel, DataFormat, DataTypeDefinition, InputKind, TelecommandEntry,
    TelecommandParameter, TelecommandPreset, TelecommandType,
};
pub use notation::{format_hex_byte, parse_binary_field, parse_hex_byte};
pub use result::TelecommandParseResult;
