//! TM/TC Document Table Library
//!
//! This crate provides the shared input model for the protocol document
//! parsing engine:
//!
//! - **Table model**: [`RawTable`], an immutable grid whose merged regions
//!   are already flattened, so any cell of a merged region reports the
//!   region's logical value
//! - **Header helpers**: compacted cell text and keyword lookups used by the
//!   telemetry and telecommand classifiers
//! - **Document metadata**: system name and byte order inference from the
//!   document title and body paragraphs
//! - **Configuration**: [`AnalyzerConfig`], shared by both analyzers
//!
//! # Example
//!
//! ```rust
//! use tmtc_table::{MergedRegion, RawTable};
//!
//! let table = RawTable::from_rows(vec![
//!     vec!["字序", "数据内容", "字节长度"],
//!     vec!["W0", "同步码", "1"],
//!     vec!["W1", "", "1"],
//! ])
//! .with_merge(MergedRegion::new(1, 1, 2, 1))
//! .unwrap();
//!
//! // The covered cell resolves to the merge origin
//! assert_eq!(table.value(2, 1), "同步码");
//! // Out-of-range queries never panic
//! assert_eq!(table.value(10, 10), "");
//! ```

pub mod config;
pub mod error;
pub mod metadata;
pub mod table;
pub mod text;

pub use config::AnalyzerConfig;
pub use error::TableError;
pub use metadata::{infer_endianness, infer_system_name, DocumentMeta, Endianness};
pub use table::{MergedRegion, RawTable, TableCell};
