//! Error types for table construction

use thiserror::Error;

/// Errors that can occur while building a [`RawTable`](crate::RawTable)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Merge region spans zero rows or zero columns
    #[error("empty merge region at ({row}, {col})")]
    EmptyRegion { row: usize, col: usize },

    /// Merge region extends past the table bounds
    #[error("merge region ({row}, {col}) {rows}x{cols} exceeds table of {row_count}x{col_count}")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
        row_count: usize,
        col_count: usize,
    },

    /// Merge region intersects a region that was already applied
    #[error("merge region at ({row}, {col}) overlaps an existing region")]
    Overlap { row: usize, col: usize },
}
