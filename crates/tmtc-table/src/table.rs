//! Resolved table model
//!
//! A [`RawTable`] is what the document extraction layer hands to the
//! parsing engine. Merged regions are flattened when the table is built:
//! every cell inside a region stores the region's top-left value, so lookups
//! are plain grid reads afterwards.

use crate::error::TableError;

/// Rectangular merged region, in cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergedRegion {
    /// Top row of the region
    pub row: usize,
    /// Left column of the region
    pub col: usize,
    /// Number of rows covered
    pub rows: usize,
    /// Number of columns covered
    pub cols: usize,
}

impl MergedRegion {
    /// Create a region starting at `(row, col)` spanning `rows` x `cols` cells
    pub fn new(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self {
            row,
            col,
            rows,
            cols,
        }
    }

    /// One past the last covered row, saturating at `usize::MAX`
    pub fn row_end(&self) -> usize {
        self.row.saturating_add(self.rows)
    }

    /// One past the last covered column, saturating at `usize::MAX`
    pub fn col_end(&self) -> usize {
        self.col.saturating_add(self.cols)
    }

    /// Returns true if the cell lies inside this region
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.row && row < self.row_end() && col >= self.col && col < self.col_end()
    }

    /// Returns true if the two regions share at least one cell
    pub fn overlaps(&self, other: &MergedRegion) -> bool {
        self.row < other.row_end()
            && other.row < self.row_end()
            && self.col < other.col_end()
            && other.col < self.col_end()
    }

    /// Returns true if `(row, col)` is the top-left cell of this region
    pub fn is_origin(&self, row: usize, col: usize) -> bool {
        row == self.row && col == self.col
    }
}

/// Resolved view of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCell<'a> {
    /// Row index
    pub row: usize,
    /// Column index
    pub col: usize,
    /// Logical value (the merge origin's value for merged cells)
    pub value: &'a str,
    /// Region this cell belongs to, if merged
    pub region: Option<MergedRegion>,
}

impl TableCell<'_> {
    /// Returns true if this cell is covered by a merge but is not its origin
    pub fn is_covered(&self) -> bool {
        self.region
            .map(|r| !r.is_origin(self.row, self.col))
            .unwrap_or(false)
    }
}

/// Immutable grid of resolved cell values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    row_count: usize,
    col_count: usize,
    values: Vec<String>,
    merges: Vec<MergedRegion>,
    title: Option<String>,
    section_heading: Option<String>,
    sheet_name: Option<String>,
}

impl RawTable {
    /// Build a table from rows of cell text
    ///
    /// Ragged rows are padded with empty cells up to the widest row.
    pub fn from_rows<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let row_count = rows.len();
        let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut values = Vec::with_capacity(row_count * col_count);
        for mut row in rows {
            row.resize(col_count, String::new());
            values.extend(row);
        }

        Self {
            row_count,
            col_count,
            values,
            ..Default::default()
        }
    }

    /// Flatten a merged region so every covered cell reports the origin value
    pub fn with_merge(mut self, region: MergedRegion) -> Result<Self, TableError> {
        if region.rows == 0 || region.cols == 0 {
            return Err(TableError::EmptyRegion {
                row: region.row,
                col: region.col,
            });
        }
        let fits = region
            .row
            .checked_add(region.rows)
            .is_some_and(|end| end <= self.row_count)
            && region
                .col
                .checked_add(region.cols)
                .is_some_and(|end| end <= self.col_count);
        if !fits {
            return Err(TableError::OutOfBounds {
                row: region.row,
                col: region.col,
                rows: region.rows,
                cols: region.cols,
                row_count: self.row_count,
                col_count: self.col_count,
            });
        }
        if self.merges.iter().any(|m| m.overlaps(&region)) {
            return Err(TableError::Overlap {
                row: region.row,
                col: region.col,
            });
        }

        let origin = self.values[region.row * self.col_count + region.col].clone();
        for r in region.row..region.row_end() {
            for c in region.col..region.col_end() {
                self.values[r * self.col_count + c] = origin.clone();
            }
        }
        self.merges.push(region);
        Ok(self)
    }

    /// Attach the table caption
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach the heading of the section the table appears under
    pub fn with_section_heading(mut self, heading: impl Into<String>) -> Self {
        self.section_heading = Some(heading.into());
        self
    }

    /// Attach the worksheet name (spreadsheet sources)
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns
    pub fn col_count(&self) -> usize {
        self.col_count
    }

    /// Returns true if the table has no rows, no columns, or only blank cells
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }

    /// Logical value of a cell, or `""` when out of range
    pub fn value(&self, row: usize, col: usize) -> &str {
        if row >= self.row_count || col >= self.col_count {
            return "";
        }
        &self.values[row * self.col_count + col]
    }

    /// Resolved cell, or `None` when out of range
    pub fn cell(&self, row: usize, col: usize) -> Option<TableCell<'_>> {
        if row >= self.row_count || col >= self.col_count {
            return None;
        }
        Some(TableCell {
            row,
            col,
            value: self.value(row, col),
            region: self.merges.iter().copied().find(|m| m.contains(row, col)),
        })
    }

    /// Iterate over the values of one row (empty when out of range)
    pub fn row(&self, row: usize) -> impl Iterator<Item = &str> + '_ {
        let cols = if row < self.row_count { self.col_count } else { 0 };
        (0..cols).map(move |c| self.value(row, c))
    }

    /// Merged regions applied to this table
    pub fn merges(&self) -> &[MergedRegion] {
        &self.merges
    }

    /// Table caption
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Section heading the table appears under
    pub fn section_heading(&self) -> Option<&str> {
        self.section_heading.as_deref()
    }

    /// Worksheet name
    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }
}
