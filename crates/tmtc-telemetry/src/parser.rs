//! Telemetry field parser
//!
//! Turns the data rows of a table already classified as a telemetry table
//! into [`ProtocolTelemetryField`]s. Parsing runs in two passes:
//!
//! 1. every data row becomes a [`RowRecord`] (notation, bit field, unit,
//!    enum and type extraction)
//! 2. continuation rows (no name and no bit field, or a name cell merged
//!    down from the row above) are folded into the preceding field

use tmtc_table::text::{compact, find_column_excluding};
use tmtc_table::RawTable;
use tracing::{debug, trace};

use crate::field::ProtocolTelemetryField;
use crate::notation::{self, BitField};
use crate::remarks;

/// Exact header cell markers
static HEADER_MARKERS: &[&str] = &["字序", "字段", "偏移", "序号"];

static SEQUENCE_KEYWORDS: &[&str] = &["字序", "字节序号", "偏移", "序号", "位置"];
static LENGTH_KEYWORDS: &[&str] = &["字节长度", "字节数", "长度"];
static NAME_KEYWORDS: &[&str] = &[
    "数据内容", "参数名称", "遥测参数", "遥测量", "内容", "名称", "含义", "字段",
];
static REMARKS_KEYWORDS: &[&str] = &["备注", "说明", "描述"];

/// Column roles of a telemetry table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Number of header rows preceding the data
    pub header_rows: usize,
    /// Byte-sequence column
    pub sequence: Option<usize>,
    /// Field name column
    pub name: Option<usize>,
    /// Byte length column
    pub length: Option<usize>,
    /// Remarks column
    pub remarks: Option<usize>,
}

impl ColumnLayout {
    /// Locate columns by header keyword, falling back to positions 0/1/2/3
    pub fn locate(table: &RawTable) -> Self {
        let header_rows = header_row_count(table);
        let search_rows = header_rows.max(1);
        let mut claimed = Vec::new();

        let sequence = claim(table, search_rows, SEQUENCE_KEYWORDS, 0, &mut claimed);
        let length = claim(table, search_rows, LENGTH_KEYWORDS, 2, &mut claimed);
        let name = claim(table, search_rows, NAME_KEYWORDS, 1, &mut claimed);
        let remarks = claim(table, search_rows, REMARKS_KEYWORDS, 3, &mut claimed);

        Self {
            header_rows,
            sequence,
            name,
            length,
            remarks,
        }
    }
}

fn claim(
    table: &RawTable,
    rows: usize,
    keywords: &[&str],
    fallback: usize,
    claimed: &mut Vec<usize>,
) -> Option<usize> {
    let col = find_column_excluding(table, rows, keywords, claimed)
        .or_else(|| (fallback < table.col_count() && !claimed.contains(&fallback)).then_some(fallback));
    if let Some(c) = col {
        claimed.push(c);
    }
    col
}

/// Number of header rows, from exact markers in the first 3 rows
///
/// A table without markers whose first cell is already byte-sequence
/// notation has no header at all.
pub fn header_row_count(table: &RawTable) -> usize {
    let last_marker_row = (0..table.row_count().min(3))
        .filter(|&r| {
            table
                .row(r)
                .any(|v| HEADER_MARKERS.contains(&compact(v).as_str()))
        })
        .last();
    match last_marker_row {
        Some(r) => r + 1,
        None if notation::is_byte_sequence(table.value(0, 0)) => 0,
        None => 1,
    }
}

/// One parsed data row, before continuation merging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    /// Field as parsed from this row alone
    pub field: ProtocolTelemetryField,
    /// Byte sequence was empty and copied from an earlier row
    pub sequence_inherited: bool,
    /// Name cell is the lower part of a vertical merge
    pub name_covered: bool,
    /// Length cell is the lower part of a vertical merge
    pub length_covered: bool,
}

impl RowRecord {
    /// Returns true if this row continues the preceding field
    pub fn is_continuation(&self) -> bool {
        (self.field.field_name.is_empty() || self.name_covered) && self.field.bit_length == 0
    }
}

/// Parser for telemetry field tables
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryFieldParser;

impl TelemetryFieldParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse every data row of a telemetry table into fields
    pub fn parse(&self, table: &RawTable) -> Vec<ProtocolTelemetryField> {
        let layout = ColumnLayout::locate(table);
        let records = self.parse_rows(table, &layout);
        let fields = merge_continuations(records);
        debug!(
            "Parsed {} telemetry fields ({} header rows, layout {:?})",
            fields.len(),
            layout.header_rows,
            layout
        );
        fields
    }

    /// First pass: one record per non-blank data row
    pub fn parse_rows(&self, table: &RawTable, layout: &ColumnLayout) -> Vec<RowRecord> {
        let cell = |r: usize, col: Option<usize>| col.map(|c| table.value(r, c)).unwrap_or("");
        let mut records = Vec::new();
        let mut last_sequence = String::new();

        for r in layout.header_rows..table.row_count() {
            let raw_sequence = cell(r, layout.sequence);
            let name = cell(r, layout.name).trim();
            let length_text = cell(r, layout.length);
            let remarks_text = cell(r, layout.remarks).trim();

            if [raw_sequence, name, length_text, remarks_text]
                .iter()
                .all(|v| v.trim().is_empty())
            {
                continue;
            }
            if is_banner_row(table, r) {
                trace!("Row {}: skipping banner row {:?}", r, raw_sequence);
                continue;
            }
            if HEADER_MARKERS.contains(&compact(raw_sequence).as_str()) {
                trace!("Row {}: skipping repeated header", r);
                continue;
            }

            let mut byte_sequence = notation::normalize_byte_sequence(raw_sequence);
            let sequence_inherited = byte_sequence.is_empty();
            if sequence_inherited {
                byte_sequence = last_sequence.clone();
            } else {
                last_sequence = byte_sequence.clone();
            }

            let byte_length = match notation::parse_length(length_text) {
                Ok(n) => n,
                Err(e) => {
                    if !length_text.trim().is_empty() {
                        trace!("Row {}: {}", r, e);
                    }
                    0
                }
            };

            let bit = BitField::parse(name);
            let mut field = ProtocolTelemetryField {
                byte_sequence,
                field_name: name.to_string(),
                byte_length,
                bit_offset: bit.map(|b| b.offset),
                bit_length: bit.map(|b| b.length).unwrap_or(0),
                remarks: remarks_text.to_string(),
                unit: first_non_empty(remarks_text, name, remarks::extract_unit),
                enum_mapping: first_non_empty(remarks_text, name, remarks::extract_enum_mapping),
                data_type: first_non_empty(remarks_text, name, remarks::extract_data_type),
                ..Default::default()
            };
            field.classify_special();

            records.push(RowRecord {
                field,
                sequence_inherited,
                name_covered: layout.name.is_some_and(|c| covered_from_above(table, r, c)),
                length_covered: layout.length.is_some_and(|c| covered_from_above(table, r, c)),
            });
        }
        records
    }
}

fn first_non_empty(primary: &str, secondary: &str, extract: fn(&str) -> String) -> String {
    let value = extract(primary);
    if value.is_empty() {
        extract(secondary)
    } else {
        value
    }
}

fn covered_from_above(table: &RawTable, row: usize, col: usize) -> bool {
    table
        .cell(row, col)
        .and_then(|cell| cell.region)
        .is_some_and(|region| region.row < row)
}

/// A row merged across every column (section label inside the table)
fn is_banner_row(table: &RawTable, row: usize) -> bool {
    table.col_count() > 1
        && table
            .cell(row, 0)
            .and_then(|cell| cell.region)
            .is_some_and(|region| region.col == 0 && region.cols == table.col_count())
}

/// Second pass: fold continuation rows into the preceding field
pub fn merge_continuations(records: Vec<RowRecord>) -> Vec<ProtocolTelemetryField> {
    let mut fields: Vec<ProtocolTelemetryField> = Vec::with_capacity(records.len());
    for record in records {
        if record.is_continuation() {
            if let Some(prev) = fields.pop() {
                fields.push(absorb_continuation(prev, &record));
                continue;
            }
        }
        fields.push(record.field);
    }
    fields
}

/// Merge a continuation row into the field it continues
pub fn absorb_continuation(
    prev: ProtocolTelemetryField,
    record: &RowRecord,
) -> ProtocolTelemetryField {
    let mut merged = prev;
    if !record.sequence_inherited {
        if let Some(range) =
            notation::extend_range(&merged.byte_sequence, &record.field.byte_sequence)
        {
            merged.byte_sequence = range;
            if !record.length_covered {
                merged.byte_length = merged.byte_length.saturating_add(record.field.byte_length);
            }
        }
    }
    merged.backfill_from(&record.field);
    merged
}
