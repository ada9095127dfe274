//! Telecommand table parsers
//!
//! One routine per table type. Each returns
//! [`ParseError::MissingColumn`] when the table lacks a required column and
//! otherwise skips malformed rows, logging them at `trace` level.

use lazy_static::lazy_static;
use regex::Regex;
use tmtc_table::text::{
    channel_letter, compact, contains_any, find_column, find_column_excluding, is_binary_token,
};
use tmtc_table::RawTable;
use tracing::{debug, trace};

use crate::classifier::{has_token, is_indexed_label, CAN_ID_FIELDS};
use crate::error::{ParseError, Result};
use crate::frame::build_frame_header_bytes;
use crate::model::{
    CanFrameInfo, Channel, DataFormat, DataTypeDefinition, InputKind, TelecommandEntry,
    TelecommandParameter, TelecommandPreset, TelecommandType, PARAMETER_BYTES,
};
use crate::notation::{count_word_refs, format_hex_byte, parse_binary_field, parse_hex_byte};

/// Rows considered by the header vote
const HEADER_VOTE_ROWS: usize = 4;

/// Word references above which a command needs a long frame
const SHORT_FRAME_WORDS: usize = PARAMETER_BYTES;

/// Keywords that mark a cell as header text
static HEADER_VOTE_KEYWORDS: &[&str] = &[
    "指令", "命令", "编号", "序号", "名称", "参数", "备注", "说明", "优先级", "总线", "类型",
    "地址", "帧", "取值", "含义", "定义", "通道",
];

/// First matching keyword gives the alias
static ALIAS_KEYWORDS: &[(&str, &str)] = &[
    ("遥测请求", "TMREQ"),
    ("复位", "RST"),
    ("校时", "TIME"),
    ("加电", "PWRON"),
    ("断电", "PWROFF"),
    ("开机", "ON"),
    ("关机", "OFF"),
    ("禁止", "DIS"),
    ("使能", "EN"),
    ("启动", "START"),
    ("停止", "STOP"),
    ("切换", "SW"),
    ("注入", "UPLOAD"),
    ("设置", "SET"),
    ("查询", "QUERY"),
    ("开", "ON"),
    ("关", "OFF"),
];
const DEFAULT_ALIAS: &str = "CMD";

static REMARK_KEYWORDS: &[&str] = &["备注", "说明"];
static FRAME_TYPE_KEYWORDS: &[&str] = &["命令", "帧类型", "指令类型", "名称", "类型"];

lazy_static! {
    static ref VALUE_RANGE: Regex = Regex::new(r"范围\s*[:：]\s*([^,，;；\s]+)").unwrap();
    static ref UNIT: Regex = Regex::new(r"单位\s*[:：]\s*([^,，;；\s]+)").unwrap();
}

/// Number of header rows, by keyword majority over the first rows
///
/// A row votes as a header when more than half of its non-empty cells carry
/// a header keyword or a `B<n>`/`W<n>` label. The header ends at the last
/// such row; at least one row is always treated as header.
pub fn header_row_count(table: &RawTable) -> usize {
    let is_header_cell = |cell: &str| {
        contains_any(cell, HEADER_VOTE_KEYWORDS)
            || is_indexed_label(cell, 'B')
            || is_indexed_label(cell, 'W')
            || CAN_ID_FIELDS.iter().any(|(_, abbr)| cell.eq_ignore_ascii_case(abbr))
    };

    let last_header = (0..table.row_count().min(HEADER_VOTE_ROWS))
        .filter(|&r| {
            let cells: Vec<String> = table
                .row(r)
                .map(compact)
                .filter(|c| !c.is_empty())
                .collect();
            let votes = cells.iter().filter(|c| is_header_cell(c.as_str())).count();
            !cells.is_empty() && votes * 2 > cells.len()
        })
        .last();
    last_header.map_or(1, |r| r + 1)
}

/// Command type from its name and parameter description
pub fn guess_type(name: &str, parameter_description: &str) -> TelecommandType {
    let text = format!("{}{}", name, parameter_description);
    if text.contains("遥测请求") {
        TelecommandType::TelemetryRequest
    } else if text.contains("复位") {
        TelecommandType::Reset
    } else if count_word_refs(parameter_description) > SHORT_FRAME_WORDS {
        TelecommandType::Long
    } else {
        TelecommandType::Short
    }
}

/// Short alias for a command name
pub fn build_alias(name: &str) -> String {
    ALIAS_KEYWORDS
        .iter()
        .find(|(kw, _)| name.contains(kw))
        .map_or(DEFAULT_ALIAS, |(_, alias)| *alias)
        .to_string()
}

/// Columns labelled `<prefix><n>` in the header rows, sorted by `n`
fn indexed_columns(table: &RawTable, header_rows: usize, prefix: char) -> Vec<(u32, usize)> {
    let mut columns: Vec<(u32, usize)> = (0..table.col_count())
        .filter_map(|c| {
            (0..header_rows.max(1)).find_map(|r| {
                let cell = compact(table.value(r, c));
                if is_indexed_label(&cell, prefix) {
                    cell[1..].parse().ok().map(|n| (n, c))
                } else {
                    None
                }
            })
        })
        .collect();
    columns.sort_unstable();
    columns.dedup_by_key(|(n, _)| *n);
    columns
}

/// Parse a command summary table (指令名称 / 指令码 / 指令参数)
pub fn parse_command_summary(table: &RawTable) -> Result<Vec<TelecommandEntry>> {
    let header_rows = header_row_count(table);
    let name_col =
        find_column(table, header_rows, &["指令名称"]).ok_or(ParseError::MissingColumn("指令名称"))?;
    let code_col =
        find_column(table, header_rows, &["指令码"]).ok_or(ParseError::MissingColumn("指令码"))?;
    let param_col = find_column(table, header_rows, &["指令参数", "参数说明", "参数"]);
    let remark_col = find_column(table, header_rows, REMARK_KEYWORDS);

    let mut entries = Vec::new();
    for r in header_rows..table.row_count() {
        let code_text = table.value(r, code_col);
        let code_byte = match parse_hex_byte(code_text) {
            Ok(b) => b,
            Err(e) => {
                trace!("Row {}: skipping command: {}", r, e);
                continue;
            }
        };

        let name = table.value(r, name_col).trim();
        let parameter_description = param_col.map_or("", |c| table.value(r, c)).trim();
        let mut entry = TelecommandEntry::new(name, code_byte);
        entry.parameter_description = parameter_description.to_string();
        entry.remark = remark_col.map_or("", |c| table.value(r, c)).trim().to_string();
        entry.command_type = guess_type(name, parameter_description);
        entry.alias = build_alias(name);
        entries.push(entry);
    }
    debug!("Parsed {} commands from summary table", entries.len());
    Ok(entries)
}

/// Parse a command frame format table (命令 / B0..B7)
///
/// `B0` carries the command code; `B1..B7` fill the default payload.
pub fn parse_command_frame_format(table: &RawTable) -> Result<Vec<TelecommandEntry>> {
    let header_rows = header_row_count(table);
    let name_col =
        find_column(table, header_rows, &["命令"]).ok_or(ParseError::MissingColumn("命令"))?;
    let byte_cols = indexed_columns(table, header_rows, 'B');
    let code_col = byte_cols
        .iter()
        .find(|(n, _)| *n == 0)
        .map(|&(_, c)| c)
        .ok_or(ParseError::MissingColumn("B0"))?;

    let mut entries = Vec::new();
    for r in header_rows..table.row_count() {
        let code_byte = match parse_hex_byte(table.value(r, code_col)) {
            Ok(b) => b,
            Err(e) => {
                trace!("Row {}: skipping frame: {}", r, e);
                continue;
            }
        };

        let name = table.value(r, name_col).trim();
        let mut entry = TelecommandEntry::new(name, code_byte);
        for &(n, c) in &byte_cols {
            if (1..=PARAMETER_BYTES as u32).contains(&n) {
                entry.default_parameter_bytes[n as usize - 1] =
                    parse_hex_byte(table.value(r, c)).unwrap_or(0);
            }
        }
        entry.command_type = guess_type(name, "");
        entry.alias = build_alias(name);
        entries.push(entry);
    }
    debug!("Parsed {} commands from frame format table", entries.len());
    Ok(entries)
}

/// One row of a parameter detail table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDetailRow {
    /// Command code byte the row belongs to
    pub code_byte: u8,
    /// Command name as written in the row
    pub name: String,
    /// Payload with every fixed byte of the row filled in
    pub preset: TelecommandPreset,
    /// Editable slots of the row
    pub parameters: Vec<TelecommandParameter>,
}

/// Parse a parameter detail table (编号 / 指令名称 / 指令码 / W0..)
pub fn parse_parameter_detail(table: &RawTable) -> Result<Vec<ParameterDetailRow>> {
    let header_rows = header_row_count(table);
    find_column(table, header_rows, &["编号"]).ok_or(ParseError::MissingColumn("编号"))?;
    let name_col =
        find_column(table, header_rows, &["指令名称"]).ok_or(ParseError::MissingColumn("指令名称"))?;
    let code_col =
        find_column(table, header_rows, &["指令码"]).ok_or(ParseError::MissingColumn("指令码"))?;
    let word_cols = indexed_columns(table, header_rows, 'W');
    if word_cols.is_empty() {
        return Err(ParseError::MissingColumn("W<n>"));
    }
    let claimed: Vec<usize> = word_cols.iter().map(|&(_, c)| c).collect();
    let remark_col = find_column_excluding(table, header_rows, REMARK_KEYWORDS, &claimed);

    let mut rows = Vec::new();
    for r in header_rows..table.row_count() {
        let code_byte = match parse_hex_byte(table.value(r, code_col)) {
            Ok(b) => b,
            Err(e) => {
                trace!("Row {}: skipping parameter row: {}", r, e);
                continue;
            }
        };

        let name = table.value(r, name_col).trim().to_string();
        let mut bytes = [0u8; PARAMETER_BYTES];
        let mut editable = Vec::new();
        for &(n, c) in &word_cols {
            if n as usize >= PARAMETER_BYTES {
                continue;
            }
            let cell = table.value(r, c);
            if cell.contains('值') {
                editable.push(n);
            } else if let Ok(b) = parse_hex_byte(cell) {
                bytes[n as usize] = b;
            }
        }

        let remark = remark_col.map_or("", |c| table.value(r, c)).trim();
        let parameters = editable_parameters(&editable, remark);
        rows.push(ParameterDetailRow {
            code_byte,
            preset: TelecommandPreset {
                name: name.clone(),
                parameter_bytes: bytes,
            },
            name,
            parameters,
        });
    }
    debug!("Parsed {} parameter detail rows", rows.len());
    Ok(rows)
}

/// Parameters for the editable word indices of one row
///
/// With several editable words, adjacent runs become one decimal range
/// parameter; isolated words stay single hex bytes.
fn editable_parameters(indices: &[u32], remark: &str) -> Vec<TelecommandParameter> {
    let value_range = capture(&VALUE_RANGE, remark);
    let unit = capture(&UNIT, remark);
    let single = |n: u32| TelecommandParameter {
        name: format!("W{}", n),
        start_byte: n,
        length: 1,
        input_kind: InputKind::Byte,
        data_format: DataFormat::Hex,
        default_value: format_hex_byte(0),
        value_range: value_range.clone(),
        unit: unit.clone(),
        remark: remark.to_string(),
        ..Default::default()
    };

    if indices.len() <= 1 {
        return indices.iter().map(|&n| single(n)).collect();
    }

    let mut runs: Vec<(u32, u32)> = Vec::new();
    for &n in indices {
        match runs.last_mut() {
            Some((_, end)) if *end + 1 == n => *end = n,
            _ => runs.push((n, n)),
        }
    }
    runs.into_iter()
        .map(|(start, end)| {
            if start == end {
                single(start)
            } else {
                TelecommandParameter {
                    name: format!("W{}-W{}", start, end),
                    start_byte: start,
                    length: end - start + 1,
                    input_kind: InputKind::Range,
                    data_format: DataFormat::Decimal,
                    default_value: "0".to_string(),
                    value_range: value_range.clone(),
                    unit: unit.clone(),
                    remark: remark.to_string(),
                    ..Default::default()
                }
            }
        })
        .collect()
}

fn capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// Locate a CAN identifier field column by keyword or abbreviation
fn field_column(table: &RawTable, header_rows: usize, keyword: &str, abbr: &str) -> Option<usize> {
    find_column(table, header_rows, &[keyword]).or_else(|| {
        (0..table.col_count()).find(|&c| {
            (0..header_rows.max(1)).any(|r| has_token(&compact(table.value(r, c)), abbr))
        })
    })
}

/// Parse a CAN-ID summary table into frame information
pub fn parse_can_id_summary(table: &RawTable) -> Result<Vec<CanFrameInfo>> {
    let header_rows = header_row_count(table);
    let mut field_cols = [0usize; 7];
    for (slot, (keyword, abbr)) in field_cols.iter_mut().zip(CAN_ID_FIELDS) {
        *slot = field_column(table, header_rows, keyword, abbr)
            .ok_or(ParseError::MissingColumn(*keyword))?;
    }
    let type_col = find_column_excluding(table, header_rows, FRAME_TYPE_KEYWORDS, &field_cols)
        .unwrap_or(0);
    let last_col = table.col_count().saturating_sub(1);

    let mut infos = Vec::new();
    'rows: for r in header_rows..table.row_count() {
        let mut values = [0u8; 7];
        for (value, &c) in values.iter_mut().zip(&field_cols) {
            let cell = table.value(r, c);
            match parse_binary_field(cell) {
                Ok(v) if is_binary_token(cell) && v <= u8::MAX as u32 => *value = v as u8,
                _ => {
                    trace!("Row {}: skipping summary row, bad field {:?}", r, cell);
                    continue 'rows;
                }
            }
        }
        let [priority, bus_flag, data_type, destination, source, frame_flag, frame_count] = values;

        let channel = match channel_letter(table.value(r, last_col)) {
            Some('A') => Channel::A,
            Some('B') => Channel::B,
            _ => Channel::from_bus_flag(bus_flag),
        };

        infos.push(CanFrameInfo {
            frame_type: table.value(r, type_col).trim().to_string(),
            channel,
            priority,
            bus_flag,
            data_type,
            destination,
            source,
            frame_flag,
            frame_count,
            header: build_frame_header_bytes(
                priority,
                bus_flag,
                data_type,
                destination,
                source,
                frame_flag,
                frame_count,
            ),
        });
    }
    debug!("Parsed {} CAN frame infos", infos.len());
    Ok(infos)
}

/// Parse a data-type definition table
///
/// The code comes from the 取值 column when present, else from 数据类型;
/// binary codes are read base 2, anything else as a hex byte.
pub fn parse_data_type_definitions(table: &RawTable) -> Result<Vec<DataTypeDefinition>> {
    let header_rows = header_row_count(table);
    let type_col =
        find_column(table, header_rows, &["数据类型"]).ok_or(ParseError::MissingColumn("数据类型"))?;
    let value_col = find_column_excluding(table, header_rows, &["取值"], &[type_col]);
    let meaning_col = find_column_excluding(
        table,
        header_rows,
        &["含义", "说明", "定义"],
        &[Some(type_col), value_col].into_iter().flatten().collect::<Vec<_>>(),
    );

    let (code_col, description_col) = match (value_col, meaning_col) {
        (Some(v), Some(m)) => (v, m),
        (Some(v), None) => (v, type_col),
        (None, Some(m)) => (type_col, m),
        (None, None) => return Err(ParseError::MissingColumn("含义")),
    };

    let mut definitions = Vec::new();
    for r in header_rows..table.row_count() {
        let code_text = compact(table.value(r, code_col));
        let code = if is_binary_token(&code_text) {
            parse_binary_field(&code_text).ok()
        } else {
            parse_hex_byte(&code_text).ok().map(u32::from)
        };
        let description = table.value(r, description_col).trim();
        match code {
            Some(code) if code <= 0x1F && !description.is_empty() => {
                definitions.push(DataTypeDefinition {
                    code: code as u8,
                    description: description.to_string(),
                })
            }
            _ => trace!("Row {}: skipping data type {:?}", r, code_text),
        }
    }
    debug!("Parsed {} data type definitions", definitions.len());
    Ok(definitions)
}
