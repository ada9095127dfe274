//! Telemetry channel extraction from CAN-ID summary tables
//!
//! A CAN-ID summary table lists one row per frame type with its identifier
//! broken into binary bit-fields:
//!
//! ```text
//! | 命令             | 优先级 | 总线标志 | 数据类型 | 目的地址 | 源地址 | 通道 |
//! | 同步遥测返回     | 011    | 0        | 00010    | 01011    | 00001  | A    |
//! | 异步遥测返回     | 011    | 1        | 00011    | 01011    | 00001  | B    |
//! ```
//!
//! The telemetry return rows give each physical channel its frame ID.

use serde::{Deserialize, Serialize};
use tmtc_table::text::{channel_letter, compact, find_column, is_binary_token};
use tmtc_table::RawTable;
use tracing::{debug, trace};

use crate::classifier::TelemetryTableType;

/// Longest identifier (in bits) that fits the 10-hex-digit frame ID
const MAX_FRAME_ID_BITS: usize = 40;

/// Keywords marking the header rows of a CAN-ID summary table
static HEADER_KEYWORDS: &[&str] = &["命令", "优先级", "总线标志", "数据类型", "目的地址", "源地址"];

/// One physical telemetry channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel label (`A通道` / `B通道`)
    pub name: String,
    /// Frame identifier as 10 hex digits, empty for placeholders
    pub frame_id: String,
    /// Number of summary rows describing this channel
    pub frame_count: u32,
}

impl ChannelInfo {
    /// Placeholder channels used when no summary table describes any
    pub fn placeholders() -> Vec<ChannelInfo> {
        ["A通道", "B通道"]
            .iter()
            .map(|name| ChannelInfo {
                name: name.to_string(),
                frame_id: String::new(),
                frame_count: 0,
            })
            .collect()
    }
}

/// Extract the channels of one telemetry kind from CAN-ID summary tables
///
/// Rows are selected by the 命令 column: asynchronous returns mention 异步
/// and 返回, synchronous returns mention 返回 without 异步.
pub fn extract_channel_info(
    tables: &[RawTable],
    summary_indices: &[usize],
    kind: TelemetryTableType,
) -> Vec<ChannelInfo> {
    let mut channels: Vec<ChannelInfo> = Vec::new();

    for &index in summary_indices {
        let Some(table) = tables.get(index) else {
            continue;
        };
        let header_rows = header_row_count(table);
        let command_col = find_column(table, header_rows, &["命令"]).unwrap_or(0);
        let mut matched = 0usize;

        for r in header_rows..table.row_count() {
            let command = compact(table.value(r, command_col));
            if !is_return_row(&command, kind) {
                continue;
            }

            let Some(frame_id) = frame_id_from_row(table, r, command_col) else {
                trace!("Table {} row {}: no binary identifier bits", index, r);
                continue;
            };

            let channel = channel_label(table, r, &command, matched);
            matched += 1;

            match channels.iter_mut().find(|c| c.name == channel) {
                Some(existing) => existing.frame_count += 1,
                None => channels.push(ChannelInfo {
                    name: channel.to_string(),
                    frame_id,
                    frame_count: 1,
                }),
            }
        }
    }

    channels.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Extracted {} {:?} channels", channels.len(), kind);
    channels
}

fn header_row_count(table: &RawTable) -> usize {
    let is_header = |r: usize| {
        table
            .row(r)
            .any(|v| HEADER_KEYWORDS.iter().any(|k| compact(v).contains(k)))
    };
    if table.row_count() > 1 && is_header(1) {
        2
    } else {
        1
    }
}

fn is_return_row(command: &str, kind: TelemetryTableType) -> bool {
    match kind {
        TelemetryTableType::Async => command.contains("异步") && command.contains("返回"),
        TelemetryTableType::Sync => command.contains("返回") && !command.contains("异步"),
        TelemetryTableType::Unknown => false,
    }
}

/// Concatenate the binary cells of columns `1..=N-2` into a hex frame ID
pub fn frame_id_from_row(table: &RawTable, row: usize, command_col: usize) -> Option<String> {
    let cols = table.col_count();
    if cols < 3 {
        return None;
    }
    let bits: String = (1..=cols - 2)
        .filter(|&c| c != command_col)
        .map(|c| compact(table.value(row, c)))
        .filter(|v| is_binary_token(v))
        .collect();
    if bits.is_empty() || bits.len() > MAX_FRAME_ID_BITS {
        return None;
    }
    u64::from_str_radix(&bits, 2)
        .ok()
        .map(|id| format!("{:010X}", id))
}

/// Channel from the last column or command text, else by row order
fn channel_label(table: &RawTable, row: usize, command: &str, order: usize) -> &'static str {
    let last = table.value(row, table.col_count().saturating_sub(1));
    for text in [last, command] {
        match channel_letter(text) {
            Some('A') => return "A通道",
            Some('B') => return "B通道",
            _ => {}
        }
    }
    if order % 2 == 0 {
        "A通道"
    } else {
        "B通道"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RawTable {
        RawTable::from_rows(vec![
            vec!["命令", "优先级", "总线标志", "数据类型", "目的地址", "源地址", "通道"],
            vec!["遥测请求", "011", "0", "00001", "00001", "01011", "A"],
            vec!["同步遥测返回", "011", "0", "00010", "01011", "00001", "A"],
            vec!["同步遥测返回", "011", "1", "00010", "01011", "00001", "B"],
            vec!["异步遥测返回", "011", "0", "00011", "01011", "00001", "A"],
        ])
    }

    #[test]
    fn test_frame_id() {
        let table = summary();
        // 011 0 00010 01011 00001 = 0b011_0_00010_01011_00001
        assert_eq!(
            frame_id_from_row(&table, 2, 0).as_deref(),
            Some(format!("{:010X}", 0b011_0_00010_01011_00001u64).as_str())
        );
    }

    #[test]
    fn test_sync_channels() {
        let channels = extract_channel_info(&[summary()], &[0], TelemetryTableType::Sync);
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].name, "A通道");
        assert_eq!(channels[1].name, "B通道");
        assert_ne!(channels[0].frame_id, channels[1].frame_id);
        assert_eq!(channels[0].frame_id.len(), 10);
    }

    #[test]
    fn test_async_channels() {
        let channels = extract_channel_info(&[summary()], &[0], TelemetryTableType::Async);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].name, "A通道");
        assert_eq!(channels[0].frame_count, 1);
    }

    #[test]
    fn test_channel_by_row_order() {
        let table = RawTable::from_rows(vec![
            vec!["命令", "优先级", "总线标志", "数据类型", "目的地址", "源地址", "备注"],
            vec!["同步遥测返回", "011", "0", "00010", "01011", "00001", ""],
            vec!["同步遥测返回", "011", "1", "00010", "01011", "00001", ""],
        ]);
        let channels = extract_channel_info(&[table], &[0], TelemetryTableType::Sync);
        let names: Vec<_> = channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A通道", "B通道"]);
    }

    #[test]
    fn test_channel_from_bus_name() {
        let table = RawTable::from_rows(vec![
            vec!["命令", "优先级", "总线标志", "数据类型", "目的地址", "源地址", "总线"],
            vec!["同步遥测返回", "011", "1", "00010", "01011", "00001", "CAN-B"],
        ]);
        let channels = extract_channel_info(&[table], &[0], TelemetryTableType::Sync);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].name, "B通道");
    }

    #[test]
    fn test_missing_table_index() {
        assert!(extract_channel_info(&[], &[3], TelemetryTableType::Sync).is_empty());
    }

    #[test]
    fn test_placeholders() {
        let p = ChannelInfo::placeholders();
        assert_eq!(p.len(), 2);
        assert!(p.iter().all(|c| c.frame_id.is_empty()));
    }
}
