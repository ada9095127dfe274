//! Integration tests for telemetry analysis
//!
//! These tests verify:
//! - End-to-end analysis of a small document with sync, async and CAN-ID tables
//! - Classification of tables that carry no telemetry
//! - Notation normalization over generated inputs

use tmtc_table::{AnalyzerConfig, Endianness, MergedRegion, RawTable};
use tmtc_telemetry::notation::{is_byte_sequence, normalize_byte_sequence};
use tmtc_telemetry::{
    ChannelInfo, ProtocolAnalyzer, ProtocolParseResult, TelemetryConfig, TelemetryTableClassifier,
    TelemetryTableType,
};

fn sync_table() -> RawTable {
    RawTable::from_rows(vec![
        vec!["字序", "数据内容", "字节长度", "备注"],
        vec!["W0", "同步头", "1", "固定为0xEB"],
        vec!["Dh", "数据长度高字节", "1", ""],
        vec!["Dl", "数据长度低字节", "1", ""],
        vec!["W3", "b7-b4:阀门状态", "1", "0x0-关闭|0x1-打开"],
        vec!["", "b3-b0:备用", "", ""],
        vec!["W4", "母线电压", "2", "当量:0.01V，类型:uint16"],
        vec!["W5", "", "", ""],
        vec!["SUM", "累加和", "1", ""],
    ])
    .with_merge(MergedRegion::new(6, 1, 2, 1))
    .unwrap()
    .with_merge(MergedRegion::new(6, 2, 2, 1))
    .unwrap()
    .with_title("表3 同步遥测数据格式")
}

fn async_table() -> RawTable {
    RawTable::from_rows(vec![
        vec!["字节序号", "参数名称", "字节数", "说明"],
        vec!["B0", "事件码", "1", "0x01-过流|0x02-欠压"],
        vec!["B1", "事件计数", "1", ""],
        vec!["B2", "温度", "1", "单位:℃"],
    ])
    .with_section_heading("4.2 异步遥测")
}

fn can_id_table() -> RawTable {
    RawTable::from_rows(vec![
        vec!["命令", "优先级", "总线标志", "数据类型", "目的地址", "源地址", "通道"],
        vec!["遥测请求", "011", "0", "00001", "00001", "01011", "A"],
        vec!["同步遥测返回", "011", "0", "00010", "01011", "00001", "A"],
        vec!["同步遥测返回", "011", "1", "00010", "01011", "00001", "B"],
        vec!["异步遥测返回", "011", "0", "00011", "01011", "00001", "A"],
    ])
}

fn revision_history() -> RawTable {
    RawTable::from_rows(vec![
        vec!["版本", "日期", "修改内容"],
        vec!["V1.0", "2023-01-01", "初稿"],
        vec!["V1.1", "2023-03-01", "增加异步遥测"],
    ])
}

// ============================================================================
// End-to-End Analysis
// ============================================================================

#[test]
fn analyze_full_document() {
    let tables = vec![revision_history(), sync_table(), can_id_table(), async_table()];
    let paragraphs = vec!["多字节数据采用小端格式".to_string()];

    let result =
        ProtocolAnalyzer::new().analyze(&tables, "热控单机通信协议", Some(&paragraphs));

    assert_eq!(result.system_name, "TCS");
    assert_eq!(result.default_endianness, Endianness::Little);
    assert_eq!(result.all_detected_tables.len(), 2);
    assert_eq!(result.sync_tables.len(), 1);
    assert_eq!(result.async_tables.len(), 1);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let sync = &result.sync_tables[0];
    assert_eq!(sync.table_index, 1);
    let fields = &sync.fields;
    let sequences: Vec<_> = fields.iter().map(|f| f.byte_sequence.as_str()).collect();
    assert_eq!(sequences, vec!["W0", "Dh", "Dl", "W3", "W3", "W4-W5", "SUM"]);

    assert!(fields[1].is_header_field && fields[2].is_header_field);
    assert_eq!((fields[3].bit_offset, fields[3].bit_length), (Some(4), 4));
    assert_eq!(fields[3].enum_mapping, "0x0-关闭|0x1-打开");
    assert!(fields[4].is_reserved_field);
    assert_eq!(fields[5].byte_length, 2);
    assert_eq!(fields[5].unit, "V");
    assert_eq!(fields[5].data_type, "UINT16");
    assert!(fields[6].is_checksum_field);

    let async_fields = &result.async_tables[0].fields;
    assert_eq!(async_fields.len(), 3);
    assert_eq!(async_fields[0].enum_mapping, "0x01-过流|0x02-欠压");
    assert_eq!(async_fields[2].unit, "℃");

    let sync_names: Vec<_> = result.sync_channels.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(sync_names, vec!["A通道", "B通道"]);
    assert_eq!(result.async_channels.len(), 1);
    assert!(result.sync_channels.iter().all(|c| c.frame_id.len() == 10));
}

#[test]
fn two_field_document_with_unit() {
    let table = RawTable::from_rows(vec![
        vec!["字序", "数据内容", "字节长度", "备注"],
        vec!["W0", "同步码", "1", ""],
        vec!["W1", "系统状态: 单位:V", "1", ""],
    ])
    .with_title("同步遥测");

    let result = ProtocolAnalyzer::new().analyze(&[table], "电源控制器通信协议", None);
    assert_eq!(result.system_name, "PCU");
    assert_eq!(result.sync_field_count(), 2);
    assert_eq!(result.sync_tables[0].fields[1].unit, "V");
    assert_eq!(result.async_field_count(), 0);
    assert_eq!(result.sync_channels, ChannelInfo::placeholders());
}

#[test]
fn unclassified_tables_default_to_sync_with_warning() {
    let table = sync_table().with_title("遥测数据格式");
    let result = ProtocolAnalyzer::new().analyze(
        &[
            table.clone().with_title("同步遥测"),
            table.clone().with_title("异步遥测"),
            table.clone(),
            table,
        ],
        "协议",
        None,
    );
    // the first unclassified table is resolved silently, the second warns
    assert_eq!(result.sync_tables.len(), 3);
    assert_eq!(result.async_tables.len(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("treated as sync"));
}

#[test]
fn document_without_telemetry_warns() {
    let result = ProtocolAnalyzer::new().analyze(&[revision_history()], "协议", None);
    assert!(result.all_detected_tables.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.async_channels, ChannelInfo::placeholders());
}

#[test]
fn configured_system_name_and_thresholds() {
    let config = TelemetryConfig {
        document: AnalyzerConfig {
            extra_system_names: vec![("有效载荷管理".to_string(), "PLM".to_string())],
            ..Default::default()
        },
        min_content_matches: 2,
        ..Default::default()
    };
    let table = RawTable::from_rows(vec![
        vec!["位置", "参数"],
        vec!["W0", "帧头"],
        vec!["W1", "状态"],
    ])
    .with_title("同步遥测");

    let result = ProtocolAnalyzer::with_config(config).analyze(&[table], "有效载荷管理单元协议", None);
    assert_eq!(result.system_name, "PLM");
    assert_eq!(result.sync_field_count(), 2);
}

#[test]
fn result_serializes_to_json() {
    let result = ProtocolAnalyzer::new().analyze(&[sync_table()], "电源协议", None);
    let json = serde_json::to_string(&result).unwrap();
    let back: ProtocolParseResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn classifier_ignores_non_telemetry_tables() {
    let detection = TelemetryTableClassifier::new().detect(&[
        revision_history(),
        can_id_table(),
        RawTable::default(),
    ]);
    assert!(detection.tables.is_empty());
    assert_eq!(detection.can_id_tables, vec![1]);
}

#[test]
fn oversized_lengths_do_not_abort_analysis() {
    let table = RawTable::from_rows(vec![
        vec!["字序", "数据内容", "字节长度", "备注"],
        vec!["W0", "数据块", "4294967295", ""],
        vec!["W1", "", "4294967295", ""],
        vec!["W2", "帧计数", "1", ""],
    ])
    .with_title("同步遥测数据格式");
    let result = ProtocolAnalyzer::new().analyze(&[table], "协议", None);
    assert_eq!(result.sync_field_count(), 2);
    assert_eq!(result.sync_tables[0].fields[0].byte_length, u32::MAX);
}

#[test]
fn classifier_reads_sheet_name() {
    let table = async_table().with_section_heading("").with_sheet_name("突发遥测");
    let detection = TelemetryTableClassifier::new().detect(&[table]);
    assert_eq!(detection.tables[0].table_type, TelemetryTableType::Async);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalization_is_idempotent(raw in "[wWbB]?[0-9]{1,3}( ?[-~–] ?[wWbB]?[0-9]{1,3})?") {
            let once = normalize_byte_sequence(&raw);
            prop_assert_eq!(normalize_byte_sequence(&once), once.clone());
        }

        #[test]
        fn normalization_is_idempotent_for_any_text(raw in any::<String>()) {
            let once = normalize_byte_sequence(&raw);
            prop_assert_eq!(normalize_byte_sequence(&once), once.clone());
        }

        #[test]
        fn bare_ranges_gain_prefix(start in 0u32..100, end in 0u32..100) {
            let normalized = normalize_byte_sequence(&format!("w{} - {}", start, end));
            prop_assert_eq!(normalized, format!("W{}-W{}", start, end));
        }

        #[test]
        fn prefixed_sequences_are_recognized(n in 0u32..1000, prefix in "[wWbB]") {
            let text = format!("{}{}", prefix, n);
            prop_assert!(is_byte_sequence(&text));
        }

        #[test]
        fn header_keywords_mark_telemetry(extra in "[a-z]{0,5}") {
            let table = RawTable::from_rows(vec![
                vec![format!("字序{}", extra), "数据内容".to_string(), "字节长度".to_string()],
                vec!["x".to_string(), "y".to_string(), "1".to_string()],
                vec!["x".to_string(), "y".to_string(), "1".to_string()],
            ]);
            prop_assert!(TelemetryTableClassifier::new().is_telemetry_table(&table));
        }
    }
}
