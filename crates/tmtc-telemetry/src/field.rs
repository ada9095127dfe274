//! Telemetry field model

use serde::{Deserialize, Serialize};

use crate::notation;

/// Name keywords marking reserved or padding fields
static RESERVED_KEYWORDS: &[&str] = &[
    "备用", "保留", "预留", "空闲", "填充", "reserved", "spare", "padding",
];

/// One telemetry byte or bit field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolTelemetryField {
    /// Normalized byte-sequence notation (e.g. `W7-W8`)
    pub byte_sequence: String,
    /// Field name as written in the table
    pub field_name: String,
    /// Length in bytes (0 when the cell was not numeric)
    pub byte_length: u32,
    /// Lowest bit of a sub-byte field, `None` for full-byte fields
    pub bit_offset: Option<u32>,
    /// Number of bits of a sub-byte field, 0 for full-byte fields
    pub bit_length: u32,
    /// Raw remarks text
    pub remarks: String,
    /// Extracted unit
    pub unit: String,
    /// Extracted value mapping, entries joined with `|`
    pub enum_mapping: String,
    /// Data-type hint (`UINT8`, `INT16`, ...)
    pub data_type: String,
    /// Frame length header byte (`Dh`/`Dl`)
    pub is_header_field: bool,
    /// Checksum byte
    pub is_checksum_field: bool,
    /// Reserved or padding field
    pub is_reserved_field: bool,
}

impl ProtocolTelemetryField {
    /// Returns true if the field occupies part of a byte
    pub fn is_bit_field(&self) -> bool {
        self.bit_offset.is_some() && self.bit_length > 0
    }

    /// Set the header/checksum/reserved flags from the sequence and name
    pub fn classify_special(&mut self) {
        self.is_header_field = notation::is_length_header(&self.byte_sequence);
        self.is_checksum_field = notation::is_checksum(&self.byte_sequence)
            || self.field_name.contains("校验和");
        let lower = self.field_name.to_lowercase();
        self.is_reserved_field = RESERVED_KEYWORDS.iter().any(|k| lower.contains(k));
    }

    /// Fill empty descriptive attributes from a continuation row
    pub fn backfill_from(&mut self, other: &ProtocolTelemetryField) {
        if self.remarks.is_empty() {
            self.remarks = other.remarks.clone();
        }
        if self.unit.is_empty() {
            self.unit = other.unit.clone();
        }
        if self.enum_mapping.is_empty() {
            self.enum_mapping = other.enum_mapping.clone();
        }
        if self.data_type.is_empty() {
            self.data_type = other.data_type.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(seq: &str, name: &str) -> ProtocolTelemetryField {
        let mut f = ProtocolTelemetryField {
            byte_sequence: seq.to_string(),
            field_name: name.to_string(),
            ..Default::default()
        };
        f.classify_special();
        f
    }

    #[test]
    fn test_classify_special() {
        assert!(field("Dh", "帧长高字节").is_header_field);
        assert!(field("SUM", "累加和").is_checksum_field);
        assert!(field("W31", "校验和").is_checksum_field);
        assert!(field("W5", "备用").is_reserved_field);
        assert!(field("W6", "Spare byte").is_reserved_field);

        let plain = field("W1", "工作模式");
        assert!(!plain.is_header_field && !plain.is_checksum_field && !plain.is_reserved_field);
    }

    #[test]
    fn test_backfill_keeps_populated() {
        let mut a = ProtocolTelemetryField {
            unit: "V".into(),
            ..Default::default()
        };
        let b = ProtocolTelemetryField {
            unit: "mV".into(),
            remarks: "单位:mV".into(),
            ..Default::default()
        };
        a.backfill_from(&b);
        assert_eq!(a.unit, "V");
        assert_eq!(a.remarks, "单位:mV");
    }

    #[test]
    fn test_is_bit_field() {
        let mut f = ProtocolTelemetryField::default();
        assert!(!f.is_bit_field());
        f.bit_offset = Some(4);
        f.bit_length = 4;
        assert!(f.is_bit_field());
    }
}
