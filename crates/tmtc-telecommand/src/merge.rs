//! Merging of command entries found in several tables
//!
//! The same command usually appears in a summary table, a frame format
//! table and a parameter detail table. Entries are keyed by their
//! normalized code (`0x1A`), so `1ah` and `0x1A` address the same command.

use std::collections::BTreeMap;

use tracing::trace;

use crate::model::{TelecommandEntry, TelecommandType};
use crate::notation::format_hex_byte;
use crate::parser::{build_alias, guess_type, ParameterDetailRow};

/// Fill the empty fields of `existing` from `incoming`
///
/// Populated fields of `existing` are never overwritten.
pub fn merge_entries(existing: TelecommandEntry, incoming: TelecommandEntry) -> TelecommandEntry {
    let mut merged = existing;
    if merged.name.is_empty() {
        merged.name = incoming.name;
    }
    if merged.parameter_description.is_empty() {
        merged.parameter_description = incoming.parameter_description;
    }
    if merged.remark.is_empty() {
        merged.remark = incoming.remark;
    }
    if merged.has_zero_payload() {
        merged.default_parameter_bytes = incoming.default_parameter_bytes;
    }
    if merged.command_type == TelecommandType::Unknown {
        merged.command_type = incoming.command_type;
    }
    if merged.alias.is_empty() {
        merged.alias = incoming.alias;
    }
    if merged.parameters.is_empty() {
        merged.parameters = incoming.parameters;
    }
    if merged.presets.is_empty() {
        merged.presets = incoming.presets;
    }
    merged
}

/// Commands of one document, keyed by normalized code
#[derive(Debug, Clone, Default)]
pub struct CommandMap {
    entries: BTreeMap<String, TelecommandEntry>,
}

impl CommandMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct commands
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a command by its code byte
    pub fn get(&self, code_byte: u8) -> Option<&TelecommandEntry> {
        self.entries.get(&format_hex_byte(code_byte))
    }

    /// Insert an entry, merging it into any entry with the same code
    pub fn insert(&mut self, entry: TelecommandEntry) {
        let key = format_hex_byte(entry.code_byte);
        let merged = match self.entries.remove(&key) {
            Some(existing) => merge_entries(existing, entry),
            None => entry,
        };
        self.entries.insert(key, merged);
    }

    /// Attach the preset and parameters of a detail row to its command
    ///
    /// A command named only in a detail table is created from the row.
    /// Parameters already present with the same start byte and length are
    /// skipped.
    pub fn attach_detail(&mut self, row: ParameterDetailRow) {
        let key = format_hex_byte(row.code_byte);
        let entry = self.entries.entry(key).or_insert_with(|| {
            trace!("Detail row {:?} creates command {:#04X}", row.name, row.code_byte);
            let mut entry = TelecommandEntry::new(row.name.clone(), row.code_byte);
            entry.command_type = guess_type(&row.name, "");
            entry.alias = build_alias(&row.name);
            entry
        });

        if !entry.presets.contains(&row.preset) {
            entry.presets.push(row.preset);
        }
        for parameter in row.parameters {
            let duplicate = entry
                .parameters
                .iter()
                .any(|p| p.start_byte == parameter.start_byte && p.length == parameter.length);
            if !duplicate {
                entry.parameters.push(parameter);
            }
        }
    }

    /// Entries sorted by code then name, each with a non-empty alias
    pub fn into_sorted(self) -> Vec<TelecommandEntry> {
        let mut commands: Vec<TelecommandEntry> = self
            .entries
            .into_values()
            .map(|mut entry| {
                if entry.alias.is_empty() {
                    entry.alias = build_alias(&entry.name);
                }
                entry
            })
            .collect();
        commands.sort_by(|a, b| a.code_byte.cmp(&b.code_byte).then_with(|| a.name.cmp(&b.name)));
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TelecommandParameter, TelecommandPreset};

    fn entry(name: &str, code: u8) -> TelecommandEntry {
        TelecommandEntry::new(name, code)
    }

    #[test]
    fn test_first_entry_wins() {
        let mut first = entry("加热器开", 0x21);
        first.remark = "summary".to_string();
        first.command_type = TelecommandType::Short;
        let mut second = entry("Heater on", 0x21);
        second.remark = "frame".to_string();
        second.default_parameter_bytes = [1, 0, 0, 0, 0, 0, 0];
        second.command_type = TelecommandType::Reset;

        let merged = merge_entries(first, second);
        assert_eq!(merged.name, "加热器开");
        assert_eq!(merged.remark, "summary");
        assert_eq!(merged.command_type, TelecommandType::Short);
        assert_eq!(merged.default_parameter_bytes, [1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_unknown_type_filled() {
        let merged = merge_entries(entry("", 0x01), {
            let mut e = entry("遥测请求", 0x01);
            e.command_type = TelecommandType::TelemetryRequest;
            e
        });
        assert_eq!(merged.name, "遥测请求");
        assert_eq!(merged.command_type, TelecommandType::TelemetryRequest);
    }

    #[test]
    fn test_map_merges_by_code() {
        let mut map = CommandMap::new();
        map.insert(entry("关", 0x02));
        map.insert(entry("开", 0x01));
        map.insert(entry("开机", 0x01));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(0x01).map(|e| e.name.as_str()), Some("开"));

        let sorted = map.into_sorted();
        assert_eq!(sorted[0].code, "0x01");
        assert_eq!(sorted[1].alias, "OFF");
    }

    #[test]
    fn test_attach_detail() {
        let mut map = CommandMap::new();
        map.insert(entry("阈值设置", 0x22));
        let parameter = TelecommandParameter {
            name: "W1-W2".to_string(),
            start_byte: 1,
            length: 2,
            ..Default::default()
        };
        let row = ParameterDetailRow {
            code_byte: 0x22,
            name: "阈值设置".to_string(),
            preset: TelecommandPreset {
                name: "阈值设置".to_string(),
                parameter_bytes: [2, 0, 0, 0, 0, 0, 0],
            },
            parameters: vec![parameter],
        };
        map.attach_detail(row.clone());
        map.attach_detail(row);

        let command = map.get(0x22).unwrap();
        assert_eq!(command.presets.len(), 1);
        assert_eq!(command.parameters.len(), 1);
    }

    #[test]
    fn test_detail_without_command_creates_entry() {
        let mut map = CommandMap::new();
        map.attach_detail(ParameterDetailRow {
            code_byte: 0x30,
            name: "复位计数清零".to_string(),
            preset: TelecommandPreset::default(),
            parameters: Vec::new(),
        });
        let command = map.get(0x30).unwrap();
        assert_eq!(command.command_type, TelecommandType::Reset);
        assert_eq!(command.alias, "RST");
    }
}
