//! Telecommand domain model

use serde::{Deserialize, Serialize};

use crate::notation::format_hex_byte;

/// Parameter bytes carried by every command frame
pub const PARAMETER_BYTES: usize = 7;

/// Kind of telecommand, used to pick the CAN frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TelecommandType {
    /// Short control command (single frame)
    Short,
    /// Long control command (more than 7 parameter words)
    Long,
    /// Reset command
    Reset,
    /// Telemetry request
    TelemetryRequest,
    /// Not yet determined
    #[default]
    Unknown,
}

impl TelecommandType {
    /// Returns a human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            TelecommandType::Short => "控制短指令",
            TelecommandType::Long => "控制长指令",
            TelecommandType::Reset => "复位指令",
            TelecommandType::TelemetryRequest => "遥测请求",
            TelecommandType::Unknown => "未知",
        }
    }

    /// Frame-type keywords identifying this command type, in priority order
    pub fn frame_keywords(&self) -> &'static [&'static str] {
        match self {
            TelecommandType::TelemetryRequest => &["遥测请求"],
            TelecommandType::Reset => &["复位"],
            TelecommandType::Long => &["控制长"],
            TelecommandType::Short | TelecommandType::Unknown => &["控制短", "控制指令", "控制"],
        }
    }

    /// Keywords identifying this command type in a data-type definition
    ///
    /// Narrower than [`frame_keywords`](Self::frame_keywords): a bare 控制
    /// would also match the long command definition.
    pub fn data_type_keywords(&self) -> &'static [&'static str] {
        match self {
            TelecommandType::TelemetryRequest => &["遥测请求"],
            TelecommandType::Reset => &["复位"],
            TelecommandType::Long => &["控制长", "长指令"],
            TelecommandType::Short | TelecommandType::Unknown => &["控制短", "短指令"],
        }
    }
}

/// How a parameter value is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputKind {
    /// A single byte
    #[default]
    Byte,
    /// A multi-byte value spanning adjacent words
    Range,
}

/// How a parameter value is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataFormat {
    #[default]
    Hex,
    Decimal,
}

/// One editable slot of the parameter payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelecommandParameter {
    /// Slot name (`W3`, `W1-W4`)
    pub name: String,
    /// First payload byte
    pub start_byte: u32,
    /// First bit within the start byte
    pub start_bit: u32,
    /// Length in bytes
    pub length: u32,
    pub input_kind: InputKind,
    pub data_format: DataFormat,
    pub default_value: String,
    /// Allowed values, as written in the remark
    pub value_range: String,
    pub unit: String,
    pub remark: String,
}

/// A named parameter payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelecommandPreset {
    pub name: String,
    pub parameter_bytes: [u8; PARAMETER_BYTES],
}

/// One telecommand
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelecommandEntry {
    /// Command name
    pub name: String,
    /// Command code as `0xNN`
    pub code: String,
    /// Command code byte
    pub code_byte: u8,
    /// Free-text description of the parameter words
    pub parameter_description: String,
    pub remark: String,
    pub command_type: TelecommandType,
    /// Short identifier for generated code
    pub alias: String,
    /// Parameter payload sent when no preset is chosen
    pub default_parameter_bytes: [u8; PARAMETER_BYTES],
    pub parameters: Vec<TelecommandParameter>,
    pub presets: Vec<TelecommandPreset>,
}

impl TelecommandEntry {
    /// Create an entry with only its name and code set
    pub fn new(name: impl Into<String>, code_byte: u8) -> Self {
        Self {
            name: name.into(),
            code: format_hex_byte(code_byte),
            code_byte,
            ..Default::default()
        }
    }

    /// Returns true if the default payload has not been set
    pub fn has_zero_payload(&self) -> bool {
        self.default_parameter_bytes.iter().all(|&b| b == 0)
    }
}

/// Physical CAN channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Channel {
    #[default]
    A,
    B,
}

impl Channel {
    /// Channel label (`A通道` / `B通道`)
    pub fn label(&self) -> &'static str {
        match self {
            Channel::A => "A通道",
            Channel::B => "B通道",
        }
    }

    /// Bus flag bit of the CAN identifier
    pub fn bus_flag(&self) -> u8 {
        match self {
            Channel::A => 0,
            Channel::B => 1,
        }
    }

    /// Channel addressed by a bus flag bit
    pub fn from_bus_flag(flag: u8) -> Self {
        if flag & 1 == 0 {
            Channel::A
        } else {
            Channel::B
        }
    }
}

/// One row of a CAN-ID summary table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanFrameInfo {
    /// Frame type text from the summary row (`遥测请求`, `控制短指令`, ...)
    pub frame_type: String,
    pub channel: Channel,
    pub priority: u8,
    pub bus_flag: u8,
    pub data_type: u8,
    pub destination: u8,
    pub source: u8,
    pub frame_flag: u8,
    pub frame_count: u8,
    /// Packed header bytes
    pub header: [u8; 5],
}

/// Meaning of one 5-bit data-type code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTypeDefinition {
    pub code: u8,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_new() {
        let entry = TelecommandEntry::new("加热器开", 0x1A);
        assert_eq!(entry.code, "0x1A");
        assert_eq!(entry.command_type, TelecommandType::Unknown);
        assert!(entry.has_zero_payload());
    }

    #[test]
    fn test_channel_bus_flag() {
        assert_eq!(Channel::from_bus_flag(0), Channel::A);
        assert_eq!(Channel::from_bus_flag(1), Channel::B);
        assert_eq!(Channel::B.bus_flag(), 1);
        assert_eq!(Channel::A.label(), "A通道");
    }

    #[test]
    fn test_frame_keywords() {
        assert_eq!(TelecommandType::Long.frame_keywords(), &["控制长"]);
        assert_eq!(TelecommandType::Unknown.frame_keywords()[0], "控制短");
    }
}
