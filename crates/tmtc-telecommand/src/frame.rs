//! CAN frame header packing and command frame building
//!
//! A command travels as a 13-byte payload:
//!
//! ```text
//! +------+----------------------+------+--------------------+
//! | 0x88 | 29-bit ID (4 bytes)  | code | parameters (7)     |
//! +------+----------------------+------+--------------------+
//! ```
//!
//! The identifier packs seven bit-fields, most significant first:
//! priority (3), bus flag (1), data type (5), destination (5), source (5),
//! frame flag (2), frame count (8).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{
    CanFrameInfo, Channel, DataTypeDefinition, TelecommandEntry, TelecommandPreset,
    TelecommandType, PARAMETER_BYTES,
};

/// Leading byte of every header: extended ID, data frame, DLC 8
pub const FRAME_INFO_BYTE: u8 = 0x88;

/// Header plus code plus parameter bytes
pub const COMMAND_FRAME_LEN: usize = 5 + 1 + PARAMETER_BYTES;

/// The seven bit-fields of the extended CAN identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrameHeaderFields {
    pub priority: u8,
    pub bus_flag: u8,
    pub data_type: u8,
    pub destination: u8,
    pub source: u8,
    pub frame_flag: u8,
    pub frame_count: u8,
}

impl FrameHeaderFields {
    /// The 29-bit identifier; out-of-width values are masked
    pub fn identifier(&self) -> u32 {
        ((self.priority as u32 & 0x07) << 26)
            | ((self.bus_flag as u32 & 0x01) << 25)
            | ((self.data_type as u32 & 0x1F) << 20)
            | ((self.destination as u32 & 0x1F) << 15)
            | ((self.source as u32 & 0x1F) << 10)
            | ((self.frame_flag as u32 & 0x03) << 8)
            | (self.frame_count as u32)
    }

    /// Leading byte plus big-endian identifier
    pub fn pack(&self) -> [u8; 5] {
        let id = self.identifier().to_be_bytes();
        [FRAME_INFO_BYTE, id[0], id[1], id[2], id[3]]
    }

    /// Recover the fields from a packed header (the leading byte is ignored)
    pub fn unpack(header: &[u8; 5]) -> Self {
        let id = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
        Self {
            priority: ((id >> 26) & 0x07) as u8,
            bus_flag: ((id >> 25) & 0x01) as u8,
            data_type: ((id >> 20) & 0x1F) as u8,
            destination: ((id >> 15) & 0x1F) as u8,
            source: ((id >> 10) & 0x1F) as u8,
            frame_flag: ((id >> 8) & 0x03) as u8,
            frame_count: (id & 0xFF) as u8,
        }
    }
}

/// Pack the seven identifier fields into a 5-byte header
pub fn build_frame_header_bytes(
    priority: u8,
    bus_flag: u8,
    data_type: u8,
    destination: u8,
    source: u8,
    frame_flag: u8,
    frame_count: u8,
) -> [u8; 5] {
    FrameHeaderFields {
        priority,
        bus_flag,
        data_type,
        destination,
        source,
        frame_flag,
        frame_count,
    }
    .pack()
}

/// Header bits used when no CAN-ID summary row matches a command
///
/// These defaults describe one observed protocol family and are not
/// authoritative for other documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameDefaults {
    pub priority: u8,
    pub destination: u8,
    pub source: u8,
    pub frame_flag: u8,
    pub frame_count: u8,
    /// Data type of telemetry requests
    pub telemetry_request_data_type: u8,
    /// Data type of short (and unclassified) control commands
    pub short_data_type: u8,
    /// Data type of long control commands
    pub long_data_type: u8,
    /// Data type of reset commands
    pub reset_data_type: u8,
}

impl Default for FrameDefaults {
    fn default() -> Self {
        Self {
            priority: 0b011,
            destination: 0b01011,
            source: 0,
            frame_flag: 0,
            frame_count: 1,
            telemetry_request_data_type: 0b00001,
            short_data_type: 0b00010,
            long_data_type: 0b00011,
            reset_data_type: 0b00100,
        }
    }
}

impl FrameDefaults {
    /// Configured data type for a command type
    pub fn data_type_for(&self, command_type: TelecommandType) -> u8 {
        match command_type {
            TelecommandType::TelemetryRequest => self.telemetry_request_data_type,
            TelecommandType::Long => self.long_data_type,
            TelecommandType::Reset => self.reset_data_type,
            TelecommandType::Short | TelecommandType::Unknown => self.short_data_type,
        }
    }
}

/// Builds command frames against the frame information of one document
#[derive(Debug, Clone, Copy)]
pub struct FrameBuilder<'a> {
    frame_infos: &'a [CanFrameInfo],
    data_types: &'a [DataTypeDefinition],
    defaults: &'a FrameDefaults,
}

impl<'a> FrameBuilder<'a> {
    pub fn new(
        frame_infos: &'a [CanFrameInfo],
        data_types: &'a [DataTypeDefinition],
        defaults: &'a FrameDefaults,
    ) -> Self {
        Self {
            frame_infos,
            data_types,
            defaults,
        }
    }

    /// Header for a command type on a channel
    ///
    /// Uses the first summary row on the channel whose frame type mentions
    /// the command type, else a fallback built from [`FrameDefaults`].
    pub fn resolve_header(&self, command_type: TelecommandType, channel: Channel) -> [u8; 5] {
        let keywords = command_type.frame_keywords();
        let matched = keywords.iter().find_map(|kw| {
            self.frame_infos
                .iter()
                .find(|info| info.channel == channel && info.frame_type.contains(kw))
        });
        if let Some(info) = matched {
            return info.header;
        }

        let data_type = command_type
            .data_type_keywords()
            .iter()
            .find_map(|kw| self.data_types.iter().find(|d| d.description.contains(kw)))
            .map(|d| d.code)
            .unwrap_or_else(|| self.defaults.data_type_for(command_type));
        debug!(
            "No frame info for {:?} on {}, using fallback data type {:#07b}",
            command_type,
            channel.label(),
            data_type
        );
        build_frame_header_bytes(
            self.defaults.priority,
            channel.bus_flag(),
            data_type,
            self.defaults.destination,
            self.defaults.source,
            self.defaults.frame_flag,
            self.defaults.frame_count,
        )
    }

    /// Frame carrying the command's default parameter bytes
    pub fn build_command_frame(
        &self,
        entry: &TelecommandEntry,
        channel: Channel,
    ) -> [u8; COMMAND_FRAME_LEN] {
        self.assemble(entry, channel, &entry.default_parameter_bytes)
    }

    /// Frame carrying the bytes of a preset
    pub fn build_command_frame_with_preset(
        &self,
        entry: &TelecommandEntry,
        channel: Channel,
        preset: &TelecommandPreset,
    ) -> [u8; COMMAND_FRAME_LEN] {
        self.assemble(entry, channel, &preset.parameter_bytes)
    }

    fn assemble(
        &self,
        entry: &TelecommandEntry,
        channel: Channel,
        parameters: &[u8; PARAMETER_BYTES],
    ) -> [u8; COMMAND_FRAME_LEN] {
        let mut frame = [0u8; COMMAND_FRAME_LEN];
        frame[..5].copy_from_slice(&self.resolve_header(entry.command_type, channel));
        frame[5] = entry.code_byte;
        frame[6..].copy_from_slice(parameters);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(frame_type: &str, channel: Channel, header: [u8; 5]) -> CanFrameInfo {
        CanFrameInfo {
            frame_type: frame_type.to_string(),
            channel,
            header,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_header() {
        assert_eq!(
            build_frame_header_bytes(0b011, 0, 0b00010, 0b01011, 0, 0, 0x01),
            [0x88, 0x0C, 0x25, 0x80, 0x01]
        );
    }

    #[test]
    fn test_unpack() {
        let fields = FrameHeaderFields::unpack(&[0x88, 0x0C, 0x25, 0x80, 0x01]);
        assert_eq!(fields.priority, 0b011);
        assert_eq!(fields.data_type, 0b00010);
        assert_eq!(fields.destination, 0b01011);
        assert_eq!(fields.frame_count, 1);
        assert_eq!(fields.bus_flag, 0);
    }

    #[test]
    fn test_fields_masked() {
        let fields = FrameHeaderFields {
            priority: 0xFF,
            ..Default::default()
        };
        assert_eq!(fields.identifier(), 0x07 << 26);
    }

    #[test]
    fn test_resolve_from_frame_info() {
        let infos = vec![
            info("控制短指令", Channel::A, [0x88, 1, 2, 3, 4]),
            info("控制短指令", Channel::B, [0x88, 5, 6, 7, 8]),
            info("遥测请求", Channel::B, [0x88, 9, 9, 9, 9]),
        ];
        let defaults = FrameDefaults::default();
        let builder = FrameBuilder::new(&infos, &[], &defaults);
        assert_eq!(
            builder.resolve_header(TelecommandType::Short, Channel::B),
            [0x88, 5, 6, 7, 8]
        );
        assert_eq!(
            builder.resolve_header(TelecommandType::TelemetryRequest, Channel::B),
            [0x88, 9, 9, 9, 9]
        );
    }

    #[test]
    fn test_fallback_header() {
        let defaults = FrameDefaults::default();
        let builder = FrameBuilder::new(&[], &[], &defaults);
        assert_eq!(
            builder.resolve_header(TelecommandType::Short, Channel::A),
            [0x88, 0x0C, 0x25, 0x80, 0x01]
        );
        let b = FrameHeaderFields::unpack(&builder.resolve_header(TelecommandType::Reset, Channel::B));
        assert_eq!(b.bus_flag, 1);
        assert_eq!(b.data_type, 0b00100);
    }

    #[test]
    fn test_fallback_prefers_data_type_definition() {
        let types = vec![DataTypeDefinition {
            code: 0b10001,
            description: "遥测请求帧".to_string(),
        }];
        let defaults = FrameDefaults::default();
        let builder = FrameBuilder::new(&[], &types, &defaults);
        let header = builder.resolve_header(TelecommandType::TelemetryRequest, Channel::A);
        assert_eq!(FrameHeaderFields::unpack(&header).data_type, 0b10001);
    }

    #[test]
    fn test_command_frame_layout() {
        let defaults = FrameDefaults::default();
        let builder = FrameBuilder::new(&[], &[], &defaults);
        let mut entry = TelecommandEntry::new("加热器开", 0x21);
        entry.command_type = TelecommandType::Short;
        entry.default_parameter_bytes = [1, 2, 3, 4, 5, 6, 7];

        let frame = builder.build_command_frame(&entry, Channel::A);
        assert_eq!(frame.len(), 13);
        assert_eq!(&frame[..5], &[0x88, 0x0C, 0x25, 0x80, 0x01]);
        assert_eq!(frame[5], 0x21);
        assert_eq!(&frame[6..], &[1, 2, 3, 4, 5, 6, 7]);

        let preset = TelecommandPreset {
            name: "全开".to_string(),
            parameter_bytes: [0xFF; 7],
        };
        let frame = builder.build_command_frame_with_preset(&entry, Channel::A, &preset);
        assert_eq!(&frame[6..], &[0xFF; 7]);
    }
}
