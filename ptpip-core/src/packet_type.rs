//! PTP/IP packet type definitions

use std::fmt;

/// Packet types
///
/// The second header field of every PTP/IP frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PacketType {
    // Channel initialization
    InitCommandRequest = 1,
    InitCommandAck = 2,
    InitEventRequest = 3,
    InitEventAck = 4,
    InitFail = 5,

    // Transactions
    CommandRequest = 6,
    CommandResponse = 7,
    Event = 8,

    // Data phase
    StartData = 9,
    Data = 10,
    CancelTransaction = 11,
    EndData = 12,
}

impl PacketType {
    /// Map a raw type field, `None` for values PTP/IP does not define
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::InitCommandRequest),
            2 => Some(Self::InitCommandAck),
            3 => Some(Self::InitEventRequest),
            4 => Some(Self::InitEventAck),
            5 => Some(Self::InitFail),
            6 => Some(Self::CommandRequest),
            7 => Some(Self::CommandResponse),
            8 => Some(Self::Event),
            9 => Some(Self::StartData),
            10 => Some(Self::Data),
            11 => Some(Self::CancelTransaction),
            12 => Some(Self::EndData),
            _ => None,
        }
    }

    /// Check if this packet belongs to a data phase
    pub fn is_data_phase(self) -> bool {
        matches!(self, Self::StartData | Self::Data | Self::EndData)
    }

    /// Check if this packet is only valid during channel init
    pub fn is_init(self) -> bool {
        matches!(
            self,
            Self::InitCommandRequest
                | Self::InitCommandAck
                | Self::InitEventRequest
                | Self::InitEventAck
                | Self::InitFail
        )
    }

    /// Get packet type name
    pub fn name(self) -> &'static str {
        match self {
            Self::InitCommandRequest => "INIT_COMMAND_REQUEST",
            Self::InitCommandAck => "INIT_COMMAND_ACK",
            Self::InitEventRequest => "INIT_EVENT_REQUEST",
            Self::InitEventAck => "INIT_EVENT_ACK",
            Self::InitFail => "INIT_FAIL",
            Self::CommandRequest => "CMD_REQUEST",
            Self::CommandResponse => "CMD_RESPONSE",
            Self::Event => "EVENT",
            Self::StartData => "START_DATA",
            Self::Data => "DATA",
            Self::CancelTransaction => "CANCEL",
            Self::EndData => "END_DATA",
        }
    }
}

impl From<PacketType> for u32 {
    fn from(packet_type: PacketType) -> u32 {
        packet_type as u32
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), *self as u32)
    }
}
