//! Error types for ptpip-core

use bytes::Bytes;

/// Result type alias for ptpip-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fewer than 8 bytes available for the packet header
    #[error("Truncated header: need 8 bytes, got {actual}")]
    TruncatedHeader {
        actual: usize,
    },

    /// Declared packet length exceeds the bytes available
    #[error("Truncated packet: declared {declared} bytes, {available} available")]
    Truncated {
        declared: usize,
        available: usize,
    },

    /// A length field disagrees with the packet shape or the declared data size
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        expected: u64,
        actual: u64,
    },

    /// Packet type not defined by PTP/IP. `raw` holds the whole frame so it can be skipped.
    #[error("Unknown packet type {packet_type} ({} bytes)", .raw.len())]
    UnknownPacketType {
        packet_type: u32,
        raw: Bytes,
    },

    /// A known packet arrived where a different one was required
    #[error("Unexpected packet: expected {expected}, got {actual}")]
    UnexpectedPacketType {
        expected: crate::packet_type::PacketType,
        actual: crate::packet_type::PacketType,
    },

    /// Data phase field outside the defined values
    #[error("Invalid data phase: {0}")]
    InvalidDataPhase(u32),

    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),
}

impl Error {
    /// More bytes may complete the packet
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::TruncatedHeader { .. } | Self::Truncated { .. })
    }

    /// The offending frame can be skipped and decoding resumed
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::UnknownPacketType { .. })
    }
}
