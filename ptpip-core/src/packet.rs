//! PTP/IP frame structure and encoding/decoding

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    constants::MAX_PACKET_SIZE,
    error::{Error, Result},
    packet_type::PacketType,
};

/// PTP/IP frame
///
/// # Frame Structure
///
/// ```text
/// ┌─────────────┬─────────────┬──────────────────────┐
/// │   Length    │    Type     │       Payload        │
/// │   4 bytes   │   4 bytes   │  Length - 8 bytes    │
/// │  (LE u32)   │  (LE u32)   │  (type specific)     │
/// └─────────────┴─────────────┴──────────────────────┘
/// ```
///
/// `Length` always counts the 8 header bytes.
///
/// # Examples
///
/// ```
/// use ptpip_core::{Packet, PacketType};
///
/// let packet = Packet::with_payload(PacketType::InitEventRequest, vec![1, 0, 0, 0]);
/// let encoded = packet.encode();
///
/// let decoded = Packet::decode(&encoded).unwrap();
/// assert_eq!(packet, decoded);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    /// Packet type
    pub packet_type: PacketType,

    /// Everything after the header
    pub payload: Bytes,
}

impl Packet {
    /// Packet header size in bytes
    pub const HEADER_SIZE: usize = crate::constants::HEADER_SIZE;

    /// Create a packet with empty payload
    pub fn new(packet_type: PacketType) -> Self {
        Self {
            packet_type,
            payload: Bytes::new(),
        }
    }

    /// Create a packet with payload
    pub fn with_payload(packet_type: PacketType, payload: impl Into<Bytes>) -> Self {
        Self {
            packet_type,
            payload: payload.into(),
        }
    }

    /// Total frame length, header included
    pub fn length(&self) -> usize {
        Self::HEADER_SIZE + self.payload.len()
    }

    /// Encode packet to bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use ptpip_core::{Packet, PacketType};
    ///
    /// let bytes = Packet::new(PacketType::InitEventAck).encode();
    /// assert_eq!(&bytes[..], &[8, 0, 0, 0, 4, 0, 0, 0]);
    /// ```
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.length());

        buf.put_u32_le(self.length() as u32);
        buf.put_u32_le(self.packet_type.into());
        buf.put_slice(&self.payload);

        buf
    }

    /// Read the declared length and raw type of the frame at the start of `buf`
    ///
    /// # Errors
    ///
    /// - `TruncatedHeader` when fewer than 8 bytes are available
    /// - `LengthMismatch` when the declared length is shorter than the header
    ///   or larger than [`MAX_PACKET_SIZE`]
    pub fn peek_header(buf: &[u8]) -> Result<(usize, u32)> {
        if buf.len() < Self::HEADER_SIZE {
            return Err(Error::TruncatedHeader { actual: buf.len() });
        }

        let mut header = &buf[..Self::HEADER_SIZE];
        let length = header.get_u32_le() as usize;
        let packet_type = header.get_u32_le();

        if length < Self::HEADER_SIZE {
            return Err(Error::LengthMismatch {
                expected: Self::HEADER_SIZE as u64,
                actual: length as u64,
            });
        }
        if length > MAX_PACKET_SIZE {
            return Err(Error::LengthMismatch {
                expected: MAX_PACKET_SIZE as u64,
                actual: length as u64,
            });
        }

        Ok((length, packet_type))
    }

    /// Decode the frame at the start of `buf`
    ///
    /// Bytes past the declared length are left alone.
    ///
    /// # Errors
    ///
    /// - `TruncatedHeader` / `LengthMismatch` from [`Packet::peek_header`]
    /// - `Truncated` when the declared length exceeds `buf`
    /// - `UnknownPacketType` carrying the whole frame so the caller can skip it
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let (length, raw_type) = Self::peek_header(buf)?;

        if length > buf.len() {
            return Err(Error::Truncated {
                declared: length,
                available: buf.len(),
            });
        }

        let packet_type = PacketType::from_raw(raw_type).ok_or_else(|| Error::UnknownPacketType {
            packet_type: raw_type,
            raw: Bytes::copy_from_slice(&buf[..length]),
        })?;

        Ok(Self {
            packet_type,
            payload: Bytes::copy_from_slice(&buf[Self::HEADER_SIZE..length]),
        })
    }

    /// Split one complete frame off the front of a receive buffer
    ///
    /// Returns `Ok(None)` when `buf` does not hold a complete frame yet.
    /// A frame of unknown type is consumed before its error is returned, so
    /// decoding can resume with the next frame.
    pub fn split_frame(buf: &mut BytesMut) -> Result<Option<Self>> {
        let (length, raw_type) = match Self::peek_header(buf) {
            Ok(header) => header,
            Err(Error::TruncatedHeader { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        if length > buf.len() {
            return Ok(None);
        }

        let mut frame = buf.split_to(length).freeze();

        let Some(packet_type) = PacketType::from_raw(raw_type) else {
            return Err(Error::UnknownPacketType {
                packet_type: raw_type,
                raw: frame,
            });
        };

        frame.advance(Self::HEADER_SIZE);

        Ok(Some(Self {
            packet_type,
            payload: frame,
        }))
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("packet_type", &self.packet_type)
            .field("length", &self.length())
            .field("payload", &hex::encode(&self.payload[..self.payload.len().min(32)]))
            .finish()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Packet[{}](len={})", self.packet_type, self.length())
    }
}
