//! Typed PTP/IP payloads
//!
//! Each shape knows its [`PacketType`] and converts to and from a [`Packet`].

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    constants::{
        COMMAND_REQUEST_HEADER_SIZE, COMMAND_RESPONSE_HEADER_SIZE, DATA_HEADER_SIZE,
        EVENT_HEADER_SIZE, HEADER_SIZE, MAX_PARAMETERS, START_DATA_HEADER_SIZE,
    },
    error::{Error, Result},
    packet::Packet,
    packet_type::PacketType,
    wire,
};

/// A payload shape bound to one packet type
pub trait Message: Sized {
    const PACKET_TYPE: PacketType;

    /// Write the payload (header excluded)
    fn encode_payload(&self, buf: &mut BytesMut);

    /// Parse the payload (header excluded)
    fn decode_payload(payload: &[u8]) -> Result<Self>;

    fn to_packet(&self) -> Packet {
        let mut buf = BytesMut::new();
        self.encode_payload(&mut buf);
        Packet::with_payload(Self::PACKET_TYPE, buf.freeze())
    }

    /// Encode straight to wire bytes
    fn encode(&self) -> BytesMut {
        self.to_packet().encode()
    }

    /// # Errors
    ///
    /// `UnexpectedPacketType` when the packet is of a different type.
    fn from_packet(packet: &Packet) -> Result<Self> {
        if packet.packet_type != Self::PACKET_TYPE {
            return Err(Error::UnexpectedPacketType {
                expected: Self::PACKET_TYPE,
                actual: packet.packet_type,
            });
        }
        Self::decode_payload(&packet.payload)
    }
}

/// Check the frame (header included) is at least `min_frame` bytes
fn ensure_len(payload: &[u8], min_frame: usize) -> Result<()> {
    let actual = HEADER_SIZE + payload.len();
    if actual < min_frame {
        return Err(Error::LengthMismatch {
            expected: min_frame as u64,
            actual: actual as u64,
        });
    }
    Ok(())
}

fn get_parameters(mut payload: &[u8]) -> Vec<u32> {
    let mut parameters = Vec::with_capacity(payload.len() / 4);
    while payload.len() >= 4 {
        parameters.push(payload.get_u32_le());
    }
    parameters
}

/// Direction of the data phase announced in a command request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DataPhase {
    /// No data phase
    None = 0,
    /// Camera sends data to us
    Receiving = 1,
    /// We send data to the camera
    Sending = 2,
}

impl TryFrom<u32> for DataPhase {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Receiving),
            2 => Ok(Self::Sending),
            _ => Err(Error::InvalidDataPhase(value)),
        }
    }
}

/// Command channel init: client GUID and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCommandRequest {
    pub guid: [u8; 16],
    pub name: String,
}

impl Message for InitCommandRequest {
    const PACKET_TYPE: PacketType = PacketType::InitCommandRequest;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.guid);
        wire::put_utf16z(buf, &self.name);
    }

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        ensure_len(payload, HEADER_SIZE + 16)?;
        let mut guid = [0u8; 16];
        guid.copy_from_slice(&payload[..16]);
        let (name, _) = wire::get_utf16z(&payload[16..]);
        Ok(Self { guid, name })
    }
}

/// Command channel init accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCommandAck {
    /// Connection number to quote on the event channel
    pub connection_number: u32,

    /// Camera name, when the camera sends one
    pub responder_name: Option<String>,
}

impl Message for InitCommandAck {
    const PACKET_TYPE: PacketType = PacketType::InitCommandAck;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.connection_number);
        if let Some(name) = &self.responder_name {
            wire::put_utf16z(buf, name);
        }
    }

    fn decode_payload(mut payload: &[u8]) -> Result<Self> {
        ensure_len(payload, HEADER_SIZE + 4)?;
        let connection_number = payload.get_u32_le();
        let responder_name = if payload.is_empty() {
            None
        } else {
            Some(wire::get_utf16z(payload).0)
        };
        Ok(Self {
            connection_number,
            responder_name,
        })
    }
}

/// Event channel init: quotes the command channel's connection number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitEventRequest {
    pub connection_number: u32,
}

impl Message for InitEventRequest {
    const PACKET_TYPE: PacketType = PacketType::InitEventRequest;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.connection_number);
    }

    fn decode_payload(mut payload: &[u8]) -> Result<Self> {
        ensure_len(payload, HEADER_SIZE + 4)?;
        Ok(Self {
            connection_number: payload.get_u32_le(),
        })
    }
}

/// Event channel init accepted (no payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitEventAck;

impl Message for InitEventAck {
    const PACKET_TYPE: PacketType = PacketType::InitEventAck;

    fn encode_payload(&self, _buf: &mut BytesMut) {}

    fn decode_payload(_payload: &[u8]) -> Result<Self> {
        Ok(Self)
    }
}

/// Channel init refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitFail {
    pub reason: u32,
}

impl Message for InitFail {
    const PACKET_TYPE: PacketType = PacketType::InitFail;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.reason);
    }

    fn decode_payload(mut payload: &[u8]) -> Result<Self> {
        ensure_len(payload, HEADER_SIZE + 4)?;
        Ok(Self {
            reason: payload.get_u32_le(),
        })
    }
}

/// Operation request
///
/// # Examples
///
/// ```
/// use ptpip_core::{CommandRequest, DataPhase, Message};
///
/// let request = CommandRequest::new(DataPhase::None, 0x1002, 0).with_parameters([1]);
/// assert_eq!(request.encode().len(), 22);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub data_phase: DataPhase,
    pub op_code: u16,
    pub transaction_id: u32,
    pub parameters: Vec<u32>,
}

impl CommandRequest {
    pub fn new(data_phase: DataPhase, op_code: u16, transaction_id: u32) -> Self {
        Self {
            data_phase,
            op_code,
            transaction_id,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = u32>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Append zero parameters until the frame is `frame_length` bytes long
    ///
    /// Some vendor operations are only accepted with a fixed frame length.
    pub fn padded_to(mut self, frame_length: usize) -> Self {
        while self.frame_length() + 4 <= frame_length {
            self.parameters.push(0);
        }
        self
    }

    /// Frame length on the wire, header included
    pub fn frame_length(&self) -> usize {
        COMMAND_REQUEST_HEADER_SIZE + self.parameters.len() * 4
    }

    /// More parameters than the base protocol defines
    pub fn exceeds_parameter_slots(&self) -> bool {
        self.parameters.len() > MAX_PARAMETERS
    }
}

impl Message for CommandRequest {
    const PACKET_TYPE: PacketType = PacketType::CommandRequest;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.data_phase as u32);
        buf.put_u16_le(self.op_code);
        buf.put_u32_le(self.transaction_id);
        for parameter in &self.parameters {
            buf.put_u32_le(*parameter);
        }
    }

    fn decode_payload(mut payload: &[u8]) -> Result<Self> {
        ensure_len(payload, COMMAND_REQUEST_HEADER_SIZE)?;
        let data_phase = DataPhase::try_from(payload.get_u32_le())?;
        let op_code = payload.get_u16_le();
        let transaction_id = payload.get_u32_le();
        Ok(Self {
            data_phase,
            op_code,
            transaction_id,
            parameters: get_parameters(payload),
        })
    }
}

/// Operation response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub response_code: u16,
    pub transaction_id: u32,
    pub parameters: Vec<u32>,
}

impl CommandResponse {
    pub fn new(response_code: u16, transaction_id: u32) -> Self {
        Self {
            response_code,
            transaction_id,
            parameters: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.response_code == ptpip_types::codes::response::OK
    }
}

impl Message for CommandResponse {
    const PACKET_TYPE: PacketType = PacketType::CommandResponse;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.response_code);
        buf.put_u32_le(self.transaction_id);
        for parameter in &self.parameters {
            buf.put_u32_le(*parameter);
        }
    }

    fn decode_payload(mut payload: &[u8]) -> Result<Self> {
        ensure_len(payload, COMMAND_RESPONSE_HEADER_SIZE)?;
        let response_code = payload.get_u16_le();
        let transaction_id = payload.get_u32_le();
        Ok(Self {
            response_code,
            transaction_id,
            parameters: get_parameters(payload),
        })
    }
}

/// Unsolicited notification on the event channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_code: u16,
    pub transaction_id: u32,

    /// Event parameters, kept raw
    pub extra: Bytes,
}

impl Event {
    pub fn new(event_code: u16, transaction_id: u32) -> Self {
        Self {
            event_code,
            transaction_id,
            extra: Bytes::new(),
        }
    }
}

impl Message for Event {
    const PACKET_TYPE: PacketType = PacketType::Event;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.event_code);
        buf.put_u32_le(self.transaction_id);
        buf.put_slice(&self.extra);
    }

    fn decode_payload(mut payload: &[u8]) -> Result<Self> {
        ensure_len(payload, EVENT_HEADER_SIZE)?;
        let event_code = payload.get_u16_le();
        let transaction_id = payload.get_u32_le();
        Ok(Self {
            event_code,
            transaction_id,
            extra: Bytes::copy_from_slice(payload),
        })
    }
}

/// First packet of a data phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartData {
    pub transaction_id: u32,

    /// Size of the whole data phase payload
    pub total_size: u64,

    /// Bytes carried in this packet, usually none
    pub payload: Bytes,
}

impl StartData {
    pub fn new(transaction_id: u32, total_size: u64) -> Self {
        Self {
            transaction_id,
            total_size,
            payload: Bytes::new(),
        }
    }
}

impl Message for StartData {
    const PACKET_TYPE: PacketType = PacketType::StartData;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.transaction_id);
        buf.put_u64_le(self.total_size);
        buf.put_slice(&self.payload);
    }

    fn decode_payload(mut payload: &[u8]) -> Result<Self> {
        ensure_len(payload, START_DATA_HEADER_SIZE)?;
        let transaction_id = payload.get_u32_le();
        let total_size = payload.get_u64_le();
        Ok(Self {
            transaction_id,
            total_size,
            payload: Bytes::copy_from_slice(payload),
        })
    }
}

macro_rules! data_packet {
    ($(#[$doc:meta])* $name:ident, $packet_type:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub transaction_id: u32,
            pub payload: Bytes,
        }

        impl $name {
            pub fn new(transaction_id: u32, payload: impl Into<Bytes>) -> Self {
                Self {
                    transaction_id,
                    payload: payload.into(),
                }
            }
        }

        impl Message for $name {
            const PACKET_TYPE: PacketType = $packet_type;

            fn encode_payload(&self, buf: &mut BytesMut) {
                buf.put_u32_le(self.transaction_id);
                buf.put_slice(&self.payload);
            }

            fn decode_payload(mut payload: &[u8]) -> Result<Self> {
                ensure_len(payload, DATA_HEADER_SIZE)?;
                let transaction_id = payload.get_u32_le();
                Ok(Self {
                    transaction_id,
                    payload: Bytes::copy_from_slice(payload),
                })
            }
        }
    };
}

data_packet!(
    /// Intermediate packet of a data phase
    Data,
    PacketType::Data
);

data_packet!(
    /// Last packet of a data phase; everything after the transaction id is payload
    EndData,
    PacketType::EndData
);

/// Abort a transaction's data phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelTransaction {
    pub transaction_id: u32,
}

impl Message for CancelTransaction {
    const PACKET_TYPE: PacketType = PacketType::CancelTransaction;

    fn encode_payload(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.transaction_id);
    }

    fn decode_payload(mut payload: &[u8]) -> Result<Self> {
        ensure_len(payload, DATA_HEADER_SIZE)?;
        Ok(Self {
            transaction_id: payload.get_u32_le(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use crate::constants::{DEFAULT_CLIENT_GUID, DEFAULT_CLIENT_NAME};

    #[test]
    fn test_init_command_request_layout() {
        let request = InitCommandRequest {
            guid: DEFAULT_CLIENT_GUID,
            name: DEFAULT_CLIENT_NAME.to_string(),
        };
        let encoded = request.encode();

        assert_eq!(encoded.len(), 8 + 16 + 30);
        assert_eq!(&encoded[..8], &[54, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(hex::encode(&encoded[8..24]), "e9dca7d89c7b440dba010f9e04c0ec23");
        assert_eq!(&encoded[encoded.len() - 2..], &[0, 0]);
    }

    #[test]
    fn test_approval_request_matches_capture() {
        let request = CommandRequest::new(DataPhase::Receiving, 0x935A, 2).with_parameters([0x2001]);
        assert_eq!(
            hex::encode(request.encode()),
            "1600000006000000010000005a930200000001200000"
        );
    }

    #[test]
    fn test_padded_request() {
        let request = CommandRequest::new(DataPhase::Receiving, 0x9001, 1).padded_to(30);
        assert_eq!(request.parameters, vec![0, 0, 0]);
        assert_eq!(request.encode().len(), 30);

        let unpadded = CommandRequest::new(DataPhase::Receiving, 0x952B, 1).padded_to(18);
        assert!(unpadded.parameters.is_empty());
    }

    #[test]
    fn test_invalid_data_phase() {
        let mut payload = BytesMut::new();
        payload.put_u32_le(7);
        payload.put_u16_le(0x1001);
        payload.put_u32_le(0);

        let result = CommandRequest::decode_payload(&payload);
        assert!(matches!(result, Err(Error::InvalidDataPhase(7))));
    }

    #[test]
    fn test_response_too_short() {
        let packet = Packet::with_payload(PacketType::CommandResponse, vec![0x01, 0x20, 0]);
        let result = CommandResponse::from_packet(&packet);
        assert!(matches!(result, Err(Error::LengthMismatch { expected: 14, actual: 11 })));
    }

    #[test]
    fn test_data_headers_too_short() {
        let start = Packet::with_payload(PacketType::StartData, vec![1, 0, 0, 0, 4, 0, 0, 0]);
        assert!(matches!(
            StartData::from_packet(&start),
            Err(Error::LengthMismatch { expected: 20, actual: 16 })
        ));

        let end = Packet::with_payload(PacketType::EndData, vec![1, 0]);
        assert!(matches!(
            EndData::from_packet(&end),
            Err(Error::LengthMismatch { expected: 12, actual: 10 })
        ));

        let event = Packet::with_payload(PacketType::Event, vec![0x08, 0x40, 0, 0]);
        assert!(matches!(
            Event::from_packet(&event),
            Err(Error::LengthMismatch { expected: 14, actual: 12 })
        ));
    }

    #[test]
    fn test_wrong_packet_type() {
        let packet = InitEventAck.to_packet();
        let result = InitCommandAck::from_packet(&packet);
        assert!(matches!(
            result,
            Err(Error::UnexpectedPacketType {
                expected: PacketType::InitCommandAck,
                actual: PacketType::InitEventAck,
            })
        ));
    }

    #[test]
    fn test_init_ack_without_name() {
        let ack = InitCommandAck::decode_payload(&[7, 0, 0, 0]).unwrap();
        assert_eq!(ack.connection_number, 7);
        assert_eq!(ack.responder_name, None);
    }

    #[test]
    fn test_response_ok() {
        assert!(CommandResponse::new(0x2001, 3).is_ok());
        assert!(!CommandResponse::new(0x2019, 3).is_ok());
    }

    fn roundtrip<M: Message + PartialEq + std::fmt::Debug>(message: &M) -> std::result::Result<(), TestCaseError> {
        let encoded = message.encode();
        let packet = Packet::decode(&encoded).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let decoded = M::from_packet(&packet).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(&decoded, message);
        prop_assert_eq!(decoded.encode(), encoded);
        Ok(())
    }

    fn data_phase() -> impl Strategy<Value = DataPhase> {
        prop_oneof![
            Just(DataPhase::None),
            Just(DataPhase::Receiving),
            Just(DataPhase::Sending),
        ]
    }

    proptest! {
        #[test]
        fn command_request_roundtrip(
            data_phase in data_phase(),
            op_code in any::<u16>(),
            transaction_id in any::<u32>(),
            parameters in proptest::collection::vec(any::<u32>(), 0..=5),
        ) {
            let request = CommandRequest::new(data_phase, op_code, transaction_id)
                .with_parameters(parameters);
            roundtrip(&request)?;
        }

        #[test]
        fn command_response_roundtrip(
            response_code in any::<u16>(),
            transaction_id in any::<u32>(),
            parameters in proptest::collection::vec(any::<u32>(), 0..=5),
        ) {
            let mut response = CommandResponse::new(response_code, transaction_id);
            response.parameters = parameters;
            roundtrip(&response)?;
        }

        #[test]
        fn init_messages_roundtrip(
            guid in any::<[u8; 16]>(),
            name in "[a-zA-Z0-9 ]{0,24}",
            connection_number in any::<u32>(),
            responder in proptest::option::of("[a-zA-Z0-9 ]{0,24}"),
            reason in any::<u32>(),
        ) {
            roundtrip(&InitCommandRequest { guid, name })?;
            roundtrip(&InitCommandAck { connection_number, responder_name: responder })?;
            roundtrip(&InitEventRequest { connection_number })?;
            roundtrip(&InitEventAck)?;
            roundtrip(&InitFail { reason })?;
        }

        #[test]
        fn data_messages_roundtrip(
            transaction_id in any::<u32>(),
            total_size in any::<u64>(),
            bytes in proptest::collection::vec(any::<u8>(), 0..128),
            event_code in any::<u16>(),
        ) {
            let payload = Bytes::from(bytes);
            roundtrip(&StartData { transaction_id, total_size, payload: payload.clone() })?;
            roundtrip(&Data::new(transaction_id, payload.clone()))?;
            roundtrip(&EndData::new(transaction_id, payload.clone()))?;
            roundtrip(&CancelTransaction { transaction_id })?;
            roundtrip(&Event { event_code, transaction_id, extra: payload })?;
        }
    }
}
