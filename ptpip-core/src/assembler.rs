//! Inbound data phase reassembly
//!
//! A transaction with an inbound data phase answers with Start-Data,
//! optional Data packets, End-Data and a Command-Response. Cameras batch
//! these freely: several may share one read, one may span several reads,
//! and the response may come before, between or after the data packets.
//! Data packets tagged with another transaction id are leftovers of an
//! earlier exchange and are dropped.

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    message::{CommandResponse, Data, EndData, Message, StartData},
    packet::Packet,
    packet_type::PacketType,
};

/// Collects data phase payload and the terminal response of one transaction
///
/// # Examples
///
/// ```
/// use ptpip_core::{CommandResponse, DataPhaseAssembler, EndData, Message, StartData};
///
/// let mut buf = StartData::new(4, 3).encode();
/// buf.extend_from_slice(&EndData::new(4, vec![1, 2, 3]).encode());
/// buf.extend_from_slice(&CommandResponse::new(0x2001, 4).encode());
///
/// let mut assembler = DataPhaseAssembler::new();
/// assembler.feed(&mut buf).unwrap();
///
/// assert_eq!(assembler.response().unwrap().response_code, 0x2001);
/// assert_eq!(assembler.finish().unwrap().as_ref(), &[1, 2, 3]);
/// ```
#[derive(Debug, Default)]
pub struct DataPhaseAssembler {
    transaction_id: Option<u32>,
    declared_size: Option<u64>,
    payload: BytesMut,
    end_seen: bool,
    response: Option<CommandResponse>,
}

impl DataPhaseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembler that only takes data packets tagged `transaction_id`
    pub fn for_transaction(transaction_id: u32) -> Self {
        Self {
            transaction_id: Some(transaction_id),
            ..Self::default()
        }
    }

    /// Consume every complete frame at the front of `buf`
    ///
    /// A trailing partial frame stays in `buf` for the next read to complete.
    /// Frames of unknown type are dropped.
    pub fn feed(&mut self, buf: &mut BytesMut) -> Result<()> {
        loop {
            match Packet::split_frame(buf) {
                Ok(Some(packet)) => self.push(&packet)?,
                Ok(None) => return Ok(()),
                Err(e) if e.is_skippable() => {
                    warn!(error = %e, "Skipping frame in data phase");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Apply one decoded packet
    pub fn push(&mut self, packet: &Packet) -> Result<()> {
        match packet.packet_type {
            PacketType::StartData => {
                let start = StartData::from_packet(packet)?;
                debug!(
                    transaction_id = start.transaction_id,
                    total_size = start.total_size,
                    immediate = start.payload.len(),
                    "Start data"
                );
                if !self.accepts(start.transaction_id) {
                    return Ok(());
                }
                self.declared_size = Some(start.total_size);
                self.payload.extend_from_slice(&start.payload);
            }
            PacketType::Data => {
                let data = Data::from_packet(packet)?;
                if !self.accepts(data.transaction_id) {
                    return Ok(());
                }
                self.payload.extend_from_slice(&data.payload);
            }
            PacketType::EndData => {
                let end = EndData::from_packet(packet)?;
                debug!(
                    transaction_id = end.transaction_id,
                    len = end.payload.len(),
                    "End data"
                );
                if !self.accepts(end.transaction_id) {
                    return Ok(());
                }
                self.payload.extend_from_slice(&end.payload);
                self.end_seen = true;
            }
            PacketType::CommandResponse => {
                let response = CommandResponse::from_packet(packet)?;
                debug!(
                    code = response.response_code,
                    name = ptpip_types::codes::response_name(response.response_code),
                    transaction_id = response.transaction_id,
                    "Response in data phase"
                );
                if self.response.is_some() {
                    warn!(transaction_id = response.transaction_id, "Second response, keeping the first");
                } else {
                    self.response = Some(response);
                }
            }
            other => {
                warn!(packet_type = %other, "Unexpected packet in data phase");
            }
        }
        Ok(())
    }

    fn accepts(&mut self, transaction_id: u32) -> bool {
        match self.transaction_id {
            None => {
                self.transaction_id = Some(transaction_id);
                true
            }
            Some(current) if current != transaction_id => {
                warn!(current, transaction_id, "Dropping data packet for another transaction");
                false
            }
            Some(_) => true,
        }
    }

    /// The response, once one has been seen
    pub fn response(&self) -> Option<&CommandResponse> {
        self.response.as_ref()
    }

    pub fn take_response(&mut self) -> Option<CommandResponse> {
        self.response.take()
    }

    /// Size announced by Start-Data, if one arrived
    pub fn declared_size(&self) -> Option<u64> {
        self.declared_size
    }

    /// Payload collected so far
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// End-Data has been seen
    pub fn is_data_complete(&self) -> bool {
        self.end_seen
    }

    /// Start-Data announced a payload whose End-Data has not arrived yet
    pub fn is_data_pending(&self) -> bool {
        self.declared_size.is_some() && !self.end_seen
    }

    /// Hand out the payload
    ///
    /// # Errors
    ///
    /// `LengthMismatch` when Start-Data declared a size the collected bytes do
    /// not add up to.
    pub fn finish(self) -> Result<Bytes> {
        if let Some(declared) = self.declared_size {
            let actual = self.payload.len() as u64;
            if declared != actual {
                return Err(Error::LengthMismatch {
                    expected: declared,
                    actual,
                });
            }
        }
        Ok(self.payload.freeze())
    }
}
