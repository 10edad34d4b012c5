//! Command and event channels
//!
//! PTP/IP runs over two TCP connections to the same endpoint. The command
//! channel carries requests, responses and data phases; the event channel
//! carries unsolicited events. Each is initialized with its own request/ack
//! exchange, command channel first.

use std::time::Duration;

use bytes::BytesMut;
use ptpip_core::{
    InitCommandAck, InitCommandRequest, InitEventAck, InitEventRequest, InitFail, Message, Packet,
    PacketType,
};
use ptpip_transport::{TcpTransport, Transport};
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Which connection a [`Channel`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    Command,
    Event,
}

/// One framed PTP/IP connection
///
/// Bytes past the last complete frame are carried over to the next read, so
/// frames split across reads are never lost.
pub struct Channel {
    role: ChannelRole,
    transport: Box<dyn Transport>,
    carry: BytesMut,
    read_timeout: Duration,
}

impl Channel {
    pub fn new(role: ChannelRole, transport: Box<dyn Transport>, read_timeout: Duration) -> Self {
        Self {
            role,
            transport,
            carry: BytesMut::new(),
            read_timeout,
        }
    }

    /// TCP channel to the configured endpoint
    pub fn tcp(role: ChannelRole, config: &ClientConfig) -> Self {
        let transport = TcpTransport::from_endpoint(config.endpoint())
            .with_connect_timeout(config.connect_timeout())
            .with_read_timeout(config.read_timeout());
        Self::new(role, Box::new(transport), config.read_timeout())
    }

    pub fn role(&self) -> ChannelRole {
        self.role
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub async fn connect(&mut self) -> Result<()> {
        debug!(role = ?self.role, addr = %self.transport.remote_addr(), "Opening channel");
        self.transport.connect().await?;
        Ok(())
    }

    /// Close the connection and drop any buffered bytes
    pub async fn close(&mut self) {
        if let Err(e) = self.transport.disconnect().await {
            warn!(role = ?self.role, error = %e, "Channel close failed");
        }
        self.carry.clear();
    }

    pub async fn send_message<M: Message>(&mut self, message: &M) -> Result<()> {
        let frame = message.encode();
        trace!(role = ?self.role, packet_type = %M::PACKET_TYPE, len = frame.len(), "Sending");
        self.transport.send(&frame).await?;
        Ok(())
    }

    pub async fn send_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.transport.send(data).await?;
        Ok(())
    }

    /// One read appended to the carry buffer
    pub async fn read_more(&mut self) -> Result<usize> {
        let chunk = self.transport.receive(self.read_timeout).await?;
        self.carry.extend_from_slice(&chunk);
        Ok(chunk.len())
    }

    /// Read until at least one complete frame is buffered
    pub async fn fill(&mut self) -> Result<()> {
        while !self.has_frame()? {
            self.read_more().await?;
        }
        Ok(())
    }

    fn has_frame(&self) -> Result<bool> {
        match Packet::peek_header(&self.carry) {
            Ok((length, _)) => Ok(length <= self.carry.len()),
            Err(e) if e.is_incomplete() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Next buffered frame without reading, skipping unknown types
    pub fn take_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            match Packet::split_frame(&mut self.carry) {
                Ok(packet) => return Ok(packet),
                Err(e) if e.is_skippable() => {
                    warn!(role = ?self.role, error = %e, "Skipping frame");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Next frame, reading as needed
    pub async fn recv_packet(&mut self) -> Result<Packet> {
        loop {
            if let Some(packet) = self.take_packet()? {
                trace!(role = ?self.role, packet = %packet, "Received");
                return Ok(packet);
            }
            self.read_more().await?;
        }
    }

    /// Buffered bytes not yet consumed
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.carry
    }
}

/// Both channels after a successful init
pub struct ChannelPair {
    pub command: Channel,
    pub event: Channel,
    pub connection_number: u32,
    pub responder_name: Option<String>,
}

impl ChannelPair {
    /// Connect and initialize both channels
    ///
    /// Any failure closes whatever was opened before returning the error.
    pub async fn open(config: &ClientConfig) -> Result<Self> {
        let (mut command, ack) = open_command(config).await?;

        let mut event = Channel::tcp(ChannelRole::Event, config);
        let result = async {
            event.connect().await?;
            init_event(&mut event, ack.connection_number).await
        }
        .await;

        if let Err(e) = result {
            event.close().await;
            command.close().await;
            return Err(e);
        }

        info!(
            connection_number = ack.connection_number,
            responder = ack.responder_name.as_deref().unwrap_or("?"),
            "Channels open"
        );

        Ok(Self {
            command,
            event,
            connection_number: ack.connection_number,
            responder_name: ack.responder_name,
        })
    }

    pub async fn close(mut self) {
        self.event.close().await;
        self.command.close().await;
    }
}

/// Connect and initialize the command channel only
pub async fn open_command(config: &ClientConfig) -> Result<(Channel, InitCommandAck)> {
    let mut command = Channel::tcp(ChannelRole::Command, config);
    command.connect().await?;

    match init_command(&mut command, config).await {
        Ok(ack) => Ok((command, ack)),
        Err(e) => {
            command.close().await;
            Err(e)
        }
    }
}

async fn init_command(channel: &mut Channel, config: &ClientConfig) -> Result<InitCommandAck> {
    let request = InitCommandRequest {
        guid: config.identity().guid,
        name: config.identity().name.clone(),
    };
    channel.send_message(&request).await?;

    let packet = channel.recv_packet().await?;
    match packet.packet_type {
        PacketType::InitCommandAck => {
            let ack = InitCommandAck::from_packet(&packet)?;
            debug!(connection_number = ack.connection_number, "Command channel initialized");
            Ok(ack)
        }
        _ => Err(init_rejected(&packet, PacketType::InitCommandAck)),
    }
}

async fn init_event(channel: &mut Channel, connection_number: u32) -> Result<()> {
    channel
        .send_message(&InitEventRequest { connection_number })
        .await?;

    let packet = channel.recv_packet().await?;
    match packet.packet_type {
        PacketType::InitEventAck => {
            InitEventAck::from_packet(&packet)?;
            debug!("Event channel initialized");
            Ok(())
        }
        _ => Err(init_rejected(&packet, PacketType::InitEventAck)),
    }
}

fn init_rejected(packet: &Packet, expected: PacketType) -> Error {
    if packet.packet_type == PacketType::InitFail {
        return match InitFail::from_packet(packet) {
            Ok(fail) => {
                warn!(reason = fail.reason, "Camera refused channel init");
                Error::InitFailed {
                    reason: fail.reason,
                }
            }
            Err(e) => e.into(),
        };
    }

    ptpip_core::Error::UnexpectedPacketType {
        expected,
        actual: packet.packet_type,
    }
    .into()
}
