//! High-level camera interface

use std::io::Cursor;
use std::time::Duration;

use bytes::Bytes;
use ptpip_core::constants::APPROVAL_PARAMETER;
use ptpip_core::wire::read_u32_array;
use ptpip_core::{
    CommandRequest, CommandResponse, DataPhase, DataPhaseAssembler, EndData, Message, Session,
    StartData, TransactionSequencer, parse_device_info,
};
use ptpip_types::codes::{operation, operation_name, response, response_name};
use ptpip_types::{DeviceDescriptor, Endpoint, Pin};
use tracing::{debug, info, warn};

use crate::channels::{Channel, ChannelPair};
use crate::config::ClientConfig;
use crate::error::{AuthError, Error, Result};
use crate::events::{CapabilitySignal, EventListener};

/// PTP/IP camera
///
/// Owns the command channel and the event listener. Every operation is a
/// strict request/response round trip on the command channel.
///
/// # Examples
///
/// ```no_run
/// use ptpip::{Camera, ClientConfig};
///
/// #[tokio::main]
/// async fn main() -> ptpip::Result<()> {
///     let mut camera = Camera::new(ClientConfig::new("192.168.1.10"));
///
///     camera.connect().await?;
///     let info = camera.get_device_info().await?;
///     println!("{}", info);
///
///     camera.release().await;
///     Ok(())
/// }
/// ```
pub struct Camera {
    config: ClientConfig,
    session: Session,
    sequencer: TransactionSequencer,
    command: Option<Channel>,
    listener: Option<EventListener>,
    signal: CapabilitySignal,
    descriptor: Option<DeviceDescriptor>,
}

impl Camera {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            session: Session::new(config.session_id(), config.identity().clone()),
            sequencer: TransactionSequencer::new(config.quirks().clone()),
            command: None,
            listener: None,
            signal: CapabilitySignal::new(),
            descriptor: None,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.config.endpoint()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Transaction counter the next standard operation will use
    pub fn transaction_counter(&self) -> u32 {
        self.sequencer.counter()
    }

    /// Descriptor from the last GetDeviceInfo on this connection
    pub fn descriptor(&self) -> Option<&DeviceDescriptor> {
        self.descriptor.as_ref()
    }

    /// Capability signal of the current connection
    pub fn capability_signal(&self) -> &CapabilitySignal {
        &self.signal
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected() && self.command.as_ref().is_some_and(Channel::is_connected)
    }

    /// Open and initialize both channels, then start the event listener
    ///
    /// The transaction counter starts over at 0.
    ///
    /// # Errors
    ///
    /// - `Transport(Connect { .. })` with the classified cause
    /// - `InitFailed` when the camera refuses either init
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::InvalidState("already connected".into()));
        }

        info!("Connecting to {}...", self.endpoint());

        let pair = ChannelPair::open(&self.config).await?;
        if let Err(e) = self
            .session
            .channels_opened(pair.connection_number, pair.responder_name.clone())
        {
            pair.close().await;
            return Err(e.into());
        }

        self.sequencer.reset();
        self.descriptor = None;
        self.signal = CapabilitySignal::new();
        self.listener = Some(EventListener::spawn(
            pair.event,
            self.session.clone(),
            self.signal.clone(),
        ));
        self.command = Some(pair.command);

        info!(
            connection_number = self.session.connection_number(),
            "Connected to {}",
            self.endpoint()
        );
        Ok(())
    }

    /// Close both channels and stop the listener
    ///
    /// Leaves the endpoint free for another client. Safe to call when not
    /// connected.
    pub async fn release(&mut self) {
        let was_connected = self.session.is_connected();

        if let Some(listener) = self.listener.take() {
            listener.stop().await;
        }
        if let Some(mut command) = self.command.take() {
            command.close().await;
        }
        self.session.close();

        if was_connected {
            info!("Released {}", self.endpoint());
        }
    }

    /// GetDeviceInfo; the result is also cached on the camera
    pub async fn get_device_info(&mut self) -> Result<DeviceDescriptor> {
        let (response, data) = self.fetch(operation::GET_DEVICE_INFO, []).await?;
        check(operation::GET_DEVICE_INFO, &response)?;

        let descriptor = parse_device_info(&data);
        debug!("Device info: {}", descriptor);

        self.descriptor = Some(descriptor.clone());
        Ok(descriptor)
    }

    /// OpenSession, always with transaction id 0
    pub async fn open_session(&mut self) -> Result<()> {
        let request = self.sequencer.open_session(self.session.session_id());
        let (response, _) = self.execute(request, false).await?;

        if response.response_code == response::SESSION_ALREADY_OPEN {
            warn!("Session already open on camera");
        } else {
            check(operation::OPEN_SESSION, &response)?;
        }

        if !self.session.is_open() {
            self.session.session_opened()?;
        }
        info!(session_id = self.session.session_id(), "Session open");
        Ok(())
    }

    pub async fn close_session(&mut self) -> Result<()> {
        let (response, _) = self
            .transact(DataPhase::None, operation::CLOSE_SESSION, [])
            .await?;
        check(operation::CLOSE_SESSION, &response)?;

        self.session.session_closed()?;
        info!("Session closed");
        Ok(())
    }

    /// GetStorageIDs
    pub async fn get_storage_ids(&mut self) -> Result<Vec<u32>> {
        let (response, data) = self.fetch(operation::GET_STORAGE_IDS, []).await?;
        check(operation::GET_STORAGE_IDS, &response)?;

        let mut reader = Cursor::new(&data[..]);
        let ids = read_u32_array(&mut reader, data.len())
            .map_err(|e| ptpip_types::Error::Parse(format!("storage id array: {}", e)))?;

        debug!(count = ids.len(), "Storage ids");
        Ok(ids)
    }

    /// Vendor operation with an inbound data phase; the payload is returned unread
    pub async fn fetch_vendor_data(&mut self, op_code: u16) -> Result<Bytes> {
        let (response, data) = self.fetch(op_code, []).await?;
        check(op_code, &response)?;

        debug!(op = operation_name(op_code), len = data.len(), "Vendor data fetched");
        Ok(data)
    }

    /// Ask the camera to show the pairing prompt
    ///
    /// # Errors
    ///
    /// `Auth(ApprovalRejected)` when the camera answers with anything but OK.
    pub async fn request_approval(&mut self) -> Result<()> {
        let (response, _) = self
            .transact(
                DataPhase::Receiving,
                operation::NIKON_PIN_AUTH,
                [APPROVAL_PARAMETER],
            )
            .await?;

        if !response.is_ok() {
            return Err(AuthError::ApprovalRejected {
                code: response.response_code,
            }
            .into());
        }
        info!("Approval granted");
        Ok(())
    }

    /// Send the PIN shown on the camera
    ///
    /// Uses the running counter; the pinned approval id does not apply.
    pub async fn submit_pin(&mut self, pin: Pin) -> Result<()> {
        let request = self.sequencer.sequential_request(
            DataPhase::None,
            operation::NIKON_PIN_AUTH,
            [pin.value()],
        );
        let (response, _) = self.execute(request, false).await?;
        check(operation::NIKON_PIN_AUTH, &response)?;

        info!("PIN accepted");
        Ok(())
    }

    /// Wait for the event listener to see DeviceInfoChanged
    pub async fn wait_capability_change(&self, timeout: Duration) -> Result<()> {
        if self.signal.wait(timeout).await {
            Ok(())
        } else {
            Err(AuthError::CapabilityTimeout.into())
        }
    }

    /// Run one operation with an optional inbound data phase
    ///
    /// Non-OK response codes are returned, not turned into errors. Data that
    /// starts before or together with the response is collected; an OK
    /// response alone ends the transaction.
    pub async fn transact(
        &mut self,
        data_phase: DataPhase,
        op_code: u16,
        parameters: impl IntoIterator<Item = u32>,
    ) -> Result<(CommandResponse, Bytes)> {
        let request = self.sequencer.request(data_phase, op_code, parameters);
        self.execute(request, false).await
    }

    /// Inbound data phase that always carries a payload on success
    ///
    /// An OK response that beats its data keeps the transaction open until
    /// End-Data arrives.
    async fn fetch(
        &mut self,
        op_code: u16,
        parameters: impl IntoIterator<Item = u32>,
    ) -> Result<(CommandResponse, Bytes)> {
        let request = self
            .sequencer
            .request(DataPhase::Receiving, op_code, parameters);
        self.execute(request, true).await
    }

    /// Run one operation with an outbound data phase
    pub async fn transact_send(
        &mut self,
        op_code: u16,
        parameters: impl IntoIterator<Item = u32>,
        data: &[u8],
    ) -> Result<CommandResponse> {
        let request = self
            .sequencer
            .request(DataPhase::Sending, op_code, parameters);
        let transaction_id = request.transaction_id;

        let channel = self.command.as_mut().ok_or(Error::NotConnected)?;
        log_request(&request);
        channel.send_message(&request).await?;

        let mut frames = StartData::new(transaction_id, data.len() as u64).encode();
        frames.extend_from_slice(&EndData::new(transaction_id, Bytes::copy_from_slice(data)).encode());
        channel.send_bytes(&frames).await?;

        let (response, _) = receive_transaction(channel, transaction_id, false).await?;
        Ok(response)
    }

    async fn execute(
        &mut self,
        request: CommandRequest,
        expect_data: bool,
    ) -> Result<(CommandResponse, Bytes)> {
        let channel = self.command.as_mut().ok_or(Error::NotConnected)?;

        log_request(&request);
        channel.send_message(&request).await?;

        let (response, data) =
            receive_transaction(channel, request.transaction_id, expect_data).await?;
        if response.transaction_id != request.transaction_id {
            warn!(
                sent = request.transaction_id,
                received = response.transaction_id,
                "Response for a different transaction id"
            );
        }
        Ok((response, data))
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        if self.command.is_some() {
            warn!("Camera dropped without release");
        }
    }
}

fn log_request(request: &CommandRequest) {
    debug!(
        op = operation_name(request.op_code),
        transaction_id = request.transaction_id,
        params = ?request.parameters,
        len = request.frame_length(),
        "Request"
    );
}

fn check(op_code: u16, response: &CommandResponse) -> Result<()> {
    if response.is_ok() {
        return Ok(());
    }
    warn!(
        op = operation_name(op_code),
        code = response.response_code,
        name = response_name(response.response_code),
        "Operation failed"
    );
    Err(Error::Response {
        op_code,
        code: response.response_code,
    })
}

/// Collect the response and any inbound data of one transaction
///
/// Reads once and scans; if no response turned up, reads and scans once more;
/// after that, reads frame by frame until the response arrives. Reading goes
/// on past the response while announced data is still missing, or, with
/// `expect_data`, until an OK response's data has arrived. Every read is
/// bounded by the channel's read timeout.
async fn receive_transaction(
    channel: &mut Channel,
    transaction_id: u32,
    expect_data: bool,
) -> Result<(CommandResponse, Bytes)> {
    let mut assembler = DataPhaseAssembler::for_transaction(transaction_id);

    channel.fill().await?;
    assembler.feed(channel.buffer_mut())?;

    if assembler.response().is_none() {
        debug!("No response in first read, rescanning");
        channel.fill().await?;
        assembler.feed(channel.buffer_mut())?;
    }

    let response = loop {
        if let Some(response) = assembler.take_response() {
            break response;
        }
        let packet = channel.recv_packet().await?;
        assembler.push(&packet)?;
    };

    // frames already buffered behind the response belong to this exchange
    while let Some(packet) = channel.take_packet()? {
        assembler.push(&packet)?;
    }

    let awaiting_data = expect_data && response.is_ok();
    while assembler.is_data_pending() || (awaiting_data && !assembler.is_data_complete()) {
        debug!(
            received = assembler.payload().len(),
            declared = ?assembler.declared_size(),
            "Data still in flight after response"
        );
        let packet = channel.recv_packet().await?;
        assembler.push(&packet)?;
    }

    let data = assembler.finish()?;
    debug!(
        code = response.response_code,
        name = response_name(response.response_code),
        len = data.len(),
        "Response"
    );
    Ok((response, data))
}
