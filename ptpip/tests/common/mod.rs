//! Scripted PTP/IP camera for end-to-end tests
//!
//! Serves one connection pair at a time on 127.0.0.1 and records every
//! command request it receives.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use ptpip::{ClientConfig, DataPhase, DeviceDescriptor};
use ptpip_core::{
    CommandRequest, CommandResponse, EndData, Event, InitCommandAck, InitEventAck,
    InitEventRequest, InitFail, Message, Packet, PacketType, StartData, encode_device_info,
};
use ptpip_types::codes::{event, operation, response};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// How data phase replies are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Start-Data, End-Data and the response in one write
    Batched,
    /// One write per packet with a pause in between
    Split,
    /// Start-Data and the response in one write, End-Data after a pause
    EndDataLast,
    /// The response alone, the data packets after a pause
    ResponseFirst,
}

#[derive(Debug, Clone)]
pub struct Script {
    pub init_fail: Option<u32>,
    pub approval_code: u16,
    pub pin_code: u16,
    pub emit_capability_event: bool,
    pub advertise_commit_after_approval: bool,
    pub delivery: Delivery,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            init_fail: None,
            approval_code: response::OK,
            pin_code: response::OK,
            emit_capability_event: true,
            advertise_commit_after_approval: true,
            delivery: Delivery::Batched,
        }
    }
}

/// One command request as seen by the camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub connection: u32,
    pub op_code: u16,
    pub transaction_id: u32,
    pub data_phase: DataPhase,
    pub parameters: Vec<u32>,
    pub frame_length: usize,
    /// Outbound data phase payload
    pub data: Vec<u8>,
}

pub struct FakeCamera {
    pub port: u16,
    log: Arc<Mutex<Vec<Recorded>>>,
    task: JoinHandle<()>,
}

impl FakeCamera {
    pub async fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let log = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn(serve(listener, script, log.clone()));

        Self { port, log, task }
    }

    /// Client settings with short delays
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new("127.0.0.1")
            .with_port(self.port)
            .with_read_timeout(Duration::from_secs(2))
            .with_settle_delay(Duration::from_millis(10))
            .with_capability_timeout(Duration::from_millis(300))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().clone()
    }

    /// `(op code, transaction id)` of every request on one connection
    pub fn requests_on(&self, connection: u32) -> Vec<(u16, u32)> {
        self.log
            .lock()
            .iter()
            .filter(|r| r.connection == connection)
            .map(|r| (r.op_code, r.transaction_id))
            .collect()
    }

    pub fn find(&self, connection: u32, op_code: u16) -> Option<Recorded> {
        self.log
            .lock()
            .iter()
            .find(|r| r.connection == connection && r.op_code == op_code)
            .cloned()
    }
}

impl Drop for FakeCamera {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Descriptor served by the camera; pairing adds the vendor data operations
pub fn descriptor(paired: bool) -> DeviceDescriptor {
    let mut operations = vec![
        operation::GET_DEVICE_INFO,
        operation::OPEN_SESSION,
        operation::CLOSE_SESSION,
        operation::GET_STORAGE_IDS,
        operation::NIKON_PIN_AUTH,
        operation::NIKON_DATA_FETCH_PRE,
    ];
    if paired {
        operations.extend([operation::NIKON_DATA_COMMIT, operation::NIKON_DATA_FETCH]);
    }

    DeviceDescriptor {
        standard_version: Some(100),
        vendor_extension_id: Some(0x0A),
        vendor_extension_version: Some(100),
        vendor_description: Some("microsoft.com: 1.0".into()),
        functional_mode: Some(0),
        operations: Some(operations.into_iter().collect()),
        events: Some([event::OBJECT_ADDED, event::DEVICE_INFO_CHANGED].into_iter().collect()),
        device_properties: Some([0x5001, 0x5003].into_iter().collect()),
        capture_formats: Some([0x3801].into_iter().collect()),
        image_formats: Some([0x3801, 0x3000].into_iter().collect()),
        manufacturer: Some("Nikon Corporation".into()),
        model: Some("Z 6".into()),
        device_version: Some("V3.60".into()),
        serial_number: Some("6012345".into()),
    }
}

async fn serve(listener: TcpListener, script: Script, log: Arc<Mutex<Vec<Recorded>>>) {
    let mut paired = false;
    let mut connection = 0u32;

    loop {
        let Ok((mut command, _)) = listener.accept().await else {
            return;
        };
        connection += 1;

        let Some(init) = read_packet(&mut command).await else {
            continue;
        };
        assert_eq!(init.packet_type, PacketType::InitCommandRequest);

        if let Some(reason) = script.init_fail {
            write(&mut command, &InitFail { reason }.encode()).await;
            continue;
        }

        let ack = InitCommandAck {
            connection_number: connection,
            responder_name: Some("Z 6_6012345".into()),
        };
        write(&mut command, &ack.encode()).await;

        // a probe hangs up without opening the event channel
        let mut events = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((socket, _)) => socket,
                Err(_) => return,
            },
            _ = wait_closed(&mut command) => continue,
        };

        let Some(init) = read_packet(&mut events).await else {
            continue;
        };
        let init = InitEventRequest::from_packet(&init).unwrap();
        assert_eq!(init.connection_number, connection);
        write(&mut events, &InitEventAck.encode()).await;

        while let Some(packet) = read_packet(&mut command).await {
            let request = CommandRequest::from_packet(&packet).unwrap();
            let txn = request.transaction_id;

            let mut data = Vec::new();
            if request.data_phase == DataPhase::Sending {
                data = receive_data(&mut command).await;
            }

            log.lock().push(Recorded {
                connection,
                op_code: request.op_code,
                transaction_id: txn,
                data_phase: request.data_phase,
                parameters: request.parameters.clone(),
                frame_length: packet.length(),
                data,
            });

            match request.op_code {
                _ if request.data_phase == DataPhase::Sending => {
                    respond(&mut command, response::OK, txn).await;
                }
                operation::GET_DEVICE_INFO => {
                    let payload = encode_device_info(&descriptor(paired));
                    send_data(&mut command, txn, &payload, script.delivery).await;
                }
                operation::OPEN_SESSION | operation::CLOSE_SESSION => {
                    respond(&mut command, response::OK, txn).await;
                }
                operation::GET_STORAGE_IDS => {
                    let payload = [1, 0, 0, 0, 0x01, 0x00, 0x01, 0x00];
                    send_data(&mut command, txn, &payload, script.delivery).await;
                }
                operation::NIKON_DATA_FETCH_PRE => {
                    send_data(&mut command, txn, &[0xAB; 16], script.delivery).await;
                }
                operation::NIKON_PIN_AUTH if request.data_phase == DataPhase::Receiving => {
                    respond(&mut command, script.approval_code, txn).await;
                    if script.approval_code == response::OK && script.advertise_commit_after_approval {
                        paired = true;
                    }
                }
                operation::NIKON_PIN_AUTH => {
                    respond(&mut command, script.pin_code, txn).await;
                    if script.pin_code == response::OK && script.emit_capability_event {
                        let mut frames = Event::new(event::DEVICE_INFO_CHANGED, 0).encode();
                        frames.extend_from_slice(&Event::new(event::DEVICE_INFO_CHANGED, 0).encode());
                        write(&mut events, &frames).await;
                    }
                }
                _ => respond(&mut command, response::OPERATION_NOT_SUPPORTED, txn).await,
            }
        }
    }
}

async fn read_packet(socket: &mut TcpStream) -> Option<Packet> {
    let mut header = [0u8; 8];
    socket.read_exact(&mut header).await.ok()?;
    let (length, _) = Packet::peek_header(&header).ok()?;

    let mut frame = header.to_vec();
    frame.resize(length, 0);
    socket.read_exact(&mut frame[8..]).await.ok()?;
    Packet::decode(&frame).ok()
}

async fn receive_data(socket: &mut TcpStream) -> Vec<u8> {
    let mut data = Vec::new();
    while let Some(packet) = read_packet(socket).await {
        match packet.packet_type {
            PacketType::StartData => {
                data.extend_from_slice(&StartData::from_packet(&packet).unwrap().payload);
            }
            PacketType::Data => {}
            PacketType::EndData => {
                data.extend_from_slice(&EndData::from_packet(&packet).unwrap().payload);
                break;
            }
            other => panic!("unexpected {} in outbound data phase", other),
        }
    }
    data
}

async fn wait_closed(socket: &mut TcpStream) {
    let mut buf = [0u8; 64];
    while let Ok(n) = socket.read(&mut buf).await {
        if n == 0 {
            return;
        }
    }
}

async fn write(socket: &mut TcpStream, data: &[u8]) {
    let _ = socket.write_all(data).await;
}

async fn respond(socket: &mut TcpStream, code: u16, transaction_id: u32) {
    write(socket, &CommandResponse::new(code, transaction_id).encode()).await;
}

async fn send_data(socket: &mut TcpStream, transaction_id: u32, payload: &[u8], delivery: Delivery) {
    let [start, end, ok] = [
        StartData::new(transaction_id, payload.len() as u64).encode(),
        EndData::new(transaction_id, payload.to_vec()).encode(),
        CommandResponse::new(response::OK, transaction_id).encode(),
    ];
    let pause = Duration::from_millis(100);

    match delivery {
        Delivery::Batched => write(socket, &[start, end, ok].concat()).await,
        Delivery::Split => {
            for frame in [start, end, ok] {
                write(socket, &frame).await;
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
        }
        Delivery::EndDataLast => {
            write(socket, &[start, ok].concat()).await;
            tokio::time::sleep(pause).await;
            write(socket, &end).await;
        }
        Delivery::ResponseFirst => {
            write(socket, &ok).await;
            tokio::time::sleep(pause).await;
            write(socket, &[start, end].concat()).await;
        }
    }
}
