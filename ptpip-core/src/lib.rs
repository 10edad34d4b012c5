//! # ptpip-core
//!
//! Core protocol implementation for PTP/IP cameras.
//!
//! This crate provides the low-level protocol primitives:
//! - Packet framing and the typed payload shapes
//! - Data phase reassembly
//! - Device info decoding
//! - Session bookkeeping and transaction id allocation
//! - Protocol constants

pub mod assembler;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod message;
pub mod packet;
pub mod packet_type;
pub mod sequencer;
pub mod session;
pub mod wire;

pub use assembler::DataPhaseAssembler;
pub use descriptor::{encode_device_info, parse_device_info};
pub use error::{Error, Result};
pub use message::{
    CancelTransaction, CommandRequest, CommandResponse, Data, DataPhase, EndData, Event,
    InitCommandAck, InitCommandRequest, InitEventAck, InitEventRequest, InitFail, Message,
    StartData,
};
pub use packet::Packet;
pub use packet_type::PacketType;
pub use sequencer::{TransactionSequencer, VendorQuirks};
pub use session::{ClientIdentity, Session, SessionState};
