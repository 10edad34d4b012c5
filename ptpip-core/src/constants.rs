//! Protocol constants

use std::time::Duration;

pub use ptpip_types::endpoint::DEFAULT_PORT;

/// Packet header size (length + type)
pub const HEADER_SIZE: usize = 8;

/// Header of data phase packets that carry a transaction id
pub const DATA_HEADER_SIZE: usize = 12;

/// Start-Data header (length + type + transaction id + total size)
pub const START_DATA_HEADER_SIZE: usize = 20;

/// Command request header (length + type + data phase + op code + transaction id)
pub const COMMAND_REQUEST_HEADER_SIZE: usize = 18;

/// Command response header (length + type + response code + transaction id)
pub const COMMAND_RESPONSE_HEADER_SIZE: usize = 14;

/// Event header (length + type + event code + transaction id)
pub const EVENT_HEADER_SIZE: usize = 14;

/// Largest frame accepted from the camera
pub const MAX_PACKET_SIZE: usize = 64 * 1024 * 1024;

/// Parameter slots defined by the base protocol
pub const MAX_PARAMETERS: usize = 5;

/// Default connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read timeout, applied to every blocking read
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Wait between approval disconnect and reconnect
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Wait for DeviceInfoChanged after PIN submission
pub const DEFAULT_CAPABILITY_TIMEOUT: Duration = Duration::from_secs(10);

/// Session id opened by the client
pub const DEFAULT_SESSION_ID: u32 = 1;

/// Client GUID captured from the Android reference app
pub const DEFAULT_CLIENT_GUID: [u8; 16] = [
    0xE9, 0xDC, 0xA7, 0xD8, 0x9C, 0x7B, 0x44, 0x0D,
    0xBA, 0x01, 0x0F, 0x9E, 0x04, 0xC0, 0xEC, 0x23,
];

/// Client name captured from the Android reference app
pub const DEFAULT_CLIENT_NAME: &str = "Android Device";

/// Parameter carried by the approval request
pub const APPROVAL_PARAMETER: u32 = 0x2001;

/// Bytes requested per socket read
pub const READ_CHUNK_SIZE: usize = 4096;
