//! Transport layer for PTP/IP
//!
//! Provides the TCP streams behind the command and event channels.

pub mod error;
pub mod tcp;

pub use error::{ConnectErrorKind, Error, Result};
pub use tcp::TcpTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Byte stream to one camera endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the camera
    async fn connect(&mut self) -> Result<()>;

    /// Shut the stream down; a no-op when not connected
    async fn disconnect(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive whatever the next read yields, bounded by `timeout`
    ///
    /// A read of zero bytes surfaces as `ConnectionClosed`.
    async fn receive(&mut self, timeout: Duration) -> Result<BytesMut>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
