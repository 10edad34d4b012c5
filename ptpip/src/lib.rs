//! # ptpip
//!
//! PTP/IP client for Nikon cameras over Wi-Fi, including the two-phase PIN
//! pairing that unlocks the full operation set.
//!
//! ## Features
//!
//! - Async/await API using Tokio
//! - Command and event channels with a background event listener
//! - Multi-packet data phase reassembly
//! - Nikon pairing handshake with pluggable progress observer
//!
//! ## Quick Start
//!
//! ```no_run
//! use ptpip::{Authenticator, Camera, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> ptpip::Result<()> {
//!     let camera = Camera::new(ClientConfig::new("192.168.1.10"));
//!     let mut auth = Authenticator::new(camera);
//!
//!     // PIN shown on the camera screen
//!     auth.authenticate(1234).await?;
//!
//!     let info = auth.camera_mut().get_device_info().await?;
//!     println!("{}", info);
//!
//!     auth.release().await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod camera;
pub mod channels;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod observer;

// Re-exports
pub use auth::{AuthenticationState, Authenticator, FailureReason};
pub use camera::Camera;
pub use config::ClientConfig;
pub use error::{AuthError, Error, Result};
pub use events::{CapabilitySignal, EventListener};
pub use gateway::{authenticate, authenticate_with, probe, probe_with};
pub use observer::{HandshakeObserver, HandshakeStep, NoopObserver};

// Re-export types
pub use ptpip_core::{ClientIdentity, DataPhase, Session, VendorQuirks};
pub use ptpip_transport::ConnectErrorKind;
pub use ptpip_types::{DeviceDescriptor, Endpoint, Pin};
