//! Type definitions for ptpip

pub mod codes;
pub mod device_info;
pub mod endpoint;
pub mod error;
pub mod pin;

pub use device_info::DeviceDescriptor;
pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use pin::Pin;
