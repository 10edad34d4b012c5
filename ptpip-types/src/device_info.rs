//! Device capability descriptor

use std::collections::BTreeSet;
use std::fmt;

use crate::codes::operation;

/// Capability descriptor returned by GetDeviceInfo
///
/// Every field is optional: firmware that has not been paired yet may cut the
/// dataset short, and whatever was decoded before the cut is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// PTP standard version (e.g. 100 for 1.00)
    pub standard_version: Option<u16>,

    /// Vendor extension id (0x0000000A for Nikon)
    pub vendor_extension_id: Option<u32>,

    pub vendor_extension_version: Option<u16>,

    pub vendor_description: Option<String>,

    pub functional_mode: Option<u16>,

    /// Supported operation codes
    pub operations: Option<BTreeSet<u16>>,

    /// Supported event codes
    pub events: Option<BTreeSet<u16>>,

    /// Supported device property codes
    pub device_properties: Option<BTreeSet<u16>>,

    pub capture_formats: Option<BTreeSet<u16>>,

    pub image_formats: Option<BTreeSet<u16>>,

    pub manufacturer: Option<String>,

    pub model: Option<String>,

    pub device_version: Option<String>,

    pub serial_number: Option<String>,
}

impl DeviceDescriptor {
    /// Check whether an operation code is advertised
    pub fn supports_operation(&self, code: u16) -> bool {
        self.operations
            .as_ref()
            .is_some_and(|ops| ops.contains(&code))
    }

    /// Check whether an event code is advertised
    pub fn supports_event(&self, code: u16) -> bool {
        self.events
            .as_ref()
            .is_some_and(|events| events.contains(&code))
    }

    pub fn supports_pin_auth(&self) -> bool {
        self.supports_operation(operation::NIKON_PIN_AUTH)
    }

    /// The data commit operation only shows up once pairing succeeded
    pub fn supports_data_commit(&self) -> bool {
        self.supports_operation(operation::NIKON_DATA_COMMIT)
    }

    pub fn supports_data_fetch(&self) -> bool {
        self.supports_operation(operation::NIKON_DATA_FETCH)
    }

    /// Number of advertised operations
    pub fn operation_count(&self) -> usize {
        self.operations.as_ref().map_or(0, BTreeSet::len)
    }

    /// True when every field up to the serial number was present
    pub fn is_complete(&self) -> bool {
        self.serial_number.is_some()
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Device[{} {}, FW: {}, SN: {}, ops: {}]",
            self.manufacturer.as_deref().unwrap_or("?"),
            self.model.as_deref().unwrap_or("?"),
            self.device_version.as_deref().unwrap_or("?"),
            self.serial_number.as_deref().unwrap_or("?"),
            self.operation_count()
        )
    }
}
