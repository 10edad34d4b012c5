//! PTP operation, response and event codes
//!
//! Base protocol codes follow PIMA 15740. Vendor codes are the Nikon
//! extensions observed during Wi-Fi (station mode) pairing.

/// Operation codes
pub mod operation {
    pub const GET_DEVICE_INFO: u16 = 0x1001;
    pub const OPEN_SESSION: u16 = 0x1002;
    pub const CLOSE_SESSION: u16 = 0x1003;
    pub const GET_STORAGE_IDS: u16 = 0x1004;
    pub const GET_STORAGE_INFO: u16 = 0x1005;
    pub const GET_NUM_OBJECTS: u16 = 0x1006;
    pub const GET_OBJECT_HANDLES: u16 = 0x1007;
    pub const GET_OBJECT_INFO: u16 = 0x1008;
    pub const GET_OBJECT: u16 = 0x1009;
    pub const GET_THUMB: u16 = 0x100A;
    pub const DELETE_OBJECT: u16 = 0x100B;
    pub const SEND_OBJECT_INFO: u16 = 0x100C;
    pub const SEND_OBJECT: u16 = 0x100D;
    pub const INITIATE_CAPTURE: u16 = 0x100E;
    pub const FORMAT_STORE: u16 = 0x100F;
    pub const RESET_DEVICE: u16 = 0x1010;
    pub const SELF_TEST: u16 = 0x1011;
    pub const SET_OBJECT_PROTECTION: u16 = 0x1012;
    pub const POWER_DOWN: u16 = 0x1013;
    pub const GET_DEVICE_PROP_DESC: u16 = 0x1014;
    pub const GET_DEVICE_PROP_VALUE: u16 = 0x1015;
    pub const SET_DEVICE_PROP_VALUE: u16 = 0x1016;
    pub const RESET_DEVICE_PROP_VALUE: u16 = 0x1017;
    pub const TERMINATE_OPEN_CAPTURE: u16 = 0x1018;
    pub const MOVE_OBJECT: u16 = 0x1019;
    pub const COPY_OBJECT: u16 = 0x101A;
    pub const GET_PARTIAL_OBJECT: u16 = 0x101B;
    pub const INITIATE_OPEN_CAPTURE: u16 = 0x101C;

    /// Nikon approval request and PIN submission share this code
    pub const NIKON_PIN_AUTH: u16 = 0x935A;

    /// Nikon data commit. Only advertised once the camera has paired.
    pub const NIKON_DATA_COMMIT: u16 = 0x944C;

    /// Nikon data fetch, advertised alongside the commit operation
    pub const NIKON_DATA_FETCH: u16 = 0x952A;

    /// Nikon data fetch variant issued by the reference app before approval
    pub const NIKON_DATA_FETCH_PRE: u16 = 0x952B;
}

/// Response codes
pub mod response {
    pub const UNDEFINED: u16 = 0x2000;
    pub const OK: u16 = 0x2001;
    pub const GENERAL_ERROR: u16 = 0x2002;
    pub const SESSION_NOT_OPEN: u16 = 0x2003;
    pub const INVALID_TRANSACTION_ID: u16 = 0x2004;
    pub const OPERATION_NOT_SUPPORTED: u16 = 0x2005;
    pub const PARAMETER_NOT_SUPPORTED: u16 = 0x2006;
    pub const INCOMPLETE_TRANSFER: u16 = 0x2007;
    pub const INVALID_STORAGE_ID: u16 = 0x2008;
    pub const INVALID_OBJECT_HANDLE: u16 = 0x2009;
    pub const DEVICE_PROP_NOT_SUPPORTED: u16 = 0x200A;
    pub const INVALID_OBJECT_FORMAT_CODE: u16 = 0x200B;
    pub const STORE_FULL: u16 = 0x200C;
    pub const OBJECT_WRITE_PROTECTED: u16 = 0x200D;
    pub const STORE_READ_ONLY: u16 = 0x200E;
    pub const ACCESS_DENIED: u16 = 0x200F;
    pub const NO_THUMBNAIL_PRESENT: u16 = 0x2010;
    pub const SELF_TEST_FAILED: u16 = 0x2011;
    pub const PARTIAL_DELETION: u16 = 0x2012;
    pub const STORE_NOT_AVAILABLE: u16 = 0x2013;
    pub const SPECIFICATION_BY_FORMAT_UNSUPPORTED: u16 = 0x2014;
    pub const NO_VALID_OBJECT_INFO: u16 = 0x2015;
    pub const INVALID_CODE_FORMAT: u16 = 0x2016;
    pub const UNKNOWN_VENDOR_CODE: u16 = 0x2017;
    pub const CAPTURE_ALREADY_TERMINATED: u16 = 0x2018;
    pub const DEVICE_BUSY: u16 = 0x2019;
    pub const INVALID_PARENT_OBJECT: u16 = 0x201A;
    pub const INVALID_DEVICE_PROP_FORMAT: u16 = 0x201B;
    pub const INVALID_DEVICE_PROP_VALUE: u16 = 0x201C;
    pub const INVALID_PARAMETER: u16 = 0x201D;
    pub const SESSION_ALREADY_OPEN: u16 = 0x201E;
    pub const TRANSACTION_CANCELLED: u16 = 0x201F;
    pub const SPECIFICATION_OF_DESTINATION_UNSUPPORTED: u16 = 0x2020;
}

/// Event codes
pub mod event {
    pub const CANCEL_TRANSACTION: u16 = 0x4001;
    pub const OBJECT_ADDED: u16 = 0x4002;
    pub const OBJECT_REMOVED: u16 = 0x4003;
    pub const STORE_ADDED: u16 = 0x4004;
    pub const STORE_REMOVED: u16 = 0x4005;
    pub const DEVICE_PROP_CHANGED: u16 = 0x4006;
    pub const OBJECT_INFO_CHANGED: u16 = 0x4007;

    /// Raised by the camera once PIN pairing has unlocked the full operation set
    pub const DEVICE_INFO_CHANGED: u16 = 0x4008;
}

/// Get a printable operation name
pub fn operation_name(code: u16) -> &'static str {
    use operation::*;

    match code {
        GET_DEVICE_INFO => "GetDeviceInfo",
        OPEN_SESSION => "OpenSession",
        CLOSE_SESSION => "CloseSession",
        GET_STORAGE_IDS => "GetStorageIDs",
        GET_STORAGE_INFO => "GetStorageInfo",
        GET_NUM_OBJECTS => "GetNumObjects",
        GET_OBJECT_HANDLES => "GetObjectHandles",
        GET_OBJECT_INFO => "GetObjectInfo",
        GET_OBJECT => "GetObject",
        GET_THUMB => "GetThumb",
        DELETE_OBJECT => "DeleteObject",
        SEND_OBJECT_INFO => "SendObjectInfo",
        SEND_OBJECT => "SendObject",
        INITIATE_CAPTURE => "InitiateCapture",
        FORMAT_STORE => "FormatStore",
        RESET_DEVICE => "ResetDevice",
        SELF_TEST => "SelfTest",
        SET_OBJECT_PROTECTION => "SetObjectProtection",
        POWER_DOWN => "PowerDown",
        GET_DEVICE_PROP_DESC => "GetDevicePropDesc",
        GET_DEVICE_PROP_VALUE => "GetDevicePropValue",
        SET_DEVICE_PROP_VALUE => "SetDevicePropValue",
        RESET_DEVICE_PROP_VALUE => "ResetDevicePropValue",
        TERMINATE_OPEN_CAPTURE => "TerminateOpenCapture",
        MOVE_OBJECT => "MoveObject",
        COPY_OBJECT => "CopyObject",
        GET_PARTIAL_OBJECT => "GetPartialObject",
        INITIATE_OPEN_CAPTURE => "InitiateOpenCapture",
        NIKON_PIN_AUTH => "Nikon_PinAuth",
        NIKON_DATA_COMMIT => "Nikon_DataCommit",
        NIKON_DATA_FETCH => "Nikon_DataFetch",
        NIKON_DATA_FETCH_PRE => "Nikon_DataFetchPre",
        _ => "Unknown",
    }
}

/// Get a printable response name
pub fn response_name(code: u16) -> &'static str {
    use response::*;

    match code {
        UNDEFINED => "Undefined",
        OK => "OK",
        GENERAL_ERROR => "GeneralError",
        SESSION_NOT_OPEN => "SessionNotOpen",
        INVALID_TRANSACTION_ID => "InvalidTransactionID",
        OPERATION_NOT_SUPPORTED => "OperationNotSupported",
        PARAMETER_NOT_SUPPORTED => "ParameterNotSupported",
        INCOMPLETE_TRANSFER => "IncompleteTransfer",
        INVALID_STORAGE_ID => "InvalidStorageID",
        INVALID_OBJECT_HANDLE => "InvalidObjectHandle",
        DEVICE_PROP_NOT_SUPPORTED => "DevicePropNotSupported",
        INVALID_OBJECT_FORMAT_CODE => "InvalidObjectFormatCode",
        STORE_FULL => "StoreFull",
        OBJECT_WRITE_PROTECTED => "ObjectWriteProtected",
        STORE_READ_ONLY => "StoreReadOnly",
        ACCESS_DENIED => "AccessDenied",
        NO_THUMBNAIL_PRESENT => "NoThumbnailPresent",
        SELF_TEST_FAILED => "SelfTestFailed",
        PARTIAL_DELETION => "PartialDeletion",
        STORE_NOT_AVAILABLE => "StoreNotAvailable",
        SPECIFICATION_BY_FORMAT_UNSUPPORTED => "SpecificationByFormatUnsupported",
        NO_VALID_OBJECT_INFO => "NoValidObjectInfo",
        INVALID_CODE_FORMAT => "InvalidCodeFormat",
        UNKNOWN_VENDOR_CODE => "UnknownVendorCode",
        CAPTURE_ALREADY_TERMINATED => "CaptureAlreadyTerminated",
        DEVICE_BUSY => "DeviceBusy",
        INVALID_PARENT_OBJECT => "InvalidParentObject",
        INVALID_DEVICE_PROP_FORMAT => "InvalidDevicePropFormat",
        INVALID_DEVICE_PROP_VALUE => "InvalidDevicePropValue",
        INVALID_PARAMETER => "InvalidParameter",
        SESSION_ALREADY_OPEN => "SessionAlreadyOpen",
        TRANSACTION_CANCELLED => "TransactionCancelled",
        SPECIFICATION_OF_DESTINATION_UNSUPPORTED => "SpecificationOfDestinationUnsupported",
        _ => "Unknown",
    }
}

/// Get a printable event name
pub fn event_name(code: u16) -> &'static str {
    use event::*;

    match code {
        CANCEL_TRANSACTION => "CancelTransaction",
        OBJECT_ADDED => "ObjectAdded",
        OBJECT_REMOVED => "ObjectRemoved",
        STORE_ADDED => "StoreAdded",
        STORE_REMOVED => "StoreRemoved",
        DEVICE_PROP_CHANGED => "DevicePropChanged",
        OBJECT_INFO_CHANGED => "ObjectInfoChanged",
        DEVICE_INFO_CHANGED => "DeviceInfoChanged",
        _ => "Unknown",
    }
}
