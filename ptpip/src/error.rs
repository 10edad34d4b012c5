//! High-level error types

use ptpip_transport::ConnectErrorKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] ptpip_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] ptpip_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] ptpip_types::Error),

    /// Camera answered with something other than OK
    #[error("Operation {op_code:#06x} failed with response {code:#06x}")]
    Response { op_code: u16, code: u16 },

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Camera refused the channel init
    #[error("Channel init refused (reason {reason:#x})")]
    InitFailed { reason: u32 },

    #[error("Camera not connected")]
    NotConnected,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Handshake specific failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("PIN {0} outside 0000-9999")]
    InvalidPin(u32),

    #[error("Approval rejected with response {code:#06x}")]
    ApprovalRejected { code: u16 },

    #[error("No capability change before timeout")]
    CapabilityTimeout,

    /// Camera did not advertise the data commit operation after reconnect
    #[error("Camera does not advertise the paired operation set")]
    CapabilityMissing,
}

impl Error {
    /// Connecting or initializing a channel failed
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(ptpip_transport::Error::Connect { .. }) | Self::InitFailed { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(ptpip_transport::Error::ReadTimeout) => true,
            Self::Transport(e) => e.connect_kind() == Some(ConnectErrorKind::Timeout),
            Self::Auth(AuthError::CapabilityTimeout) => true,
            _ => false,
        }
    }

    /// The session is still usable, the caller may retry
    pub fn is_recoverable(&self) -> bool {
        self.is_timeout() || matches!(self, Self::Response { .. })
    }

    /// Response code carried by the error, if any
    pub fn response_code(&self) -> Option<u16> {
        match self {
            Self::Response { code, .. } => Some(*code),
            Self::Auth(AuthError::ApprovalRejected { code }) => Some(*code),
            _ => None,
        }
    }
}
