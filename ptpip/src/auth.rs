//! Nikon Wi-Fi pairing handshake
//!
//! Pairing runs over two connections:
//!
//! 1. Approval: connect, read device info, open a session, fetch vendor
//!    data, send the approval request, then drop both channels.
//! 2. Unlock: after a settle delay reconnect, check that the camera now
//!    advertises the data commit operation, submit the PIN, wait for
//!    DeviceInfoChanged on the event channel and open the session again.
//!
//! Any failure releases both channels and leaves the machine in
//! [`AuthenticationState::Failed`]. Nothing is retried.

use std::fmt;

use ptpip_transport::ConnectErrorKind;
use ptpip_types::Pin;
use ptpip_types::codes::operation;
use tracing::{error, info, warn};

use crate::camera::Camera;
use crate::error::{AuthError, Error, Result};
use crate::observer::{HandshakeObserver, HandshakeStep, NoopObserver};

/// Handshake state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationState {
    Disconnected,
    ChannelsOpen,
    SessionOpen,
    ApprovalPending,
    ApprovalGranted,
    ReconnectPending,
    SessionOpenAuthCandidate,
    PinSubmitted,
    WaitingForCapabilityChange,
    Authenticated,
    Failed(FailureReason),
}

impl AuthenticationState {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for AuthenticationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "Failed({})", reason),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// Why the handshake stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Connect(ConnectErrorKind),
    InitFailed(u32),
    Timeout,
    Response { op_code: u16, code: u16 },
    Auth(AuthError),
    Protocol,
    Io,
    InvalidState,
}

impl From<&Error> for FailureReason {
    fn from(err: &Error) -> Self {
        match err {
            Error::Auth(e) => Self::Auth(e.clone()),
            Error::Response { op_code, code } => Self::Response {
                op_code: *op_code,
                code: *code,
            },
            Error::InitFailed { reason } => Self::InitFailed(*reason),
            Error::Transport(e) => match e.connect_kind() {
                Some(kind) => Self::Connect(kind),
                None if err.is_timeout() => Self::Timeout,
                None => Self::Io,
            },
            Error::Core(_) | Error::Types(_) => Self::Protocol,
            Error::NotConnected | Error::InvalidState(_) => Self::InvalidState,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(kind) => write!(f, "connect {}", kind),
            Self::InitFailed(reason) => write!(f, "init failed ({:#x})", reason),
            Self::Timeout => f.write_str("timeout"),
            Self::Response { op_code, code } => write!(f, "{:#06x} -> {:#06x}", op_code, code),
            Self::Auth(e) => write!(f, "{}", e),
            Self::Protocol => f.write_str("protocol error"),
            Self::Io => f.write_str("i/o error"),
            Self::InvalidState => f.write_str("invalid state"),
        }
    }
}

/// Drives a [`Camera`] through the pairing handshake
///
/// # Examples
///
/// ```no_run
/// use ptpip::{Authenticator, Camera, ClientConfig};
///
/// #[tokio::main]
/// async fn main() -> ptpip::Result<()> {
///     let camera = Camera::new(ClientConfig::new("192.168.1.10"));
///     let mut auth = Authenticator::new(camera);
///
///     auth.authenticate(1234).await?;
///     let storages = auth.camera_mut().get_storage_ids().await?;
///     println!("{:?}", storages);
///
///     auth.release().await;
///     Ok(())
/// }
/// ```
pub struct Authenticator {
    camera: Camera,
    state: AuthenticationState,
    observer: Box<dyn HandshakeObserver>,
}

impl Authenticator {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            state: AuthenticationState::Disconnected,
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl HandshakeObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn state(&self) -> &AuthenticationState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthenticationState::Authenticated
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Camera access for standard operations once authenticated
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn into_camera(self) -> Camera {
        self.camera
    }

    /// Run both phases
    ///
    /// # Errors
    ///
    /// `Auth(InvalidPin)` for a PIN above 9999, before anything is sent.
    /// Otherwise the first failing step's error; the state is then
    /// `Failed` and both channels are released.
    pub async fn authenticate(&mut self, pin: u32) -> Result<()> {
        let pin = Pin::new(pin).map_err(|_| AuthError::InvalidPin(pin))?;

        self.request_approval().await?;
        self.unlock(pin).await
    }

    /// Phase 1: ends in `ReconnectPending` with the channels released
    pub async fn request_approval(&mut self) -> Result<()> {
        if !matches!(
            self.state,
            AuthenticationState::Disconnected | AuthenticationState::Failed(_)
        ) {
            return Err(Error::InvalidState(format!("cannot start pairing from {}", self.state)));
        }
        self.transition(AuthenticationState::Disconnected);

        let result = self.approval_phase().await;
        self.settle(result).await
    }

    /// Phase 2: ends in `Authenticated` with the session open
    pub async fn unlock(&mut self, pin: Pin) -> Result<()> {
        if self.state != AuthenticationState::ReconnectPending {
            return Err(Error::InvalidState(format!("cannot submit PIN from {}", self.state)));
        }

        let result = self.unlock_phase(pin).await;
        self.settle(result).await
    }

    /// Release the channels and return to `Disconnected`
    pub async fn release(&mut self) {
        self.camera.release().await;
        self.transition(AuthenticationState::Disconnected);
    }

    async fn approval_phase(&mut self) -> Result<()> {
        self.step(HandshakeStep::Connect);
        self.camera.connect().await?;
        self.transition(AuthenticationState::ChannelsOpen);

        self.step(HandshakeStep::QueryDeviceInfo);
        let descriptor = self.camera.get_device_info().await?;
        if !descriptor.supports_pin_auth() {
            warn!("Camera does not advertise PIN authentication");
        }

        self.step(HandshakeStep::OpenSession);
        self.camera.open_session().await?;
        self.transition(AuthenticationState::SessionOpen);

        self.step(HandshakeStep::FetchVendorData);
        self.camera
            .fetch_vendor_data(operation::NIKON_DATA_FETCH_PRE)
            .await?;

        self.step(HandshakeStep::RequestApproval);
        self.transition(AuthenticationState::ApprovalPending);
        self.camera.request_approval().await?;
        self.transition(AuthenticationState::ApprovalGranted);

        self.step(HandshakeStep::Release);
        self.camera.release().await;
        self.transition(AuthenticationState::ReconnectPending);
        Ok(())
    }

    async fn unlock_phase(&mut self, pin: Pin) -> Result<()> {
        self.step(HandshakeStep::SettleDelay);
        tokio::time::sleep(self.camera.config().settle_delay()).await;

        self.step(HandshakeStep::Connect);
        self.camera.connect().await?;
        self.transition(AuthenticationState::SessionOpenAuthCandidate);

        self.step(HandshakeStep::QueryDeviceInfo);
        let descriptor = self.camera.get_device_info().await?;
        if !descriptor.supports_data_commit() {
            return Err(AuthError::CapabilityMissing.into());
        }

        self.step(HandshakeStep::SubmitPin);
        self.transition(AuthenticationState::PinSubmitted);
        self.camera.submit_pin(pin).await?;
        self.transition(AuthenticationState::WaitingForCapabilityChange);

        self.step(HandshakeStep::WaitCapabilityChange);
        let timeout = self.camera.config().capability_timeout();
        self.camera.wait_capability_change(timeout).await?;

        self.step(HandshakeStep::OpenSession);
        self.camera.open_session().await?;
        self.transition(AuthenticationState::Authenticated);

        info!("Authenticated with {}", self.camera.endpoint());
        Ok(())
    }

    async fn settle(&mut self, result: Result<()>) -> Result<()> {
        if let Err(e) = &result {
            error!(state = %self.state, error = %e, "Handshake failed");
            self.camera.release().await;
            self.transition(AuthenticationState::Failed(FailureReason::from(e)));
        }
        result
    }

    fn step(&self, step: HandshakeStep) {
        self.observer.on_step(step);
    }

    fn transition(&mut self, to: AuthenticationState) {
        if self.state == to {
            return;
        }
        info!(from = %self.state, to = %to, "Handshake state");
        self.observer.on_transition(&self.state, &to);
        self.state = to;
    }
}
