//! Session bookkeeping for a PTP/IP client
//!
//! A session tracks:
//! - Session id (chosen by the client, constant per instance)
//! - Connection number (assigned by the camera on command channel init)
//! - Client identity presented during init
//! - Channel / session state

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::constants::{DEFAULT_CLIENT_GUID, DEFAULT_CLIENT_NAME, DEFAULT_SESSION_ID};
use crate::error::{Error, Result};

/// GUID and display name sent in the command channel init
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub guid: [u8; 16],
    pub name: String,
}

impl ClientIdentity {
    pub fn new(guid: [u8; 16], name: impl Into<String>) -> Self {
        Self {
            guid,
            name: name.into(),
        }
    }
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_GUID, DEFAULT_CLIENT_NAME)
    }
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No channels
    Disconnected,

    /// Both channels initialized, no PTP session
    ChannelsOpen,

    /// OpenSession accepted
    SessionOpen,
}

/// Session handle
///
/// Cloned cheaply (Arc internally). The event listener holds a clone for
/// read-only inspection; only the foreground flow changes it.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    session_id: u32,

    identity: ClientIdentity,

    /// 0 while disconnected
    connection_number: AtomicU32,

    responder_name: RwLock<Option<String>>,

    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(session_id: u32, identity: ClientIdentity) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                session_id,
                identity,
                connection_number: AtomicU32::new(0),
                responder_name: RwLock::new(None),
                state: RwLock::new(SessionState::Disconnected),
            }),
        }
    }

    pub fn session_id(&self) -> u32 {
        self.inner.session_id
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.inner.identity
    }

    pub fn connection_number(&self) -> u32 {
        self.inner.connection_number.load(Ordering::Acquire)
    }

    /// Camera name from the init ack, if it sent one
    pub fn responder_name(&self) -> Option<String> {
        self.inner.responder_name.read().clone()
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    pub fn is_connected(&self) -> bool {
        !matches!(self.state(), SessionState::Disconnected)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state(), SessionState::SessionOpen)
    }

    /// Record a successful channel init
    pub fn channels_opened(&self, connection_number: u32, responder_name: Option<String>) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Disconnected {
            return Err(Error::InvalidSessionState(format!(
                "Cannot open channels from state: {:?}",
                *state
            )));
        }

        self.inner
            .connection_number
            .store(connection_number, Ordering::Release);
        *self.inner.responder_name.write() = responder_name;
        *state = SessionState::ChannelsOpen;

        Ok(())
    }

    /// Mark the PTP session as open
    pub fn session_opened(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::ChannelsOpen {
            return Err(Error::InvalidSessionState(format!(
                "Cannot open session from state: {:?}",
                *state
            )));
        }

        *state = SessionState::SessionOpen;
        Ok(())
    }

    /// Mark the PTP session as closed, channels stay up
    pub fn session_closed(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::SessionOpen {
            return Err(Error::InvalidSessionState(format!(
                "Cannot close session from state: {:?}",
                *state
            )));
        }

        *state = SessionState::ChannelsOpen;
        Ok(())
    }

    /// Forget the connection
    pub fn close(&self) {
        self.inner.connection_number.store(0, Ordering::Release);
        *self.inner.responder_name.write() = None;
        *self.inner.state.write() = SessionState::Disconnected;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_ID, ClientIdentity::default())
    }
}
