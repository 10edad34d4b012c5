//! Client configuration

use std::time::Duration;

use ptpip_core::constants::{
    DEFAULT_CAPABILITY_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT,
    DEFAULT_SESSION_ID, DEFAULT_SETTLE_DELAY,
};
use ptpip_core::{ClientIdentity, VendorQuirks};
use ptpip_types::Endpoint;

/// Everything a [`Camera`](crate::Camera) needs to reach and pair a body
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ptpip::ClientConfig;
///
/// let config = ClientConfig::new("192.168.1.10")
///     .with_read_timeout(Duration::from_secs(5))
///     .with_settle_delay(Duration::from_secs(3));
///
/// assert_eq!(config.endpoint().port(), 15740);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    endpoint: Endpoint,
    connect_timeout: Duration,
    read_timeout: Duration,
    settle_delay: Duration,
    capability_timeout: Duration,
    session_id: u32,
    identity: ClientIdentity,
    quirks: VendorQuirks,
}

impl ClientConfig {
    /// Defaults for a camera at `host` on the standard port
    pub fn new(host: impl Into<String>) -> Self {
        Self::for_endpoint(Endpoint::with_default_port(host))
    }

    pub fn for_endpoint(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            capability_timeout: DEFAULT_CAPABILITY_TIMEOUT,
            session_id: DEFAULT_SESSION_ID,
            identity: ClientIdentity::default(),
            quirks: VendorQuirks::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.endpoint = Endpoint::new(self.endpoint.host(), port);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bound for every blocking read on either channel
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Pause between the approval disconnect and the reconnect
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// How long to wait for DeviceInfoChanged after the PIN
    pub fn with_capability_timeout(mut self, timeout: Duration) -> Self {
        self.capability_timeout = timeout;
        self
    }

    pub fn with_session_id(mut self, session_id: u32) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_identity(mut self, identity: ClientIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_quirks(mut self, quirks: VendorQuirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn capability_timeout(&self) -> Duration {
        self.capability_timeout
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn quirks(&self) -> &VendorQuirks {
        &self.quirks
    }
}
