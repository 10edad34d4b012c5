//! Camera network endpoint

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Well-known PTP/IP port
pub const DEFAULT_PORT: u16 = 15740;

/// Host and port of a PTP/IP responder
///
/// Fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Like [`new`](Self::new), rejecting an empty host or port 0
    pub fn try_new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(Error::Validation("empty host".into()));
        }
        if host.chars().any(char::is_whitespace) {
            return Err(Error::Validation(format!("whitespace in host {:?}", host)));
        }
        if port == 0 {
            return Err(Error::Validation("port 0".into()));
        }
        Ok(Self::new(host, port))
    }

    /// Endpoint on the default PTP/IP port
    pub fn with_default_port(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_PORT)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// `host` or `host:port`; the port defaults to 15740
impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| Error::Validation(format!("invalid port in {:?}", s)))?;
                Self::try_new(host, port)
            }
            None => Self::try_new(s, DEFAULT_PORT),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
