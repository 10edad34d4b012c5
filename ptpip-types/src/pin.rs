//! Pairing PIN shown on the camera screen

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Four digit pairing PIN (0000-9999)
///
/// Construction validates the range, so a `Pin` can always be sent.
///
/// # Examples
///
/// ```
/// use ptpip_types::Pin;
///
/// let pin: Pin = "0420".parse().unwrap();
/// assert_eq!(pin.value(), 420);
/// assert!(Pin::new(10_000).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin(u16);

impl Pin {
    pub const MAX: u16 = 9999;

    pub fn new(value: u32) -> Result<Self> {
        if value > Self::MAX as u32 {
            return Err(Error::InvalidPin(value.to_string()));
        }
        Ok(Self(value as u16))
    }

    /// Numeric value sent as the operation parameter
    pub fn value(self) -> u32 {
        self.0 as u32
    }
}

impl FromStr for Pin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.len() > 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidPin(s.to_string()));
        }

        let value = trimmed
            .parse::<u32>()
            .map_err(|_| Error::InvalidPin(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<u32> for Pin {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}
