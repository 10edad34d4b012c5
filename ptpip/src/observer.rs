//! Handshake progress callbacks

use std::fmt;

use crate::auth::AuthenticationState;

/// Handshake steps reported to a [`HandshakeObserver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    Connect,
    QueryDeviceInfo,
    OpenSession,
    FetchVendorData,
    RequestApproval,
    Release,
    SettleDelay,
    SubmitPin,
    WaitCapabilityChange,
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Receives handshake progress
///
/// Both methods default to doing nothing.
pub trait HandshakeObserver: Send + Sync {
    fn on_transition(&self, _from: &AuthenticationState, _to: &AuthenticationState) {}

    fn on_step(&self, _step: HandshakeStep) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl HandshakeObserver for NoopObserver {}
