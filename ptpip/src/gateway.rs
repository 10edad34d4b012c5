//! One-shot entry points for tools that hand the camera to another process
//!
//! - [`probe`]: does a PTP/IP responder answer at this endpoint?
//! - [`authenticate`]: pair, then release so the endpoint is free again

use ptpip_types::Endpoint;
use tracing::{debug, info, warn};

use crate::auth::Authenticator;
use crate::camera::Camera;
use crate::channels::open_command;
use crate::config::ClientConfig;
use crate::error::Result;

/// Check for a PTP/IP responder with default settings
///
/// Opens only the command channel; no session is created.
pub async fn probe(endpoint: &Endpoint) -> bool {
    probe_with(&ClientConfig::for_endpoint(endpoint.clone())).await
}

pub async fn probe_with(config: &ClientConfig) -> bool {
    match open_command(config).await {
        Ok((mut channel, ack)) => {
            info!(
                responder = ack.responder_name.as_deref().unwrap_or("?"),
                "PTP/IP responder at {}",
                config.endpoint()
            );
            channel.close().await;
            true
        }
        Err(e) => {
            debug!(error = %e, "No PTP/IP responder at {}", config.endpoint());
            false
        }
    }
}

/// Pair with default settings and release the channels
pub async fn authenticate(endpoint: &Endpoint, pin: u32) -> bool {
    authenticate_with(ClientConfig::for_endpoint(endpoint.clone()), pin)
        .await
        .is_ok()
}

/// Pair and release the channels, reporting why pairing failed
pub async fn authenticate_with(config: ClientConfig, pin: u32) -> Result<()> {
    let mut auth = Authenticator::new(Camera::new(config));

    let result = auth.authenticate(pin).await;
    auth.release().await;

    match &result {
        Ok(()) => info!("Pairing with {} complete", auth.camera().endpoint()),
        Err(e) => warn!(error = %e, "Pairing with {} failed", auth.camera().endpoint()),
    }
    result
}
