//! Pair with a Nikon camera and list its storages

use anyhow::Context;
use ptpip::{
    AuthenticationState, Authenticator, Camera, ClientConfig, Endpoint, HandshakeObserver,
};
use tracing_subscriber::EnvFilter;

struct PrintSteps;

impl HandshakeObserver for PrintSteps {
    fn on_transition(&self, _from: &AuthenticationState, to: &AuthenticationState) {
        println!("  -> {}", to);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let endpoint: Endpoint = std::env::var("CAMERA_IP")
        .unwrap_or_else(|_| "192.168.1.1".to_string())
        .parse()
        .context("CAMERA_IP must be host or host:port")?;
    let pin: u32 = std::env::var("CAMERA_PIN")
        .context("CAMERA_PIN is not set")?
        .parse()
        .context("CAMERA_PIN must be a number")?;

    let mut auth = Authenticator::new(Camera::new(ClientConfig::for_endpoint(endpoint))).with_observer(PrintSteps);

    println!("Confirm the pairing prompt on the camera...");
    if let Err(e) = auth.authenticate(pin).await {
        auth.release().await;
        return Err(e).context("pairing failed");
    }

    let camera = auth.camera_mut();
    if let Some(info) = camera.descriptor() {
        println!("Paired with {}", info);
    }
    let storages = camera.get_storage_ids().await?;
    println!("Storages: {:08x?}", storages);

    auth.release().await;
    Ok(())
}
