//! Check whether a PTP/IP responder is reachable

use ptpip::{Endpoint, probe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // host or host:port
    let endpoint: Endpoint = std::env::var("CAMERA_IP")
        .unwrap_or_else(|_| "192.168.1.1".to_string())
        .parse()?;

    if probe(&endpoint).await {
        println!("{} answers PTP/IP", endpoint);
    } else {
        println!("Nothing at {}", endpoint);
        std::process::exit(1);
    }
    Ok(())
}
