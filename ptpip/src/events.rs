//! Event channel listener
//!
//! A background task owns the event channel and raises a
//! [`CapabilitySignal`] when the camera reports DeviceInfoChanged. It never
//! touches the command channel or the handshake state.

use std::sync::Arc;
use std::time::Duration;

use ptpip_core::{Event, Message, Packet, PacketType, Session};
use ptpip_types::codes::{event, event_name};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::channels::Channel;
use crate::error::Error;

/// Level-triggered "capabilities changed" flag
///
/// One writer (the listener), any number of waiters. Raising twice has no
/// further effect, and the flag is only cleared by [`consume`](Self::consume).
#[derive(Debug, Clone)]
pub struct CapabilitySignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CapabilitySignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Raise the flag; returns `false` if it was already raised
    pub fn raise(&self) -> bool {
        self.tx.send_if_modified(|raised| {
            if *raised {
                false
            } else {
                *raised = true;
                true
            }
        })
    }

    pub fn is_raised(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait up to `timeout` for the flag; returns immediately if already raised
    pub async fn wait(&self, timeout: Duration) -> bool {
        let mut rx = self.tx.subscribe();
        tokio::time::timeout(timeout, rx.wait_for(|raised| *raised))
            .await
            .is_ok_and(|result| result.is_ok())
    }

    /// Clear the flag, returning whether it was raised
    pub fn consume(&self) -> bool {
        self.tx.send_replace(false)
    }
}

impl Default for CapabilitySignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the background event task
///
/// Dropping the handle signals the task to stop; it closes the event channel
/// on its way out.
pub struct EventListener {
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
    signal: CapabilitySignal,
}

impl EventListener {
    /// Start listening on `channel`
    pub fn spawn(channel: Channel, session: Session, signal: CapabilitySignal) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run(channel, session, signal.clone(), stop_rx));

        Self {
            stop_tx,
            handle: Some(handle),
            signal,
        }
    }

    pub fn signal(&self) -> &CapabilitySignal {
        &self.signal
    }

    /// The task has not exited yet
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the task and wait for it to close the channel
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Event listener task failed");
            }
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}

async fn run(
    mut channel: Channel,
    session: Session,
    signal: CapabilitySignal,
    mut stop_rx: watch::Receiver<bool>,
) {
    debug!(connection_number = session.connection_number(), "Event listener started");

    loop {
        tokio::select! {
            result = channel.read_more() => match result {
                Ok(_) => {
                    if let Err(e) = drain(&mut channel, &signal) {
                        warn!(error = %e, "Dropping undecodable event data");
                        channel.buffer_mut().clear();
                    }
                }
                Err(Error::Transport(ptpip_transport::Error::ReadTimeout)) => {
                    trace!("Event channel idle");
                }
                Err(Error::Transport(ptpip_transport::Error::ConnectionClosed)) => {
                    info!("Event channel closed by camera");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Event channel read failed");
                    break;
                }
            },
            _ = stop_rx.changed() => {
                debug!("Event listener stopping");
                break;
            }
        }
    }

    channel.close().await;
}

fn drain(channel: &mut Channel, signal: &CapabilitySignal) -> crate::Result<()> {
    while let Some(packet) = channel.take_packet()? {
        handle_packet(&packet, signal)?;
    }
    Ok(())
}

fn handle_packet(packet: &Packet, signal: &CapabilitySignal) -> crate::Result<()> {
    if packet.packet_type != PacketType::Event {
        warn!(packet_type = %packet.packet_type, "Unexpected packet on event channel");
        return Ok(());
    }

    let ev = Event::from_packet(packet)?;
    match ev.event_code {
        event::DEVICE_INFO_CHANGED => {
            if signal.raise() {
                info!(transaction_id = ev.transaction_id, "Camera capabilities changed");
            } else {
                warn!("Duplicate DeviceInfoChanged ignored");
            }
        }
        code => debug!(code, name = event_name(code), "Event"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelRole;
    use crate::config::ClientConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_signal_is_level_triggered() {
        let signal = CapabilitySignal::new();
        assert!(!signal.is_raised());

        assert!(signal.raise());
        assert!(!signal.raise());
        assert!(signal.is_raised());

        // waiters see it even when they arrive late
        assert!(signal.wait(Duration::from_millis(1)).await);
        assert!(signal.wait(Duration::from_millis(1)).await);

        assert!(signal.consume());
        assert!(!signal.is_raised());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let signal = CapabilitySignal::new();
        assert!(!signal.wait(Duration::from_secs(10)).await);
    }

    #[tokio::test]
    async fn test_wait_wakes_on_raise() {
        let signal = CapabilitySignal::new();
        let raiser = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            raiser.raise();
        });

        assert!(signal.wait(Duration::from_secs(2)).await);
    }

    async fn listener_with_peer(read_timeout: Duration) -> (EventListener, tokio::net::TcpStream) {
        let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();
        let config = ClientConfig::new("127.0.0.1")
            .with_port(port)
            .with_read_timeout(read_timeout);

        let mut channel = Channel::tcp(ChannelRole::Event, &config);
        let (connected, accepted) = tokio::join!(channel.connect(), server.accept());
        connected.unwrap();

        let listener = EventListener::spawn(channel, Session::default(), CapabilitySignal::new());
        (listener, accepted.unwrap().0)
    }

    #[tokio::test]
    async fn test_listener_raises_signal() {
        let (listener, mut peer) = listener_with_peer(Duration::from_millis(50)).await;

        let mut data = Event::new(event::OBJECT_ADDED, 0).encode();
        data.extend_from_slice(&Event::new(event::DEVICE_INFO_CHANGED, 0).encode());
        data.extend_from_slice(&Event::new(event::DEVICE_INFO_CHANGED, 0).encode());
        peer.write_all(&data).await.unwrap();

        assert!(listener.signal().wait(Duration::from_secs(2)).await);
        assert!(listener.is_running());

        listener.stop().await;

        // listener closed its end
        let mut buf = [0u8; 1];
        assert_eq!(peer.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_listener_survives_idle_and_ends_on_close() {
        let (listener, peer) = listener_with_peer(Duration::from_millis(20)).await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(listener.is_running());

        drop(peer);
        tokio::time::timeout(Duration::from_secs(2), async {
            while listener.is_running() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        assert!(!listener.signal().is_raised());
    }
}
