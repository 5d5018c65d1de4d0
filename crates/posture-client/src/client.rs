//! Reconnecting stream client.

use std::time::Instant;

use posture_models::PostureLabel;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::reader::LabelReader;
use crate::tracker::{PostureChange, PostureTracker};

/// Events emitted while following the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Connected to the server.
    Connected { addr: String },
    /// A label arrived.
    Update(PostureLabel),
    /// The label differs from the previous one.
    Changed(PostureChange),
    /// The connection ended; a reconnect follows unless shutting down.
    Disconnected { reason: String },
}

/// Follows a posture server, reconnecting whenever the connection is lost.
pub struct StreamClient {
    config: ClientConfig,
    tracker: PostureTracker,
}

impl StreamClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            tracker: PostureTracker::new(),
        }
    }

    pub fn tracker(&self) -> &PostureTracker {
        &self.tracker
    }

    /// Connect, read and reconnect until `shutdown` flips to true or the
    /// event receiver is dropped.
    pub async fn run(&mut self, events: mpsc::Sender<ClientEvent>, mut shutdown: watch::Receiver<bool>) {
        info!("Following posture stream at {}", self.config.server_addr);

        loop {
            if *shutdown.borrow() {
                break;
            }

            let reason = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                result = self.follow_once(&events) => match result {
                    Ok(()) => "server closed the stream".to_string(),
                    Err(e) => e.to_string(),
                },
            };

            self.tracker.reset_at(Instant::now());
            if events
                .send(ClientEvent::Disconnected { reason: reason.clone() })
                .await
                .is_err()
            {
                break;
            }
            warn!(
                "Disconnected: {}. Retrying in {:?}",
                reason, self.config.reconnect_delay
            );

            tokio::select! {
                _ = shutdown.changed() => {}
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }

        self.tracker.reset_at(Instant::now());
        info!("Stream client stopped");
    }

    /// Follow one connection until it ends.
    async fn follow_once(&mut self, events: &mpsc::Sender<ClientEvent>) -> ClientResult<()> {
        let addr = self.config.server_addr.clone();
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| ClientError::Connect {
                addr: addr.clone(),
                source,
            })?;

        info!("Connected to {}", addr);
        if events.send(ClientEvent::Connected { addr }).await.is_err() {
            return Ok(());
        }

        let mut reader = LabelReader::new(BufReader::new(stream));
        while let Some(label) = reader.next_label().await? {
            debug!("Received {}", label);
            if events.send(ClientEvent::Update(label)).await.is_err() {
                return Ok(());
            }
            if let Some(change) = self.tracker.observe(label) {
                if events.send(ClientEvent::Changed(change)).await.is_err() {
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}
