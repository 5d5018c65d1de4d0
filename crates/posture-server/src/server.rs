//! TCP posture server.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use posture_classifier::PostureClassifier;
use posture_models::ConnectionId;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn, Instrument};

use crate::config::{ServeMode, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::logging::ConnectionLogger;
use crate::metrics;
use crate::protocol::{LineWriter, PROTOCOL_VERSION};
use crate::shutdown::Shutdown;
use crate::source::PoseSource;
use crate::stream::{ConnectionState, FrameStreamer, StreamStats, Termination};

/// What happened on one served connection.
#[derive(Debug, Clone)]
pub struct ConnectionSummary {
    pub id: ConnectionId,
    pub peer: SocketAddr,
    pub stats: StreamStats,
    pub termination: Termination,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl ConnectionSummary {
    /// The state the connection ended in.
    pub fn state(&self) -> ConnectionState {
        self.termination.state()
    }
}

/// Connections served during one `serve` call.
#[derive(Debug, Clone, Default)]
pub struct ServeReport {
    pub connections: Vec<ConnectionSummary>,
}

impl ServeReport {
    /// Total label lines sent across connections.
    pub fn lines_sent(&self) -> u64 {
        self.connections.iter().map(|c| c.stats.lines_sent).sum()
    }
}

/// Streams posture labels to one client at a time.
pub struct PostureServer {
    listener: TcpListener,
    config: ServerConfig,
    streamer: FrameStreamer,
}

impl PostureServer {
    /// Validate the config and bind the listening socket.
    pub async fn bind(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;

        let addr = config.bind_addr();
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        let streamer = FrameStreamer::new(PostureClassifier::new(config.thresholds))
            .with_min_visibility(config.min_visibility);

        Ok(Self {
            listener,
            config,
            streamer,
        })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept clients and stream labels produced from `source`.
    ///
    /// In single mode this returns after the first connection ends. In
    /// sequential mode it goes back to accepting after a client disconnects
    /// or fails. Producer end-of-stream and shutdown always return `Ok`;
    /// acquisition failure returns [`ServerError::Acquisition`] after the
    /// connection is closed. The source is dropped on return.
    pub async fn serve<S>(&self, mut source: S, mut shutdown: Shutdown) -> ServerResult<ServeReport>
    where
        S: PoseSource,
    {
        let local_addr = self.local_addr()?;
        info!(
            "Posture server listening on {} (protocol v{}, mode={}, source={})",
            local_addr,
            PROTOCOL_VERSION,
            self.config.serve_mode,
            source.name()
        );

        let mut report = ServeReport::default();

        loop {
            let (stream, peer) = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    info!("Shutdown requested while awaiting connection");
                    break;
                }
                accepted = self.listener.accept() => accepted.map_err(ServerError::Accept)?,
            };

            let summary = self
                .handle_connection(stream, peer, &mut source, &mut shutdown)
                .await;
            let termination = summary.termination.clone();
            report.connections.push(summary);

            if let Termination::AcquisitionFailed(message) = termination {
                return Err(ServerError::Acquisition(message));
            }
            if termination.ends_serving() || self.config.serve_mode == ServeMode::Single {
                break;
            }

            info!("Awaiting next connection");
        }

        Ok(report)
    }

    async fn handle_connection<S>(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        source: &mut S,
        shutdown: &mut Shutdown,
    ) -> ConnectionSummary
    where
        S: PoseSource,
    {
        let id = ConnectionId::new();
        let logger = ConnectionLogger::new(&id, peer);
        let started_at = Utc::now();
        metrics::record_connection();

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY for {}: {}", peer, e);
        }

        let span = logger.create_span();
        let outcome = async {
            logger.log_start(&format!("state={}", ConnectionState::Streaming));

            let mut writer = LineWriter::new(stream, self.config.send_timeout);
            let outcome = self
                .streamer
                .run(source, &mut writer, shutdown, &logger)
                .await;

            if !matches!(outcome.termination, Termination::ClosedByPeer) {
                writer.close().await;
            }

            let message = format!(
                "state={} reason=\"{}\" frames={} no_pose={} lines_sent={}",
                outcome.termination.state(),
                outcome.termination,
                outcome.stats.frames,
                outcome.stats.no_pose,
                outcome.stats.lines_sent
            );
            match outcome.termination.state() {
                ConnectionState::Failed => logger.log_error(&message),
                _ => logger.log_completion(&message),
            }

            outcome
        }
        .instrument(span)
        .await;

        metrics::record_connection_closed(outcome.termination.state());

        ConnectionSummary {
            id,
            peer,
            stats: outcome.stats,
            termination: outcome.termination,
            started_at,
            ended_at: Utc::now(),
        }
    }
}
