//! Posture watch binary.
//!
//! Follows a posture server and reports posture changes.

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use posture_client::{ClientConfig, ClientEvent, StreamClient};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("posture=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(false))
            .with(env_filter)
            .init();
    }

    let config = match ClientConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Client config: {:?}", config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let (events_tx, mut events_rx) = mpsc::channel(64);
    let mut client = StreamClient::new(config);
    let client_task = tokio::spawn(async move {
        client.run(events_tx, shutdown_rx).await;
        client
    });

    while let Some(event) = events_rx.recv().await {
        match event {
            ClientEvent::Connected { addr } => info!("Connected to {}", addr),
            ClientEvent::Changed(change) => {
                if change.is_recovery() {
                    info!("Back to good posture: {}", change.current.description());
                } else if change.current.is_good() {
                    info!("{}", change.current.description());
                } else {
                    warn!("{}", change.current.description());
                }
            }
            ClientEvent::Update(_) => {}
            ClientEvent::Disconnected { reason } => warn!("Disconnected: {}", reason),
        }
    }

    match client_task.await {
        Ok(client) => {
            let tracker = client.tracker();
            let ratio = tracker.good_ratio().map(|r| format!("{:.0}%", r * 100.0));
            info!(
                changes = tracker.changes(),
                good_posture = ratio.as_deref().unwrap_or("n/a"),
                "Posture watch stopped"
            );
        }
        Err(e) => warn!("Client task failed: {}", e),
    }
}
