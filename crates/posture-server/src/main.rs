//! Posture streaming server binary.

use std::net::SocketAddr;

use tracing::{error, info};

use posture_server::logging::init_tracing;
use posture_server::{metrics, source, PostureServer, ServerConfig, Shutdown};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing("posture=info");

    info!("Starting posture-server");

    // Load configuration
    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
    info!("Server config: {:?}", config);

    // Initialize metrics
    if let Some(addr) = config.metrics_addr.as_deref() {
        let addr: SocketAddr = match addr.parse() {
            Ok(a) => a,
            Err(e) => {
                error!("Invalid METRICS_ADDR {}: {}", addr, e);
                std::process::exit(1);
            }
        };
        match metrics::init_metrics(addr) {
            Ok(()) => info!("Prometheus metrics enabled on {}", addr),
            Err(e) => {
                error!("Failed to start metrics exporter: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Open the upstream pose source
    let pose_source = match source::open(&config.source, config.frame_interval).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open pose source {:?}: {}", config.source, e);
            std::process::exit(1);
        }
    };

    let server = match PostureServer::bind(config).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    // Setup signal handler
    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        signal.trigger();
    });

    match server.serve(pose_source, shutdown).await {
        Ok(report) => {
            info!(
                connections = report.connections.len(),
                lines_sent = report.lines_sent(),
                "Server shutdown complete"
            );
        }
        Err(e) => {
            error!("Server error: {}", e);
            std::process::exit(1);
        }
    }
}
