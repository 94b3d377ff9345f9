use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use traffic_monitor_server::{
    cli::{print_sample, Cli, Commands},
    config::ServerConfig,
    server,
    state::ServerState,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "traffic_monitor_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = ServerConfig::from_env()?;

    match cli.command {
        Some(Commands::Sample { count, seed }) => {
            let mut stdout = std::io::stdout().lock();
            print_sample(&mut stdout, config.generator_config(), count, seed)?;
            return Ok(());
        }
        Some(Commands::Serve) | None => {
            // Continue to run server
        }
    }

    info!("🚀 Starting Traffic Monitor Server v{}", VERSION);
    info!("📋 Configuration loaded:");
    info!("   Bind address: {}", config.bind_address());
    info!("   Tick interval: {:?}", config.tick_interval);
    info!("   Stats probability: {}", config.stats_probability);
    info!("   Send timeout: {:?}", config.send_timeout);
    info!("   Max connections: {}", config.max_connections);
    info!("   CORS origins: {:?}", config.cors_origins);

    let addr: SocketAddr = config.bind_address().parse()?;
    let state = Arc::new(ServerState::in_memory(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🎧 Listening on http://{}", addr);
    info!("📡 WebSocket endpoint: ws://{}/api/ws", addr);
    info!("🔑 Health endpoint: http://{}/health", addr);

    server::serve(listener, state, shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
