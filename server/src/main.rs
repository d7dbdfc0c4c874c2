//! Gatherly Server - Main entry point.
//!
//! This binary starts the Gatherly event-planning API with:
//! - Structured JSON logging for production
//! - Graceful shutdown handling (SIGTERM/SIGINT)
//! - MongoDB persistence, or an in-memory store when no URI is configured
//!
//! # Configuration
//!
//! See [`gatherly_server::config`] for environment variable configuration.
//!
//! # Example
//!
//! ```bash
//! # Development mode (in-memory store)
//! GATHERLY_JWT_SECRET=dev-secret cargo run --bin gatherly-server
//!
//! # Production mode
//! GATHERLY_JWT_SECRET="..." \
//! GATHERLY_MONGODB_URI="mongodb://localhost:27017" \
//! PORT=8080 \
//! cargo run --release --bin gatherly-server
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use gatherly_server::config::Config;
use gatherly_server::routes::{create_router, AppState};
use gatherly_server::store::memory::MemoryStore;
use gatherly_server::store::mongo::MongoStore;
use gatherly_server::store::{EventStore, UserStore};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured logging
    init_logging();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load configuration");
            eprintln!("Error: {err}");
            eprintln!();
            eprintln!("Required environment variables:");
            eprintln!("  GATHERLY_JWT_SECRET  - Secret used to sign bearer tokens");
            eprintln!();
            eprintln!("Optional environment variables:");
            eprintln!("  GATHERLY_MONGODB_URI - MongoDB connection string (in-memory store if unset)");
            eprintln!("  GATHERLY_DATABASE    - MongoDB database name (default: gatherly)");
            eprintln!("  PORT                 - HTTP server port (default: 8080)");
            eprintln!("  RUST_LOG             - Log level filter (default: info)");
            return ExitCode::from(1);
        }
    };

    // Connect the store
    let (users, events): (Arc<dyn UserStore>, Arc<dyn EventStore>) = match &config.mongodb_uri {
        Some(uri) => match MongoStore::connect(uri, &config.database).await {
            Ok(store) => {
                let store = Arc::new(store);
                (store.clone(), store)
            }
            Err(err) => {
                error!(error = %err, "Failed to connect to MongoDB");
                return ExitCode::from(1);
            }
        },
        None => {
            warn!(
                "GATHERLY_MONGODB_URI not set - using the in-memory store. \
                 Data will not survive a restart. Do not use in production!"
            );
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        }
    };

    info!(
        port = config.port,
        persistent = config.mongodb_uri.is_some(),
        "Gatherly server starting"
    );

    // Create application state and router
    let state = AppState::new(config.clone(), users, events);
    let app = create_router(state);

    // Bind to address
    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => {
            info!(address = %bind_addr, "Server listening");
            listener
        }
        Err(err) => {
            error!(error = %err, address = %bind_addr, "Failed to bind to address");
            return ExitCode::from(1);
        }
    };

    // Start server with graceful shutdown
    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    info!("Server ready to accept connections");

    if let Err(err) = server.await {
        error!(error = %err, "Server error");
        return ExitCode::from(1);
    }

    info!("Server shutdown complete");
    ExitCode::SUCCESS
}

/// Initialize structured logging with tracing.
///
/// Configures JSON-formatted output for production use with environment
/// based log level filtering via RUST_LOG (default `info`).
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Default: info level for our crates, warn for dependencies
        EnvFilter::new("info,tower_http=debug,axum::rejection=trace")
    });

    let json_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .init();
}

/// Creates a future that resolves when a shutdown signal is received.
///
/// Listens for:
/// - SIGTERM (container orchestrator shutdown)
/// - SIGINT (Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
