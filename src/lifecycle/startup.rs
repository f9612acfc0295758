//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize the log sink, then the target, listener and server
//! - Start the signal watcher
//! - Serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::{self, ListenerError, TransportError};
use crate::observability::{LogSink, LoggingError, LoggingObserver};
use crate::routing::TargetError;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start the proxy and serve until a shutdown signal arrives.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    let sink = LogSink::init(&config.logging)?;
    sink.install_global()?;
    let sink = Arc::new(sink);

    let target = config.target()?;
    tracing::info!("Proxying to {}", target);

    let observer = Arc::new(LoggingObserver::new(sink));
    let server = HttpServer::new(&config, target, observer)?;

    let listener = net::bind(&config.listener).await?;
    tracing::info!(
        "Listening on http://{}:{}",
        config.listener.display_host(),
        listener.local_addr()?.port()
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
