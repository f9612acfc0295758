//! Structured logging.
//!
//! # Responsibilities
//! - Build the process-wide log sink from configuration
//! - Fan every record out to a JSON file and to the console
//! - Let callers scope records to a specific sink (tests, embedding)
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON lines for the durable file, compact colored text for the console
//! - Each destination formats a record completely, then writes it with one
//!   `write_all` under its own lock; the two destinations never share a lock
//! - Log level configurable via config and `RUST_LOG`

use std::io;
use std::sync::Mutex;

use thiserror::Error;
use tracing::dispatcher::{self, Dispatch};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::observability::rotation::RotatingFile;

/// Console timestamp layout.
const CONSOLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file: {0}")]
    File(#[from] io::Error),

    #[error("invalid log level: {0}")]
    Level(#[from] tracing_subscriber::filter::ParseError),

    #[error("a global logger is already installed")]
    AlreadyInstalled(#[from] dispatcher::SetGlobalDefaultError),
}

/// Fan-out log sink: size-rotated JSON file plus human-readable console.
#[derive(Clone)]
pub struct LogSink {
    dispatch: Dispatch,
}

impl LogSink {
    /// Build the sink described by `config`, writing to the rotating file and stdout.
    pub fn init(config: &LoggingConfig) -> Result<Self, LoggingError> {
        let file = RotatingFile::open(&config.file, config.max_size_bytes(), config.max_backups)?;
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&config.level)?,
        };
        Ok(Self::from_parts(filter, true, Mutex::new(file), io::stdout))
    }

    /// Build a sink over arbitrary writers.
    pub fn with_writers<F, C>(level: &str, ansi: bool, file: F, console: C) -> Result<Self, LoggingError>
    where
        F: for<'w> MakeWriter<'w> + Send + Sync + 'static,
        C: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        Ok(Self::from_parts(EnvFilter::try_new(level)?, ansi, file, console))
    }

    fn from_parts<F, C>(filter: EnvFilter, ansi: bool, file: F, console: C) -> Self
    where
        F: for<'w> MakeWriter<'w> + Send + Sync + 'static,
        C: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let file_layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_timer(ChronoLocal::rfc_3339())
            .with_ansi(false)
            .with_writer(file);

        let console_layer = fmt::layer()
            .compact()
            .with_target(false)
            .with_timer(ChronoLocal::new(CONSOLE_TIME_FORMAT.to_string()))
            .with_ansi(ansi)
            .with_writer(console);

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer);

        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Make this sink the process-wide default as well.
    pub fn install_global(&self) -> Result<(), LoggingError> {
        dispatcher::set_global_default(self.dispatch.clone())?;
        Ok(())
    }

    /// Run `f` with every record it emits delivered to this sink.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink").finish_non_exhaustive()
    }
}
