//! logger: a logging HTTP proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                  LOGGING PROXY                   │
//!                         │                                                  │
//!     Client Request      │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!     ────────────────────┼─▶│  http   │──▶│ request  │──▶│     net      │───┼──▶ Target
//!                         │  │ server  │   │ capture +│   │  transport   │   │
//!                         │  └─────────┘   │ director │   │  (pooled)    │   │
//!                         │                └────┬─────┘   └──────┬───────┘   │
//!     Client Response     │  ┌─────────┐        │                │           │
//!     ◀───────────────────┼──│response │◀───────┼────────────────┘           │
//!                         │  │ stream  │        │                            │
//!                         │  └────┬────┘        │                            │
//!                         │       ▼             ▼                            │
//!                         │  ┌────────────────────────┐                      │
//!                         │  │ observer → LogSink     │──▶ logger.log (JSON) │
//!                         │  │                        │──▶ stdout (console)  │
//!                         │  └────────────────────────┘                      │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use clap::Parser;

use traffic_logger::config::{self, Cli};
use traffic_logger::lifecycle::startup;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    let config = match config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = startup::run(config).await {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
