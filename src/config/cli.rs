//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

/// logger is a simple http proxy server that logs all requests
#[derive(Debug, Parser)]
#[command(name = "logger", version, about, long_about = None)]
pub struct Cli {
    /// Target URL to proxy to (e.g. http://localhost:3000/api)
    #[arg(value_name = "TARGET_URL")]
    pub target: String,

    /// Port to run the logging server on [default: 9090]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Listen on all interfaces
    #[arg(short, long)]
    pub listen: bool,

    /// Optional TOML file with listener, transport and logging settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
