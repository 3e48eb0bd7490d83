//! Command-line interface for nim_session.

use clap::{Parser, Subcommand};
use nim_session::WinRule;

/// Nim Session - play Nim against a remote engine
#[derive(Parser, Debug)]
#[command(name = "nim_session")]
#[command(about = "Play Nim against a remote authoritative engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "nim_session.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the reference Nim engine over HTTP
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Terminal rule: normal (last mover wins) or misere (last mover loses)
        #[arg(long)]
        win_rule: Option<WinRule>,
    },

    /// Play in the terminal against an engine
    Play {
        /// Engine URL (HTTP). Overrides the config file.
        #[arg(long)]
        server_url: Option<String>,

        /// Per-request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Play against an in-process engine instead of a server
        #[arg(long)]
        offline: bool,

        /// Terminal rule for the in-process engine
        #[arg(long, default_value = "normal")]
        win_rule: WinRule,
    },
}
