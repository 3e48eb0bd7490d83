//! Nim Session - Unified CLI
//!
//! Serves the reference engine or plays a session in the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use nim_session::{ClientConfig, EngineConfig, HttpEngine, LocalEngine, NimConfig, WinRule};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let (client, engine) = NimConfig::load_or_default(&cli.config)?.into_parts();

    match cli.command {
        Command::Serve {
            port,
            host,
            win_rule,
        } => {
            let mut engine = engine;
            if let Some(port) = port {
                engine = engine.with_port(port);
            }
            if let Some(host) = host {
                engine = engine.with_host(host);
            }
            if let Some(win_rule) = win_rule {
                engine = engine.with_win_rule(win_rule);
            }
            run_server(engine).await
        }
        Command::Play {
            server_url,
            timeout_ms,
            offline,
            win_rule,
        } => {
            let mut client = client;
            if let Some(server_url) = server_url {
                client = client.with_server_url(server_url);
            }
            if timeout_ms.is_some() {
                client = client.with_request_timeout_ms(timeout_ms);
            }
            run_play(client, offline, win_rule).await
        }
    }
}

/// Run the reference engine over HTTP
async fn run_server(config: EngineConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nim_session=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Nim engine server");
    nim_session::serve(&config).await
}

/// Play a session in the terminal
#[instrument(skip(config), fields(server_url = %config.server_url()))]
async fn run_play(config: ClientConfig, offline: bool, win_rule: WinRule) -> Result<()> {
    // Log to file so traces don't interleave with the board
    let log_file = std::fs::File::create("nim_session.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    let default_piles = config.default_piles().clone();
    if offline {
        info!(%win_rule, "Playing against in-process engine");
        nim_session::console::run_console(LocalEngine::new(win_rule), default_piles).await
    } else {
        info!("Playing against remote engine");
        let engine = HttpEngine::from_config(&config)?;
        nim_session::console::run_console(engine, default_piles).await
    }
}
