//! Nim session library - client-side controller for remote Nim games
//!
//! Two players take turns against an authoritative engine reached over
//! HTTP, or let the engine pick an optimal move for them.
//!
//! # Architecture
//!
//! - **Games**: Nim types, move validation and a reference engine
//! - **Remote**: engine wire contract, HTTP and in-process engines, sync client
//! - **Session**: state store, confirmation gate, lifecycle controller
//! - **Server**: HTTP surface for the reference engine
//!
//! # Example
//!
//! ```no_run
//! use nim_session::{HttpEngine, Move, Prompter, SessionController};
//!
//! struct AlwaysYes;
//!
//! #[async_trait::async_trait]
//! impl Prompter for AlwaysYes {
//!     async fn ask(&self, _message: &str) -> bool {
//!         true
//!     }
//!     async fn acknowledge(&self, _message: &str) {}
//! }
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = HttpEngine::new("http://127.0.0.1:8000", None)?;
//! let session = SessionController::new(engine, AlwaysYes);
//! session.start(vec![3, 5]).await?;
//! session.submit_move(Move::new(1, 5)).await?;
//! session.computer_move().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod error;
mod games;
mod remote;
mod server;
mod session;

pub mod console;

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError, EngineConfig, NimConfig};

// Crate-level exports - Errors
pub use error::{NetworkError, SessionError};

// Crate-level exports - Game types (Nim)
pub use games::nim::{
    EnoughObjects, GameState, LegalMove, MIN_PILES, Move, NimGame, PileExists, PileSetup, Player,
    PositiveCount, SharedGame, ValidationError, WinRule, validate,
};

// Crate-level exports - Remote engine access
pub use remote::{
    HttpEngine, LocalEngine, NO_WINNER, RemoteEngine, RemoveParams, SyncClient, WireGameState,
    WireInitialPiles, WireMove,
};

// Crate-level exports - Engine server
pub use server::{router, serve};

// Crate-level exports - Session management
pub use session::{
    ConfirmationGate, Notice, NoticeLevel, Phase, Prompter, SessionController, SessionView,
    StateStore, Ticket,
};
