//! Access to the authoritative engine.

mod api;
mod http;
mod local;
mod sync;

pub use api::{
    NO_WINNER, RemoteEngine, RemoveParams, WireGameState, WireInitialPiles, WireMove,
};
pub use http::HttpEngine;
pub use local::LocalEngine;
pub use sync::SyncClient;
