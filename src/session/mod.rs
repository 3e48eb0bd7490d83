//! Client-side session: mirrored state, confirmation and lifecycle.

mod controller;
mod gate;
mod store;

pub use controller::{Notice, NoticeLevel, Phase, SessionController, SessionView};
pub use gate::{ConfirmationGate, Prompter};
pub use store::{StateStore, Ticket};
