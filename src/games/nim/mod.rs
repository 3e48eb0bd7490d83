//! Nim: piles, moves, validation and a reference engine.

mod engine;
mod types;
mod validator;

pub use engine::{NimGame, SharedGame, WinRule};
pub use types::{GameState, Move, Player};
pub use validator::{
    EnoughObjects, LegalMove, MIN_PILES, PileExists, PileSetup, PositiveCount, ValidationError,
    validate,
};
