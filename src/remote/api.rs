//! Wire contract of the remote engine.

use crate::error::NetworkError;
use crate::games::nim::{GameState, Player};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `GET /get_game_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGameState {
    /// Pile sizes.
    pub piles: Vec<u64>,
    /// Player to move (1 or 2).
    pub player: i64,
    /// Whether the game has finished.
    pub is_game_over: bool,
    /// Winning player, or -1 while the game is running.
    pub winner: i64,
}

/// Body of `GET /get_initial_piles_for_restart`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireInitialPiles {
    /// Piles the current game started with.
    pub initial_piles: Vec<u64>,
}

/// `[pile_index, count]` as returned by `GET /find_optimal_move`.
pub type WireMove = (usize, u64);

/// Query of `POST /remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveParams {
    /// 0-based pile.
    pub pile_index: i64,
    /// Objects to take.
    pub number_to_remove: i64,
}

/// Marker the engine uses for "no winner yet".
pub const NO_WINNER: i64 = -1;

impl From<&GameState> for WireGameState {
    fn from(state: &GameState) -> Self {
        Self {
            piles: state.piles().to_vec(),
            player: state.current_player().number(),
            is_game_over: state.is_game_over(),
            winner: state.winner().map_or(NO_WINNER, Player::number),
        }
    }
}

impl TryFrom<WireGameState> for GameState {
    type Error = String;

    fn try_from(wire: WireGameState) -> Result<Self, Self::Error> {
        let player = Player::try_from(wire.player)?;
        let winner = match wire.winner {
            NO_WINNER | 0 => None,
            number => Some(Player::try_from(number)?),
        };
        if winner.is_some() && !wire.is_game_over {
            return Err(format!(
                "winner {} reported while the game is running",
                wire.winner
            ));
        }
        Ok(GameState::new(wire.piles, player, wire.is_game_over, winner))
    }
}

/// One method per engine endpoint.
///
/// Implementations report transport trouble as [`NetworkError`] and
/// return the application-level answer untouched; interpreting `false`
/// or `None` is the caller's job.
#[async_trait]
pub trait RemoteEngine: Send + Sync {
    /// `POST /start`.
    async fn start(&self, piles: &[u64]) -> Result<bool, NetworkError>;

    /// `GET /get_game_state`.
    async fn game_state(&self) -> Result<WireGameState, NetworkError>;

    /// `POST /remove`.
    async fn remove(&self, pile_index: usize, number_to_remove: u64)
    -> Result<bool, NetworkError>;

    /// `GET /find_optimal_move`.
    async fn find_optimal_move(&self) -> Result<Option<WireMove>, NetworkError>;

    /// `POST /undo_move`.
    async fn undo_move(&self) -> Result<bool, NetworkError>;

    /// `GET /get_initial_piles_for_restart`.
    async fn initial_piles(&self) -> Result<WireInitialPiles, NetworkError>;
}

#[async_trait]
impl<T: RemoteEngine + ?Sized> RemoteEngine for Arc<T> {
    async fn start(&self, piles: &[u64]) -> Result<bool, NetworkError> {
        (**self).start(piles).await
    }

    async fn game_state(&self) -> Result<WireGameState, NetworkError> {
        (**self).game_state().await
    }

    async fn remove(
        &self,
        pile_index: usize,
        number_to_remove: u64,
    ) -> Result<bool, NetworkError> {
        (**self).remove(pile_index, number_to_remove).await
    }

    async fn find_optimal_move(&self) -> Result<Option<WireMove>, NetworkError> {
        (**self).find_optimal_move().await
    }

    async fn undo_move(&self) -> Result<bool, NetworkError> {
        (**self).undo_move().await
    }

    async fn initial_piles(&self) -> Result<WireInitialPiles, NetworkError> {
        (**self).initial_piles().await
    }
}
