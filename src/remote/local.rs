//! In-process engine, for offline play and tests.

use super::api::{RemoteEngine, WireGameState, WireInitialPiles, WireMove};
use crate::error::NetworkError;
use crate::games::nim::{Move, NimGame, SharedGame, WinRule};
use async_trait::async_trait;
use std::sync::MutexGuard;
use tracing::{instrument, warn};

/// [`RemoteEngine`] backed by a [`NimGame`] in the same process.
///
/// Answers exactly like the HTTP server does, so a session behaves the
/// same against either.
#[derive(Debug, Clone)]
pub struct LocalEngine {
    game: SharedGame,
}

impl LocalEngine {
    /// Creates an engine with no game started.
    pub fn new(rule: WinRule) -> Self {
        Self::with_game(NimGame::new(rule).shared())
    }

    /// Wraps an existing shared engine.
    pub fn with_game(game: SharedGame) -> Self {
        Self { game }
    }

    /// The shared engine.
    pub fn game(&self) -> &SharedGame {
        &self.game
    }

    fn lock(&self) -> Result<MutexGuard<'_, NimGame>, NetworkError> {
        self.game
            .lock()
            .map_err(|_| NetworkError::new("engine state lock poisoned"))
    }
}

#[async_trait]
impl RemoteEngine for LocalEngine {
    #[instrument(skip(self))]
    async fn start(&self, piles: &[u64]) -> Result<bool, NetworkError> {
        Ok(self
            .lock()?
            .start(piles)
            .inspect_err(|e| warn!(error = %e, "Engine refused to start"))
            .is_ok())
    }

    async fn game_state(&self) -> Result<WireGameState, NetworkError> {
        Ok(WireGameState::from(&self.lock()?.state()))
    }

    #[instrument(skip(self))]
    async fn remove(
        &self,
        pile_index: usize,
        number_to_remove: u64,
    ) -> Result<bool, NetworkError> {
        Ok(self
            .lock()?
            .remove(Move::new(pile_index, number_to_remove))
            .is_ok())
    }

    async fn find_optimal_move(&self) -> Result<Option<WireMove>, NetworkError> {
        Ok(self
            .lock()?
            .optimal_move()
            .map(|mov| (mov.pile_index, mov.count)))
    }

    async fn undo_move(&self) -> Result<bool, NetworkError> {
        Ok(self.lock()?.undo())
    }

    async fn initial_piles(&self) -> Result<WireInitialPiles, NetworkError> {
        Ok(WireInitialPiles {
            initial_piles: self.lock()?.initial_piles().to_vec(),
        })
    }
}
