//! Sync client: remote operations translated into store commits.
//!
//! Each operation sends exactly one mutating (or query) request. A
//! negative answer becomes [`SessionError::RemoteRejection`], a transport
//! failure [`SessionError::Network`]; in both cases the store is left
//! alone. A positive answer is followed by a state fetch that is
//! committed under the ticket drawn when the operation was issued.

use super::api::RemoteEngine;
use crate::error::{NetworkError, SessionError};
use crate::games::nim::{GameState, Move, validate};
use crate::session::{StateStore, Ticket};
use tracing::{debug, error, info, instrument, warn};

/// Remote operations bound to a [`StateStore`].
#[derive(Debug)]
pub struct SyncClient<E> {
    engine: E,
    store: StateStore,
}

impl<E: RemoteEngine> SyncClient<E> {
    /// Creates a client with an empty store.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            store: StateStore::new(),
        }
    }

    /// The mirrored state.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// The underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Starts a game with `piles` and commits the engine's fresh state.
    #[instrument(skip(self))]
    pub async fn start(&self, piles: &[u64]) -> Result<GameState, SessionError> {
        let ticket = self.store.issue();
        let accepted = self.engine.start(piles).await.map_err(network("start"))?;
        if !accepted {
            warn!("Engine refused to start game");
            return Err(SessionError::RemoteRejection(format!(
                "engine refused to start a game with piles {:?}",
                piles
            )));
        }
        info!("Engine started game");
        self.refresh_under(ticket).await
    }

    /// Fetches and commits the engine's current state.
    #[instrument(skip(self))]
    pub async fn fetch_state(&self) -> Result<GameState, SessionError> {
        let ticket = self.store.issue();
        self.refresh_under(ticket).await
    }

    /// Validates `mov` against the mirror, then submits it.
    #[instrument(skip(self, mov), fields(mov = %mov))]
    pub async fn submit_move(&self, mov: Move) -> Result<GameState, SessionError> {
        validate(&mov, self.store.read().piles()).inspect_err(|e| {
            debug!(error = %e, "Move failed local validation");
        })?;

        let ticket = self.store.issue();
        let accepted = self
            .engine
            .remove(mov.pile_index, mov.count)
            .await
            .map_err(network("remove"))?;
        if !accepted {
            warn!("Engine rejected move");
            return Err(SessionError::RemoteRejection(format!(
                "invalid move: {}",
                mov
            )));
        }
        info!("Engine accepted move");
        self.refresh_under(ticket).await
    }

    /// Asks the engine for its best move. `None` means no legal move
    /// exists. Nothing is committed.
    #[instrument(skip(self))]
    pub async fn request_optimal_move(&self) -> Result<Option<Move>, SessionError> {
        let answer = self
            .engine
            .find_optimal_move()
            .await
            .map_err(network("find_optimal_move"))?;
        let mov = answer.map(|(pile_index, count)| Move::new(pile_index, count));
        debug!(?mov, "Engine suggested move");
        Ok(mov)
    }

    /// Reverts the engine's last accepted move.
    #[instrument(skip(self))]
    pub async fn undo(&self) -> Result<GameState, SessionError> {
        let ticket = self.store.issue();
        let undone = self.engine.undo_move().await.map_err(network("undo_move"))?;
        if !undone {
            warn!("Engine had nothing to undo");
            return Err(SessionError::RemoteRejection("no moves to undo".to_string()));
        }
        info!("Engine undid last move");
        self.refresh_under(ticket).await
    }

    /// Fetches the piles the current game started with.
    #[instrument(skip(self))]
    pub async fn fetch_initial_piles(&self) -> Result<Vec<u64>, SessionError> {
        let wire = self
            .engine
            .initial_piles()
            .await
            .map_err(network("get_initial_piles_for_restart"))?;
        if wire.initial_piles.is_empty() {
            warn!("Engine has no initial piles");
            return Err(SessionError::RemoteRejection(
                "engine has no game to restart".to_string(),
            ));
        }
        Ok(wire.initial_piles)
    }

    /// Fetches the state and commits it under `ticket`.
    ///
    /// A self-contradicting state is fetched once more before giving up
    /// with [`SessionError::StateDesync`].
    async fn refresh_under(&self, ticket: Ticket) -> Result<GameState, SessionError> {
        let mut state = self.fetch_checked().await?;
        if let Err(issue) = &state {
            warn!(issue = %issue, "Fetched inconsistent state, fetching again");
            state = self.fetch_checked().await?;
        }
        let state = state.map_err(|issue| {
            error!(issue = %issue, "Engine state still inconsistent");
            SessionError::StateDesync(issue)
        })?;

        if self.store.commit(ticket, state.clone()) {
            Ok(state)
        } else {
            Err(SessionError::Superseded)
        }
    }

    /// One state fetch; the inner result carries a consistency problem.
    async fn fetch_checked(&self) -> Result<Result<GameState, String>, SessionError> {
        let wire = self
            .engine
            .game_state()
            .await
            .map_err(network("get_game_state"))?;
        debug!(?wire, "Fetched engine state");
        Ok(GameState::try_from(wire).and_then(|state| match state.inconsistency() {
            Some(issue) => Err(issue),
            None => Ok(state),
        }))
    }
}

/// Logs a transport failure for `operation` and lifts it.
fn network(operation: &'static str) -> impl Fn(NetworkError) -> SessionError {
    move |e| {
        error!(operation, error = %e, "Engine request failed");
        SessionError::Network(e)
    }
}
