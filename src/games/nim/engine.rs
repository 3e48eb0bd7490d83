//! Reference Nim engine.
//!
//! This is the authority the session controller talks to through
//! [`crate::RemoteEngine`]. It owns the real piles, the move history
//! used for undo, and the optimal-move oracle.

use super::validator::{LegalMove, PileSetup, ValidationError};
use super::{GameState, Move, Player};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Engine shared between request handlers.
pub type SharedGame = Arc<Mutex<NimGame>>;

/// Terminal rule deciding who wins once every pile is empty.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WinRule {
    /// The player who takes the last object wins.
    #[default]
    Normal,
    /// The player who takes the last object loses.
    Misere,
}

/// Authoritative state of one Nim game.
#[derive(Debug, Clone, Default)]
pub struct NimGame {
    piles: Vec<u64>,
    player: Player,
    /// Pile snapshots taken before each accepted move.
    history: Vec<Vec<u64>>,
    initial_piles: Vec<u64>,
    rule: WinRule,
}

impl NimGame {
    /// Creates an engine with no game in progress.
    #[instrument]
    pub fn new(rule: WinRule) -> Self {
        info!(%rule, "Creating Nim engine");
        Self {
            rule,
            ..Self::default()
        }
    }

    /// Wraps the engine for sharing across tasks.
    pub fn shared(self) -> SharedGame {
        Arc::new(Mutex::new(self))
    }

    /// Win rule in force.
    pub fn rule(&self) -> WinRule {
        self.rule
    }

    /// Current pile sizes.
    pub fn piles(&self) -> &[u64] {
        &self.piles
    }

    /// Player to move.
    pub fn player(&self) -> Player {
        self.player
    }

    /// Piles the current game was started with.
    pub fn initial_piles(&self) -> &[u64] {
        &self.initial_piles
    }

    /// Starts a new game, discarding any game in progress.
    #[instrument(skip(self))]
    pub fn start(&mut self, piles: &[u64]) -> Result<(), ValidationError> {
        PileSetup::check(piles)?;
        self.initial_piles = piles.to_vec();
        self.piles = piles.to_vec();
        self.player = Player::One;
        self.history.clear();
        info!(piles = ?self.piles, "Game started");
        Ok(())
    }

    /// Applies a move and passes the turn.
    #[instrument(skip(self), fields(player = %self.player))]
    pub fn remove(&mut self, mov: Move) -> Result<(), ValidationError> {
        LegalMove::check(&mov, &self.piles).inspect_err(|e| {
            warn!(error = %e, "Rejected move");
        })?;
        self.history.push(self.piles.clone());
        self.piles[mov.pile_index] -= mov.count;
        self.player = self.player.opponent();
        debug!(piles = ?self.piles, next = %self.player, "Move applied");
        Ok(())
    }

    /// Reverts the last accepted move. Returns false when there is none.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.piles = previous;
                self.player = self.player.opponent();
                info!(piles = ?self.piles, player = %self.player, "Last move undone");
                true
            }
            None => {
                warn!("No moves to undo");
                false
            }
        }
    }

    /// Whether a started game has run out of objects.
    pub fn is_game_over(&self) -> bool {
        !self.piles.is_empty() && self.piles.iter().all(|&size| size == 0)
    }

    /// Winner of a finished game.
    pub fn winner(&self) -> Option<Player> {
        if !self.is_game_over() {
            return None;
        }
        // `player` already flipped to whoever would move next.
        match self.rule {
            WinRule::Normal => Some(self.player.opponent()),
            WinRule::Misere => Some(self.player),
        }
    }

    /// XOR of all pile sizes.
    pub fn nim_sum(&self) -> u64 {
        self.piles.iter().fold(0, |acc, &size| acc ^ size)
    }

    /// Best move for the player to move, or `None` once no object is left.
    ///
    /// From a losing position any legal move is as good as another, so
    /// one object is taken from the largest pile.
    #[instrument(skip(self), fields(rule = %self.rule))]
    pub fn optimal_move(&self) -> Option<Move> {
        if self.piles.iter().all(|&size| size == 0) {
            return None;
        }
        let mov = match self.rule {
            WinRule::Normal => self.normal_move(),
            WinRule::Misere => self.misere_move(),
        };
        debug!(?mov, nim_sum = self.nim_sum(), "Computed optimal move");
        Some(mov)
    }

    /// Snapshot in the form the session controller mirrors.
    pub fn state(&self) -> GameState {
        GameState::new(
            self.piles.clone(),
            self.player,
            self.is_game_over(),
            self.winner(),
        )
    }

    fn normal_move(&self) -> Move {
        let nim_sum = self.nim_sum();
        if nim_sum != 0 {
            for (index, &size) in self.piles.iter().enumerate() {
                let target = size ^ nim_sum;
                if target < size {
                    return Move::new(index, size - target);
                }
            }
        }
        self.fallback_move()
    }

    fn misere_move(&self) -> Move {
        let large: Vec<usize> = self
            .piles
            .iter()
            .enumerate()
            .filter(|&(_, &size)| size > 1)
            .map(|(index, _)| index)
            .collect();
        let singles = self.piles.iter().filter(|&&size| size == 1).count();

        match large.as_slice() {
            // Only singletons left: taking one is the only kind of move.
            [] => self.fallback_move(),
            // Cut the last large pile to leave an odd number of singletons.
            [index] => {
                let size = self.piles[*index];
                if singles % 2 == 1 {
                    Move::new(*index, size)
                } else {
                    Move::new(*index, size - 1)
                }
            }
            _ => self.normal_move(),
        }
    }

    fn fallback_move(&self) -> Move {
        let mut largest = 0;
        for (index, &size) in self.piles.iter().enumerate() {
            if size > self.piles[largest] {
                largest = index;
            }
        }
        Move::new(largest, 1)
    }
}
