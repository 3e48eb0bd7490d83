//! Core domain types for Nim.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the two players.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(try_from = "i64", into = "i64")]
pub enum Player {
    /// Player 1 (always moves first).
    #[default]
    #[display("1")]
    One,
    /// Player 2.
    #[display("2")]
    Two,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Returns the player number used on the wire.
    pub fn number(self) -> i64 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl TryFrom<i64> for Player {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            other => Err(format!("{} is not a player number", other)),
        }
    }
}

impl From<Player> for i64 {
    fn from(player: Player) -> Self {
        player.number()
    }
}

/// Removal of `count` objects from the pile at `pile_index`.
///
/// A transient value: validated against the local mirror, sent to the
/// engine, then dropped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_new::new,
)]
#[display("remove {} from pile {}", count, pile_index + 1)]
pub struct Move {
    /// 0-based pile position.
    pub pile_index: usize,
    /// Objects to remove.
    pub count: u64,
}

/// Snapshot of a game as last confirmed by the engine.
///
/// Replaced wholesale after each round trip, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameState {
    piles: Vec<u64>,
    current_player: Player,
    is_game_over: bool,
    winner: Option<Player>,
}

impl GameState {
    /// Creates a snapshot. `winner` is dropped unless the game is over.
    #[instrument]
    pub fn new(
        piles: Vec<u64>,
        current_player: Player,
        is_game_over: bool,
        winner: Option<Player>,
    ) -> Self {
        Self {
            piles,
            current_player,
            is_game_over,
            winner: winner.filter(|_| is_game_over),
        }
    }

    /// Pile sizes, by position.
    pub fn piles(&self) -> &[u64] {
        &self.piles
    }

    /// Player to move next.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Whether the engine considers the game finished.
    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    /// Winner, only ever set once the game is over.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Total objects left on the table, saturating at `u64::MAX`.
    pub fn remaining(&self) -> u64 {
        self.piles
            .iter()
            .fold(0u64, |total, &size| total.saturating_add(size))
    }

    /// Whether any pile still holds an object.
    pub fn has_objects(&self) -> bool {
        self.piles.iter().any(|&size| size > 0)
    }

    /// Describes the first self-contradiction in this snapshot, if any.
    ///
    /// A running game needs objects on the table, so an empty pile list
    /// counts as a contradiction unless the game is over.
    pub fn inconsistency(&self) -> Option<String> {
        if !self.is_game_over && !self.has_objects() {
            Some("all piles are empty but the game is not over".to_string())
        } else if self.is_game_over && self.has_objects() {
            Some(format!(
                "game reported over with {} objects left",
                self.remaining()
            ))
        } else if self.is_game_over && self.winner.is_none() {
            Some("game reported over without a winner".to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pile_list_while_running_is_inconsistent() {
        let state = GameState::new(vec![], Player::One, false, None);
        assert!(state.inconsistency().is_some());
    }

    #[test]
    fn test_huge_piles_do_not_overflow() {
        let state = GameState::new(vec![u64::MAX, 1], Player::Two, false, None);
        assert_eq!(state.remaining(), u64::MAX);
        assert!(state.has_objects());
        assert_eq!(state.inconsistency(), None);

        let over = GameState::new(vec![u64::MAX, 1], Player::Two, true, Some(Player::One));
        assert!(over.inconsistency().is_some());
    }

    #[test]
    fn test_finished_game_is_consistent() {
        let state = GameState::new(vec![0, 0], Player::One, true, Some(Player::Two));
        assert_eq!(state.inconsistency(), None);
    }

    #[test]
    fn test_move_display_is_one_based() {
        assert_eq!(Move::new(0, 3).to_string(), "remove 3 from pile 1");
    }
}
