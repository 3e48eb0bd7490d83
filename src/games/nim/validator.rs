//! Pre-flight validation of moves and pile setups.
//!
//! Checks run against the local mirror only. They are advisory: the
//! engine re-validates everything it receives, but a move that fails
//! here is never sent.

use super::Move;
use derive_more::Display;
use tracing::{instrument, warn};

/// Fewest piles a game may start with.
pub const MIN_PILES: usize = 2;

/// Client-side rejection of a move or pile setup.
#[derive(Debug, Clone, PartialEq, Eq, Display, derive_more::Error)]
pub enum ValidationError {
    /// The pile index does not address an existing pile.
    #[display("Pile {} does not exist (there are {} piles)", index + 1, len)]
    InvalidIndex {
        /// Requested 0-based index.
        index: usize,
        /// Number of piles.
        len: usize,
    },

    /// Zero objects requested.
    #[display("Please enter a positive number of objects to remove")]
    NonPositiveCount,

    /// More objects requested than the pile holds.
    #[display(
        "Not enough objects in pile {}: requested {}, available {}",
        index + 1,
        requested,
        available
    )]
    InsufficientPileSize {
        /// Requested 0-based index.
        index: usize,
        /// Objects requested.
        requested: u64,
        /// Objects in the pile.
        available: u64,
    },

    /// Setup with fewer than [`MIN_PILES`] piles.
    #[display("A Nim game must start with at least {} piles (got {})", MIN_PILES, _0)]
    TooFewPiles(#[error(not(source))] usize),

    /// Setup with an empty pile.
    #[display("Please enter a positive integer for Pile {} size", index + 1)]
    NonPositivePile {
        /// 0-based index of the offending pile.
        index: usize,
    },
}

/// Rule: the index must address an existing pile.
pub struct PileExists;

impl PileExists {
    /// Checks the rule.
    pub fn check(mov: &Move, piles: &[u64]) -> Result<(), ValidationError> {
        if mov.pile_index >= piles.len() {
            Err(ValidationError::InvalidIndex {
                index: mov.pile_index,
                len: piles.len(),
            })
        } else {
            Ok(())
        }
    }
}

/// Rule: at least one object must be removed.
pub struct PositiveCount;

impl PositiveCount {
    /// Checks the rule.
    pub fn check(mov: &Move) -> Result<(), ValidationError> {
        if mov.count == 0 {
            Err(ValidationError::NonPositiveCount)
        } else {
            Ok(())
        }
    }
}

/// Rule: the pile must hold at least `count` objects.
///
/// Assumes [`PileExists`] already passed.
pub struct EnoughObjects;

impl EnoughObjects {
    /// Checks the rule.
    pub fn check(mov: &Move, piles: &[u64]) -> Result<(), ValidationError> {
        let available = piles.get(mov.pile_index).copied().unwrap_or(0);
        if mov.count > available {
            Err(ValidationError::InsufficientPileSize {
                index: mov.pile_index,
                requested: mov.count,
                available,
            })
        } else {
            Ok(())
        }
    }
}

/// Composite rule: index, then count, then pile size.
pub struct LegalMove;

impl LegalMove {
    /// Validates all rules for a move, stopping at the first failure.
    #[instrument(skip(piles), fields(pile_count = piles.len()))]
    pub fn check(mov: &Move, piles: &[u64]) -> Result<(), ValidationError> {
        PileExists::check(mov, piles)?;
        PositiveCount::check(mov)?;
        EnoughObjects::check(mov, piles)?;
        Ok(())
    }
}

/// Rule set for the piles a game starts with.
pub struct PileSetup;

impl PileSetup {
    /// Requires at least [`MIN_PILES`] piles, each non-empty.
    #[instrument]
    pub fn check(piles: &[u64]) -> Result<(), ValidationError> {
        if piles.len() < MIN_PILES {
            warn!(count = piles.len(), "Too few piles");
            return Err(ValidationError::TooFewPiles(piles.len()));
        }
        if let Some(index) = piles.iter().position(|&size| size == 0) {
            warn!(index, "Empty pile in setup");
            return Err(ValidationError::NonPositivePile { index });
        }
        Ok(())
    }
}

/// Validates `mov` against `piles`.
pub fn validate(mov: &Move, piles: &[u64]) -> Result<(), ValidationError> {
    LegalMove::check(mov, piles)
}
