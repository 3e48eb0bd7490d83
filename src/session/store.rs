//! Local mirror of the engine's game state.
//!
//! Every request that may end in a commit first draws a [`Ticket`]. A
//! commit only lands if its ticket is still the most recently issued
//! one, so a slow response can never overwrite the effect of a request
//! issued after it.

use crate::games::nim::GameState;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

/// Sequence number of an issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Raw sequence number.
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Holder of the mirrored [`GameState`].
#[derive(Debug)]
pub struct StateStore {
    state: watch::Sender<GameState>,
    issued: AtomicU64,
}

impl StateStore {
    /// Creates a store holding the empty pre-game state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(GameState::default());
        Self {
            state,
            issued: AtomicU64::new(0),
        }
    }

    /// Returns the current snapshot.
    pub fn read(&self) -> GameState {
        self.state.borrow().clone()
    }

    /// Receiver woken on every applied commit.
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.state.subscribe()
    }

    /// Draws the next ticket, invalidating all earlier ones.
    pub fn issue(&self) -> Ticket {
        let ticket = Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1);
        debug!(sequence = ticket.0, "Issued request ticket");
        ticket
    }

    /// Whether `ticket` is still the latest issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Swaps in `next` if `ticket` is still current. Returns whether it
    /// was applied.
    #[instrument(skip(self, next), fields(sequence = ticket.0))]
    pub fn commit(&self, ticket: Ticket, next: GameState) -> bool {
        let applied = self.state.send_if_modified(|current| {
            if self.issued.load(Ordering::SeqCst) != ticket.0 {
                return false;
            }
            *current = next;
            true
        });
        if applied {
            debug!("Committed engine state");
        } else {
            warn!(
                latest = self.issued.load(Ordering::SeqCst),
                "Discarded stale response"
            );
        }
        applied
    }

    /// Unconditionally replaces the mirror. Any response still in flight
    /// becomes stale.
    #[instrument(skip(self, next))]
    pub fn replace(&self, next: GameState) {
        let ticket = self.issue();
        self.commit(ticket, next);
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::nim::Player;

    fn state(piles: &[u64]) -> GameState {
        GameState::new(piles.to_vec(), Player::One, false, None)
    }

    #[test]
    fn test_latest_ticket_commits() {
        let store = StateStore::new();
        let ticket = store.issue();
        assert!(store.commit(ticket, state(&[3, 5])));
        assert_eq!(store.read().piles(), &[3, 5]);
    }

    #[test]
    fn test_older_ticket_is_discarded() {
        let store = StateStore::new();
        let slow = store.issue();
        let fast = store.issue();
        assert!(store.commit(fast, state(&[1, 1])));
        assert!(!store.commit(slow, state(&[9, 9])));
        assert_eq!(store.read().piles(), &[1, 1]);
    }

    #[test]
    fn test_replace_invalidates_in_flight() {
        let store = StateStore::new();
        let in_flight = store.issue();
        store.replace(GameState::default());
        assert!(!store.is_current(in_flight));
        assert!(!store.commit(in_flight, state(&[2, 2])));
        assert!(store.read().piles().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_commits() {
        let store = StateStore::new();
        let mut rx = store.subscribe();
        let ticket = store.issue();
        store.commit(ticket, state(&[4, 4]));
        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow().piles(), &[4, 4]);
    }
}
