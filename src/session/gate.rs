//! Single-flight yes/no prompt guarding destructive actions.
//!
//! Only one prompt may be open at a time. A second request while one is
//! pending is rejected with [`SessionError::GateBusy`] and the user is
//! not asked again.

use crate::error::SessionError;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Whatever actually puts a question in front of the user.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Asks a yes/no question. Dismissal counts as no.
    async fn ask(&self, message: &str) -> bool;

    /// Shows a message that only needs acknowledging.
    async fn acknowledge(&self, message: &str);
}

/// Gate around a [`Prompter`] allowing one outstanding prompt.
#[derive(Debug)]
pub struct ConfirmationGate<P> {
    prompter: P,
    pending: Mutex<Option<String>>,
}

/// Clears the pending slot when the prompt ends or is dropped.
struct PendingGuard<'a> {
    slot: &'a Mutex<Option<String>>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        *lock_slot(self.slot) = None;
    }
}

/// Locks the pending slot. A poisoned lock still holds a valid `Option`.
fn lock_slot(slot: &Mutex<Option<String>>) -> MutexGuard<'_, Option<String>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<P: Prompter> ConfirmationGate<P> {
    /// Creates a gate with no pending prompt.
    pub fn new(prompter: P) -> Self {
        Self {
            prompter,
            pending: Mutex::new(None),
        }
    }

    /// The underlying prompter.
    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Message of the prompt currently open, if any.
    pub fn pending(&self) -> Option<String> {
        lock_slot(&self.pending).clone()
    }

    /// Asks the user to confirm. Resolves `true` only on affirmation.
    #[instrument(skip(self))]
    pub async fn confirm(&self, message: &str) -> Result<bool, SessionError> {
        let _guard = self.enter(message)?;
        let affirmed = self.prompter.ask(message).await;
        info!(affirmed, "Confirmation resolved");
        Ok(affirmed)
    }

    /// Shows an informational message and waits for acknowledgement.
    #[instrument(skip(self))]
    pub async fn notify(&self, message: &str) -> Result<(), SessionError> {
        let _guard = self.enter(message)?;
        self.prompter.acknowledge(message).await;
        debug!("Notification acknowledged");
        Ok(())
    }

    fn enter(&self, message: &str) -> Result<PendingGuard<'_>, SessionError> {
        let mut pending = lock_slot(&self.pending);
        if let Some(open) = pending.as_deref() {
            warn!(open, "Rejecting prompt while another is pending");
            return Err(SessionError::GateBusy);
        }
        *pending = Some(message.to_string());
        Ok(PendingGuard {
            slot: &self.pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Agree;

    #[async_trait]
    impl Prompter for Agree {
        async fn ask(&self, _message: &str) -> bool {
            true
        }
        async fn acknowledge(&self, _message: &str) {}
    }

    #[tokio::test]
    async fn test_poisoned_slot_still_prompts() {
        let gate = ConfirmationGate::new(Agree);
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _held = gate.pending.lock().unwrap();
                    panic!("poison the pending slot");
                })
                .join()
        });
        assert!(gate.pending.is_poisoned());

        assert_eq!(gate.pending(), None);
        assert!(gate.confirm("Quit?").await.unwrap());
        assert_eq!(gate.pending(), None);
    }
}
