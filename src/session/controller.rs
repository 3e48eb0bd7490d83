//! Session lifecycle: Setup → Active → GameOver, plus Quit.
//!
//! The controller arbitrates user actions. Mutating actions take the
//! single in-flight slot for their whole duration; a second mutating
//! action issued before the first resolves fails with
//! [`SessionError::Busy`] without reaching the engine. Destructive
//! actions go through the [`ConfirmationGate`] before anything is sent.

use super::gate::{ConfirmationGate, Prompter};
use crate::error::SessionError;
use crate::games::nim::{GameState, Move, PileSetup, Player};
use crate::remote::{RemoteEngine, SyncClient};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::{Semaphore, watch};
use tracing::{debug, error, info, instrument, warn};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display)]
pub enum Phase {
    /// No game; piles are being chosen.
    #[default]
    Setup,
    /// Game in progress.
    Active,
    /// Game finished; only a new game or restart makes sense.
    GameOver,
    /// User quit; nothing further happens.
    Quit,
}

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    /// Neutral status.
    Info,
    /// Something worked.
    Success,
    /// User-facing rejection.
    Warning,
    /// Transport failure.
    Error,
}

/// Status line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    #[new(into)]
    pub text: String,
}

/// Read-only projection consumed by a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct SessionView {
    /// Mirrored pile sizes.
    piles: Vec<u64>,
    /// Player to move.
    current_player: Player,
    /// Whether the game is over.
    is_game_over: bool,
    /// Winner once the game is over.
    winner: Option<Player>,
    /// Lifecycle phase.
    phase: Phase,
    /// A mutating request is waiting for the engine.
    busy: bool,
    /// Move, computer-move and undo controls may be used.
    controls_enabled: bool,
    /// Restart is possible.
    can_restart: bool,
    /// Latest status line.
    notice: Option<Notice>,
    /// Text of the open confirmation prompt.
    pending_confirmation: Option<String>,
}

/// Per-game bookkeeping owned by the controller.
#[derive(Debug, Default)]
struct Session {
    phase: Phase,
    /// Set once per start/restart; `None` until the engine reports it.
    initial_piles: Option<Vec<u64>>,
    notice: Option<Notice>,
}

/// Drives one player session against a remote engine.
#[derive(Debug)]
pub struct SessionController<E, P> {
    sync: SyncClient<E>,
    gate: ConfirmationGate<P>,
    session: Mutex<Session>,
    in_flight: Semaphore,
    views: watch::Sender<Option<SessionView>>,
}

impl<E: RemoteEngine, P: Prompter> SessionController<E, P> {
    /// Creates a controller in [`Phase::Setup`].
    #[instrument(skip_all)]
    pub fn new(engine: E, prompter: P) -> Self {
        info!("Creating session controller");
        let (views, _) = watch::channel(None);
        let controller = Self {
            sync: SyncClient::new(engine),
            gate: ConfirmationGate::new(prompter),
            session: Mutex::new(Session::default()),
            in_flight: Semaphore::new(1),
            views,
        };
        controller.set_notice(NoticeLevel::Info, "Welcome to Nim! Start a new game.");
        controller
    }

    /// The sync client (and through it, the state store).
    pub fn sync(&self) -> &SyncClient<E> {
        &self.sync
    }

    /// The confirmation gate.
    pub fn gate(&self) -> &ConfirmationGate<P> {
        &self.gate
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.session().phase
    }

    /// Piles a restart would use.
    pub fn initial_piles(&self) -> Option<Vec<u64>> {
        self.session().initial_piles.clone()
    }

    /// Receiver woken whenever the projection changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionView>> {
        self.views.subscribe()
    }

    /// Builds the current projection.
    pub fn view(&self) -> SessionView {
        let state = self.sync.store().read();
        let session = self.session();
        let busy = self.in_flight.available_permits() == 0;
        SessionView {
            piles: state.piles().to_vec(),
            current_player: state.current_player(),
            is_game_over: state.is_game_over(),
            winner: state.winner(),
            phase: session.phase,
            busy,
            controls_enabled: session.phase == Phase::Active && !busy && !state.is_game_over(),
            can_restart: matches!(session.phase, Phase::Active | Phase::GameOver)
                && session.initial_piles.is_some()
                && !busy,
            notice: session.notice.clone(),
            pending_confirmation: self.gate.pending(),
        }
    }

    /// Starts a game from Setup.
    #[instrument(skip(self))]
    pub async fn start(&self, piles: Vec<u64>) -> Result<(), SessionError> {
        self.require("start a game", &[Phase::Setup])?;
        if let Err(e) = PileSetup::check(&piles) {
            return Err(self.report(e.into()));
        }

        let (state, initial_piles) = self
            .exclusive(async {
                let state = self.sync.start(&piles).await?;
                let initial_piles = match self.sync.fetch_initial_piles().await {
                    Ok(initial) => Some(initial),
                    Err(e) => {
                        warn!(error = %e, "Could not fetch initial piles; restart disabled");
                        None
                    }
                };
                Ok((state, initial_piles))
            })
            .await
            .map_err(|e| self.report(e))?;

        {
            let mut session = self.session();
            // Quit may have been confirmed while the engine was starting.
            if session.phase != Phase::Setup {
                warn!(phase = %session.phase, "Session left setup during start");
                return Err(SessionError::Superseded);
            }
            session.initial_piles = initial_piles;
            session.phase = Phase::Active;
        }
        info!(?piles, "Game started");
        self.set_notice(
            NoticeLevel::Success,
            format!("Game started! Player {}'s turn.", state.current_player()),
        );
        Ok(())
    }

    /// Submits a player's move.
    #[instrument(skip(self))]
    pub async fn submit_move(&self, mov: Move) -> Result<(), SessionError> {
        self.require("make a move", &[Phase::Active])?;
        let mover = self.sync.store().read().current_player();
        let state = self
            .exclusive(self.sync.submit_move(mov))
            .await
            .map_err(|e| self.report(e))?;
        self.settle(
            &state,
            Notice::new(
                NoticeLevel::Success,
                format!("Player {}'s move successful.", mover),
            ),
        );
        Ok(())
    }

    /// Lets the engine move for the current player.
    ///
    /// Returns the move played, or `None` if the engine had none because
    /// the game was already over.
    #[instrument(skip(self))]
    pub async fn computer_move(&self) -> Result<Option<Move>, SessionError> {
        self.require("let the computer move", &[Phase::Active])?;
        let (played, state) = self
            .exclusive(async {
                self.set_notice(NoticeLevel::Info, "Computer is thinking...");
                match self.sync.request_optimal_move().await? {
                    Some(mov) => Ok((Some(mov), self.sync.submit_move(mov).await?)),
                    // No move on offer: the game should be over, check.
                    None => Ok((None, self.sync.fetch_state().await?)),
                }
            })
            .await
            .map_err(|e| self.report(e))?;

        match played {
            Some(mov) => {
                self.settle(
                    &state,
                    Notice::new(
                        NoticeLevel::Success,
                        format!(
                            "Computer removed {} from Pile {}.",
                            mov.count,
                            mov.pile_index + 1
                        ),
                    ),
                );
                Ok(Some(mov))
            }
            None if state.is_game_over() => {
                self.settle(
                    &state,
                    Notice::new(NoticeLevel::Info, "Game is already over."),
                );
                Ok(None)
            }
            None => {
                error!("Engine offered no move for a running game");
                Err(self.report(SessionError::RemoteRejection(
                    "engine found no move although the game is still active".to_string(),
                )))
            }
        }
    }

    /// Takes back the last accepted move.
    #[instrument(skip(self))]
    pub async fn undo(&self) -> Result<(), SessionError> {
        self.require("undo", &[Phase::Active])?;
        let state = self
            .exclusive(self.sync.undo())
            .await
            .map_err(|e| self.report(e))?;
        self.settle(&state, Notice::new(NoticeLevel::Info, "Last move undone."));
        Ok(())
    }

    /// Restarts with the piles the current game started with.
    ///
    /// Returns false if the user declined.
    #[instrument(skip(self))]
    pub async fn restart(&self) -> Result<bool, SessionError> {
        self.require("restart", &[Phase::Active, Phase::GameOver])?;
        let Some(initial_piles) = self.initial_piles() else {
            return Err(self.report(SessionError::NothingToRestart));
        };

        let confirmed = self
            .gate
            .confirm("Are you sure you want to restart the current game?")
            .await
            .map_err(|e| self.report(e))?;
        if !confirmed {
            debug!("Restart declined");
            return Ok(false);
        }

        let state = self
            .exclusive(self.sync.start(&initial_piles))
            .await
            .map_err(|e| self.report(e))?;
        self.session().initial_piles = Some(initial_piles);
        info!("Game restarted");
        self.settle(
            &state,
            Notice::new(NoticeLevel::Success, "Game restarted with original piles!"),
        );
        Ok(true)
    }

    /// Abandons the current game and returns to Setup.
    ///
    /// Local only. Returns false if the user declined.
    #[instrument(skip(self))]
    pub async fn new_game(&self) -> Result<bool, SessionError> {
        self.require("start a new game", &[Phase::Active, Phase::GameOver])?;
        let confirmed = self
            .gate
            .confirm(
                "Are you sure you want to start a new game? Current game progress will be lost.",
            )
            .await
            .map_err(|e| self.report(e))?;
        if !confirmed {
            debug!("New game declined");
            return Ok(false);
        }

        self.sync.store().replace(GameState::default());
        {
            let mut session = self.session();
            session.phase = Phase::Setup;
            session.initial_piles = None;
        }
        info!("Returned to setup");
        self.set_notice(NoticeLevel::Info, "Welcome to Nim! Start a new game.");
        Ok(true)
    }

    /// Ends the session. Local only. Returns false if the user declined.
    #[instrument(skip(self))]
    pub async fn quit(&self) -> Result<bool, SessionError> {
        self.require("quit", &[Phase::Setup, Phase::Active, Phase::GameOver])?;
        let confirmed = self
            .gate
            .confirm("Are you sure you want to quit the program?")
            .await
            .map_err(|e| self.report(e))?;
        if !confirmed {
            return Ok(false);
        }

        self.session().phase = Phase::Quit;
        info!("Session quit");
        self.set_notice(NoticeLevel::Info, "Thanks for playing! Goodbye.");
        if let Err(e) = self.gate.notify("You can now close this window.").await {
            debug!(error = %e, "Skipped farewell message");
        }
        Ok(true)
    }

    /// Re-reads the engine state.
    ///
    /// Refused with [`SessionError::Busy`] while a mutating action is in
    /// flight, since its own refresh will land shortly.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), SessionError> {
        self.require("refresh", &[Phase::Active, Phase::GameOver])?;
        let state = self
            .exclusive(self.sync.fetch_state())
            .await
            .map_err(|e| self.report(e))?;
        let notice = self.turn_notice(&state);
        self.settle(&state, notice);
        Ok(())
    }

    /// Runs `work` holding the in-flight slot.
    ///
    /// Fails with [`SessionError::Busy`] without polling `work` if the
    /// slot is taken. The projection is republished on entry and exit.
    async fn exclusive<T>(
        &self,
        work: impl Future<Output = Result<T, SessionError>>,
    ) -> Result<T, SessionError> {
        let permit = self.in_flight.try_acquire().map_err(|_| {
            debug!("In-flight slot taken");
            SessionError::Busy
        })?;
        self.publish();
        let result = work.await;
        drop(permit);
        self.publish();
        result
    }

    /// Moves between Active and GameOver according to `state`.
    fn settle(&self, state: &GameState, notice: Notice) {
        let notice = if state.is_game_over() {
            self.turn_notice(state)
        } else {
            notice
        };
        {
            let mut session = self.session();
            if !matches!(session.phase, Phase::Active | Phase::GameOver) {
                debug!(phase = %session.phase, "Session left the game, result not shown");
                return;
            }
            session.phase = if state.is_game_over() {
                Phase::GameOver
            } else {
                Phase::Active
            };
            debug!(phase = %session.phase, "Lifecycle re-evaluated");
            session.notice = Some(notice);
        }
        self.publish();
    }

    fn turn_notice(&self, state: &GameState) -> Notice {
        if state.is_game_over() {
            let text = match state.winner() {
                Some(winner) => format!("🎉 Game Over! Player {} wins! 🎉", winner),
                None => "Game Over!".to_string(),
            };
            Notice::new(NoticeLevel::Success, text)
        } else {
            Notice::new(
                NoticeLevel::Info,
                format!("Player {}'s turn. Make your move!", state.current_player()),
            )
        }
    }

    /// Logs `err`, records it as the status line and hands it back.
    fn report(&self, err: SessionError) -> SessionError {
        let level = match &err {
            SessionError::Network(_) => {
                error!(error = %err, "Action failed");
                NoticeLevel::Error
            }
            SessionError::Superseded => {
                // The newer action has already set its own status line.
                debug!(error = %err, "Result discarded");
                return err;
            }
            SessionError::StateDesync(_) => {
                warn!(error = %err, "Action not applied");
                NoticeLevel::Info
            }
            _ => {
                warn!(error = %err, "Action rejected");
                NoticeLevel::Warning
            }
        };
        self.set_notice(level, err.to_string());
        err
    }

    fn require(&self, action: &'static str, allowed: &[Phase]) -> Result<(), SessionError> {
        let phase = self.phase();
        if allowed.contains(&phase) {
            Ok(())
        } else {
            Err(self.report(SessionError::InvalidTransition { action, phase }))
        }
    }

    fn set_notice(&self, level: NoticeLevel, text: impl Into<String>) {
        self.session().notice = Some(Notice::new(level, text.into()));
        self.publish();
    }

    fn publish(&self) {
        self.views.send_replace(Some(self.view()));
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        // Never held across an await, so poisoning only follows a panic
        // elsewhere; the data is still consistent.
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
