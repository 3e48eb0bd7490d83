//! Shared fakes for session and sync client tests.

#![allow(dead_code)]

use async_trait::async_trait;
use nim_session::{
    LocalEngine, NetworkError, Prompter, RemoteEngine, WinRule, WireGameState, WireInitialPiles,
    WireMove,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Engine that plays by the reference rules unless told otherwise.
///
/// Individual operations can be made to fail at the transport level,
/// answer negatively, or take a while; state fetches can be scripted.
#[derive(Debug)]
pub struct FakeEngine {
    inner: LocalEngine,
    failing: Mutex<HashSet<&'static str>>,
    rejecting: Mutex<HashSet<&'static str>>,
    slow: Mutex<HashMap<&'static str, Duration>>,
    scripted_states: Mutex<VecDeque<WireGameState>>,
    scripted_move: Mutex<Option<Option<WireMove>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::with_rule(WinRule::Normal)
    }

    pub fn with_rule(rule: WinRule) -> Self {
        Self {
            inner: LocalEngine::new(rule),
            failing: Mutex::default(),
            rejecting: Mutex::default(),
            slow: Mutex::default(),
            scripted_states: Mutex::default(),
            scripted_move: Mutex::default(),
            calls: Mutex::default(),
        }
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn heal(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    pub fn reject(&self, operation: &'static str) {
        self.rejecting.lock().unwrap().insert(operation);
    }

    pub fn slow_down(&self, operation: &'static str, delay: Duration) {
        self.slow.lock().unwrap().insert(operation, delay);
    }

    /// Queues a state returned by the next fetch instead of the real one.
    pub fn script_state(&self, piles: Vec<u64>, player: i64, is_game_over: bool, winner: i64) {
        self.scripted_states.lock().unwrap().push_back(WireGameState {
            piles,
            player,
            is_game_over,
            winner,
        });
    }

    /// Overrides every optimal-move answer.
    pub fn script_optimal_move(&self, answer: Option<WireMove>) {
        *self.scripted_move.lock().unwrap() = Some(answer);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|&&call| call == operation).count()
    }

    async fn enter(&self, operation: &'static str) -> Result<(), NetworkError> {
        self.calls.lock().unwrap().push(operation);
        let delay = self.slow.lock().unwrap().get(operation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(operation) {
            return Err(NetworkError::new(format!("{} unreachable", operation)));
        }
        Ok(())
    }

    fn rejects(&self, operation: &str) -> bool {
        self.rejecting.lock().unwrap().contains(operation)
    }
}

#[async_trait]
impl RemoteEngine for FakeEngine {
    async fn start(&self, piles: &[u64]) -> Result<bool, NetworkError> {
        self.enter("start").await?;
        if self.rejects("start") {
            return Ok(false);
        }
        self.inner.start(piles).await
    }

    async fn game_state(&self) -> Result<WireGameState, NetworkError> {
        self.enter("game_state").await?;
        let scripted = self.scripted_states.lock().unwrap().pop_front();
        match scripted {
            Some(state) => Ok(state),
            None => self.inner.game_state().await,
        }
    }

    async fn remove(&self, pile_index: usize, number_to_remove: u64) -> Result<bool, NetworkError> {
        self.enter("remove").await?;
        if self.rejects("remove") {
            return Ok(false);
        }
        self.inner.remove(pile_index, number_to_remove).await
    }

    async fn find_optimal_move(&self) -> Result<Option<WireMove>, NetworkError> {
        self.enter("find_optimal_move").await?;
        let scripted = *self.scripted_move.lock().unwrap();
        match scripted {
            Some(answer) => Ok(answer),
            None => self.inner.find_optimal_move().await,
        }
    }

    async fn undo_move(&self) -> Result<bool, NetworkError> {
        self.enter("undo_move").await?;
        if self.rejects("undo_move") {
            return Ok(false);
        }
        self.inner.undo_move().await
    }

    async fn initial_piles(&self) -> Result<WireInitialPiles, NetworkError> {
        self.enter("initial_piles").await?;
        if self.rejects("initial_piles") {
            return Ok(WireInitialPiles::default());
        }
        self.inner.initial_piles().await
    }
}

/// Prompter answering from a script; unscripted questions are declined.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    delay: Option<Duration>,
    asked: Mutex<Vec<String>>,
    acknowledged: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Takes `delay` before answering, leaving the prompt open meanwhile.
    pub fn slow(answers: impl IntoIterator<Item = bool>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::answering(answers)
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.acknowledged.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }

    async fn acknowledge(&self, message: &str) {
        self.acknowledged.lock().unwrap().push(message.to_string());
    }
}
