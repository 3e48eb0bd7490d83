//! Terminal-backed confirmation prompts.

use crate::session::Prompter;
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Line source shared between the command loop and the prompter.
pub type SharedLines<R> = Arc<Mutex<Lines<R>>>;

/// Asks yes/no questions on stdout and reads answers from `R`.
#[derive(Debug)]
pub struct TerminalPrompter<R> {
    input: SharedLines<R>,
}

impl<R> TerminalPrompter<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Creates a prompter reading from `input`.
    pub fn new(input: SharedLines<R>) -> Self {
        Self { input }
    }

    async fn read_answer(&self) -> Option<String> {
        match self.input.lock().await.next_line().await {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read answer");
                None
            }
        }
    }
}

fn show(text: &str) {
    print!("{}", text);
    if let Err(e) = std::io::stdout().flush() {
        debug!(error = %e, "Failed to flush stdout");
    }
}

#[async_trait]
impl<R> Prompter for TerminalPrompter<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn ask(&self, message: &str) -> bool {
        show(&format!("{} [y/N] ", message));
        let answer = self.read_answer().await.unwrap_or_default();
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    async fn acknowledge(&self, message: &str) {
        show(&format!("{} (press Enter) ", message));
        self.read_answer().await;
    }
}
