//! Line-oriented terminal frontend.
//!
//! Renders the controller's projection after every command and feeds
//! parsed commands back into it. Confirmation prompts read from the same
//! input stream.

mod command;
mod prompter;
mod render;

pub use command::{ConsoleCommand, HELP, parse};
pub use prompter::{SharedLines, TerminalPrompter};
pub use render::render;

use crate::remote::RemoteEngine;
use crate::session::{Phase, Prompter, SessionController};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Runs an interactive session on stdin/stdout until the user quits or
/// input ends.
#[instrument(skip_all)]
pub async fn run_console<E: RemoteEngine>(engine: E, default_piles: Vec<u64>) -> anyhow::Result<()> {
    let input: SharedLines<_> = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let controller = SessionController::new(engine, TerminalPrompter::new(input.clone()));

    println!("Welcome to Nim!");
    loop {
        println!("{}", render(&controller.view()));
        if controller.phase() == Phase::Quit {
            info!("Console session finished");
            return Ok(());
        }

        print!("> ");
        std::io::stdout().flush()?;
        let line = input.lock().await.next_line().await?;
        let Some(line) = line else {
            info!("Input closed");
            return Ok(());
        };

        match parse(&line, &default_piles) {
            Ok(ConsoleCommand::Help) => println!("{}", HELP),
            Ok(command) => dispatch(&controller, command).await,
            Err(message) => println!("{}", message),
        }
    }
}

/// Applies one command. Failures are already on the controller's status
/// line, so they are only logged here.
async fn dispatch<E: RemoteEngine, P: Prompter>(
    controller: &SessionController<E, P>,
    command: ConsoleCommand,
) {
    debug!(?command, "Dispatching console command");
    let result = match command {
        ConsoleCommand::Start(piles) => controller.start(piles).await,
        ConsoleCommand::Move(mov) => controller.submit_move(mov).await,
        ConsoleCommand::Computer => controller.computer_move().await.map(|_| ()),
        ConsoleCommand::Undo => controller.undo().await,
        ConsoleCommand::Restart => controller.restart().await.map(|_| ()),
        ConsoleCommand::NewGame => controller.new_game().await.map(|_| ()),
        ConsoleCommand::Refresh => controller.refresh().await,
        ConsoleCommand::Quit => controller.quit().await.map(|_| ()),
        ConsoleCommand::Help => Ok(()),
    };
    if let Err(e) = result {
        debug!(error = %e, "Console command failed");
    }
}
