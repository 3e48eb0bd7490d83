//! Parsing of console input lines.

use crate::games::nim::Move;

/// One line of user input, understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start a game with these piles.
    Start(Vec<u64>),
    /// Make a move.
    Move(Move),
    /// Let the computer move.
    Computer,
    /// Undo the last move.
    Undo,
    /// Restart with the original piles.
    Restart,
    /// Back to setup.
    NewGame,
    /// Re-read the engine state.
    Refresh,
    /// Leave.
    Quit,
    /// Show the command list.
    Help,
}

/// Command summary printed by `help`.
pub const HELP: &str = "\
Commands:
  start [SIZES...]   start a game (e.g. `start 3 4 5`)
  move PILE COUNT    remove COUNT objects from pile PILE (1-based)
  computer           let the computer make a move
  undo               undo the last move
  restart            restart the current game
  new                start a new game (back to setup)
  refresh            re-read the game state
  quit               quit the program";

/// Parses `line`. A bare `start` uses `default_piles`.
///
/// Pile numbers are 1-based here and 0-based in the returned [`Move`].
pub fn parse(line: &str, default_piles: &[u64]) -> Result<ConsoleCommand, String> {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(ConsoleCommand::Help);
    };
    let args: Vec<&str> = words.collect();

    match keyword.to_lowercase().as_str() {
        "start" | "s" => {
            if args.is_empty() {
                return Ok(ConsoleCommand::Start(default_piles.to_vec()));
            }
            args.iter()
                .enumerate()
                .map(|(i, arg)| {
                    arg.parse::<u64>().map_err(|_| {
                        format!("Please enter a positive integer for Pile {} size.", i + 1)
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ConsoleCommand::Start)
        }
        "move" | "m" => {
            let [pile, count] = args.as_slice() else {
                return Err("Usage: move PILE COUNT".to_string());
            };
            let pile = pile
                .parse::<usize>()
                .ok()
                .filter(|&pile| pile >= 1)
                .ok_or_else(|| "Please enter a valid pile number.".to_string())?;
            let count = count
                .parse::<u64>()
                .map_err(|_| "Please enter a positive number of objects to remove.".to_string())?;
            Ok(ConsoleCommand::Move(Move::new(pile - 1, count)))
        }
        "computer" | "c" => Ok(ConsoleCommand::Computer),
        "undo" | "u" => Ok(ConsoleCommand::Undo),
        "restart" | "r" => Ok(ConsoleCommand::Restart),
        "new" | "n" => Ok(ConsoleCommand::NewGame),
        "refresh" => Ok(ConsoleCommand::Refresh),
        "quit" | "q" | "exit" => Ok(ConsoleCommand::Quit),
        "help" | "h" | "?" => Ok(ConsoleCommand::Help),
        other => Err(format!("Unknown command `{}`. Type `help` for a list.", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_start_uses_defaults() {
        assert_eq!(
            parse("start", &[3, 4, 5]),
            Ok(ConsoleCommand::Start(vec![3, 4, 5]))
        );
    }

    #[test]
    fn test_start_with_sizes() {
        assert_eq!(
            parse("start 2 7", &[3, 4, 5]),
            Ok(ConsoleCommand::Start(vec![2, 7]))
        );
    }

    #[test]
    fn test_start_rejects_non_numeric_size() {
        assert!(parse("start 2 x", &[]).is_err());
    }

    #[test]
    fn test_move_is_one_based() {
        assert_eq!(
            parse("move 2 5", &[]),
            Ok(ConsoleCommand::Move(Move::new(1, 5)))
        );
    }

    #[test]
    fn test_move_rejects_pile_zero() {
        assert!(parse("m 0 1", &[]).is_err());
    }

    #[test]
    fn test_zero_count_left_to_validator() {
        assert_eq!(
            parse("m 1 0", &[]),
            Ok(ConsoleCommand::Move(Move::new(0, 0)))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse("dance", &[]).is_err());
    }
}
