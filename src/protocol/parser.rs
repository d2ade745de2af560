//! Tick protocol command parser.
//!
//! Parses incoming lines into structured `Command` variants that the main
//! loop dispatches on. JSON payloads are carried as raw text and decoded
//! by the engine.

use tracing::warn;

/// A parsed host-to-agent command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Protocol handshake; the agent replies with its id and options.
    Hello,

    /// Synchronization ping; the agent must reply `readyok`.
    IsReady,

    /// Set an option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Start a new match, optionally with the map as JSON.
    NewGame { map: Option<String> },

    /// One world snapshot as JSON; the agent replies with orders.
    Tick { snapshot: String },

    /// The match ended with the given outcome.
    GameOver { outcome: String },

    /// Terminate the agent process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((k, r)) => (k, r.trim()),
        None => (trimmed, ""),
    };
    if keyword.is_empty() {
        return None;
    }

    match keyword {
        "hello" => Some(Command::Hello),
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(rest),
        "newgame" => Some(Command::NewGame {
            map: (!rest.is_empty()).then(|| rest.to_string()),
        }),
        "tick" => parse_payload(rest, "tick <snapshot json>")
            .map(|snapshot| Command::Tick { snapshot }),
        "gameover" => parse_payload(rest, "gameover <victory|defeat|tie>")
            .map(|outcome| Command::GameOver { outcome }),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `name <id> [value <x>]` (the part after `setoption`).
fn parse_setoption(rest: &str) -> Option<Command> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < 2 || tokens[0] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");
    let (name_parts, value_parts) = match value_idx {
        Some(vi) => (&tokens[1..vi], &tokens[vi + 1..]),
        None => (&tokens[1..], &tokens[tokens.len()..]),
    };
    if name_parts.is_empty() {
        warn!("malformed setoption: empty name");
        return None;
    }
    let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));
    Some(Command::SetOption {
        name: name_parts.join(" "),
        value,
    })
}

fn parse_payload(rest: &str, usage: &str) -> Option<String> {
    if rest.is_empty() {
        warn!(usage, "missing argument");
        None
    } else {
        Some(rest.to_string())
    }
}
