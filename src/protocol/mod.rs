//! Tick protocol handling.
//!
//! Line-oriented stdin/stdout protocol between the game host and the
//! agent: a handshake, option overrides, match lifecycle and one `tick`
//! per world snapshot answered by an `orders` line.

pub mod parser;

pub use parser::{parse_command, Command};
