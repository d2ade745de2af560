//! Armada -- an RTS agent decision core speaking a line-based tick protocol.
//!
//! This binary reads commands from stdin and writes replies to stdout.
//! Diagnostics go to stderr through `tracing`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use armada::config::load_config;
use armada::engine::Engine;
use armada::logging;
use armada::protocol::{parse_command, Command};

#[derive(Debug, Parser)]
#[command(name = "armada", version, about = "RTS agent decision core")]
struct Args {
    /// TOML configuration file; defaults apply when absent.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Runs the protocol loop, reading commands from stdin and writing
/// replies to stdout.
fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut engine = match Engine::new(config) {
        Ok(e) => e,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&mut engine) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("protocol output failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &mut Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::Hello => engine.handle_hello(&mut out)?,
            Command::IsReady => engine.handle_isready(&mut out)?,
            Command::SetOption { name, value } => {
                if let Err(e) = engine.set_option(&name, value.as_deref()) {
                    error!("{e}");
                }
            }
            Command::NewGame { map } => {
                if let Err(e) = engine.new_game(map.as_deref()) {
                    error!("newgame failed: {e}");
                    reply_error(&mut out, &e)?;
                }
            }
            Command::Tick { snapshot } => {
                if let Err(e) = engine.handle_tick(&snapshot, &mut out) {
                    error!("tick failed: {e}");
                    reply_error(&mut out, &e)?;
                }
            }
            Command::GameOver { outcome } => match engine.game_over(&outcome) {
                Ok(Some(path)) => info!(path = %path.display(), "training data written"),
                Ok(None) => {}
                Err(e) => error!("gameover failed: {e}"),
            },
            Command::Quit => break,
        }
    }
    Ok(())
}

fn reply_error<W: Write>(out: &mut W, e: &dyn std::fmt::Display) -> io::Result<()> {
    writeln!(out, "error {e}")?;
    out.flush()
}
