//! Protocol-facing agent state.
//!
//! Holds the configuration, the current match's map and the orchestrator,
//! and answers protocol commands by writing reply lines.

use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AgentConfig, ConfigError};
use crate::orchestrator::Orchestrator;
use crate::training::{Outcome, TrainingError};
use crate::world::{MapInfo, Snapshot};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Training(#[from] TrainingError),
    #[error("failed to write reply: {0}")]
    Io(#[from] io::Error),
}

/// Options advertised in the handshake: name, type, default.
const OPTIONS: [(&str, &str, &str); 9] = [
    ("Mode", "combo", "rule_based var rule_based var random var learned"),
    ("Race", "combo", "protoss var protoss var terran var zerg"),
    ("ModelLocation", "string", "<empty>"),
    ("SaveTrainingData", "check", "false"),
    ("TrainingDataDir", "string", "training_data"),
    ("PlotMapIntel", "check", "false"),
    ("MaxWorkers", "spin", "65 min 15 max 199"),
    ("WorkerScout", "check", "false"),
    ("Seed", "spin", "0 min 0 max 18446744073709551615"),
];

/// Holds the mutable state of the agent between commands.
pub struct Engine {
    config: AgentConfig,
    agent: Orchestrator,
    map: MapInfo,
    /// Options changed since the orchestrator was built.
    dirty: bool,
    in_match: bool,
}

impl Engine {
    /// Builds the engine, failing on invalid configuration.
    pub fn new(config: AgentConfig) -> Result<Self, ConfigError> {
        let agent = Orchestrator::new(config.clone())?;
        Ok(Engine {
            config,
            agent,
            map: MapInfo::default(),
            dirty: false,
            in_match: false,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn agent(&self) -> &Orchestrator {
        &self.agent
    }

    /// Handles the handshake: writes id, options and `hellook`.
    pub fn handle_hello<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name armada {}", env!("CARGO_PKG_VERSION"))?;
        for (name, kind, default) in OPTIONS {
            writeln!(out, "option name {name} type {kind} default {default}")?;
        }
        writeln!(out, "hellook")?;
        out.flush()
    }

    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Applies an option; it takes effect at the next `newgame`.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        self.config.set_option(name, value)?;
        self.dirty = true;
        info!(name, value, "option set");
        Ok(())
    }

    /// Starts a match, rebuilding the agent if options changed.
    pub fn new_game(&mut self, map: Option<&str>) -> Result<(), ProtocolError> {
        if self.dirty {
            self.agent = Orchestrator::new(self.config.clone())?;
            self.dirty = false;
        }
        self.map = match map {
            Some(json) => serde_json::from_str(json)?,
            None => MapInfo::default(),
        };
        self.agent.new_game();
        self.in_match = true;
        Ok(())
    }

    /// Runs one tick and writes `orders <json array>`.
    pub fn handle_tick<W: Write>(&mut self, json: &str, out: &mut W) -> Result<(), ProtocolError> {
        let mut snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.map == MapInfo::default() {
            snapshot.map = self.map.clone();
        }
        if !self.in_match {
            warn!("tick before newgame, starting a match");
            self.new_game(None)?;
            self.map = snapshot.map.clone();
        }
        let orders = self.agent.tick(&snapshot);
        writeln!(out, "orders {}", serde_json::to_string(&orders)?)?;
        out.flush()?;
        Ok(())
    }

    /// Ends the match; returns the training file written, if any.
    pub fn game_over(&mut self, outcome: &str) -> Result<Option<PathBuf>, ProtocolError> {
        let outcome: Outcome = outcome.parse()?;
        self.in_match = false;
        Ok(self.agent.game_over(outcome)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use crate::world::Order;

    fn engine() -> Engine {
        let mut cfg = AgentConfig::default();
        cfg.player.seed = 1;
        Engine::new(cfg).unwrap()
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn hello_lists_options() {
        let mut buf = Vec::new();
        engine().handle_hello(&mut buf).unwrap();
        let text = output(buf);
        assert!(text.starts_with("id name armada"));
        assert!(text.contains("option name Mode type combo"));
        assert!(text.trim_end().ends_with("hellook"));
    }

    #[test]
    fn isready_replies() {
        let mut buf = Vec::new();
        engine().handle_isready(&mut buf).unwrap();
        assert_eq!(output(buf), "readyok\n");
    }

    #[test]
    fn tick_inherits_newgame_map() {
        let mut e = engine();
        let map = serde_json::to_string(&test_support::map_info()).unwrap();
        e.new_game(Some(&map)).unwrap();

        let mut snap = test_support::snapshot();
        snap.minerals = 50;
        snap.structures[0].is_idle = true;
        snap.map = MapInfo::default();
        let json = serde_json::to_string(&snap).unwrap();

        let mut buf = Vec::new();
        e.handle_tick(&json, &mut buf).unwrap();
        let text = output(buf);
        let payload = text.trim_end().strip_prefix("orders ").unwrap();
        let orders: Vec<Order> = serde_json::from_str(payload).unwrap();
        assert!(orders.contains(&Order::Train {
            kind: crate::world::UnitKind::Probe,
            source: 1
        }));
    }

    #[test]
    fn malformed_tick_is_an_error() {
        let mut e = engine();
        e.new_game(None).unwrap();
        let mut buf = Vec::new();
        assert!(matches!(
            e.handle_tick("{not json", &mut buf),
            Err(ProtocolError::Json(_))
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn options_apply_at_next_newgame() {
        let mut e = engine();
        e.set_option("Mode", Some("random")).unwrap();
        assert_eq!(e.agent().engagement().policy_name(), "rule_based");
        e.new_game(None).unwrap();
        assert_eq!(e.agent().engagement().policy_name(), "random");
    }

    #[test]
    fn bad_option_is_rejected() {
        let mut e = engine();
        assert!(e.set_option("Mode", Some("berserk")).is_err());
        assert!(e.set_option("Nope", Some("1")).is_err());
    }

    #[test]
    fn gameover_parses_outcome() {
        let mut e = engine();
        e.new_game(None).unwrap();
        assert!(e.game_over("victory").unwrap().is_none());
        assert!(e.game_over("surrender").is_err());
    }
}
