//! Agent configuration.
//!
//! Loaded from a TOML file with every field defaulted, then validated once
//! before the first tick. Individual fields can be overridden at runtime
//! through the protocol's `setoption` command.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engagement::ClassifierError;
use crate::world::{Race, Roster};

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown engagement mode '{0}' (expected rule_based, random, or learned)")]
    UnknownMode(String),
    #[error("unknown race '{0}'")]
    UnknownRace(String),
    #[error("{field} must be in [{low}, {high}), got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },
    #[error("learned engagement mode requires player.model_location")]
    MissingModel,
    #[error("cannot load engagement model: {0}")]
    Model(#[from] ClassifierError),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },
}

/// Which engagement policy drives the army.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementMode {
    RuleBased,
    Random,
    Learned,
}

impl FromStr for EngagementMode {
    type Err = ConfigError;

    /// Parses a mode name, ignoring case and treating `-` like `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "rule_based" => Ok(EngagementMode::RuleBased),
            "random" => Ok(EngagementMode::Random),
            "learned" | "dnn" => Ok(EngagementMode::Learned),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub player: PlayerConfig,
    pub scout: ScoutConfig,
    pub construction: ConstructionConfig,
    pub engagement: EngagementConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Engagement mode name; see `EngagementMode`.
    pub mode: String,
    pub race: String,
    /// Path of the ONNX model used by the learned mode.
    pub model_location: String,
    pub save_training_data: bool,
    pub training_data_dir: PathBuf,
    /// Dump the intel tensor as PNG frames while playing.
    pub plot_map_intel: bool,
    pub intel_frame_dir: PathBuf,
    /// Write one intel frame every this many ticks.
    pub intel_frame_every: u64,
    pub max_num_workers: u32,
    pub use_worker_scout: bool,
    /// RNG seed; 0 draws from entropy.
    pub seed: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            mode: "rule_based".to_string(),
            race: "protoss".to_string(),
            model_location: String::new(),
            save_training_data: false,
            training_data_dir: PathBuf::from("training_data"),
            plot_map_intel: false,
            intel_frame_dir: PathBuf::from("intel_frames"),
            intel_frame_every: 22,
            max_num_workers: 65,
            use_worker_scout: false,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Base viability threshold; grows by one per lost scout.
    pub min_distance: f32,
    /// Upper bound of the viability threshold.
    pub max_distance: f32,
    /// Seconds spent at home after saturation before wandering.
    pub saturation_timeout: f32,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        ScoutConfig {
            min_distance: 10.0,
            max_distance: 20.0,
            saturation_timeout: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionConfig {
    /// Workers wanted per townhall.
    pub worker_multiplier: u32,
    /// Build supply when fewer than this many supply remain.
    pub supply_threshold: u32,
    /// Geysers within this distance of a ready townhall get a gas structure.
    pub gas_radius: f32,
    /// One more combat structure every this many minutes.
    pub combat_build_rate_minutes: f32,
    /// One more townhall every this many minutes.
    pub townhall_rate_minutes: f32,
    pub max_townhalls: u32,
    /// Seconds a requested structure suppresses duplicate requests.
    pub pending_build_secs: f32,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        ConstructionConfig {
            worker_multiplier: 16,
            supply_threshold: 5,
            gas_radius: 15.0,
            combat_build_rate_minutes: 1.0,
            townhall_rate_minutes: 2.0,
            max_townhalls: 3,
            pending_build_secs: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Withdraw at or below this army size.
    pub withdraw_threshold: u32,
    /// Attack at or above this army size.
    pub attack_threshold: u32,
    /// Seconds a withdrawal holds before the army may re-engage.
    pub withdraw_hold_secs: f32,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        EngagementConfig {
            withdraw_threshold: 4,
            attack_threshold: 6,
            withdraw_hold_secs: 15.0,
        }
    }
}

impl AgentConfig {
    /// Parses the configured engagement mode.
    pub fn engagement_mode(&self) -> Result<EngagementMode, ConfigError> {
        self.player.mode.parse()
    }

    /// Resolves the configured race to its roster.
    pub fn roster(&self) -> Result<Roster, ConfigError> {
        let race = Race::from_name(self.player.race.trim())
            .ok_or_else(|| ConfigError::UnknownRace(self.player.race.clone()))?;
        Ok(Roster::for_race(race))
    }

    /// Checks every field that can make the agent unable to run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mode = self.engagement_mode()?;
        self.roster()?;

        check_range("player.max_num_workers", self.player.max_num_workers as f64, 15.0, 200.0)?;
        check_range(
            "player.intel_frame_every",
            self.player.intel_frame_every as f64,
            1.0,
            f64::INFINITY,
        )?;
        check_range("scout.min_distance", self.scout.min_distance as f64, 0.0, f64::INFINITY)?;
        check_range(
            "scout.max_distance",
            self.scout.max_distance as f64,
            self.scout.min_distance as f64,
            f64::INFINITY,
        )?;
        check_range(
            "scout.saturation_timeout",
            self.scout.saturation_timeout as f64,
            0.0,
            f64::INFINITY,
        )?;
        check_range(
            "construction.combat_build_rate_minutes",
            self.construction.combat_build_rate_minutes as f64,
            f64::EPSILON,
            f64::INFINITY,
        )?;
        check_range(
            "construction.townhall_rate_minutes",
            self.construction.townhall_rate_minutes as f64,
            f64::EPSILON,
            f64::INFINITY,
        )?;
        check_range(
            "engagement.attack_threshold",
            self.engagement.attack_threshold as f64,
            self.engagement.withdraw_threshold as f64 + 1.0,
            f64::INFINITY,
        )?;

        if mode == EngagementMode::Learned && self.player.model_location.trim().is_empty() {
            return Err(ConfigError::MissingModel);
        }
        Ok(())
    }

    /// Applies a `setoption name <name> value <value>` override.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let raw = value.unwrap_or("").trim();
        let invalid = || ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
        };
        match name {
            "Mode" => {
                raw.parse::<EngagementMode>()?;
                self.player.mode = raw.to_string();
            }
            "Race" => self.player.race = raw.to_string(),
            "ModelLocation" => self.player.model_location = raw.to_string(),
            "SaveTrainingData" => {
                self.player.save_training_data = parse_bool(raw).ok_or_else(invalid)?
            }
            "TrainingDataDir" => self.player.training_data_dir = PathBuf::from(raw),
            "PlotMapIntel" => self.player.plot_map_intel = parse_bool(raw).ok_or_else(invalid)?,
            "MaxWorkers" => self.player.max_num_workers = raw.parse().map_err(|_| invalid())?,
            "WorkerScout" => self.player.use_worker_scout = parse_bool(raw).ok_or_else(invalid)?,
            "Seed" => self.player.seed = raw.parse().map_err(|_| invalid())?,
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, low: f64, high: f64) -> Result<(), ConfigError> {
    if value >= low && value < high {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            low,
            high,
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parses a configuration document from TOML text.
pub fn parse_config(text: &str) -> Result<AgentConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Loads configuration from a TOML file.
///
/// A missing path or file falls back to defaults with a warning.
pub fn load_config(path: Option<&Path>) -> Result<AgentConfig, ConfigError> {
    let path = match path {
        Some(p) => p,
        None => {
            warn!("no configuration file given, using default settings");
            return Ok(AgentConfig::default());
        }
    };
    if !path.exists() {
        warn!(path = %path.display(), "configuration file is inaccessible, using default settings");
        return Ok(AgentConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}
