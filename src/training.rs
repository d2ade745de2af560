//! In-match training data capture.
//!
//! Every engagement decision taken while collection is enabled is stored
//! with the intel tensor it was made from. At match end the log is written
//! as JSON lines, but only for a won match.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::engagement::NUM_CHOICES;
use crate::intel::IntelTensor;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("failed to create training data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write training data to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode training record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("unknown match outcome '{0}'")]
    UnknownOutcome(String),
}

/// How a match ended for us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Victory,
    Defeat,
    Tie,
}

impl FromStr for Outcome {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "victory" | "win" => Ok(Outcome::Victory),
            "defeat" | "loss" => Ok(Outcome::Defeat),
            "tie" | "draw" => Ok(Outcome::Tie),
            _ => Err(TrainingError::UnknownOutcome(s.to_string())),
        }
    }
}

/// One decision and the tensor it was made from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// One-hot engagement choice.
    pub choice: [f32; NUM_CHOICES],
    pub intel: IntelTensor,
}

impl TrainingRecord {
    /// Index of the set slot (first maximum).
    pub fn label(&self) -> usize {
        let mut best = 0;
        for i in 1..NUM_CHOICES {
            if self.choice[i] > self.choice[best] {
                best = i;
            }
        }
        best
    }
}

/// Records captured during the current match.
#[derive(Debug, Clone, Default)]
pub struct TrainingLog {
    enabled: bool,
    in_match: bool,
    records: Vec<TrainingRecord>,
}

impl TrainingLog {
    pub fn new(enabled: bool) -> Self {
        TrainingLog {
            enabled,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn in_match(&self) -> bool {
        self.in_match
    }

    /// Starts a new match, discarding anything left from the last one.
    pub fn begin_match(&mut self) {
        self.records.clear();
        self.in_match = true;
    }

    /// Appends a record while enabled and in a match.
    pub fn record(&mut self, choice: [f32; NUM_CHOICES], intel: &IntelTensor) {
        if self.enabled && self.in_match {
            self.records.push(TrainingRecord {
                choice,
                intel: intel.clone(),
            });
        }
    }

    pub fn records(&self) -> &[TrainingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ends the match. On a win with collection enabled, writes the records
    /// to `<dir>/<unix-seconds>.jsonl` and returns the path.
    pub fn finish(
        &mut self,
        dir: &Path,
        outcome: Outcome,
    ) -> Result<Option<PathBuf>, TrainingError> {
        self.in_match = false;
        let records = std::mem::take(&mut self.records);
        if !self.enabled || outcome != Outcome::Victory || records.is_empty() {
            debug!(?outcome, discarded = records.len(), "training data not saved");
            return Ok(None);
        }

        fs::create_dir_all(dir).map_err(|source| TrainingError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = unused_path(dir);
        let file = File::create(&path).map_err(|source| TrainingError::Write {
            path: path.clone(),
            source,
        })?;
        let mut out = BufWriter::new(file);
        write_jsonl(&records, &mut out).map_err(|e| match e {
            TrainingError::Write { source, .. } => TrainingError::Write {
                path: path.clone(),
                source,
            },
            other => other,
        })?;
        info!(path = %path.display(), records = records.len(), "saved training data");
        Ok(Some(path))
    }
}

/// Writes records as JSON lines.
pub fn write_jsonl<W: Write>(records: &[TrainingRecord], out: &mut W) -> Result<(), TrainingError> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out).map_err(io_error)?;
    }
    out.flush().map_err(io_error)
}

fn io_error(source: std::io::Error) -> TrainingError {
    TrainingError::Write {
        path: PathBuf::new(),
        source,
    }
}

/// `<dir>/<unix-seconds>.jsonl`, suffixed when that name is taken.
fn unused_path(dir: &Path) -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut path = dir.join(format!("{secs}.jsonl"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{secs}-{n}.jsonl"));
        n += 1;
    }
    path
}
