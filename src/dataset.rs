//! Offline preparation of captured training data.
//!
//! Loads every `.jsonl` file written by `TrainingLog`, groups records by
//! their engagement choice, and balances the groups so no single choice
//! dominates a training set.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::engagement::{Choice, NUM_CHOICES};
use crate::training::{write_jsonl, TrainingError, TrainingRecord};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Training(#[from] TrainingError),
}

/// Training records bucketed by choice.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    buckets: [Vec<TrainingRecord>; NUM_CHOICES],
}

impl Dataset {
    pub fn from_records<I: IntoIterator<Item = TrainingRecord>>(records: I) -> Self {
        let mut ds = Dataset::default();
        for r in records {
            ds.buckets[r.label()].push(r);
        }
        ds
    }

    /// Loads all `.jsonl` files in `dir`, in parallel.
    pub fn load_dir(dir: &Path) -> Result<Self, DatasetError> {
        let files = jsonl_files(dir)?;
        info!(dir = %dir.display(), files = files.len(), "loading training data");
        let per_file: Vec<Vec<TrainingRecord>> = files
            .par_iter()
            .map(|p| load_file(p))
            .collect::<Result<_, _>>()?;
        Ok(Self::from_records(per_file.into_iter().flatten()))
    }

    /// Record count per choice, in one-hot slot order.
    pub fn counts(&self) -> [usize; NUM_CHOICES] {
        let mut counts = [0; NUM_CHOICES];
        for (c, b) in counts.iter_mut().zip(&self.buckets) {
            *c = b.len();
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket(&self, choice: Choice) -> &[TrainingRecord] {
        &self.buckets[choice.index()]
    }

    /// Shuffles each bucket and truncates all of them to the smallest.
    pub fn balance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let lowest = self.buckets.iter().map(Vec::len).min().unwrap_or(0);
        for b in &mut self.buckets {
            b.shuffle(rng);
            b.truncate(lowest);
        }
        debug!(per_choice = lowest, "balanced dataset");
    }

    /// All records in one shuffled list.
    pub fn into_shuffled<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<TrainingRecord> {
        let mut all: Vec<TrainingRecord> = self.buckets.into_iter().flatten().collect();
        all.shuffle(rng);
        all
    }
}

/// Writes records to `path` as JSON lines.
pub fn write_file(path: &Path, records: &[TrainingRecord]) -> Result<(), DatasetError> {
    let file = File::create(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_jsonl(records, &mut BufWriter::new(file))?;
    Ok(())
}

fn jsonl_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let io_err = |source| DatasetError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|e| e == "jsonl") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn load_file(path: &Path) -> Result<Vec<TrainingRecord>, DatasetError> {
    let io_err = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| DatasetError::Parse {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
