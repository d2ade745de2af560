//! Learned engagement policy backed by an external classifier.
//!
//! The classifier scores the intel tensor; the policy picks the arg-max.
//! ONNX inference is only compiled with the `neural` feature.

use std::path::{Path, PathBuf};

#[cfg(feature = "neural")]
use ort::session::{builder::GraphOptimizationLevel, Session};
#[cfg(feature = "neural")]
use std::sync::Mutex;

use thiserror::Error;
use tracing::warn;

use super::decision::{Choice, NUM_CHOICES};
use super::policy::EngagementPolicy;
use crate::intel::IntelTensor;
use crate::world::Snapshot;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("model inference is disabled (built without the 'neural' feature)")]
    Disabled,
    #[error("model file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to load model {path}: {message}")]
    Load { path: PathBuf, message: String },
}

/// Scores an intel tensor over the engagement choices.
pub trait Classifier: Send {
    /// Returns one score per choice, or None if inference failed.
    fn scores(&self, intel: &IntelTensor) -> Option<[f32; NUM_CHOICES]>;
}

/// Policy that defers to a classifier.
pub struct LearnedPolicy {
    classifier: Box<dyn Classifier>,
}

impl LearnedPolicy {
    pub fn new(classifier: Box<dyn Classifier>) -> Self {
        LearnedPolicy { classifier }
    }
}

impl EngagementPolicy for LearnedPolicy {
    fn name(&self) -> &'static str {
        "learned"
    }

    fn decide(&mut self, _snapshot: &Snapshot, intel: &IntelTensor) -> Option<Choice> {
        match self.classifier.scores(intel) {
            Some(scores) => Some(Choice::from_scores(&scores)),
            None => {
                warn!("classifier produced no scores, holding");
                None
            }
        }
    }
}

/// ONNX model taking a `[1, H, W, 3]` f32 tensor and returning four scores.
pub struct OnnxClassifier {
    #[cfg(feature = "neural")]
    session: Mutex<Session>,
}

impl OnnxClassifier {
    /// Loads the model at `path`.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        if !path.exists() {
            return Err(ClassifierError::Missing(path.to_path_buf()));
        }

        #[cfg(feature = "neural")]
        {
            let session = Session::builder()
                .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
                .and_then(|b| b.commit_from_file(path))
                .map_err(|e| ClassifierError::Load {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            tracing::info!(path = %path.display(), "loaded engagement model");
            Ok(OnnxClassifier {
                session: Mutex::new(session),
            })
        }

        #[cfg(not(feature = "neural"))]
        {
            Err(ClassifierError::Disabled)
        }
    }
}

impl Classifier for OnnxClassifier {
    fn scores(&self, intel: &IntelTensor) -> Option<[f32; NUM_CHOICES]> {
        #[cfg(feature = "neural")]
        {
            use ort::value::Value;

            let (h, w, c) = intel.shape();
            let input = Value::from_array(([1, h, w, c], intel.to_f32_vec())).ok()?;
            let mut session = self.session.lock().ok()?;
            let outputs = session.run(ort::inputs![input]).ok()?;
            let (_shape, data) = outputs[0].try_extract_tensor::<f32>().ok()?;
            if data.len() < NUM_CHOICES {
                return None;
            }
            let mut scores = [0.0f32; NUM_CHOICES];
            scores.copy_from_slice(&data[..NUM_CHOICES]);
            Some(scores)
        }
        #[cfg(not(feature = "neural"))]
        {
            let _ = intel;
            None
        }
    }
}
