//! Engagement: when to fight, where, and with what policy.

pub mod controller;
pub mod decision;
pub mod learned;
pub mod policy;

pub use controller::Engagement;
pub use decision::{Choice, EngagementDecision, NUM_CHOICES};
pub use learned::{Classifier, ClassifierError, LearnedPolicy, OnnxClassifier};
pub use policy::{EngagementPolicy, RandomPolicy, RuleBasedPolicy};
