//! Engagement policies.
//!
//! A policy turns the current snapshot (and intel tensor) into a choice,
//! or no choice when the army should simply hold. The policy is picked
//! once from configuration; see `Orchestrator::new`.

use rand::rngs::SmallRng;
use rand::Rng;

use super::decision::{Choice, NUM_CHOICES};
use crate::intel::IntelTensor;
use crate::world::{Snapshot, UnitKind};

/// Strategy interface for engagement decisions.
pub trait EngagementPolicy: Send {
    /// Short name used in logs and `hello` output.
    fn name(&self) -> &'static str;

    /// Decides this tick's posture; None holds position.
    fn decide(&mut self, snapshot: &Snapshot, intel: &IntelTensor) -> Option<Choice>;
}

/// Threshold rules on army size and enemy visibility.
#[derive(Debug, Clone)]
pub struct RuleBasedPolicy {
    combat_unit: UnitKind,
    withdraw_threshold: u32,
    attack_threshold: u32,
}

impl RuleBasedPolicy {
    pub fn new(combat_unit: UnitKind, withdraw_threshold: u32, attack_threshold: u32) -> Self {
        RuleBasedPolicy {
            combat_unit,
            withdraw_threshold,
            attack_threshold,
        }
    }
}

impl EngagementPolicy for RuleBasedPolicy {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    fn decide(&mut self, snapshot: &Snapshot, _intel: &IntelTensor) -> Option<Choice> {
        let army = snapshot.units_of(self.combat_unit).count() as u32;
        if army <= self.withdraw_threshold {
            return Some(Choice::Withdraw);
        }
        if army < self.attack_threshold {
            return None;
        }
        if snapshot.enemy_units.iter().any(|u| !u.is_cloaked) {
            Some(Choice::AttackVisibleUnits)
        } else if !snapshot.enemy_structures.is_empty() {
            Some(Choice::AttackVisibleStructures)
        } else {
            Some(Choice::AttackStartLocation)
        }
    }
}

/// Uniformly random choice every tick.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: SmallRng,
}

impl RandomPolicy {
    pub fn new(rng: SmallRng) -> Self {
        RandomPolicy { rng }
    }
}

impl EngagementPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decide(&mut self, _snapshot: &Snapshot, _intel: &IntelTensor) -> Option<Choice> {
        Choice::from_index(self.rng.gen_range(0..NUM_CHOICES))
    }
}
