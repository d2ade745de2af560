//! Engagement choices and their resolved targets.

use serde::{Deserialize, Serialize};

use crate::world::{Point2, Snapshot};

/// Number of engagement choices; length of the one-hot vector.
pub const NUM_CHOICES: usize = 4;

/// Combat posture for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    Withdraw,
    AttackVisibleUnits,
    AttackVisibleStructures,
    AttackStartLocation,
}

impl Choice {
    /// All choices in one-hot slot order.
    pub const ALL: [Choice; NUM_CHOICES] = [
        Choice::Withdraw,
        Choice::AttackVisibleUnits,
        Choice::AttackVisibleStructures,
        Choice::AttackStartLocation,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Choice> {
        Self::ALL.get(index).copied()
    }

    pub fn one_hot(self) -> [f32; NUM_CHOICES] {
        let mut v = [0.0; NUM_CHOICES];
        v[self.index()] = 1.0;
        v
    }

    /// Arg-max over a score vector; the first index wins ties.
    pub fn from_scores(scores: &[f32; NUM_CHOICES]) -> Choice {
        let mut best = 0;
        for (i, &s) in scores.iter().enumerate().skip(1) {
            if s > scores[best] {
                best = i;
            }
        }
        Self::ALL[best]
    }

    pub fn is_attack(self) -> bool {
        self != Choice::Withdraw
    }

    pub fn name(self) -> &'static str {
        match self {
            Choice::Withdraw => "withdraw",
            Choice::AttackVisibleUnits => "attack_visible_units",
            Choice::AttackVisibleStructures => "attack_visible_structures",
            Choice::AttackStartLocation => "attack_start_location",
        }
    }
}

/// A choice together with where it sends the army.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementDecision {
    pub choice: Choice,
    pub target: Option<Point2>,
    /// A target was found for the choice.
    pub found: bool,
}

impl EngagementDecision {
    /// Resolves `choice` to a target position in `snapshot`.
    ///
    /// Attacks are ranked from the forward position: the own structure
    /// furthest from home, or home when we have none.
    pub fn resolve(choice: Choice, snapshot: &Snapshot) -> Self {
        let forward = snapshot.forward_position();
        let target = match choice {
            Choice::Withdraw => Some(forward),
            Choice::AttackVisibleUnits => forward.closest(
                snapshot
                    .enemy_units
                    .iter()
                    .filter(|u| !u.is_cloaked)
                    .map(|u| u.position),
            ),
            Choice::AttackVisibleStructures => {
                let main_base = forward.closest(
                    snapshot
                        .enemy_structures
                        .iter()
                        .filter(|s| s.kind.is_townhall())
                        .map(|s| s.position),
                );
                main_base.or_else(|| {
                    forward.closest(snapshot.enemy_structures.iter().map(|s| s.position))
                })
            }
            Choice::AttackStartLocation => snapshot.map.enemy_start_locations.first().copied(),
        };
        EngagementDecision {
            choice,
            target,
            found: target.is_some(),
        }
    }

    pub fn one_hot(&self) -> [f32; NUM_CHOICES] {
        self.choice.one_hot()
    }
}
