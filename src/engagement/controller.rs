//! Applies policy decisions to the army.

use tracing::{debug, info};

use super::decision::{Choice, EngagementDecision};
use super::policy::EngagementPolicy;
use crate::intel::IntelTensor;
use crate::training::TrainingLog;
use crate::world::{Order, Point2, Snapshot, Tag, Target, UnitKind};

/// Owns the policy plus the withdraw window and last decision.
pub struct Engagement {
    policy: Box<dyn EngagementPolicy>,
    combat_unit: UnitKind,
    withdraw_hold: f32,
    /// Game time before which a withdrawal stands.
    resume_at: Option<f32>,
    previous: Option<EngagementDecision>,
}

impl Engagement {
    pub fn new(
        policy: Box<dyn EngagementPolicy>,
        combat_unit: UnitKind,
        withdraw_hold: f32,
    ) -> Self {
        Engagement {
            policy,
            combat_unit,
            withdraw_hold,
            resume_at: None,
            previous: None,
        }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn previous(&self) -> Option<&EngagementDecision> {
        self.previous.as_ref()
    }

    pub fn resume_at(&self) -> Option<f32> {
        self.resume_at
    }

    pub fn reset(&mut self) {
        self.resume_at = None;
        self.previous = None;
    }

    /// Runs the policy and issues army orders. Returns the executed
    /// decision, or None when the army holds.
    pub fn step(
        &mut self,
        snapshot: &Snapshot,
        intel: &IntelTensor,
        training: &mut TrainingLog,
        orders: &mut Vec<Order>,
    ) -> Option<EngagementDecision> {
        let choice = self.policy.decide(snapshot, intel)?;
        let now = snapshot.time();

        if choice == Choice::Withdraw {
            if self.resume_at.map_or(true, |t| now >= t) {
                self.resume_at = Some(now + self.withdraw_hold);
            }
        } else if let Some(t) = self.resume_at {
            if now < t {
                debug!(choice = choice.name(), resume_at = t, "withdrawal still in effect");
                return None;
            }
        }

        let decision = EngagementDecision::resolve(choice, snapshot);
        if let Some(target) = decision.target {
            self.issue(snapshot, choice, target, orders);
        }
        training.record(decision.one_hot(), intel);

        if self.previous != Some(decision) {
            info!(
                choice = choice.name(),
                found = decision.found,
                x = decision.target.map(|t| t.x),
                y = decision.target.map(|t| t.y),
                "engagement decision"
            );
        }
        self.previous = Some(decision);
        Some(decision)
    }

    fn issue(&self, snapshot: &Snapshot, choice: Choice, target: Point2, orders: &mut Vec<Order>) {
        let army = snapshot.units_of(self.combat_unit);
        if choice.is_attack() {
            let idle: Vec<Tag> = army.filter(|u| u.is_idle).map(|u| u.tag).collect();
            orders.extend(idle.into_iter().map(|unit| Order::Attack {
                unit,
                target: Target::Position(target),
                queued: false,
            }));
        } else {
            orders.extend(army.map(|u| Order::Move {
                unit: u.tag,
                dest: target,
                queued: false,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::RuleBasedPolicy;
    use crate::test_support::{self, ENEMY_START, HOME};

    /// Replays a fixed list of choices.
    struct Scripted(Vec<Option<Choice>>);

    impl EngagementPolicy for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn decide(&mut self, _snapshot: &Snapshot, _intel: &IntelTensor) -> Option<Choice> {
            if self.0.is_empty() {
                None
            } else {
                self.0.remove(0)
            }
        }
    }

    fn army_at(seconds: f32, n: u64) -> Snapshot {
        let mut snap = test_support::snapshot_at(seconds);
        for i in 0..n {
            let u = test_support::unit(100 + i, UnitKind::VoidRay, 60.0, 60.0);
            snap.units.push(if i % 2 == 0 { u } else { u.busy() });
        }
        snap
    }

    fn run(
        e: &mut Engagement,
        snap: &Snapshot,
        log: &mut TrainingLog,
    ) -> (Option<EngagementDecision>, Vec<Order>) {
        let mut orders = Vec::new();
        let d = e.step(snap, &IntelTensor::zeros(2, 2), log, &mut orders);
        (d, orders)
    }

    fn scripted(choices: Vec<Option<Choice>>) -> Engagement {
        Engagement::new(Box::new(Scripted(choices)), UnitKind::VoidRay, 15.0)
    }

    #[test]
    fn attack_orders_go_to_idle_units_only() {
        let mut e = scripted(vec![Some(Choice::AttackStartLocation)]);
        let mut log = TrainingLog::new(false);
        let (d, orders) = run(&mut e, &army_at(10.0, 4), &mut log);
        assert_eq!(d.map(|d| d.target), Some(Some(ENEMY_START)));
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| matches!(
            o,
            Order::Attack { target: Target::Position(p), queued: false, .. } if *p == ENEMY_START
        )));
    }

    #[test]
    fn withdraw_moves_whole_army_home() {
        let mut e = scripted(vec![Some(Choice::Withdraw)]);
        let mut log = TrainingLog::new(false);
        let (d, orders) = run(&mut e, &army_at(10.0, 4), &mut log);
        assert_eq!(d.map(|d| d.choice), Some(Choice::Withdraw));
        assert_eq!(orders.len(), 4);
        assert!(orders
            .iter()
            .all(|o| matches!(o, Order::Move { dest, .. } if *dest == HOME)));
    }

    #[test]
    fn withdraw_window_is_not_extended() {
        let mut e = scripted(vec![
            Some(Choice::Withdraw),
            Some(Choice::Withdraw),
            Some(Choice::AttackStartLocation),
            Some(Choice::AttackStartLocation),
        ]);
        let mut log = TrainingLog::new(false);
        run(&mut e, &army_at(10.0, 2), &mut log);
        let first = e.resume_at();
        run(&mut e, &army_at(20.0, 2), &mut log);
        assert_eq!(e.resume_at(), first);

        let (d, orders) = run(&mut e, &army_at(24.0, 2), &mut log);
        assert!(d.is_none());
        assert!(orders.is_empty());

        let (d, _) = run(&mut e, &army_at(26.0, 2), &mut log);
        assert_eq!(d.map(|d| d.choice), Some(Choice::AttackStartLocation));
    }

    #[test]
    fn withdraw_after_expiry_starts_new_window() {
        let mut e = scripted(vec![Some(Choice::Withdraw), Some(Choice::Withdraw)]);
        let mut log = TrainingLog::new(false);
        run(&mut e, &army_at(10.0, 2), &mut log);
        let first = e.resume_at().unwrap();
        run(&mut e, &army_at(30.0, 2), &mut log);
        assert!(e.resume_at().unwrap() > first);
    }

    #[test]
    fn records_training_data_when_enabled() {
        let mut e = scripted(vec![Some(Choice::AttackStartLocation), None]);
        let mut log = TrainingLog::new(true);
        log.begin_match();
        run(&mut e, &army_at(10.0, 2), &mut log);
        run(&mut e, &army_at(11.0, 2), &mut log);
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].label(), Choice::AttackStartLocation.index());
    }

    #[test]
    fn unresolved_target_still_recorded() {
        let mut e = scripted(vec![Some(Choice::AttackVisibleUnits)]);
        let mut log = TrainingLog::new(true);
        log.begin_match();
        let (d, orders) = run(&mut e, &army_at(10.0, 2), &mut log);
        assert_eq!(d.map(|d| d.found), Some(false));
        assert!(orders.is_empty());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn previous_decision_is_cached() {
        let mut e = scripted(vec![Some(Choice::AttackStartLocation)]);
        let mut log = TrainingLog::new(false);
        run(&mut e, &army_at(10.0, 1), &mut log);
        assert_eq!(
            e.previous().map(|d| d.choice),
            Some(Choice::AttackStartLocation)
        );
        e.reset();
        assert!(e.previous().is_none());
    }

    #[test]
    fn rule_based_attacks_nearest_visible_unit() {
        let policy = RuleBasedPolicy::new(UnitKind::VoidRay, 4, 6);
        let mut e = Engagement::new(Box::new(policy), UnitKind::VoidRay, 15.0);
        let mut snap = army_at(10.0, 10);
        snap.structures
            .push(test_support::unit(2, UnitKind::Pylon, 80.0, 80.0));
        snap.enemy_units = vec![
            test_support::unit(900, UnitKind::Reaper, 150.0, 150.0),
            test_support::unit(901, UnitKind::Reaper, 100.0, 100.0),
            test_support::unit(902, UnitKind::Banshee, 82.0, 82.0).cloaked(),
        ];
        let mut log = TrainingLog::new(false);
        let (d, orders) = run(&mut e, &snap, &mut log);
        let d = d.unwrap();
        assert_eq!(d.choice, Choice::AttackVisibleUnits);
        assert_eq!(d.target, Some(Point2::new(100.0, 100.0)));
        assert_eq!(orders.len(), 5);
    }
}
