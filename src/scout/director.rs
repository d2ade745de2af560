//! Scouting state machine.
//!
//! Tracks one scout across ticks, sends it to the next unexplored site,
//! and falls back to a home-then-wander pattern when every site is
//! already covered by friendly presence.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use super::sites::{candidate_sites, dynamic_threshold, next_index, viable_indices};
use crate::config::ScoutConfig;
use crate::world::{Order, Point2, Roster, Snapshot, Tag, Unit, UnitKind, Wallet};

/// Coarse scouting phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoutPhase {
    /// No live scout to track.
    #[default]
    NoScout,
    /// Pursuing a viable site.
    Seeking,
    /// Every site is covered; idling at home or wandering.
    Saturated,
}

/// Scouting ledger, owned by the director for the whole match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoutState {
    pub scout_tag: Option<Tag>,
    pub death_count: u32,
    pub target_index: usize,
    pub target_location: Option<Point2>,
    /// Game time (seconds) at which saturation began.
    pub saturated_since: Option<f32>,
    pub saturated_queue: VecDeque<Point2>,
}

/// Decides where the scout goes each tick.
#[derive(Debug, Clone)]
pub struct ScoutDirector {
    scout_kind: UnitKind,
    source_kind: UnitKind,
    larva: Option<UnitKind>,
    worker_mode: bool,
    min_distance: f32,
    max_distance: f32,
    saturation_timeout: f32,
    phase: ScoutPhase,
    state: ScoutState,
}

impl ScoutDirector {
    pub fn new(roster: &Roster, config: &ScoutConfig, use_worker: bool) -> Self {
        ScoutDirector {
            scout_kind: roster.scout_kind(use_worker),
            source_kind: roster.scout_source_kind(use_worker),
            larva: roster.larva,
            worker_mode: use_worker,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            saturation_timeout: config.saturation_timeout,
            phase: ScoutPhase::NoScout,
            state: ScoutState::default(),
        }
    }

    pub fn state(&self) -> &ScoutState {
        &self.state
    }

    pub fn phase(&self) -> ScoutPhase {
        self.phase
    }

    /// Current viability distance.
    pub fn threshold(&self) -> f32 {
        dynamic_threshold(self.min_distance, self.max_distance, self.state.death_count)
    }

    /// Clears all scouting state for a new match.
    pub fn reset(&mut self) {
        self.phase = ScoutPhase::NoScout;
        self.state = ScoutState::default();
    }

    /// Runs one tick of scouting.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        snapshot: &Snapshot,
        wallet: &mut Wallet,
        rng: &mut R,
        orders: &mut Vec<Order>,
    ) {
        let scouts: Vec<&Unit> = snapshot.units_of(self.scout_kind).collect();
        if scouts.is_empty() {
            self.phase = ScoutPhase::NoScout;
            self.request_scout(snapshot, wallet, orders);
            return;
        }

        let scout = match self
            .state
            .scout_tag
            .and_then(|tag| scouts.iter().find(|u| u.tag == tag))
        {
            Some(u) => *u,
            None => self.adopt(scouts[0]),
        };

        let sites = candidate_sites(snapshot);
        if sites.is_empty() {
            return;
        }

        let threshold = self.threshold();
        let viable = viable_indices(snapshot, &sites, threshold);
        if viable.is_empty() {
            self.saturated(snapshot, scout, &sites, rng, orders);
            return;
        }

        if self.phase == ScoutPhase::Saturated {
            debug!("scouting sites opened up again");
            self.state.saturated_since = None;
            self.state.target_location = None;
        }
        self.phase = ScoutPhase::Seeking;

        let arrived = self
            .state
            .target_location
            .map_or(true, |t| scout.position.distance(t) <= threshold);
        if arrived {
            if let Some(index) = next_index(&viable, self.state.target_index) {
                let site = sites[index];
                debug!(index, x = site.x, y = site.y, "scout retargeted");
                self.state.target_index = index;
                self.state.target_location = Some(site);
                orders.push(move_to(scout.tag, site));
            }
        } else if let Some(target) = self.state.target_location {
            if self.needs_reissue(scout) {
                orders.push(move_to(scout.tag, target));
            }
        }
    }

    /// Starts tracking `scout`, counting a loss if we were tracking another.
    fn adopt<'a>(&mut self, scout: &'a Unit) -> &'a Unit {
        if self.state.scout_tag.is_some() {
            self.state.death_count += 1;
            info!(
                deaths = self.state.death_count,
                threshold = self.threshold(),
                "scout lost"
            );
        }
        self.state.scout_tag = Some(scout.tag);
        self.state.target_location = None;
        scout
    }

    fn request_scout(&self, snapshot: &Snapshot, wallet: &mut Wallet, orders: &mut Vec<Order>) {
        if snapshot.already_pending(self.scout_kind) > 0 {
            return;
        }
        let sources = snapshot.trainers(self.source_kind, self.larva, &[]);
        let Some(&source) = sources.first() else {
            return;
        };
        if wallet.reserve(self.scout_kind) {
            debug!(kind = ?self.scout_kind, "training scout");
            orders.push(Order::Train {
                kind: self.scout_kind,
                source,
            });
        }
    }

    fn saturated<R: Rng + ?Sized>(
        &mut self,
        snapshot: &Snapshot,
        scout: &Unit,
        sites: &[Point2],
        rng: &mut R,
        orders: &mut Vec<Order>,
    ) {
        let now = snapshot.time();
        if self.phase != ScoutPhase::Saturated {
            info!("scouting saturated, returning home");
            self.phase = ScoutPhase::Saturated;
        }
        let since = *self.state.saturated_since.get_or_insert(now);
        if self.state.saturated_queue.is_empty() {
            self.refill_queue(sites, rng);
        }

        let home = snapshot.home();
        if now - since < self.saturation_timeout {
            if self.state.target_location != Some(home) || self.needs_reissue(scout) {
                self.state.target_location = Some(home);
                orders.push(move_to(scout.tag, home));
            }
            return;
        }

        if self.state.saturated_queue.is_empty() {
            self.refill_queue(sites, rng);
        }
        if let Some(site) = self.state.saturated_queue.pop_front() {
            debug!(x = site.x, y = site.y, "saturated scout wandering");
            self.state.target_location = Some(site);
            orders.push(move_to(scout.tag, site));
        }
    }

    fn refill_queue<R: Rng + ?Sized>(&mut self, sites: &[Point2], rng: &mut R) {
        let mut shuffled = sites.to_vec();
        shuffled.shuffle(rng);
        self.state.saturated_queue = shuffled.into();
    }

    /// An idle scout, or a worker scout pulled back to mining, needs its
    /// move order again.
    fn needs_reissue(&self, scout: &Unit) -> bool {
        scout.is_idle || (self.worker_mode && scout.is_collecting)
    }
}

fn move_to(unit: Tag, dest: Point2) -> Order {
    Order::Move {
        unit,
        dest,
        queued: false,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::test_support::{self, ENEMY_START, HOME};
    use crate::world::Race;

    fn director() -> ScoutDirector {
        let roster = Roster::for_race(Race::Protoss);
        ScoutDirector::new(&roster, &ScoutConfig::default(), false)
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    fn step(d: &mut ScoutDirector, snap: &Snapshot) -> Vec<Order> {
        let mut wallet = Wallet::from_snapshot(snap);
        let mut orders = Vec::new();
        d.step(snap, &mut wallet, &mut rng(), &mut orders);
        orders
    }

    fn with_observer(seconds: f32, x: f32, y: f32) -> Snapshot {
        let mut snap = test_support::snapshot_at(seconds);
        snap.units
            .push(test_support::unit(50, UnitKind::Observer, x, y).busy());
        snap
    }

    fn dest(order: &Order) -> Point2 {
        match order {
            Order::Move { dest, queued, .. } => {
                assert!(!queued);
                *dest
            }
            other => panic!("expected move, got {other:?}"),
        }
    }

    #[test]
    fn trains_scout_from_idle_source_when_affordable() {
        let mut d = director();
        let mut snap = test_support::snapshot();
        snap.minerals = 100;
        snap.vespene = 100;
        snap.structures
            .push(test_support::unit(7, UnitKind::RoboticsFacility, 40.0, 40.0));
        let orders = step(&mut d, &snap);
        assert_eq!(
            orders,
            vec![Order::Train {
                kind: UnitKind::Observer,
                source: 7
            }]
        );
        assert_eq!(d.phase(), ScoutPhase::NoScout);
    }

    #[test]
    fn zerg_scout_comes_from_larva_near_hatchery() {
        let roster = Roster::for_race(Race::Zerg);
        let mut d = ScoutDirector::new(&roster, &ScoutConfig::default(), false);
        let mut snap = test_support::snapshot();
        snap.minerals = 100;
        snap.structures = vec![test_support::unit(1, UnitKind::Hatchery, 30.0, 30.0).busy()];
        snap.units = vec![
            test_support::unit(20, UnitKind::Larva, 50.0, 50.0),
            test_support::unit(21, UnitKind::Larva, 32.0, 30.0),
        ];
        let orders = step(&mut d, &snap);
        assert_eq!(
            orders,
            vec![Order::Train {
                kind: UnitKind::Overlord,
                source: 21
            }]
        );
    }

    #[test]
    fn no_scout_without_source_or_funds() {
        let mut d = director();
        let mut snap = test_support::snapshot();
        assert!(step(&mut d, &snap).is_empty());
        snap.structures
            .push(test_support::unit(7, UnitKind::RoboticsFacility, 40.0, 40.0));
        assert!(step(&mut d, &snap).is_empty());
    }

    #[test]
    fn skips_training_when_scout_already_pending() {
        let mut d = director();
        let mut snap = test_support::snapshot();
        snap.minerals = 100;
        snap.vespene = 100;
        snap.in_flight.insert(UnitKind::Observer, 1);
        snap.structures
            .push(test_support::unit(7, UnitKind::RoboticsFacility, 40.0, 40.0));
        assert!(step(&mut d, &snap).is_empty());
    }

    #[test]
    fn first_assignment_takes_next_viable_index() {
        let mut d = director();
        let snap = with_observer(10.0, 35.0, 35.0);
        let orders = step(&mut d, &snap);
        // Sites are [enemy start, (60,30), (100,90)]; the first pick is
        // the smallest viable index after 0.
        assert_eq!(orders.len(), 1);
        assert_eq!(dest(&orders[0]), Point2::new(60.0, 30.0));
        assert_eq!(d.state().target_index, 1);
        assert_eq!(d.state().scout_tag, Some(50));
        assert_eq!(d.phase(), ScoutPhase::Seeking);
    }

    #[test]
    fn keeps_target_while_en_route() {
        let mut d = director();
        step(&mut d, &with_observer(10.0, 35.0, 35.0));
        let orders = step(&mut d, &with_observer(11.0, 45.0, 32.0));
        assert!(orders.is_empty());
        assert_eq!(d.state().target_index, 1);
    }

    #[test]
    fn idle_scout_gets_order_again() {
        let mut d = director();
        step(&mut d, &with_observer(10.0, 35.0, 35.0));
        let mut snap = with_observer(11.0, 45.0, 32.0);
        snap.units[0].is_idle = true;
        let orders = step(&mut d, &snap);
        assert_eq!(orders.len(), 1);
        assert_eq!(dest(&orders[0]), Point2::new(60.0, 30.0));
    }

    #[test]
    fn arrival_advances_and_wraps() {
        let mut d = director();
        step(&mut d, &with_observer(10.0, 35.0, 35.0));

        // At (60,30): index 1 is covered by the scout, next is 2.
        let orders = step(&mut d, &with_observer(20.0, 60.0, 30.0));
        assert_eq!(dest(&orders[0]), Point2::new(100.0, 90.0));
        assert_eq!(d.state().target_index, 2);

        // At (100,90): index 2 covered, nothing after it, wrap to 0.
        let orders = step(&mut d, &with_observer(30.0, 100.0, 90.0));
        assert_eq!(dest(&orders[0]), ENEMY_START);
        assert_eq!(d.state().target_index, 0);
    }

    #[test]
    fn replacement_scout_counts_a_death() {
        let mut d = director();
        step(&mut d, &with_observer(10.0, 35.0, 35.0));
        assert_eq!(d.state().death_count, 0);

        let mut snap = test_support::snapshot_at(20.0);
        snap.units
            .push(test_support::unit(51, UnitKind::Observer, 35.0, 35.0).busy());
        let orders = step(&mut d, &snap);
        assert_eq!(d.state().death_count, 1);
        assert_eq!(d.state().scout_tag, Some(51));
        assert_eq!(d.threshold(), 11.0);
        // Retargets on adoption: next viable after index 1.
        assert_eq!(dest(&orders[0]), Point2::new(100.0, 90.0));
    }

    #[test]
    fn scout_death_then_gap_still_counts_once() {
        let mut d = director();
        step(&mut d, &with_observer(10.0, 35.0, 35.0));
        step(&mut d, &test_support::snapshot_at(15.0));
        assert_eq!(d.phase(), ScoutPhase::NoScout);
        assert_eq!(d.state().death_count, 0);

        let mut snap = test_support::snapshot_at(20.0);
        snap.units
            .push(test_support::unit(52, UnitKind::Observer, 35.0, 35.0).busy());
        step(&mut d, &snap);
        assert_eq!(d.state().death_count, 1);
    }

    fn saturated_snapshot(seconds: f32, scout_at: Point2) -> Snapshot {
        let mut snap = with_observer(seconds, scout_at.x, scout_at.y);
        let sites = candidate_sites(&snap);
        for (i, site) in sites.iter().enumerate() {
            snap.units.push(
                test_support::unit(200 + i as u64, UnitKind::Probe, site.x, site.y).busy(),
            );
        }
        snap
    }

    #[test]
    fn saturation_goes_home_then_wanders_after_timeout() {
        let mut d = director();

        let orders = step(&mut d, &saturated_snapshot(100.0, Point2::new(80.0, 60.0)));
        assert_eq!(d.phase(), ScoutPhase::Saturated);
        assert_eq!(orders.len(), 1);
        assert_eq!(dest(&orders[0]), HOME);
        assert_eq!(d.state().saturated_since, Some(test_support::snapshot_at(100.0).time()));
        assert_eq!(d.state().saturated_queue.len(), 3);

        // En route home: no repeated orders before the timeout.
        let orders = step(&mut d, &saturated_snapshot(110.0, Point2::new(60.0, 50.0)));
        assert!(orders.is_empty());
        let orders = step(&mut d, &saturated_snapshot(125.0, Point2::new(40.0, 40.0)));
        assert!(orders.is_empty());

        // Timeout elapsed: pop the first shuffled site.
        let orders = step(&mut d, &saturated_snapshot(131.0, Point2::new(31.0, 31.0)));
        assert_eq!(orders.len(), 1);
        let target = dest(&orders[0]);
        assert_ne!(target, HOME);
        assert!(candidate_sites(&test_support::snapshot()).contains(&target));
        assert_eq!(d.state().saturated_queue.len(), 2);
    }

    #[test]
    fn saturation_queue_reshuffles_when_exhausted() {
        let mut d = director();
        step(&mut d, &saturated_snapshot(100.0, Point2::new(80.0, 60.0)));
        let mut scout_at = Point2::new(31.0, 31.0);
        for i in 0..4 {
            let orders = step(&mut d, &saturated_snapshot(131.0 + i as f32, scout_at));
            assert_eq!(orders.len(), 1);
            scout_at = dest(&orders[0]);
        }
        // Three sites popped, then a refill and one more pop.
        assert_eq!(d.state().saturated_queue.len(), 2);
    }

    #[test]
    fn saturated_scout_takes_a_site_every_tick_while_travelling() {
        let mut d = director();
        step(&mut d, &saturated_snapshot(100.0, Point2::new(80.0, 60.0)));

        let first = step(&mut d, &saturated_snapshot(131.0, Point2::new(31.0, 31.0)));
        assert_eq!(first.len(), 1);
        assert_eq!(d.state().saturated_queue.len(), 2);

        // Still busy and far from the first wander site.
        let second = step(&mut d, &saturated_snapshot(132.0, Point2::new(45.0, 45.0)));
        assert_eq!(second.len(), 1);
        assert_eq!(d.state().saturated_queue.len(), 1);
        assert_ne!(dest(&first[0]), dest(&second[0]));
        assert_eq!(d.state().target_location, Some(dest(&second[0])));
    }

    #[test]
    fn leaving_saturation_resets_timer_and_retargets() {
        let mut d = director();
        step(&mut d, &saturated_snapshot(100.0, Point2::new(80.0, 60.0)));
        let orders = step(&mut d, &with_observer(105.0, 50.0, 40.0));
        assert_eq!(d.phase(), ScoutPhase::Seeking);
        assert_eq!(d.state().saturated_since, None);
        assert_eq!(orders.len(), 1);
    }

    #[test]
    fn worker_scout_pulled_to_mining_is_resent() {
        let roster = Roster::for_race(Race::Protoss);
        let mut d = ScoutDirector::new(&roster, &ScoutConfig::default(), true);
        let mut snap = test_support::snapshot_at(10.0);
        snap.units
            .push(test_support::unit(60, UnitKind::Probe, 35.0, 35.0).busy());
        let orders = step(&mut d, &snap);
        assert_eq!(dest(&orders[0]), Point2::new(60.0, 30.0));

        let mut snap = test_support::snapshot_at(11.0);
        snap.units
            .push(test_support::unit(60, UnitKind::Probe, 36.0, 34.0).collecting());
        let orders = step(&mut d, &snap);
        assert_eq!(orders.len(), 1);
        assert_eq!(dest(&orders[0]), Point2::new(60.0, 30.0));
    }

    #[test]
    fn target_index_stays_valid_as_sites_shrink() {
        let mut d = director();
        step(&mut d, &with_observer(10.0, 35.0, 35.0));
        step(&mut d, &with_observer(20.0, 60.0, 30.0));
        assert_eq!(d.state().target_index, 2);

        // A new townhall at (100,90) removes that site.
        let mut snap = with_observer(30.0, 100.0, 90.0);
        snap.structures
            .push(test_support::unit(80, UnitKind::Nexus, 100.0, 90.0));
        let sites = candidate_sites(&snap);
        assert_eq!(sites.len(), 2);
        step(&mut d, &snap);
        assert!(d.state().target_index % sites.len() < sites.len());
    }

    #[test]
    fn reset_clears_state() {
        let mut d = director();
        step(&mut d, &with_observer(10.0, 35.0, 35.0));
        d.reset();
        assert_eq!(d.state(), &ScoutState::default());
        assert_eq!(d.phase(), ScoutPhase::NoScout);
    }
}
