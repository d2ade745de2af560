//! Per-tick construction and production.
//!
//! Runs supply, workers, gas, expansion, the ordered build scan and army
//! training in that order. At most one new structure is started per tick;
//! gas reassignments for lost workers are not counted against that limit.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use super::gas::GasLedger;
use super::workers::nearest_free_worker;
use crate::config::ConstructionConfig;
use crate::world::{Order, Point2, Roster, Snapshot, Tag, UnitKind, Wallet};

/// Own supply cannot grow past this.
const MAX_SUPPLY: u32 = 200;

/// Idle army already this close to the rally point is left alone.
const RALLY_RADIUS: f32 = 3.0;

/// Mutable context for one scheduler pass.
struct Tick<'a> {
    snapshot: &'a Snapshot,
    wallet: &'a mut Wallet,
    orders: &'a mut Vec<Order>,
    /// Workers already given a task this tick, plus the tracked scout.
    taken: Vec<Tag>,
    /// Structures or larva already training this tick.
    trained: Vec<Tag>,
    /// A new structure has been started this tick.
    started: bool,
}

impl Tick<'_> {
    fn now(&self) -> f32 {
        self.snapshot.time()
    }
}

/// Decides what to build and train each tick.
#[derive(Debug, Clone)]
pub struct ConstructionScheduler {
    roster: Roster,
    config: ConstructionConfig,
    max_workers: u32,
    gas: GasLedger,
    /// Requested structures not yet visible, by kind, with expiry time.
    pending: HashMap<UnitKind, f32>,
}

impl ConstructionScheduler {
    pub fn new(roster: Roster, config: ConstructionConfig, max_workers: u32) -> Self {
        ConstructionScheduler {
            roster,
            config,
            max_workers,
            gas: GasLedger::new(),
            pending: HashMap::new(),
        }
    }

    pub fn gas_ledger(&self) -> &GasLedger {
        &self.gas
    }

    /// Expiry time of an outstanding request for `kind`, if any.
    pub fn pending_until(&self, kind: UnitKind) -> Option<f32> {
        self.pending.get(&kind).copied()
    }

    pub fn reset(&mut self) {
        self.gas.clear();
        self.pending.clear();
    }

    /// Runs one construction pass, appending orders.
    ///
    /// `scout` is never picked as a builder.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        snapshot: &Snapshot,
        wallet: &mut Wallet,
        rng: &mut R,
        scout: Option<Tag>,
        orders: &mut Vec<Order>,
    ) {
        let mut tick = Tick {
            snapshot,
            wallet,
            orders,
            taken: scout.into_iter().collect(),
            trained: Vec::new(),
            started: false,
        };
        let now = tick.now();
        self.pending.retain(|_, expiry| *expiry > now);

        self.build_supply(&mut tick);
        self.train_workers(&mut tick);
        self.build_gas(&mut tick);
        self.expand(&mut tick);
        self.scan_build_order(&mut tick, rng);
        self.train_army(&mut tick);
    }

    fn is_pending(&self, snapshot: &Snapshot, kind: UnitKind) -> bool {
        self.pending.contains_key(&kind) || snapshot.already_pending(kind) > 0
    }

    fn mark_pending(&mut self, kind: UnitKind, now: f32) {
        self.pending
            .insert(kind, now + self.config.pending_build_secs);
    }

    fn build_supply(&mut self, tick: &mut Tick<'_>) {
        let snap = tick.snapshot;
        let supply = self.roster.supply;
        if !supply.is_structure() {
            self.train_supply(tick);
            return;
        }
        if tick.started
            || snap.supply_left() >= self.config.supply_threshold
            || snap.supply_cap >= MAX_SUPPLY
            || self.is_pending(snap, supply)
            || !tick.wallet.can_afford(supply)
        {
            return;
        }
        let Some(hall) = snap.ready_structures_of(self.roster.townhall).next() else {
            return;
        };
        if self.start_build(tick, supply, hall.position) {
            debug!(supply_left = snap.supply_left(), "building supply");
        }
    }

    /// Supply that is a unit (overlords) is trained, not built.
    fn train_supply(&mut self, tick: &mut Tick<'_>) {
        let snap = tick.snapshot;
        let supply = self.roster.supply;
        if snap.supply_left() >= self.config.supply_threshold
            || snap.supply_cap >= MAX_SUPPLY
            || self.is_pending(snap, supply)
        {
            return;
        }
        let sources = snap.trainers(self.roster.townhall, self.roster.larva, &tick.trained);
        let Some(&source) = sources.first() else {
            return;
        };
        if tick.wallet.reserve(supply) {
            debug!(supply_left = snap.supply_left(), "training supply");
            tick.orders.push(Order::Train {
                kind: supply,
                source,
            });
            tick.trained.push(source);
            self.mark_pending(supply, tick.now());
        }
    }

    fn train_workers(&self, tick: &mut Tick<'_>) {
        let snap = tick.snapshot;
        let worker = self.roster.worker;
        let townhalls = snap.structures_of(self.roster.townhall).count() as u32;
        let mut workers = snap.units_of(worker).count() as u32;
        let wanted = townhalls * self.config.worker_multiplier;

        for source in snap.trainers(self.roster.townhall, self.roster.larva, &tick.trained) {
            if workers >= wanted || workers >= self.max_workers {
                break;
            }
            if !tick.wallet.reserve(worker) {
                break;
            }
            tick.orders.push(Order::Train {
                kind: worker,
                source,
            });
            tick.trained.push(source);
            workers += 1;
        }
    }

    fn build_gas(&mut self, tick: &mut Tick<'_>) {
        let gas = self.roster.gas;
        let worker = self.roster.worker;
        self.gas.reconcile(
            tick.snapshot,
            gas,
            worker,
            tick.wallet,
            &mut tick.taken,
            tick.orders,
        );
        if tick.started {
            return;
        }
        tick.started = self.gas.assign_new(
            tick.snapshot,
            self.roster.townhall,
            gas,
            worker,
            self.config.gas_radius,
            tick.wallet,
            &mut tick.taken,
            tick.orders,
        );
    }

    fn expand(&mut self, tick: &mut Tick<'_>) {
        let snap = tick.snapshot;
        let townhall = self.roster.townhall;
        if tick.started || self.is_pending(snap, townhall) {
            return;
        }
        let count = snap.structures_of(townhall).count() as u32;
        let by_time = (snap.minutes() / self.config.townhall_rate_minutes).floor() as u32;
        let by_sites = self
            .config
            .max_townhalls
            .min(snap.map.expansion_sites.len() as u32);
        if count >= by_time.min(by_sites) {
            return;
        }
        if tick.wallet.reserve(townhall) {
            info!(count, "expanding");
            tick.orders.push(Order::Expand);
            tick.started = true;
            self.mark_pending(townhall, tick.now());
        }
    }

    /// Walks the build order, starting at most one structure.
    fn scan_build_order<R: Rng + ?Sized>(&mut self, tick: &mut Tick<'_>, rng: &mut R) {
        if tick.started {
            return;
        }
        let snap = tick.snapshot;
        let build_order = self.roster.build_order.clone();
        let last = build_order.len().saturating_sub(1);

        for (i, &kind) in build_order.iter().enumerate() {
            if i > 0 {
                let prev = build_order[i - 1];
                if snap.ready_structures_of(prev).next().is_none() {
                    continue;
                }
            }
            if !tick.wallet.can_afford(kind) {
                continue;
            }

            let present = snap.structures_of(kind).next().is_some() || self.is_pending(snap, kind);
            let wanted = if i == last {
                let count = snap.structures_of(kind).count();
                let target =
                    (snap.minutes() / self.config.combat_build_rate_minutes).floor() as usize;
                count < target && !self.pending.contains_key(&kind)
            } else {
                !present
            };
            if !wanted {
                continue;
            }

            let Some(near) = self.placement(snap, rng) else {
                return;
            };
            if self.start_build(tick, kind, near) {
                info!(kind = ?kind, "starting structure");
            }
            return;
        }
    }

    /// A random ready supply structure to build next to.
    fn placement<R: Rng + ?Sized>(&self, snapshot: &Snapshot, rng: &mut R) -> Option<Point2> {
        let anchors: Vec<Point2> = snapshot
            .ready_structures_of(self.roster.supply)
            .map(|s| s.position)
            .collect();
        anchors.choose(rng).copied()
    }

    /// Sends the nearest free worker to build `kind` near `near`.
    fn start_build(&mut self, tick: &mut Tick<'_>, kind: UnitKind, near: Point2) -> bool {
        let Some(worker) =
            nearest_free_worker(tick.snapshot, self.roster.worker, near, &tick.taken)
        else {
            return false;
        };
        if !tick.wallet.reserve(kind) {
            return false;
        }
        tick.orders.push(Order::Build {
            kind,
            near,
            worker: worker.tag,
        });
        tick.taken.push(worker.tag);
        tick.started = true;
        self.mark_pending(kind, tick.now());
        true
    }

    fn train_army(&self, tick: &mut Tick<'_>) {
        let snap = tick.snapshot;
        let unit = self.roster.combat_unit;
        let combat_structure = self.roster.combat_structure();
        for source in snap.trainers(combat_structure, self.roster.larva, &tick.trained) {
            if !tick.wallet.reserve(unit) {
                break;
            }
            tick.orders.push(Order::Train { kind: unit, source });
            tick.trained.push(source);
        }

        let rally = snap.forward_position();
        for u in snap.units_of(unit).filter(|u| u.is_idle) {
            if u.position.distance(rally) > RALLY_RADIUS {
                tick.orders.push(Order::Move {
                    unit: u.tag,
                    dest: rally,
                    queued: false,
                });
            }
        }
    }
}
