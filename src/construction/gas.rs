//! Gas-structure ledger.
//!
//! A gas structure is built by sending a worker to a geyser. The worker can
//! die on the way, so each request is remembered until the structure shows
//! up in a snapshot, and reassigned when its worker disappears.

use tracing::{debug, info};

use super::workers::nearest_free_worker;
use crate::world::{Order, Point2, Snapshot, Tag, UnitKind, Wallet};

/// A gas structure within this distance of a geyser stands on it.
const ON_GEYSER_RADIUS: f32 = 1.5;

/// Reassignments allowed before a request is abandoned.
pub const MAX_GAS_RETRIES: u32 = 3;

/// One outstanding gas-structure request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingGas {
    pub geyser: Point2,
    pub worker: Tag,
    pub retries: u32,
}

/// Outstanding gas requests keyed by geyser position.
#[derive(Debug, Clone, Default)]
pub struct GasLedger {
    entries: Vec<PendingGas>,
}

impl GasLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PendingGas] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// True if a request exists for the geyser at `position`.
    pub fn contains(&self, position: Point2) -> bool {
        self.entries
            .iter()
            .any(|e| e.geyser.distance(position) < ON_GEYSER_RADIUS)
    }

    /// Workers currently assigned to a gas request.
    pub fn workers(&self) -> impl Iterator<Item = Tag> + '_ {
        self.entries.iter().map(|e| e.worker)
    }

    /// Settles outstanding requests against the snapshot.
    ///
    /// Confirmed structures close their entry. Entries whose worker vanished
    /// get a new worker when funds allow; entries whose geyser vanished, or
    /// that ran out of retries, are dropped.
    pub fn reconcile(
        &mut self,
        snapshot: &Snapshot,
        gas: UnitKind,
        worker: UnitKind,
        wallet: &mut Wallet,
        taken: &mut Vec<Tag>,
        orders: &mut Vec<Order>,
    ) {
        taken.extend(self.workers());
        let mut i = 0;
        while i < self.entries.len() {
            let entry = self.entries[i];
            if has_gas_structure(snapshot, gas, entry.geyser) {
                debug!(x = entry.geyser.x, y = entry.geyser.y, "gas structure confirmed");
                self.entries.remove(i);
                continue;
            }
            if snapshot.unit_by_tag(entry.worker).is_some() || !wallet.can_afford(gas) {
                i += 1;
                continue;
            }
            let Some(geyser) = find_geyser(snapshot, entry.geyser) else {
                debug!(x = entry.geyser.x, y = entry.geyser.y, "geyser gone, dropping request");
                self.entries.remove(i);
                continue;
            };
            if entry.retries >= MAX_GAS_RETRIES {
                info!(x = geyser.x, y = geyser.y, "giving up on gas structure");
                self.entries.remove(i);
                continue;
            }
            if let Some(w) = nearest_free_worker(snapshot, worker, geyser, taken) {
                if wallet.reserve(gas) {
                    info!(worker = w.tag, lost = entry.worker, "reassigning gas structure");
                    orders.push(Order::Build {
                        kind: gas,
                        near: geyser,
                        worker: w.tag,
                    });
                    taken.push(w.tag);
                    self.entries[i] = PendingGas {
                        geyser,
                        worker: w.tag,
                        retries: entry.retries + 1,
                    };
                }
            }
            i += 1;
        }
    }

    /// Requests a gas structure on one unclaimed geyser near a ready
    /// townhall. Returns true if an order was issued.
    #[allow(clippy::too_many_arguments)]
    pub fn assign_new(
        &mut self,
        snapshot: &Snapshot,
        townhall: UnitKind,
        gas: UnitKind,
        worker: UnitKind,
        radius: f32,
        wallet: &mut Wallet,
        taken: &mut Vec<Tag>,
        orders: &mut Vec<Order>,
    ) -> bool {
        for hall in snapshot.ready_structures_of(townhall) {
            for geyser in &snapshot.geysers {
                let at = geyser.position;
                if hall.position.distance(at) > radius
                    || self.contains(at)
                    || has_gas_structure(snapshot, gas, at)
                {
                    continue;
                }
                if !wallet.can_afford(gas) {
                    return false;
                }
                let Some(w) = nearest_free_worker(snapshot, worker, at, taken) else {
                    continue;
                };
                wallet.reserve(gas);
                debug!(worker = w.tag, x = at.x, y = at.y, "building gas structure");
                orders.push(Order::Build {
                    kind: gas,
                    near: at,
                    worker: w.tag,
                });
                taken.push(w.tag);
                self.entries.push(PendingGas {
                    geyser: at,
                    worker: w.tag,
                    retries: 0,
                });
                return true;
            }
        }
        false
    }
}

/// Any own gas structure, finished or not, standing on `geyser`.
fn has_gas_structure(snapshot: &Snapshot, gas: UnitKind, geyser: Point2) -> bool {
    snapshot
        .structures_of(gas)
        .any(|s| s.position.distance(geyser) < ON_GEYSER_RADIUS)
}

fn find_geyser(snapshot: &Snapshot, position: Point2) -> Option<Point2> {
    snapshot
        .geysers
        .iter()
        .map(|g| g.position)
        .find(|p| p.distance(position) < ON_GEYSER_RADIUS)
}
