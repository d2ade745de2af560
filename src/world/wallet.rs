//! Affordability oracle.
//!
//! A `Wallet` is seeded from the snapshot's resources at the start of a
//! tick. Each order the agent decides on reserves its cost, so decisions
//! later in the same tick see what is actually left.

use super::snapshot::Snapshot;
use super::unit::UnitKind;

/// Mineral, vespene, and supply cost of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cost {
    pub minerals: u32,
    pub vespene: u32,
    pub supply: u32,
}

impl Cost {
    const fn new(minerals: u32, vespene: u32, supply: u32) -> Self {
        Cost {
            minerals,
            vespene,
            supply,
        }
    }

    /// Returns the cost of a kind, or None for kinds the agent never produces.
    pub const fn of(kind: UnitKind) -> Option<Cost> {
        let cost = match kind {
            UnitKind::Nexus => Cost::new(400, 0, 0),
            UnitKind::Pylon => Cost::new(100, 0, 0),
            UnitKind::Assimilator => Cost::new(75, 0, 0),
            UnitKind::Gateway => Cost::new(150, 0, 0),
            UnitKind::CyberneticsCore => Cost::new(150, 0, 0),
            UnitKind::RoboticsFacility => Cost::new(150, 100, 0),
            UnitKind::Stargate => Cost::new(150, 150, 0),
            UnitKind::Probe => Cost::new(50, 0, 1),
            UnitKind::Observer => Cost::new(25, 75, 1),
            UnitKind::VoidRay => Cost::new(250, 150, 4),
            UnitKind::CommandCenter => Cost::new(400, 0, 0),
            UnitKind::SupplyDepot => Cost::new(100, 0, 0),
            UnitKind::Refinery => Cost::new(75, 0, 0),
            UnitKind::Barracks => Cost::new(150, 0, 0),
            UnitKind::Factory => Cost::new(150, 100, 0),
            UnitKind::Starport => Cost::new(150, 100, 0),
            UnitKind::Scv => Cost::new(50, 0, 1),
            UnitKind::Reaper => Cost::new(50, 50, 1),
            UnitKind::Banshee => Cost::new(150, 100, 3),
            UnitKind::Hatchery => Cost::new(300, 0, 0),
            UnitKind::Extractor => Cost::new(25, 0, 0),
            UnitKind::Drone => Cost::new(50, 0, 1),
            UnitKind::Overlord => Cost::new(100, 0, 0),
            UnitKind::Zergling => Cost::new(50, 0, 1),
            _ => return None,
        };
        Some(cost)
    }
}

/// Resources still uncommitted this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    minerals: u32,
    vespene: u32,
    supply_left: u32,
}

impl Wallet {
    pub fn new(minerals: u32, vespene: u32, supply_left: u32) -> Self {
        Wallet {
            minerals,
            vespene,
            supply_left,
        }
    }

    /// Seeds a wallet from a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Wallet::new(snapshot.minerals, snapshot.vespene, snapshot.supply_left())
    }

    /// True if the remaining resources cover `kind` (including its supply).
    pub fn can_afford(&self, kind: UnitKind) -> bool {
        match Cost::of(kind) {
            Some(c) => {
                self.minerals >= c.minerals
                    && self.vespene >= c.vespene
                    && self.supply_left >= c.supply
            }
            None => false,
        }
    }

    /// Reserves the cost of `kind`. Returns false (and reserves nothing)
    /// when it is not affordable.
    pub fn reserve(&mut self, kind: UnitKind) -> bool {
        if !self.can_afford(kind) {
            return false;
        }
        if let Some(c) = Cost::of(kind) {
            self.minerals -= c.minerals;
            self.vespene -= c.vespene;
            self.supply_left -= c.supply;
        }
        true
    }

    pub fn minerals(&self) -> u32 {
        self.minerals
    }

    pub fn supply_left(&self) -> u32 {
        self.supply_left
    }
}
