//! Unit kinds and unit records.
//!
//! Kinds are named after the engine's type identifiers (`NEXUS`, `PROBE`,
//! `VOIDRAY`, ...). Any kind the agent does not reason about deserializes to
//! `UnitKind::Unknown` instead of failing the whole snapshot.

use serde::{Deserialize, Serialize};

use super::geometry::Point2;

/// Engine-assigned identity of a unit or structure.
pub type Tag = u64;

/// The kind of a unit or structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitKind {
    // Protoss
    Nexus,
    Pylon,
    Assimilator,
    Gateway,
    CyberneticsCore,
    RoboticsFacility,
    Stargate,
    Probe,
    Observer,
    VoidRay,
    // Terran
    CommandCenter,
    OrbitalCommand,
    PlanetaryFortress,
    SupplyDepot,
    Refinery,
    Barracks,
    Factory,
    Starport,
    Scv,
    Reaper,
    Banshee,
    // Zerg
    Hatchery,
    Lair,
    Hive,
    Extractor,
    Larva,
    Drone,
    Overlord,
    Zergling,
    // Neutral
    VespeneGeyser,
    #[serde(other)]
    Unknown,
}

impl UnitKind {
    /// Returns true for resource-drop main bases of any race.
    pub const fn is_townhall(self) -> bool {
        matches!(
            self,
            UnitKind::Nexus
                | UnitKind::CommandCenter
                | UnitKind::OrbitalCommand
                | UnitKind::PlanetaryFortress
                | UnitKind::Hatchery
                | UnitKind::Lair
                | UnitKind::Hive
        )
    }

    /// Returns true for resource-gathering workers of any race.
    pub const fn is_worker(self) -> bool {
        matches!(self, UnitKind::Probe | UnitKind::Scv | UnitKind::Drone)
    }

    /// Returns true for kinds that are buildings rather than mobile units.
    pub const fn is_structure(self) -> bool {
        self.is_townhall()
            || matches!(
                self,
                UnitKind::Pylon
                    | UnitKind::Assimilator
                    | UnitKind::Gateway
                    | UnitKind::CyberneticsCore
                    | UnitKind::RoboticsFacility
                    | UnitKind::Stargate
                    | UnitKind::SupplyDepot
                    | UnitKind::Refinery
                    | UnitKind::Barracks
                    | UnitKind::Factory
                    | UnitKind::Starport
                    | UnitKind::Extractor
            )
    }
}

/// One unit or structure as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub tag: Tag,
    pub kind: UnitKind,
    pub position: Point2,
    /// Construction finished (always true for mobile units).
    #[serde(default = "default_true")]
    pub is_ready: bool,
    /// No orders queued.
    #[serde(default)]
    pub is_idle: bool,
    /// Currently mining or returning cargo.
    #[serde(default)]
    pub is_collecting: bool,
    #[serde(default)]
    pub is_cloaked: bool,
}

fn default_true() -> bool {
    true
}

impl Unit {
    /// Creates a ready, idle unit at a position.
    pub fn new(tag: Tag, kind: UnitKind, position: Point2) -> Self {
        Unit {
            tag,
            kind,
            position,
            is_ready: true,
            is_idle: true,
            is_collecting: false,
            is_cloaked: false,
        }
    }

    pub fn under_construction(mut self) -> Self {
        self.is_ready = false;
        self.is_idle = false;
        self
    }

    pub fn busy(mut self) -> Self {
        self.is_idle = false;
        self
    }

    pub fn collecting(mut self) -> Self {
        self.is_idle = false;
        self.is_collecting = true;
        self
    }

    pub fn cloaked(mut self) -> Self {
        self.is_cloaked = true;
        self
    }
}
