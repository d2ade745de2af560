//! Per-race roster of the unit kinds the agent works with.
//!
//! A `Roster` is selected once from configuration and never mutated. The
//! build order lists the dependency structures first, then the structure
//! that produces the dedicated scout, then the primary combat structure.
//!
//! Zerg trains every unit from larva next to a townhall rather than from an
//! idle structure, and plays an economy-only roster with an empty build
//! order: drones, overlords, extractors and expansions.

use serde::{Deserialize, Serialize};

use super::unit::UnitKind;

/// Playable race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Race {
    Protoss,
    Terran,
    Zerg,
}

impl Race {
    /// Parses a race name, case-insensitively.
    pub fn from_name(s: &str) -> Option<Race> {
        match s.to_ascii_lowercase().as_str() {
            "protoss" => Some(Race::Protoss),
            "terran" => Some(Race::Terran),
            "zerg" => Some(Race::Zerg),
            _ => None,
        }
    }
}

/// The kinds one race builds and trains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub race: Race,
    pub townhall: UnitKind,
    pub worker: UnitKind,
    pub supply: UnitKind,
    pub gas: UnitKind,
    /// Dedicated scouting unit and the structure that trains it.
    pub scout: UnitKind,
    pub scout_source: UnitKind,
    pub combat_unit: UnitKind,
    pub build_order: Vec<UnitKind>,
    /// Kind that trains units in place of the source structure, if any.
    pub larva: Option<UnitKind>,
}

impl Roster {
    pub fn for_race(race: Race) -> Roster {
        match race {
            Race::Protoss => Roster {
                race,
                townhall: UnitKind::Nexus,
                worker: UnitKind::Probe,
                supply: UnitKind::Pylon,
                gas: UnitKind::Assimilator,
                scout: UnitKind::Observer,
                scout_source: UnitKind::RoboticsFacility,
                combat_unit: UnitKind::VoidRay,
                build_order: vec![
                    UnitKind::Gateway,
                    UnitKind::CyberneticsCore,
                    UnitKind::RoboticsFacility,
                    UnitKind::Stargate,
                ],
                larva: None,
            },
            Race::Terran => Roster {
                race,
                townhall: UnitKind::CommandCenter,
                worker: UnitKind::Scv,
                supply: UnitKind::SupplyDepot,
                gas: UnitKind::Refinery,
                scout: UnitKind::Reaper,
                scout_source: UnitKind::Barracks,
                combat_unit: UnitKind::Banshee,
                build_order: vec![UnitKind::Barracks, UnitKind::Factory, UnitKind::Starport],
                larva: None,
            },
            Race::Zerg => Roster {
                race,
                townhall: UnitKind::Hatchery,
                worker: UnitKind::Drone,
                supply: UnitKind::Overlord,
                gas: UnitKind::Extractor,
                scout: UnitKind::Overlord,
                scout_source: UnitKind::Hatchery,
                combat_unit: UnitKind::Zergling,
                build_order: Vec::new(),
                larva: Some(UnitKind::Larva),
            },
        }
    }

    /// The primary combat structure (last entry of the build order).
    pub fn combat_structure(&self) -> UnitKind {
        self.build_order.last().copied().unwrap_or(UnitKind::Unknown)
    }

    /// The kind used as scout, honouring the worker-scout option.
    pub fn scout_kind(&self, use_worker: bool) -> UnitKind {
        if use_worker {
            self.worker
        } else {
            self.scout
        }
    }

    /// The structure that trains the scout kind.
    pub fn scout_source_kind(&self, use_worker: bool) -> UnitKind {
        if use_worker {
            self.townhall
        } else {
            self.scout_source
        }
    }
}
