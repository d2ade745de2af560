//! Per-tick world snapshot.
//!
//! The engine delivers one `Snapshot` per tick. It is read-only for the
//! whole tick; every component derives its decisions from it plus its own
//! ledger.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::geometry::Point2;
use super::unit::{Tag, Unit, UnitKind};

/// Engine game loops per real-time second at "faster" speed.
pub const GAME_LOOPS_PER_SECOND: f32 = 22.4;

/// Static map metadata for the current match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapInfo {
    pub width: usize,
    pub height: usize,
    /// Our own starting townhall position ("home").
    pub start_location: Point2,
    pub enemy_start_locations: Vec<Point2>,
    /// Expansion sites in the engine's order.
    pub expansion_sites: Vec<Point2>,
}

/// Complete world view for one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub game_loop: u64,
    pub minerals: u32,
    pub vespene: u32,
    pub supply_used: u32,
    pub supply_cap: u32,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub structures: Vec<Unit>,
    #[serde(default)]
    pub enemy_units: Vec<Unit>,
    #[serde(default)]
    pub enemy_structures: Vec<Unit>,
    #[serde(default)]
    pub geysers: Vec<Unit>,
    /// Orders accepted by the engine whose product does not exist yet.
    #[serde(default)]
    pub in_flight: HashMap<UnitKind, u32>,
    #[serde(default)]
    pub map: MapInfo,
}

impl Snapshot {
    /// Elapsed game time in seconds.
    pub fn time(&self) -> f32 {
        self.game_loop as f32 / GAME_LOOPS_PER_SECOND
    }

    /// Elapsed game time in minutes.
    pub fn minutes(&self) -> f32 {
        self.time() / 60.0
    }

    pub fn supply_left(&self) -> u32 {
        self.supply_cap.saturating_sub(self.supply_used)
    }

    /// Our home location.
    pub fn home(&self) -> Point2 {
        self.map.start_location
    }

    /// Own mobile units of a kind.
    pub fn units_of(&self, kind: UnitKind) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().filter(move |u| u.kind == kind)
    }

    /// Own structures of a kind, ready or not.
    pub fn structures_of(&self, kind: UnitKind) -> impl Iterator<Item = &Unit> + '_ {
        self.structures.iter().filter(move |u| u.kind == kind)
    }

    /// Own ready structures of a kind.
    pub fn ready_structures_of(&self, kind: UnitKind) -> impl Iterator<Item = &Unit> + '_ {
        self.structures_of(kind).filter(|u| u.is_ready)
    }

    /// Looks up an own unit by tag.
    /// Units that can train from each ready `source` this tick.
    ///
    /// Without `larva` these are the idle source structures themselves.
    /// With it, each ready source contributes its nearest larva instead.
    /// Tags in `used` are skipped and no larva is handed out twice.
    pub fn trainers(
        &self,
        source: UnitKind,
        larva: Option<UnitKind>,
        used: &[Tag],
    ) -> Vec<Tag> {
        let mut out = Vec::new();
        for s in self.ready_structures_of(source) {
            match larva {
                None => {
                    if s.is_idle && !used.contains(&s.tag) {
                        out.push(s.tag);
                    }
                }
                Some(kind) => {
                    let nearest = self
                        .units_of(kind)
                        .filter(|l| !used.contains(&l.tag) && !out.contains(&l.tag))
                        .min_by(|a, b| {
                            s.position
                                .distance(a.position)
                                .total_cmp(&s.position.distance(b.position))
                        });
                    if let Some(l) = nearest {
                        out.push(l.tag);
                    }
                }
            }
        }
        out
    }

    pub fn unit_by_tag(&self, tag: Tag) -> Option<&Unit> {
        self.units.iter().find(|u| u.tag == tag)
    }

    /// Number of in-flight orders plus unfinished own units/structures of a kind.
    pub fn already_pending(&self, kind: UnitKind) -> u32 {
        let queued = self.in_flight.get(&kind).copied().unwrap_or(0);
        let building = self
            .structures
            .iter()
            .chain(self.units.iter())
            .filter(|u| u.kind == kind && !u.is_ready)
            .count() as u32;
        queued + building
    }

    /// The own structure furthest from home, or home itself if we have none.
    ///
    /// Serves both as the rally point for idle army and as the reference
    /// point from which attack targets are ranked.
    pub fn forward_position(&self) -> Point2 {
        let home = self.home();
        home.furthest(self.structures.iter().map(|s| s.position))
            .unwrap_or(home)
    }
}
