//! Test-only helpers for constructing snapshots.

use crate::world::{MapInfo, Point2, Snapshot, Tag, Unit, UnitKind, GAME_LOOPS_PER_SECOND};

pub const HOME: Point2 = Point2::new(30.0, 30.0);
pub const ENEMY_START: Point2 = Point2::new(170.0, 146.0);

/// A 200x176 map with one enemy start and four expansion sites
/// (the last of which is the enemy start itself).
pub fn map_info() -> MapInfo {
    MapInfo {
        width: 200,
        height: 176,
        start_location: HOME,
        enemy_start_locations: vec![ENEMY_START],
        expansion_sites: vec![
            HOME,
            Point2::new(60.0, 30.0),
            Point2::new(100.0, 90.0),
            ENEMY_START,
        ],
    }
}

pub fn unit(tag: Tag, kind: UnitKind, x: f32, y: f32) -> Unit {
    Unit::new(tag, kind, Point2::new(x, y))
}

/// Game loop corresponding to `seconds` of game time.
pub fn game_loop_at(seconds: f32) -> u64 {
    (seconds * GAME_LOOPS_PER_SECOND).round() as u64
}

/// A snapshot at `seconds` with a ready townhall at home and nothing else.
pub fn snapshot_at(seconds: f32) -> Snapshot {
    Snapshot {
        game_loop: game_loop_at(seconds),
        minerals: 0,
        vespene: 0,
        supply_used: 12,
        supply_cap: 15,
        structures: vec![unit(1, UnitKind::Nexus, HOME.x, HOME.y).busy()],
        map: map_info(),
        ..Default::default()
    }
}

pub fn snapshot() -> Snapshot {
    snapshot_at(0.0)
}
