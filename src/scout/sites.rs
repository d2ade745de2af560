//! Candidate scouting sites and viability.
//!
//! Sites are recomputed from the snapshot every tick, so indices are only
//! stable while the set of friendly townhalls does not change.

use crate::world::{Point2, Snapshot};

/// Expansion sites closer than this to an enemy start are the start itself.
const SAME_SITE_RADIUS: f32 = 1.0;

/// A site is occupied when one of our townhalls sits within this distance.
const OCCUPIED_RADIUS: f32 = 6.0;

/// Ordered candidate sites: enemy starts first, then the remaining
/// expansion sites, minus any site occupied by one of our townhalls.
pub fn candidate_sites(snapshot: &Snapshot) -> Vec<Point2> {
    let enemy_starts = &snapshot.map.enemy_start_locations;
    let townhalls: Vec<Point2> = snapshot
        .structures
        .iter()
        .filter(|s| s.kind.is_townhall())
        .map(|s| s.position)
        .collect();

    let expansions = snapshot.map.expansion_sites.iter().filter(|site| {
        enemy_starts
            .iter()
            .all(|start| start.distance(**site) > SAME_SITE_RADIUS)
    });

    enemy_starts
        .iter()
        .chain(expansions)
        .copied()
        .filter(|site| site.distance_to_nearest(townhalls.iter().copied()) > OCCUPIED_RADIUS)
        .collect()
}

/// The viability distance, growing by one per lost scout up to `max`.
#[inline]
pub fn dynamic_threshold(min: f32, max: f32, death_count: u32) -> f32 {
    (min + death_count as f32).min(max)
}

/// Indices of sites with no friendly unit and no friendly structure within
/// `threshold`.
pub fn viable_indices(snapshot: &Snapshot, sites: &[Point2], threshold: f32) -> Vec<usize> {
    sites
        .iter()
        .enumerate()
        .filter(|(_, site)| {
            let units = site.distance_to_nearest(snapshot.units.iter().map(|u| u.position));
            let structures =
                site.distance_to_nearest(snapshot.structures.iter().map(|s| s.position));
            units > threshold && structures > threshold
        })
        .map(|(i, _)| i)
        .collect()
}

/// Smallest viable index strictly after `current`, wrapping to the smallest
/// viable index overall. `viable` must be sorted ascending.
pub fn next_index(viable: &[usize], current: usize) -> Option<usize> {
    viable
        .iter()
        .copied()
        .find(|&i| i > current)
        .or_else(|| viable.first().copied())
}
