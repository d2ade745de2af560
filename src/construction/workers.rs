//! Worker selection for construction tasks.

use crate::world::{Point2, Snapshot, Tag, Unit, UnitKind};

/// Nearest own worker to `near` that is idle or mining and not in `taken`.
pub fn nearest_free_worker<'a>(
    snapshot: &'a Snapshot,
    worker: UnitKind,
    near: Point2,
    taken: &[Tag],
) -> Option<&'a Unit> {
    snapshot
        .units_of(worker)
        .filter(|w| w.is_ready && (w.is_idle || w.is_collecting))
        .filter(|w| !taken.contains(&w.tag))
        .min_by(|a, b| {
            near.distance(a.position)
                .total_cmp(&near.distance(b.position))
        })
}
