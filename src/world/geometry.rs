//! Planar geometry on map coordinates.

use serde::{Deserialize, Serialize};

/// A position on the map, in game units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Point2 { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns the point closest to `self`, or None for an empty input.
    pub fn closest<I>(self, points: I) -> Option<Point2>
    where
        I: IntoIterator<Item = Point2>,
    {
        points
            .into_iter()
            .min_by(|a, b| self.distance(*a).total_cmp(&self.distance(*b)))
    }

    /// Returns the point furthest from `self`, or None for an empty input.
    pub fn furthest<I>(self, points: I) -> Option<Point2>
    where
        I: IntoIterator<Item = Point2>,
    {
        points
            .into_iter()
            .max_by(|a, b| self.distance(*a).total_cmp(&self.distance(*b)))
    }

    /// Distance to the nearest of `points`; infinity when there are none.
    pub fn distance_to_nearest<I>(self, points: I) -> f32
    where
        I: IntoIterator<Item = Point2>,
    {
        points
            .into_iter()
            .map(|p| self.distance(p))
            .fold(f32::INFINITY, f32::min)
    }
}
