//! Orders emitted to the engine.
//!
//! The engine executes orders asynchronously; the agent never waits for one
//! to complete. Outcomes are observed in later snapshots.

use serde::{Deserialize, Serialize};

use super::geometry::Point2;
use super::unit::{Tag, UnitKind};

/// What an attack order is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Position(Point2),
    Unit(Tag),
}

/// A single order for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "order", rename_all = "snake_case")]
pub enum Order {
    /// Train `kind` from the producing unit or structure `source`.
    Train { kind: UnitKind, source: Tag },

    /// Have `worker` construct `kind` near `near`.
    Build {
        kind: UnitKind,
        near: Point2,
        worker: Tag,
    },

    /// Move `unit` to `dest`; `queued` appends instead of replacing.
    Move { unit: Tag, dest: Point2, queued: bool },

    /// Attack-move `unit` toward `target`.
    Attack {
        unit: Tag,
        target: Target,
        queued: bool,
    },

    /// Build a townhall at the next free expansion site.
    Expand,
}

impl Order {
    /// Returns true for orders that start a new structure.
    pub fn is_construction(&self) -> bool {
        matches!(self, Order::Build { .. } | Order::Expand)
    }
}
