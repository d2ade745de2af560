//! World representation.
//!
//! Contains the read-only per-tick snapshot delivered by the game engine,
//! the unit and structure types it carries, the orders the agent emits
//! back, and the per-race roster and cost tables.

pub mod geometry;
pub mod order;
pub mod roster;
pub mod snapshot;
pub mod unit;
pub mod wallet;

pub use geometry::Point2;
pub use order::{Order, Target};
pub use roster::{Race, Roster};
pub use snapshot::{MapInfo, Snapshot, GAME_LOOPS_PER_SECOND};
pub use unit::{Tag, Unit, UnitKind};
pub use wallet::{Cost, Wallet};
