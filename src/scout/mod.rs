//! Scouting: picks exploration targets and keeps a scout alive.

pub mod director;
pub mod sites;

pub use director::{ScoutDirector, ScoutPhase, ScoutState};
pub use sites::{candidate_sites, dynamic_threshold, next_index, viable_indices};
