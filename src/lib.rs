//! Armada agent library.
//!
//! Exposes the world model, the scouting, construction and engagement
//! components, the orchestrator that sequences them each tick, and the
//! protocol layer used by the `armada` binary.

pub mod config;
pub mod construction;
pub mod dataset;
pub mod engagement;
pub mod engine;
pub mod intel;
pub mod logging;
pub mod orchestrator;
pub mod protocol;
pub mod scout;
pub mod training;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;
