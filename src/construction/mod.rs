//! Construction: supply, workers, gas, expansions, the build order and
//! army production.

pub mod gas;
pub mod scheduler;
pub mod workers;

pub use gas::{GasLedger, PendingGas, MAX_GAS_RETRIES};
pub use scheduler::ConstructionScheduler;
pub use workers::nearest_free_worker;
