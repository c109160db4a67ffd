//! Race resolution: per-turn chaos effects and the simulator that drives them.

mod chaos;
mod simulator;

pub use chaos::{resolve, ChaosError, ChaosOutcome, Standings};
pub use simulator::{replay, simulate, simulate_debug};
