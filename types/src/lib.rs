//! Common types used throughout spacerace.
//!
//! Everything in this crate is plain data: the fixed ship catalog, the shapes produced by a
//! simulated race, wagers and their settlement, pool/jackpot accumulators and per-player
//! progress. Behavior lives in `spacerace-execution`; the only logic here is invariant checking
//! and the binary codec used to persist these values.

pub mod race;

pub use race::*;
