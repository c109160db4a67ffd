//! Spacerace execution layer.
//!
//! This crate contains the deterministic race engine and the settlement pipeline built on it:
//! seed mixing ([seed]), chaos resolution and the turn simulator ([race]), payouts and jackpots
//! ([settlement]), player progress ([achievements]) and the transactional [Desk] that ties them
//! together.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time or ambient randomness; every roll is derived from a [RaceSeed].
//! - Avoid iteration order of hash-based collections influencing outputs.
//! - Arithmetic on speeds, distances and balances saturates or clamps; it never wraps.
//!
//! ## Placing a wager (example)
//! ```rust
//! use spacerace_execution::{config::EngineConfig, Desk};
//! use commonware_cryptography::{ed25519::PrivateKey, Signer};
//!
//! let config = EngineConfig::default().validate().unwrap();
//! let mut desk = Desk::new(&config);
//! let player = PrivateKey::from_seed(1).public_key();
//!
//! let receipt = desk.place_wager(player, 3, 100, b"block-entropy").unwrap();
//! assert_eq!(receipt.race.placements.len(), 8);
//! assert_eq!(desk.pool().races_settled, 1);
//! ```

pub mod achievements;
pub mod config;
pub mod desk;
pub mod race;
pub mod seed;
pub mod settlement;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use desk::{Actor, Desk, DeskError, Mailbox, UnlockSink, WagerReceipt};
pub use race::{replay, resolve, simulate, simulate_debug, ChaosError, ChaosOutcome, Standings};
pub use seed::RaceSeed;
pub use settlement::{
    settle, settle_at_odds, validate_wager, Settlement, SettlementConfig, SettlementError,
};
