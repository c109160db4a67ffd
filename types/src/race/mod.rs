//! Race domain types.
//!
//! Defines ship/race/wager/progress state and constants used by the execution layer and hosts.

mod codec;
mod constants;
mod progress;
mod result;
mod ship;
mod wager;

pub use codec::{read_u64_array, u64_array_encode_size, write_u64_array};
pub use constants::*;
pub use progress::*;
pub use result::*;
pub use ship::*;
pub use wager::*;

/// Players are identified by their account public key.
pub type PlayerId = commonware_cryptography::ed25519::PublicKey;

#[cfg(test)]
mod tests;
