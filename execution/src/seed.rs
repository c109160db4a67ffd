//! Seed mixing for reproducible races.
//!
//! Every random decision in a race (chaos triggers, wildcard re-rolls, jackpot rolls) is a pure
//! function of a 32-byte [RaceSeed]. There is no RNG object carrying hidden state: each roll
//! hashes the seed together with a domain separator and the coordinates of the decision, so any
//! observer holding the seed computes the same outcome in any order.
//!
//! ## Derivation
//!
//! ```text
//! seed       = sha256(player || race_id || len(entropy) || entropy || "race")
//! roll(d, s, t) = u64_be(sha256(seed || d || s || t)[..8])
//! commit     = sha256(seed || "commit")
//! ```
//!
//! Publishing `commit` before a wager is accepted lets a bettor later check that the seed used
//! to settle it was fixed in advance.

use commonware_codec::Encode;
use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use serde::Serialize;
use spacerace_types::PlayerId;

/// Length of a race seed and of its commitment.
pub const SEED_LEN: usize = 32;

/// Domain separator for chaos trigger rolls.
pub const CHAOS_DOMAIN: &[u8] = b"chaos";

/// Domain separator for wildcard effect selection.
pub const WILDCARD_DOMAIN: &[u8] = b"wildcard";

/// Domain separator for jackpot rolls.
pub const JACKPOT_DOMAIN: &[u8] = b"jackpot";

/// Seed material for one race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RaceSeed([u8; SEED_LEN]);

impl RaceSeed {
    /// Derive the seed for a wagered race.
    pub fn derive(player: &PlayerId, race_id: u64, entropy: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(player.encode().as_ref());
        hasher.update(&race_id.to_be_bytes());
        hasher.update(&(entropy.len() as u64).to_be_bytes());
        hasher.update(entropy);
        hasher.update(b"race");
        Self(hasher.finalize().0)
    }

    /// Derive a seed from caller entropy alone (no wager attached).
    pub fn from_entropy(entropy: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&(entropy.len() as u64).to_be_bytes());
        hasher.update(entropy);
        hasher.update(b"debug_race");
        Self(hasher.finalize().0)
    }

    /// Wrap an existing seed (e.g. one recorded in a [spacerace_types::RaceResult]).
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }

    /// Commitment that can be published before the seed is used.
    pub fn commit(&self) -> [u8; SEED_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(&self.0);
        hasher.update(b"commit");
        hasher.finalize().0
    }

    /// Returns `true` if `commit` was produced from this seed.
    pub fn verify(&self, commit: &[u8; SEED_LEN]) -> bool {
        &self.commit() == commit
    }

    /// Deterministic 64-bit roll for one decision.
    pub fn roll(&self, domain: &[u8], subject: u8, step: u8) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(&self.0);
        hasher.update(domain);
        hasher.update(&[subject, step]);
        let digest = hasher.finalize().0;
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(word)
    }

    /// Roll reduced to `0..modulus`. `modulus` must be non-zero.
    pub fn roll_below(&self, domain: &[u8], subject: u8, step: u8, modulus: u64) -> u64 {
        self.roll(domain, subject, step) % modulus.max(1)
    }
}
