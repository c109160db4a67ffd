//! Deterministic fixtures for tests and tooling.

use commonware_cryptography::{ed25519::PrivateKey, Signer};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use spacerace_types::{PlayerId, Roster, SHIPS};

/// Creates a player id for ed25519 key `seed`.
pub fn create_player(seed: u64) -> PlayerId {
    PrivateKey::from_seed(seed).public_key()
}

/// Creates reproducible seed material.
pub fn create_entropy(seed: u64) -> [u8; 32] {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut entropy = [0u8; 32];
    rng.fill_bytes(&mut entropy);
    entropy
}

/// Catalog roster with every chaos factor disabled.
pub fn quiet_roster() -> Roster {
    let mut ships = SHIPS;
    for ship in ships.iter_mut() {
        ship.chaos_chance = 0;
    }
    Roster::new(ships).expect("catalog roster is well formed")
}

/// Catalog roster with uniform stats and every chaos factor firing on every turn.
pub fn stress_roster(base_speed: u64, acceleration: u64) -> Roster {
    let mut ships = SHIPS;
    for ship in ships.iter_mut() {
        ship.base_speed = base_speed;
        ship.acceleration = acceleration;
        ship.chaos_chance = 100;
    }
    Roster::new(ships).expect("catalog roster is well formed")
}
