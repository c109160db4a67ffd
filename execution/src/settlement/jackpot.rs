//! Progressive jackpot meters.
//!
//! Every wager feeds a slice of its stake into each tier's accumulator. After funding, tiers are
//! rolled from most to least common and the first hit wins: a single settlement can never pay
//! more than one tier. A paid tier drops back to its floor rather than to zero.

use crate::seed::{RaceSeed, JACKPOT_DOMAIN};
use serde::{Deserialize, Serialize};
use spacerace_types::{
    JackpotState, JackpotTier, BPS_SCALE, JACKPOT_CHANCE_BPS, JACKPOT_CONTRIBUTION_BPS,
    JACKPOT_FLOORS, JACKPOT_TIERS,
};
use tracing::info;

/// Parameters for one jackpot tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JackpotTierConfig {
    /// Slice of every wager routed into this tier, in basis points.
    pub contribution_bps: u64,
    /// Trigger chance out of 10_000.
    pub chance_bps: u64,
    /// Value the accumulator resets to after paying out.
    pub floor: u64,
}

/// Default tier table (mini, mega, super).
pub fn default_tiers() -> [JackpotTierConfig; JACKPOT_TIERS] {
    std::array::from_fn(|i| JackpotTierConfig {
        contribution_bps: JACKPOT_CONTRIBUTION_BPS[i],
        chance_bps: JACKPOT_CHANCE_BPS[i],
        floor: JACKPOT_FLOORS[i],
    })
}

/// Accumulators starting at each tier's floor.
pub fn initial_state(tiers: &[JackpotTierConfig; JACKPOT_TIERS]) -> JackpotState {
    JackpotState::new(tiers.map(|tier| tier.floor))
}

/// Fund every tier from a wager. Returns the total routed to the meters.
pub fn contribute(
    state: &mut JackpotState,
    amount: u64,
    tiers: &[JackpotTierConfig; JACKPOT_TIERS],
) -> u64 {
    let mut total = 0u64;
    for (accumulator, tier) in state.accumulators.iter_mut().zip(tiers.iter()) {
        let slice = bps_of(amount, tier.contribution_bps);
        *accumulator = accumulator.saturating_add(slice);
        total = total.saturating_add(slice);
    }
    total
}

/// Roll each tier in order and pay (and reset) the first that fires.
pub fn roll(
    state: &mut JackpotState,
    seed: &RaceSeed,
    race_id: u64,
    tiers: &[JackpotTierConfig; JACKPOT_TIERS],
) -> (JackpotTier, u64) {
    for tier in JackpotTier::ROLL_ORDER {
        let Some(index) = tier.index() else {
            continue;
        };
        let config = &tiers[index];
        let hit = seed.roll_below(JACKPOT_DOMAIN, tier as u8, 0, BPS_SCALE) < config.chance_bps;
        if !hit {
            continue;
        }
        let amount = state.accumulators[index];
        state.accumulators[index] = config.floor;
        info!(race_id, ?tier, amount, "jackpot hit");
        return (tier, amount);
    }
    (JackpotTier::None, 0)
}

/// `amount * bps / 10_000`, rounded down.
pub(crate) fn bps_of(amount: u64, bps: u64) -> u64 {
    let value = amount as u128 * bps as u128 / BPS_SCALE as u128;
    u64::try_from(value).unwrap_or(u64::MAX)
}
