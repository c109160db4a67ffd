//! Wager settlement.
//!
//! [settle] turns a wager and the race it rode on into a [SettlementResult] and an updated
//! [PoolState]. The input pool is never touched; callers commit the returned copy only once every
//! later step (progress, leaderboard) has also succeeded.
//!
//! Money flow for one wager:
//! 1. The jackpot slice of the stake is routed into the tier accumulators.
//! 2. The rest of the stake is settled under the configured [PayoutModel].
//! 3. Jackpot tiers are rolled (at most one fires).

pub mod jackpot;

use crate::seed::RaceSeed;
use jackpot::JackpotTierConfig;
use spacerace_types::{
    get_ship, PayoutModel, PoolState, RaceInvariantError, RaceResult, RegistryError, Roster,
    SettlementResult, Wager, BPS_SCALE, DEFAULT_HOUSE_EDGE_BPS, DEFAULT_MAX_BET,
    DEFAULT_MIN_BET, JACKPOT_TIERS, SHIP_COUNT,
};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("wager amount {amount} outside [{min}, {max}]")]
    WagerOutOfRange { amount: u64, min: u64, max: u64 },
    #[error("race result failed validation: {0}")]
    InconsistentRace(#[from] RaceInvariantError),
}

impl SettlementError {
    /// Consistency failures indicate a simulator bug rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SettlementError::InconsistentRace(_))
    }
}

/// Settlement parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementConfig {
    pub model: PayoutModel,
    pub min_bet: u64,
    pub max_bet: u64,
    /// House edge taken from the pari-mutuel pool, in basis points.
    pub house_edge_bps: u64,
    pub jackpots: [JackpotTierConfig; JACKPOT_TIERS],
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            model: PayoutModel::default(),
            min_bet: DEFAULT_MIN_BET,
            max_bet: DEFAULT_MAX_BET,
            house_edge_bps: DEFAULT_HOUSE_EDGE_BPS,
            jackpots: jackpot::default_tiers(),
        }
    }
}

/// A settled wager and the pool state it produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub result: SettlementResult,
    pub pool: PoolState,
}

/// Reject a wager before any simulation is spent on it.
pub fn validate_wager(wager: &Wager, config: &SettlementConfig) -> Result<(), SettlementError> {
    get_ship(wager.ship_id)?;
    if wager.amount < config.min_bet || wager.amount > config.max_bet {
        return Err(SettlementError::WagerOutOfRange {
            amount: wager.amount,
            min: config.min_bet,
            max: config.max_bet,
        });
    }
    Ok(())
}

/// Fixed-odds return for a winning stake (stake included).
pub fn fixed_odds_payout(amount: u64, odds_bps: u64) -> u64 {
    jackpot::bps_of(amount, odds_bps)
}

/// Settle `wager` against `race` at catalog odds.
pub fn settle(
    wager: &Wager,
    race: &RaceResult,
    pool: &PoolState,
    config: &SettlementConfig,
) -> Result<Settlement, SettlementError> {
    settle_at_odds(wager, race, pool, config, &Roster::standard())
}

/// Settle `wager` against `race`, paying fixed-odds wins at the odds listed in `odds`.
pub fn settle_at_odds(
    wager: &Wager,
    race: &RaceResult,
    pool: &PoolState,
    config: &SettlementConfig,
    odds: &Roster,
) -> Result<Settlement, SettlementError> {
    validate_wager(wager, config)?;
    if let Err(err) = race.validate() {
        error!(race_id = race.race_id, ?err, "refusing to settle inconsistent race");
        return Err(err.into());
    }

    let mut pool = pool.clone();
    let contribution = jackpot::contribute(&mut pool.jackpots, wager.amount, &config.jackpots);
    let stake = wager.amount.saturating_sub(contribution);
    let won = wager.ship_id == race.winner_ship_id;

    let (payout_amount, house_fee) = match config.model {
        PayoutModel::FixedOdds => {
            let ship = odds.get(wager.ship_id)?;
            let payout = if won {
                fixed_odds_payout(wager.amount, ship.odds_bps)
            } else {
                0
            };
            pool.house_balance = pool.house_balance.saturating_add(stake);
            if payout > pool.house_balance {
                let uncovered = payout - pool.house_balance;
                pool.house_shortfall = pool.house_shortfall.saturating_add(uncovered);
                warn!(
                    race_id = race.race_id,
                    payout,
                    balance = pool.house_balance,
                    uncovered,
                    "house balance short of fixed-odds payout"
                );
            }
            pool.house_balance = pool.house_balance.saturating_sub(payout);
            (payout, 0)
        }
        PayoutModel::PariMutuel => settle_pari_mutuel(
            &mut pool,
            wager.ship_id,
            stake,
            race.winner_ship_id,
            config.house_edge_bps,
        ),
    };

    let seed = RaceSeed::from_bytes(race.seed);
    let (jackpot_tier, jackpot_amount) =
        jackpot::roll(&mut pool.jackpots, &seed, race.race_id, &config.jackpots);
    pool.races_settled = pool.races_settled.saturating_add(1);

    let net_player_delta = clamp_i64(
        payout_amount as i128 + jackpot_amount as i128 - wager.amount as i128,
    );
    let result = SettlementResult {
        race_id: race.race_id,
        model: config.model,
        won,
        payout_amount,
        jackpot_tier,
        jackpot_amount,
        jackpot_contribution: contribution,
        house_fee,
        net_player_delta,
    };
    info!(
        race_id = race.race_id,
        player = ?wager.player,
        ship = wager.ship_id,
        amount = wager.amount,
        winner = race.winner_ship_id,
        payout = payout_amount,
        ?jackpot_tier,
        jackpot_amount,
        net = net_player_delta,
        "wager settled"
    );
    Ok(Settlement { result, pool })
}

/// Book the stake, pay winners pro rata from the net pool and clear the book.
///
/// Returns `(payout, house_fee)`. When nobody backed the winner the net pool goes to the house.
fn settle_pari_mutuel(
    pool: &mut PoolState,
    ship_id: u8,
    stake: u64,
    winner: u8,
    house_edge_bps: u64,
) -> (u64, u64) {
    pool.book[ship_id as usize] = pool.book[ship_id as usize].saturating_add(stake);
    let total = pool
        .book
        .iter()
        .fold(0u64, |acc, backed| acc.saturating_add(*backed));
    let net = jackpot::bps_of(total, BPS_SCALE.saturating_sub(house_edge_bps));
    let fee = total - net;
    pool.house_fees = pool.house_fees.saturating_add(fee);

    let on_winner = pool.book[winner as usize];
    let payout = if ship_id == winner && on_winner > 0 {
        let share = net as u128 * stake as u128 / on_winner as u128;
        u64::try_from(share).unwrap_or(net)
    } else {
        0
    };
    // Unclaimed pool (and rounding dust) stays with the house.
    pool.house_balance = pool.house_balance.saturating_add(net - payout);
    pool.book = [0; SHIP_COUNT];
    (payout, fee)
}

pub(crate) fn clamp_i64(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
