//! Player progress and achievements.
//!
//! The catalog is declared as a handful of small threshold tables and expanded once into a dense,
//! id-ordered list. [apply] folds one settled race into a progress snapshot and reports which
//! achievements it crossed for the first time.

use serde::Serialize;
use spacerace_types::{
    AchievementId, JackpotTier, PlayerProgress, RaceResult, SettlementResult, Wager,
    ACHIEVEMENT_COUNT, PLACEMENT_TIER_COUNT, SHIP_COUNT, TRACKED_PLACEMENTS,
};
use std::sync::OnceLock;

/// `(threshold, reward)` per betting tier, applied to every ship.
const BET_TIERS: [(u64, u64); 3] = [(5, 10), (25, 50), (100, 200)];

/// `(threshold, reward)` tiers per finishing rank (1st..=4th), applied to every ship.
const PLACEMENT_TIERS: [[(u64, u64); PLACEMENT_TIER_COUNT]; TRACKED_PLACEMENTS] = [
    [(1, 25), (5, 100), (25, 250), (100, 1_000)],
    [(1, 10), (5, 50), (25, 100), (100, 500)],
    [(1, 5), (5, 25), (25, 50), (100, 250)],
    [(1, 5), (5, 10), (25, 25), (100, 100)],
];

/// `(threshold, reward)` per race-count milestone.
const RACE_MILESTONES: [(u64, u64); 3] = [(10, 25), (50, 100), (250, 500)];

const LIFETIME_WINNINGS_THRESHOLD: u64 = 100_000;
const LIFETIME_WINNINGS_REWARD: u64 = 500;
const SUPER_JACKPOT_REWARD: u64 = 1_000;

/// What an achievement counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AchievementKind {
    /// Bets placed on `ship`.
    Bets { ship: u8, tier: u8 },
    /// Times the backed `ship` finished at `rank` (0 = 1st).
    Placement { ship: u8, rank: u8, tier: u8 },
    /// Races completed.
    Races { tier: u8 },
    LifetimeWinnings,
    SuperJackpot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub kind: AchievementKind,
    pub threshold: u64,
    pub reward: u64,
}

impl Achievement {
    /// Current counter value for this achievement.
    pub fn progress(&self, progress: &PlayerProgress) -> u64 {
        match self.kind {
            AchievementKind::Bets { ship, .. } => progress.bets_per_ship[ship as usize],
            AchievementKind::Placement { ship, rank, .. } => {
                progress.placements[ship as usize][rank as usize]
            }
            AchievementKind::Races { .. } => progress.races,
            AchievementKind::LifetimeWinnings => progress.lifetime_winnings,
            AchievementKind::SuperJackpot => progress.highest_jackpot_tier as u64,
        }
    }

    pub fn is_crossed(&self, progress: &PlayerProgress) -> bool {
        self.progress(progress) >= self.threshold
    }
}

/// The full catalog, indexed by [AchievementId].
pub fn catalog() -> &'static [Achievement] {
    static CATALOG: OnceLock<Vec<Achievement>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// Look up a catalog entry.
pub fn get(id: AchievementId) -> Option<&'static Achievement> {
    catalog().get(id.0 as usize)
}

/// Sum of rewards for a set of achievements (unknown ids count as zero).
pub fn total_reward<'a>(ids: impl IntoIterator<Item = &'a AchievementId>) -> u64 {
    ids.into_iter()
        .filter_map(|id| get(*id))
        .fold(0u64, |acc, a| acc.saturating_add(a.reward))
}

fn build_catalog() -> Vec<Achievement> {
    let mut kinds = Vec::with_capacity(ACHIEVEMENT_COUNT);
    let mut push = |kind: AchievementKind, (threshold, reward): (u64, u64)| {
        kinds.push((kind, threshold, reward));
    };
    for ship in 0..SHIP_COUNT as u8 {
        for (tier, entry) in BET_TIERS.iter().enumerate() {
            push(
                AchievementKind::Bets {
                    ship,
                    tier: tier as u8,
                },
                *entry,
            );
        }
    }
    for ship in 0..SHIP_COUNT as u8 {
        for (rank, tiers) in PLACEMENT_TIERS.iter().enumerate() {
            for (tier, entry) in tiers.iter().enumerate() {
                push(
                    AchievementKind::Placement {
                        ship,
                        rank: rank as u8,
                        tier: tier as u8,
                    },
                    *entry,
                );
            }
        }
    }
    for (tier, entry) in RACE_MILESTONES.iter().enumerate() {
        push(AchievementKind::Races { tier: tier as u8 }, *entry);
    }
    push(
        AchievementKind::LifetimeWinnings,
        (LIFETIME_WINNINGS_THRESHOLD, LIFETIME_WINNINGS_REWARD),
    );
    push(
        AchievementKind::SuperJackpot,
        (JackpotTier::Super as u64, SUPER_JACKPOT_REWARD),
    );

    kinds
        .into_iter()
        .enumerate()
        .map(|(id, (kind, threshold, reward))| Achievement {
            id: AchievementId(id as u16),
            kind,
            threshold,
            reward,
        })
        .collect()
}

/// Fold one settled race into `progress`.
///
/// Returns the updated progress and the achievements unlocked by this race, in id order. An
/// achievement already in the unlocked set is never reported again.
pub fn apply(
    progress: &PlayerProgress,
    wager: &Wager,
    race: &RaceResult,
    settlement: &SettlementResult,
) -> (PlayerProgress, Vec<AchievementId>) {
    let mut next = progress.clone();
    let ship = wager.ship_id as usize;
    next.bets_per_ship[ship] = next.bets_per_ship[ship].saturating_add(1);
    if let Some(rank) = race
        .position_of(wager.ship_id)
        .filter(|rank| *rank < TRACKED_PLACEMENTS)
    {
        next.placements[ship][rank] = next.placements[ship][rank].saturating_add(1);
    }
    next.races = next.races.saturating_add(1);
    next.total_wagered = next.total_wagered.saturating_add(wager.amount);
    next.lifetime_winnings = next
        .lifetime_winnings
        .saturating_add(settlement.payout_amount);
    next.highest_jackpot_tier = next.highest_jackpot_tier.max(settlement.jackpot_tier);

    let mut unlocked = Vec::new();
    for achievement in catalog() {
        if !next.is_unlocked(achievement.id) && achievement.is_crossed(&next) {
            next.unlocked.insert(achievement.id);
            unlocked.push(achievement.id);
        }
    }
    (next, unlocked)
}

/// Mark every achievement the counters have already crossed, without reporting any of them.
///
/// Use when seeding progress from history so later races only report genuinely new unlocks.
pub fn backfill(progress: &PlayerProgress) -> PlayerProgress {
    let mut next = progress.clone();
    for achievement in catalog() {
        if achievement.is_crossed(&next) {
            next.unlocked.insert(achievement.id);
        }
    }
    next
}
