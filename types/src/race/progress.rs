use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

use super::{
    read_u64_array, u64_array_encode_size, write_u64_array, JackpotTier, PlayerId,
    ACHIEVEMENT_COUNT, LEADERBOARD_SIZE, SHIP_COUNT, TRACKED_PLACEMENTS,
};

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum ProgressInvariantError {
    #[error("bets per ship sum to {bets}, but {races} races were recorded")]
    BetsDisagreeWithRaces { bets: u64, races: u64 },
    #[error("ship {ship} has {placements} placements but only {bets} bets")]
    PlacementsExceedBets { ship: u8, placements: u64, bets: u64 },
    #[error("unknown achievement id {0}")]
    UnknownAchievement(u16),
}

/// Dense index into the achievement catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AchievementId(pub u16);

impl Write for AchievementId {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl Read for AchievementId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = u16::read(reader)?;
        if id as usize >= ACHIEVEMENT_COUNT {
            return Err(Error::Invalid("AchievementId", "out of range"));
        }
        Ok(Self(id))
    }
}

impl FixedSize for AchievementId {
    const SIZE: usize = 2;
}

/// Per-player counters. Owned by an external store; the engine only derives updated copies.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PlayerProgress {
    pub bets_per_ship: [u64; SHIP_COUNT],
    /// `placements[ship][rank]` counts how often the backed ship finished at `rank` (0 = 1st).
    pub placements: [[u64; TRACKED_PLACEMENTS]; SHIP_COUNT],
    pub races: u64,
    pub total_wagered: u64,
    pub lifetime_winnings: u64,
    pub highest_jackpot_tier: JackpotTier,
    pub unlocked: BTreeSet<AchievementId>,
}

impl PlayerProgress {
    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.contains(&id)
    }

    pub fn validate_invariants(&self) -> Result<(), ProgressInvariantError> {
        let bets = self
            .bets_per_ship
            .iter()
            .fold(0u64, |acc, b| acc.saturating_add(*b));
        if bets != self.races {
            return Err(ProgressInvariantError::BetsDisagreeWithRaces {
                bets,
                races: self.races,
            });
        }
        for (ship, ranks) in self.placements.iter().enumerate() {
            let placements = ranks.iter().fold(0u64, |acc, c| acc.saturating_add(*c));
            if placements > self.bets_per_ship[ship] {
                return Err(ProgressInvariantError::PlacementsExceedBets {
                    ship: ship as u8,
                    placements,
                    bets: self.bets_per_ship[ship],
                });
            }
        }
        if let Some(id) = self
            .unlocked
            .iter()
            .find(|id| id.0 as usize >= ACHIEVEMENT_COUNT)
        {
            return Err(ProgressInvariantError::UnknownAchievement(id.0));
        }
        Ok(())
    }
}

impl Write for PlayerProgress {
    fn write(&self, writer: &mut impl BufMut) {
        write_u64_array(&self.bets_per_ship, writer);
        for ranks in &self.placements {
            write_u64_array(ranks, writer);
        }
        self.races.write(writer);
        self.total_wagered.write(writer);
        self.lifetime_winnings.write(writer);
        self.highest_jackpot_tier.write(writer);
        let unlocked: Vec<AchievementId> = self.unlocked.iter().copied().collect();
        unlocked.write(writer);
    }
}

impl Read for PlayerProgress {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let bets_per_ship = read_u64_array::<SHIP_COUNT>(reader)?;
        let mut placements = [[0u64; TRACKED_PLACEMENTS]; SHIP_COUNT];
        for ranks in placements.iter_mut() {
            *ranks = read_u64_array::<TRACKED_PLACEMENTS>(reader)?;
        }
        let races = u64::read(reader)?;
        let total_wagered = u64::read(reader)?;
        let lifetime_winnings = u64::read(reader)?;
        let highest_jackpot_tier = JackpotTier::read(reader)?;
        let unlocked = Vec::<AchievementId>::read_range(reader, 0..=ACHIEVEMENT_COUNT)?;
        Ok(Self {
            bets_per_ship,
            placements,
            races,
            total_wagered,
            lifetime_winnings,
            highest_jackpot_tier,
            unlocked: unlocked.into_iter().collect(),
        })
    }
}

impl EncodeSize for PlayerProgress {
    fn encode_size(&self) -> usize {
        let unlocked: Vec<AchievementId> = self.unlocked.iter().copied().collect();
        u64_array_encode_size(&self.bets_per_ship)
            + SHIP_COUNT * TRACKED_PLACEMENTS * u64::SIZE
            + self.races.encode_size()
            + self.total_wagered.encode_size()
            + self.lifetime_winnings.encode_size()
            + self.highest_jackpot_tier.encode_size()
            + unlocked.encode_size()
    }
}

/// Leaderboard entry, ranked by lifetime winnings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub player: PlayerId,
    pub winnings: u64,
    pub rank: u32,
}

impl Write for LeaderboardEntry {
    fn write(&self, writer: &mut impl BufMut) {
        self.player.write(writer);
        self.winnings.write(writer);
        self.rank.write(writer);
    }
}

impl Read for LeaderboardEntry {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            player: PlayerId::read(reader)?,
            winnings: u64::read(reader)?,
            rank: u32::read(reader)?,
        })
    }
}

impl EncodeSize for LeaderboardEntry {
    fn encode_size(&self) -> usize {
        self.player.encode_size() + self.winnings.encode_size() + self.rank.encode_size()
    }
}

/// Top players by lifetime winnings.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn update(&mut self, player: PlayerId, winnings: u64) {
        self.entries.retain(|e| e.player != player);
        self.entries.push(LeaderboardEntry {
            player,
            winnings,
            rank: 0,
        });

        // Equal winnings fall back to player id so the cutoff is deterministic.
        self.entries.sort_by(|a, b| {
            b.winnings
                .cmp(&a.winnings)
                .then_with(|| a.player.cmp(&b.player))
        });
        self.entries.truncate(LEADERBOARD_SIZE);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = (i + 1) as u32;
        }
    }

    /// 1-based rank, if the player is on the board.
    pub fn rank_of(&self, player: &PlayerId) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| &e.player == player)
            .map(|e| e.rank)
    }
}

impl Write for Leaderboard {
    fn write(&self, writer: &mut impl BufMut) {
        self.entries.write(writer);
    }
}

impl Read for Leaderboard {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            entries: Vec::<LeaderboardEntry>::read_range(reader, 0..=LEADERBOARD_SIZE)?,
        })
    }
}

impl EncodeSize for Leaderboard {
    fn encode_size(&self) -> usize {
        self.entries.encode_size()
    }
}
