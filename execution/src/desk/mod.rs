//! The wagering desk.
//!
//! [Desk] is the single writer for everything shared between players: the house pool, the jackpot
//! accumulators, per-player progress and the leaderboard. A wager is validated, raced and settled
//! against copies of that state; the copies replace the originals only after every step has
//! succeeded, so a failed wager leaves no trace.
//!
//! Concurrent callers go through [Actor] and its [Mailbox], which queue requests onto one desk.

mod actor;
mod ingress;

pub use actor::Actor;
pub use ingress::{Mailbox, Message};

use crate::{
    achievements,
    config::ValidatedConfig,
    race::simulate,
    seed::{RaceSeed, SEED_LEN},
    settlement::{settle, validate_wager, SettlementConfig, SettlementError},
};
use serde::Serialize;
use spacerace_types::{
    AchievementId, JackpotState, Leaderboard, PlayerId, PlayerProgress, PoolState,
    ProgressInvariantError, RaceResult, RegistryError, Roster, SettlementResult, Ship, Wager,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum DeskError {
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error("player progress failed validation: {0}")]
    InvalidProgress(#[from] ProgressInvariantError),
    #[error("imported progress rejected: {0}")]
    RejectedImport(ProgressInvariantError),
    #[error("desk mailbox closed")]
    MailboxClosed,
}

impl DeskError {
    /// Fatal errors indicate an engine bug; the wager was aborted without committing anything.
    pub fn is_fatal(&self) -> bool {
        match self {
            DeskError::Settlement(err) => err.is_fatal(),
            DeskError::InvalidProgress(_) => true,
            DeskError::RejectedImport(_) | DeskError::MailboxClosed => false,
        }
    }
}

/// Observer for achievement unlocks (e.g. a minter). Called after the wager has committed.
pub trait UnlockSink: Send + 'static {
    fn unlocked(&mut self, player: &PlayerId, race_id: u64, achievements: &[AchievementId]);
}

impl UnlockSink for () {
    fn unlocked(&mut self, _: &PlayerId, _: u64, _: &[AchievementId]) {}
}

/// Everything a caller learns from one wager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WagerReceipt {
    pub race: RaceResult,
    pub settlement: SettlementResult,
    pub unlocked: Vec<AchievementId>,
    /// Leaderboard rank after this wager, if the player is on the board.
    pub rank: Option<u32>,
}

pub struct Desk<S: UnlockSink = ()> {
    config: SettlementConfig,
    roster: Roster,
    pool: PoolState,
    progress: BTreeMap<PlayerId, PlayerProgress>,
    leaderboard: Leaderboard,
    next_race_id: u64,
    sink: S,
}

impl Desk<()> {
    pub fn new(config: &ValidatedConfig) -> Self {
        Self::with_sink(config, ())
    }
}

impl<S: UnlockSink> Desk<S> {
    pub fn with_sink(config: &ValidatedConfig, sink: S) -> Self {
        let jackpots = crate::settlement::jackpot::initial_state(&config.settlement.jackpots);
        Self {
            config: config.settlement,
            roster: Roster::standard(),
            pool: PoolState::new(config.house_seed_balance, jackpots),
            progress: BTreeMap::new(),
            leaderboard: Leaderboard::default(),
            next_race_id: 0,
            sink,
        }
    }

    /// Race against a custom roster instead of the catalog (stats only; odds stay catalog odds).
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    /// Commitment to the seed the player's next wager will race under.
    pub fn next_race_commit(&self, player: &PlayerId, entropy: &[u8]) -> [u8; SEED_LEN] {
        RaceSeed::derive(player, self.next_race_id, entropy).commit()
    }

    /// Validate, race, settle and record one wager.
    pub fn place_wager(
        &mut self,
        player: PlayerId,
        ship_id: u8,
        amount: u64,
        entropy: &[u8],
    ) -> Result<WagerReceipt, DeskError> {
        let wager = Wager {
            player,
            ship_id,
            amount,
        };
        if let Err(err) = validate_wager(&wager, &self.config) {
            warn!(player = ?wager.player, ship_id, amount, ?err, "wager rejected");
            return Err(err.into());
        }

        let race_id = self.next_race_id;
        let seed = RaceSeed::derive(&wager.player, race_id, entropy);
        let race = simulate(&self.roster, &seed, race_id);
        let settlement = settle(&wager, &race, &self.pool, &self.config)?;

        let current = self
            .progress
            .get(&wager.player)
            .cloned()
            .unwrap_or_default();
        let (progress, unlocked) =
            achievements::apply(&current, &wager, &race, &settlement.result);
        if let Err(err) = progress.validate_invariants() {
            error!(race_id, player = ?wager.player, ?err, "progress invariant violated");
            return Err(err.into());
        }
        let mut leaderboard = self.leaderboard.clone();
        leaderboard.update(wager.player.clone(), progress.lifetime_winnings);
        let rank = leaderboard.rank_of(&wager.player);

        // Commit.
        self.pool = settlement.pool;
        self.progress.insert(wager.player.clone(), progress);
        self.leaderboard = leaderboard;
        self.next_race_id = self.next_race_id.saturating_add(1);

        if !unlocked.is_empty() {
            info!(race_id, player = ?wager.player, count = unlocked.len(), "achievements unlocked");
            self.sink.unlocked(&wager.player, race_id, &unlocked);
        }
        Ok(WagerReceipt {
            race,
            settlement: settlement.result,
            unlocked,
            rank,
        })
    }

    /// Race the desk's roster without a wager, through the same simulator wagers use.
    pub fn simulate_debug(&self, entropy: &[u8]) -> RaceResult {
        simulate(&self.roster, &RaceSeed::from_entropy(entropy), 0)
    }

    /// Seed a player's progress from history.
    ///
    /// Achievements the imported counters already crossed are marked unlocked silently.
    pub fn import_progress(
        &mut self,
        player: PlayerId,
        progress: PlayerProgress,
    ) -> Result<(), DeskError> {
        if let Err(err) = progress.validate_invariants() {
            warn!(player = ?player, ?err, "progress import rejected");
            return Err(DeskError::RejectedImport(err));
        }
        let progress = achievements::backfill(&progress);
        self.leaderboard
            .update(player.clone(), progress.lifetime_winnings);
        self.progress.insert(player, progress);
        Ok(())
    }

    pub fn get_ship(&self, id: u8) -> Result<Ship, RegistryError> {
        self.roster.get(id).copied()
    }

    pub fn get_player_progress(&self, player: &PlayerId) -> Option<&PlayerProgress> {
        self.progress.get(player)
    }

    pub fn get_jackpot_amounts(&self) -> JackpotState {
        self.pool.jackpots
    }

    pub fn pool(&self) -> &PoolState {
        &self.pool
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn next_race_id(&self) -> u64 {
        self.next_race_id
    }
}
