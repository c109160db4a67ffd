use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};

use super::{
    read_u64_array, u64_array_encode_size, write_u64_array, PlayerId, DEFAULT_HOUSE_SEED_BALANCE,
    JACKPOT_FLOORS, JACKPOT_TIERS, SHIP_COUNT,
};

/// A bet on one ship, consumed by exactly one settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wager {
    pub player: PlayerId,
    pub ship_id: u8,
    pub amount: u64,
}

/// How winning wagers are paid.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutModel {
    /// `amount * ship.odds_bps / 10_000` on a win.
    #[default]
    FixedOdds = 0,
    /// Share of the race book (minus house edge) proportional to stake on the winner.
    PariMutuel = 1,
}

impl Write for PayoutModel {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for PayoutModel {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::FixedOdds),
            1 => Ok(Self::PariMutuel),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for PayoutModel {
    const SIZE: usize = 1;
}

/// Jackpot tiers in increasing severity. `None` orders lowest so `max` tracks the best tier hit.
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum JackpotTier {
    #[default]
    None = 0,
    Mini = 1,
    Mega = 2,
    Super = 3,
}

impl JackpotTier {
    /// Payable tiers, in the order they are rolled.
    pub const ROLL_ORDER: [JackpotTier; JACKPOT_TIERS] =
        [JackpotTier::Mini, JackpotTier::Mega, JackpotTier::Super];

    /// Accumulator index for payable tiers.
    pub fn index(self) -> Option<usize> {
        match self {
            JackpotTier::None => None,
            JackpotTier::Mini => Some(0),
            JackpotTier::Mega => Some(1),
            JackpotTier::Super => Some(2),
        }
    }
}

impl Write for JackpotTier {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for JackpotTier {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::None),
            1 => Ok(Self::Mini),
            2 => Ok(Self::Mega),
            3 => Ok(Self::Super),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for JackpotTier {
    const SIZE: usize = 1;
}

/// Progressive jackpot accumulators, indexed by [JackpotTier::index].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct JackpotState {
    pub accumulators: [u64; JACKPOT_TIERS],
}

impl JackpotState {
    pub fn new(floors: [u64; JACKPOT_TIERS]) -> Self {
        Self {
            accumulators: floors,
        }
    }

    pub fn amount(&self, tier: JackpotTier) -> u64 {
        tier.index().map(|i| self.accumulators[i]).unwrap_or(0)
    }

    pub fn mini(&self) -> u64 {
        self.amount(JackpotTier::Mini)
    }

    pub fn mega(&self) -> u64 {
        self.amount(JackpotTier::Mega)
    }

    pub fn super_jackpot(&self) -> u64 {
        self.amount(JackpotTier::Super)
    }
}

impl Default for JackpotState {
    fn default() -> Self {
        Self::new(JACKPOT_FLOORS)
    }
}

impl Write for JackpotState {
    fn write(&self, writer: &mut impl BufMut) {
        write_u64_array(&self.accumulators, writer);
    }
}

impl Read for JackpotState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            accumulators: read_u64_array::<JACKPOT_TIERS>(reader)?,
        })
    }
}

impl EncodeSize for JackpotState {
    fn encode_size(&self) -> usize {
        u64_array_encode_size(&self.accumulators)
    }
}

/// Shared house/pool state. Passed into every settlement and returned updated; never mutated in
/// place by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoolState {
    /// House bank: receives lost fixed-odds stakes and pays fixed-odds wins.
    pub house_balance: u64,
    /// Pari-mutuel house edge collected so far.
    pub house_fees: u64,
    /// Fixed-odds payouts the house bank could not cover.
    pub house_shortfall: u64,
    /// Pari-mutuel book for the race currently open, per ship.
    pub book: [u64; SHIP_COUNT],
    pub jackpots: JackpotState,
    pub races_settled: u64,
}

impl PoolState {
    pub fn new(house_balance: u64, jackpots: JackpotState) -> Self {
        Self {
            house_balance,
            house_fees: 0,
            house_shortfall: 0,
            book: [0; SHIP_COUNT],
            jackpots,
            races_settled: 0,
        }
    }
}

impl Default for PoolState {
    fn default() -> Self {
        Self::new(DEFAULT_HOUSE_SEED_BALANCE, JackpotState::default())
    }
}

impl Write for PoolState {
    fn write(&self, writer: &mut impl BufMut) {
        self.house_balance.write(writer);
        self.house_fees.write(writer);
        self.house_shortfall.write(writer);
        write_u64_array(&self.book, writer);
        self.jackpots.write(writer);
        self.races_settled.write(writer);
    }
}

impl Read for PoolState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            house_balance: u64::read(reader)?,
            house_fees: u64::read(reader)?,
            house_shortfall: u64::read(reader)?,
            book: read_u64_array::<SHIP_COUNT>(reader)?,
            jackpots: JackpotState::read(reader)?,
            races_settled: u64::read(reader)?,
        })
    }
}

impl EncodeSize for PoolState {
    fn encode_size(&self) -> usize {
        self.house_balance.encode_size()
            + self.house_fees.encode_size()
            + self.house_shortfall.encode_size()
            + u64_array_encode_size(&self.book)
            + self.jackpots.encode_size()
            + self.races_settled.encode_size()
    }
}

/// Outcome of settling one wager. Handed to the ledger; the engine does not store it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SettlementResult {
    pub race_id: u64,
    pub model: PayoutModel,
    pub won: bool,
    pub payout_amount: u64,
    pub jackpot_tier: JackpotTier,
    pub jackpot_amount: u64,
    /// Portion of the wager routed to the jackpot accumulators.
    pub jackpot_contribution: u64,
    /// House edge taken by this settlement (pari-mutuel only).
    pub house_fee: u64,
    pub net_player_delta: i64,
}

impl Write for SettlementResult {
    fn write(&self, writer: &mut impl BufMut) {
        self.race_id.write(writer);
        self.model.write(writer);
        self.won.write(writer);
        self.payout_amount.write(writer);
        self.jackpot_tier.write(writer);
        self.jackpot_amount.write(writer);
        self.jackpot_contribution.write(writer);
        self.house_fee.write(writer);
        self.net_player_delta.write(writer);
    }
}

impl Read for SettlementResult {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            race_id: u64::read(reader)?,
            model: PayoutModel::read(reader)?,
            won: bool::read(reader)?,
            payout_amount: u64::read(reader)?,
            jackpot_tier: JackpotTier::read(reader)?,
            jackpot_amount: u64::read(reader)?,
            jackpot_contribution: u64::read(reader)?,
            house_fee: u64::read(reader)?,
            net_player_delta: i64::read(reader)?,
        })
    }
}

impl EncodeSize for SettlementResult {
    fn encode_size(&self) -> usize {
        self.race_id.encode_size()
            + self.model.encode_size()
            + self.won.encode_size()
            + self.payout_amount.encode_size()
            + self.jackpot_tier.encode_size()
            + self.jackpot_amount.encode_size()
            + self.jackpot_contribution.encode_size()
            + self.house_fee.encode_size()
            + self.net_player_delta.encode_size()
    }
}
