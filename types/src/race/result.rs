use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error as ThisError;

use super::{
    read_u64_array, u64_array_encode_size, write_u64_array, ChaosKind, MAX_TURN_EVENTS,
    RACE_TURNS, SHIP_COUNT,
};

#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum RaceInvariantError {
    #[error("placements are not a permutation of all ships (ship {ship} repeated or missing)")]
    NotAPermutation { ship: u8 },
    #[error("winner {winner} does not match first placement {first}")]
    WinnerMismatch { winner: u8, first: u8 },
    #[error("event out of range (turn={turn}, ship={ship})")]
    EventOutOfRange { turn: u8, ship: u8 },
    #[error("too many events ({got}, max {max})")]
    TooManyEvents { got: usize, max: usize },
    #[error("ship {ship} moved backwards on turn {turn}")]
    DistanceRegressed { ship: u8, turn: u8 },
    #[error("ship {ship} has an event on turn {turn} after finishing or out of order")]
    EventAfterFinish { ship: u8, turn: u8 },
    #[error("finished ship placed after an unfinished ship at position {position}")]
    FinishOrder { position: usize },
    #[error("final distance for ship {ship} disagrees with its event log")]
    DistanceMismatch { ship: u8 },
}

/// Ordering key for a ship that crossed the finish line: the turn it crossed on plus the
/// fraction `numerator / denominator` of that turn's advance still needed at turn start.
///
/// Kept as an exact rational so ordering never depends on floating point rounding.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct FinishKey {
    pub turn: u8,
    pub numerator: u64,
    pub denominator: u64,
}

impl FinishKey {
    /// `denominator` must be non-zero; a ship can only cross the line with a positive advance.
    pub fn new(turn: u8, numerator: u64, denominator: u64) -> Self {
        debug_assert!(denominator > 0, "finish key with zero advance");
        Self {
            turn,
            numerator,
            denominator: denominator.max(1),
        }
    }

    /// Lossy view for display only.
    pub fn as_f64(&self) -> f64 {
        self.turn as f64 + self.numerator as f64 / self.denominator as f64
    }
}

impl Ord for FinishKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Both fractions lie in (0, 1], so the turn dominates.
        self.turn.cmp(&other.turn).then_with(|| {
            let lhs = self.numerator as u128 * other.denominator as u128;
            let rhs = other.numerator as u128 * self.denominator as u128;
            lhs.cmp(&rhs)
        })
    }
}

impl PartialOrd for FinishKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FinishKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FinishKey {}

impl Write for FinishKey {
    fn write(&self, writer: &mut impl BufMut) {
        self.turn.write(writer);
        self.numerator.write(writer);
        self.denominator.write(writer);
    }
}

impl Read for FinishKey {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let turn = u8::read(reader)?;
        let numerator = u64::read(reader)?;
        let denominator = u64::read(reader)?;
        if denominator == 0 {
            return Err(Error::Invalid("FinishKey", "zero denominator"));
        }
        Ok(Self {
            turn,
            numerator,
            denominator,
        })
    }
}

impl EncodeSize for FinishKey {
    fn encode_size(&self) -> usize {
        self.turn.encode_size() + self.numerator.encode_size() + self.denominator.encode_size()
    }
}

/// Mutable per-ship state while a race is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShipRunState {
    pub current_speed: u64,
    pub distance: u64,
    pub finished_at: Option<FinishKey>,
}

impl ShipRunState {
    pub fn new(base_speed: u64) -> Self {
        Self {
            current_speed: base_speed,
            distance: 0,
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// One ship's move on one turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnEvent {
    pub turn: u8,
    pub ship_id: u8,
    pub move_amount: u64,
    pub resulting_distance: u64,
    /// The ship's own archetype, when it fired this turn.
    pub chaos_kind_triggered: Option<ChaosKind>,
    /// The effect actually applied (differs from the archetype for wildcards).
    pub applied_effect: Option<ChaosKind>,
    /// Ship hit by this ship's attack, if any.
    pub target_ship_id: Option<u8>,
    /// Number of attacks that hit this ship this turn.
    pub brakes_received: u8,
    pub finished: bool,
}

impl Write for TurnEvent {
    fn write(&self, writer: &mut impl BufMut) {
        self.turn.write(writer);
        self.ship_id.write(writer);
        self.move_amount.write(writer);
        self.resulting_distance.write(writer);
        self.chaos_kind_triggered.write(writer);
        self.applied_effect.write(writer);
        self.target_ship_id.write(writer);
        self.brakes_received.write(writer);
        self.finished.write(writer);
    }
}

impl Read for TurnEvent {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            turn: u8::read(reader)?,
            ship_id: u8::read(reader)?,
            move_amount: u64::read(reader)?,
            resulting_distance: u64::read(reader)?,
            chaos_kind_triggered: Option::<ChaosKind>::read(reader)?,
            applied_effect: Option::<ChaosKind>::read(reader)?,
            target_ship_id: Option::<u8>::read(reader)?,
            brakes_received: u8::read(reader)?,
            finished: bool::read(reader)?,
        })
    }
}

impl EncodeSize for TurnEvent {
    fn encode_size(&self) -> usize {
        self.turn.encode_size()
            + self.ship_id.encode_size()
            + self.move_amount.encode_size()
            + self.resulting_distance.encode_size()
            + self.chaos_kind_triggered.encode_size()
            + self.applied_effect.encode_size()
            + self.target_ship_id.encode_size()
            + self.brakes_received.encode_size()
            + self.finished.encode_size()
    }
}

/// Terminal outcome of one simulated race.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RaceResult {
    pub race_id: u64,
    pub seed: [u8; 32],
    pub winner_ship_id: u8,
    /// Ship ids best-to-worst.
    pub placements: [u8; SHIP_COUNT],
    pub finish_keys: [Option<FinishKey>; SHIP_COUNT],
    pub final_distances: [u64; SHIP_COUNT],
    pub events: Vec<TurnEvent>,
}

impl RaceResult {
    /// Zero-based placement of a ship, if it appears in the placements.
    pub fn position_of(&self, ship_id: u8) -> Option<usize> {
        self.placements.iter().position(|id| *id == ship_id)
    }

    /// Events emitted for a single ship, in turn order.
    pub fn events_for(&self, ship_id: u8) -> impl Iterator<Item = &TurnEvent> {
        self.events.iter().filter(move |e| e.ship_id == ship_id)
    }

    /// Check the structural invariants every simulated race satisfies.
    ///
    /// A failure here means the result was not produced by the simulator (or the simulator has a
    /// bug); it is never caused by user input.
    pub fn validate(&self) -> Result<(), RaceInvariantError> {
        let mut seen = [false; SHIP_COUNT];
        for ship in self.placements {
            let slot = seen
                .get_mut(ship as usize)
                .ok_or(RaceInvariantError::NotAPermutation { ship })?;
            if *slot {
                return Err(RaceInvariantError::NotAPermutation { ship });
            }
            *slot = true;
        }
        if self.winner_ship_id != self.placements[0] {
            return Err(RaceInvariantError::WinnerMismatch {
                winner: self.winner_ship_id,
                first: self.placements[0],
            });
        }

        let mut unfinished_seen = false;
        for (position, ship) in self.placements.iter().enumerate() {
            let finished = self.finish_keys[*ship as usize].is_some();
            if finished && unfinished_seen {
                return Err(RaceInvariantError::FinishOrder { position });
            }
            unfinished_seen |= !finished;
        }

        if self.events.len() > MAX_TURN_EVENTS {
            return Err(RaceInvariantError::TooManyEvents {
                got: self.events.len(),
                max: MAX_TURN_EVENTS,
            });
        }
        let mut last_turn = [0u8; SHIP_COUNT];
        let mut last_distance = [0u64; SHIP_COUNT];
        let mut done = [false; SHIP_COUNT];
        for event in &self.events {
            let ship = event.ship_id as usize;
            if ship >= SHIP_COUNT || event.turn == 0 || event.turn > RACE_TURNS {
                return Err(RaceInvariantError::EventOutOfRange {
                    turn: event.turn,
                    ship: event.ship_id,
                });
            }
            if done[ship] || event.turn <= last_turn[ship] {
                return Err(RaceInvariantError::EventAfterFinish {
                    ship: event.ship_id,
                    turn: event.turn,
                });
            }
            if event.resulting_distance < last_distance[ship] {
                return Err(RaceInvariantError::DistanceRegressed {
                    ship: event.ship_id,
                    turn: event.turn,
                });
            }
            last_turn[ship] = event.turn;
            last_distance[ship] = event.resulting_distance;
            done[ship] = event.finished;
        }
        for ship in 0..SHIP_COUNT {
            if last_distance[ship] != self.final_distances[ship] {
                return Err(RaceInvariantError::DistanceMismatch { ship: ship as u8 });
            }
        }
        Ok(())
    }
}

impl Write for RaceResult {
    fn write(&self, writer: &mut impl BufMut) {
        self.race_id.write(writer);
        self.seed.write(writer);
        self.winner_ship_id.write(writer);
        self.placements.write(writer);
        for key in &self.finish_keys {
            key.write(writer);
        }
        write_u64_array(&self.final_distances, writer);
        self.events.write(writer);
    }
}

impl Read for RaceResult {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let race_id = u64::read(reader)?;
        let seed = <[u8; 32]>::read(reader)?;
        let winner_ship_id = u8::read(reader)?;
        let placements = <[u8; SHIP_COUNT]>::read(reader)?;
        let mut finish_keys = [None; SHIP_COUNT];
        for key in finish_keys.iter_mut() {
            *key = Option::<FinishKey>::read(reader)?;
        }
        let final_distances = read_u64_array::<SHIP_COUNT>(reader)?;
        let events = Vec::<TurnEvent>::read_range(reader, 0..=MAX_TURN_EVENTS)?;
        Ok(Self {
            race_id,
            seed,
            winner_ship_id,
            placements,
            finish_keys,
            final_distances,
            events,
        })
    }
}

impl EncodeSize for RaceResult {
    fn encode_size(&self) -> usize {
        self.race_id.encode_size()
            + self.seed.encode_size()
            + self.winner_ship_id.encode_size()
            + self.placements.encode_size()
            + self
                .finish_keys
                .iter()
                .map(EncodeSize::encode_size)
                .sum::<usize>()
            + u64_array_encode_size(&self.final_distances)
            + self.events.encode_size()
    }
}
