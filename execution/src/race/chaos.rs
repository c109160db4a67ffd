//! Chaos resolution.
//!
//! Decides whether a ship's chaos factor fires on a turn and folds the effect into that turn's
//! speed, move and distance jump. Resolution is a pure function of the ship, the turn, the
//! ship's speed going into the turn, the start-of-turn [Standings] and the [RaceSeed].
//!
//! All arithmetic is clamped at [MAX_SPEED]; no combination of speed and multiplier can wrap.

use crate::seed::{RaceSeed, CHAOS_DOMAIN, WILDCARD_DOMAIN};
use spacerace_types::{
    ChaosKind, Ship, ShipRunState, AFTERBURNER_BONUS, LAST_STAND_MULTIPLIER, LAST_STAND_TURNS,
    MAX_SPEED, OVERDRIVE_MULTIPLIER, QUANTUM_TUNNEL_JUMP, RACE_TURNS, SHIP_COUNT, SLIPSTREAM_DEN,
    SLIPSTREAM_NUM, UNSTABLE_ENGINE_MULTIPLIER,
};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChaosError {
    #[error("invalid ship id {0}")]
    InvalidShipId(u8),
    #[error("invalid turn {0} (expected 1..=10)")]
    InvalidTurn(u8),
}

/// Race order at the start of a turn.
///
/// Finished ships rank first by finish key, then unfinished ships by descending distance; any
/// remaining tie goes to the lower ship id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Standings {
    order: [u8; SHIP_COUNT],
    finished: [bool; SHIP_COUNT],
}

impl Standings {
    pub fn from_states(states: &[ShipRunState; SHIP_COUNT]) -> Self {
        let mut order = [0u8; SHIP_COUNT];
        for (slot, id) in order.iter_mut().enumerate() {
            *id = slot as u8;
        }
        order.sort_by(|a, b| compare_standing(*a, &states[*a as usize], *b, &states[*b as usize]));
        let mut finished = [false; SHIP_COUNT];
        for (flag, state) in finished.iter_mut().zip(states.iter()) {
            *flag = state.is_finished();
        }
        Self { order, finished }
    }

    /// Ship ids, best first.
    pub fn order(&self) -> &[u8; SHIP_COUNT] {
        &self.order
    }

    /// Zero-based standing of a ship.
    pub fn position(&self, ship_id: u8) -> Option<usize> {
        self.order.iter().position(|id| *id == ship_id)
    }

    pub fn leader(&self) -> u8 {
        self.order[0]
    }

    pub fn second(&self) -> u8 {
        self.order[1]
    }

    pub fn is_finished(&self, ship_id: u8) -> bool {
        self.finished
            .get(ship_id as usize)
            .copied()
            .unwrap_or(false)
    }
}

/// Total order used for both mid-race standings and final placements.
pub(crate) fn compare_standing(
    a_id: u8,
    a: &ShipRunState,
    b_id: u8,
    b: &ShipRunState,
) -> Ordering {
    let by_progress = match (a.finished_at, b.finished_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.distance.cmp(&a.distance),
    };
    by_progress.then_with(|| a_id.cmp(&b_id))
}

/// What one ship does on one turn, before incoming attacks are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChaosOutcome {
    pub triggered: bool,
    /// The ship's archetype.
    pub kind: ChaosKind,
    /// The effect applied, if the factor fired (a wildcard's delegate, otherwise `kind`).
    pub effect: Option<ChaosKind>,
    /// Acceleration used this turn.
    pub acceleration: u64,
    /// Speed carried into the next turn.
    pub speed: u64,
    /// Distance covered this turn from speed alone (turn-only multipliers included).
    pub move_amount: u64,
    /// Flat distance added on top of the move.
    pub distance_jump: u64,
    /// Ship whose move this ship's attack halves.
    pub target_ship_id: Option<u8>,
}

/// Resolve a ship's chaos factor for one turn.
pub fn resolve(
    ship: &Ship,
    turn: u8,
    current_speed: u64,
    standings: &Standings,
    seed: &RaceSeed,
) -> Result<ChaosOutcome, ChaosError> {
    if ship.id as usize >= SHIP_COUNT {
        return Err(ChaosError::InvalidShipId(ship.id));
    }
    if turn == 0 || turn > RACE_TURNS {
        return Err(ChaosError::InvalidTurn(turn));
    }
    Ok(resolve_unchecked(ship, turn, current_speed, standings, seed))
}

/// [resolve] for inputs the simulator has already bounded.
pub(crate) fn resolve_unchecked(
    ship: &Ship,
    turn: u8,
    current_speed: u64,
    standings: &Standings,
    seed: &RaceSeed,
) -> ChaosOutcome {
    let triggered = ship.chaos_chance > 0
        && seed.roll_below(CHAOS_DOMAIN, ship.id, turn, 100) < ship.chaos_chance as u64;
    let effect = match (triggered, ship.chaos_kind) {
        (false, _) => None,
        (true, ChaosKind::RogueAi) => {
            let choices = ChaosKind::DELEGATES.len() as u64;
            let pick = seed.roll_below(WILDCARD_DOMAIN, ship.id, turn, choices) as usize;
            Some(ChaosKind::DELEGATES[pick])
        }
        (true, kind) => Some(kind),
    };

    let mut acceleration = ship.acceleration;
    let mut speed_bonus = 0;
    let mut multiplier = (1, 1);
    let mut distance_jump = 0;
    let mut target_ship_id = None;
    match effect {
        Some(ChaosKind::Overdrive) => multiplier = (OVERDRIVE_MULTIPLIER, 1),
        Some(ChaosKind::UnstableEngine) => {
            acceleration = clamped_mul(acceleration, UNSTABLE_ENGINE_MULTIPLIER)
        }
        Some(ChaosKind::Slipstream) => {
            if standings.leader() != ship.id {
                multiplier = (SLIPSTREAM_NUM, SLIPSTREAM_DEN);
            }
        }
        Some(ChaosKind::QuantumTunnel) => distance_jump = QUANTUM_TUNNEL_JUMP,
        Some(ChaosKind::LastStand) => {
            if turn > RACE_TURNS.saturating_sub(LAST_STAND_TURNS) {
                multiplier = (LAST_STAND_MULTIPLIER, 1);
            }
        }
        Some(ChaosKind::EmpBlast) => {
            let second = standings.second();
            if second != ship.id && !standings.is_finished(second) {
                target_ship_id = Some(second);
            }
        }
        Some(ChaosKind::Afterburner) => speed_bonus = AFTERBURNER_BONUS,
        Some(ChaosKind::RogueAi) | None => {}
    }

    let speed = current_speed
        .saturating_add(acceleration)
        .saturating_add(speed_bonus)
        .min(MAX_SPEED);
    let move_amount = clamped_scale(speed, multiplier.0, multiplier.1);

    if let Some(effect) = effect {
        debug!(
            ship = ship.id,
            turn,
            kind = ?ship.chaos_kind,
            ?effect,
            target = ?target_ship_id,
            "chaos triggered"
        );
    }

    ChaosOutcome {
        triggered,
        kind: ship.chaos_kind,
        effect,
        acceleration,
        speed,
        move_amount,
        distance_jump,
        target_ship_id,
    }
}

/// `value * factor`, clamped at [MAX_SPEED].
fn clamped_mul(value: u64, factor: u64) -> u64 {
    value.checked_mul(factor).unwrap_or(MAX_SPEED).min(MAX_SPEED)
}

/// `value * num / den`, clamped at [MAX_SPEED].
fn clamped_scale(value: u64, num: u64, den: u64) -> u64 {
    let scaled = (value as u128 * num as u128) / den.max(1) as u128;
    u64::try_from(scaled).unwrap_or(MAX_SPEED).min(MAX_SPEED)
}
