use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use serde::Serialize;
use thiserror::Error as ThisError;

use super::SHIP_COUNT;

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid ship id {0} (expected 0..=7)")]
    InvalidShipId(u8),
    #[error("roster slot {slot} holds ship id {id}")]
    MisplacedShip { slot: usize, id: u8 },
    #[error("ship {id} chaos chance {chance}% exceeds 100%")]
    ChanceOutOfRange { id: u8, chance: u8 },
}

/// Chaos archetypes. Each ship carries exactly one.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChaosKind {
    /// Move doubled for the turn.
    Overdrive = 0,
    /// Acceleration tripled for the turn; the extra speed is kept.
    UnstableEngine = 1,
    /// Move boosted while the ship is not leading.
    Slipstream = 2,
    /// Flat distance jump, independent of speed.
    QuantumTunnel = 3,
    /// Move doubled, final turns only.
    LastStand = 4,
    /// Halves the move of whichever ship is 2nd at turn start.
    EmpBlast = 5,
    /// Re-rolls one of the other effects.
    RogueAi = 6,
    /// Permanent flat speed bonus.
    Afterburner = 7,
}

impl ChaosKind {
    /// Every effect a wildcard can delegate to, in catalog order.
    pub const DELEGATES: [ChaosKind; 7] = [
        ChaosKind::Overdrive,
        ChaosKind::UnstableEngine,
        ChaosKind::Slipstream,
        ChaosKind::QuantumTunnel,
        ChaosKind::LastStand,
        ChaosKind::EmpBlast,
        ChaosKind::Afterburner,
    ];

    /// Whether the effect acts on another ship.
    pub fn is_attack(self) -> bool {
        matches!(self, ChaosKind::EmpBlast)
    }
}

impl TryFrom<u8> for ChaosKind {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ChaosKind::Overdrive),
            1 => Ok(ChaosKind::UnstableEngine),
            2 => Ok(ChaosKind::Slipstream),
            3 => Ok(ChaosKind::QuantumTunnel),
            4 => Ok(ChaosKind::LastStand),
            5 => Ok(ChaosKind::EmpBlast),
            6 => Ok(ChaosKind::RogueAi),
            7 => Ok(ChaosKind::Afterburner),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl Write for ChaosKind {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for ChaosKind {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        ChaosKind::try_from(u8::read(reader)?)
    }
}

impl FixedSize for ChaosKind {
    const SIZE: usize = 1;
}

/// Immutable catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Ship {
    pub id: u8,
    pub name: &'static str,
    pub base_speed: u64,
    pub acceleration: u64,
    pub chaos_kind: ChaosKind,
    /// Trigger chance in whole percent (0..=100).
    pub chaos_chance: u8,
    /// Fixed-odds payout multiplier in basis points (10_000 = 1.00x).
    pub odds_bps: u64,
}

/// The fixed eight-ship catalog, ordered by id.
pub const SHIPS: [Ship; SHIP_COUNT] = [
    Ship {
        id: 0,
        name: "Comet",
        base_speed: 78,
        acceleration: 8,
        chaos_kind: ChaosKind::Overdrive,
        chaos_chance: 10,
        odds_bps: 35_000,
    },
    Ship {
        id: 1,
        name: "Juggernaut",
        base_speed: 64,
        acceleration: 12,
        chaos_kind: ChaosKind::UnstableEngine,
        chaos_chance: 25,
        odds_bps: 40_000,
    },
    Ship {
        id: 2,
        name: "Shadow",
        base_speed: 74,
        acceleration: 8,
        chaos_kind: ChaosKind::Slipstream,
        chaos_chance: 40,
        odds_bps: 37_500,
    },
    Ship {
        id: 3,
        name: "Phantom",
        base_speed: 68,
        acceleration: 9,
        chaos_kind: ChaosKind::QuantumTunnel,
        chaos_chance: 15,
        odds_bps: 42_500,
    },
    Ship {
        id: 4,
        name: "Phoenix",
        base_speed: 70,
        acceleration: 8,
        chaos_kind: ChaosKind::LastStand,
        chaos_chance: 60,
        odds_bps: 45_000,
    },
    Ship {
        id: 5,
        name: "Vanguard",
        base_speed: 76,
        acceleration: 7,
        chaos_kind: ChaosKind::EmpBlast,
        chaos_chance: 75,
        odds_bps: 32_500,
    },
    Ship {
        id: 6,
        name: "Wildcard",
        base_speed: 70,
        acceleration: 9,
        chaos_kind: ChaosKind::RogueAi,
        chaos_chance: 30,
        odds_bps: 40_000,
    },
    Ship {
        id: 7,
        name: "Apex",
        base_speed: 72,
        acceleration: 8,
        chaos_kind: ChaosKind::Afterburner,
        chaos_chance: 20,
        odds_bps: 35_000,
    },
];

/// Look up a catalog ship.
pub fn get_ship(id: u8) -> Result<Ship, RegistryError> {
    SHIPS
        .get(id as usize)
        .copied()
        .ok_or(RegistryError::InvalidShipId(id))
}

/// The full catalog in id order.
pub fn all_ships() -> &'static [Ship; SHIP_COUNT] {
    &SHIPS
}

/// Validate a ship id without fetching the entry.
pub fn ensure_ship_id(id: u8) -> Result<(), RegistryError> {
    if (id as usize) < SHIP_COUNT {
        Ok(())
    } else {
        Err(RegistryError::InvalidShipId(id))
    }
}

/// The eight ships taking part in a race, slot `i` holding ship id `i`.
///
/// The catalog roster is what every wager races against; custom rosters exist so tests and
/// tooling can pin stats (e.g. disable chaos) while keeping the same simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Roster([Ship; SHIP_COUNT]);

impl Roster {
    pub fn new(ships: [Ship; SHIP_COUNT]) -> Result<Self, RegistryError> {
        for (slot, ship) in ships.iter().enumerate() {
            if ship.id as usize != slot {
                return Err(RegistryError::MisplacedShip { slot, id: ship.id });
            }
            if ship.chaos_chance > 100 {
                return Err(RegistryError::ChanceOutOfRange {
                    id: ship.id,
                    chance: ship.chaos_chance,
                });
            }
        }
        Ok(Self(ships))
    }

    /// The fixed catalog roster.
    pub fn standard() -> Self {
        Self(SHIPS)
    }

    pub fn ships(&self) -> &[Ship; SHIP_COUNT] {
        &self.0
    }

    pub fn get(&self, id: u8) -> Result<&Ship, RegistryError> {
        self.0
            .get(id as usize)
            .ok_or(RegistryError::InvalidShipId(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ship> {
        self.0.iter()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::standard()
    }
}
