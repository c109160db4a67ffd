/// Number of ships in every race.
pub const SHIP_COUNT: usize = 8;

/// Distance a ship must cover to finish.
pub const TRACK_DISTANCE: u64 = 1_000;

/// Number of discrete turns in a race.
pub const RACE_TURNS: u8 = 10;

/// Upper bound on any ship speed (and any single-turn move) after chaos is applied.
pub const MAX_SPEED: u64 = 1_000_000;

/// Upper bound on accumulated distance.
pub const MAX_DISTANCE: u64 = 1_000_000_000;

/// Highest placement tracked per ship in player progress (1st..=4th).
pub const TRACKED_PLACEMENTS: usize = 4;

/// Upper bound on turn events in one race (every ship moving every turn).
pub const MAX_TURN_EVENTS: usize = SHIP_COUNT * RACE_TURNS as usize;

/// Basis points denominator used for odds, fees and jackpot contributions.
pub const BPS_SCALE: u64 = 10_000;

/// Number of jackpot tiers (mini, mega, super).
pub const JACKPOT_TIERS: usize = 3;

/// Size of the achievement catalog:
/// 3 betting tiers per ship, 4 tiers per ship and placement rank, 3 race milestones, 2 specials.
pub const ACHIEVEMENT_COUNT: usize =
    SHIP_COUNT * 3 + SHIP_COUNT * TRACKED_PLACEMENTS * PLACEMENT_TIER_COUNT + 3 + 2;

/// Threshold tiers per (ship, placement rank) pair.
pub const PLACEMENT_TIER_COUNT: usize = 4;

/// Leaderboard length.
pub const LEADERBOARD_SIZE: usize = 10;

// Chaos effect parameters.
pub const OVERDRIVE_MULTIPLIER: u64 = 2;
pub const UNSTABLE_ENGINE_MULTIPLIER: u64 = 3;
/// Slipstream boosts the move by `NUM / DEN` while the ship is not leading.
pub const SLIPSTREAM_NUM: u64 = 3;
pub const SLIPSTREAM_DEN: u64 = 2;
pub const QUANTUM_TUNNEL_JUMP: u64 = 150;
pub const LAST_STAND_MULTIPLIER: u64 = 2;
/// Last Stand only applies during the final `LAST_STAND_TURNS` turns.
pub const LAST_STAND_TURNS: u8 = 3;
/// Each EMP hit divides the target's move for the turn.
pub const EMP_BRAKE_DIVISOR: u64 = 2;
pub const AFTERBURNER_BONUS: u64 = 20;

// Settlement defaults.
pub const DEFAULT_MIN_BET: u64 = 10;
pub const DEFAULT_MAX_BET: u64 = 1_000_000;
pub const DEFAULT_HOUSE_EDGE_BPS: u64 = 500;
pub const DEFAULT_HOUSE_SEED_BALANCE: u64 = 10_000_000;

// Jackpot defaults, indexed by tier (mini, mega, super).
pub const JACKPOT_CONTRIBUTION_BPS: [u64; JACKPOT_TIERS] = [100, 50, 25];
/// Trigger chance out of `BPS_SCALE`.
pub const JACKPOT_CHANCE_BPS: [u64; JACKPOT_TIERS] = [100, 10, 1];
pub const JACKPOT_FLOORS: [u64; JACKPOT_TIERS] = [1_000, 10_000, 100_000];
