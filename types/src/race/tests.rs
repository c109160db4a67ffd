use super::*;
use commonware_codec::{Encode, ReadExt};
use commonware_cryptography::{ed25519::PrivateKey, Signer};
use std::collections::BTreeSet;

fn idle_race() -> RaceResult {
    // Every ship crawls one unit on turn 1, so the order falls back to descending distance
    // and then ascending id.
    let events = (0..SHIP_COUNT as u8)
        .map(|ship_id| TurnEvent {
            turn: 1,
            ship_id,
            move_amount: 1,
            resulting_distance: 1,
            chaos_kind_triggered: None,
            applied_effect: None,
            target_ship_id: None,
            brakes_received: 0,
            finished: false,
        })
        .collect();
    RaceResult {
        race_id: 1,
        seed: [7u8; 32],
        winner_ship_id: 0,
        placements: [0, 1, 2, 3, 4, 5, 6, 7],
        finish_keys: [None; SHIP_COUNT],
        final_distances: [1; SHIP_COUNT],
        events,
    }
}

#[test]
fn test_catalog_is_ordered_by_id() {
    for (slot, ship) in all_ships().iter().enumerate() {
        assert_eq!(ship.id as usize, slot);
        assert!(ship.chaos_chance <= 100);
        assert!(ship.odds_bps > BPS_SCALE, "odds must pay more than the stake");
    }
    let kinds: BTreeSet<ChaosKind> = all_ships().iter().map(|s| s.chaos_kind).collect();
    assert_eq!(kinds.len(), SHIP_COUNT, "one archetype per ship");
}

#[test]
fn test_get_ship_rejects_unknown_id() {
    assert_eq!(get_ship(5).unwrap().name, "Vanguard");
    assert_eq!(get_ship(8), Err(RegistryError::InvalidShipId(8)));
    assert_eq!(get_ship(u8::MAX), Err(RegistryError::InvalidShipId(u8::MAX)));
}

#[test]
fn test_roster_rejects_misplaced_ships() {
    let mut ships = SHIPS;
    ships.swap(0, 1);
    assert_eq!(
        Roster::new(ships),
        Err(RegistryError::MisplacedShip { slot: 0, id: 1 })
    );

    let mut ships = SHIPS;
    ships[3].chaos_chance = 101;
    assert_eq!(
        Roster::new(ships),
        Err(RegistryError::ChanceOutOfRange { id: 3, chance: 101 })
    );
    assert_eq!(Roster::new(SHIPS).unwrap(), Roster::standard());
}

#[test]
fn test_finish_key_orders_by_turn_then_fraction() {
    let early = FinishKey::new(9, 88, 150);
    let late_same_turn = FinishKey::new(9, 140, 150);
    let next_turn = FinishKey::new(10, 1, 1_000);
    assert!(early < late_same_turn);
    assert!(late_same_turn < next_turn);

    // Equal fractions with different denominators compare equal.
    assert_eq!(FinishKey::new(4, 1, 2), FinishKey::new(4, 50, 100));
    assert!((early.as_f64() - 9.5866).abs() < 1e-3);
}

#[test]
fn test_race_validate_accepts_well_formed_result() {
    idle_race().validate().expect("valid race");
}

#[test]
fn test_race_validate_rejects_duplicate_placements() {
    let mut race = idle_race();
    race.placements[7] = 0;
    assert_eq!(
        race.validate(),
        Err(RaceInvariantError::NotAPermutation { ship: 0 })
    );

    let mut race = idle_race();
    race.placements[7] = 9;
    assert_eq!(
        race.validate(),
        Err(RaceInvariantError::NotAPermutation { ship: 9 })
    );
}

#[test]
fn test_race_validate_rejects_winner_mismatch() {
    let mut race = idle_race();
    race.winner_ship_id = 3;
    assert!(matches!(
        race.validate(),
        Err(RaceInvariantError::WinnerMismatch { winner: 3, first: 0 })
    ));
}

#[test]
fn test_race_validate_rejects_regressing_distance() {
    let mut race = idle_race();
    race.events.push(TurnEvent {
        turn: 2,
        ship_id: 4,
        move_amount: 0,
        resulting_distance: 0,
        chaos_kind_triggered: None,
        applied_effect: None,
        target_ship_id: None,
        brakes_received: 0,
        finished: false,
    });
    race.final_distances[4] = 0;
    assert_eq!(
        race.validate(),
        Err(RaceInvariantError::DistanceRegressed { ship: 4, turn: 2 })
    );
}

#[test]
fn test_race_validate_rejects_finished_after_unfinished() {
    let mut race = idle_race();
    race.finish_keys[7] = Some(FinishKey::new(10, 1, 2));
    assert_eq!(
        race.validate(),
        Err(RaceInvariantError::FinishOrder { position: 7 })
    );
}

#[test]
fn test_race_result_roundtrip() {
    let mut race = idle_race();
    race.finish_keys[0] = Some(FinishKey::new(9, 88, 150));
    race.events[0].chaos_kind_triggered = Some(ChaosKind::RogueAi);
    race.events[0].applied_effect = Some(ChaosKind::EmpBlast);
    race.events[0].target_ship_id = Some(1);

    let encoded = race.encode();
    let decoded = RaceResult::read(&mut &encoded[..]).unwrap();
    assert_eq!(race, decoded);
}

#[test]
fn test_pool_state_roundtrip() {
    let mut pool = PoolState::default();
    pool.book[2] = 500;
    pool.jackpots.accumulators[1] = 12_345;
    pool.races_settled = 9;

    let encoded = pool.encode();
    let decoded = PoolState::read(&mut &encoded[..]).unwrap();
    assert_eq!(pool, decoded);
}

#[test]
fn test_jackpot_state_defaults_to_floors() {
    let jackpots = JackpotState::default();
    assert_eq!(jackpots.mini(), JACKPOT_FLOORS[0]);
    assert_eq!(jackpots.mega(), JACKPOT_FLOORS[1]);
    assert_eq!(jackpots.super_jackpot(), JACKPOT_FLOORS[2]);
    assert_eq!(jackpots.amount(JackpotTier::None), 0);
}

#[test]
fn test_jackpot_tier_ordering_tracks_severity() {
    assert!(JackpotTier::None < JackpotTier::Mini);
    assert!(JackpotTier::Mini < JackpotTier::Mega);
    assert!(JackpotTier::Mega < JackpotTier::Super);
    assert_eq!(JackpotTier::Mega.max(JackpotTier::Mini), JackpotTier::Mega);
}

#[test]
fn test_progress_roundtrip() {
    let mut progress = PlayerProgress::default();
    progress.bets_per_ship[3] = 2;
    progress.placements[3][0] = 1;
    progress.races = 2;
    progress.total_wagered = 300;
    progress.lifetime_winnings = 425;
    progress.highest_jackpot_tier = JackpotTier::Mini;
    progress.unlocked.insert(AchievementId(4));
    progress.unlocked.insert(AchievementId(1));
    progress.validate_invariants().expect("valid invariants");

    let encoded = progress.encode();
    let decoded = PlayerProgress::read(&mut &encoded[..]).unwrap();
    assert_eq!(progress, decoded);
}

#[test]
fn test_progress_validate_rejects_inconsistent_counters() {
    let mut progress = PlayerProgress::default();
    progress.bets_per_ship[0] = 1;
    assert!(matches!(
        progress.validate_invariants(),
        Err(ProgressInvariantError::BetsDisagreeWithRaces { bets: 1, races: 0 })
    ));

    progress.races = 1;
    progress.placements[0] = [1, 1, 0, 0];
    assert!(matches!(
        progress.validate_invariants(),
        Err(ProgressInvariantError::PlacementsExceedBets { ship: 0, .. })
    ));

    progress.placements[0] = [1, 0, 0, 0];
    progress
        .unlocked
        .insert(AchievementId(ACHIEVEMENT_COUNT as u16));
    assert!(matches!(
        progress.validate_invariants(),
        Err(ProgressInvariantError::UnknownAchievement(_))
    ));
}

#[test]
fn test_leaderboard_keeps_top_entries_ranked() {
    let mut leaderboard = Leaderboard::default();
    for i in 0..15u64 {
        let pk = PrivateKey::from_seed(i + 1).public_key();
        leaderboard.update(pk, (i + 1) * 1_000);
    }

    assert_eq!(leaderboard.entries.len(), LEADERBOARD_SIZE);
    for pair in leaderboard.entries.windows(2) {
        assert!(pair[0].winnings >= pair[1].winnings);
    }
    for (i, entry) in leaderboard.entries.iter().enumerate() {
        assert_eq!(entry.rank, (i + 1) as u32);
    }

    let top = PrivateKey::from_seed(15).public_key();
    assert_eq!(leaderboard.rank_of(&top), Some(1));
    let dropped = PrivateKey::from_seed(1).public_key();
    assert_eq!(leaderboard.rank_of(&dropped), None);
}

#[test]
fn test_leaderboard_equal_winnings_ordering_is_deterministic() {
    let mut keys: Vec<_> = (1..=3u64)
        .map(|seed| PrivateKey::from_seed(seed).public_key())
        .collect();
    keys.sort();

    let mut leaderboard = Leaderboard::default();
    leaderboard.update(keys[2].clone(), 500);
    leaderboard.update(keys[0].clone(), 500);
    leaderboard.update(keys[1].clone(), 500);

    let ordered: Vec<_> = leaderboard.entries.iter().map(|e| e.player.clone()).collect();
    assert_eq!(ordered, keys);

    let encoded = leaderboard.encode();
    let decoded = Leaderboard::read(&mut &encoded[..]).unwrap();
    assert_eq!(leaderboard, decoded);
}
