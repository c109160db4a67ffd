//! Turn-by-turn race simulation.
//!
//! Each turn runs in two phases. Chaos for every unfinished ship is resolved first, against the
//! standings as they were when the turn began; moves (and any incoming brakes) are applied
//! afterwards. Processing order within a turn therefore never changes the outcome.

use super::chaos::{compare_standing, resolve_unchecked, ChaosOutcome, Standings};
use crate::seed::{RaceSeed, SEED_LEN};
use spacerace_types::{
    FinishKey, RaceResult, Roster, ShipRunState, TurnEvent, EMP_BRAKE_DIVISOR, MAX_DISTANCE,
    MAX_SPEED, MAX_TURN_EVENTS, RACE_TURNS, SHIP_COUNT, TRACK_DISTANCE,
};
use tracing::debug;

/// Run a full race for `roster` under `seed`.
///
/// Total over every roster: a roster that never reaches the line simply yields an all-unfinished
/// result ordered by distance (then id).
///
/// Ships accelerate before they move, so a chaos-free 78/8 ship covers 86 on turn 1 and crosses
/// the line during turn 9 with finish key `9 + 88/150`.
pub fn simulate(roster: &Roster, seed: &RaceSeed, race_id: u64) -> RaceResult {
    let mut states = roster
        .ships()
        .map(|ship| ShipRunState::new(ship.base_speed.min(MAX_SPEED)));
    let mut events = Vec::with_capacity(MAX_TURN_EVENTS);

    for turn in 1..=RACE_TURNS {
        let standings = Standings::from_states(&states);

        // Resolve every ship against the start-of-turn snapshot.
        let mut outcomes: [Option<ChaosOutcome>; SHIP_COUNT] = [None; SHIP_COUNT];
        let mut brakes = [0u8; SHIP_COUNT];
        for ship in roster.iter() {
            let state = &states[ship.id as usize];
            if state.is_finished() {
                continue;
            }
            let outcome = resolve_unchecked(ship, turn, state.current_speed, &standings, seed);
            if let Some(target) = outcome.target_ship_id {
                brakes[target as usize] = brakes[target as usize].saturating_add(1);
            }
            outcomes[ship.id as usize] = Some(outcome);
        }

        // Apply moves.
        for (id, outcome) in outcomes.iter().enumerate() {
            let Some(outcome) = outcome else {
                continue;
            };
            let state = &mut states[id];

            let mut move_amount = outcome.move_amount;
            for _ in 0..brakes[id] {
                move_amount /= EMP_BRAKE_DIVISOR;
            }
            let advance = move_amount.saturating_add(outcome.distance_jump);
            let previous = state.distance;
            state.current_speed = outcome.speed;
            state.distance = previous.saturating_add(advance).min(MAX_DISTANCE);

            // Unfinished ships are always short of the line, so a crossing implies `advance > 0`.
            let finished = state.distance >= TRACK_DISTANCE;
            if finished {
                let key = FinishKey::new(turn, TRACK_DISTANCE - previous, advance);
                state.finished_at = Some(key);
                debug!(
                    race_id,
                    ship = id,
                    turn,
                    finish = key.as_f64(),
                    "ship finished"
                );
            }

            events.push(TurnEvent {
                turn,
                ship_id: id as u8,
                move_amount: advance,
                resulting_distance: state.distance,
                chaos_kind_triggered: outcome.triggered.then_some(outcome.kind),
                applied_effect: outcome.effect,
                target_ship_id: outcome.target_ship_id,
                brakes_received: brakes[id],
                finished,
            });
        }
    }

    let mut placements = [0u8; SHIP_COUNT];
    for (slot, id) in placements.iter_mut().enumerate() {
        *id = slot as u8;
    }
    placements.sort_by(|a, b| compare_standing(*a, &states[*a as usize], *b, &states[*b as usize]));

    RaceResult {
        race_id,
        seed: *seed.as_bytes(),
        winner_ship_id: placements[0],
        placements,
        finish_keys: states.map(|state| state.finished_at),
        final_distances: states.map(|state| state.distance),
        events,
    }
}

/// Simulate the catalog roster from caller entropy without a wager attached.
pub fn simulate_debug(entropy: &[u8]) -> RaceResult {
    simulate(&Roster::standard(), &RaceSeed::from_entropy(entropy), 0)
}

/// Re-run a recorded race from its seed.
pub fn replay(seed: [u8; SEED_LEN], race_id: u64) -> RaceResult {
    simulate(&Roster::standard(), &RaceSeed::from_bytes(seed), race_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{quiet_roster, stress_roster};
    use proptest::prelude::*;
    use spacerace_types::SHIPS;

    #[test]
    fn test_quiet_race_matches_hand_computed_distances() {
        let race = simulate(&quiet_roster(), &RaceSeed::from_entropy(b"quiet"), 1);
        race.validate().expect("valid race");

        let comet: Vec<_> = race.events_for(0).collect();
        let moves: Vec<u64> = comet.iter().map(|e| e.move_amount).collect();
        assert_eq!(moves, vec![86, 94, 102, 110, 118, 126, 134, 142, 150]);
        assert_eq!(comet[6].resulting_distance, 770);
        assert_eq!(comet[7].resulting_distance, 912);
        assert_eq!(comet[8].resulting_distance, 1062);
        assert!(comet[8].finished);
        assert_eq!(race.finish_keys[0], Some(FinishKey::new(9, 88, 150)));

        // Juggernaut's late acceleration beats Comet within the same turn.
        assert_eq!(race.finish_keys[1], Some(FinishKey::new(9, 56, 172)));
        assert_eq!(race.placements, [1, 0, 6, 2, 3, 7, 5, 4]);
        assert_eq!(race.winner_ship_id, 1);
        assert!(race.events.iter().all(|e| e.chaos_kind_triggered.is_none()));
    }

    #[test]
    fn test_no_events_after_finish() {
        let race = simulate(&quiet_roster(), &RaceSeed::from_entropy(b"quiet"), 1);
        for ship in 0..SHIP_COUNT as u8 {
            let events: Vec<_> = race.events_for(ship).collect();
            let finished_at = events.iter().position(|e| e.finished);
            if let Some(index) = finished_at {
                assert_eq!(index, events.len() - 1, "ship {ship} moved after finishing");
            }
        }
    }

    #[test]
    fn test_stalled_roster_orders_by_id() {
        let mut ships = SHIPS;
        for ship in ships.iter_mut() {
            ship.base_speed = 0;
            ship.acceleration = 0;
            ship.chaos_chance = 0;
        }
        let roster = Roster::new(ships).unwrap();
        let race = simulate(&roster, &RaceSeed::from_entropy(b"stalled"), 3);
        race.validate().expect("valid race");
        assert_eq!(race.placements, [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(race.winner_ship_id, 0);
        assert!(race.finish_keys.iter().all(Option::is_none));
        assert_eq!(race.final_distances, [0; SHIP_COUNT]);
    }

    #[test]
    fn test_replay_reproduces_recorded_race() {
        let race = simulate(&Roster::standard(), &RaceSeed::from_entropy(b"replay"), 42);
        assert_eq!(replay(race.seed, 42), race);
    }

    #[test]
    fn test_debug_uses_catalog_roster() {
        let expected = simulate(&Roster::standard(), &RaceSeed::from_entropy(b"debug"), 0);
        assert_eq!(simulate_debug(b"debug"), expected);
    }

    #[test]
    fn test_emp_hits_are_recorded_on_target() {
        // Scan seeds until an EMP lands, then check the brake shows up on the victim.
        for i in 0..200u32 {
            let race = simulate_debug(&i.to_be_bytes());
            let Some(attack) = race.events.iter().find(|e| e.target_ship_id.is_some()) else {
                continue;
            };
            let target = attack.target_ship_id.unwrap();
            let hit = race
                .events
                .iter()
                .find(|e| e.turn == attack.turn && e.ship_id == target)
                .expect("target moved on the attack turn");
            assert!(hit.brakes_received >= 1);
            return;
        }
        panic!("no EMP fired across 200 seeds");
    }

    proptest! {
        #[test]
        fn prop_simulation_is_deterministic(entropy in proptest::collection::vec(any::<u8>(), 0..64)) {
            let a = simulate_debug(&entropy);
            let b = simulate_debug(&entropy);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_placements_are_a_permutation(entropy in proptest::collection::vec(any::<u8>(), 0..64)) {
            let race = simulate_debug(&entropy);
            let mut sorted = race.placements;
            sorted.sort_unstable();
            prop_assert_eq!(sorted, [0, 1, 2, 3, 4, 5, 6, 7]);
            prop_assert_eq!(race.winner_ship_id, race.placements[0]);
            prop_assert!(race.validate().is_ok());
        }

        #[test]
        fn prop_distance_is_monotonic(entropy in proptest::collection::vec(any::<u8>(), 0..64)) {
            let race = simulate_debug(&entropy);
            for ship in 0..SHIP_COUNT as u8 {
                let mut last = 0;
                for event in race.events_for(ship) {
                    prop_assert!(event.resulting_distance >= last);
                    last = event.resulting_distance;
                }
            }
        }

        #[test]
        fn prop_stress_speeds_never_overflow(
            speed in 0u64..=10_000,
            acceleration in 0u64..=10_000,
            entropy in any::<[u8; 8]>(),
        ) {
            let race = simulate(&stress_roster(speed, acceleration), &RaceSeed::from_entropy(&entropy), 9);
            prop_assert!(race.validate().is_ok());
            for event in &race.events {
                prop_assert!(event.resulting_distance <= MAX_DISTANCE);
            }
        }
    }
}
