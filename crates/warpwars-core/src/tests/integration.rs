//! Whole matches played through the tick loop.
//!
//! Every scenario drives the game the way a presentation layer would: input
//! frames into [`Simulation::step`], overlay buttons activated by id, and
//! events drained afterwards.

use glam::Vec2;

use crate::colonize;
use crate::config::{GameConfig, MapConfig};
use crate::entity::{Entity, MotionState, Waypoint, WaypointDisplay};
use crate::event::GameEvent;
use crate::input::InputFrame;
use crate::movement;
use crate::overlay::Tint;
use crate::player::PlayerId;
use crate::simulation::Simulation;

use super::helpers::{
    click_on, colonize_button, duel_with_planets, first_ship, order_warp, planet, planet_at,
    player, run_idle, ship, started, turn_holders, warp_button, DT,
};

fn turn_starts(events: &[GameEvent]) -> Vec<PlayerId> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::TurnStarted { player, .. } => Some(*player),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Warp and blast
// =============================================================================

#[test]
fn forty_unit_warp_passes_the_turn_once() {
    let mut sim = started(GameConfig {
        blast_growth_rate: 10.0,
        ..GameConfig::default()
    });
    let (p1, p2) = (player(&sim, 0), player(&sim, 1));
    let a = first_ship(&sim, 0);
    let target = Vec2::new(0.0, 40.0);

    order_warp(&mut sim, a, target);
    assert_eq!(ship(&sim, a).motion, MotionState::Warping);

    // Three ticks in: 30 units covered, still travelling.
    run_idle(&mut sim, 3);
    assert_eq!(ship(&sim, a).motion, MotionState::Warping);
    assert!((sim.arena().position_of(a).unwrap().y - 30.0).abs() < 1e-4);

    // Fourth tick: exactly on the waypoint, no overshoot.
    run_idle(&mut sim, 1);
    let arrived_at = sim.arena().position_of(a).unwrap();
    assert!(arrived_at.distance(target) < 1e-4);
    assert_eq!(ship(&sim, a).motion, MotionState::TurnFinished);
    assert!(ship(&sim, a).waypoint.is_none());
    assert_eq!(sim.selection().selected(), None);
    assert_eq!(sim.current_player(), Some(p1));

    let events = sim.take_events();
    let reach = events.iter().find_map(|e| match e {
        GameEvent::BlastSpawned { reach, creator, .. } if *creator == a => Some(*reach),
        _ => None,
    });
    assert!((reach.unwrap() - 40.0).abs() < 1e-4);

    // The blast grows 10 a tick from 10 to 40.
    run_idle(&mut sim, 2);
    assert_eq!(sim.current_player(), Some(p1));
    run_idle(&mut sim, 1);

    let events = sim.take_events();
    assert_eq!(turn_starts(&events), vec![p2]);
    assert!(events.iter().any(|e| matches!(e, GameEvent::BlastFinished { .. })));
    assert_eq!(sim.current_player(), Some(p2));
    assert_eq!(turn_holders(&sim), vec![p2]);
    assert_eq!(ship(&sim, a).motion, MotionState::Idle);

    // Nothing else happens once the blast is gone.
    run_idle(&mut sim, 5);
    assert!(turn_starts(&sim.take_events()).is_empty());
}

#[test]
fn warp_button_engages_like_the_key() {
    let mut sim = started(GameConfig::default());
    let a = first_ship(&sim, 0);
    click_on(&mut sim, a);
    sim.step(&InputFrame::hold(Vec2::new(0.0, -60.0), None), DT);

    let button = warp_button(&sim, a);
    assert!(sim.overlay().affordance(button).unwrap().visible);
    sim.step(&InputFrame::activate(button), DT);
    assert_eq!(ship(&sim, a).motion, MotionState::Warping);
    assert!(sim.selection().is_locked());
}

#[test]
fn blast_destroys_last_enemy_ship_and_eliminates_its_owner() {
    let mut sim = started(GameConfig::default());
    let (p1, p2) = (player(&sim, 0), player(&sim, 1));
    let a = first_ship(&sim, 0);
    let b = first_ship(&sim, 1);

    order_warp(&mut sim, a, Vec2::new(60.0, 0.0));
    run_idle(&mut sim, 6);

    assert!(!sim.arena().contains(b));
    assert_eq!(sim.turns().roster(), &[p1]);
    let events = sim.take_events();
    assert!(events.contains(&GameEvent::Damaged {
        target: b,
        attacker: a
    }));
    assert!(events.contains(&GameEvent::ShipDestroyed { ship: b }));
    assert!(events.contains(&GameEvent::PlayerEliminated { player: p2 }));
    assert!(events.contains(&GameEvent::SoleSurvivor { player: p1 }));

    run_idle(&mut sim, 1);
    assert_eq!(sim.current_player(), Some(p1));
    assert_eq!(turn_holders(&sim), vec![p1]);
    assert!(sim.arena().contains(a));
}

#[test]
fn blast_spares_targets_behind_it() {
    let mut sim = started(GameConfig::default());
    let a = first_ship(&sim, 0);
    let b = first_ship(&sim, 1);

    // Fly past the enemy; it ends up within reach but behind the blast.
    order_warp(&mut sim, a, Vec2::new(150.0, 0.0));
    run_idle(&mut sim, 20);
    assert!(sim.arena().contains(b));
    assert_eq!(sim.current_player(), Some(player(&sim, 1)));
}

#[test]
fn planet_in_blast_path_loses_health() {
    let mut sim = duel_with_planets(&[(Vec2::new(0.0, 80.0), 3, 2)]);
    let a = first_ship(&sim, 0);
    let target = planet_at(&sim, Vec2::new(0.0, 80.0));

    order_warp(&mut sim, a, Vec2::new(0.0, 60.0));
    run_idle(&mut sim, 8);

    let status = sim.planet_status(target).unwrap();
    assert_eq!(status.health, 2);
    assert_eq!(status.population, 2);
}

// =============================================================================
// Turn gating and waypoints
// =============================================================================

#[test]
fn enemy_ship_cannot_engage_out_of_turn() {
    let mut sim = started(GameConfig::default());
    let b = first_ship(&sim, 1);

    click_on(&mut sim, b);
    sim.step(&InputFrame::hold(Vec2::new(100.0, 100.0), None), DT);
    sim.step(&InputFrame::engage_key(), DT);

    let s = ship(&sim, b);
    assert_eq!(s.motion, MotionState::Idle);
    let waypoint = s.waypoint.as_ref().unwrap();
    assert_eq!(waypoint.display, WaypointDisplay::Hostile);
    let line = sim.overlay().visual(waypoint.line.unwrap()).unwrap();
    assert_eq!(line.tint, Tint::Red);
}

#[test]
fn waypoint_color_tracks_range() {
    let mut sim = started(GameConfig {
        ship_range: 80.0,
        ..GameConfig::default()
    });
    let a = first_ship(&sim, 0);
    click_on(&mut sim, a);

    sim.step(&InputFrame::hold(Vec2::new(0.0, 70.0), None), DT);
    let line = ship(&sim, a).waypoint.as_ref().unwrap().line.unwrap();
    assert_eq!(sim.overlay().visual(line).unwrap().tint, Tint::Green);

    sim.step(&InputFrame::hold(Vec2::new(0.0, 90.0), None), DT);
    assert_eq!(sim.overlay().visual(line).unwrap().tint, Tint::Yellow);
    assert_eq!(
        ship(&sim, a).waypoint.as_ref().unwrap().display,
        WaypointDisplay::OutOfRange
    );
}

#[test]
fn only_one_ship_warps_at_a_time() {
    let mut sim = started(GameConfig::default());
    let p1 = player(&sim, 0);
    let a = first_ship(&sim, 0);
    let second = movement::spawn_ship(sim.world_mut(), Vec2::new(0.0, -200.0), p1);

    order_warp(&mut sim, a, Vec2::new(0.0, 60.0));
    if let Some(s) = sim.world_mut().arena.get_mut(second).and_then(Entity::as_ship_mut) {
        s.waypoint = Some(Waypoint::new(Vec2::new(0.0, -260.0)));
    }
    // The first ship is still travelling; the second cannot join it.
    assert!(!movement::engage(sim.world_mut(), second));
    assert_eq!(ship(&sim, second).motion, MotionState::Idle);
}

// =============================================================================
// Colonization and construction
// =============================================================================

#[test]
fn colonize_through_its_button() {
    let mut sim = duel_with_planets(&[(Vec2::new(0.0, 30.0), 3, 0)]);
    let p1 = player(&sim, 0);
    let a = first_ship(&sim, 0);
    let target = planet_at(&sim, Vec2::new(0.0, 30.0));
    let neighbour = movement::spawn_ship(sim.world_mut(), Vec2::new(20.0, 40.0), p1);

    assert_eq!(ship(&sim, a).colony_targets.len(), 1);
    assert_eq!(colonize::ships_offered(sim.world(), target), vec![a, neighbour]);

    click_on(&mut sim, a);
    let button = colonize_button(&sim, a, target);
    assert!(sim.overlay().affordance(button).unwrap().visible);
    sim.take_events();

    sim.step(&InputFrame::activate(button), DT);

    let status = sim.planet_status(target).unwrap();
    assert_eq!(status.owner, Some(p1));
    assert_eq!(status.population, 1);
    assert!(!planet(&sim, target).can_colonize());
    assert!(!sim.arena().contains(a));
    assert!(sim.overlay().affordance(button).is_none());
    assert!(ship(&sim, neighbour).colony_targets.is_empty());
    assert_eq!(sim.selection().selected(), None);
    // Colonizing does not end the turn.
    assert_eq!(sim.current_player(), Some(p1));

    let events = sim.take_events();
    assert!(events.contains(&GameEvent::Colonized {
        planet: target,
        owner: p1,
        ship: a
    }));
    assert!(!events.iter().any(|e| matches!(e, GameEvent::Explosion { .. })));
}

#[test]
fn build_ships_from_selected_planet() {
    let center = Vec2::new(0.0, 300.0);
    let mut sim = duel_with_planets(&[(center, 4, 2)]);
    let p1 = player(&sim, 0);
    let home = planet_at(&sim, center);
    sim.world_mut().arena.register_planet(p1, home);

    click_on(&mut sim, home);
    let button = planet(&sim, home).build_button.unwrap();
    assert!(sim.overlay().affordance(button).unwrap().visible);

    sim.step(&InputFrame::activate(button), DT);

    assert_eq!(sim.planet_status(home).unwrap().population, 0);
    assert!(!sim.overlay().affordance(button).unwrap().visible);
    let built: Vec<_> = sim
        .arena()
        .ships_within(center, 31.0)
        .into_iter()
        .filter(|id| sim.arena().owner_of(*id) == Some(p1))
        .collect();
    assert_eq!(built.len(), 2);
    for id in built {
        let distance = sim.arena().position_of(id).unwrap().distance(center);
        assert!((distance - 30.0).abs() < 1e-3);
    }
    assert!(sim
        .take_events()
        .iter()
        .any(|e| matches!(e, GameEvent::ShipsBuilt { ships, .. } if ships.len() == 2)));
}

#[test]
fn enemy_planet_offers_no_construction() {
    let center = Vec2::new(0.0, 300.0);
    let mut sim = duel_with_planets(&[(center, 4, 2)]);
    let p2 = player(&sim, 1);
    let home = planet_at(&sim, center);
    sim.world_mut().arena.register_planet(p2, home);

    click_on(&mut sim, home);
    let button = planet(&sim, home).build_button.unwrap();
    assert!(!sim.overlay().affordance(button).unwrap().visible);
    assert!(!sim.activate(button));
    assert_eq!(sim.planet_status(home).unwrap().population, 2);
}

// =============================================================================
// Determinism
// =============================================================================

fn scripted_match(sim: &mut Simulation) -> Vec<GameEvent> {
    let a = first_ship(sim, 0);
    order_warp(sim, a, Vec2::new(0.0, 60.0));
    run_idle(sim, 10);
    let b = first_ship(sim, 1);
    order_warp(sim, b, Vec2::new(100.0, -70.0));
    run_idle(sim, 10);
    sim.take_events()
}

#[test]
fn same_config_and_input_same_events() {
    let config = GameConfig {
        map: Some(MapConfig {
            seed: 3,
            ..MapConfig::default()
        }),
        ..GameConfig::default()
    };
    let mut first = started(config.clone());
    let mut second = started(config);
    assert_eq!(scripted_match(&mut first), scripted_match(&mut second));
}
