//! Factories and lookups shared by the scenario and property tests.

use glam::Vec2;

use crate::config::{GameConfig, PlanetSpec};
use crate::entity::{Entity, EntityId, PlanetComponents, ShipComponents};
use crate::input::InputFrame;
use crate::overlay::AffordanceId;
use crate::player::PlayerId;
use crate::simulation::Simulation;
use crate::turn;
use crate::world::World;

/// One tick per time unit, so a ship at speed 10 covers 10 units a tick.
pub const DT: f32 = 1.0;

// =============================================================================
// Setup
// =============================================================================

/// A started simulation using `config`.
pub fn started(config: GameConfig) -> Simulation {
    let mut sim = Simulation::new(config);
    sim.start().expect("test config is valid");
    sim.take_events();
    sim
}

/// A started two-player simulation with the given planets.
pub fn duel_with_planets(planets: &[(Vec2, u32, u32)]) -> Simulation {
    started(GameConfig {
        planets: planets
            .iter()
            .map(|&(position, health, population)| PlanetSpec {
                position,
                health,
                population,
            })
            .collect(),
        ..GameConfig::default()
    })
}

/// A bare world with `players` players in rotation, bypassing `Simulation`.
pub fn world_with_players(players: usize) -> World {
    let mut world = World::new(GameConfig {
        player_count: players.max(1),
        ..GameConfig::default()
    });
    turn::start(&mut world, players);
    world.events.take_events();
    world
}

// =============================================================================
// Lookups
// =============================================================================

/// The `index`-th player of the original roster order.
pub fn player(sim: &Simulation, index: usize) -> PlayerId {
    sim.arena()
        .players()
        .nth(index)
        .map(|p| p.id())
        .expect("player exists")
}

/// First ship of the `index`-th player.
pub fn first_ship(sim: &Simulation, index: usize) -> EntityId {
    let owner = player(sim, index);
    sim.arena().player(owner).expect("player exists").ships()[0]
}

/// The planet sitting at `position`.
pub fn planet_at(sim: &Simulation, position: Vec2) -> EntityId {
    sim.arena().planets_within(position, 0.5)[0]
}

/// Ship components of `id`.
pub fn ship(sim: &Simulation, id: EntityId) -> &ShipComponents {
    sim.arena().get(id).and_then(Entity::as_ship).expect("ship exists")
}

/// Planet components of `id`.
pub fn planet(sim: &Simulation, id: EntityId) -> &PlanetComponents {
    sim.arena().get(id).and_then(Entity::as_planet).expect("planet exists")
}

/// The ship's "Warp" button.
pub fn warp_button(sim: &Simulation, id: EntityId) -> AffordanceId {
    ship(sim, id).chrome.warp_button.expect("ship has a warp button")
}

/// The ship's "Colonize" button for `planet_id`.
pub fn colonize_button(sim: &Simulation, id: EntityId, planet_id: EntityId) -> AffordanceId {
    ship(sim, id)
        .colony_targets
        .iter()
        .find(|t| t.planet == planet_id)
        .map(|t| t.button)
        .expect("planet is a candidate")
}

/// Players currently flagged as holding the turn.
pub fn turn_holders(sim: &Simulation) -> Vec<PlayerId> {
    sim.arena()
        .players()
        .filter(|p| p.has_current_turn)
        .map(|p| p.id())
        .collect()
}

// =============================================================================
// Driving
// =============================================================================

/// Presses on `id` where it stands.
pub fn click_on(sim: &mut Simulation, id: EntityId) {
    let position = sim.arena().position_of(id).expect("entity exists");
    sim.step(&InputFrame::click(position, Some(id)), DT);
}

/// Selects `ship_id`, drags its waypoint to `target` and engages warp.
pub fn order_warp(sim: &mut Simulation, ship_id: EntityId, target: Vec2) {
    click_on(sim, ship_id);
    sim.step(&InputFrame::hold(target, None), DT);
    sim.step(&InputFrame::engage_key(), DT);
}

/// Runs `ticks` ticks with no input.
pub fn run_idle(sim: &mut Simulation, ticks: usize) {
    for _ in 0..ticks {
        sim.step(&InputFrame::idle(), DT);
    }
}
