//! Planets: spawning, selection hooks, ship construction and status readout.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::colonize;
use crate::entity::{Entity, EntityId, EntityInner, PlanetComponents};
use crate::event::GameEvent;
use crate::movement;
use crate::overlay::{AffordanceAction, Anchor, Placement, Shape, Tint};
use crate::player::PlayerId;
use crate::world::World;

/// Health and population of a planet, for status bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetStatus {
    /// Current owner
    pub owner: Option<PlayerId>,
    /// Remaining health
    pub health: u32,
    /// Current population
    pub population: u32,
}

/// Spawns an unowned planet with its selection reticule and hidden
/// "Build Ship" button. Population is capped at `health`.
pub fn spawn_planet(world: &mut World, position: Vec2, health: u32, population: u32) -> EntityId {
    let planet = PlanetComponents::new(position, health)
        .with_radius(world.config.planet_radius)
        .with_population(population);
    let id = world.arena.spawn(EntityInner::Planet(planet));

    let indicator = world.overlay.add_visual(
        Shape::Reticule {
            center: Anchor::Entity(id),
            radius: world.config.planet_targeter_radius,
        },
        Tint::Green,
        1.0,
        false,
    );
    let button =
        world
            .overlay
            .add_affordance("Build Ship", Placement::Screen, AffordanceAction::BuildShips(id));
    if let Some(p) = world.arena.get_mut(id).and_then(Entity::as_planet_mut) {
        p.selection.indicator = Some(indicator);
        p.build_button = Some(button);
    }

    world.emit(GameEvent::PlanetSpawned {
        planet: id,
        position,
    });
    debug!(planet = %id, ?position, health, population, "planet spawned");
    id
}

/// Trades the planet's whole population for ships.
///
/// Requires a populated planet whose owner holds the turn. The ships appear on
/// a ring of radius `ship_spawn_distance` around the planet, evenly spaced;
/// population drops to zero and nearby ships rescan. Returns the new ships.
pub fn build_ships(world: &mut World, id: EntityId) -> Vec<EntityId> {
    if !world.arena.owner_has_turn(id) {
        debug!(planet = %id, "owner does not hold the turn; build ignored");
        return Vec::new();
    }
    let Some((owner, center, population)) = world
        .arena
        .get(id)
        .and_then(Entity::as_planet)
        .filter(|p| p.population > 0)
        .and_then(|p| Some((p.owner?, p.transform.position, p.population)))
    else {
        return Vec::new();
    };

    let offset = Vec2::new(world.config.ship_spawn_distance, 0.0);
    #[allow(clippy::cast_precision_loss)]
    let step = std::f32::consts::TAU / population as f32;
    let ships: Vec<EntityId> = (0..population)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let rotation = Vec2::from_angle(step * i as f32);
            movement::spawn_ship(world, center + rotation.rotate(offset), owner)
        })
        .collect();

    let button = world.arena.get_mut(id).and_then(Entity::as_planet_mut).and_then(|p| {
        p.population = 0;
        p.build_button
    });
    if let Some(button) = button {
        world.overlay.set_affordance_visible(button, false);
    }

    world.emit(GameEvent::ShipsBuilt {
        planet: id,
        ships: ships.clone(),
    });
    info!(planet = %id, owner = %owner, count = ships.len(), "ships built");

    colonize::rescan_near(world, center, None);
    ships
}

/// Health, population and owner of a planet.
#[must_use]
pub fn status(world: &World, id: EntityId) -> Option<PlanetStatus> {
    world
        .arena
        .get(id)
        .and_then(Entity::as_planet)
        .map(|p| PlanetStatus {
            owner: p.owner,
            health: p.health,
            population: p.population,
        })
}

/// Selection hook: offer construction when there is population to spend.
pub(crate) fn on_select(world: &mut World, id: EntityId) {
    let has_turn = world.arena.owner_has_turn(id);
    let button = world
        .arena
        .get(id)
        .and_then(Entity::as_planet)
        .filter(|p| p.population > 0 && has_turn)
        .and_then(|p| p.build_button);
    if let Some(button) = button {
        world.overlay.set_affordance_visible(button, true);
    }
}

/// Deselection hook: withdraw the construction offer.
pub(crate) fn on_deselect(world: &mut World, id: EntityId) {
    let button = world
        .arena
        .get(id)
        .and_then(Entity::as_planet)
        .and_then(|p| p.build_button);
    if let Some(button) = button {
        world.overlay.set_affordance_visible(button, false);
    }
}
