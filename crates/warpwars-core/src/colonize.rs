//! Colonization Scanner: which planets each ship may colonize.
//!
//! A scan rebuilds a ship's [`ColonyTarget`] list from the planets within the
//! colonization radius that nobody lives on. Each candidate carries a cyan
//! line to the planet and a hidden "Colonize" button below it; while the ship
//! is selected the candidates are highlighted.
//!
//! Candidate lists are only as fresh as the last scan. Rescans happen when a
//! ship spawns or arrives, and for every ship near a planet whose status just
//! changed (colonized, emptied by building ships, destroyed).

use glam::Vec2;
use tracing::{debug, info};

use crate::entity::{ColonyTarget, Entity, EntityId, MotionState, PlanetComponents, ShipComponents};
use crate::event::GameEvent;
use crate::movement;
use crate::overlay::{AffordanceAction, Anchor, Placement, Shape, Tint};
use crate::turn;
use crate::world::World;

/// Size of the "Colonize" button, in pixels.
pub const COLONIZE_BUTTON_SIZE: Vec2 = Vec2::new(100.0, 30.0);

/// The button sits this many planet radii below the planet.
const BUTTON_OFFSET_FACTOR: f32 = 1.5;

/// Rebuilds the candidate list of `ship` from its current position.
///
/// Returns the number of candidates found.
pub fn scan(world: &mut World, ship: EntityId) -> usize {
    clear_candidates(world, ship);
    let Some(position) = world.arena.position_of(ship) else {
        return 0;
    };
    let radius = world.config.colonization_radius();
    let offset = world.config.planet_radius * BUTTON_OFFSET_FACTOR;

    let open: Vec<(EntityId, Vec2)> = world
        .arena
        .planets_within(position, radius)
        .into_iter()
        .filter_map(|id| {
            let planet = world.arena.get(id)?;
            planet
                .as_planet()
                .filter(|p| p.can_colonize())
                .map(|_| (id, planet.position()))
        })
        .collect();

    let mut targets = Vec::with_capacity(open.len());
    for (planet, planet_position) in open {
        let line = world.overlay.add_visual(
            Shape::Line {
                from: Anchor::Entity(ship),
                to: Anchor::Entity(planet),
            },
            Tint::Cyan,
            1.0,
            true,
        );
        let button = world.overlay.add_affordance(
            "Colonize",
            Placement::World {
                position: planet_position - Vec2::new(0.0, offset),
                size: COLONIZE_BUTTON_SIZE,
            },
            AffordanceAction::Colonize { ship, planet },
        );
        targets.push(ColonyTarget {
            planet,
            line,
            button,
        });
    }

    let count = targets.len();
    let selected = match world.arena.get_mut(ship).and_then(Entity::as_ship_mut) {
        Some(s) => {
            s.colony_targets = targets;
            s.selection.selected
        }
        None => return 0,
    };
    if selected {
        highlight(world, ship);
    }
    debug!(ship = %ship, candidates = count, "scanned for colonies");
    count
}

/// Rescans every ship within the colonization radius of `center`, except
/// `skip`.
pub fn rescan_near(world: &mut World, center: Vec2, skip: Option<EntityId>) {
    let radius = world.config.colonization_radius();
    for ship in world.arena.ships_within(center, radius) {
        if Some(ship) != skip {
            scan(world, ship);
        }
    }
}

/// Ships currently offered `planet` as a candidate.
#[must_use]
pub fn ships_offered(world: &World, planet: EntityId) -> Vec<EntityId> {
    world
        .arena
        .entities_sorted()
        .filter(|e| {
            e.as_ship()
                .is_some_and(|s| s.colony_targets.iter().any(|t| t.planet == planet))
        })
        .map(Entity::id)
        .collect()
}

/// Drops all of the ship's candidates along with their lines, buttons and
/// reticules.
pub fn clear_candidates(world: &mut World, ship: EntityId) {
    unhighlight(world, ship);
    let Some(targets) = ship_mut(world, ship).map(|s| std::mem::take(&mut s.colony_targets)) else {
        return;
    };
    for target in targets {
        world.overlay.remove_visual(target.line);
        world.overlay.remove_affordance(target.button);
    }
}

/// Draws a reticule over every candidate, widens its line and shows its
/// button.
pub fn highlight(world: &mut World, ship: EntityId) {
    unhighlight(world, ship);
    let targeter = world.config.planet_targeter_radius;
    let Some(targets) = ship_ref(world, ship).map(|s| s.colony_targets.clone()) else {
        return;
    };

    let mut reticules = Vec::with_capacity(targets.len());
    for target in &targets {
        reticules.push(world.overlay.add_visual(
            Shape::Reticule {
                center: Anchor::Entity(target.planet),
                radius: targeter,
            },
            Tint::Yellow,
            1.0,
            true,
        ));
        if let Some(line) = world.overlay.visual_mut(target.line) {
            line.width = 3.0;
        }
        world.overlay.set_affordance_visible(target.button, true);
    }
    if let Some(s) = ship_mut(world, ship) {
        s.chrome.reticules = reticules;
    }
}

/// Undoes [`highlight`].
pub fn unhighlight(world: &mut World, ship: EntityId) {
    let Some(s) = ship_mut(world, ship) else {
        return;
    };
    let reticules = std::mem::take(&mut s.chrome.reticules);
    let targets = s.colony_targets.clone();

    for reticule in reticules {
        world.overlay.remove_visual(reticule);
    }
    for target in targets {
        if let Some(line) = world.overlay.visual_mut(target.line) {
            line.width = 1.0;
        }
        world.overlay.set_affordance_visible(target.button, false);
    }
}

/// Colonizes `planet` with `ship`, consuming the ship.
///
/// Requires the ship's owner to hold the turn, the ship to be idle, and the
/// planet to be one of its current candidates. The planet gains one
/// population and passes to the ship's owner; a previous owner left with
/// nothing is eliminated. Nearby ships rescan. Returns whether the colony was
/// founded.
pub fn colonize(world: &mut World, ship: EntityId, planet: EntityId) -> bool {
    if !world.arena.owner_has_turn(ship) {
        debug!(ship = %ship, "owner does not hold the turn; colonize ignored");
        return false;
    }
    let Some(owner) = ship_ref(world, ship)
        .filter(|s| s.motion == MotionState::Idle)
        .filter(|s| s.colony_targets.iter().any(|t| t.planet == planet))
        .map(|s| s.owner)
    else {
        return false;
    };
    let Some(position) = planet_ref(world, planet)
        .filter(|p| p.can_colonize())
        .map(|p| p.transform.position)
    else {
        return false;
    };

    clear_candidates(world, ship);
    if let Some(p) = world.arena.get_mut(planet).and_then(Entity::as_planet_mut) {
        p.population += 1;
    }
    if let Some(previous) = world.arena.register_planet(owner, planet) {
        let defeated = world.arena.player(previous).is_some_and(|p| p.is_defeated());
        if defeated {
            turn::remove(world, previous);
        }
    }
    world.emit(GameEvent::Colonized {
        planet,
        owner,
        ship,
    });
    info!(planet = %planet, owner = %owner, ship = %ship, "planet colonized");

    rescan_near(world, position, Some(ship));
    movement::despawn_ship(world, ship, false);
    true
}

fn ship_ref(world: &World, id: EntityId) -> Option<&ShipComponents> {
    world.arena.get(id).and_then(Entity::as_ship)
}

fn ship_mut(world: &mut World, id: EntityId) -> Option<&mut ShipComponents> {
    world.arena.get_mut(id).and_then(Entity::as_ship_mut)
}

fn planet_ref(world: &World, id: EntityId) -> Option<&PlanetComponents> {
    world.arena.get(id).and_then(Entity::as_planet)
}
