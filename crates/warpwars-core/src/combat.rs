//! Combat Resolver: the expanding blast released when a ship drops out of
//! warp.
//!
//! A blast starts at radius zero and grows by
//! [`GameConfig::blast_growth_rate`](crate::config::GameConfig) per time unit
//! until it reaches its reach. Each tick, every damageable entity whose
//! footprint newly overlaps the blast and which lies inside the hit cone ahead
//! of the blast takes one hit, credited to the blast's creator. When the reach
//! is met the creator is told its turn is over, the turn advances, and the
//! blast removes itself.
//!
//! Damage dispatch goes through the [`Damageable`] capability; entities that do
//! not implement it are never hit.

use std::fmt;

use glam::Vec2;
use tracing::{debug, info};

use crate::colonize;
use crate::entity::{BlastComponents, Entity, EntityId, EntityInner, EntityTag};
use crate::event::GameEvent;
use crate::movement;
use crate::selection;
use crate::turn;
use crate::world::World;

/// Result of one hit on a damageable entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HitOutcome {
    /// The hit had no effect
    Ignored,
    /// The entity survived with the given health
    Wounded {
        /// Health left after the hit
        health: u32,
    },
    /// The entity must be torn down
    Destroyed,
}

/// Capability of entities a blast can damage.
pub trait Damageable {
    /// Applies one hit from `attacker` to the entity with id `own_id`.
    fn take_hit(&mut self, own_id: EntityId, attacker: EntityId) -> HitOutcome;
}

/// Maps the distance a ship travelled to the reach of its blast.
///
/// Implementations must be monotonic non-decreasing in `distance`.
pub trait BlastReach: fmt::Debug {
    /// Blast reach for a warp of `distance` world units.
    fn reach(&self, distance: f32) -> f32;
}

/// Reach equals the distance travelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityReach;

impl BlastReach for IdentityReach {
    fn reach(&self, distance: f32) -> f32 {
        distance
    }
}

/// Reach grows linearly with distance: `distance * factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledReach(pub f32);

impl BlastReach for ScaledReach {
    fn reach(&self, distance: f32) -> f32 {
        distance * self.0.max(0.0)
    }
}

/// Spawns a blast at `origin` facing `front`, credited to `creator`.
///
/// The reach is derived from `distance` through the world's [`BlastReach`]
/// policy.
pub fn spawn_blast(
    world: &mut World,
    origin: Vec2,
    front: Vec2,
    creator: EntityId,
    distance: f32,
) -> EntityId {
    let reach = world.reach.reach(distance).max(0.0);
    let blast = world.arena.spawn(EntityInner::Blast(BlastComponents::new(
        origin,
        front - origin,
        creator,
        reach,
    )));
    world.emit(GameEvent::BlastSpawned {
        blast,
        creator,
        origin,
        reach,
    });
    info!(blast = %blast, creator = %creator, distance, reach, "blast released");
    blast
}

/// Grows every blast by `dt`, applies new hits and completes blasts that
/// reached their reach.
pub fn tick(world: &mut World, dt: f32) {
    for blast in world.arena.ids_with_tag(EntityTag::Blast) {
        tick_blast(world, blast, dt);
    }
}

fn tick_blast(world: &mut World, id: EntityId, dt: f32) {
    let rate = world.config.blast_growth_rate;
    let Some(blast) = world.arena.get_mut(id).and_then(Entity::as_blast_mut) else {
        return;
    };
    blast.radius = (blast.radius + rate * dt).min(blast.reach);

    let hits = new_hits(world, id);
    for target in hits {
        let creator = match world.arena.get_mut(id).and_then(Entity::as_blast_mut) {
            Some(blast) => {
                blast.struck.insert(target);
                blast.creator
            }
            None => return,
        };
        apply_damage(world, target, creator);
    }

    let complete = world
        .arena
        .get(id)
        .and_then(Entity::as_blast)
        .map(|blast| (blast.is_complete(), blast.creator));
    if let Some((true, creator)) = complete {
        finish(world, id, creator);
    }
}

/// Damageable entities newly overlapping the blast inside its hit cone.
fn new_hits(world: &World, id: EntityId) -> Vec<EntityId> {
    let Some(blast) = world.arena.get(id).and_then(Entity::as_blast) else {
        return Vec::new();
    };
    let max_angle = world.config.blast_hit_max_angle_deg.to_radians();
    let widest = world.config.ship_radius.max(world.config.planet_radius);

    world
        .arena
        .spatial()
        .query_radius(blast.origin, blast.radius + widest)
        .into_iter()
        .filter(|target| *target != id && !blast.struck.contains(target))
        .filter(|target| {
            world.arena.get(*target).is_some_and(|entity| {
                entity.as_damageable().is_some()
                    && overlaps(blast, entity)
                    && in_cone(blast, entity.position(), max_angle)
            })
        })
        .collect()
}

fn overlaps(blast: &BlastComponents, entity: &Entity) -> bool {
    let reach = blast.radius + entity.inner().collision_radius();
    blast.origin.distance_squared(entity.position()) <= reach * reach
}

/// Whether `point` lies within `max_angle` of the blast's facing. A point at
/// the blast's center counts as dead ahead.
fn in_cone(blast: &BlastComponents, point: Vec2, max_angle: f32) -> bool {
    let offset = point - blast.origin;
    if offset.length_squared() <= f32::EPSILON {
        return true;
    }
    blast.forward.dot(offset.normalize()) > max_angle.cos()
}

fn finish(world: &mut World, id: EntityId, creator: EntityId) {
    movement::complete_combat(world, creator);
    turn::advance(world);
    world.arena.despawn(id);
    world.emit(GameEvent::BlastFinished { blast: id });
    info!(blast = %id, creator = %creator, "blast finished");
}

/// Applies one hit from `attacker` to `target` and tears the target down if
/// the hit destroyed it.
pub fn apply_damage(world: &mut World, target: EntityId, attacker: EntityId) -> HitOutcome {
    let Some(entity) = world.arena.get_mut(target) else {
        return HitOutcome::Ignored;
    };
    let tag = entity.tag();
    let Some(damageable) = entity.as_damageable_mut() else {
        return HitOutcome::Ignored;
    };

    let outcome = damageable.take_hit(target, attacker);
    if outcome == HitOutcome::Ignored {
        return outcome;
    }
    world.emit(GameEvent::Damaged { target, attacker });
    debug!(target = %target, attacker = %attacker, ?outcome, "hit");

    if outcome == HitOutcome::Destroyed {
        match tag {
            EntityTag::Ship => destroy_ship(world, target),
            EntityTag::Planet => destroy_planet(world, target),
            EntityTag::Blast => {}
        }
    }
    outcome
}

/// Destroys a ship with an explosion.
pub fn destroy_ship(world: &mut World, id: EntityId) {
    movement::despawn_ship(world, id, true);
}

/// Removes a planet and its chrome, detaches it from its owner and refreshes
/// the candidates of ships that were offered it.
pub fn destroy_planet(world: &mut World, id: EntityId) {
    if world.selection.selected() == Some(id) {
        selection::clear(world, true);
    }
    let Some(entity) = world.arena.despawn(id) else {
        return;
    };
    let position = entity.position();
    let Some(planet) = entity.as_planet() else {
        return;
    };
    if let Some(button) = planet.build_button {
        world.overlay.remove_affordance(button);
    }
    if let Some(indicator) = planet.selection.indicator {
        world.overlay.remove_visual(indicator);
    }

    world.emit(GameEvent::Explosion { position });
    world.emit(GameEvent::PlanetDestroyed { planet: id });
    info!(planet = %id, "planet destroyed");

    if let Some(owner) = planet.owner {
        turn::unregister_asset(world, owner, id);
    }
    for ship in colonize::ships_offered(world, id) {
        colonize::scan(world, ship);
    }
}
