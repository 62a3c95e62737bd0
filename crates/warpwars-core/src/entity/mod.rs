//! Entity module for the simulation's arena registry.
//!
//! This module provides the core entity types:
//! - [`EntityId`]: Unique identifier for entities
//! - [`EntityTag`]: Type classification (ship, planet, blast)
//! - [`EntityInner`]: Type-safe storage for entity-specific components
//! - [`Entity`]: The complete entity container
//!
//! # Capabilities
//!
//! Cross-cutting behaviors are exposed as optional capabilities instead of
//! name-based message dispatch. A caller asks an entity for the capability and
//! simply skips entities that do not have it:
//!
//! ```
//! use warpwars_core::entity::{Entity, EntityId, EntityInner, BlastComponents};
//! use glam::Vec2;
//!
//! let blast = Entity::new(
//!     EntityId::new(7),
//!     EntityInner::Blast(BlastComponents::new(Vec2::ZERO, Vec2::X, EntityId::new(1), 10.0)),
//! );
//!
//! // Blasts cannot be selected or damaged.
//! assert!(blast.as_selectable().is_none());
//! assert!(blast.as_damageable().is_none());
//! ```

pub mod components;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::combat::Damageable;
use crate::selection::Selectable;

pub use components::{
    BlastComponents, ColonyTarget, MotionState, PlanetComponents, SelectionMarker, ShipChrome,
    ShipComponents, TransformState, Waypoint, WaypointDisplay,
};

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Entity IDs are assigned
/// monotonically by the arena and never reused, so a stale id simply fails to
/// resolve instead of aliasing a newer entity.
///
/// # Example
///
/// ```
/// use warpwars_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity type tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// A player-owned ship that can warp and colonize
    Ship,
    /// A planet with health and population, possibly owned
    Planet,
    /// An expanding blast effect left behind by a warp arrival
    Blast,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ship => write!(f, "Ship"),
            Self::Planet => write!(f, "Planet"),
            Self::Blast => write!(f, "Blast"),
        }
    }
}

/// Type-safe storage for entity-specific components.
///
/// The tag of an entity is always derived from this enum, so the two can
/// never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Ship components (transform, motion, waypoint, colonization candidates)
    Ship(ShipComponents),
    /// Planet components (owner, health, population)
    Planet(PlanetComponents),
    /// Blast components (origin, facing, reach, current radius)
    Blast(BlastComponents),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Ship(_) => EntityTag::Ship,
            Self::Planet(_) => EntityTag::Planet,
            Self::Blast(_) => EntityTag::Blast,
        }
    }

    /// Returns the world position of the entity.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        match self {
            Self::Ship(c) => c.transform.position,
            Self::Planet(c) => c.transform.position,
            Self::Blast(c) => c.origin,
        }
    }

    /// Returns the collision radius of the entity.
    ///
    /// For a blast this is its current (growing) radius.
    #[must_use]
    pub const fn collision_radius(&self) -> f32 {
        match self {
            Self::Ship(c) => c.radius,
            Self::Planet(c) => c.radius,
            Self::Blast(c) => c.radius,
        }
    }
}

/// A complete entity in the simulation.
///
/// # Invariants
///
/// - The `EntityId` is unique within an arena
/// - The tag always matches the `EntityInner` variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new entity with the given ID and inner storage.
    #[must_use]
    pub const fn new(id: EntityId, inner: EntityInner) -> Self {
        Self { id, inner }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's type tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Returns a reference to the entity's inner component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the entity's inner component storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Returns the entity's world position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.inner.position()
    }

    /// Returns `true` if this entity is a ship.
    #[must_use]
    pub const fn is_ship(&self) -> bool {
        matches!(self.inner, EntityInner::Ship(_))
    }

    /// Returns `true` if this entity is a planet.
    #[must_use]
    pub const fn is_planet(&self) -> bool {
        matches!(self.inner, EntityInner::Planet(_))
    }

    /// Returns `true` if this entity is a blast.
    #[must_use]
    pub const fn is_blast(&self) -> bool {
        matches!(self.inner, EntityInner::Blast(_))
    }

    /// Returns a reference to the ship components, if this is a ship.
    #[must_use]
    pub const fn as_ship(&self) -> Option<&ShipComponents> {
        match &self.inner {
            EntityInner::Ship(c) => Some(c),
            _ => None,
        }
    }

    /// Returns a mutable reference to the ship components, if this is a ship.
    #[must_use]
    pub fn as_ship_mut(&mut self) -> Option<&mut ShipComponents> {
        match &mut self.inner {
            EntityInner::Ship(c) => Some(c),
            _ => None,
        }
    }

    /// Returns a reference to the planet components, if this is a planet.
    #[must_use]
    pub const fn as_planet(&self) -> Option<&PlanetComponents> {
        match &self.inner {
            EntityInner::Planet(c) => Some(c),
            _ => None,
        }
    }

    /// Returns a mutable reference to the planet components, if this is a planet.
    #[must_use]
    pub fn as_planet_mut(&mut self) -> Option<&mut PlanetComponents> {
        match &mut self.inner {
            EntityInner::Planet(c) => Some(c),
            _ => None,
        }
    }

    /// Returns a reference to the blast components, if this is a blast.
    #[must_use]
    pub const fn as_blast(&self) -> Option<&BlastComponents> {
        match &self.inner {
            EntityInner::Blast(c) => Some(c),
            _ => None,
        }
    }

    /// Returns a mutable reference to the blast components, if this is a blast.
    #[must_use]
    pub fn as_blast_mut(&mut self) -> Option<&mut BlastComponents> {
        match &mut self.inner {
            EntityInner::Blast(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the selectable capability, if the entity has one.
    #[must_use]
    pub fn as_selectable(&self) -> Option<&dyn Selectable> {
        match &self.inner {
            EntityInner::Ship(c) => Some(c),
            EntityInner::Planet(c) => Some(c),
            EntityInner::Blast(_) => None,
        }
    }

    /// Returns the mutable selectable capability, if the entity has one.
    #[must_use]
    pub fn as_selectable_mut(&mut self) -> Option<&mut dyn Selectable> {
        match &mut self.inner {
            EntityInner::Ship(c) => Some(c),
            EntityInner::Planet(c) => Some(c),
            EntityInner::Blast(_) => None,
        }
    }

    /// Returns the damageable capability, if the entity has one.
    #[must_use]
    pub fn as_damageable(&self) -> Option<&dyn Damageable> {
        match &self.inner {
            EntityInner::Ship(c) => Some(c),
            EntityInner::Planet(c) => Some(c),
            EntityInner::Blast(_) => None,
        }
    }

    /// Returns the mutable damageable capability, if the entity has one.
    #[must_use]
    pub fn as_damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        match &mut self.inner {
            EntityInner::Ship(c) => Some(c),
            EntityInner::Planet(c) => Some(c),
            EntityInner::Blast(_) => None,
        }
    }
}
