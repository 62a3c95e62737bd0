//! Arena module: the entity registry.
//!
//! The Arena is the container for everything in a match. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Spatial indexing for proximity queries
//! - Entity lifecycle management (spawn/despawn)
//! - The player table and ship/planet ownership edges
//!
//! # Spatial Index Synchronization
//!
//! The spatial index is NOT automatically synchronized when entity positions
//! change. After moving an entity through `get_mut()`, call
//! `update_spatial(id)`. Spawning and despawning update the index.
//!
//! ```
//! # use warpwars_core::arena::Arena;
//! # use warpwars_core::entity::{EntityInner, ShipComponents};
//! # use warpwars_core::player::PlayerId;
//! # use glam::Vec2;
//! # let mut arena = Arena::new();
//! # let ship_id = arena.spawn(EntityInner::Ship(ShipComponents::new(Vec2::ZERO, PlayerId::new(0))));
//! if let Some(ship) = arena.get_mut(ship_id).and_then(|e| e.as_ship_mut()) {
//!     ship.transform.position = Vec2::new(500.0, 500.0);
//! }
//! // REQUIRED: sync spatial index after position change
//! arena.update_spatial(ship_id);
//! ```
//!
//! # Ownership
//!
//! Ownership is stored on both sides: a ship or planet names its owner, and
//! the [`Player`] record lists what it owns. Always go through
//! [`Arena::register_ship`], [`Arena::register_planet`] and
//! [`Arena::unregister`] so the two sides stay in agreement.

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityInner, EntityTag};
use crate::player::{Player, PlayerId};

// =============================================================================
// Spatial Index
// =============================================================================

/// Simple spatial index for proximity queries.
///
/// `HashMap` is acceptable here because radius queries sort their results by
/// id before returning, so hash iteration order never leaks into simulation
/// state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    /// Entity positions indexed by ID.
    positions: HashMap<EntityId, Vec2>,
}

impl SpatialIndex {
    /// Creates a new empty spatial index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }

    /// Inserts or updates an entity's position in the index.
    pub fn insert(&mut self, id: EntityId, pos: Vec2) {
        self.positions.insert(id, pos);
    }

    /// Removes an entity from the spatial index.
    pub fn remove(&mut self, id: EntityId) {
        self.positions.remove(&id);
    }

    /// Returns the indexed position of an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    /// Returns all entities within `radius` of `center` (inclusive), sorted by ID.
    #[must_use]
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        let mut results: Vec<EntityId> = self
            .positions
            .iter()
            .filter(|(_, pos)| center.distance_squared(**pos) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();

        // Sort for deterministic order
        results.sort();
        results
    }

    /// Returns the number of entities in the spatial index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the spatial index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Registry of all entities and players in a match.
///
/// # Example
///
/// ```
/// use warpwars_core::arena::Arena;
/// use warpwars_core::entity::{EntityInner, ShipComponents};
/// use glam::Vec2;
///
/// let mut arena = Arena::new();
/// let owner = arena.add_player("Player 1");
///
/// let ship = arena.spawn(EntityInner::Ship(ShipComponents::new(Vec2::ZERO, owner)));
/// arena.register_ship(owner, ship);
///
/// assert_eq!(arena.player(owner).unwrap().ships(), &[ship]);
/// assert_eq!(arena.ships_within(Vec2::ZERO, 1.0), vec![ship]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Spatial index for proximity queries.
    spatial: SpatialIndex,
    /// Monotonically increasing player ID counter.
    next_player_id: u32,
    /// Player records, including eliminated players.
    players: BTreeMap<PlayerId, Player>,
}

impl Arena {
    /// Creates a new empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new entity and returns its ID.
    pub fn spawn(&mut self, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = Entity::new(id, inner);
        self.spatial.insert(id, entity.position());
        self.entities.insert(id, entity);
        id
    }

    /// Removes an entity from the arena and the spatial index.
    ///
    /// Ownership edges are not touched; see [`Arena::unregister`].
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.spatial.remove(id);
        self.entities.remove(&id)
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns `true` if the entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Returns the live position of an entity.
    #[must_use]
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(&id).map(Entity::position)
    }

    /// Returns an iterator over entity IDs in deterministic (sorted) order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over entities in deterministic (sorted by ID) order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns the IDs of all entities with `tag`, sorted.
    #[must_use]
    pub fn ids_with_tag(&self, tag: EntityTag) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.tag() == tag)
            .map(Entity::id)
            .collect()
    }

    /// Returns the number of entities in the arena.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns a reference to the spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Updates the spatial index for an entity.
    ///
    /// Call this after modifying an entity's position to keep the spatial
    /// index in sync.
    pub fn update_spatial(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get(&id) {
            self.spatial.insert(id, entity.position());
        }
    }

    /// Ships whose centers lie within `radius` of `center`, sorted by ID.
    #[must_use]
    pub fn ships_within(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        self.within_with_tag(center, radius, EntityTag::Ship)
    }

    /// Planets whose centers lie within `radius` of `center`, sorted by ID.
    #[must_use]
    pub fn planets_within(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        self.within_with_tag(center, radius, EntityTag::Planet)
    }

    fn within_with_tag(&self, center: Vec2, radius: f32, tag: EntityTag) -> Vec<EntityId> {
        self.spatial
            .query_radius(center, radius)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|e| e.tag() == tag))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Players and ownership
    // -------------------------------------------------------------------------

    /// Adds a player with no assets and returns its ID.
    pub fn add_player(&mut self, name: impl Into<String>) -> PlayerId {
        let id = PlayerId::new(self.next_player_id);
        self.next_player_id += 1;
        self.players.insert(id, Player::new(id, name));
        id
    }

    /// Returns a player by ID.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Returns a mutable player by ID.
    #[must_use]
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Iterates over all players in ID order.
    pub fn players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.values()
    }

    /// Owner of a ship or planet.
    #[must_use]
    pub fn owner_of(&self, id: EntityId) -> Option<PlayerId> {
        match self.get(id)?.inner() {
            EntityInner::Ship(c) => Some(c.owner),
            EntityInner::Planet(c) => c.owner,
            EntityInner::Blast(_) => None,
        }
    }

    /// Returns `true` if the owner of `id` currently holds the turn.
    #[must_use]
    pub fn owner_has_turn(&self, id: EntityId) -> bool {
        self.owner_of(id)
            .and_then(|owner| self.player(owner))
            .is_some_and(|p| p.has_current_turn)
    }

    /// Records `ship` as owned by `owner`.
    pub fn register_ship(&mut self, owner: PlayerId, ship: EntityId) {
        if let Some(c) = self.get_mut(ship).and_then(Entity::as_ship_mut) {
            c.owner = owner;
        }
        if let Some(player) = self.players.get_mut(&owner) {
            player.add_ship(ship);
        }
    }

    /// Records `planet` as owned by `owner`, detaching it from any previous
    /// owner. Returns the previous owner if ownership changed hands.
    pub fn register_planet(&mut self, owner: PlayerId, planet: EntityId) -> Option<PlayerId> {
        let previous = self
            .get_mut(planet)
            .and_then(Entity::as_planet_mut)
            .and_then(|c| c.owner.replace(owner))
            .filter(|prev| *prev != owner);
        if let Some(prev) = previous {
            if let Some(player) = self.players.get_mut(&prev) {
                player.remove_planet(planet);
            }
        }
        if let Some(player) = self.players.get_mut(&owner) {
            player.add_planet(planet);
        }
        previous
    }

    /// Removes `asset` from `owner`'s records.
    ///
    /// Returns `true` when the owner is left with no ships and no planets.
    pub fn unregister(&mut self, owner: PlayerId, asset: EntityId) -> bool {
        self.players.get_mut(&owner).is_some_and(|player| {
            player.remove_ship(asset);
            player.remove_planet(asset);
            player.is_defeated()
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
