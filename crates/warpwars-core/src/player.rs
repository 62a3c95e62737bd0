//! Players and the assets they own.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Unique identifier for a player.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new `PlayerId` from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A player record.
///
/// Ships are kept in insertion order; planets in id order. A player with no
/// ships and no planets is out of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    /// Whether this player may act right now
    pub has_current_turn: bool,
    ships: Vec<EntityId>,
    planets: BTreeSet<EntityId>,
}

impl Player {
    /// Creates a player with no assets.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            has_current_turn: false,
            ships: Vec::new(),
            planets: BTreeSet::new(),
        }
    }

    /// Returns the player's id.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owned ships in the order they were registered.
    #[must_use]
    pub fn ships(&self) -> &[EntityId] {
        &self.ships
    }

    /// Owned planets.
    #[must_use]
    pub fn planets(&self) -> &BTreeSet<EntityId> {
        &self.planets
    }

    /// Returns `true` once the player owns nothing.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.ships.is_empty() && self.planets.is_empty()
    }

    pub(crate) fn add_ship(&mut self, ship: EntityId) {
        if !self.ships.contains(&ship) {
            self.ships.push(ship);
        }
    }

    pub(crate) fn remove_ship(&mut self, ship: EntityId) -> bool {
        let before = self.ships.len();
        self.ships.retain(|s| *s != ship);
        self.ships.len() != before
    }

    pub(crate) fn add_planet(&mut self, planet: EntityId) {
        self.planets.insert(planet);
    }

    pub(crate) fn remove_planet(&mut self, planet: EntityId) -> bool {
        self.planets.remove(&planet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ships_keep_insertion_order_without_duplicates() {
        let mut player = Player::new(PlayerId::new(0), "Player 1");
        player.add_ship(EntityId::new(5));
        player.add_ship(EntityId::new(2));
        player.add_ship(EntityId::new(5));
        assert_eq!(player.ships(), &[EntityId::new(5), EntityId::new(2)]);
    }

    #[test]
    fn defeated_only_without_any_asset() {
        let mut player = Player::new(PlayerId::new(0), "Player 1");
        assert!(player.is_defeated());

        player.add_planet(EntityId::new(1));
        assert!(!player.is_defeated());

        player.add_ship(EntityId::new(2));
        assert!(player.remove_planet(EntityId::new(1)));
        assert!(!player.is_defeated());

        assert!(player.remove_ship(EntityId::new(2)));
        assert!(!player.remove_ship(EntityId::new(2)));
        assert!(player.is_defeated());
    }

    #[test]
    fn display_is_short() {
        assert_eq!(PlayerId::new(3).to_string(), "P3");
    }
}
