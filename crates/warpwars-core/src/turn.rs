//! Turn Manager: the rotation of players taking exclusive turns.
//!
//! The [`TurnManager`] holds the ordered roster and the index of the player
//! whose turn it is. The free functions here drive it against the [`World`]:
//! they flip `has_current_turn` on the player records, set the turn banner and
//! emit turn events. At most one player holds the turn at any time.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RotationPolicy;
use crate::entity::EntityId;
use crate::event::GameEvent;
use crate::map;
use crate::movement;
use crate::player::PlayerId;
use crate::world::World;

/// Ordered roster of active players and the current-turn index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnManager {
    roster: Vec<PlayerId>,
    current: usize,
    policy: RotationPolicy,
}

impl TurnManager {
    /// Creates an empty rotation using `policy` for re-indexing after removal.
    #[must_use]
    pub fn new(policy: RotationPolicy) -> Self {
        Self {
            roster: Vec::new(),
            current: 0,
            policy,
        }
    }

    /// Active players in turn order.
    #[must_use]
    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    /// The player holding the turn, or `None` once the roster is empty.
    #[must_use]
    pub fn current(&self) -> Option<PlayerId> {
        self.roster.get(self.current).copied()
    }

    /// Index of the current player in the roster.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Re-index policy in use.
    #[must_use]
    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Number of active players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roster.len()
    }

    /// Returns true once every player has been removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Appends a player to the end of the rotation.
    pub fn push(&mut self, player: PlayerId) {
        self.roster.push(player);
    }

    /// Moves to the next slot. Returns the new current player.
    fn rotate(&mut self) -> Option<PlayerId> {
        if self.roster.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.roster.len();
        self.current()
    }

    /// Removes `player` and re-derives the current index per the policy.
    /// Returns the roster slot it occupied.
    fn take(&mut self, player: PlayerId) -> Option<usize> {
        let slot = self.roster.iter().position(|p| *p == player)?;
        self.roster.remove(slot);
        if self.roster.is_empty() {
            self.current = 0;
            return Some(slot);
        }
        if self.policy == RotationPolicy::ByIdentity && slot < self.current {
            self.current -= 1;
        }
        self.current %= self.roster.len();
        Some(slot)
    }
}

/// Starts a match: adds `player_count` players, each with one ship at
/// `(i * start_spacing, 0)`, and hands the first turn to player one.
pub fn start(world: &mut World, player_count: usize) {
    for i in 0..player_count {
        let player = world.arena.add_player(format!("Player {}", i + 1));
        world.turns.push(player);
        let position = map::start_position(&world.config, i);
        movement::spawn_ship(world, position, player);
    }
    world.turns.current = 0;
    if let Some(first) = world.turns.current() {
        start_turn(world, first);
    }
    info!(players = player_count, "match started");
}

/// Ends the current player's turn and starts the next one's.
///
/// No-op with an empty roster. Returns the player now holding the turn.
pub fn advance(world: &mut World) -> Option<PlayerId> {
    let previous = world.turns.current()?;
    end_turn(world, previous);
    let next = world.turns.rotate()?;
    start_turn(world, next);
    Some(next)
}

/// Removes `player` from the rotation.
///
/// With players left, the turn goes to whoever holds the re-derived index and
/// that player's turn is started, even if it did not change hands. Removing
/// the last player ends the match with nobody holding the turn. Returns
/// whether `player` was in the roster.
pub fn remove(world: &mut World, player: PlayerId) -> bool {
    let previous = world.turns.current();
    let Some(slot) = world.turns.take(player) else {
        debug!(player = %player, "not in rotation; remove ignored");
        return false;
    };
    world.emit(GameEvent::PlayerEliminated { player });
    info!(player = %player, slot, remaining = world.turns.len(), "player eliminated");

    // The removed player can no longer hold the turn.
    set_turn_flag(world, player, false);

    let Some(next) = world.turns.current() else {
        if let Some(previous) = previous {
            set_turn_flag(world, previous, false);
        }
        world.overlay.set_banner(None);
        world.emit(GameEvent::RotationEmpty);
        warn!("no players left in rotation");
        return true;
    };

    if let Some(previous) = previous.filter(|p| *p != next) {
        end_turn(world, previous);
    }
    start_turn(world, next);

    if world.turns.len() == 1 {
        world.emit(GameEvent::SoleSurvivor { player: next });
        info!(player = %next, "sole survivor");
    }
    true
}

/// Detaches `asset` from `owner` and removes the owner from the rotation if
/// it was their last ship or planet.
pub(crate) fn unregister_asset(world: &mut World, owner: PlayerId, asset: EntityId) {
    if world.arena.unregister(owner, asset) {
        remove(world, owner);
    }
}

fn start_turn(world: &mut World, player: PlayerId) {
    set_turn_flag(world, player, true);
    let name = world
        .arena
        .player(player)
        .map(|p| p.name().to_string())
        .unwrap_or_default();
    world.overlay.set_banner(Some(format!("{name}'s Turn!")));
    info!(player = %player, name = %name, "turn started");
    world.emit(GameEvent::TurnStarted { player, name });
}

fn end_turn(world: &mut World, player: PlayerId) {
    set_turn_flag(world, player, false);
    debug!(player = %player, "turn ended");
}

fn set_turn_flag(world: &mut World, player: PlayerId, value: bool) {
    if let Some(record) = world.arena.player_mut(player) {
        record.has_current_turn = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use glam::Vec2;

    fn world_with(players: usize, rotation: RotationPolicy) -> World {
        let mut world = World::new(GameConfig {
            player_count: players,
            rotation,
            ..GameConfig::default()
        });
        start(&mut world, players);
        world
    }

    fn holders(world: &World) -> Vec<PlayerId> {
        world
            .arena
            .players()
            .filter(|p| p.has_current_turn)
            .map(|p| p.id())
            .collect()
    }

    mod start_tests {
        use super::*;

        #[test]
        fn start_spawns_one_ship_each() {
            let world = world_with(3, RotationPolicy::ByIndex);
            assert_eq!(world.turns.len(), 3);
            for player in world.arena.players() {
                assert_eq!(player.ships().len(), 1);
            }
            assert_eq!(holders(&world), vec![world.turns.roster()[0]]);
            assert_eq!(world.overlay.banner(), Some("Player 1's Turn!"));
        }

        #[test]
        fn starting_positions_are_spaced() {
            let world = world_with(3, RotationPolicy::ByIndex);
            let positions: Vec<Vec2> = world
                .arena
                .players()
                .map(|p| world.arena.position_of(p.ships()[0]).unwrap())
                .collect();
            assert_eq!(
                positions,
                vec![Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(200.0, 0.0)]
            );
        }
    }

    mod advance_tests {
        use super::*;

        #[test]
        fn advance_wraps() {
            let mut world = world_with(3, RotationPolicy::ByIndex);
            let roster = world.turns.roster().to_vec();
            assert_eq!(advance(&mut world), Some(roster[1]));
            assert_eq!(advance(&mut world), Some(roster[2]));
            assert_eq!(advance(&mut world), Some(roster[0]));
            assert_eq!(holders(&world), vec![roster[0]]);
        }

        #[test]
        fn advance_on_empty_is_noop() {
            let mut world = World::default();
            assert_eq!(advance(&mut world), None);
            assert!(world.turns.current().is_none());
            assert!(world.events.is_empty());
        }
    }

    mod remove_tests {
        use super::*;

        #[test]
        fn removing_last_player_empties_rotation() {
            let mut world = world_with(1, RotationPolicy::ByIndex);
            let only = world.turns.roster()[0];
            assert!(remove(&mut world, only));
            assert!(world.turns.is_empty());
            assert!(holders(&world).is_empty());
            assert!(world.overlay.banner().is_none());
            assert!(world.events.events().contains(&GameEvent::RotationEmpty));
        }

        #[test]
        fn removing_unknown_player_is_noop() {
            let mut world = world_with(2, RotationPolicy::ByIndex);
            assert!(!remove(&mut world, PlayerId::new(42)));
            assert_eq!(world.turns.len(), 2);
        }

        #[test]
        fn by_index_hands_turn_to_wrapped_slot() {
            let mut world = world_with(3, RotationPolicy::ByIndex);
            let roster = world.turns.roster().to_vec();
            advance(&mut world);
            advance(&mut world);
            // Current is slot 2; removing slot 0 leaves index 2 % 2 == 0.
            remove(&mut world, roster[0]);
            assert_eq!(world.turns.current(), Some(roster[1]));
            assert_eq!(holders(&world), vec![roster[1]]);
        }

        #[test]
        fn by_identity_keeps_current_player() {
            let mut world = world_with(3, RotationPolicy::ByIdentity);
            let roster = world.turns.roster().to_vec();
            advance(&mut world);
            advance(&mut world);
            remove(&mut world, roster[0]);
            assert_eq!(world.turns.current(), Some(roster[2]));
            assert_eq!(holders(&world), vec![roster[2]]);
        }

        #[test]
        fn removing_current_passes_turn_on() {
            for policy in [RotationPolicy::ByIndex, RotationPolicy::ByIdentity] {
                let mut world = world_with(3, policy);
                let roster = world.turns.roster().to_vec();
                remove(&mut world, roster[0]);
                assert_eq!(world.turns.current(), Some(roster[1]));
                assert_eq!(holders(&world), vec![roster[1]]);
            }
        }

        #[test]
        fn sole_survivor_is_announced() {
            let mut world = world_with(2, RotationPolicy::ByIndex);
            let roster = world.turns.roster().to_vec();
            world.events.take_events();
            remove(&mut world, roster[1]);
            assert!(world
                .events
                .events()
                .contains(&GameEvent::SoleSurvivor { player: roster[0] }));
        }
    }
}
