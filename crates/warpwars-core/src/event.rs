//! Typed game events for presentation and telemetry.
//!
//! The core records what happened during a tick as [`GameEvent`]s. The
//! presentation layer drains them to spawn or destroy ship, waypoint and blast
//! instances, play explosions and show turn text. Events never feed back into
//! simulation state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::player::PlayerId;

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A player's turn began.
    TurnStarted {
        /// Player now holding the turn
        player: PlayerId,
        /// Display name, for the turn banner
        name: String,
    },
    /// A player was removed from the rotation.
    PlayerEliminated {
        /// Eliminated player
        player: PlayerId,
    },
    /// Only one player is left in the rotation.
    SoleSurvivor {
        /// Remaining player
        player: PlayerId,
    },
    /// No players remain; the match is over.
    RotationEmpty,
    /// An entity became the selection.
    Selected {
        /// Selected entity
        entity: EntityId,
    },
    /// An entity stopped being the selection.
    Deselected {
        /// Deselected entity
        entity: EntityId,
    },
    /// A ship instance should be created.
    ShipSpawned {
        /// New ship
        ship: EntityId,
        /// Owner
        owner: PlayerId,
        /// Spawn position
        position: Vec2,
    },
    /// A planet instance should be created.
    PlanetSpawned {
        /// New planet
        planet: EntityId,
        /// Position
        position: Vec2,
    },
    /// A waypoint instance should exist at `position`.
    WaypointPlaced {
        /// Ship owning the waypoint
        ship: EntityId,
        /// Waypoint position
        position: Vec2,
    },
    /// A ship's waypoint instance should be removed.
    WaypointRemoved {
        /// Ship that owned the waypoint
        ship: EntityId,
    },
    /// A ship entered warp.
    WarpEngaged {
        /// Warping ship
        ship: EntityId,
        /// Position warp started from
        from: Vec2,
        /// Destination
        to: Vec2,
    },
    /// A ship dropped out of warp.
    Arrived {
        /// Arriving ship
        ship: EntityId,
        /// Distance covered
        distance: f32,
    },
    /// A blast-effect instance should be created.
    BlastSpawned {
        /// New blast
        blast: EntityId,
        /// Ship that caused it
        creator: EntityId,
        /// Blast center
        origin: Vec2,
        /// Radius at which the blast completes
        reach: f32,
    },
    /// A blast-effect instance should be removed.
    BlastFinished {
        /// Finished blast
        blast: EntityId,
    },
    /// A blast hit an entity.
    Damaged {
        /// Entity that was hit
        target: EntityId,
        /// Entity credited with the hit
        attacker: EntityId,
    },
    /// An explosion effect should play.
    Explosion {
        /// Where to play it
        position: Vec2,
    },
    /// A ship instance should be removed.
    ShipDestroyed {
        /// Destroyed ship
        ship: EntityId,
    },
    /// A planet instance should be removed.
    PlanetDestroyed {
        /// Destroyed planet
        planet: EntityId,
    },
    /// A planet changed hands through colonization.
    Colonized {
        /// Colonized planet
        planet: EntityId,
        /// New owner
        owner: PlayerId,
        /// Ship consumed by the colonization
        ship: EntityId,
    },
    /// A planet traded its population for ships.
    ShipsBuilt {
        /// Building planet
        planet: EntityId,
        /// Ships created
        ships: Vec<EntityId>,
    },
}

/// Ordered log of events recorded since the last drain.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drains and returns all recorded events in the order they happened.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns the recorded events without draining them.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Returns the number of events currently in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the event log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
