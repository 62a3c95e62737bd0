//! The shared simulation context.
//!
//! Every system in this crate is a free function over `&mut World`. The world
//! bundles the entity registry with the singletons the systems coordinate
//! through: the selection, the turn rotation, the overlay and the event log.
//! Nothing is looked up globally; whatever a system needs is reached through
//! this struct.

use crate::arena::Arena;
use crate::combat::{BlastReach, IdentityReach};
use crate::config::GameConfig;
use crate::event::{EventLog, GameEvent};
use crate::overlay::Overlay;
use crate::selection::SelectionState;
use crate::turn::TurnManager;

/// Everything the systems read and write during a tick.
#[derive(Debug)]
pub struct World {
    /// Entities, players and ownership edges
    pub arena: Arena,
    /// Visual and affordance requests for the presentation layer
    pub overlay: Overlay,
    /// Events recorded since the last drain
    pub events: EventLog,
    /// The single selection and its lock
    pub selection: SelectionState,
    /// Player rotation
    pub turns: TurnManager,
    /// Match tunables
    pub config: GameConfig,
    /// Maps travel distance to blast reach
    pub reach: Box<dyn BlastReach>,
}

impl World {
    /// Creates an empty world using `config` and the identity reach policy.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let turns = TurnManager::new(config.rotation);
        Self {
            arena: Arena::new(),
            overlay: Overlay::new(),
            events: EventLog::new(),
            selection: SelectionState::new(),
            turns,
            config,
            reach: Box::new(IdentityReach),
        }
    }

    /// Records an event.
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
