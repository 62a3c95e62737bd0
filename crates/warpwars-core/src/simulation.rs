//! The tick loop.
//!
//! [`Simulation`] owns the [`World`] and runs the systems in a fixed order
//! every tick:
//!
//! 1. **LOCK**: count down the selection lock
//! 2. **AFFORDANCE**: dispatch the overlay button activated this tick
//! 3. **CLICK**: a fresh press on a selectable entity toggles its selection
//! 4. **MOVEMENT**: advance warping ships, then let the selected idle ship act
//!    on the input
//! 5. **COMBAT**: grow blasts, apply hits, finish completed blasts
//! 6. **DESELECT**: a press that hit nothing selectable clears the selection
//! 7. **ADVANCE**: bump the tick counter
//!
//! # Determinism
//!
//! Entities are visited in id order and the map scatter is seeded, so the same
//! configuration and input sequence always produce the same events.
//!
//! # Example
//!
//! ```
//! use warpwars_core::config::GameConfig;
//! use warpwars_core::input::InputFrame;
//! use warpwars_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(GameConfig::default());
//! sim.start().unwrap();
//!
//! for _ in 0..10 {
//!     sim.step(&InputFrame::idle(), 0.1);
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert_eq!(sim.turns().len(), 2);
//! ```

use tracing::{debug, info};

use crate::arena::Arena;
use crate::colonize;
use crate::combat::{self, BlastReach};
use crate::config::GameConfig;
use crate::entity::{Entity, EntityId};
use crate::error::GameError;
use crate::event::GameEvent;
use crate::input::InputFrame;
use crate::map;
use crate::movement;
use crate::overlay::{AffordanceAction, AffordanceId, Overlay};
use crate::planet::{self, PlanetStatus};
use crate::player::PlayerId;
use crate::selection::{self, SelectionState};
use crate::turn::{self, TurnManager};
use crate::world::World;

/// A match of WarpWars driven one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    tick: u64,
    started: bool,
}

impl Simulation {
    /// Creates an unstarted simulation. Nothing is spawned until
    /// [`Simulation::start`].
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            world: World::new(config),
            tick: 0,
            started: false,
        }
    }

    /// Replaces the distance-to-reach policy used for new blasts.
    #[must_use]
    pub fn with_reach_policy(mut self, reach: Box<dyn BlastReach>) -> Self {
        self.world.reach = reach;
        self
    }

    /// Validates the configuration, spawns the planets and starts the turn
    /// rotation.
    ///
    /// Configured planets are placed first, then the seeded scatter if a
    /// `map` is configured. Each player gets one ship and player one gets the
    /// first turn.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyStarted`] on a second call, or
    /// [`GameError::Config`] if the configuration is invalid.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        self.world.config.validate()?;

        let mut planets = self.world.config.planets.clone();
        if let Some(map_config) = self.world.config.map {
            planets.extend(map::scatter(&self.world.config, &map_config));
        }
        for spec in planets {
            planet::spawn_planet(&mut self.world, spec.position, spec.health, spec.population);
        }

        let players = self.world.config.player_count;
        turn::start(&mut self.world, players);
        self.started = true;
        info!(
            players,
            entities = self.world.arena.entity_count(),
            "simulation started"
        );
        Ok(())
    }

    /// Runs one tick with this tick's input. `dt` is in time units.
    pub fn step(&mut self, input: &InputFrame, dt: f32) {
        let world = &mut self.world;

        world.selection.tick_lock(dt);

        if let Some(affordance) = input.activated {
            activate_in(world, affordance);
        }

        if input.pointer_pressed() && !input.over_ui() {
            let hovered = input
                .hovered
                .filter(|id| world.arena.get(*id).and_then(Entity::as_selectable).is_some());
            if let Some(id) = hovered {
                selection::toggle_on_click(world, id);
            }
        }

        movement::tick(world, input, dt);
        combat::tick(world, dt);
        selection::passive_deselect(world, input);

        self.tick += 1;
    }

    /// Activates an overlay button outside of [`Simulation::step`].
    ///
    /// Hidden or removed buttons do nothing. Returns whether the action had
    /// an effect.
    pub fn activate(&mut self, affordance: AffordanceId) -> bool {
        activate_in(&mut self.world, affordance)
    }

    /// Drains the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.world.events.take_events()
    }

    /// Owner, health and population of a planet.
    #[must_use]
    pub fn planet_status(&self, id: EntityId) -> Option<PlanetStatus> {
        planet::status(&self.world, id)
    }

    /// Player holding the turn.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        self.world.turns.current()
    }

    /// Returns the number of ticks run so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether [`Simulation::start`] has succeeded.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Shared world context.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world context, for scripted setups and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Entity registry.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.world.arena
    }

    /// Visuals, buttons and the turn banner.
    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.world.overlay
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.world.selection
    }

    /// Turn rotation.
    #[must_use]
    pub fn turns(&self) -> &TurnManager {
        &self.world.turns
    }

    /// Match configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.world.config
    }
}

fn activate_in(world: &mut World, affordance: AffordanceId) -> bool {
    let Some(action) = world.overlay.activation(affordance) else {
        debug!(?affordance, "inactive button; activation ignored");
        return false;
    };
    match action {
        AffordanceAction::Engage(ship) => movement::engage(world, ship),
        AffordanceAction::Colonize { ship, planet } => colonize::colonize(world, ship, planet),
        AffordanceAction::BuildShips(id) => !planet::build_ships(world, id).is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ScaledReach;
    use crate::config::{MapConfig, PlanetSpec};
    use crate::error::ConfigError;
    use glam::Vec2;

    mod start_tests {
        use super::*;

        #[test]
        fn start_spawns_players_and_planets() {
            let config = GameConfig {
                planets: vec![PlanetSpec {
                    position: Vec2::new(50.0, 80.0),
                    health: 3,
                    population: 0,
                }],
                ..GameConfig::default()
            };
            let mut sim = Simulation::new(config);
            sim.start().unwrap();

            assert!(sim.is_started());
            assert_eq!(sim.turns().len(), 2);
            assert_eq!(sim.current_player(), Some(sim.turns().roster()[0]));
            assert_eq!(sim.arena().planets_within(Vec2::new(50.0, 80.0), 1.0).len(), 1);
            assert_eq!(sim.overlay().banner(), Some("Player 1's Turn!"));
        }

        #[test]
        fn start_twice_fails() {
            let mut sim = Simulation::new(GameConfig::default());
            sim.start().unwrap();
            assert!(matches!(sim.start(), Err(GameError::AlreadyStarted)));
        }

        #[test]
        fn invalid_config_is_rejected() {
            let mut sim = Simulation::new(GameConfig {
                player_count: 0,
                ..GameConfig::default()
            });
            assert!(matches!(
                sim.start(),
                Err(GameError::Config(ConfigError::NoPlayers))
            ));
            assert!(!sim.is_started());
            assert!(sim.arena().is_empty());
        }

        #[test]
        fn seeded_map_is_reproducible() {
            let config = GameConfig {
                map: Some(MapConfig {
                    seed: 99,
                    ..MapConfig::default()
                }),
                ..GameConfig::default()
            };
            let mut a = Simulation::new(config.clone());
            let mut b = Simulation::new(config);
            a.start().unwrap();
            b.start().unwrap();
            assert_eq!(a.take_events(), b.take_events());
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn step_advances_tick() {
            let mut sim = Simulation::new(GameConfig::default());
            sim.start().unwrap();
            sim.step(&InputFrame::idle(), 0.1);
            sim.step(&InputFrame::idle(), 0.1);
            assert_eq!(sim.tick(), 2);
        }

        #[test]
        fn click_selects_hovered_ship() {
            let mut sim = Simulation::new(GameConfig::default());
            sim.start().unwrap();
            let ship = sim.arena().ships_within(Vec2::ZERO, 1.0)[0];

            sim.step(&InputFrame::click(Vec2::ZERO, Some(ship)), 0.1);
            assert_eq!(sim.selection().selected(), Some(ship));
        }

        #[test]
        fn click_on_empty_space_deselects_after_lock() {
            let mut sim = Simulation::new(GameConfig::default());
            sim.start().unwrap();
            let ship = sim.arena().ships_within(Vec2::ZERO, 1.0)[0];
            sim.step(&InputFrame::click(Vec2::ZERO, Some(ship)), 0.1);

            // Still locked: the click places a waypoint instead.
            sim.step(&InputFrame::click(Vec2::new(0.0, 300.0), None), 0.05);
            assert_eq!(sim.selection().selected(), Some(ship));

            sim.step(&InputFrame::idle(), 0.5);
            sim.step(&InputFrame::click(Vec2::new(0.0, 300.0), None), 0.1);
            assert_eq!(sim.selection().selected(), None);
        }

        #[test]
        fn reach_policy_scales_blasts() {
            let mut sim = Simulation::new(GameConfig::default())
                .with_reach_policy(Box::new(ScaledReach(0.5)));
            sim.start().unwrap();
            let ship = sim.arena().ships_within(Vec2::ZERO, 1.0)[0];
            sim.step(&InputFrame::click(Vec2::ZERO, Some(ship)), 1.0);
            sim.step(&InputFrame::hold(Vec2::new(0.0, 60.0), None), 1.0);
            sim.step(&InputFrame::engage_key(), 1.0);
            for _ in 0..6 {
                sim.step(&InputFrame::idle(), 1.0);
            }

            let reach = sim.take_events().into_iter().find_map(|e| match e {
                GameEvent::BlastSpawned { reach, .. } => Some(reach),
                _ => None,
            });
            assert!((reach.unwrap() - 30.0).abs() < 1e-4);
        }

        #[test]
        fn hidden_button_does_nothing() {
            let mut sim = Simulation::new(GameConfig::default());
            sim.start().unwrap();
            let ship = sim.arena().ships_within(Vec2::ZERO, 1.0)[0];
            let warp = sim.arena().get(ship).unwrap().as_ship().unwrap().chrome.warp_button.unwrap();
            assert!(!sim.activate(warp));
        }
    }
}
