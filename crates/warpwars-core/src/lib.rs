//! # WarpWars Core
//!
//! Turn-based space strategy core for WarpWars.
//!
//! Players take exclusive turns. On a turn, a player selects one of their
//! ships, places a waypoint and engages warp; on arrival the ship emits an
//! expanding blast that damages whatever lies in its path, and the turn passes
//! on once the blast completes. Ships can colonize nearby empty planets, and
//! populated planets trade their population for new ships. A player left with
//! no ships and no planets leaves the rotation.
//!
//! ## Architecture
//!
//! - **Entities**: ships, planets and blasts in an id-ordered [`Arena`]
//! - **Systems**: free functions over a shared [`World`] ([`selection`],
//!   [`movement`], [`colonize`], [`combat`], [`planet`], [`turn`])
//! - **Loop**: [`Simulation::step`] runs the systems in a fixed order
//!
//! The core renders nothing. It reads an [`InputFrame`] each tick and exposes
//! an [`Overlay`] of visuals and buttons plus a stream of [`GameEvent`]s.
//!
//! ## Usage
//!
//! ```
//! use warpwars_core::{GameConfig, InputFrame, Simulation};
//!
//! let mut sim = Simulation::new(GameConfig::default());
//! sim.start()?;
//! sim.step(&InputFrame::idle(), 0.1);
//! for event in sim.take_events() {
//!     println!("{event:?}");
//! }
//! # Ok::<(), warpwars_core::GameError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod colonize;
pub mod combat;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod input;
pub mod map;
pub mod movement;
pub mod overlay;
pub mod planet;
pub mod player;
pub mod selection;
pub mod simulation;
pub mod turn;
pub mod world;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use combat::{BlastReach, HitOutcome, IdentityReach, ScaledReach};
pub use config::{GameConfig, MapConfig, PlanetSpec, RotationPolicy};
pub use entity::{Entity, EntityId, EntityTag};
pub use error::{ConfigError, GameError};
pub use event::GameEvent;
pub use input::{InputFlags, InputFrame};
pub use overlay::{AffordanceAction, AffordanceId, Overlay};
pub use player::PlayerId;
pub use simulation::Simulation;
pub use world::World;
