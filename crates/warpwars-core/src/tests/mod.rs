//! Scenario and property tests that drive whole matches.
//!
//! - `integration.rs`: matches played through [`crate::Simulation::step`]
//! - `properties.rs`: proptest checks of the rotation, selection, damage and
//!   warp invariants
//! - `helpers.rs`: factories shared by both

mod helpers;
mod integration;

pub use helpers::*;
