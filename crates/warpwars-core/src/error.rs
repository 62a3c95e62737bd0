//! Error types for setup and configuration.
//!
//! Gameplay actions never fail: an invalid action is a no-op. Only building a
//! match from configuration can go wrong, and those failures are reported
//! here.

use thiserror::Error;

/// A configuration value that cannot produce a playable match.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `player_count` was zero.
    #[error("player count must be at least 1")]
    NoPlayers,

    /// A length, speed or rate that must be strictly positive was not.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Offending field name
        field: &'static str,
        /// Value supplied
        value: f32,
    },

    /// A value that must not be negative was.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Offending field name
        field: &'static str,
        /// Value supplied
        value: f32,
    },

    /// A numeric value is infinite or NaN.
    #[error("{field} must be finite, got {value}")]
    NotFinite {
        /// Offending field name
        field: &'static str,
        /// Value supplied
        value: f32,
    },

    /// A configured planet starts with zero health.
    #[error("planet {index} must start with health above zero")]
    DeadPlanet {
        /// Index into `planets`
        index: usize,
    },

    /// A configured planet has more population than health.
    #[error("planet {index} has population {population} above health {health}")]
    PopulationExceedsHealth {
        /// Index into `planets`
        index: usize,
        /// Configured population
        population: u32,
        /// Configured health
        health: u32,
    },

    /// The random map's health range is empty.
    #[error("map health range {min}..={max} is empty or starts at zero")]
    BadHealthRange {
        /// Lower bound
        min: u32,
        /// Upper bound
        max: u32,
    },

    /// The configuration text could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from setting up or starting a simulation.
#[derive(Debug, Error)]
pub enum GameError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `start` was called on a simulation that already started.
    #[error("simulation already started")]
    AlreadyStarted,
}
