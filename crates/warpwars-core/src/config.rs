//! Match configuration.
//!
//! Every tunable lives in [`GameConfig`]. Defaults reproduce the classic
//! rules: ships start 100 units apart, warp at 10 units per time unit and
//! colonize anything within the 50-unit minimum warp range.
//!
//! # Example
//!
//! ```
//! use warpwars_core::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "player_count": 3 }"#).unwrap();
//! assert_eq!(config.player_count, 3);
//! assert!((config.min_warp_range - 50.0).abs() < f32::EPSILON);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the turn index is re-derived after a player leaves the rotation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Keep the numeric index and wrap it modulo the new roster size.
    ///
    /// Removing a player below the current slot hands the turn to whoever
    /// now sits in that slot.
    #[default]
    ByIndex,
    /// Keep the turn with the same player when another slot is removed.
    ///
    /// Removing the current player hands the turn to the next one in order.
    ByIdentity,
}

/// A planet placed explicitly by the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetSpec {
    /// World position
    pub position: Vec2,
    /// Starting health
    pub health: u32,
    /// Starting population (usually 0, i.e. colonizable)
    #[serde(default)]
    pub population: u32,
}

/// Seeded random scatter of neutral planets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// RNG seed; the same seed always yields the same map
    pub seed: u64,
    /// Number of planets to place
    pub planet_count: usize,
    /// Half-width of the square planets are scattered in
    pub extent: f32,
    /// Lowest starting health (inclusive)
    pub min_health: u32,
    /// Highest starting health (inclusive)
    pub max_health: u32,
    /// Minimum distance between a planet and any starting ship
    pub clearance: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            planet_count: 8,
            extent: 200.0,
            min_health: 1,
            max_health: 5,
            clearance: 20.0,
        }
    }
}

/// All tunables of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Players spawned by `start`
    pub player_count: usize,
    /// Starting ship of player `i` is placed at `(i * start_spacing, 0)`;
    /// must be positive so starting ships never coincide
    pub start_spacing: f32,
    /// Warp range of new ships
    pub ship_range: f32,
    /// Warp speed of new ships, in world units per time unit
    pub ship_speed: f32,
    /// Ship collision footprint radius
    pub ship_radius: f32,
    /// Minimum unescorted range; also the colonization radius
    pub min_warp_range: f32,
    /// Selection lock applied after every selection, in time units; 0
    /// disables the lock
    pub selection_lock_secs: f32,
    /// Squared distance to the waypoint that counts as arrived; 0 demands an
    /// exact arrival, which travel clipped to the waypoint always reaches
    pub arrival_tolerance_sq: f32,
    /// Blast radius growth per time unit
    pub blast_growth_rate: f32,
    /// Half-angle of the hit cone around the blast's facing, in degrees
    pub blast_hit_max_angle_deg: f32,
    /// Distance of the blast's front reference point from its origin
    pub blast_front_offset: f32,
    /// Planet collision footprint radius
    pub planet_radius: f32,
    /// Radius of planet selection and targeting reticules
    pub planet_targeter_radius: f32,
    /// Ring radius on which built ships appear around their planet
    pub ship_spawn_distance: f32,
    /// Turn re-index policy after a player leaves
    pub rotation: RotationPolicy,
    /// Explicitly placed planets
    pub planets: Vec<PlanetSpec>,
    /// Optional random planet scatter, added after `planets`
    pub map: Option<MapConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            start_spacing: 100.0,
            ship_range: 50.0,
            ship_speed: 10.0,
            ship_radius: 5.0,
            min_warp_range: 50.0,
            selection_lock_secs: 0.2,
            arrival_tolerance_sq: 0.01,
            blast_growth_rate: 50.0,
            blast_hit_max_angle_deg: 45.0,
            blast_front_offset: 10.0,
            planet_radius: 8.0,
            planet_targeter_radius: 10.0,
            ship_spawn_distance: 30.0,
            rotation: RotationPolicy::ByIndex,
            planets: Vec::new(),
            map: None,
        }
    }
}

impl GameConfig {
    /// Parses and validates a JSON configuration. Missing fields take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or any validation
    /// error from [`GameConfig::validate`].
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Colonization radius; the same as the minimum warp range.
    #[must_use]
    pub fn colonization_radius(&self) -> f32 {
        self.min_warp_range
    }

    /// Checks that the configuration can produce a playable match.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_count == 0 {
            return Err(ConfigError::NoPlayers);
        }

        for (field, value) in [
            ("ship_range", self.ship_range),
            ("ship_speed", self.ship_speed),
            ("ship_radius", self.ship_radius),
            ("min_warp_range", self.min_warp_range),
            ("blast_growth_rate", self.blast_growth_rate),
            ("blast_hit_max_angle_deg", self.blast_hit_max_angle_deg),
            ("planet_radius", self.planet_radius),
            ("blast_front_offset", self.blast_front_offset),
            ("start_spacing", self.start_spacing),
            ("planet_targeter_radius", self.planet_targeter_radius),
            ("ship_spawn_distance", self.ship_spawn_distance),
        ] {
            check_finite(field, value)?;
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        for (field, value) in [
            ("selection_lock_secs", self.selection_lock_secs),
            ("arrival_tolerance_sq", self.arrival_tolerance_sq),
        ] {
            check_finite(field, value)?;
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        for (index, planet) in self.planets.iter().enumerate() {
            if planet.health == 0 {
                return Err(ConfigError::DeadPlanet { index });
            }
            if planet.population > planet.health {
                return Err(ConfigError::PopulationExceedsHealth {
                    index,
                    population: planet.population,
                    health: planet.health,
                });
            }
        }

        if let Some(map) = &self.map {
            if map.min_health == 0 || map.min_health > map.max_health {
                return Err(ConfigError::BadHealthRange {
                    min: map.min_health,
                    max: map.max_health,
                });
            }
            // The scatter samples across the full width, which must stay finite.
            check_finite("map.extent", map.extent)?;
            if !(map.extent * 2.0).is_finite() {
                return Err(ConfigError::NotFinite {
                    field: "map.extent",
                    value: map.extent,
                });
            }
            if map.extent <= 0.0 {
                return Err(ConfigError::NonPositive {
                    field: "map.extent",
                    value: map.extent,
                });
            }
            check_finite("map.clearance", map.clearance)?;
            if map.clearance < 0.0 {
                return Err(ConfigError::Negative {
                    field: "map.clearance",
                    value: map.clearance,
                });
            }
        }

        Ok(())
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}
