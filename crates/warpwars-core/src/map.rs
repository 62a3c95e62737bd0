//! Seeded planet scatter.
//!
//! Given a [`MapConfig`], [`scatter`] places neutral planets inside a square
//! of half-width `extent` centered between the starting ships. The same seed
//! always yields the same planets.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::config::{GameConfig, MapConfig, PlanetSpec};

/// Placement attempts per planet before it is skipped.
const MAX_ATTEMPTS: usize = 64;

/// Starting position of player `index`'s first ship.
#[must_use]
pub fn start_position(config: &GameConfig, index: usize) -> Vec2 {
    #[allow(clippy::cast_precision_loss)]
    Vec2::new(index as f32 * config.start_spacing, 0.0)
}

/// Scatters `map.planet_count` planets.
///
/// A planet keeps `map.clearance` plus its radius away from every starting
/// ship and does not overlap explicitly configured or previously scattered
/// planets. Planets that cannot be placed after a bounded number of attempts
/// are skipped, so fewer than `planet_count` may be returned.
#[must_use]
pub fn scatter(config: &GameConfig, map: &MapConfig) -> Vec<PlanetSpec> {
    let mut rng = ChaCha8Rng::seed_from_u64(map.seed);
    let starts: Vec<Vec2> = (0..config.player_count)
        .map(|i| start_position(config, i))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let center = starts.iter().copied().sum::<Vec2>() / starts.len().max(1) as f32;
    let keep_out = map.clearance + config.planet_radius;
    let spacing = config.planet_radius * 2.0;

    let mut placed: Vec<Vec2> = config.planets.iter().map(|p| p.position).collect();
    let mut planets = Vec::with_capacity(map.planet_count);

    for _ in 0..map.planet_count {
        let candidate = (0..MAX_ATTEMPTS).find_map(|_| {
            let position = center
                + Vec2::new(
                    rng.gen_range(-map.extent..=map.extent),
                    rng.gen_range(-map.extent..=map.extent),
                );
            let clear_of_starts = starts.iter().all(|s| s.distance(position) >= keep_out);
            let clear_of_planets = placed.iter().all(|p| p.distance(position) >= spacing);
            (clear_of_starts && clear_of_planets).then_some(position)
        });
        let Some(position) = candidate else {
            warn!(seed = map.seed, "no room left for planet; skipping");
            continue;
        };

        let health = rng.gen_range(map.min_health..=map.max_health);
        placed.push(position);
        planets.push(PlanetSpec {
            position,
            health,
            population: 0,
        });
    }

    debug!(seed = map.seed, count = planets.len(), "map scattered");
    planets
}
