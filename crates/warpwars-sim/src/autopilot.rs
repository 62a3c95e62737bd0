//! Demo input script for the headless runner.
//!
//! This is not an opponent and makes no strategic choices: it replays a fixed
//! click sequence (select, colonize or build, aim, engage) for whichever side
//! holds the turn, so a match can run to completion without a human. It only
//! sees what a presentation layer would: the arena, the overlay and the
//! selection. Each tick it produces one [`InputFrame`].

use glam::Vec2;
use warpwars_core::entity::{Entity, EntityId, MotionState, ShipComponents};
use warpwars_core::{InputFrame, PlayerId, Simulation};

/// Waypoints closer than this to the intended aim point count as placed.
const AIM_TOLERANCE: f32 = 1.0;

/// Picks the next input for whoever holds the turn.
#[derive(Debug, Default)]
pub struct Autopilot;

impl Autopilot {
    /// Returns the input for the coming tick.
    pub fn next_frame(&self, sim: &Simulation) -> InputFrame {
        let Some(player) = sim.current_player() else {
            return InputFrame::idle();
        };
        if any_ship_busy(sim) {
            return InputFrame::idle();
        }

        if let Some(selected) = sim.selection().selected() {
            if let Some(frame) = act_on_selection(sim, player, selected) {
                return frame;
            }
        }
        if sim.selection().is_locked() {
            return InputFrame::idle();
        }
        pick(sim, player).map_or_else(InputFrame::idle, |id| {
            let position = sim.arena().position_of(id).unwrap_or_default();
            InputFrame::click(position, Some(id))
        })
    }
}

fn any_ship_busy(sim: &Simulation) -> bool {
    sim.arena()
        .entities_sorted()
        .filter_map(Entity::as_ship)
        .any(|s| s.motion != MotionState::Idle)
}

/// Spends population first, then colonizes, then attacks.
fn act_on_selection(sim: &Simulation, player: PlayerId, selected: EntityId) -> Option<InputFrame> {
    let entity = sim.arena().get(selected)?;

    if let Some(planet) = entity.as_planet() {
        let button = planet.build_button?;
        let visible = sim.overlay().affordance(button).is_some_and(|a| a.visible);
        return (planet.owner == Some(player) && visible).then(|| InputFrame::activate(button));
    }

    let ship = entity.as_ship().filter(|s| s.owner == player)?;
    if let Some(target) = ship.colony_targets.first() {
        return Some(InputFrame::activate(target.button));
    }

    let aim = aim_point(sim, player, ship);
    let placed = ship
        .waypoint
        .as_ref()
        .is_some_and(|wp| wp.position.distance(aim) <= AIM_TOLERANCE);
    if placed {
        Some(InputFrame::engage_key())
    } else {
        Some(InputFrame::hold(aim, None))
    }
}

/// A populated planet of `player`, else their first ship.
fn pick(sim: &Simulation, player: PlayerId) -> Option<EntityId> {
    let record = sim.arena().player(player)?;
    let populated = record.planets().iter().copied().find(|id| {
        sim.planet_status(*id)
            .is_some_and(|status| status.population > 0)
    });
    populated.or_else(|| record.ships().first().copied())
}

/// Point to warp to so the nearest foreign entity lands inside the blast.
fn aim_point(sim: &Simulation, player: PlayerId, ship: &ShipComponents) -> Vec2 {
    let from = ship.transform.position;
    let nearest = sim
        .arena()
        .entities_sorted()
        .filter(|e| match (e.as_ship(), e.as_planet()) {
            (Some(s), _) => s.owner != player,
            (_, Some(p)) => p.owner != Some(player) && !p.can_colonize(),
            _ => false,
        })
        .map(Entity::position)
        .min_by(|a, b| from.distance(*a).total_cmp(&from.distance(*b)));

    let Some(target) = nearest else {
        return from + Vec2::X * ship.range;
    };
    let offset = target - from;
    let length = offset.length();
    if length <= f32::EPSILON {
        return from + Vec2::X * ship.range;
    }
    // Covering at least half the gap makes the blast reach the target.
    let travel = (length * 0.6).min(ship.range);
    from + offset / length * travel
}
