//! Movement Controller: the per-ship warp state machine.
//!
//! ```text
//!   Idle --engage--> Warping --arrival--> TurnFinished --blast done--> Idle
//! ```
//!
//! An idle, selected ship turns pointer input into a waypoint. Engaging sends
//! it toward the waypoint at `speed` world units per time unit. On arrival the
//! ship releases a blast scaled by the distance it covered and waits in
//! `TurnFinished` until [`combat`] reports the blast is over.
//!
//! This module also owns the ship's lifetime: [`spawn_ship`] registers the
//! ship and its overlay chrome, [`despawn_ship`] releases all of it.

use glam::Vec2;
use tracing::{debug, info, trace};

use crate::colonize;
use crate::combat;
use crate::entity::{
    Entity, EntityId, EntityInner, EntityTag, MotionState, ShipComponents, Waypoint,
    WaypointDisplay,
};
use crate::event::GameEvent;
use crate::input::InputFrame;
use crate::overlay::{AffordanceAction, Anchor, Placement, Shape, Tint};
use crate::player::PlayerId;
use crate::selection;
use crate::turn;
use crate::world::World;

/// Waypoint line stroke width.
pub const WAYPOINT_LINE_WIDTH: f32 = 4.0;

/// Slack added to the minimum warp range before a remembered waypoint is
/// shown again on selection.
const SHOW_MARGIN: f32 = 0.01;

/// Spawns an idle ship for `owner` at `position` with the configured stats.
///
/// Registers the ship with its owner, creates its hidden selection indicator,
/// range circle and "Warp" button, and scans for colonizable planets.
pub fn spawn_ship(world: &mut World, position: Vec2, owner: PlayerId) -> EntityId {
    let config = &world.config;
    let (radius, min_range) = (config.ship_radius, config.min_warp_range);
    let ship = ShipComponents::new(position, owner).with_stats(
        config.ship_range,
        config.ship_speed,
        radius,
    );
    let id = world.arena.spawn(EntityInner::Ship(ship));
    world.arena.register_ship(owner, id);

    let indicator = world.overlay.add_visual(
        Shape::Circle {
            center: Anchor::Entity(id),
            radius,
        },
        Tint::Green,
        1.0,
        false,
    );
    let range_circle = world.overlay.add_visual(
        Shape::Circle {
            center: Anchor::Entity(id),
            radius: min_range,
        },
        Tint::White,
        1.0,
        false,
    );
    let warp_button =
        world
            .overlay
            .add_affordance("Warp", Placement::Screen, AffordanceAction::Engage(id));

    if let Some(ship) = ship_mut(world, id) {
        ship.selection.indicator = Some(indicator);
        ship.chrome.range_circle = Some(range_circle);
        ship.chrome.warp_button = Some(warp_button);
    }

    world.emit(GameEvent::ShipSpawned {
        ship: id,
        owner,
        position,
    });
    debug!(ship = %id, owner = %owner, ?position, "ship spawned");

    colonize::scan(world, id);
    id
}

/// Removes a ship and every overlay handle it owns, detaching it from its
/// owner. When `explode` is set an explosion is requested at its position.
///
/// Drops the owner from the rotation if this was their last asset.
pub fn despawn_ship(world: &mut World, id: EntityId, explode: bool) {
    if world.selection.selected() == Some(id) {
        selection::clear(world, true);
    }
    remove_waypoint(world, id);
    colonize::clear_candidates(world, id);

    let Some(entity) = world.arena.despawn(id) else {
        return;
    };
    let position = entity.position();
    let Some(ship) = entity.as_ship() else {
        return;
    };
    if let Some(button) = ship.chrome.warp_button {
        world.overlay.remove_affordance(button);
    }
    for visual in ship.chrome.range_circle.into_iter().chain(ship.selection.indicator) {
        world.overlay.remove_visual(visual);
    }

    if explode {
        world.emit(GameEvent::Explosion { position });
    }
    world.emit(GameEvent::ShipDestroyed { ship: id });
    info!(ship = %id, owner = %ship.owner, explode, "ship removed");

    turn::unregister_asset(world, ship.owner, id);
}

/// Sends a ship toward its waypoint.
///
/// Requires the owner to hold the turn, the ship to be idle with a waypoint,
/// and no other ship to be warping or waiting on its blast. Locks the
/// selection until arrival and withdraws pending colonization offers. Returns
/// whether warp was engaged.
pub fn engage(world: &mut World, id: EntityId) -> bool {
    if !world.arena.owner_has_turn(id) {
        debug!(ship = %id, "owner does not hold the turn; engage ignored");
        return false;
    }
    let Some(ship) = ship_ref(world, id) else {
        return false;
    };
    if ship.motion != MotionState::Idle {
        return false;
    }
    let Some(target) = ship.waypoint.as_ref().map(|wp| wp.position) else {
        debug!(ship = %id, "no waypoint; engage ignored");
        return false;
    };
    let from = ship.transform.position;
    if busy_ship(world, id).is_some() {
        debug!(ship = %id, "another ship is mid-turn; engage ignored");
        return false;
    }

    if let Some(ship) = ship_mut(world, id) {
        ship.motion = MotionState::Warping;
        ship.warp_origin = Some(from);
    }
    world.selection.lock(0.0);
    colonize::clear_candidates(world, id);

    world.emit(GameEvent::WarpEngaged {
        ship: id,
        from,
        to: target,
    });
    info!(ship = %id, ?from, to = ?target, "warp engaged");
    true
}

/// Places the ship's waypoint at `position` and shows or hides it.
///
/// Only an idle, selected ship accepts a waypoint. Returns whether the
/// waypoint was set.
pub fn set_waypoint(world: &mut World, id: EntityId, position: Vec2, visible: bool) -> bool {
    let Some(ship) = ship_mut(world, id) else {
        return false;
    };
    if ship.motion != MotionState::Idle || !ship.selection.selected {
        return false;
    }
    let created = ship.waypoint.is_none();
    let waypoint = ship.waypoint.get_or_insert_with(|| Waypoint::new(position));
    let moved = waypoint.reposition(position) || created;
    waypoint.visible = visible;

    if moved {
        world.emit(GameEvent::WaypointPlaced { ship: id, position });
        debug!(ship = %id, ?position, visible, "waypoint placed");
    }
    refresh_waypoint(world, id);
    true
}

/// Shows or hides an existing waypoint without moving it.
pub fn show_waypoint(world: &mut World, id: EntityId, visible: bool) {
    let Some(waypoint) = ship_mut(world, id).and_then(|s| s.waypoint.as_mut()) else {
        return;
    };
    waypoint.visible = visible;
    refresh_waypoint(world, id);
}

/// Destroys the ship's waypoint and its visuals.
pub fn remove_waypoint(world: &mut World, id: EntityId) {
    let Some(waypoint) = ship_mut(world, id).and_then(|s| s.waypoint.take()) else {
        return;
    };
    for visual in waypoint.line.into_iter().chain(waypoint.forecast) {
        world.overlay.remove_visual(visual);
    }
    world.emit(GameEvent::WaypointRemoved { ship: id });
}

/// Advances every warping ship by `dt`, then lets the selected idle ship act
/// on this tick's input.
pub fn tick(world: &mut World, input: &InputFrame, dt: f32) {
    for id in world.arena.ids_with_tag(EntityTag::Ship) {
        if ship_ref(world, id).is_some_and(ShipComponents::is_warping) {
            advance_warp(world, id, dt);
        }
    }

    if let Some(id) = world.selection.selected() {
        if ship_ref(world, id).is_some_and(|s| s.motion == MotionState::Idle) {
            handle_input(world, id, input);
        }
    }

    // Recolor shown waypoints; turn ownership may have changed this tick.
    let shown: Vec<EntityId> = world
        .arena
        .entities_sorted()
        .filter(|e| {
            e.as_ship()
                .and_then(|s| s.waypoint.as_ref())
                .is_some_and(|wp| wp.visible)
        })
        .map(Entity::id)
        .collect();
    for id in shown {
        refresh_waypoint(world, id);
    }
}

fn advance_warp(world: &mut World, id: EntityId, dt: f32) {
    let tolerance = world.config.arrival_tolerance_sq;
    let Some(ship) = ship_mut(world, id) else {
        return;
    };
    let Some(target) = ship.waypoint.as_ref().map(|wp| wp.position) else {
        // Lost its waypoint mid-flight; land where it is.
        drop_out_of_warp(world, id);
        return;
    };

    let remaining = target - ship.transform.position;
    if remaining.length_squared() > tolerance {
        let step = remaining.normalize() * ship.speed * dt;
        let movement = if step.length_squared() > remaining.length_squared() {
            remaining
        } else {
            step
        };
        ship.transform.position += movement;
        trace!(ship = %id, position = ?ship.transform.position, "warping");
        world.arena.update_spatial(id);
    }

    let arrived = ship_ref(world, id)
        .is_some_and(|s| (target - s.transform.position).length_squared() <= tolerance);
    if arrived {
        drop_out_of_warp(world, id);
    }
}

/// Ends a warp: the ship waits on its blast, the waypoint goes away, a blast
/// scaled by the distance covered is released, the selection is force-cleared
/// and the ship rescans for colonizable planets.
pub fn drop_out_of_warp(world: &mut World, id: EntityId) {
    let Some(ship) = ship_mut(world, id) else {
        return;
    };
    ship.motion = MotionState::TurnFinished;
    let position = ship.transform.position;
    let origin = ship.warp_origin.take().unwrap_or(position);
    let forward = ship.transform.forward();

    remove_waypoint(world, id);

    let distance = position.distance(origin);
    world.emit(GameEvent::Arrived { ship: id, distance });
    info!(ship = %id, distance, "dropped out of warp");

    let front = position + forward * world.config.blast_front_offset;
    combat::spawn_blast(world, position, front, id, distance);
    selection::clear(world, true);
    colonize::scan(world, id);
}

/// Called by the combat resolver when the ship's blast completes.
pub fn complete_combat(world: &mut World, id: EntityId) {
    if let Some(ship) = ship_mut(world, id) {
        if ship.motion == MotionState::TurnFinished {
            ship.motion = MotionState::Idle;
            debug!(ship = %id, "ready for orders");
        }
    }
}

fn handle_input(world: &mut World, id: EntityId, input: &InputFrame) {
    if input.pointer_down() {
        if let Some(point) = input.pointer {
            pointer_down(world, id, point, input);
        }
    }
    if input.engage_pressed() {
        engage(world, id);
    }
}

fn pointer_down(world: &mut World, id: EntityId, point: Vec2, input: &InputFrame) {
    let min_range = world.config.min_warp_range;
    let over_planet = input
        .hovered
        .and_then(|h| world.arena.get(h))
        .is_some_and(Entity::is_planet);

    let Some(ship) = ship_mut(world, id) else {
        return;
    };
    if ship.contains(point) {
        return;
    }
    if over_planet {
        show_waypoint(world, id, false);
        return;
    }

    ship.transform.look_at(point);
    if point.distance(ship.transform.position) < min_range {
        set_waypoint(world, id, point, false);
    } else if !input.over_ui() {
        set_waypoint(world, id, point, true);
    }
}

/// Selection hook: reveal the waypoint (if it is far enough to matter), the
/// warp button, colonization offers and the range circle.
pub(crate) fn on_select(world: &mut World, id: EntityId) {
    let threshold = world.config.min_warp_range + SHOW_MARGIN;
    let Some(ship) = ship_ref(world, id) else {
        return;
    };
    let far_waypoint = ship
        .waypoint
        .as_ref()
        .is_some_and(|wp| wp.position.distance(ship.transform.position) > threshold);
    let (button, circle) = (ship.chrome.warp_button, ship.chrome.range_circle);

    if far_waypoint {
        show_waypoint(world, id, true);
    }
    if let Some(button) = button {
        world.overlay.set_affordance_visible(button, true);
    }
    colonize::highlight(world, id);
    if let Some(circle) = circle {
        world.overlay.set_visual_visible(circle, true);
    }
}

/// Deselection hook: hide everything [`on_select`] revealed.
pub(crate) fn on_deselect(world: &mut World, id: EntityId) {
    let Some(ship) = ship_ref(world, id) else {
        return;
    };
    let (button, circle) = (ship.chrome.warp_button, ship.chrome.range_circle);

    show_waypoint(world, id, false);
    if let Some(button) = button {
        world.overlay.set_affordance_visible(button, false);
    }
    colonize::unhighlight(world, id);
    if let Some(circle) = circle {
        world.overlay.set_visual_visible(circle, false);
    }
}

/// Creates or updates the waypoint's line and blast forecast.
///
/// The line color follows [`WaypointDisplay`]; the forecast is recomputed only
/// when the waypoint moved since the last refresh.
fn refresh_waypoint(world: &mut World, id: EntityId) {
    let has_turn = world.arena.owner_has_turn(id);
    let half_angle_deg = world.config.blast_hit_max_angle_deg;
    let Some(ship) = ship_ref(world, id) else {
        return;
    };
    let Some(waypoint) = ship.waypoint.clone() else {
        return;
    };
    let origin = ship.warp_origin.unwrap_or(ship.transform.position);
    let distance = origin.distance(waypoint.position);
    let display = WaypointDisplay::classify(has_turn, distance, ship.range);
    let tint = tint_for(display);
    let visible = waypoint.visible;

    let line = match waypoint.line {
        Some(line) => {
            if let Some(visual) = world.overlay.visual_mut(line) {
                visual.shape = Shape::Line {
                    from: Anchor::Entity(id),
                    to: Anchor::Point(waypoint.position),
                };
                visual.tint = tint;
                visual.visible = visible;
            }
            line
        }
        None => world.overlay.add_visual(
            Shape::Line {
                from: Anchor::Entity(id),
                to: Anchor::Point(waypoint.position),
            },
            tint,
            WAYPOINT_LINE_WIDTH,
            visible,
        ),
    };

    let forecast_shape = Shape::BlastForecast {
        origin: Anchor::Point(waypoint.position),
        facing: (waypoint.position - origin).normalize_or_zero(),
        reach: world.reach.reach(distance),
        half_angle_deg,
    };
    let forecast = match waypoint.forecast {
        Some(forecast) => {
            if let Some(visual) = world.overlay.visual_mut(forecast) {
                if waypoint.dirty {
                    visual.shape = forecast_shape;
                }
                visual.tint = tint;
                visual.visible = visible;
            }
            forecast
        }
        None => world.overlay.add_visual(forecast_shape, tint, 1.0, visible),
    };

    if let Some(waypoint) = ship_mut(world, id).and_then(|s| s.waypoint.as_mut()) {
        waypoint.line = Some(line);
        waypoint.forecast = Some(forecast);
        waypoint.display = display;
        waypoint.dirty = false;
    }
}

const fn tint_for(display: WaypointDisplay) -> Tint {
    match display {
        WaypointDisplay::InRange => Tint::Green,
        WaypointDisplay::OutOfRange => Tint::Yellow,
        WaypointDisplay::Hostile => Tint::Red,
    }
}

/// A ship other than `id` that is warping or waiting on its blast.
fn busy_ship(world: &World, id: EntityId) -> Option<EntityId> {
    world
        .arena
        .entities_sorted()
        .filter(|e| e.id() != id)
        .find(|e| e.as_ship().is_some_and(|s| s.motion != MotionState::Idle))
        .map(Entity::id)
}

fn ship_ref(world: &World, id: EntityId) -> Option<&ShipComponents> {
    world.arena.get(id).and_then(Entity::as_ship)
}

fn ship_mut(world: &mut World, id: EntityId) -> Option<&mut ShipComponents> {
    world.arena.get_mut(id).and_then(Entity::as_ship_mut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    /// Two players, turn with player one; returns (world, ship one, ship two).
    fn duel() -> (World, EntityId, EntityId) {
        let mut world = World::new(GameConfig::default());
        turn::start(&mut world, 2);
        let roster = world.turns.roster().to_vec();
        let a = world.arena.player(roster[0]).unwrap().ships()[0];
        let b = world.arena.player(roster[1]).unwrap().ships()[0];
        world.events.take_events();
        (world, a, b)
    }

    fn selected(world: &mut World, id: EntityId) {
        assert!(selection::select(world, id));
    }

    mod waypoint_tests {
        use super::*;

        #[test]
        fn waypoint_requires_selection() {
            let (mut world, a, _) = duel();
            assert!(!set_waypoint(&mut world, a, Vec2::new(0.0, 80.0), true));
            selected(&mut world, a);
            assert!(set_waypoint(&mut world, a, Vec2::new(0.0, 80.0), true));
            let wp = ship_ref(&world, a).unwrap().waypoint.clone().unwrap();
            assert!(wp.visible);
            assert!(!wp.dirty);
            assert_eq!(wp.display, WaypointDisplay::OutOfRange);
            let line = world.overlay.visual(wp.line.unwrap()).unwrap();
            assert_eq!(line.tint, Tint::Yellow);
            assert!((line.width - WAYPOINT_LINE_WIDTH).abs() < f32::EPSILON);
        }

        #[test]
        fn near_click_sets_hidden_waypoint() {
            let (mut world, a, _) = duel();
            selected(&mut world, a);
            tick(&mut world, &InputFrame::hold(Vec2::new(0.0, 20.0), None), 0.1);
            let wp = ship_ref(&world, a).unwrap().waypoint.clone().unwrap();
            assert!(!wp.visible);
            assert_eq!(wp.position, Vec2::new(0.0, 20.0));
        }

        #[test]
        fn far_click_over_ui_leaves_waypoint_alone() {
            let (mut world, a, _) = duel();
            selected(&mut world, a);
            let frame = InputFrame::hold(Vec2::new(0.0, 80.0), None).over_overlay();
            tick(&mut world, &frame, 0.1);
            assert!(ship_ref(&world, a).unwrap().waypoint.is_none());
        }

        #[test]
        fn click_inside_own_footprint_is_ignored() {
            let (mut world, a, _) = duel();
            selected(&mut world, a);
            tick(&mut world, &InputFrame::hold(Vec2::new(1.0, 1.0), Some(a)), 0.1);
            assert!(ship_ref(&world, a).unwrap().waypoint.is_none());
        }

        #[test]
        fn hovering_planet_hides_waypoint() {
            let (mut world, a, _) = duel();
            let planet = crate::planet::spawn_planet(&mut world, Vec2::new(0.0, 120.0), 3, 0);
            selected(&mut world, a);
            set_waypoint(&mut world, a, Vec2::new(0.0, 80.0), true);
            tick(&mut world, &InputFrame::hold(Vec2::new(0.0, 120.0), Some(planet)), 0.1);
            let wp = ship_ref(&world, a).unwrap().waypoint.clone().unwrap();
            assert!(!wp.visible);
            assert_eq!(wp.position, Vec2::new(0.0, 80.0));
        }

        #[test]
        fn enemy_waypoint_is_hostile() {
            let (mut world, _, b) = duel();
            selected(&mut world, b);
            set_waypoint(&mut world, b, Vec2::new(100.0, 60.0), true);
            let wp = ship_ref(&world, b).unwrap().waypoint.clone().unwrap();
            assert_eq!(wp.display, WaypointDisplay::Hostile);
        }
    }

    mod engage_tests {
        use super::*;

        #[test]
        fn engage_needs_waypoint_and_turn() {
            let (mut world, a, b) = duel();
            assert!(!engage(&mut world, a));

            selected(&mut world, b);
            set_waypoint(&mut world, b, Vec2::new(100.0, 60.0), true);
            assert!(!engage(&mut world, b));
            assert_eq!(ship_ref(&world, b).unwrap().motion, MotionState::Idle);
        }

        #[test]
        fn engage_locks_selection_indefinitely() {
            let (mut world, a, _) = duel();
            selected(&mut world, a);
            set_waypoint(&mut world, a, Vec2::new(0.0, 60.0), true);
            assert!(engage(&mut world, a));
            assert!(world.selection.is_locked());
            assert!(world.selection.lock_remaining().is_none());
            assert_eq!(
                ship_ref(&world, a).unwrap().warp_origin,
                Some(Vec2::ZERO)
            );
        }

        #[test]
        fn only_one_ship_in_flight() {
            let (mut world, a, _) = duel();
            let owner = world.turns.roster()[0];
            let c = spawn_ship(&mut world, Vec2::new(0.0, -200.0), owner);
            selected(&mut world, a);
            set_waypoint(&mut world, a, Vec2::new(0.0, 60.0), true);
            assert!(engage(&mut world, a));

            // Force a waypoint on the second ship to exercise the guard.
            if let Some(ship) = ship_mut(&mut world, c) {
                ship.waypoint = Some(Waypoint::new(Vec2::new(0.0, -300.0)));
            }
            assert!(!engage(&mut world, c));
        }
    }

    mod warp_tests {
        use super::*;

        #[test]
        fn forty_units_takes_four_ticks() {
            let (mut world, a, _) = duel();
            selected(&mut world, a);
            set_waypoint(&mut world, a, Vec2::new(0.0, 40.0), false);
            assert!(engage(&mut world, a));

            let mut last = f32::MAX;
            for step in 1..=3 {
                tick(&mut world, &InputFrame::idle(), 1.0);
                let ship = ship_ref(&world, a).unwrap();
                assert_eq!(ship.motion, MotionState::Warping, "tick {step}");
                let d = ship.transform.position.distance(Vec2::new(0.0, 40.0));
                assert!(d < last);
                last = d;
            }
            tick(&mut world, &InputFrame::idle(), 1.0);
            let ship = ship_ref(&world, a).unwrap();
            assert_eq!(ship.motion, MotionState::TurnFinished);
            assert_eq!(ship.transform.position, Vec2::new(0.0, 40.0));
            assert!(ship.waypoint.is_none());
            assert_eq!(world.selection.selected(), None);
            assert!(!world.selection.is_locked());

            let events = world.events.take_events();
            assert!(events.iter().any(|e| matches!(
                e,
                GameEvent::BlastSpawned { creator, reach, .. }
                    if *creator == a && (*reach - 40.0).abs() < 1e-4
            )));
        }

        #[test]
        fn no_overshoot_with_large_step() {
            let (mut world, a, _) = duel();
            selected(&mut world, a);
            set_waypoint(&mut world, a, Vec2::new(0.0, 15.0), false);
            engage(&mut world, a);
            tick(&mut world, &InputFrame::idle(), 5.0);
            assert_eq!(
                ship_ref(&world, a).unwrap().transform.position,
                Vec2::new(0.0, 15.0)
            );
        }

        #[test]
        fn turn_finished_ignores_input() {
            let (mut world, a, _) = duel();
            if let Some(ship) = ship_mut(&mut world, a) {
                ship.motion = MotionState::TurnFinished;
            }
            assert!(!set_waypoint(&mut world, a, Vec2::new(0.0, 90.0), true));
            complete_combat(&mut world, a);
            assert_eq!(ship_ref(&world, a).unwrap().motion, MotionState::Idle);
        }
    }

    mod chrome_tests {
        use super::*;

        #[test]
        fn selection_shows_and_hides_chrome() {
            let (mut world, a, _) = duel();
            let chrome = ship_ref(&world, a).unwrap().chrome.clone();
            selected(&mut world, a);
            assert!(world.overlay.affordance(chrome.warp_button.unwrap()).unwrap().visible);
            assert!(world.overlay.visual(chrome.range_circle.unwrap()).unwrap().visible);

            selection::clear(&mut world, true);
            assert!(!world.overlay.affordance(chrome.warp_button.unwrap()).unwrap().visible);
            assert!(!world.overlay.visual(chrome.range_circle.unwrap()).unwrap().visible);
        }

        #[test]
        fn despawn_releases_everything() {
            let (mut world, a, _) = duel();
            selected(&mut world, a);
            set_waypoint(&mut world, a, Vec2::new(0.0, 80.0), true);
            let before_visuals = world.overlay.visuals().count();
            despawn_ship(&mut world, a, false);
            // indicator, range circle, waypoint line and forecast
            assert_eq!(world.overlay.visuals().count(), before_visuals - 4);
            assert_eq!(world.selection.selected(), None);
            let events = world.events.take_events();
            assert!(!events.iter().any(|e| matches!(e, GameEvent::Explosion { .. })));
        }
    }
}
