//! Component structs for entity types.
//!
//! The component structs hold all state for a particular entity type. Handles
//! into the [`Overlay`](crate::overlay::Overlay) (visual and affordance ids)
//! are stored next to the state they present, so tearing an entity down can
//! release everything it registered.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::{Damageable, HitOutcome};
use crate::entity::EntityId;
use crate::overlay::{AffordanceId, VisualId};
use crate::player::PlayerId;
use crate::selection::Selectable;

/// Tolerance for deciding whether a waypoint actually moved.
///
/// Repositioning by less than this (in world units) leaves the waypoint clean,
/// so dependent visuals are not rebuilt for sub-pixel jitter.
pub const POSITION_EPSILON: f32 = 1e-3;

/// Position and orientation on the playing plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformState {
    /// World position
    pub position: Vec2,
    /// Heading in radians (counter-clockwise from +X)
    pub heading: f32,
}

impl TransformState {
    /// Creates a transform at the given position and heading.
    #[must_use]
    pub const fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }

    /// Unit vector the entity is facing.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Turns to face a world point. Facing the current position is a no-op.
    pub fn look_at(&mut self, target: Vec2) {
        let delta = target - self.position;
        if delta.length_squared() > POSITION_EPSILON * POSITION_EPSILON {
            self.heading = delta.y.atan2(delta.x);
        }
    }
}

/// Warp state machine of a ship.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum MotionState {
    /// Accepting orders
    #[default]
    Idle,
    /// Travelling to the waypoint
    Warping,
    /// Arrived; waiting for its blast to finish
    TurnFinished,
}

/// How a waypoint should be colored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointDisplay {
    /// Owner holds the turn and the target is within the ship's range
    InRange,
    /// Owner holds the turn and the target is beyond the ship's range
    OutOfRange,
    /// Owner does not hold the turn
    Hostile,
}

impl WaypointDisplay {
    /// Classifies a waypoint at `distance` from a ship with `range`.
    #[must_use]
    pub fn classify(owner_has_turn: bool, distance: f32, range: f32) -> Self {
        if !owner_has_turn {
            Self::Hostile
        } else if distance > range {
            Self::OutOfRange
        } else {
            Self::InRange
        }
    }
}

/// The single pending warp destination of a ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Target position
    pub position: Vec2,
    /// Whether the waypoint is shown
    pub visible: bool,
    /// Derived display state
    pub display: WaypointDisplay,
    /// Line from the ship to the waypoint
    pub line: Option<VisualId>,
    /// Blast forecast drawn at the waypoint
    pub forecast: Option<VisualId>,
    /// Set when the position changed since visuals were last rebuilt
    pub dirty: bool,
}

impl Waypoint {
    /// Creates a hidden waypoint at `position`.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            visible: false,
            display: WaypointDisplay::InRange,
            line: None,
            forecast: None,
            dirty: true,
        }
    }

    /// Moves the waypoint, marking it dirty if it moved more than
    /// [`POSITION_EPSILON`]. Returns whether it moved.
    pub fn reposition(&mut self, position: Vec2) -> bool {
        if self.position.distance_squared(position) > POSITION_EPSILON * POSITION_EPSILON {
            self.position = position;
            self.dirty = true;
            true
        } else {
            false
        }
    }
}

/// A colonization offer from a ship to a nearby planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyTarget {
    /// Candidate planet
    pub planet: EntityId,
    /// Line from the ship to the planet
    pub line: VisualId,
    /// "Colonize" button below the planet
    pub button: AffordanceId,
}

/// Selection flag plus the indicator shown while selected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionMarker {
    /// Whether the entity is currently selected
    pub selected: bool,
    /// Indicator visual shown while selected
    pub indicator: Option<VisualId>,
}

/// Overlay handles a ship owns for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShipChrome {
    /// Screen-fixed "Warp" button
    pub warp_button: Option<AffordanceId>,
    /// Circle of the minimum unescorted range
    pub range_circle: Option<VisualId>,
    /// Reticules over highlighted colonization candidates
    pub reticules: Vec<VisualId>,
}

/// Components for Ship entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipComponents {
    /// Position and heading
    pub transform: TransformState,
    /// Owning player
    pub owner: PlayerId,
    /// Distance the ship can warp while staying "in range"
    pub range: f32,
    /// Warp speed in world units per time unit
    pub speed: f32,
    /// Collision footprint radius
    pub radius: f32,
    /// Warp state machine
    pub motion: MotionState,
    /// Position recorded when warp was engaged
    pub warp_origin: Option<Vec2>,
    /// Pending destination, at most one
    pub waypoint: Option<Waypoint>,
    /// Current colonization candidates
    pub colony_targets: Vec<ColonyTarget>,
    /// Selection state
    pub selection: SelectionMarker,
    /// Overlay handles owned by the ship
    pub chrome: ShipChrome,
}

impl ShipComponents {
    /// Creates an idle ship at `position` owned by `owner`, with unit stats.
    #[must_use]
    pub fn new(position: Vec2, owner: PlayerId) -> Self {
        Self {
            transform: TransformState::new(position, 0.0),
            owner,
            range: 1.0,
            speed: 1.0,
            radius: 1.0,
            motion: MotionState::Idle,
            warp_origin: None,
            waypoint: None,
            colony_targets: Vec::new(),
            selection: SelectionMarker::default(),
            chrome: ShipChrome::default(),
        }
    }

    /// Sets range, speed and footprint radius.
    #[must_use]
    pub fn with_stats(mut self, range: f32, speed: f32, radius: f32) -> Self {
        self.range = range;
        self.speed = speed;
        self.radius = radius;
        self
    }

    /// Returns `true` while travelling.
    #[must_use]
    pub fn is_warping(&self) -> bool {
        self.motion == MotionState::Warping
    }

    /// Returns whether `point` lies inside the ship's footprint.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.transform.position.distance_squared(point) <= self.radius * self.radius
    }
}

impl Selectable for ShipComponents {
    fn is_selected(&self) -> bool {
        self.selection.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selection.selected = selected;
    }

    fn indicator(&self) -> Option<VisualId> {
        self.selection.indicator
    }

    // Clicking away from a selected ship places its waypoint instead.
    fn deselects_on_click_away(&self) -> bool {
        false
    }
}

impl Damageable for ShipComponents {
    fn take_hit(&mut self, own_id: EntityId, attacker: EntityId) -> HitOutcome {
        if attacker == own_id {
            HitOutcome::Ignored
        } else {
            HitOutcome::Destroyed
        }
    }
}

/// Components for Planet entities.
///
/// # Invariants
///
/// `population <= health` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetComponents {
    /// Position (planets do not move)
    pub transform: TransformState,
    /// Owning player, `None` until colonized
    pub owner: Option<PlayerId>,
    /// Remaining hits before the planet is destroyed
    pub health: u32,
    /// Population, capped by health
    pub population: u32,
    /// Collision footprint radius
    pub radius: f32,
    /// Selection state
    pub selection: SelectionMarker,
    /// "Build Ship" button
    pub build_button: Option<AffordanceId>,
}

impl PlanetComponents {
    /// Creates an unowned, unpopulated planet.
    #[must_use]
    pub fn new(position: Vec2, health: u32) -> Self {
        Self {
            transform: TransformState::new(position, 0.0),
            owner: None,
            health,
            population: 0,
            radius: 1.0,
            selection: SelectionMarker::default(),
            build_button: None,
        }
    }

    /// Sets the footprint radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the population, clamped to health.
    #[must_use]
    pub fn with_population(mut self, population: u32) -> Self {
        self.population = population.min(self.health);
        self
    }

    /// A planet can be colonized only while nobody lives on it.
    #[must_use]
    pub const fn can_colonize(&self) -> bool {
        self.population == 0
    }
}

impl Selectable for PlanetComponents {
    fn is_selected(&self) -> bool {
        self.selection.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selection.selected = selected;
    }

    fn indicator(&self) -> Option<VisualId> {
        self.selection.indicator
    }
}

impl Damageable for PlanetComponents {
    fn take_hit(&mut self, _own_id: EntityId, _attacker: EntityId) -> HitOutcome {
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            HitOutcome::Destroyed
        } else {
            self.population = self.population.min(self.health);
            HitOutcome::Wounded {
                health: self.health,
            }
        }
    }
}

/// Components for Blast entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlastComponents {
    /// Center of the blast
    pub origin: Vec2,
    /// Unit facing; hits land in the cone ahead of the blast
    pub forward: Vec2,
    /// Entity that caused the blast (never damaged by it)
    pub creator: EntityId,
    /// Radius at which the blast completes
    pub reach: f32,
    /// Current radius
    pub radius: f32,
    /// Entities already hit by this blast
    pub struck: BTreeSet<EntityId>,
}

impl BlastComponents {
    /// Creates a zero-radius blast.
    #[must_use]
    pub fn new(origin: Vec2, forward: Vec2, creator: EntityId, reach: f32) -> Self {
        Self {
            origin,
            forward: unit_or_x(forward),
            creator,
            reach,
            radius: 0.0,
            struck: BTreeSet::new(),
        }
    }

    /// Returns `true` once the radius reached the target reach.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.radius >= self.reach
    }
}

fn unit_or_x(v: Vec2) -> Vec2 {
    let unit = v.normalize_or_zero();
    if unit == Vec2::ZERO {
        Vec2::X
    } else {
        unit
    }
}
