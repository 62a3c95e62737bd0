//! Presentation-facing overlay: visuals, affordances and the turn banner.
//!
//! The core never draws anything. It registers *requests* here and toggles
//! their visibility as entity state changes; a renderer reads the overlay each
//! frame and draws whatever is visible.
//!
//! # Anchors
//!
//! Visual endpoints are [`Anchor`]s. An `Anchor::Entity` follows the live
//! position of that entity, so a line from a ship to its waypoint keeps
//! tracking the ship while it moves without the core re-issuing the line.
//! A renderer resolves it through
//! [`Arena::position_of`](crate::arena::Arena::position_of); an anchor whose
//! entity is gone resolves to nothing.
//!
//! # Affordances
//!
//! Buttons carry an [`AffordanceAction`] instead of a callback. When the
//! presentation layer reports an activation through
//! [`InputFrame`](crate::input::InputFrame), the simulation dispatches the
//! action itself.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Identifier of a registered visual.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VisualId(u64);

impl VisualId {
    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VisualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visual:{}", self.0)
    }
}

/// Identifier of a registered affordance (button).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AffordanceId(u64);

impl AffordanceId {
    /// Creates an affordance id from a raw value.
    ///
    /// Presentation layers normally receive ids from [`Overlay::affordances`];
    /// this exists for replaying recorded input.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AffordanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "affordance:{}", self.0)
    }
}

/// A position a visual is attached to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    /// Follows the live position of an entity.
    Entity(EntityId),
    /// A fixed world position.
    Point(Vec2),
}

/// Palette used by core-issued visuals.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tint {
    /// Selection indicators, in-range waypoint lines
    Green,
    /// Out-of-range waypoint lines, colonization reticules
    Yellow,
    /// Waypoints seen by a player who does not hold the turn
    Red,
    /// Colonization candidate lines
    Cyan,
    /// Neutral markers
    White,
}

/// Geometry of a visual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// A straight line between two anchors.
    Line {
        /// Start of the line
        from: Anchor,
        /// End of the line
        to: Anchor,
    },
    /// A circle outline.
    Circle {
        /// Center of the circle
        center: Anchor,
        /// Radius in world units
        radius: f32,
    },
    /// A square targeting reticule with broken edges.
    Reticule {
        /// Center of the reticule
        center: Anchor,
        /// Half the side length in world units
        radius: f32,
    },
    /// Predicted blast cone drawn at a waypoint.
    BlastForecast {
        /// Where the blast would originate
        origin: Anchor,
        /// Unit facing of the cone
        facing: Vec2,
        /// Predicted blast reach
        reach: f32,
        /// Half-angle of the cone in degrees
        half_angle_deg: f32,
    },
}

/// A line/marker request registered by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    /// What to draw
    pub shape: Shape,
    /// Color of the stroke
    pub tint: Tint,
    /// Stroke width
    pub width: f32,
    /// Whether the renderer should draw it
    pub visible: bool,
}

/// Where an affordance is laid out.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    /// Projected from a world position.
    World {
        /// World-space anchor of the button's top center
        position: Vec2,
        /// Button size in pixels
        size: Vec2,
    },
    /// The fixed central action region of the screen.
    Screen,
}

/// What activating an affordance does.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffordanceAction {
    /// Engage warp on a ship.
    Engage(EntityId),
    /// Colonize a planet with a ship.
    Colonize {
        /// Colonizing ship (consumed)
        ship: EntityId,
        /// Target planet
        planet: EntityId,
    },
    /// Trade a planet's population for ships.
    BuildShips(EntityId),
}

/// A button-style affordance registered by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affordance {
    /// Button text
    pub label: String,
    /// Layout of the button
    pub placement: Placement,
    /// Whether the button is shown
    pub visible: bool,
    /// Dispatched when the button is activated
    pub action: AffordanceAction,
}

/// Registry of everything the presentation layer should show.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Overlay {
    next_id: u64,
    visuals: BTreeMap<VisualId, Visual>,
    affordances: BTreeMap<AffordanceId, Affordance>,
    banner: Option<String>,
}

impl Overlay {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Registers a visual and returns its id.
    pub fn add_visual(&mut self, shape: Shape, tint: Tint, width: f32, visible: bool) -> VisualId {
        let id = VisualId(self.bump());
        self.visuals.insert(
            id,
            Visual {
                shape,
                tint,
                width,
                visible,
            },
        );
        id
    }

    /// Removes a visual. Unknown ids are ignored.
    pub fn remove_visual(&mut self, id: VisualId) {
        self.visuals.remove(&id);
    }

    /// Returns a visual by id.
    #[must_use]
    pub fn visual(&self, id: VisualId) -> Option<&Visual> {
        self.visuals.get(&id)
    }

    /// Returns a mutable visual by id.
    pub fn visual_mut(&mut self, id: VisualId) -> Option<&mut Visual> {
        self.visuals.get_mut(&id)
    }

    /// Shows or hides a visual.
    pub fn set_visual_visible(&mut self, id: VisualId, visible: bool) {
        if let Some(visual) = self.visuals.get_mut(&id) {
            visual.visible = visible;
        }
    }

    /// Iterates over all visuals in id order.
    pub fn visuals(&self) -> impl Iterator<Item = (VisualId, &Visual)> + '_ {
        self.visuals.iter().map(|(id, v)| (*id, v))
    }

    /// Registers a hidden affordance and returns its id.
    pub fn add_affordance(
        &mut self,
        label: impl Into<String>,
        placement: Placement,
        action: AffordanceAction,
    ) -> AffordanceId {
        let id = AffordanceId(self.bump());
        self.affordances.insert(
            id,
            Affordance {
                label: label.into(),
                placement,
                visible: false,
                action,
            },
        );
        id
    }

    /// Removes an affordance. Unknown ids are ignored.
    pub fn remove_affordance(&mut self, id: AffordanceId) {
        self.affordances.remove(&id);
    }

    /// Returns an affordance by id.
    #[must_use]
    pub fn affordance(&self, id: AffordanceId) -> Option<&Affordance> {
        self.affordances.get(&id)
    }

    /// Shows or hides an affordance.
    pub fn set_affordance_visible(&mut self, id: AffordanceId, visible: bool) {
        if let Some(affordance) = self.affordances.get_mut(&id) {
            affordance.visible = visible;
        }
    }

    /// Iterates over all affordances in id order.
    pub fn affordances(&self) -> impl Iterator<Item = (AffordanceId, &Affordance)> + '_ {
        self.affordances.iter().map(|(id, a)| (*id, a))
    }

    /// Returns the action of a visible affordance.
    ///
    /// Hidden or removed affordances cannot be activated.
    #[must_use]
    pub fn activation(&self, id: AffordanceId) -> Option<AffordanceAction> {
        self.affordances
            .get(&id)
            .filter(|a| a.visible)
            .map(|a| a.action)
    }

    /// Returns the current turn banner text.
    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Sets or clears the turn banner.
    pub fn set_banner(&mut self, text: Option<String>) {
        self.banner = text;
    }
}
