//! Per-tick input consumed from the presentation layer.
//!
//! The core does no hit-testing or screen projection. The presentation layer
//! resolves the pointer into a world position and the topmost entity under it,
//! and reports which overlay button (if any) was pressed.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::overlay::AffordanceId;

bitflags! {
    /// Button and pointer state for one tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct InputFlags: u8 {
        /// Primary pointer button is held this tick
        const POINTER_DOWN = 1 << 0;
        /// Primary pointer button went down this tick
        const POINTER_PRESSED = 1 << 1;
        /// Pointer is over an interactive overlay region
        const OVER_OVERLAY = 1 << 2;
        /// The engage-warp key went down this tick
        const ENGAGE_KEY = 1 << 3;
    }
}

/// Everything the core reads from the outside world in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputFrame {
    /// Button and pointer state
    pub flags: InputFlags,
    /// World-space position under the pointer
    pub pointer: Option<Vec2>,
    /// Topmost entity under the pointer
    pub hovered: Option<EntityId>,
    /// Overlay button activated this tick
    pub activated: Option<AffordanceId>,
}

impl InputFrame {
    /// A tick with no input at all.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// A fresh press at `pointer`, optionally over an entity.
    ///
    /// Sets both `POINTER_PRESSED` and `POINTER_DOWN`.
    #[must_use]
    pub fn click(pointer: Vec2, hovered: Option<EntityId>) -> Self {
        Self {
            flags: InputFlags::POINTER_DOWN | InputFlags::POINTER_PRESSED,
            pointer: Some(pointer),
            hovered,
            activated: None,
        }
    }

    /// The pointer held down at `pointer` without a fresh press.
    #[must_use]
    pub fn hold(pointer: Vec2, hovered: Option<EntityId>) -> Self {
        Self {
            flags: InputFlags::POINTER_DOWN,
            pointer: Some(pointer),
            hovered,
            activated: None,
        }
    }

    /// The engage-warp key pressed with no pointer activity.
    #[must_use]
    pub fn engage_key() -> Self {
        Self {
            flags: InputFlags::ENGAGE_KEY,
            ..Self::default()
        }
    }

    /// An overlay button activation.
    #[must_use]
    pub fn activate(affordance: AffordanceId) -> Self {
        Self {
            flags: InputFlags::OVER_OVERLAY,
            activated: Some(affordance),
            ..Self::default()
        }
    }

    /// Marks the pointer as being over an overlay region.
    #[must_use]
    pub fn over_overlay(mut self) -> Self {
        self.flags |= InputFlags::OVER_OVERLAY;
        self
    }

    /// Primary button is held.
    #[must_use]
    pub fn pointer_down(&self) -> bool {
        self.flags.contains(InputFlags::POINTER_DOWN)
    }

    /// Primary button went down this tick.
    #[must_use]
    pub fn pointer_pressed(&self) -> bool {
        self.flags.contains(InputFlags::POINTER_PRESSED)
    }

    /// Pointer is over the overlay, so world actions are suppressed.
    #[must_use]
    pub fn over_ui(&self) -> bool {
        self.flags.contains(InputFlags::OVER_OVERLAY)
    }

    /// Engage key went down this tick.
    #[must_use]
    pub fn engage_pressed(&self) -> bool {
        self.flags.contains(InputFlags::ENGAGE_KEY)
    }
}
