//! Selection Controller: one selected entity at a time, guarded by a lock.
//!
//! All changes to the selection go through [`select`], [`clear`] and
//! [`toggle_on_click`]. Entities opt in by implementing [`Selectable`]; the
//! controller flips their flag, shows their indicator and dispatches the
//! select/deselect hooks of the owning system.
//!
//! # Lock
//!
//! A successful selection locks the selection for
//! [`GameConfig::selection_lock_secs`](crate::config::GameConfig), so the click
//! that selected an entity cannot immediately deselect it again. Engaging warp
//! locks indefinitely until the ship arrives. While locked, only a forced
//! [`clear`] changes the selection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{Entity, EntityId, EntityTag};
use crate::event::GameEvent;
use crate::input::InputFrame;
use crate::movement;
use crate::overlay::VisualId;
use crate::planet;
use crate::world::World;

/// Capability of entities that can be selected.
pub trait Selectable {
    /// Whether this entity is the current selection.
    fn is_selected(&self) -> bool;

    /// Sets the selection flag. Only the selection controller calls this.
    fn set_selected(&mut self, selected: bool);

    /// Indicator shown while selected.
    fn indicator(&self) -> Option<VisualId>;

    /// Whether a click elsewhere in the world deselects this entity.
    fn deselects_on_click_away(&self) -> bool {
        true
    }
}

/// The selection singleton owned by the [`World`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    selected: Option<EntityId>,
    locked: bool,
    /// Remaining lock time; `None` while unlocked or locked indefinitely.
    lock_remaining: Option<f32>,
    clicked_this_tick: bool,
}

impl SelectionState {
    /// Creates an empty, unlocked selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected entity, if any.
    #[must_use]
    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    /// Whether the selection is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Remaining time on a timed lock.
    #[must_use]
    pub fn lock_remaining(&self) -> Option<f32> {
        self.lock_remaining
    }

    /// Locks the selection. A `duration` of zero (or less) locks until an
    /// explicit unlock; a positive duration expires on its own.
    pub fn lock(&mut self, duration: f32) {
        self.locked = true;
        self.lock_remaining = (duration > 0.0).then_some(duration);
    }

    /// Releases the lock.
    pub fn unlock(&mut self) {
        self.locked = false;
        self.lock_remaining = None;
    }

    /// Counts down a timed lock by `dt`, releasing it when it runs out.
    pub fn tick_lock(&mut self, dt: f32) {
        if let Some(remaining) = self.lock_remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.unlock();
            }
        }
    }

    /// Whether the pointer press this tick landed on a selectable entity.
    #[must_use]
    pub fn clicked_this_tick(&self) -> bool {
        self.clicked_this_tick
    }
}

/// Makes `id` the selection.
///
/// No-op while locked or when `id` is not selectable. Returns whether the
/// selection changed.
pub fn select(world: &mut World, id: EntityId) -> bool {
    if world.selection.locked {
        debug!(entity = %id, "selection locked; select ignored");
        return false;
    }
    let Some(indicator) = world
        .arena
        .get(id)
        .and_then(Entity::as_selectable)
        .map(|selectable| selectable.indicator())
    else {
        return false;
    };

    clear(world, true);

    if let Some(selectable) = world.arena.get_mut(id).and_then(Entity::as_selectable_mut) {
        selectable.set_selected(true);
    }
    world.selection.selected = Some(id);
    if let Some(indicator) = indicator {
        world.overlay.set_visual_visible(indicator, true);
    }
    notify(world, id, true);
    world.emit(GameEvent::Selected { entity: id });
    debug!(entity = %id, "selected");

    let secs = world.config.selection_lock_secs;
    if secs > 0.0 {
        world.selection.lock(secs);
    }
    true
}

/// Clears the selection.
///
/// No-op while locked unless `force` is set. A forced clear also releases the
/// lock. Returns whether an entity was deselected.
pub fn clear(world: &mut World, force: bool) -> bool {
    if world.selection.locked && !force {
        return false;
    }
    world.selection.unlock();

    let Some(id) = world.selection.selected.take() else {
        return false;
    };
    let indicator = world
        .arena
        .get_mut(id)
        .and_then(Entity::as_selectable_mut)
        .and_then(|selectable| {
            selectable.set_selected(false);
            selectable.indicator()
        });
    if let Some(indicator) = indicator {
        world.overlay.set_visual_visible(indicator, false);
    }
    notify(world, id, false);
    world.emit(GameEvent::Deselected { entity: id });
    debug!(entity = %id, "deselected");
    true
}

/// Pointer-press entry point: deselects `id` if selected, selects it
/// otherwise.
pub fn toggle_on_click(world: &mut World, id: EntityId) {
    world.selection.clicked_this_tick = true;
    if world.selection.selected == Some(id) {
        clear(world, false);
    } else {
        select(world, id);
    }
}

/// Clears the selection when the pointer was pressed somewhere in the world
/// other than on a selectable entity, then resets the per-tick click flag.
pub fn passive_deselect(world: &mut World, input: &InputFrame) {
    let clicked = std::mem::take(&mut world.selection.clicked_this_tick);
    let Some(id) = world.selection.selected else {
        return;
    };
    let deselects = world
        .arena
        .get(id)
        .and_then(Entity::as_selectable)
        .is_some_and(|selectable| selectable.deselects_on_click_away());
    if deselects && !clicked && input.pointer_pressed() && !input.over_ui() {
        clear(world, false);
    }
}

fn notify(world: &mut World, id: EntityId, selected: bool) {
    match world.arena.get(id).map(Entity::tag) {
        Some(EntityTag::Ship) if selected => movement::on_select(world, id),
        Some(EntityTag::Ship) => movement::on_deselect(world, id),
        Some(EntityTag::Planet) if selected => planet::on_select(world, id),
        Some(EntityTag::Planet) => planet::on_deselect(world, id),
        _ => {}
    }
}
