//! The entity contract
//!
//! Everything that occupies a grid cell implements `Entity`: plain tiles,
//! destroyable bricks, revealed power-ups, portals, and the layered stack
//! that composes them. The board drives all of them through this trait,
//! one `update` per tick, one `render` per visible cell, and `collide`
//! as a pure passability predicate during movement resolution.
//!
//! The blast/power/portal hooks have no-op defaults so that only the
//! variants which care (bricks, power-ups, portals) override them.

use crate::mob::Mob;
use crate::powerup::PowerKind;
use crate::render::{RenderTarget, SpriteId};

/// What a cell does to a flame front stepping into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlastResponse {
    /// Flame passes through and keeps propagating.
    Pass,
    /// Indestructible; propagation stops short, no flame segment here.
    Blocked,
    /// Destroyable; this cell burns, gets a flame segment, and absorbs
    /// the rest of the blast in this direction.
    Destroyed,
}

/// A unit occupying one grid cell.
pub trait Entity {
    /// Grid coordinates of the cell this entity sits on.
    fn tile(&self) -> (i32, i32);

    /// Current visual reference, opaque to the simulation.
    fn sprite(&self) -> SpriteId;

    /// Advances one tick of internal state. Called exactly once per tick
    /// by the board while the round is running.
    fn update(&mut self);

    /// Draws the current visual state. Must not mutate game state.
    fn render(&self, target: &mut dyn RenderTarget);

    /// Pure predicate: does this cell stop `other` from entering?
    fn collide(&self, other: &Mob) -> bool;

    /// True once this entity is dead and waiting to be reaped (or, for a
    /// stacked entity, popped).
    fn is_removed(&self) -> bool;

    /// Flags this entity for removal by its owner.
    fn mark_removed(&mut self);

    /// Reaction to a flame front. Defaults to letting it through.
    fn blast(&mut self) -> BlastResponse {
        BlastResponse::Pass
    }

    /// Hands over the power-up held at this cell, at most once.
    fn claim_power(&mut self) -> Option<PowerKind> {
        None
    }

    /// True for a revealed exit portal.
    fn is_portal(&self) -> bool {
        false
    }

    /// Caches the visual of the layer directly beneath, so a destroyable
    /// tile can render the reveal during its break animation. No-op for
    /// everything else.
    fn set_below_sprite(&mut self, _sprite: SpriteId) {}
}
