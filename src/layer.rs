//! Layered cell stacks
//!
//! A `LayerStack` composes several entities at one grid cell, bottom to
//! top, and exposes only the top as live: update, render, collision,
//! blasts, and pickups all go to the current top. When the top marks
//! itself removed during its own update, the stack pops it before
//! returning, so the revealed layer becomes live on the next tick.
//!
//! This is how a destructible wall hides a power-up or a portal: the cell
//! is `[floor, power-up, brick]`, and burning away the brick exposes the
//! pickup without ever swapping the grid cell itself.
//!
//! Callers must guarantee at least one permanent layer (the floor) at the
//! bottom; a stack never pops its last entity.

use crate::entity::{BlastResponse, Entity};
use crate::mob::Mob;
use crate::powerup::PowerKind;
use crate::render::{RenderTarget, SpriteId};

pub struct LayerStack {
    x: i32,
    y: i32,
    /// Bottom-to-top; the last element is live.
    entities: Vec<Box<dyn Entity>>,
}

impl LayerStack {
    /// Builds a stack from bottom to top, wiring each destroyable layer
    /// with the sprite of the layer directly beneath it so the reveal can
    /// be rendered during the break animation.
    ///
    /// Panics if `entities` is empty: an empty stack is not a valid grid
    /// cell.
    pub fn new(x: i32, y: i32, mut entities: Vec<Box<dyn Entity>>) -> Self {
        assert!(!entities.is_empty(), "layer stack needs at least one entity");
        for i in 1..entities.len() {
            let below = entities[i - 1].sprite();
            entities[i].set_below_sprite(below);
        }
        LayerStack { x, y, entities }
    }

    pub fn depth(&self) -> usize {
        self.entities.len()
    }

    fn top(&self) -> &dyn Entity {
        self.entities
            .last()
            .expect("layer stack invariant: never empty")
            .as_ref()
    }

    fn top_mut(&mut self) -> &mut dyn Entity {
        self.entities
            .last_mut()
            .expect("layer stack invariant: never empty")
            .as_mut()
    }

    /// Inserts an entity just below the current top, so it becomes live
    /// once the top is destroyed. With fewer than two layers there is no
    /// "below top" slot; the entity goes to the bottom instead.
    ///
    /// The layer above the insertion point is rewired to reveal the new
    /// entity's sprite during its break animation.
    pub fn insert_below_top(&mut self, entity: Box<dyn Entity>) {
        let len = self.entities.len();
        let at = if len < 2 { 0 } else { len - 1 };
        self.entities.insert(at, entity);

        let below = self.entities[at].sprite();
        self.entities[at + 1].set_below_sprite(below);
    }
}

impl Entity for LayerStack {
    fn tile(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn sprite(&self) -> SpriteId {
        self.top().sprite()
    }

    fn update(&mut self) {
        self.top_mut().update();
        if self.top().is_removed() && self.entities.len() > 1 {
            self.entities.pop();
        }
    }

    fn render(&self, target: &mut dyn RenderTarget) {
        self.top().render(target);
    }

    fn collide(&self, other: &Mob) -> bool {
        self.top().collide(other)
    }

    fn is_removed(&self) -> bool {
        // The stack itself is a permanent grid cell.
        false
    }

    fn mark_removed(&mut self) {
        self.top_mut().mark_removed();
    }

    fn blast(&mut self) -> BlastResponse {
        self.top_mut().blast()
    }

    fn claim_power(&mut self) -> Option<PowerKind> {
        self.top_mut().claim_power()
    }

    fn is_portal(&self) -> bool {
        self.top().is_portal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powerup::PowerUp;
    use crate::tile::{Brick, Floor, Portal};

    fn brick_over_floor(x: i32, y: i32) -> LayerStack {
        LayerStack::new(
            x,
            y,
            vec![Box::new(Floor::new(x, y)), Box::new(Brick::new(x, y, 0))],
        )
    }

    #[test]
    fn top_is_live_until_popped() {
        let mut stack = LayerStack::new(
            1,
            1,
            vec![
                Box::new(Floor::new(1, 1)),
                Box::new(PowerUp::new(1, 1, 1, PowerKind::Flames)),
                Box::new(Brick::new(1, 1, 0)),
            ],
        );
        assert_eq!(stack.sprite(), SpriteId::Brick);
        assert_eq!(stack.depth(), 3);

        // The hidden power-up cannot be claimed through the brick.
        assert_eq!(stack.claim_power(), None);

        stack.mark_removed();
        stack.update();
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.sprite(), SpriteId::PowerFlames);
        assert_eq!(stack.claim_power(), Some(PowerKind::Flames));
    }

    #[test]
    fn pop_order_is_deterministic_bottom_to_top() {
        // Popping N marked tops one at a time lands on the same final live
        // entity regardless of how the removals are interleaved with
        // updates.
        let mut stack = LayerStack::new(
            0,
            0,
            vec![
                Box::new(Floor::new(0, 0)),
                Box::new(Portal::new(0, 0)),
                Box::new(Brick::new(0, 0, 0)),
            ],
        );
        stack.mark_removed();
        stack.update();
        assert!(stack.is_portal());
        stack.update();
        stack.update();
        // Portals are permanent; nothing further pops.
        assert!(stack.is_portal());
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn insert_below_top_hides_the_new_layer() {
        let mut stack = brick_over_floor(0, 0);
        stack.insert_below_top(Box::new(Portal::new(0, 0)));
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.sprite(), SpriteId::Brick);
        stack.mark_removed();
        stack.update();
        assert!(stack.is_portal());
    }

    #[test]
    fn insert_below_top_on_single_layer_falls_back_to_bottom() {
        let mut stack = LayerStack::new(0, 0, vec![Box::new(Brick::new(0, 0, 0))]);
        stack.insert_below_top(Box::new(Floor::new(0, 0)));
        assert_eq!(stack.depth(), 2);
        // The brick is still on top.
        assert_eq!(stack.sprite(), SpriteId::Brick);
    }

    #[test]
    fn reveal_is_live_next_tick_not_mid_call() {
        // A brick with a zero-tick burn removes itself during update; the
        // same update call pops it, but the revealed floor was not updated
        // in that call.
        let mut stack = brick_over_floor(2, 2);
        stack.mark_removed();
        assert_eq!(stack.sprite(), SpriteId::Brick);
        stack.update();
        assert_eq!(stack.sprite(), SpriteId::Floor);
    }

    #[test]
    fn never_pops_the_last_entity() {
        let mut stack = LayerStack::new(3, 3, vec![Box::new(Brick::new(3, 3, 0))]);
        stack.mark_removed();
        stack.update();
        stack.update();
        assert_eq!(stack.depth(), 1);
    }

}
