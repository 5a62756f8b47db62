//! Tile variants and the grid container
//!
//! Three static tiles (floor, wall, portal), the destroyable brick with
//! its break animation, and `Grid`, the flat `x + y * width` cell array
//! the board owns. Grid cells always hold exactly one top-level entity;
//! destructible terrain over hidden pickups is a `LayerStack` cell.

use crate::entity::{BlastResponse, Entity};
use crate::mob::Mob;
use crate::render::{RenderTarget, SpriteId};

/// Tile edge length in world pixels.
pub const TILE_SIZE: i32 = 16;

/// Walkable ground. Permanent bottom layer of every stack; never removed.
pub struct Floor {
    x: i32,
    y: i32,
}

impl Floor {
    pub fn new(x: i32, y: i32) -> Self {
        Floor { x, y }
    }
}

impl Entity for Floor {
    fn tile(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn sprite(&self) -> SpriteId {
        SpriteId::Floor
    }

    fn update(&mut self) {}

    fn render(&self, target: &mut dyn RenderTarget) {
        target.draw_sprite(self.sprite(), self.x * TILE_SIZE, self.y * TILE_SIZE);
    }

    fn collide(&self, _other: &Mob) -> bool {
        false
    }

    fn is_removed(&self) -> bool {
        false
    }

    fn mark_removed(&mut self) {
        // Floors are the permanent bottom layer; removal is never valid.
    }
}

/// Indestructible wall. Blocks movement and absorbs blasts without burning.
pub struct Wall {
    x: i32,
    y: i32,
}

impl Wall {
    pub fn new(x: i32, y: i32) -> Self {
        Wall { x, y }
    }
}

impl Entity for Wall {
    fn tile(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn sprite(&self) -> SpriteId {
        SpriteId::Wall
    }

    fn update(&mut self) {}

    fn render(&self, target: &mut dyn RenderTarget) {
        target.draw_sprite(self.sprite(), self.x * TILE_SIZE, self.y * TILE_SIZE);
    }

    fn collide(&self, _other: &Mob) -> bool {
        true
    }

    fn is_removed(&self) -> bool {
        false
    }

    fn mark_removed(&mut self) {}

    fn blast(&mut self) -> BlastResponse {
        BlastResponse::Blocked
    }
}

/// Exit revealed under a brick. Walkable; the lifecycle decides whether
/// standing here actually advances the level.
pub struct Portal {
    x: i32,
    y: i32,
}

impl Portal {
    pub fn new(x: i32, y: i32) -> Self {
        Portal { x, y }
    }
}

impl Entity for Portal {
    fn tile(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn sprite(&self) -> SpriteId {
        SpriteId::Portal
    }

    fn update(&mut self) {}

    fn render(&self, target: &mut dyn RenderTarget) {
        target.draw_sprite(self.sprite(), self.x * TILE_SIZE, self.y * TILE_SIZE);
    }

    fn collide(&self, _other: &Mob) -> bool {
        false
    }

    fn is_removed(&self) -> bool {
        false
    }

    fn mark_removed(&mut self) {}

    fn is_portal(&self) -> bool {
        true
    }
}

/// Destroyable brick.
///
/// A blast starts the burn countdown; while burning the brick still blocks
/// movement and renders the cached below-layer sprite behind its break
/// frames, then marks itself removed so the owning stack pops it.
pub struct Brick {
    x: i32,
    y: i32,
    below: Option<SpriteId>,
    burning: Option<u32>,
    burn_ticks: u32,
    removed: bool,
}

impl Brick {
    pub fn new(x: i32, y: i32, burn_ticks: u32) -> Self {
        Brick {
            x,
            y,
            below: None,
            burning: None,
            burn_ticks,
            removed: false,
        }
    }

    pub fn is_burning(&self) -> bool {
        self.burning.is_some()
    }
}

impl Entity for Brick {
    fn tile(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn sprite(&self) -> SpriteId {
        if self.burning.is_some() {
            SpriteId::BrickBreaking
        } else {
            SpriteId::Brick
        }
    }

    fn update(&mut self) {
        if let Some(left) = self.burning {
            if left == 0 {
                self.mark_removed();
            } else {
                self.burning = Some(left - 1);
            }
        }
    }

    fn render(&self, target: &mut dyn RenderTarget) {
        let px = self.x * TILE_SIZE;
        let py = self.y * TILE_SIZE;
        if self.burning.is_some() {
            if let Some(below) = self.below {
                target.draw_sprite(below, px, py);
            }
        }
        target.draw_sprite(self.sprite(), px, py);
    }

    fn collide(&self, _other: &Mob) -> bool {
        true
    }

    fn is_removed(&self) -> bool {
        self.removed
    }

    fn mark_removed(&mut self) {
        self.removed = true;
    }

    fn blast(&mut self) -> BlastResponse {
        if self.burning.is_none() {
            self.burning = Some(self.burn_ticks);
        }
        BlastResponse::Destroyed
    }

    fn set_below_sprite(&mut self, sprite: SpriteId) {
        self.below = Some(sprite);
    }
}

/// The board's cell array, indexed `x + y * width`.
///
/// Out-of-bounds access through `cell`/`cell_mut`/`place` is a programmer
/// error and panics; movement and propagation code check `in_bounds`
/// first.
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Box<dyn Entity>>,
}

impl Grid {
    /// An all-floor grid. Level construction replaces cells via `place`.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width >= 0 && height >= 0, "negative grid dimensions");
        let mut cells: Vec<Box<dyn Entity>> = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Box::new(Floor::new(x, y)));
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        assert!(self.in_bounds(x, y), "grid access out of bounds: ({}, {})", x, y);
        (x + y * self.width) as usize
    }

    /// Replaces the whole cell at (x, y).
    pub fn place(&mut self, x: i32, y: i32, entity: Box<dyn Entity>) {
        let i = self.index(x, y);
        self.cells[i] = entity;
    }

    pub fn cell(&self, x: i32, y: i32) -> &dyn Entity {
        self.cells[self.index(x, y)].as_ref()
    }

    pub fn cell_mut(&mut self, x: i32, y: i32) -> &mut dyn Entity {
        let i = self.index(x, y);
        self.cells[i].as_mut()
    }

    /// Ticks every cell once, in row-major order.
    pub fn update_all(&mut self) {
        for cell in &mut self.cells {
            cell.update();
        }
    }
}
