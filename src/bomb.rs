//! Bombs and flame propagation
//!
//! A bomb is placed on a tile with a fixed fuse. It detonates when the
//! fuse runs out, or early when another bomb's flame reaches its cell
//! (chain reaction — the board forces the fuse to zero in a pre-pass).
//!
//! Detonation walks the four grid-axis directions outward up to the blast
//! radius. Each stepped cell answers through `Entity::blast`:
//!
//! - `Blocked` (indestructible wall): propagation stops short, no flame
//!   segment on that cell.
//! - `Destroyed` (destroyable brick): the cell gets a flame segment, the
//!   brick starts burning, and the blast is absorbed — propagation stops
//!   there, segment inclusive.
//! - `Pass`: flame segment, keep stepping.
//!
//! Propagation clamps at the grid edge and never wraps. Flame segments
//! from different bombs coexist on the same cell, each aging on its own
//! bomb's clock. Once a detonated bomb's last segment expires the bomb
//! reports itself removed and the board reaps it.
//!
//! Damage is pull-based: mobs query `Board::flame_at` during their own
//! update; flames never push effects outward.

use crate::entity::BlastResponse;
use crate::mob::MobId;
use crate::render::{RenderTarget, SpriteId};
use crate::tile::{Grid, TILE_SIZE};

const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// One burning cell produced by a detonation.
pub struct FlameSegment {
    x: i32,
    y: i32,
    life: u32,
}

impl FlameSegment {
    fn new(x: i32, y: i32, life: u32) -> Self {
        FlameSegment { x, y, life }
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn tick(&mut self) {
        self.life = self.life.saturating_sub(1);
    }

    fn expired(&self) -> bool {
        self.life == 0
    }

    pub fn render(&self, target: &mut dyn RenderTarget) {
        target.draw_sprite(SpriteId::Flame, self.x * TILE_SIZE, self.y * TILE_SIZE);
    }
}

pub struct Bomb {
    x: i32,
    y: i32,
    fuse: u32,
    radius: u32,
    flame_life: u32,
    owner: MobId,
    flames: Vec<FlameSegment>,
    detonated: bool,
    removed: bool,
}

impl Bomb {
    pub fn new(x: i32, y: i32, fuse: u32, radius: u32, flame_life: u32, owner: MobId) -> Self {
        Bomb {
            x,
            y,
            fuse,
            radius,
            flame_life,
            owner,
            flames: Vec::new(),
            detonated: false,
            removed: false,
        }
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn owner(&self) -> MobId {
        self.owner
    }

    pub fn has_detonated(&self) -> bool {
        self.detonated
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Chain trigger: collapses the remaining fuse so the bomb detonates
    /// on its next update. Idempotent once detonated.
    pub fn force_detonate(&mut self) {
        if !self.detonated {
            self.fuse = 0;
        }
    }

    /// This bomb's flame segment at (x, y), if one is live there.
    pub fn flame_at(&self, x: i32, y: i32) -> Option<&FlameSegment> {
        self.flames.iter().find(|f| f.x == x && f.y == y)
    }

    /// One tick: burn the fuse (detonating at zero), age the flames, and
    /// report removal once everything has burned out.
    pub fn update(&mut self, grid: &mut Grid) {
        if !self.detonated {
            if self.fuse == 0 {
                self.detonate(grid);
            } else {
                self.fuse -= 1;
            }
        }

        for flame in &mut self.flames {
            flame.tick();
        }
        self.flames.retain(|f| !f.expired());

        if self.detonated && self.flames.is_empty() {
            self.removed = true;
        }
    }

    fn detonate(&mut self, grid: &mut Grid) {
        // Guard makes a second trigger (own fuse plus someone else's
        // flame on this cell) a no-op instead of a double spawn.
        if self.detonated {
            return;
        }
        self.detonated = true;

        self.flames
            .push(FlameSegment::new(self.x, self.y, self.flame_life));

        for (dx, dy) in DIRECTIONS {
            for step in 1..=self.radius as i32 {
                let tx = self.x + dx * step;
                let ty = self.y + dy * step;
                if !grid.in_bounds(tx, ty) {
                    break;
                }
                match grid.cell_mut(tx, ty).blast() {
                    BlastResponse::Blocked => break,
                    BlastResponse::Destroyed => {
                        self.flames
                            .push(FlameSegment::new(tx, ty, self.flame_life));
                        break;
                    }
                    BlastResponse::Pass => {
                        self.flames
                            .push(FlameSegment::new(tx, ty, self.flame_life));
                    }
                }
            }
        }
    }

    pub fn render(&self, target: &mut dyn RenderTarget) {
        if !self.detonated {
            target.draw_sprite(SpriteId::Bomb, self.x * TILE_SIZE, self.y * TILE_SIZE);
        }
        for flame in &self.flames {
            flame.render(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Brick, Wall};

    fn open_grid(size: i32) -> Grid {
        Grid::new(size, size)
    }

    fn flame_tiles(bomb: &Bomb) -> Vec<(i32, i32)> {
        let mut tiles: Vec<_> = bomb.flames.iter().map(|f| f.tile()).collect();
        tiles.sort();
        tiles
    }

    #[test]
    fn detonation_covers_origin_plus_radius_on_each_axis() {
        let mut grid = open_grid(9);
        let mut bomb = Bomb::new(4, 4, 0, 2, 10, 1);
        bomb.update(&mut grid);

        assert!(bomb.has_detonated());
        let tiles = flame_tiles(&bomb);
        assert_eq!(tiles.len(), 9);
        for (tx, ty) in tiles {
            let reach = (tx - 4).abs() + (ty - 4).abs();
            assert!(reach <= 2, "flame beyond radius at ({}, {})", tx, ty);
            assert!(tx == 4 || ty == 4, "flame off-axis at ({}, {})", tx, ty);
        }
    }

    #[test]
    fn wall_stops_propagation_without_a_segment() {
        let mut grid = open_grid(9);
        grid.place(5, 4, Box::new(Wall::new(5, 4)));
        let mut bomb = Bomb::new(4, 4, 0, 3, 10, 1);
        bomb.update(&mut grid);

        assert!(bomb.flame_at(5, 4).is_none());
        assert!(bomb.flame_at(6, 4).is_none());
        // Other directions are unaffected.
        assert!(bomb.flame_at(4, 1).is_some());
        assert!(bomb.flame_at(1, 4).is_some());
    }

    #[test]
    fn brick_absorbs_the_blast_segment_inclusive() {
        let mut grid = open_grid(9);
        grid.place(4, 5, Box::new(Brick::new(4, 5, 5)));
        let mut bomb = Bomb::new(4, 4, 0, 3, 10, 1);
        bomb.update(&mut grid);

        assert!(bomb.flame_at(4, 5).is_some());
        assert!(bomb.flame_at(4, 6).is_none());
    }

    #[test]
    fn propagation_clamps_at_the_grid_edge() {
        let mut grid = open_grid(5);
        let mut bomb = Bomb::new(0, 0, 0, 4, 10, 1);
        bomb.update(&mut grid);

        for flame in &bomb.flames {
            let (tx, ty) = flame.tile();
            assert!(grid.in_bounds(tx, ty), "flame out of bounds at ({}, {})", tx, ty);
        }
        // Only right and down exist from the corner: origin + 4 + 4.
        assert_eq!(bomb.flames.len(), 9);
    }

    #[test]
    fn fuse_counts_down_before_detonating() {
        let mut grid = open_grid(5);
        let mut bomb = Bomb::new(2, 2, 3, 1, 10, 1);
        for _ in 0..3 {
            bomb.update(&mut grid);
            assert!(!bomb.has_detonated());
        }
        bomb.update(&mut grid);
        assert!(bomb.has_detonated());
    }

    #[test]
    fn force_detonate_collapses_the_fuse() {
        let mut grid = open_grid(5);
        let mut bomb = Bomb::new(2, 2, 500, 1, 10, 1);
        bomb.force_detonate();
        bomb.update(&mut grid);
        assert!(bomb.has_detonated());
    }

    #[test]
    fn force_detonate_after_detonation_does_not_respawn_flames() {
        let mut grid = open_grid(5);
        let mut bomb = Bomb::new(2, 2, 0, 1, 10, 1);
        bomb.update(&mut grid);
        let count = bomb.flames.len();
        bomb.force_detonate();
        bomb.update(&mut grid);
        // One tick of aging, no new segments.
        assert_eq!(bomb.flames.len(), count);
    }

    #[test]
    fn bomb_is_removed_when_the_last_flame_expires() {
        let mut grid = open_grid(5);
        let mut bomb = Bomb::new(2, 2, 0, 1, 3, 1);
        bomb.update(&mut grid); // detonates, flames at life 3 -> tick to 2
        assert!(!bomb.is_removed());
        bomb.update(&mut grid); // 1
        bomb.update(&mut grid); // 0 -> retained out
        assert!(bomb.is_removed());
    }
}
