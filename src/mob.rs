//! Mobile actors
//!
//! One concrete `Mob` type covers both the human-controlled player and
//! autonomous enemies, distinguished by an explicit `MobRole` instead of
//! downcasting. Mobs hold a sub-tile pixel position; the tile they occupy
//! is derived from their center.
//!
//! Damage is resolved here, during the mob's own update: a mob standing
//! on a flamed cell dies, and the player dies on contact with an enemy.
//! Death runs a short dying animation before the mob marks itself removed
//! and the board reaps it.

use crate::board::{Board, Resolved};
use crate::input::InputState;
use crate::powerup::{PowerKind, Session};
use crate::render::{RenderTarget, SpriteId};
use crate::tile::TILE_SIZE;

pub type MobId = u32;

/// Ticks of dying animation before a mob is reaped.
const DEATH_TICKS: u32 = 40;

/// Enemy movement in pixels per tick; slower than the player's base.
const ENEMY_SPEED: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobRole {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Deterministic turn used by the enemy walk-and-turn policy.
    fn clockwise(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }
}

pub struct Mob {
    pub id: MobId,
    /// Center position in world pixels; sub-tile during motion.
    x: f64,
    y: f64,
    role: MobRole,
    direction: Direction,
    dying: Option<u32>,
    removed: bool,
}

impl Mob {
    /// Spawns a mob centered on tile (tx, ty).
    pub fn new(id: MobId, tx: i32, ty: i32, role: MobRole) -> Self {
        Mob {
            id,
            x: (tx * TILE_SIZE + TILE_SIZE / 2) as f64,
            y: (ty * TILE_SIZE + TILE_SIZE / 2) as f64,
            role,
            direction: Direction::Down,
            dying: None,
            removed: false,
        }
    }

    /// Inert stand-in used while a live mob is temporarily out of the
    /// board's list during its own update. Marked removed so spatial
    /// queries skip it.
    pub fn placeholder() -> Self {
        let mut mob = Mob::new(0, 0, 0, MobRole::Enemy);
        mob.removed = true;
        mob
    }

    pub fn role(&self) -> MobRole {
        self.role
    }

    /// Tile-aligned position, derived from the center.
    pub fn tile(&self) -> (i32, i32) {
        (
            (self.x.floor() as i32).div_euclid(TILE_SIZE),
            (self.y.floor() as i32).div_euclid(TILE_SIZE),
        )
    }

    /// Top-left corner in world pixels, for rendering.
    pub fn pixel_pos(&self) -> (i32, i32) {
        (
            self.x.floor() as i32 - TILE_SIZE / 2,
            self.y.floor() as i32 - TILE_SIZE / 2,
        )
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn is_dying(&self) -> bool {
        self.dying.is_some()
    }

    /// Starts the dying animation. Idempotent while already dying.
    pub fn die(&mut self) {
        if self.dying.is_none() {
            self.dying = Some(DEATH_TICKS);
        }
    }

    /// One tick. The mob was swapped out of the board's list, so `board`
    /// queries see every other mob, bomb, and flame but not this one.
    pub fn update(&mut self, board: &mut Board, session: &mut Session, input: &InputState) {
        if let Some(left) = self.dying {
            if left == 0 {
                self.removed = true;
            } else {
                self.dying = Some(left - 1);
            }
            return;
        }

        let (tx, ty) = self.tile();
        if board.flame_at(tx, ty).is_some() {
            if self.role == MobRole::Enemy {
                let (px, py) = self.pixel_pos();
                board.award_enemy_kill(px, py);
            }
            self.die();
            return;
        }

        match self.role {
            MobRole::Player => self.update_player(board, session, input),
            MobRole::Enemy => self.update_enemy(board),
        }
    }

    fn update_player(&mut self, board: &mut Board, session: &mut Session, input: &InputState) {
        let (tx, ty) = self.tile();

        // Enemy contact is lethal.
        if let Some(other) = board.mob_at(tx, ty, Some(self.id)) {
            if other.role() == MobRole::Enemy && !other.is_dying() {
                self.die();
                return;
            }
        }

        let step = board.base_speed() * session.speed;
        if input.up {
            self.attempt_move(board, Direction::Up, step);
        }
        if input.down {
            self.attempt_move(board, Direction::Down, step);
        }
        if input.left {
            self.attempt_move(board, Direction::Left, step);
        }
        if input.right {
            self.attempt_move(board, Direction::Right, step);
        }

        if input.place_bomb {
            let (tx, ty) = self.tile();
            board.place_bomb(self.id, tx, ty, session);
        }

        // Pick up whatever the cell under us is offering.
        let (tx, ty) = self.tile();
        if let Some(kind) = board.claim_power_at(tx, ty) {
            session.record(tx, ty, board.level());
            let (px, py) = self.pixel_pos();
            board.award_powerup(px, py);
            match kind {
                PowerKind::Life => board.add_lives(1),
                stat => session.apply(stat),
            }
        }

        if board.is_portal_at(tx, ty) {
            board.note_portal();
        }
    }

    fn update_enemy(&mut self, board: &mut Board) {
        if !self.attempt_move(board, self.direction, ENEMY_SPEED) {
            self.direction = self.direction.clockwise();
        }
    }

    /// Moves `dist` pixels toward `dir` if the destination tile admits
    /// this mob. Returns whether the move happened.
    fn attempt_move(&mut self, board: &Board, dir: Direction, dist: f64) -> bool {
        self.direction = dir;
        let (dx, dy) = dir.delta();
        let nx = self.x + dx as f64 * dist;
        let ny = self.y + dy as f64 * dist;

        let target = (
            (nx.floor() as i32).div_euclid(TILE_SIZE),
            (ny.floor() as i32).div_euclid(TILE_SIZE),
        );
        if target == self.tile() || self.can_enter(board, target.0, target.1) {
            self.x = nx;
            self.y = ny;
            true
        } else {
            false
        }
    }

    /// Movement admission check against the board's priority resolution.
    ///
    /// Flames never block (walking into one is allowed, and fatal); a
    /// bomb's cell stays passable only for a mob still standing on it;
    /// mobs never block each other; everything else asks the grid cell.
    pub fn can_enter(&self, board: &Board, tx: i32, ty: i32) -> bool {
        if !board.in_bounds(tx, ty) {
            return false;
        }
        match board.resolve(tx, ty, Some(self.id)) {
            Resolved::Flame(_) => true,
            Resolved::Bomb(bomb) => bomb.tile() == self.tile(),
            Resolved::Mob(_) => true,
            Resolved::Cell(entity) => !entity.collide(self),
        }
    }

    fn sprite(&self) -> SpriteId {
        match (self.role, self.is_dying()) {
            (MobRole::Player, false) => SpriteId::Player,
            (MobRole::Player, true) => SpriteId::PlayerDying,
            (MobRole::Enemy, false) => SpriteId::Enemy,
            (MobRole::Enemy, true) => SpriteId::EnemyDying,
        }
    }

    pub fn render(&self, target: &mut dyn RenderTarget) {
        let (px, py) = self.pixel_pos();
        target.draw_sprite(self.sprite(), px, py);
    }
}
