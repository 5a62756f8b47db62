//! Power-ups and the per-session pickup record
//!
//! A `PowerUp` is a grid entity tied to the level it was placed in.
//! Collecting one applies a lasting modifier for the rest of the game
//! session and records the `(x, y, level)` triple in the `Session`, so
//! reloading or restarting that level never respawns it. `new_game`
//! clears the record.
//!
//! The session is an explicit object owned by the lifecycle controller
//! and threaded through the board tick; nothing here is process-global.

use crate::config::GameConfig;
use crate::entity::Entity;
use crate::mob::Mob;
use crate::render::{RenderTarget, SpriteId};
use crate::tile::TILE_SIZE;
use std::collections::HashSet;

/// The lasting effect a pickup grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerKind {
    /// One more simultaneously live bomb.
    Bombs,
    /// One more tile of blast radius.
    Flames,
    /// Faster movement.
    Speed,
    /// One extra life (applied by the board, not the session).
    Life,
}

impl PowerKind {
    pub fn sprite(self) -> SpriteId {
        match self {
            PowerKind::Bombs => SpriteId::PowerBombs,
            PowerKind::Flames => SpriteId::PowerFlames,
            PowerKind::Speed => SpriteId::PowerSpeed,
            PowerKind::Life => SpriteId::PowerLife,
        }
    }
}

/// A pickup sitting on (or hidden inside) a grid cell.
pub struct PowerUp {
    x: i32,
    y: i32,
    level: usize,
    kind: PowerKind,
    removed: bool,
}

impl PowerUp {
    pub fn new(x: i32, y: i32, level: usize, kind: PowerKind) -> Self {
        PowerUp {
            x,
            y,
            level,
            kind,
            removed: false,
        }
    }

}

impl Entity for PowerUp {
    fn tile(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn sprite(&self) -> SpriteId {
        self.kind.sprite()
    }

    fn update(&mut self) {}

    fn render(&self, target: &mut dyn RenderTarget) {
        target.draw_sprite(self.sprite(), self.x * TILE_SIZE, self.y * TILE_SIZE);
    }

    fn collide(&self, _other: &Mob) -> bool {
        false
    }

    fn is_removed(&self) -> bool {
        self.removed
    }

    fn mark_removed(&mut self) {
        self.removed = true;
    }

    fn claim_power(&mut self) -> Option<PowerKind> {
        if self.removed {
            None
        } else {
            self.removed = true;
            Some(self.kind)
        }
    }
}

/// Game-session state that outlives individual boards.
///
/// Holds the collected-pickup record and the player's accumulated
/// modifiers. Survives `restart()` and `change_level()`; reset only by
/// `new_game()`.
pub struct Session {
    collected: HashSet<(i32, i32, usize)>,
    /// Movement speed multiplier, starts at 1.0.
    pub speed: f64,
    /// Blast radius in tiles.
    pub bomb_radius: u32,
    /// Simultaneous live bombs allowed per mob.
    pub bomb_rate: u32,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        Session {
            collected: HashSet::new(),
            speed: 1.0,
            bomb_radius: config.bomb_radius,
            bomb_rate: config.bomb_rate,
        }
    }

    /// Back to a fresh session: no collected pickups, base modifiers.
    pub fn reset(&mut self, config: &GameConfig) {
        self.collected.clear();
        self.speed = 1.0;
        self.bomb_radius = config.bomb_radius;
        self.bomb_rate = config.bomb_rate;
    }

    pub fn is_collected(&self, x: i32, y: i32, level: usize) -> bool {
        self.collected.contains(&(x, y, level))
    }

    pub fn record(&mut self, x: i32, y: i32, level: usize) {
        self.collected.insert((x, y, level));
    }

    /// Applies a stat-modifying pickup. `Life` is handled by the board
    /// because lives are a round counter, not a session modifier.
    pub fn apply(&mut self, kind: PowerKind) {
        match kind {
            PowerKind::Bombs => self.bomb_rate += 1,
            PowerKind::Flames => self.bomb_radius += 1,
            PowerKind::Speed => self.speed += 0.25,
            PowerKind::Life => {}
        }
    }
}
