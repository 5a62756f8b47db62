//! Render seam between the simulation and the screen
//!
//! The core never touches SDL2 directly when drawing. Entities issue draw
//! requests against the `RenderTarget` trait, which exposes the viewport
//! size and the world-to-screen offset the board needs to compute its
//! visible tile window. `CanvasTarget` is the SDL2-backed implementation;
//! tests use a recording double instead.
//!
//! Sprites are flat-colored tiles, so the game is fully playable without
//! any image assets.

use crate::text::draw_simple_text;
use crate::tile::TILE_SIZE;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;

/// Opaque visual reference carried by entities.
///
/// The simulation only ever names what something looks like; turning that
/// name into pixels is the target's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteId {
    Floor,
    Wall,
    Brick,
    BrickBreaking,
    Portal,
    PowerBombs,
    PowerFlames,
    PowerSpeed,
    PowerLife,
    Bomb,
    Flame,
    Player,
    PlayerDying,
    Enemy,
    EnemyDying,
}

/// Draw-request sink plus viewport geometry.
///
/// Coordinates handed to the draw methods are world pixels; the target
/// applies its own offset. `offset()` and `size()` exist so the board can
/// clamp rendering to the visible tile window instead of walking the whole
/// grid.
pub trait RenderTarget {
    /// Viewport size in pixels.
    fn size(&self) -> (u32, u32);

    /// World-to-screen offset in pixels (the camera position).
    fn offset(&self) -> (i32, i32);

    /// Draws one tile-sized sprite with its top-left at world pixel (px, py).
    fn draw_sprite(&mut self, sprite: SpriteId, px: i32, py: i32);

    /// Draws text with its top-left at world pixel (px, py).
    fn draw_text(&mut self, text: &str, px: i32, py: i32);
}

/// SDL2 canvas implementation of `RenderTarget`.
///
/// Canvas errors are latched instead of propagated through every entity's
/// render call; the shell checks `finish()` once per frame.
pub struct CanvasTarget<'a> {
    canvas: &'a mut Canvas<Window>,
    offset: (i32, i32),
    size: (u32, u32),
    error: Option<String>,
}

impl<'a> CanvasTarget<'a> {
    pub fn new(canvas: &'a mut Canvas<Window>, offset: (i32, i32), size: (u32, u32)) -> Self {
        CanvasTarget {
            canvas,
            offset,
            size,
            error: None,
        }
    }

    /// Returns the first draw error of the frame, if any.
    pub fn finish(self) -> Result<(), String> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fill(&mut self, color: Color, rect: Rect) {
        if self.error.is_some() {
            return;
        }
        self.canvas.set_draw_color(color);
        if let Err(e) = self.canvas.fill_rect(rect) {
            self.error = Some(e);
        }
    }

    fn sprite_color(sprite: SpriteId) -> Color {
        match sprite {
            SpriteId::Floor => Color::RGB(28, 120, 32),
            SpriteId::Wall => Color::RGB(96, 96, 104),
            SpriteId::Brick => Color::RGB(168, 92, 40),
            SpriteId::BrickBreaking => Color::RGB(220, 150, 60),
            SpriteId::Portal => Color::RGB(60, 40, 160),
            SpriteId::PowerBombs => Color::RGB(40, 40, 40),
            SpriteId::PowerFlames => Color::RGB(230, 120, 20),
            SpriteId::PowerSpeed => Color::RGB(70, 180, 230),
            SpriteId::PowerLife => Color::RGB(230, 60, 140),
            SpriteId::Bomb => Color::RGB(20, 20, 24),
            SpriteId::Flame => Color::RGB(250, 200, 40),
            SpriteId::Player => Color::RGB(240, 240, 240),
            SpriteId::PlayerDying => Color::RGB(160, 160, 160),
            SpriteId::Enemy => Color::RGB(190, 30, 30),
            SpriteId::EnemyDying => Color::RGB(110, 30, 30),
        }
    }
}

impl RenderTarget for CanvasTarget<'_> {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn offset(&self) -> (i32, i32) {
        self.offset
    }

    fn draw_sprite(&mut self, sprite: SpriteId, px: i32, py: i32) {
        let (ox, oy) = self.offset;
        // Bombs and pickups sit inside the tile so the floor reads through.
        let inset = match sprite {
            SpriteId::Bomb
            | SpriteId::PowerBombs
            | SpriteId::PowerFlames
            | SpriteId::PowerSpeed
            | SpriteId::PowerLife => 2,
            _ => 0,
        };
        let side = (TILE_SIZE - 2 * inset) as u32;
        let rect = Rect::new(px - ox + inset, py - oy + inset, side, side);
        self.fill(Self::sprite_color(sprite), rect);
    }

    fn draw_text(&mut self, text: &str, px: i32, py: i32) {
        if self.error.is_some() {
            return;
        }
        let (ox, oy) = self.offset;
        if let Err(e) = draw_simple_text(
            self.canvas,
            text,
            px - ox,
            py - oy,
            Color::RGB(255, 255, 255),
            1,
        ) {
            self.error = Some(e);
        }
    }
}

/// Test double that records every draw request.
///
/// Available crate-wide in test builds so board and game tests can assert
/// on what the render pass actually emitted.
#[cfg(test)]
pub struct RecordingTarget {
    pub view_size: (u32, u32),
    pub view_offset: (i32, i32),
    pub sprites: Vec<(SpriteId, i32, i32)>,
    pub texts: Vec<(String, i32, i32)>,
}

#[cfg(test)]
impl RecordingTarget {
    pub fn new(size: (u32, u32), offset: (i32, i32)) -> Self {
        RecordingTarget {
            view_size: size,
            view_offset: offset,
            sprites: Vec::new(),
            texts: Vec::new(),
        }
    }

    /// Tiles (in tile coordinates) that received at least one sprite draw.
    pub fn drawn_tiles(&self) -> Vec<(i32, i32)> {
        self.sprites
            .iter()
            .map(|(_, px, py)| (px.div_euclid(TILE_SIZE), py.div_euclid(TILE_SIZE)))
            .collect()
    }
}

#[cfg(test)]
impl RenderTarget for RecordingTarget {
    fn size(&self) -> (u32, u32) {
        self.view_size
    }

    fn offset(&self) -> (i32, i32) {
        self.view_offset
    }

    fn draw_sprite(&mut self, sprite: SpriteId, px: i32, py: i32) {
        self.sprites.push((sprite, px, py));
    }

    fn draw_text(&mut self, text: &str, px: i32, py: i32) {
        self.texts.push((text.to_string(), px, py));
    }
}
