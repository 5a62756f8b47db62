//! Transient floating messages
//!
//! Short-lived text popups (score awards, mostly) anchored at a world
//! pixel position. The board ages them each tick and drops them at zero.

use crate::render::RenderTarget;

pub struct Message {
    text: String,
    px: i32,
    py: i32,
    duration: u32,
}

impl Message {
    /// `duration` is in ticks.
    pub fn new(text: impl Into<String>, px: i32, py: i32, duration: u32) -> Self {
        Message {
            text: text.into(),
            px,
            py,
            duration,
        }
    }

    pub fn age(&mut self) {
        if self.duration > 0 {
            self.duration -= 1;
            // Drift upward as the message ages, like a damage number.
            if self.duration % 4 == 0 {
                self.py -= 1;
            }
        }
    }

    pub fn expired(&self) -> bool {
        self.duration == 0
    }

    pub fn render(&self, target: &mut dyn RenderTarget) {
        target.draw_text(&self.text, self.px, self.py);
    }
}
