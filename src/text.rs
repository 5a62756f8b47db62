//! Procedural bitmap text
//!
//! A tiny 3x5 pixel font drawn with SDL2 rectangles, used for the HUD,
//! floating score messages, and overlay screens. No font assets required.

use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;

/// 3x5 glyphs, one row per byte, bit 2 is the left column.
const GLYPHS: &[(char, [u8; 5])] = &[
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    ('K', [0b101, 0b110, 0b100, 0b110, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    ('O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b010, 0b101, 0b101, 0b011, 0b001]),
    ('R', [0b110, 0b101, 0b110, 0b110, 0b101]),
    ('S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b011, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b001, 0b001, 0b001]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    ('+', [0b000, 0b010, 0b111, 0b010, 0b000]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('!', [0b010, 0b010, 0b010, 0b000, 0b010]),
];

fn glyph_for(c: char) -> Option<&'static [u8; 5]> {
    let upper = c.to_ascii_uppercase();
    GLYPHS
        .iter()
        .find(|(g, _)| *g == upper)
        .map(|(_, rows)| rows)
}

/// Width of one rendered character cell in pixels, including spacing.
pub fn char_width(scale: u32) -> i32 {
    (4 * scale) as i32
}

/// Renders `text` with its top-left corner at (x, y).
///
/// Unknown characters (and spaces) advance the cursor without drawing.
/// Returns the first canvas error, if any.
pub fn draw_simple_text(
    canvas: &mut Canvas<Window>,
    text: &str,
    x: i32,
    y: i32,
    color: Color,
    scale: u32,
) -> Result<(), String> {
    canvas.set_draw_color(color);
    let pixel = scale as i32;

    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph_for(c) else {
            continue;
        };
        let char_x = x + i as i32 * char_width(scale);

        for (row, bits) in rows.iter().enumerate() {
            for col in 0..3 {
                if bits & (0b100 >> col) != 0 {
                    let rect = Rect::new(
                        char_x + col * pixel,
                        y + row as i32 * pixel,
                        scale,
                        scale,
                    );
                    canvas.fill_rect(rect).map_err(|e| e.to_string())?;
                }
            }
        }
    }

    Ok(())
}

/// Pixel width of a rendered string, for centering overlay captions.
pub fn text_width(text: &str, scale: u32) -> i32 {
    text.chars().count() as i32 * char_width(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_needed_caption_char_has_a_glyph() {
        for c in "GAME OVER PAUSED LEVEL YOU WIN TIME SCORE LIVES PRESS ENTER +0123456789".chars()
        {
            if c == ' ' {
                continue;
            }
            assert!(glyph_for(c).is_some(), "missing glyph for {:?}", c);
        }
    }

    #[test]
    fn width_scales_linearly() {
        assert_eq!(text_width("TIME", 1), 16);
        assert_eq!(text_width("TIME", 2), 32);
    }
}
