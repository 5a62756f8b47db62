//! Player input intent
//!
//! The simulation core never polls the keyboard itself; it receives an
//! `InputState` snapshot each tick describing what the player wants to do.
//! The SDL2 mapping lives here so `main.rs` stays a thin shell, but any
//! caller (tests included) can construct an `InputState` directly.

use sdl2::keyboard::{KeyboardState, Scancode};

/// Directional and action intent for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub place_bomb: bool,
}

impl InputState {
    /// Snapshots the pressed keys into an intent struct.
    ///
    /// Arrows and WASD both steer; space drops a bomb.
    pub fn from_keyboard(keyboard: &KeyboardState) -> Self {
        InputState {
            up: keyboard.is_scancode_pressed(Scancode::Up)
                || keyboard.is_scancode_pressed(Scancode::W),
            down: keyboard.is_scancode_pressed(Scancode::Down)
                || keyboard.is_scancode_pressed(Scancode::S),
            left: keyboard.is_scancode_pressed(Scancode::Left)
                || keyboard.is_scancode_pressed(Scancode::A),
            right: keyboard.is_scancode_pressed(Scancode::Right)
                || keyboard.is_scancode_pressed(Scancode::D),
            place_bomb: keyboard.is_scancode_pressed(Scancode::Space),
        }
    }

    /// An intent with nothing pressed. Handy for ticking the simulation
    /// while no player action is wanted.
    pub fn idle() -> Self {
        InputState::default()
    }
}
