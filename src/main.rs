use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::Color;

mod board;
mod bomb;
mod config;
mod entity;
mod game;
mod input;
mod layer;
mod level;
mod message;
mod mob;
mod powerup;
mod render;
mod text;
mod tile;

use config::GameConfig;
use game::{Game, Overlay};
use input::InputState;
use level::LevelSet;
use render::CanvasTarget;
use text::{draw_simple_text, text_width};
use tile::TILE_SIZE;

// Game resolution constants
const GAME_WIDTH: u32 = 320;
const GAME_HEIGHT: u32 = 240;
const WINDOW_SCALE: u32 = 3;

/// Loads `config.json` from the working directory, falling back to the
/// built-in defaults if it is absent or broken.
fn load_config() -> GameConfig {
    match std::fs::read_to_string("config.json") {
        Ok(json) => match GameConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: ignoring broken config.json: {}", e);
                GameConfig::default()
            }
        },
        Err(_) => GameConfig::default(),
    }
}

/// Loads a `levels.json` level pack from the working directory, falling
/// back to the built-in campaign.
fn load_levels() -> LevelSet {
    match std::fs::read_to_string("levels.json") {
        Ok(json) => match LevelSet::from_json(&json) {
            Ok(set) => set,
            Err(e) => {
                eprintln!("Warning: ignoring broken levels.json: {}", e);
                LevelSet::builtin()
            }
        },
        Err(_) => LevelSet::builtin(),
    }
}

/// Camera offset that keeps the player centered, clamped to the board.
fn camera_offset(game: &Game<LevelSet>) -> (i32, i32) {
    let board_w = game.board().width() * TILE_SIZE;
    let board_h = game.board().height() * TILE_SIZE;

    let (px, py) = match game.board().player() {
        Some(player) => player.pixel_pos(),
        None => (board_w / 2, board_h / 2),
    };

    let clamp = |center: i32, view: i32, world: i32| -> i32 {
        if world <= view {
            // Small boards are centered in the viewport instead.
            (world - view) / 2
        } else {
            (center - view / 2).clamp(0, world - view)
        }
    };

    (
        clamp(px + TILE_SIZE / 2, GAME_WIDTH as i32, board_w),
        clamp(py + TILE_SIZE / 2, GAME_HEIGHT as i32, board_h),
    )
}

fn draw_centered(
    canvas: &mut sdl2::render::Canvas<sdl2::video::Window>,
    line: &str,
    y: i32,
    scale: u32,
) -> Result<(), String> {
    let x = (GAME_WIDTH as i32 - text_width(line, scale)) / 2;
    draw_simple_text(canvas, line, x, y, Color::RGB(255, 255, 255), scale)
}

/// HUD and overlay captions, drawn in screen coordinates after the world.
fn draw_hud(
    canvas: &mut sdl2::render::Canvas<sdl2::video::Window>,
    game: &Game<LevelSet>,
    code_entry: &str,
) -> Result<(), String> {
    let board = game.board();
    let hud = format!(
        "TIME {}  SCORE {}  LIVES {}",
        board.time(),
        board.points(),
        board.lives().max(0)
    );
    draw_simple_text(canvas, &hud, 4, 4, Color::RGB(255, 255, 255), 1)?;

    let mid = GAME_HEIGHT as i32 / 2;
    match game.overlay() {
        Overlay::None => {}
        Overlay::ChangeLevel => {
            draw_centered(canvas, &format!("LEVEL {}", board.level()), mid - 16, 2)?;
            if let Some(code) = game.current_code() {
                draw_centered(canvas, &format!("CODE {}", code), mid + 4, 1)?;
            }
        }
        Overlay::Paused => {
            draw_centered(canvas, "PAUSED", mid - 8, 2)?;
        }
        Overlay::EndGame => {
            draw_centered(canvas, "GAME OVER", mid - 16, 2)?;
            draw_centered(canvas, "PRESS ENTER", mid + 4, 1)?;
        }
        Overlay::WinGame => {
            draw_centered(canvas, "YOU WIN!", mid - 16, 2)?;
            draw_centered(canvas, "PRESS ENTER", mid + 4, 1)?;
        }
    }

    // Code entry prompt, shown while the player is typing one.
    if !code_entry.is_empty() {
        draw_centered(canvas, &format!("CODE: {}", code_entry), GAME_HEIGHT as i32 - 16, 1)?;
    }

    Ok(())
}

fn main() -> Result<(), String> {
    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;

    let window = video_subsystem
        .window(
            "Bomber",
            GAME_WIDTH * WINDOW_SCALE,
            GAME_HEIGHT * WINDOW_SCALE,
        )
        .position_centered()
        .build()
        .map_err(|e| e.to_string())?;

    let mut canvas = window.into_canvas().build().map_err(|e| e.to_string())?;

    // Logical size gives pixel-perfect scaling for free.
    canvas
        .set_logical_size(GAME_WIDTH, GAME_HEIGHT)
        .map_err(|e| e.to_string())?;

    let mut event_pump = sdl_context.event_pump()?;
    video_subsystem.text_input().start();

    let mut game = Game::new(load_config(), load_levels());
    // Letters typed while an overlay is up accumulate into a level code.
    let mut code_entry = String::new();

    'running: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    keycode: Some(Keycode::P),
                    ..
                } => {
                    if code_entry.is_empty() {
                        game.toggle_pause();
                    }
                }
                Event::KeyDown {
                    keycode: Some(Keycode::Backspace),
                    ..
                } => {
                    code_entry.pop();
                }
                Event::KeyDown {
                    keycode: Some(Keycode::Return),
                    ..
                } => {
                    if code_entry.is_empty() {
                        game.confirm();
                    } else {
                        if !game.enter_code(&code_entry) {
                            eprintln!("Warning: unknown level code {:?}", code_entry);
                        }
                        code_entry.clear();
                    }
                }
                Event::TextInput { text, .. } => {
                    // Codes are only typed on overlay screens; letters
                    // during play belong to movement keys.
                    if game.overlay() != Overlay::None {
                        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
                            code_entry.push(c.to_ascii_uppercase());
                        }
                    }
                }
                _ => {}
            }
        }

        let input = InputState::from_keyboard(&event_pump.keyboard_state());
        game.tick(&input);

        canvas.set_draw_color(Color::RGB(12, 12, 16));
        canvas.clear();

        let offset = camera_offset(&game);
        let mut target = CanvasTarget::new(&mut canvas, offset, (GAME_WIDTH, GAME_HEIGHT));
        game.render(&mut target);
        target.finish()?;

        draw_hud(&mut canvas, &game, &code_entry)?;

        canvas.present();
        std::thread::sleep(std::time::Duration::new(0, 1_000_000_000u32 / 60));
    }

    Ok(())
}
