//! Game lifecycle
//!
//! `Game` owns the active board, the session, and the overlay state
//! machine, and decides how the round events the board reports translate
//! into level changes, restarts, and game over.
//!
//! Overlays gate the simulation: while any overlay is up the board is
//! paused and ticks do nothing but run the overlay's own logic. The
//! level-change splash auto-dismisses after a configured delay; every
//! other overlay waits for explicit input (`confirm`, `toggle_pause`).
//!
//! Lifecycle verbs and what survives them:
//!
//! - `restart()` — reload the current level. Counters and the session's
//!   pickup record carry over, so already-collected pickups stay gone.
//! - `change_level(n)` — same, for a different level.
//! - `new_game()` — full reset: counters, session, back to level 1.
//!
//! A level that fails to load, including running past the end of the
//! level set, ends the game rather than leaving a half-built world.
//! `win()` is the terminal celebration state; the lifecycle never enters
//! it on its own, it is fed by whatever external rule the embedder
//! wires up.

use crate::board::{Board, RoundEvent};
use crate::config::GameConfig;
use crate::input::InputState;
use crate::level::LevelSource;
use crate::powerup::Session;
use crate::render::RenderTarget;

/// Full-screen state layered over (and pausing) the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// Simulation running.
    None,
    /// Level-change splash; auto-dismisses after the screen delay.
    ChangeLevel,
    Paused,
    EndGame,
    WinGame,
}

/// Decides whether the portal may advance the level.
pub type WinRule = Box<dyn Fn(&Board) -> bool>;

pub struct Game<L: LevelSource> {
    config: GameConfig,
    levels: L,
    board: Board,
    session: Session,
    overlay: Overlay,
    /// Ticks left on the level-change splash.
    splash_left: u32,
    win_rule: WinRule,
}

impl<L: LevelSource> Game<L> {
    /// A new game on level 1, opening on the level-change splash.
    pub fn new(config: GameConfig, levels: L) -> Self {
        let session = Session::new(&config);
        let board = Board::new(config.clone());
        let mut game = Game {
            config,
            levels,
            board,
            session,
            overlay: Overlay::None,
            splash_left: 0,
            win_rule: Box::new(|board| board.enemies_remaining() == 0),
        };
        game.change_level(1);
        game
    }

    /// Replaces the portal admission rule. The default requires every
    /// enemy on the board to be dead.
    pub fn set_win_rule(&mut self, rule: WinRule) {
        self.win_rule = rule;
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The access code of the current level, for the splash caption.
    pub fn current_code(&self) -> Option<&str> {
        self.levels.code_for(self.board.level())
    }

    /*
     * Lifecycle verbs
     */

    /// Loads a level behind the change splash. Any failure, including
    /// running past the end of the level set, ends the game instead of
    /// leaving a half-built world.
    pub fn change_level(&mut self, index: usize) {
        match self.levels.level(index) {
            Ok(data) => {
                self.board.load_level(&data, &self.session);
                self.board.set_paused(true);
                self.overlay = Overlay::ChangeLevel;
                self.splash_left = self.config.screen_delay;
            }
            Err(e) => {
                eprintln!("Warning: could not load level {}: {}", index, e);
                self.end();
            }
        }
    }

    /// Reloads the current level, keeping counters and the session.
    pub fn restart(&mut self) {
        self.change_level(self.board.level());
    }

    /// Advances to the next level in the set.
    pub fn next(&mut self) {
        self.change_level(self.board.level() + 1);
    }

    /// Full reset back to level 1.
    pub fn new_game(&mut self) {
        self.session.reset(&self.config);
        self.board.reset_counters();
        self.change_level(1);
    }

    /// Jumps to the level the code unlocks, as a fresh game. An unknown
    /// code is ignored; returns whether the jump happened.
    pub fn enter_code(&mut self, code: &str) -> bool {
        match self.levels.index_for_code(code) {
            Ok(index) => {
                self.session.reset(&self.config);
                self.board.reset_counters();
                self.change_level(index);
                true
            }
            Err(_) => false,
        }
    }

    pub fn end(&mut self) {
        self.overlay = Overlay::EndGame;
        self.board.set_paused(true);
    }

    pub fn win(&mut self) {
        self.overlay = Overlay::WinGame;
        self.board.set_paused(true);
    }

    /// Pause only covers the live simulation; it never replaces another
    /// overlay.
    pub fn toggle_pause(&mut self) {
        match self.overlay {
            Overlay::None => {
                self.overlay = Overlay::Paused;
                self.board.set_paused(true);
            }
            Overlay::Paused => self.resume(),
            _ => {}
        }
    }

    fn resume(&mut self) {
        self.overlay = Overlay::None;
        self.board.set_paused(false);
    }

    /// Confirm keypress: dismisses whatever overlay is up. Terminal
    /// overlays start a new game; the splash skips its remaining delay.
    pub fn confirm(&mut self) {
        match self.overlay {
            Overlay::EndGame | Overlay::WinGame => self.new_game(),
            Overlay::Paused | Overlay::ChangeLevel => self.resume(),
            Overlay::None => {}
        }
    }

    /*
     * Per-tick driver
     */

    pub fn tick(&mut self, input: &InputState) {
        if self.overlay == Overlay::ChangeLevel {
            self.splash_left = self.splash_left.saturating_sub(1);
            if self.splash_left == 0 {
                self.resume();
            }
            return;
        }
        if self.overlay != Overlay::None {
            return;
        }

        for event in self.board.advance(&mut self.session, input) {
            match event {
                RoundEvent::TimeUp => self.end(),
                RoundEvent::PlayerDied => {
                    if self.board.lives() > 0 {
                        self.restart();
                    } else {
                        self.end();
                    }
                }
                RoundEvent::PortalEntered => {
                    if (self.win_rule)(&self.board) {
                        self.next();
                    }
                }
            }
            // The first terminal transition wins; later events this tick
            // must not resurrect the board.
            if self.overlay != Overlay::None {
                break;
            }
        }
    }

    pub fn render(&self, target: &mut dyn RenderTarget) {
        self.board.render_window(target);
        self.board.render_messages(target);
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bomb::Bomb;
    use crate::level::{LevelData, LevelError, LevelSet};
    use crate::powerup::PowerKind;

    fn small_game() -> Game<LevelSet> {
        Game::new(GameConfig::default(), LevelSet::builtin())
    }

    /// Dismisses the splash and lets the simulation run.
    fn start(game: &mut Game<LevelSet>) {
        game.confirm();
        assert_eq!(game.overlay(), Overlay::None);
    }

    struct BrokenSource;

    impl LevelSource for BrokenSource {
        fn level(&self, _index: usize) -> Result<LevelData, LevelError> {
            Err(LevelError::EmptyMap)
        }

        fn index_for_code(&self, code: &str) -> Result<usize, LevelError> {
            Err(LevelError::UnknownCode(code.to_string()))
        }

        fn code_for(&self, _index: usize) -> Option<&str> {
            None
        }
    }

    #[test]
    fn opens_on_the_change_level_splash() {
        let game = small_game();
        assert_eq!(game.overlay(), Overlay::ChangeLevel);
        assert!(game.board().is_paused());
        assert_eq!(game.board().level(), 1);
    }

    #[test]
    fn splash_auto_dismisses_after_the_screen_delay() {
        let mut game = small_game();
        let delay = GameConfig::default().screen_delay;
        for _ in 0..delay {
            assert_eq!(game.overlay(), Overlay::ChangeLevel);
            game.tick(&InputState::idle());
        }
        assert_eq!(game.overlay(), Overlay::None);
        assert!(!game.board().is_paused());
    }

    #[test]
    fn pause_never_replaces_another_overlay() {
        let mut game = small_game();
        game.toggle_pause();
        assert_eq!(game.overlay(), Overlay::ChangeLevel);

        start(&mut game);
        game.toggle_pause();
        assert_eq!(game.overlay(), Overlay::Paused);
        game.toggle_pause();
        assert_eq!(game.overlay(), Overlay::None);
    }

    #[test]
    fn broken_level_source_ends_the_game() {
        let game = Game::new(GameConfig::default(), BrokenSource);
        assert_eq!(game.overlay(), Overlay::EndGame);
        assert!(game.board().is_paused());
    }

    #[test]
    fn running_past_the_last_level_ends_the_game() {
        let mut game = small_game();
        let last = LevelSet::builtin().len();
        game.change_level(last + 1);
        assert_eq!(game.overlay(), Overlay::EndGame);
    }

    #[test]
    fn win_is_terminal_until_confirmed() {
        let mut game = small_game();
        start(&mut game);
        game.win();
        assert_eq!(game.overlay(), Overlay::WinGame);
        assert!(game.board().is_paused());

        // Ticks and pause presses change nothing.
        game.tick(&InputState::idle());
        game.toggle_pause();
        assert_eq!(game.overlay(), Overlay::WinGame);

        game.confirm();
        assert_eq!(game.overlay(), Overlay::ChangeLevel);
        assert_eq!(game.board().level(), 1);
    }

    #[test]
    fn time_up_ends_the_game() {
        let mut config = GameConfig::default();
        config.round_time = 1;
        config.screen_delay = 1;
        let mut game = Game::new(config, LevelSet::builtin());
        start(&mut game);

        for _ in 0..(crate::board::TICKS_PER_SECOND + 1) {
            game.tick(&InputState::idle());
        }
        assert_eq!(game.overlay(), Overlay::EndGame);
    }

    #[test]
    fn player_death_restarts_while_lives_remain_then_ends() {
        let mut game = small_game();
        start(&mut game);

        let lives = game.board().lives();
        assert!(lives > 1);

        // A long flame on the player's spawn tile kills them each round.
        for expected in (0..lives).rev() {
            let (tx, ty) = game.board().player().unwrap().tile();
            game.board_mut().add_bomb(Bomb::new(tx, ty, 0, 1, 10_000, 99));
            for _ in 0..120 {
                game.tick(&InputState::idle());
                if game.overlay() != Overlay::None {
                    break;
                }
            }
            assert_eq!(game.board().lives(), expected);
            if expected > 0 {
                assert_eq!(game.overlay(), Overlay::ChangeLevel);
                start(&mut game);
            } else {
                assert_eq!(game.overlay(), Overlay::EndGame);
            }
        }
    }

    #[test]
    fn entering_a_code_jumps_to_a_fresh_game_on_that_level() {
        let mut game = small_game();
        game.board_mut().add_points(500);

        assert!(!game.enter_code("NOT A CODE"));
        assert_eq!(game.board().level(), 1);

        let code = game.current_code().unwrap().to_string();
        assert!(game.enter_code(&code));
        assert_eq!(game.board().level(), 1);
        assert_eq!(game.board().points(), GameConfig::default().starting_points);

        assert!(game.enter_code("FURNACE"));
        assert_eq!(game.board().level(), 3);
        assert_eq!(game.overlay(), Overlay::ChangeLevel);
    }

    /// Two tiny enemy-free levels with a portal brick at (4, 1).
    fn portal_pack(levels: usize) -> LevelSet {
        let one = r#######"{ "code": "A", "map": ["######", "#p..x#", "######"] }"#######;
        let json = format!(
            "[{}]",
            std::iter::repeat(one).take(levels).collect::<Vec<_>>().join(",")
        );
        LevelSet::from_json(&json).unwrap()
    }

    /// Reveals the portal with a bomb, then walks the player onto it.
    fn reach_portal(game: &mut Game<LevelSet>) {
        game.board_mut().add_bomb(Bomb::new(3, 1, 0, 1, 5, 99));
        for _ in 0..40 {
            game.tick(&InputState::idle());
        }
        let right = InputState {
            right: true,
            ..InputState::idle()
        };
        for _ in 0..80 {
            game.tick(&right);
            if game.overlay() != Overlay::None {
                break;
            }
        }
    }

    #[test]
    fn portal_advances_to_the_next_level_when_the_win_rule_holds() {
        let mut game = Game::new(GameConfig::default(), portal_pack(2));
        start(&mut game);
        reach_portal(&mut game);
        assert_eq!(game.board().level(), 2);
        assert_eq!(game.overlay(), Overlay::ChangeLevel);
    }

    #[test]
    fn portal_on_the_last_level_ends_the_game() {
        let mut game = Game::new(GameConfig::default(), portal_pack(1));
        start(&mut game);
        reach_portal(&mut game);
        assert_eq!(game.overlay(), Overlay::EndGame);
    }

    #[test]
    fn portal_is_inert_while_the_win_rule_fails() {
        let mut game = Game::new(GameConfig::default(), portal_pack(2));
        game.set_win_rule(Box::new(|_| false));
        start(&mut game);
        reach_portal(&mut game);
        assert_eq!(game.board().level(), 1);
        assert_eq!(game.overlay(), Overlay::None);
    }

    /// Burns down the brick at (7, 9) on level 1 with an adjacent bomb,
    /// then claims whatever it was hiding.
    fn burn_and_claim(game: &mut Game<LevelSet>) -> Option<PowerKind> {
        game.board_mut().add_bomb(Bomb::new(6, 9, 0, 1, 5, 99));
        for _ in 0..60 {
            game.tick(&InputState::idle());
        }
        game.board_mut().claim_power_at(7, 9)
    }

    #[test]
    fn level_one_brick_hides_the_bombs_pickup() {
        let mut game = small_game();
        start(&mut game);
        assert_eq!(burn_and_claim(&mut game), Some(PowerKind::Bombs));
    }

    #[test]
    fn collected_pickups_stay_gone_on_restart_but_not_new_game() {
        let mut game = small_game();
        start(&mut game);

        // The record the player's update writes on pickup contact.
        game.session_mut().record(7, 9, 1);

        game.restart();
        start(&mut game);
        assert_eq!(burn_and_claim(&mut game), None);

        game.new_game();
        start(&mut game);
        assert_eq!(burn_and_claim(&mut game), Some(PowerKind::Bombs));
    }
}
