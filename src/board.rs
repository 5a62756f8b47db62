//! The board: world container and query hub
//!
//! Owns the grid, the live mobs, the live bombs, the transient messages,
//! and the round counters (time, points, lives). Exactly one board is
//! active per round; loading a level rebuilds its structural fields while
//! the counters carry over.
//!
//! # Tick order
//!
//! `advance` runs grid entities, then mobs, then bombs, then messages,
//! then end-condition checks, then reaps removed mobs. The order is a
//! contract: later steps query earlier ones within the same tick.
//!
//! # Spatial resolution priority
//!
//! `resolve` answers "what is at this cell" in fixed priority: flame,
//! then bomb, then another mob, then the grid entity. Flame outranks the
//! bomb sitting on the same cell so that damage can never be masked by a
//! bomb occupying the tile.
//!
//! # Removal safety
//!
//! Collections are never mutated mid-iteration. Mobs update through a
//! placeholder swap (queries during the pass skip the slot being
//! updated), and every removal is mark-then-compact via `retain` after
//! the pass completes.

use crate::bomb::{Bomb, FlameSegment};
use crate::config::GameConfig;
use crate::entity::Entity;
use crate::input::InputState;
use crate::layer::LayerStack;
use crate::level::{CellSpec, LevelData};
use crate::message::Message;
use crate::mob::{Mob, MobId, MobRole};
use crate::powerup::{PowerKind, PowerUp, Session};
use crate::render::RenderTarget;
use crate::tile::{Brick, Floor, Grid, Portal, TILE_SIZE, Wall};

/// Simulation ticks per second of round time.
pub const TICKS_PER_SECOND: u32 = 60;

/// Round conditions the board reports to the lifecycle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// The round timer hit zero.
    TimeUp,
    /// The player finished dying and was reaped; a life was subtracted.
    PlayerDied,
    /// The player is standing on a revealed portal.
    PortalEntered,
}

/// Result of the priority spatial query.
pub enum Resolved<'a> {
    Flame(&'a FlameSegment),
    Bomb(&'a Bomb),
    Mob(&'a Mob),
    Cell(&'a dyn Entity),
}

pub struct Board {
    config: GameConfig,
    level: usize,
    grid: Grid,
    mobs: Vec<Mob>,
    bombs: Vec<Bomb>,
    messages: Vec<Message>,
    time: u32,
    points: u32,
    lives: i32,
    paused: bool,
    frame: u32,
    portal_entered: bool,
    next_mob_id: MobId,
}

impl Board {
    /// An empty, paused board. `load_level` gives it a world.
    pub fn new(config: GameConfig) -> Self {
        Board {
            time: config.round_time,
            points: config.starting_points,
            lives: config.starting_lives,
            config,
            level: 0,
            grid: Grid::new(0, 0),
            mobs: Vec::new(),
            bombs: Vec::new(),
            messages: Vec::new(),
            paused: true,
            frame: 0,
            portal_entered: false,
            next_mob_id: 1,
        }
    }

    /// Rebuilds the world from a level description. Structural state
    /// (grid, mobs, bombs, messages) is replaced and the round timer
    /// resets; points and lives carry over.
    ///
    /// Power-ups already recorded in `session` for this level are not
    /// respawned: their cell becomes a plain brick-over-floor stack.
    pub fn load_level(&mut self, data: &LevelData, session: &Session) {
        self.level = data.index;
        self.time = self.config.round_time;
        self.frame = 0;
        self.portal_entered = false;
        self.mobs.clear();
        self.bombs.clear();
        self.messages.clear();
        self.grid = Grid::new(data.width, data.height);

        for y in 0..data.height {
            for x in 0..data.width {
                match data.cell(x, y) {
                    CellSpec::Floor => {}
                    CellSpec::Wall => self.place(x, y, Box::new(Wall::new(x, y))),
                    CellSpec::Brick => self.place_brick_stack(x, y, None, false),
                    CellSpec::PowerBrick(kind) => {
                        let hidden = if session.is_collected(x, y, data.index) {
                            None
                        } else {
                            Some(kind)
                        };
                        self.place_brick_stack(x, y, hidden, false);
                    }
                    CellSpec::PortalBrick => self.place_brick_stack(x, y, None, true),
                    CellSpec::PlayerSpawn => self.spawn_mob(x, y, MobRole::Player),
                    CellSpec::EnemySpawn => self.spawn_mob(x, y, MobRole::Enemy),
                }
            }
        }
    }

    fn place_brick_stack(&mut self, x: i32, y: i32, power: Option<PowerKind>, portal: bool) {
        let mut stack = LayerStack::new(
            x,
            y,
            vec![
                Box::new(Floor::new(x, y)),
                Box::new(Brick::new(x, y, self.config.brick_burn_ticks)),
            ],
        );
        if portal {
            stack.insert_below_top(Box::new(Portal::new(x, y)));
        }
        if let Some(kind) = power {
            stack.insert_below_top(Box::new(PowerUp::new(x, y, self.level, kind)));
        }
        self.place(x, y, Box::new(stack));
    }

    fn spawn_mob(&mut self, tx: i32, ty: i32, role: MobRole) {
        let id = self.next_mob_id;
        self.next_mob_id += 1;
        self.add_mob(Mob::new(id, tx, ty, role));
    }

    /*
     * Adds
     */

    /// Replaces a whole grid cell.
    pub fn place(&mut self, x: i32, y: i32, entity: Box<dyn Entity>) {
        self.grid.place(x, y, entity);
    }

    pub fn add_mob(&mut self, mob: Mob) {
        self.mobs.push(mob);
    }

    pub fn add_bomb(&mut self, bomb: Bomb) {
        self.bombs.push(bomb);
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Bomb placement request from a mob, subject to its live-bomb budget
    /// from the session. Rejections (budget spent, or a bomb already on
    /// the cell) are silent no-ops.
    pub fn place_bomb(&mut self, owner: MobId, tx: i32, ty: i32, session: &Session) {
        if self.bomb_at(tx, ty).is_some() {
            return;
        }
        let live = self
            .bombs
            .iter()
            .filter(|b| !b.is_removed() && b.owner() == owner)
            .count();
        if live >= session.bomb_rate as usize {
            return;
        }
        self.bombs.push(Bomb::new(
            tx,
            ty,
            self.config.bomb_fuse,
            session.bomb_radius,
            self.config.flame_lifetime,
            owner,
        ));
    }

    /*
     * Queries
     */

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.grid.in_bounds(x, y)
    }

    /// Priority spatial query: flame, then bomb, then another mob
    /// (excluding the requester), then the grid entity.
    pub fn resolve(&self, x: i32, y: i32, requester: Option<MobId>) -> Resolved<'_> {
        if let Some(flame) = self.flame_at(x, y) {
            return Resolved::Flame(flame);
        }
        if let Some(bomb) = self.bomb_at(x, y) {
            return Resolved::Bomb(bomb);
        }
        if let Some(mob) = self.mob_at(x, y, requester) {
            return Resolved::Mob(mob);
        }
        Resolved::Cell(self.grid_entity_at(x, y))
    }

    pub fn bomb_at(&self, x: i32, y: i32) -> Option<&Bomb> {
        self.bombs
            .iter()
            .find(|b| !b.is_removed() && !b.has_detonated() && b.tile() == (x, y))
    }

    /// Delegates to each live bomb's own flame lookup; flames from
    /// different bombs coexist, the first found answers.
    pub fn flame_at(&self, x: i32, y: i32) -> Option<&FlameSegment> {
        self.bombs.iter().find_map(|b| b.flame_at(x, y))
    }

    pub fn mob_at(&self, x: i32, y: i32, excluding: Option<MobId>) -> Option<&Mob> {
        self.mobs.iter().find(|m| {
            !m.is_removed() && Some(m.id) != excluding && m.tile() == (x, y)
        })
    }

    /// The static grid entity. Out-of-bounds coordinates are a programmer
    /// error and panic.
    pub fn grid_entity_at(&self, x: i32, y: i32) -> &dyn Entity {
        self.grid.cell(x, y)
    }

    /// The player mob, while one is alive on the board.
    pub fn player(&self) -> Option<&Mob> {
        self.mobs
            .iter()
            .find(|m| !m.is_removed() && m.role() == MobRole::Player)
    }

    pub fn enemies_remaining(&self) -> usize {
        self.mobs
            .iter()
            .filter(|m| !m.is_removed() && m.role() == MobRole::Enemy)
            .count()
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /*
     * Cell interactions used by mob updates
     */

    pub fn claim_power_at(&mut self, x: i32, y: i32) -> Option<PowerKind> {
        self.grid.cell_mut(x, y).claim_power()
    }

    pub fn is_portal_at(&self, x: i32, y: i32) -> bool {
        self.grid.cell(x, y).is_portal()
    }

    /// Flags that the player reached a revealed portal this tick.
    pub fn note_portal(&mut self) {
        self.portal_entered = true;
    }

    pub fn award_enemy_kill(&mut self, px: i32, py: i32) {
        self.points += self.config.enemy_points;
        self.messages.push(Message::new(
            format!("+{}", self.config.enemy_points),
            px,
            py - 8,
            90,
        ));
    }

    pub fn award_powerup(&mut self, px: i32, py: i32) {
        self.points += self.config.powerup_points;
        self.messages.push(Message::new(
            format!("+{}", self.config.powerup_points),
            px,
            py - 8,
            90,
        ));
    }

    /*
     * Counters
     */

    pub fn add_points(&mut self, points: u32) {
        self.points += points;
    }

    pub fn add_lives(&mut self, lives: i32) {
        self.lives += lives;
    }

    pub fn subtract_lives(&mut self, lives: i32) {
        self.lives -= lives;
    }

    /// Counts the round timer down by one second and returns the
    /// remaining time. While paused this is a query, not a decrement.
    pub fn tick_time_down(&mut self) -> u32 {
        if !self.paused {
            self.time = self.time.saturating_sub(1);
        }
        self.time
    }

    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    /// New-game counter reset; the session handles its own record.
    pub fn reset_counters(&mut self) {
        self.points = self.config.starting_points;
        self.lives = self.config.starting_lives;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn base_speed(&self) -> f64 {
        self.config.base_speed
    }

    /*
     * Per-tick driver
     */

    /// One simulation tick. No-op entirely while paused.
    pub fn advance(&mut self, session: &mut Session, input: &InputState) -> Vec<RoundEvent> {
        if self.paused {
            return Vec::new();
        }

        self.grid.update_all();
        self.update_mobs(session, input);
        self.update_bombs();
        self.update_messages();

        self.frame += 1;
        if self.frame % TICKS_PER_SECOND == 0 {
            self.tick_time_down();
        }

        let mut events = Vec::new();
        if self.time == 0 {
            events.push(RoundEvent::TimeUp);
        }
        if self.reap_mobs() {
            events.push(RoundEvent::PlayerDied);
        }
        if self.portal_entered {
            self.portal_entered = false;
            events.push(RoundEvent::PortalEntered);
        }
        events
    }

    fn update_mobs(&mut self, session: &mut Session, input: &InputState) {
        // Placeholder swap: the slot being updated holds an inert removed
        // mob, so this mob's own queries never see itself and additions
        // during the pass land at the tail, untouched until next tick.
        for i in 0..self.mobs.len() {
            let mut mob = std::mem::replace(&mut self.mobs[i], Mob::placeholder());
            mob.update(self, session, input);
            self.mobs[i] = mob;
        }
    }

    fn update_bombs(&mut self) {
        // Chain pre-pass: any bomb whose cell is covered by another
        // bomb's flame has its fuse collapsed before the update pass, so
        // it detonates this tick.
        for i in 0..self.bombs.len() {
            if self.bombs[i].has_detonated() {
                continue;
            }
            let (bx, by) = self.bombs[i].tile();
            let chained = self
                .bombs
                .iter()
                .enumerate()
                .any(|(j, b)| j != i && b.flame_at(bx, by).is_some());
            if chained {
                self.bombs[i].force_detonate();
            }
        }

        for bomb in &mut self.bombs {
            bomb.update(&mut self.grid);
        }
        self.bombs.retain(|b| !b.is_removed());
    }

    fn update_messages(&mut self) {
        for message in &mut self.messages {
            message.age();
        }
        self.messages.retain(|m| !m.expired());
    }

    /// Compacts removed mobs out after the update pass. Returns true if
    /// the player was among them (a life is subtracted here).
    fn reap_mobs(&mut self) -> bool {
        let mut player_died = false;
        self.mobs.retain(|m| {
            if m.is_removed() {
                if m.role() == MobRole::Player {
                    player_died = true;
                }
                false
            } else {
                true
            }
        });
        if player_died {
            self.subtract_lives(1);
        }
        player_died
    }

    /*
     * Render pass
     */

    /// Renders exactly the grid entities, bombs, and mobs intersecting
    /// the target's viewport, with one tile of slack on the trailing edge
    /// to avoid seams. Never indexes outside the grid regardless of the
    /// viewport offset.
    pub fn render_window(&self, target: &mut dyn RenderTarget) {
        let (ox, oy) = target.offset();
        let (vw, vh) = target.size();

        let x0 = (ox.div_euclid(TILE_SIZE)).max(0);
        let y0 = (oy.div_euclid(TILE_SIZE)).max(0);
        let x1 = ((ox + vw as i32).div_euclid(TILE_SIZE) + 1).min(self.grid.width());
        let y1 = ((oy + vh as i32).div_euclid(TILE_SIZE) + 1).min(self.grid.height());

        for y in y0..y1 {
            for x in x0..x1 {
                self.grid.cell(x, y).render(target);
            }
        }

        let visible = |tx: i32, ty: i32| tx >= x0 && tx < x1 && ty >= y0 && ty < y1;
        for bomb in &self.bombs {
            let (bx, by) = bomb.tile();
            if visible(bx, by) {
                bomb.render(target);
            }
        }
        for mob in &self.mobs {
            let (mx, my) = mob.tile();
            if !mob.is_removed() && visible(mx, my) {
                mob.render(target);
            }
        }
    }

    pub fn render_messages(&self, target: &mut dyn RenderTarget) {
        for message in &self.messages {
            message.render(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelData;
    use crate::render::RecordingTarget;

    /// 7x7 room: wall border, open floor inside, player at (1, 1).
    fn room() -> LevelData {
        LevelData::parse(
            1,
            "#######\n\
             #p....#\n\
             #.....#\n\
             #.....#\n\
             #.....#\n\
             #.....#\n\
             #######",
        )
        .unwrap()
    }

    fn playing_board() -> (Board, Session) {
        let config = GameConfig::default();
        let session = Session::new(&config);
        let mut board = Board::new(config);
        board.load_level(&room(), &session);
        board.set_paused(false);
        (board, session)
    }

    #[test]
    fn advance_is_a_no_op_while_paused() {
        let (mut board, mut session) = playing_board();
        board.set_paused(true);
        board.add_message(Message::new("hi", 0, 0, 5));
        let events = board.advance(&mut session, &InputState::idle());
        assert!(events.is_empty());
        assert_eq!(board.messages().len(), 1);
    }

    #[test]
    fn tick_time_down_is_a_query_while_paused() {
        let (mut board, _) = playing_board();
        board.set_paused(true);
        let before = board.time();
        assert_eq!(board.tick_time_down(), before);
        assert_eq!(board.time(), before);

        board.set_paused(false);
        assert_eq!(board.tick_time_down(), before - 1);
        assert_eq!(board.tick_time_down(), before - 2);
    }

    #[test]
    fn resolve_prefers_flame_over_bomb_on_the_same_cell() {
        let (mut board, mut session) = playing_board();
        // Fuse zero: detonates on the first advance. The bomb object
        // stays in the list while its flames live.
        board.add_bomb(Bomb::new(3, 3, 0, 1, 30, 99));
        board.advance(&mut session, &InputState::idle());

        assert!(board.flame_at(3, 3).is_some());
        match board.resolve(3, 3, None) {
            Resolved::Flame(_) => {}
            _ => panic!("flame must outrank everything else at the cell"),
        }
    }

    #[test]
    fn chain_detonation_fires_before_the_second_fuse_expires() {
        let (mut board, mut session) = playing_board();
        board.add_bomb(Bomb::new(2, 2, 0, 1, 30, 99));
        board.add_bomb(Bomb::new(3, 2, 10_000, 1, 30, 99));

        // Tick 1: bomb A detonates, covering (3, 2).
        board.advance(&mut session, &InputState::idle());
        assert!(board.flame_at(3, 2).is_some());

        // Tick 2: the chain pre-pass collapses B's fuse and B detonates.
        board.advance(&mut session, &InputState::idle());
        assert!(board.flame_at(4, 2).is_some(), "bomb B's own flame");
    }

    #[test]
    fn bomb_placement_respects_the_budget() {
        let (mut board, session) = playing_board();
        board.place_bomb(7, 2, 2, &session);
        board.place_bomb(7, 3, 3, &session);
        // Default rate is one live bomb; the second request is dropped.
        assert_eq!(board.bombs().len(), 1);
        assert_eq!(board.bombs()[0].tile(), (2, 2));
    }

    #[test]
    fn bomb_placement_on_an_occupied_cell_is_a_no_op() {
        let (mut board, mut session) = playing_board();
        session.bomb_rate = 5;
        board.place_bomb(7, 2, 2, &session);
        board.place_bomb(8, 2, 2, &session);
        assert_eq!(board.bombs().len(), 1);
    }

    #[test]
    fn player_death_subtracts_a_life_and_reports_it() {
        let (mut board, mut session) = playing_board();
        let lives = board.lives();
        // Long-lived flame right on the player's tile.
        board.add_bomb(Bomb::new(1, 1, 0, 1, 10_000, 99));

        let mut died = false;
        for _ in 0..120 {
            let events = board.advance(&mut session, &InputState::idle());
            if events.contains(&RoundEvent::PlayerDied) {
                died = true;
                break;
            }
        }
        assert!(died, "player should die in the flame and be reaped");
        assert_eq!(board.lives(), lives - 1);
        assert!(board.player().is_none());
    }

    #[test]
    fn time_up_is_reported_when_the_timer_reaches_zero() {
        let mut config = GameConfig::default();
        config.round_time = 1;
        let mut session = Session::new(&config);
        let mut board = Board::new(config);
        board.load_level(&room(), &session);
        board.set_paused(false);

        let mut saw_time_up = false;
        for _ in 0..(TICKS_PER_SECOND + 1) {
            if board
                .advance(&mut session, &InputState::idle())
                .contains(&RoundEvent::TimeUp)
            {
                saw_time_up = true;
                break;
            }
        }
        assert!(saw_time_up);
    }

    #[test]
    fn messages_age_out_without_skipping() {
        let (mut board, mut session) = playing_board();
        board.add_message(Message::new("a", 0, 0, 1));
        board.add_message(Message::new("b", 0, 0, 2));
        board.add_message(Message::new("c", 0, 0, 1));

        board.advance(&mut session, &InputState::idle());
        assert_eq!(board.messages().len(), 1);
        board.advance(&mut session, &InputState::idle());
        assert!(board.messages().is_empty());
    }

    #[test]
    fn render_window_never_leaves_the_grid() {
        let (board, _) = playing_board();

        for offset in [(-500, -500), (0, 0), (40, 40), (10_000, 10_000)] {
            let mut target = RecordingTarget::new((64, 64), offset);
            board.render_window(&mut target);
            for (tx, ty) in target.drawn_tiles() {
                assert!(
                    tx >= 0 && tx < board.width() && ty >= 0 && ty < board.height(),
                    "drew tile ({}, {}) outside the grid with offset {:?}",
                    tx,
                    ty,
                    offset
                );
            }
        }
    }

    #[test]
    fn render_window_covers_the_visible_tiles_with_slack() {
        let (board, _) = playing_board();
        // 32x32 viewport at origin: tiles 0..=2 in each axis (one slack).
        let mut target = RecordingTarget::new((32, 32), (0, 0));
        board.render_window(&mut target);
        let tiles = target.drawn_tiles();
        assert!(tiles.contains(&(0, 0)));
        assert!(tiles.contains(&(2, 2)));
        assert!(!tiles.contains(&(3, 3)));
    }
}
