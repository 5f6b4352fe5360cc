use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use crate::autopilot::Autopilot;
use crate::board::{Board, Tile};
use crate::error::BoardError;
use crate::ghost;
use crate::grid::{Actor, Dir, Grid, Level, Pos};
use crate::maze::{self, PenBounds};
use crate::scan::Scanner;
use crate::scheduler::{ActorId, Tickable};

const GHOST_RELEASE_INTERVAL: u32 = 45;
const POWER_TICKS: u32 = 90;
const PELLET_SCORE: u32 = 10;
const POWER_SCORE: u32 = 50;
const GHOST_SCORE: u32 = 200;
const START_LIVES: u32 = 3;

/// Rules around the board: scoring, lives, power mode and level changes.
#[derive(Debug)]
pub struct Game {
    pub board: Board,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub power_timer: u32,
    player_spawn: Pos,
    ghost_spawns: Vec<Pos>,
    ghost_release: Vec<u32>,
    pen: PenBounds,
    width: usize,
    height: usize,
}

impl Game {
    pub fn new(rng: &mut impl Rng, width: usize, height: usize) -> Result<Self, BoardError> {
        let maze = maze::generate(rng, width, height)?;
        let mut game = Self {
            board: maze.board,
            score: 0,
            lives: START_LIVES,
            level: 1,
            power_timer: 0,
            player_spawn: maze.player_spawn,
            ghost_spawns: maze.ghost_spawns,
            ghost_release: Vec::new(),
            pen: maze.pen,
            width,
            height,
        };
        game.reset_release();
        Ok(game)
    }

    pub fn pen(&self) -> &PenBounds {
        &self.pen
    }

    pub fn is_over(&self) -> bool {
        self.lives == 0
    }

    fn reset_release(&mut self) {
        self.ghost_release = (0..self.ghost_spawns.len() as u32)
            .map(|i| i * GHOST_RELEASE_INTERVAL)
            .collect();
    }

    /// Moves the player one square if `dir` is open, then resolves what
    /// happens there.
    pub fn step_player(&mut self, dir: Dir, rng: &mut impl Rng) -> Result<(), BoardError> {
        let here = self.board.player();
        let next = self.board.neighbor(here, dir);
        if self.board.is_accessible(next, Actor::Player) {
            self.board.set_player(next, dir);
        } else {
            self.board.set_player(here, dir);
        }
        self.consume_tile();
        self.handle_collisions();

        if self.board.items_left() == 0 {
            self.next_level(rng)?;
        }
        Ok(())
    }

    fn consume_tile(&mut self) {
        match self.board.take_item(self.board.player()) {
            Some(Tile::Pellet) => self.score += PELLET_SCORE,
            Some(Tile::Power) => {
                self.score += POWER_SCORE;
                self.power_timer = POWER_TICKS;
            }
            _ => {}
        }
    }

    pub fn step_ghost(&mut self, idx: usize, scanner: &mut Scanner, rng: &mut impl Rng) {
        let Some(&pos) = self.board.ghosts().get(idx) else {
            return;
        };
        let dir = if self.ghost_release[idx] > 0 {
            self.ghost_release[idx] -= 1;
            ghost::wander(&self.board, pos, &self.pen, rng)
        } else {
            let dist = scanner.distance_map(&self.board, self.board.player(), Actor::Ghost);
            if self.power_timer > 0 {
                ghost::flee(&self.board, pos, &dist, rng)
            } else {
                ghost::chase(&self.board, pos, &dist, rng)
            }
        };
        if let Some(dir) = dir {
            let next = self.board.neighbor(pos, dir);
            self.board.ghosts_mut()[idx] = next;
        }
        self.handle_collisions();
    }

    pub fn tick_power_timer(&mut self) {
        self.power_timer = self.power_timer.saturating_sub(1);
    }

    fn handle_collisions(&mut self) {
        let player = self.board.player();
        let Some(idx) = self.board.ghosts().iter().position(|&g| g == player) else {
            return;
        };

        if self.power_timer > 0 {
            self.score += GHOST_SCORE;
            self.board.ghosts_mut()[idx] = self.ghost_spawns[idx];
            self.ghost_release[idx] = GHOST_RELEASE_INTERVAL;
            debug!(ghost = idx, "ghost eaten");
            return;
        }

        self.lives = self.lives.saturating_sub(1);
        info!(lives = self.lives, score = self.score, "player caught");
        let facing = self.board.facing();
        self.board.set_player(self.player_spawn, facing);
        self.board.set_ghosts(self.ghost_spawns.clone());
        self.reset_release();
        self.power_timer = 0;
    }

    fn next_level(&mut self, rng: &mut impl Rng) -> Result<(), BoardError> {
        let maze = maze::generate(rng, self.width, self.height)?;
        self.level += 1;
        self.board = maze.board;
        self.player_spawn = maze.player_spawn;
        self.ghost_spawns = maze.ghost_spawns;
        self.pen = maze.pen;
        self.power_timer = 0;
        self.reset_release();
        info!(level = self.level, score = self.score, "board cleared");
        Ok(())
    }
}

/// A running game plus whoever steers the player. This is what the
/// scheduler locks and ticks.
#[derive(Debug)]
pub struct Session {
    pub game: Game,
    pub autopilot: Autopilot,
    /// Set while a human is steering; the autopilot is bypassed.
    pub manual: Option<Dir>,
    pub manual_mode: bool,
    scanner: Scanner,
    rng: StdRng,
    failed: Option<BoardError>,
}

impl Session {
    pub fn new(game: Game, rng: StdRng) -> Self {
        Self {
            game,
            autopilot: Autopilot::new(),
            manual: None,
            manual_mode: false,
            scanner: Scanner::new(),
            rng,
            failed: None,
        }
    }

    pub fn failure(&self) -> Option<&BoardError> {
        self.failed.as_ref()
    }
}

impl Tickable for Session {
    fn tick(&mut self, actor: ActorId) {
        match actor {
            ActorId::Player => {
                let dir = if self.manual_mode {
                    self.manual
                } else {
                    Some(self.autopilot.next_move(&self.game.board))
                };
                if let Some(dir) = dir {
                    if let Err(err) = self.game.step_player(dir, &mut self.rng) {
                        self.failed = Some(err);
                    }
                }
                self.game.tick_power_timer();
            }
            ActorId::Ghost(idx) => self.game.step_ghost(idx, &mut self.scanner, &mut self.rng),
        }
    }

    fn is_finished(&self) -> bool {
        self.game.is_over() || self.failed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn game(seed: u64) -> (Game, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let game = Game::new(&mut rng, 21, 15).unwrap();
        (game, rng)
    }

    #[test]
    fn eating_a_pellet_scores() {
        let (mut g, mut rng) = game(11);
        let here = g.board.player();
        let dir = Dir::ALL
            .into_iter()
            .find(|&d| g.board.has_item(g.board.neighbor(here, d)))
            .expect("fresh maze has pellets next to the spawn");
        let before = g.board.items_left();
        g.step_player(dir, &mut rng).unwrap();
        assert!(g.score == PELLET_SCORE || g.score == POWER_SCORE);
        assert_eq!(g.board.items_left(), before - 1);
    }

    #[test]
    fn walking_into_a_wall_only_turns() {
        let (mut g, mut rng) = game(5);
        let here = g.board.player();
        if let Some(dir) = Dir::ALL
            .into_iter()
            .find(|&d| !g.board.is_accessible(g.board.neighbor(here, d), Actor::Player))
        {
            g.step_player(dir, &mut rng).unwrap();
            assert_eq!(g.board.player(), here);
            assert_eq!(g.board.facing(), dir);
        }
    }

    #[test]
    fn collision_costs_a_life_and_resets() {
        let (mut g, _) = game(2);
        let player = g.board.player();
        g.board.ghosts_mut()[0] = player;
        g.handle_collisions();
        assert_eq!(g.lives, START_LIVES - 1);
        assert_eq!(g.board.player(), g.player_spawn);
        assert_eq!(g.board.ghosts(), g.ghost_spawns.as_slice());
    }

    #[test]
    fn powered_player_eats_ghost() {
        let (mut g, _) = game(2);
        g.power_timer = 10;
        let player = g.board.player();
        g.board.ghosts_mut()[2] = player;
        g.handle_collisions();
        assert_eq!(g.lives, START_LIVES);
        assert_eq!(g.score, GHOST_SCORE);
        assert_eq!(g.board.ghosts()[2], g.ghost_spawns[2]);
    }

    #[test]
    fn session_autopilot_moves_the_player() {
        let (g, rng) = game(4);
        let mut session = Session::new(g, rng);
        let before = session.game.board.items_left();
        for _ in 0..5 {
            session.tick(ActorId::Player);
        }
        assert!(session.game.score > 0);
        assert!(session.game.board.items_left() < before);
    }

    #[test]
    fn manual_mode_without_input_holds_still() {
        let (g, rng) = game(4);
        let mut session = Session::new(g, rng);
        session.manual_mode = true;
        let start = session.game.board.player();
        session.tick(ActorId::Player);
        assert_eq!(session.game.board.player(), start);
    }

    #[test]
    fn power_wears_off_while_standing_still() {
        let (g, rng) = game(4);
        let mut session = Session::new(g, rng);
        session.manual_mode = true;
        session.game.power_timer = 3;
        for _ in 0..3 {
            session.tick(ActorId::Player);
        }
        assert_eq!(session.game.power_timer, 0);
    }

    #[test]
    fn ghosts_wait_in_pen_before_release() {
        let (g, rng) = game(8);
        let mut session = Session::new(g, rng);
        for _ in 0..5 {
            session.tick(ActorId::Ghost(3));
        }
        let pen = *session.game.pen();
        assert!(pen.interior(session.game.board.ghosts()[3]));
    }
}
