use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use pacman_autopilot::{Grid, Level, Pos, Session, Tile};

const CELL_W: usize = 2;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Ghost,
    Frightened,
    Wall,
    Empty,
    Pellet,
    Power,
    Gate,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

impl Cell {
    const BLANK: Cell = Cell {
        glyph: Glyph::Empty,
        color: Color::Reset,
    };
}

/// Redraws only the squares that changed since the last frame.
pub struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![Cell::BLANK; width * height],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    fn place(&mut self, width: usize, height: usize) -> io::Result<bool> {
        let needed_w = (width * CELL_W) as u16;
        let needed_h = (height + 2) as u16;
        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            return Ok(false);
        }
        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if (origin_x, origin_y) != (self.origin_x, self.origin_y) {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.last.len() != width * height {
            self.last = vec![Cell::BLANK; width * height];
            self.needs_full = true;
        }
        Ok(true)
    }

    pub fn draw(&mut self, stdout: &mut Stdout, session: &Session) -> io::Result<()> {
        let game = &session.game;
        let board = &game.board;
        stdout.queue(MoveTo(0, 0))?;

        if !self.place(board.width(), board.height())? {
            let (term_w, term_h) = terminal::size()?;
            stdout.queue(Clear(ClearType::All))?;
            stdout.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                board.width() * CELL_W,
                board.height() + 2,
                term_w,
                term_h
            )))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let mode = if session.manual_mode {
            "manual".to_string()
        } else {
            format!("auto, safety {}", session.autopilot.safety_threshold())
        };
        let hud = format!(
            "Score: {}  Lives: {}  Level: {}  Pellets: {}  Power: {}  [{}]  (a toggles, q quits)",
            game.score,
            game.lives,
            game.level,
            board.items_left(),
            game.power_timer,
            mode
        );
        if self.needs_full || hud != self.last_hud {
            stdout.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            stdout.queue(SetForegroundColor(Color::White))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(Print(&hud))?;
            stdout.queue(ResetColor)?;
            self.last_hud = hud;
        }

        for y in 0..board.height() {
            for x in 0..board.width() {
                let cell = cell_for(session, Pos::new(x, y));
                let idx = y * board.width() + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(stdout, x, y, cell)?;
                }
            }
        }
        self.needs_full = false;
        stdout.flush()
    }

    fn draw_cell(&self, stdout: &mut Stdout, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "😃",
            Glyph::Ghost => "👻",
            Glyph::Frightened => "😱",
            Glyph::Wall => "██",
            Glyph::Empty => "  ",
            Glyph::Pellet => "· ",
            Glyph::Power => "● ",
            Glyph::Gate => "==",
        };
        stdout.queue(MoveTo(
            self.origin_x + (x * CELL_W) as u16,
            self.origin_y + y as u16,
        ))?;
        stdout.queue(SetForegroundColor(cell.color))?;
        stdout.queue(Print(text))?;
        for _ in UnicodeWidthStr::width(text)..CELL_W {
            stdout.queue(Print(' '))?;
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }

    pub fn game_over(&self, stdout: &mut Stdout, session: &Session) -> io::Result<()> {
        let height = session.game.board.height() as u16;
        stdout.queue(MoveTo(self.origin_x, self.origin_y + height))?;
        stdout.queue(Print(format!(
            "GAME OVER - Final Score: {} (press q to quit)",
            session.game.score
        )))?;
        stdout.flush()
    }
}

fn cell_for(session: &Session, pos: Pos) -> Cell {
    let game = &session.game;
    let board = &game.board;
    let (glyph, color) = if board.player() == pos {
        (Glyph::Player, Color::Yellow)
    } else if board.ghosts().contains(&pos) {
        if game.power_timer > 0 {
            (Glyph::Frightened, Color::Blue)
        } else {
            (Glyph::Ghost, Color::Red)
        }
    } else {
        match board.tile(pos) {
            Tile::Wall => (Glyph::Wall, Color::Blue),
            Tile::Gate => (Glyph::Gate, Color::Cyan),
            Tile::Empty => (Glyph::Empty, Color::Reset),
            Tile::Pellet => (Glyph::Pellet, Color::White),
            Tile::Power => (Glyph::Power, Color::Magenta),
        }
    };
    Cell { glyph, color }
}
