//! Random mazes: a Prim spanning tree on a lattice of odd squares, braided
//! to remove most dead ends, with a ghost pen carved in the middle.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, Tile};
use crate::error::BoardError;
use crate::grid::{Dir, Pos};

const PEN_W: usize = 9;
const PEN_H: usize = 5;
const BRAID_CHANCE: f32 = 0.45;
const EXTRA_OPENINGS: f32 = 0.08;
const GHOSTS: usize = 4;

/// The ghost pen, walls included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PenBounds {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PenBounds {
    fn centered(width: usize, height: usize) -> Self {
        let odd = |n: usize| if n % 2 == 0 { n.saturating_sub(1) } else { n };
        let pen_w = odd(PEN_W.min(width.saturating_sub(2))).max(3);
        let pen_h = odd(PEN_H.min(height.saturating_sub(2))).max(3);
        let x0 = (width - pen_w) / 2;
        let y0 = (height - pen_h) / 2;
        Self {
            x0,
            y0,
            x1: x0 + pen_w - 1,
            y1: y0 + pen_h - 1,
        }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        (self.x0..=self.x1).contains(&pos.x) && (self.y0..=self.y1).contains(&pos.y)
    }

    pub fn interior(&self, pos: Pos) -> bool {
        pos.x > self.x0 && pos.x < self.x1 && pos.y > self.y0 && pos.y < self.y1
    }

    fn is_wall(&self, pos: Pos) -> bool {
        self.contains(pos) && !self.interior(pos)
    }

    pub fn gate(&self) -> Pos {
        Pos::new((self.x0 + self.x1) / 2, self.y0)
    }
}

#[derive(Clone, Debug)]
pub struct Maze {
    pub board: Board,
    pub player_spawn: Pos,
    pub ghost_spawns: Vec<Pos>,
    pub pen: PenBounds,
}

struct Canvas {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Canvas {
    fn get(&self, x: usize, y: usize) -> Tile {
        self.tiles[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, tile: Tile) {
        self.tiles[y * self.width + x] = tile;
    }

    /// Lattice cell `(cx, cy)` lives at square `(2cx + 1, 2cy + 1)`.
    fn open_cell(&mut self, cx: usize, cy: usize) {
        self.set(cx * 2 + 1, cy * 2 + 1, Tile::Empty);
    }

    fn open_between(&mut self, a: (usize, usize), b: (usize, usize)) {
        self.set(a.0 + b.0 + 1, a.1 + b.1 + 1, Tile::Empty);
    }

    fn is_open_between(&self, a: (usize, usize), b: (usize, usize)) -> bool {
        self.get(a.0 + b.0 + 1, a.1 + b.1 + 1) != Tile::Wall
    }

    fn walkable(&self, pen: &PenBounds, pos: Pos) -> bool {
        !pen.contains(pos) && !matches!(self.get(pos.x, pos.y), Tile::Wall | Tile::Gate)
    }
}

pub fn generate(rng: &mut impl Rng, width: usize, height: usize) -> Result<Maze, BoardError> {
    if width < 7 || height < 7 {
        return Err(BoardError::TooSmall { width, height });
    }
    let mut canvas = Canvas {
        width,
        height,
        tiles: vec![Tile::Wall; width * height],
    };
    let cells = ((width - 1) / 2, (height - 1) / 2);

    carve_tree(&mut canvas, cells, rng);
    braid(&mut canvas, cells, rng);
    let pen = PenBounds::centered(width, height);
    carve_pen(&mut canvas, &pen);
    reconnect(&mut canvas, &pen);

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if canvas.get(x, y) == Tile::Empty && !pen.contains(Pos::new(x, y)) {
                canvas.set(x, y, Tile::Pellet);
            }
        }
    }
    for (x, y) in [(1, 1), (width - 2, 1), (1, height - 2), (width - 2, height - 2)] {
        if canvas.get(x, y) != Tile::Wall {
            canvas.set(x, y, Tile::Power);
        }
    }

    let mut ghost_spawns: Vec<Pos> = (pen.y0 + 1..pen.y1)
        .flat_map(|y| (pen.x0 + 1..pen.x1).map(move |x| Pos::new(x, y)))
        .take(GHOSTS)
        .collect();
    if let Some(&first) = ghost_spawns.first() {
        ghost_spawns.resize(GHOSTS, first);
    }

    let mut open: Vec<Pos> = (1..height - 1)
        .flat_map(|y| (1..width - 1).map(move |x| Pos::new(x, y)))
        .filter(|&p| canvas.walkable(&pen, p))
        .collect();
    open.shuffle(rng);
    let player_spawn = *open.first().ok_or(BoardError::NoOpenSquare)?;

    let board = Board::from_tiles(
        width,
        height,
        canvas.tiles,
        player_spawn,
        ghost_spawns.clone(),
    );
    Ok(Maze {
        board,
        player_spawn,
        ghost_spawns,
        pen,
    })
}

fn lattice_neighbors(c: (usize, usize), cells: (usize, usize)) -> Vec<(usize, usize)> {
    Dir::ALL
        .into_iter()
        .filter_map(|d| {
            let (dx, dy) = d.delta();
            let x = c.0.checked_add_signed(dx)?;
            let y = c.1.checked_add_signed(dy)?;
            (x < cells.0 && y < cells.1).then_some((x, y))
        })
        .collect()
}

fn carve_tree(canvas: &mut Canvas, cells: (usize, usize), rng: &mut impl Rng) {
    let mut in_maze = vec![false; cells.0 * cells.1];
    let at = |c: (usize, usize)| c.1 * cells.0 + c.0;

    let start = (rng.gen_range(0..cells.0), rng.gen_range(0..cells.1));
    in_maze[at(start)] = true;
    canvas.open_cell(start.0, start.1);
    let mut frontier = lattice_neighbors(start, cells);

    while !frontier.is_empty() {
        let cell = frontier.swap_remove(rng.gen_range(0..frontier.len()));
        if in_maze[at(cell)] {
            continue;
        }
        let (joined, fresh): (Vec<_>, Vec<_>) = lattice_neighbors(cell, cells)
            .into_iter()
            .partition(|&n| in_maze[at(n)]);
        let Some(&link) = joined.choose(rng) else {
            continue;
        };
        in_maze[at(cell)] = true;
        canvas.open_between(cell, link);
        canvas.open_cell(cell.0, cell.1);
        frontier.extend(fresh);
    }
}

/// Knocks out walls at dead ends, plus a few random extra openings.
fn braid(canvas: &mut Canvas, cells: (usize, usize), rng: &mut impl Rng) {
    for cy in 0..cells.1 {
        for cx in 0..cells.0 {
            let (open, closed): (Vec<_>, Vec<_>) = lattice_neighbors((cx, cy), cells)
                .into_iter()
                .partition(|&n| canvas.is_open_between((cx, cy), n));
            let Some(&target) = closed.choose(rng) else {
                continue;
            };
            let chance = if open.len() == 1 {
                BRAID_CHANCE
            } else {
                EXTRA_OPENINGS
            };
            if rng.gen::<f32>() < chance {
                canvas.open_between((cx, cy), target);
                canvas.open_cell(target.0, target.1);
            }
        }
    }
}

fn carve_pen(canvas: &mut Canvas, pen: &PenBounds) {
    for y in pen.y0..=pen.y1 {
        for x in pen.x0..=pen.x1 {
            let tile = if pen.interior(Pos::new(x, y)) {
                Tile::Empty
            } else {
                Tile::Wall
            };
            canvas.set(x, y, tile);
        }
    }
    let gate = pen.gate();
    canvas.set(gate.x, gate.y, Tile::Gate);

    // corridor from the gate up to the first open square
    let mut y = gate.y;
    while y > 1 {
        y -= 1;
        if canvas.get(gate.x, y) != Tile::Wall {
            break;
        }
        canvas.set(gate.x, y, Tile::Empty);
    }
}

fn flood(canvas: &Canvas, pen: &PenBounds, start: Pos) -> Vec<bool> {
    let mut seen = vec![false; canvas.width * canvas.height];
    let mut queue = VecDeque::from([start]);
    seen[start.y * canvas.width + start.x] = true;
    while let Some(pos) = queue.pop_front() {
        for next in inner_neighbors(canvas, pos) {
            let idx = next.y * canvas.width + next.x;
            if seen[idx] || !canvas.walkable(pen, next) {
                continue;
            }
            seen[idx] = true;
            queue.push_back(next);
        }
    }
    seen
}

/// Neighbors that stay off the outer border.
fn inner_neighbors(canvas: &Canvas, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
    Dir::ALL.into_iter().filter_map(move |d| {
        let (dx, dy) = d.delta();
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        (x >= 1 && y >= 1 && x < canvas.width - 1 && y < canvas.height - 1)
            .then_some(Pos::new(x, y))
    })
}

/// Opens walls until every walkable square outside the pen is reachable.
fn reconnect(canvas: &mut Canvas, pen: &PenBounds) {
    let inner: Vec<Pos> = (1..canvas.height - 1)
        .flat_map(|y| (1..canvas.width - 1).map(move |x| Pos::new(x, y)))
        .collect();
    let Some(&start) = inner.iter().find(|&&p| canvas.walkable(pen, p)) else {
        return;
    };

    for _ in 0..inner.len() {
        let reach = flood(canvas, pen, start);
        let at = |p: Pos| p.y * canvas.width + p.x;
        if !inner.iter().any(|&p| canvas.walkable(pen, p) && !reach[at(p)]) {
            return;
        }
        let bridge = inner.iter().copied().find(|&p| {
            if canvas.get(p.x, p.y) != Tile::Wall || pen.is_wall(p) {
                return false;
            }
            let sides: Vec<bool> = inner_neighbors(canvas, p)
                .filter(|&n| canvas.walkable(pen, n))
                .map(|n| reach[at(n)])
                .collect();
            sides.contains(&true) && sides.contains(&false)
        });
        match bridge {
            Some(p) => canvas.set(p.x, p.y, Tile::Empty),
            None => return,
        }
    }
}
