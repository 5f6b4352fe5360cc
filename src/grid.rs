//! Read-only board queries the autopilot is written against.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Manhattan distance, ignoring any wrap-around the board may have.
pub fn manhattan(a: Pos, b: Pos) -> usize {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    North,
    East,
    South,
    West,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::North, Dir::East, Dir::South, Dir::West];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::North => (0, -1),
            Dir::East => (1, 0),
            Dir::South => (0, 1),
            Dir::West => (-1, 0),
        }
    }

    pub fn reverse(self) -> Dir {
        match self {
            Dir::North => Dir::South,
            Dir::East => Dir::West,
            Dir::South => Dir::North,
            Dir::West => Dir::East,
        }
    }

    pub fn clockwise(self) -> Dir {
        match self {
            Dir::North => Dir::East,
            Dir::East => Dir::South,
            Dir::South => Dir::West,
            Dir::West => Dir::North,
        }
    }

    pub fn counter_clockwise(self) -> Dir {
        self.clockwise().reverse()
    }
}

/// Something standing on a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occupant {
    Player,
    Ghost,
    Pellet,
    PowerPellet,
}

impl Occupant {
    pub fn is_item(self) -> bool {
        matches!(self, Occupant::Pellet | Occupant::PowerPellet)
    }
}

/// Who is asking whether a square can be entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Actor {
    Player,
    Ghost,
}

/// A square graph with four links per square.
///
/// `neighbor` always yields a square on the board; whether the edge wraps or
/// clamps is up to the implementation. Accessibility is asked separately so
/// walls and gates stay a property of the board, not of the lookup.
pub trait Grid {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn neighbor(&self, pos: Pos, dir: Dir) -> Pos;
    fn occupants(&self, pos: Pos) -> Vec<Occupant>;
    fn is_accessible(&self, pos: Pos, actor: Actor) -> bool;

    /// Fewest steps between two squares if there were no walls. Grids whose
    /// edges wrap must override this, or it stops being a lower bound.
    fn distance(&self, a: Pos, b: Pos) -> usize {
        manhattan(a, b)
    }

    fn has_ghost(&self, pos: Pos) -> bool {
        self.occupants(pos).contains(&Occupant::Ghost)
    }

    fn has_item(&self, pos: Pos) -> bool {
        self.occupants(pos).iter().any(|o| o.is_item())
    }

    fn index(&self, pos: Pos) -> usize {
        pos.y * self.width() + pos.x
    }
}

/// Actor state the autopilot reads once per tick.
pub trait Level: Grid {
    fn player(&self) -> Pos;
    fn facing(&self) -> Dir;
    fn ghosts(&self) -> &[Pos];
    fn items_left(&self) -> usize;
}
