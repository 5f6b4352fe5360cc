use crate::error::BoardError;
use crate::grid::{Actor, Dir, Grid, Level, Occupant, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Empty,
    Pellet,
    Power,
    Gate,
}

impl Tile {
    pub fn is_item(self) -> bool {
        matches!(self, Tile::Pellet | Tile::Power)
    }
}

/// The playfield: static tiles plus the positions of everything that moves.
///
/// Edges wrap, so a tunnel is simply a pair of open squares facing each other
/// across the border. Mazes with a solid outer wall never expose the wrap.
#[derive(Clone, Debug)]
pub struct Board {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    player: Pos,
    facing: Dir,
    ghosts: Vec<Pos>,
    items_left: usize,
    tunnels: (bool, bool),
}

impl Board {
    /// Builds a board from text rows.
    ///
    /// `#` wall, ` ` empty, `.` pellet, `o` power pellet, `=` gate,
    /// `P` player, `G` ghost (both standing on an empty square). Without a `P`
    /// the player starts on the first open square in reading order.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, BoardError> {
        let width = rows.first().ok_or(BoardError::Empty)?.as_ref().chars().count();
        if width == 0 {
            return Err(BoardError::Empty);
        }
        let height = rows.len();
        let mut tiles = Vec::with_capacity(width * height);
        let mut player = None;
        let mut ghosts = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(BoardError::Ragged {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let tile = match glyph {
                    '#' => Tile::Wall,
                    ' ' => Tile::Empty,
                    '.' => Tile::Pellet,
                    'o' => Tile::Power,
                    '=' => Tile::Gate,
                    'P' => {
                        player = Some(Pos::new(x, y));
                        Tile::Empty
                    }
                    'G' => {
                        ghosts.push(Pos::new(x, y));
                        Tile::Empty
                    }
                    _ => return Err(BoardError::UnknownGlyph { glyph, x, y }),
                };
                tiles.push(tile);
            }
        }

        let player = match player {
            Some(pos) => pos,
            None => tiles
                .iter()
                .position(|t| !matches!(t, Tile::Wall | Tile::Gate))
                .map(|idx| Pos::new(idx % width, idx / width))
                .ok_or(BoardError::NoOpenSquare)?,
        };
        Ok(Self::from_tiles(width, height, tiles, player, ghosts))
    }

    pub(crate) fn from_tiles(
        width: usize,
        height: usize,
        tiles: Vec<Tile>,
        player: Pos,
        ghosts: Vec<Pos>,
    ) -> Self {
        let items_left = tiles.iter().filter(|t| t.is_item()).count();
        let open = |x: usize, y: usize| tiles[y * width + x] != Tile::Wall;
        let tunnels = (
            (0..height).any(|y| open(0, y) && open(width - 1, y)),
            (0..width).any(|x| open(x, 0) && open(x, height - 1)),
        );
        Self {
            width,
            height,
            tiles,
            player,
            facing: Dir::West,
            ghosts,
            items_left,
            tunnels,
        }
    }

    pub fn tile(&self, pos: Pos) -> Tile {
        self.tiles[self.index(pos)]
    }

    /// Removes the item under `pos`, if any, and returns what was there.
    pub fn take_item(&mut self, pos: Pos) -> Option<Tile> {
        let idx = self.index(pos);
        let tile = self.tiles[idx];
        if !tile.is_item() {
            return None;
        }
        self.tiles[idx] = Tile::Empty;
        self.items_left = self.items_left.saturating_sub(1);
        Some(tile)
    }

    pub fn set_player(&mut self, pos: Pos, facing: Dir) {
        self.player = pos;
        self.facing = facing;
    }

    pub fn ghosts_mut(&mut self) -> &mut [Pos] {
        &mut self.ghosts
    }

    pub fn set_ghosts(&mut self, ghosts: Vec<Pos>) {
        self.ghosts = ghosts;
    }

    /// Open squares the player may stand on, in reading order.
    pub fn open_squares(&self) -> Vec<Pos> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Pos::new(x, y)))
            .filter(|&p| self.is_accessible(p, Actor::Player))
            .collect()
    }
}

impl Grid for Board {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn neighbor(&self, pos: Pos, dir: Dir) -> Pos {
        let (dx, dy) = dir.delta();
        let x = (pos.x as isize + dx).rem_euclid(self.width as isize);
        let y = (pos.y as isize + dy).rem_euclid(self.height as isize);
        Pos::new(x as usize, y as usize)
    }

    /// Manhattan distance, taking the short way round on any axis a tunnel
    /// crosses.
    fn distance(&self, a: Pos, b: Pos) -> usize {
        let mut dx = a.x.abs_diff(b.x);
        let mut dy = a.y.abs_diff(b.y);
        if self.tunnels.0 {
            dx = dx.min(self.width - dx);
        }
        if self.tunnels.1 {
            dy = dy.min(self.height - dy);
        }
        dx + dy
    }

    fn occupants(&self, pos: Pos) -> Vec<Occupant> {
        let mut out = Vec::new();
        if self.player == pos {
            out.push(Occupant::Player);
        }
        out.extend(self.ghosts.iter().filter(|g| **g == pos).map(|_| Occupant::Ghost));
        match self.tile(pos) {
            Tile::Pellet => out.push(Occupant::Pellet),
            Tile::Power => out.push(Occupant::PowerPellet),
            _ => {}
        }
        out
    }

    fn is_accessible(&self, pos: Pos, actor: Actor) -> bool {
        match self.tile(pos) {
            Tile::Wall => false,
            Tile::Gate => actor == Actor::Ghost,
            _ => true,
        }
    }

    fn has_ghost(&self, pos: Pos) -> bool {
        self.ghosts.contains(&pos)
    }
}

impl Level for Board {
    fn player(&self) -> Pos {
        self.player
    }

    fn facing(&self) -> Dir {
        self.facing
    }

    fn ghosts(&self) -> &[Pos] {
        &self.ghosts
    }

    fn items_left(&self) -> usize {
        self.items_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_glyphs_and_actors() {
        let board = Board::parse(&["#####", "#P.G#", "#o= #", "#####"]).unwrap();
        assert_eq!((board.width(), board.height()), (5, 4));
        assert_eq!(board.player(), Pos::new(1, 1));
        assert_eq!(board.ghosts(), &[Pos::new(3, 1)]);
        assert_eq!(board.items_left(), 2);
        assert_eq!(board.tile(Pos::new(2, 2)), Tile::Gate);
        assert_eq!(board.occupants(Pos::new(3, 1)), vec![Occupant::Ghost]);
        assert_eq!(board.occupants(Pos::new(1, 2)), vec![Occupant::PowerPellet]);
    }

    #[test]
    fn player_defaults_to_first_open_square() {
        let board = Board::parse(&["####", "#  #", "####"]).unwrap();
        assert_eq!(board.player(), Pos::new(1, 1));
    }

    #[test]
    fn rejects_malformed_rows() {
        assert_eq!(Board::parse::<&str>(&[]).unwrap_err(), BoardError::Empty);
        assert_eq!(
            Board::parse(&["####", "# #", "####"]).unwrap_err(),
            BoardError::Ragged {
                row: 1,
                expected: 4,
                found: 3
            }
        );
        assert_eq!(
            Board::parse(&["###", "#x#", "###"]).unwrap_err(),
            BoardError::UnknownGlyph {
                glyph: 'x',
                x: 1,
                y: 1
            }
        );
        assert_eq!(
            Board::parse(&["###", "#=#", "###"]).unwrap_err(),
            BoardError::NoOpenSquare
        );
    }

    #[test]
    fn neighbors_wrap_at_edges() {
        let board = Board::parse(&["   ", " P ", "   "]).unwrap();
        assert_eq!(board.neighbor(Pos::new(0, 1), Dir::West), Pos::new(2, 1));
        assert_eq!(board.neighbor(Pos::new(2, 1), Dir::East), Pos::new(0, 1));
        assert_eq!(board.neighbor(Pos::new(1, 0), Dir::North), Pos::new(1, 2));
        assert_eq!(board.neighbor(Pos::new(1, 1), Dir::South), Pos::new(1, 2));
    }

    #[test]
    fn distance_takes_the_short_way_round() {
        let board = Board::parse(&["                    "]).unwrap();
        assert_eq!(board.distance(Pos::new(5, 0), Pos::new(18, 0)), 7);
        assert_eq!(board.distance(Pos::new(5, 0), Pos::new(9, 0)), 4);

        let board = Board::parse(&["   ", " P ", "   "]).unwrap();
        assert_eq!(board.distance(Pos::new(0, 0), Pos::new(2, 2)), 2);

        // a solid outer wall has no tunnel to take
        let board = Board::parse(&["#########", "#G P    #", "#########"]).unwrap();
        assert_eq!(board.distance(Pos::new(1, 1), Pos::new(7, 1)), 6);
    }

    #[test]
    fn gate_only_admits_ghosts() {
        let board = Board::parse(&["#=#", "#P#"]).unwrap();
        let gate = Pos::new(1, 0);
        assert!(!board.is_accessible(gate, Actor::Player));
        assert!(board.is_accessible(gate, Actor::Ghost));
    }

    #[test]
    fn taking_items_updates_count() {
        let mut board = Board::parse(&["#P.o#"]).unwrap();
        assert_eq!(board.take_item(Pos::new(1, 0)), None);
        assert_eq!(board.take_item(Pos::new(2, 0)), Some(Tile::Pellet));
        assert_eq!(board.take_item(Pos::new(3, 0)), Some(Tile::Power));
        assert_eq!(board.items_left(), 0);
        assert!(!board.has_item(Pos::new(2, 0)));
    }
}
