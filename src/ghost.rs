use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::{Actor, Dir, Grid, Pos};
use crate::maze::PenBounds;

/// Step that brings a ghost closest to the player along `dist`, a BFS
/// distance map rooted at the player. Ties are broken at random.
pub fn chase<G: Grid>(grid: &G, ghost: Pos, dist: &[Option<u32>], rng: &mut impl Rng) -> Option<Dir> {
    let mut options = Vec::new();
    let mut best = u32::MAX;
    for dir in Dir::ALL {
        let next = grid.neighbor(ghost, dir);
        if next == ghost || !grid.is_accessible(next, Actor::Ghost) {
            continue;
        }
        let Some(d) = dist[grid.index(next)] else {
            continue;
        };
        if d < best {
            best = d;
            options.clear();
        }
        if d == best {
            options.push(dir);
        }
    }
    options.choose(rng).copied()
}

/// Random shuffle inside the pen while waiting to be released.
pub fn wander<G: Grid>(grid: &G, ghost: Pos, pen: &PenBounds, rng: &mut impl Rng) -> Option<Dir> {
    let options: Vec<Dir> = Dir::ALL
        .into_iter()
        .filter(|&d| pen.interior(grid.neighbor(ghost, d)))
        .collect();
    options.choose(rng).copied()
}

/// Flee: the step that maximises distance from the player. Used while the
/// player is powered up.
pub fn flee<G: Grid>(grid: &G, ghost: Pos, dist: &[Option<u32>], rng: &mut impl Rng) -> Option<Dir> {
    let mut options = Vec::new();
    let mut best = 0;
    for dir in Dir::ALL {
        let next = grid.neighbor(ghost, dir);
        if next == ghost || !grid.is_accessible(next, Actor::Ghost) {
            continue;
        }
        let d = dist[grid.index(next)].unwrap_or(0);
        if d > best {
            best = d;
            options.clear();
        }
        if d == best {
            options.push(dir);
        }
    }
    options.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::grid::Level;
    use crate::scan::Scanner;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn chases_along_shortest_route() {
        let board = Board::parse(&["#######", "#P   G#", "# ### #", "#     #", "#######"]).unwrap();
        let dist = Scanner::new().distance_map(&board, board.player(), Actor::Ghost);
        let mut rng = StdRng::seed_from_u64(0);
        let ghost = board.ghosts()[0];
        assert_eq!(chase(&board, ghost, &dist, &mut rng), Some(Dir::West));
    }

    #[test]
    fn flees_away_from_player() {
        let board = Board::parse(&["#######", "#P  G #", "#######"]).unwrap();
        let dist = Scanner::new().distance_map(&board, board.player(), Actor::Ghost);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(flee(&board, board.ghosts()[0], &dist, &mut rng), Some(Dir::East));
    }

    #[test]
    fn wander_stays_inside_pen() {
        let board = Board::parse(&["#####", "#G  #", "#####"]).unwrap();
        let pen = PenBounds {
            x0: 0,
            y0: 0,
            x1: 4,
            y1: 2,
        };
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..10 {
            let dir = wander(&board, Pos::new(1, 1), &pen, &mut rng).unwrap();
            assert_eq!(dir, Dir::East);
        }
    }
}
