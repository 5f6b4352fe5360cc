use std::collections::VecDeque;

use crate::grid::{Actor, Dir, Grid, Pos};

/// Breadth-first scans from the player's square.
///
/// Only squares the player may enter and that hold no ghost are expanded.
/// Visited marks are cleared at the start of every scan.
#[derive(Debug, Default)]
pub struct Scanner {
    visited: Vec<bool>,
    queue: VecDeque<Pos>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// First square, in BFS order, farther than `threshold` from every ghost.
    pub fn nearest_safe<G: Grid>(
        &mut self,
        grid: &G,
        from: Pos,
        ghosts: &[Pos],
        threshold: usize,
    ) -> Option<Pos> {
        self.first_match(grid, from, |grid, pos| {
            ghosts.iter().all(|&g| grid.distance(g, pos) > threshold)
        })
    }

    /// First square, in BFS order, holding a pellet or power pellet.
    pub fn nearest_item<G: Grid>(&mut self, grid: &G, from: Pos) -> Option<Pos> {
        self.first_match(grid, from, |grid, pos| grid.has_item(pos))
    }

    fn first_match<G, F>(&mut self, grid: &G, from: Pos, matches: F) -> Option<Pos>
    where
        G: Grid,
        F: Fn(&G, Pos) -> bool,
    {
        self.reset(grid);
        self.visited[grid.index(from)] = true;
        self.queue.push_back(from);

        while let Some(pos) = self.queue.pop_front() {
            if pos != from && matches(grid, pos) {
                return Some(pos);
            }
            for dir in Dir::ALL {
                let next = grid.neighbor(pos, dir);
                let idx = grid.index(next);
                if self.visited[idx] || !is_valid_step(grid, next) {
                    continue;
                }
                self.visited[idx] = true;
                self.queue.push_back(next);
            }
        }
        None
    }

    /// Hop count from `from` to every square `actor` can reach, `None` elsewhere.
    /// Ghosts do not block this scan.
    pub fn distance_map<G: Grid>(&mut self, grid: &G, from: Pos, actor: Actor) -> Vec<Option<u32>> {
        self.reset(grid);
        let mut dist = vec![None; grid.width() * grid.height()];
        dist[grid.index(from)] = Some(0);
        self.queue.push_back(from);

        while let Some(pos) = self.queue.pop_front() {
            let base = dist[grid.index(pos)].unwrap_or(0);
            for dir in Dir::ALL {
                let next = grid.neighbor(pos, dir);
                let idx = grid.index(next);
                if dist[idx].is_some() || !grid.is_accessible(next, actor) {
                    continue;
                }
                dist[idx] = Some(base + 1);
                self.queue.push_back(next);
            }
        }
        dist
    }

    fn reset<G: Grid>(&mut self, grid: &G) {
        self.visited.clear();
        self.visited.resize(grid.width() * grid.height(), false);
        self.queue.clear();
    }
}

fn is_valid_step<G: Grid>(grid: &G, pos: Pos) -> bool {
    grid.is_accessible(pos, Actor::Player) && !grid.has_ghost(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::grid::Level;

    #[test]
    fn nearest_item_in_corridor() {
        let board = Board::parse(&["#####", "# ..#", "#####"]).unwrap();
        let mut scanner = Scanner::new();
        assert_eq!(
            scanner.nearest_item(&board, Pos::new(1, 1)),
            Some(Pos::new(2, 1))
        );
    }

    #[test]
    fn item_behind_ghost_is_not_found() {
        let board = Board::parse(&["######", "#P G.#", "######"]).unwrap();
        let mut scanner = Scanner::new();
        assert_eq!(scanner.nearest_item(&board, board.player()), None);
    }

    #[test]
    fn nearest_item_prefers_fewer_hops() {
        let board = Board::parse(&[
            "#######",
            "#.   .#",
            "# ### #",
            "#  P  #",
            "#######",
        ])
        .unwrap();
        let mut scanner = Scanner::new();
        // both pellets are four hops away; N, E, S, W expansion reaches the
        // west side first through (2, 3)
        let found = scanner.nearest_item(&board, board.player()).unwrap();
        assert!(found == Pos::new(1, 1) || found == Pos::new(5, 1));
    }

    #[test]
    fn safe_square_clears_threshold() {
        let board = Board::parse(&["#########", "#G P    #", "#########"]).unwrap();
        let mut scanner = Scanner::new();
        let safe = scanner
            .nearest_safe(&board, board.player(), board.ghosts(), 4)
            .unwrap();
        assert_eq!(safe, Pos::new(6, 1));
    }

    #[test]
    fn no_safe_square_in_a_closet() {
        let board = Board::parse(&["#####", "#GP #", "#####"]).unwrap();
        let mut scanner = Scanner::new();
        assert_eq!(
            scanner.nearest_safe(&board, board.player(), board.ghosts(), 3),
            None
        );
    }

    #[test]
    fn distance_map_counts_hops() {
        let board = Board::parse(&["#####", "#P  #", "## ##", "#####"]).unwrap();
        let mut scanner = Scanner::new();
        let dist = scanner.distance_map(&board, board.player(), Actor::Ghost);
        assert_eq!(dist[board.index(Pos::new(3, 1))], Some(2));
        assert_eq!(dist[board.index(Pos::new(2, 2))], Some(2));
        assert_eq!(dist[board.index(Pos::new(0, 0))], None);
    }
}
