use crate::config::AiConfig;
use crate::grid::{Actor, Dir, Grid, Occupant, Pos};
use crate::search::SearchSpace;

/// Prices a single step by what waits on the destination square.
#[derive(Clone, Debug, PartialEq)]
pub struct CostModel {
    impassable: f64,
    near_ghost: f64,
    item: f64,
    empty: f64,
    radius: usize,
}

impl CostModel {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            impassable: config.impassable_cost,
            near_ghost: config.near_ghost_cost,
            item: config.item_cost,
            empty: config.empty_cost,
            radius: config.near_ghost_radius,
        }
    }

    pub fn impassable(&self) -> f64 {
        self.impassable
    }

    /// A ghost's own square is impassable whoever stands next to it. Past
    /// that, proximity to a ghost is checked before the square's contents, so
    /// a pellet next to a ghost is priced as danger.
    pub fn step_cost<G: Grid>(&self, grid: &G, ghosts: &[Pos], from: Pos, to: Pos) -> f64 {
        if from == to {
            return 0.0;
        }
        if ghosts.contains(&to) {
            return self.impassable;
        }
        let near_ghost = ghosts.iter().any(|&g| grid.distance(g, to) <= self.radius);
        if near_ghost {
            return self.near_ghost;
        }

        let mut cost = self.empty;
        for occupant in grid.occupants(to) {
            match occupant {
                Occupant::Ghost => return self.impassable,
                Occupant::Pellet | Occupant::PowerPellet => cost = self.item,
                Occupant::Player => {}
            }
        }
        cost
    }

    /// Step count ignoring walls, taken through the grid so wrapped edges
    /// count as short cuts.
    pub fn heuristic<G: Grid>(&self, grid: &G, from: Pos, to: Pos) -> f64 {
        grid.distance(from, to) as f64
    }

    pub fn is_unusable(&self, cost: f64) -> bool {
        cost >= self.impassable
    }
}

/// The board seen as a search space for the player heading to `goal`.
///
/// Ghost squares stay reachable; the cost model makes them prohibitively
/// expensive instead.
pub struct PlayerSpace<'a, G> {
    pub grid: &'a G,
    pub ghosts: &'a [Pos],
    pub model: &'a CostModel,
    pub goal: Pos,
}

impl<G: Grid> SearchSpace for PlayerSpace<'_, G> {
    type Node = Pos;

    fn is_goal(&self, node: Pos) -> bool {
        node == self.goal
    }

    fn successors(&self, node: Pos, out: &mut Vec<Pos>) {
        for dir in Dir::ALL {
            let next = self.grid.neighbor(node, dir);
            if next != node && self.grid.is_accessible(next, Actor::Player) {
                out.push(next);
            }
        }
    }

    fn step_cost(&self, from: Pos, to: Pos) -> f64 {
        self.model.step_cost(self.grid, self.ghosts, from, to)
    }

    fn estimate(&self, node: Pos) -> f64 {
        self.model.heuristic(self.grid, node, self.goal)
    }
}
