//! Best-first (A*) search over any node type.
//!
//! The engine knows nothing about boards: a [`SearchSpace`] supplies the goal
//! test, successors, step costs and the heuristic. [`AStar`] owns the node
//! arena, the frontier and the best-cost table, and keeps them between calls
//! so repeated queries stop allocating once warmed up.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use crate::config::IMPASSABLE_COST;

pub trait SearchSpace {
    type Node: Copy + Eq + Hash;

    fn is_goal(&self, node: Self::Node) -> bool;

    /// Append the nodes reachable from `node` in one step. `out` is empty on entry.
    fn successors(&self, node: Self::Node, out: &mut Vec<Self::Node>);

    /// Non-negative cost of stepping from `from` to `to`.
    fn step_cost(&self, from: Self::Node, to: Self::Node) -> f64;

    /// Estimated remaining cost from `node` to a goal. Must not overestimate.
    fn estimate(&self, node: Self::Node) -> f64;
}

#[derive(Clone, Copy, Debug)]
struct SearchNode<N> {
    node: N,
    g: f64,
    parent: Option<usize>,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f64,
    seq: u64,
    idx: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the lowest f, then the oldest entry.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug)]
pub struct AStar<N> {
    arena: Vec<SearchNode<N>>,
    open: BinaryHeap<OpenEntry>,
    best: HashMap<N, f64>,
    succ: Vec<N>,
    last_cost: f64,
    expanded: usize,
}

impl<N> Default for AStar<N> {
    fn default() -> Self {
        Self {
            arena: Vec::new(),
            open: BinaryHeap::new(),
            best: HashMap::new(),
            succ: Vec::with_capacity(4),
            last_cost: IMPASSABLE_COST,
            expanded: 0,
        }
    }
}

impl<N: Copy + Eq + Hash> AStar<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest-cost path from `start` to the first goal popped, both ends
    /// included, or `None` once the frontier runs dry.
    pub fn compute<S>(&mut self, space: &S, start: N) -> Option<Vec<N>>
    where
        S: SearchSpace<Node = N>,
    {
        self.arena.clear();
        self.open.clear();
        self.best.clear();
        self.expanded = 0;

        let mut seq = 0u64;
        self.arena.push(SearchNode {
            node: start,
            g: 0.0,
            parent: None,
        });
        self.open.push(OpenEntry {
            f: space.estimate(start),
            seq,
            idx: 0,
        });

        let mut succ = std::mem::take(&mut self.succ);
        let mut found = None;

        while let Some(OpenEntry { idx, .. }) = self.open.pop() {
            let SearchNode { node, g, .. } = self.arena[idx];

            if self.best.get(&node).is_some_and(|&seen| seen <= g) {
                continue;
            }
            self.best.insert(node, g);

            if space.is_goal(node) {
                found = Some(idx);
                break;
            }
            self.expanded += 1;

            succ.clear();
            space.successors(node, &mut succ);
            for &next in &succ {
                let next_g = g + space.step_cost(node, next);
                if self.best.get(&next).is_some_and(|&seen| seen <= next_g) {
                    continue;
                }
                seq += 1;
                let child = self.arena.len();
                self.arena.push(SearchNode {
                    node: next,
                    g: next_g,
                    parent: Some(idx),
                });
                self.open.push(OpenEntry {
                    f: next_g + space.estimate(next),
                    seq,
                    idx: child,
                });
            }
        }
        self.succ = succ;

        let Some(goal) = found else {
            self.last_cost = IMPASSABLE_COST;
            return None;
        };
        self.last_cost = self.arena[goal].g;

        let mut path = Vec::new();
        let mut cursor = Some(goal);
        while let Some(idx) = cursor {
            path.push(self.arena[idx].node);
            cursor = self.arena[idx].parent;
        }
        path.reverse();
        Some(path)
    }

    /// Cost of the path found by the last [`compute`](Self::compute), or
    /// [`IMPASSABLE_COST`] if it found none.
    pub fn last_cost(&self) -> f64 {
        self.last_cost
    }

    /// Nodes expanded by the last search.
    pub fn expanded(&self) -> usize {
        self.expanded
    }
}
