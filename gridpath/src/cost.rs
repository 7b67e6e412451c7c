//! Cost bookkeeping for a single cell during a search.
//!
//! The heuristic is the Manhattan distance. It never overestimates as long as
//! every step costs at least 1, which holds for uniform weights. Random
//! weights below 1 can make it overestimate, and a `heuristic_weight` above 1
//! trades optimality for a greedier search. Both are accepted.

use crate::grid::Point;

/// Manhattan distance between two points
pub fn heuristic(a: Point, b: Point) -> f64 {
    (a.col.abs_diff(b.col) + a.row.abs_diff(b.row)) as f64
}

/// Per-cell state of a search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeRecord {
    /// Best known cost from the start (g)
    pub cost_from_start: f64,
    /// Estimated remaining cost to the goal (h)
    pub heuristic: f64,
    /// `cost_from_start + heuristic_weight * heuristic` (f)
    pub priority: f64,
    /// The cell this one was reached from on the best known path
    pub predecessor: Option<Point>,
}

impl Default for NodeRecord {
    fn default() -> Self {
        Self {
            cost_from_start: f64::INFINITY,
            heuristic: 0.0,
            priority: f64::INFINITY,
            predecessor: None,
        }
    }
}

impl NodeRecord {
    /// Recomputes `heuristic` and `priority` from the current `cost_from_start`
    pub fn update_priority(&mut self, point: Point, goal: Point, heuristic_weight: f64) {
        self.heuristic = heuristic(point, goal);
        self.priority = self.cost_from_start + heuristic_weight * self.heuristic;
    }

    /// Records a new best path to `point` through `from`
    pub(crate) fn improve(
        &mut self,
        cost: f64,
        from: Point,
        point: Point,
        goal: Point,
        heuristic_weight: f64,
    ) {
        self.cost_from_start = cost;
        self.update_priority(point, goal, heuristic_weight);
        self.predecessor = Some(from);
    }
}
