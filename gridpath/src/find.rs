use log::{debug, info, trace};

use crate::{
    cost::NodeRecord,
    frontier::Frontier,
    grid::{Grid, Point},
    render::CellRole,
};

#[derive(Debug, PartialEq, Clone)]
pub struct PathResult {
    /// Every cell from start to goal, both included
    pub path: Vec<Point>,
    pub start: Point,
    pub goal: Point,
    pub total_cost: f64,
}

impl PathResult {
    /// Number of cells on the path
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// The path without its start and goal cells
    pub fn interior(&self) -> &[Point] {
        if self.path.len() <= 2 {
            &[]
        } else {
            &self.path[1..self.path.len() - 1]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFinderState {
    /// Frontier holds only the start, nothing expanded yet
    Ready,
    Running,
    PathFound,
    /// The frontier ran empty before the goal was reached
    Exhausted,
}

impl PathFinderState {
    pub fn is_done(&self) -> bool {
        matches!(self, PathFinderState::PathFound | PathFinderState::Exhausted)
    }
}

/// Things that happened during a single step
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// A cell was expanded, never emitted for start or goal
    NodeVisited(Point),
    FrontierAdded(Point),
    /// A queued cell was reached through a cheaper path
    Relaxed(Point),
    PathFound(PathResult),
    Exhausted,
}

/// Incremental A* search: every call to [`PathFinder::step`] expands one cell.
///
/// The finder keeps its own per-cell storage and reads walls and weights from
/// the grid handed to each step. It must be recreated whenever the grid
/// changes.
#[derive(Debug, Clone)]
pub struct PathFinder {
    start: Point,
    goal: Point,
    rows: usize,
    columns: usize,
    heuristic_weight: f64,
    records: Vec<NodeRecord>,
    visited: Vec<bool>,
    visit_order: Vec<Point>,
    on_path: Vec<bool>,
    frontier: Frontier,
    state: PathFinderState,
    result: Option<PathResult>,
    steps: usize,
}

impl PathFinder {
    pub fn new(grid: &Grid, heuristic_weight: f64) -> Self {
        let start = grid.start();
        let goal = grid.goal();

        let mut records = vec![NodeRecord::default(); grid.len()];
        let start_index = grid.idx(start);
        records[start_index].cost_from_start = 0.0;
        records[start_index].update_priority(start, goal, heuristic_weight);

        let mut frontier = Frontier::with_capacity(grid.len());
        frontier.push(start_index, records[start_index].priority);

        Self {
            start,
            goal,
            rows: grid.rows(),
            columns: grid.columns(),
            heuristic_weight,
            records,
            visited: vec![false; grid.len()],
            visit_order: Vec::new(),
            on_path: vec![false; grid.len()],
            frontier,
            state: PathFinderState::Ready,
            result: None,
            steps: 0,
        }
    }

    /// Runs steps until the search is done
    pub fn finish(&mut self, grid: &Grid) -> PathFinderState {
        loop {
            let state = self.step(grid);
            if state.is_done() {
                return state;
            }
        }
    }

    pub fn step(&mut self, grid: &Grid) -> PathFinderState {
        self.step_with(grid, |_| {})
    }

    /// Expands the most promising frontier cell and reports what changed to
    /// `on_event`. Does nothing once the search is done.
    pub fn step_with<F: FnMut(SearchEvent)>(
        &mut self,
        grid: &Grid,
        mut on_event: F,
    ) -> PathFinderState {
        if self.state.is_done() {
            return self.state;
        }
        debug_assert_eq!(grid.len(), self.records.len());

        let Some((current_index, _)) = self.frontier.pop() else {
            info!(
                "no path from {} to {}, {} cells visited",
                self.start,
                self.goal,
                self.visit_order.len()
            );
            self.state = PathFinderState::Exhausted;
            on_event(SearchEvent::Exhausted);
            return self.state;
        };

        if self.state == PathFinderState::Ready {
            debug!("search from {} to {} started", self.start, self.goal);
            self.state = PathFinderState::Running;
        }
        self.steps += 1;

        let current = grid.point_at(current_index);
        let current_record = self.records[current_index];
        trace!(
            "expanding {} g={} f={}",
            current,
            current_record.cost_from_start,
            current_record.priority
        );

        if current == self.goal {
            let result = self.backtrack(grid);
            info!(
                "path found: {} cells, cost {} after {} steps",
                result.len(),
                result.total_cost,
                self.steps
            );
            for p in &result.path {
                self.on_path[grid.idx(*p)] = true;
            }
            self.result = Some(result.clone());
            self.state = PathFinderState::PathFound;
            on_event(SearchEvent::PathFound(result));
            return self.state;
        }

        self.visited[current_index] = true;
        self.visit_order.push(current);
        if !self.is_endpoint(current) {
            on_event(SearchEvent::NodeVisited(current));
        }

        // the weight of the cell we leave is what moving to a neighbor costs
        let cost = current_record.cost_from_start + grid.cell_at(current_index).weight;

        // relaxed cells queue behind the cells already waiting at their new
        // priority but ahead of the cells first reached in this expansion
        let mut added = Vec::with_capacity(4);
        let mut relaxed = Vec::with_capacity(4);
        for &neighbor in grid.neighbors_at(current_index) {
            let index = grid.idx(neighbor);
            if grid.cell_at(index).blocked || self.visited[index] {
                continue;
            }

            let record = &mut self.records[index];
            if !self.frontier.contains(index) {
                record.improve(cost, current, neighbor, self.goal, self.heuristic_weight);
                added.push((index, record.priority));
                on_event(SearchEvent::FrontierAdded(neighbor));
            } else if cost < record.cost_from_start {
                record.improve(cost, current, neighbor, self.goal, self.heuristic_weight);
                relaxed.push((index, record.priority));
                trace!("relaxed {} to g={}", neighbor, cost);
                on_event(SearchEvent::Relaxed(neighbor));
            }
        }

        self.frontier.update_all(&mut relaxed);
        for (index, priority) in added {
            self.frontier.push(index, priority);
        }

        self.state
    }

    /// Follows the predecessor links from the goal back to the start
    fn backtrack(&self, grid: &Grid) -> PathResult {
        let mut path = vec![self.goal];
        let mut cursor = self.records[grid.idx(self.goal)].predecessor;

        while let Some(point) = cursor {
            path.push(point);
            // predecessors only ever point at already expanded cells
            debug_assert!(path.len() <= self.records.len());
            cursor = self.records[grid.idx(point)].predecessor;
        }

        path.reverse();

        PathResult {
            path,
            start: self.start,
            goal: self.goal,
            total_cost: self.records[grid.idx(self.goal)].cost_from_start,
        }
    }

    fn index(&self, point: Point) -> Option<usize> {
        (point.col < self.columns && point.row < self.rows)
            .then(|| point.row * self.columns + point.col)
    }

    fn is_endpoint(&self, point: Point) -> bool {
        point == self.start || point == self.goal
    }

    pub fn state(&self) -> PathFinderState {
        self.state
    }

    pub fn result(&self) -> Option<&PathResult> {
        self.result.as_ref()
    }

    pub fn record(&self, point: Point) -> Option<&NodeRecord> {
        self.index(point).map(|i| &self.records[i])
    }

    pub fn is_visited(&self, point: Point) -> bool {
        self.index(point).map_or(false, |i| self.visited[i])
    }

    pub fn in_frontier(&self, point: Point) -> bool {
        self.index(point).map_or(false, |i| self.frontier.contains(i))
    }

    pub fn is_on_path(&self, point: Point) -> bool {
        self.index(point).map_or(false, |i| self.on_path[i])
    }

    /// Expanded cells in the order they were expanded (the goal is never in here)
    pub fn visit_order(&self) -> &[Point] {
        &self.visit_order
    }

    pub fn frontier_points(&self) -> impl Iterator<Item = Point> + '_ {
        let columns = self.columns;
        self.frontier
            .iter()
            .map(move |i| Point::new(i % columns, i / columns))
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visit_order.len()
    }

    /// Number of cells taken from the frontier so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn heuristic_weight(&self) -> f64 {
        self.heuristic_weight
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    /// How `point` should be drawn given the grid and the search progress
    pub fn role_of(&self, grid: &Grid, point: Point) -> CellRole {
        if point == grid.start() {
            CellRole::Start
        } else if point == grid.goal() {
            CellRole::Goal
        } else if grid.is_blocked(point).unwrap_or(false) {
            CellRole::Wall
        } else if self.is_on_path(point) {
            CellRole::Path
        } else if self.is_visited(point) {
            CellRole::Visited
        } else if self.in_frontier(point) {
            CellRole::Frontier
        } else {
            CellRole::Empty
        }
    }
}
