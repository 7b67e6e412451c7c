use std::collections::VecDeque;

use gridpath::{heuristic, Error, Grid, PathFinder, PathFinderState, Point, WeightMode};
use proptest::prelude::*;

fn open_grid(rows: usize, columns: usize) -> Grid {
    Grid::new(rows, columns, &WeightMode::default()).unwrap()
}

fn run(grid: &Grid, heuristic_weight: f64) -> PathFinder {
    let mut finder = PathFinder::new(grid, heuristic_weight);
    finder.finish(grid);
    finder
}

/// Number of moves on the shortest route, ignoring weights
fn bfs_distance(grid: &Grid) -> Option<usize> {
    let mut distance = vec![None; grid.len()];
    let mut queue = VecDeque::from([grid.start()]);
    distance[grid.index_of(grid.start()).unwrap()] = Some(0);

    while let Some(point) = queue.pop_front() {
        let d = distance[grid.index_of(point).unwrap()].unwrap();
        if point == grid.goal() {
            return Some(d);
        }
        for &n in grid.neighbors(point).unwrap() {
            let i = grid.index_of(n).unwrap();
            if !grid.is_blocked(n).unwrap() && distance[i].is_none() {
                distance[i] = Some(d + 1);
                queue.push_back(n);
            }
        }
    }
    None
}

/// Straightforward A* over a list that is stable-sorted by priority before
/// every expansion. Returns the expansion order and the path, if any.
fn sorted_list_search(grid: &Grid, heuristic_weight: f64) -> (Vec<Point>, Option<Vec<Point>>) {
    let index = |p: Point| grid.index_of(p).unwrap();
    let (start, goal) = (grid.start(), grid.goal());

    let mut cost = vec![f64::INFINITY; grid.len()];
    let mut priority = vec![f64::INFINITY; grid.len()];
    let mut previous: Vec<Option<Point>> = vec![None; grid.len()];
    let mut explored = vec![false; grid.len()];
    let mut order = Vec::new();

    cost[index(start)] = 0.0;
    priority[index(start)] = heuristic_weight * heuristic(start, goal);
    let mut open = vec![start];

    while !open.is_empty() {
        open.sort_by(|a, b| priority[index(*a)].total_cmp(&priority[index(*b)]));
        let current = open.remove(0);
        if current == goal {
            let mut path = vec![goal];
            while let Some(p) = previous[index(path[path.len() - 1])] {
                path.push(p);
            }
            path.reverse();
            return (order, Some(path));
        }

        explored[index(current)] = true;
        order.push(current);

        let next = cost[index(current)] + grid.weight(current).unwrap();
        for &n in grid.neighbors(current).unwrap() {
            let i = index(n);
            if grid.is_blocked(n).unwrap() || explored[i] {
                continue;
            }
            let queued = open.contains(&n);
            if !queued || next < cost[i] {
                cost[i] = next;
                priority[i] = next + heuristic_weight * heuristic(n, goal);
                previous[i] = Some(current);
                if !queued {
                    open.push(n);
                }
            }
        }
    }
    (order, None)
}

#[test]
fn test_open_grid_corner_to_corner() {
    for (rows, columns) in [(1, 1), (1, 8), (5, 5), (7, 12), (20, 3)] {
        let grid = open_grid(rows, columns);
        let finder = run(&grid, 1.0);

        assert_eq!(finder.state(), PathFinderState::PathFound);
        let result = finder.result().unwrap();
        assert_eq!(result.len(), (rows - 1) + (columns - 1) + 1);
        assert_eq!(result.path.first(), Some(&grid.start()));
        assert_eq!(result.path.last(), Some(&grid.goal()));
    }
}

#[test]
fn test_open_3x3() {
    let grid = open_grid(3, 3);
    let finder = run(&grid, 1.0);

    assert_eq!(finder.result().unwrap().total_cost, 4.0);
    assert!(finder.visited_len() <= 9);
}

#[test]
fn test_3x3_center_wall() -> Result<(), Error> {
    let mut grid = open_grid(3, 3);
    assert!(grid.toggle_wall(Point::new(1, 1))?);

    let finder = run(&grid, 1.0);
    let result = finder.result().unwrap();
    assert_eq!(result.len(), 5);
    assert_eq!(result.total_cost, 4.0);
    assert!(!result.path.contains(&Point::new(1, 1)));
    Ok(())
}

#[test]
fn test_start_walled_in() -> Result<(), Error> {
    let grid: Grid = "S.#...\n..#...\n###...\n.....G".parse()?;
    let finder = run(&grid, 1.0);

    assert_eq!(finder.state(), PathFinderState::Exhausted);
    // only the 2x2 pocket around the start
    assert_eq!(finder.visited_len(), 4);
    assert!(finder
        .visit_order()
        .iter()
        .all(|p| p.col < 2 && p.row < 2));
    Ok(())
}

#[test]
fn test_goal_isolated() -> Result<(), Error> {
    let grid: Grid = "S....\n.....\n...#.\n..#G#\n...#.".parse()?;
    let finder = run(&grid, 1.0);

    assert_eq!(finder.state(), PathFinderState::Exhausted);
    assert!(finder.result().is_none());
    assert_eq!(finder.frontier_len(), 0);
    assert!(!finder.is_visited(grid.goal()));
    Ok(())
}

#[test]
fn test_walls_on_endpoints_are_ignored() -> Result<(), Error> {
    let mut grid = open_grid(4, 4);
    assert!(!grid.toggle_wall(grid.start())?);
    assert!(!grid.set_wall(grid.goal(), true)?);
    assert_eq!(grid.wall_count(), 0);
    assert_eq!(run(&grid, 1.0).state(), PathFinderState::PathFound);
    Ok(())
}

#[test]
fn test_greedy_weight_still_finds_a_path() {
    let grid = Grid::new(30, 30, &WeightMode::Random { seed: Some(9) }).unwrap();

    let plain = run(&grid, 1.0);
    let greedy = run(&grid, 3.0);

    for finder in [plain, greedy] {
        assert_eq!(finder.state(), PathFinderState::PathFound);
        let result = finder.result().unwrap();
        assert_eq!(result.path.first(), Some(&Point::new(0, 0)));
        assert_eq!(result.path.last(), Some(&Point::new(29, 29)));
    }
}

fn layout(max_side: usize) -> impl Strategy<Value = Grid> {
    (1..=max_side, 1..=max_side)
        .prop_flat_map(|(rows, columns)| {
            (
                Just(rows),
                Just(columns),
                prop::collection::vec(prop::bool::weighted(0.3), rows * columns),
                prop::collection::vec(0.0..10.0f64, rows * columns),
            )
        })
        .prop_map(|(rows, columns, walls, weights)| {
            let mut grid = open_grid(rows, columns);
            let points: Vec<Point> = grid.points().collect();
            for ((point, wall), weight) in points.into_iter().zip(walls).zip(weights) {
                grid.set_weight(point, weight).unwrap();
                grid.set_wall(point, wall).unwrap();
            }
            grid
        })
}

fn uniform(mut grid: Grid) -> Grid {
    grid.apply_weights(&WeightMode::Uniform { weight: 1.0 });
    grid
}

/// Whole-number weights, so equal priorities are common
fn rounded(mut grid: Grid) -> Grid {
    let points: Vec<Point> = grid.points().collect();
    for point in points {
        let weight = grid.weight(point).unwrap().floor();
        grid.set_weight(point, weight).unwrap();
    }
    grid
}

proptest! {
    #[test]
    fn prop_uniform_cost_is_shortest(grid in layout(12).prop_map(uniform)) {
        let finder = run(&grid, 1.0);

        match bfs_distance(&grid) {
            Some(moves) => {
                prop_assert_eq!(finder.state(), PathFinderState::PathFound);
                let result = finder.result().unwrap();
                prop_assert_eq!(result.total_cost, moves as f64);
                prop_assert_eq!(result.len(), moves + 1);
            }
            None => {
                prop_assert_eq!(finder.state(), PathFinderState::Exhausted);
                prop_assert_eq!(finder.frontier_len(), 0);
            }
        }
    }

    #[test]
    fn prop_path_is_connected_and_priced(grid in layout(12)) {
        let finder = run(&grid, 3.0);

        if let Some(result) = finder.result() {
            for pair in result.path.windows(2) {
                prop_assert!(grid.neighbors(pair[0]).unwrap().contains(&pair[1]));
                prop_assert!(!grid.is_blocked(pair[1]).unwrap());
            }
            // every cell that is left behind is paid for, the goal is not
            let paid: f64 = result.path[..result.len() - 1]
                .iter()
                .map(|p| grid.weight(*p).unwrap())
                .sum();
            prop_assert!((paid - result.total_cost).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_costs_never_increase(grid in layout(10)) {
        let mut finder = PathFinder::new(&grid, 1.0);
        let mut costs: Vec<f64> = grid
            .points()
            .map(|p| finder.record(p).unwrap().cost_from_start)
            .collect();

        while !finder.step(&grid).is_done() {
            for (i, point) in grid.points().enumerate() {
                let cost = finder.record(point).unwrap().cost_from_start;
                prop_assert!(cost <= costs[i]);
                costs[i] = cost;
            }
        }
    }

    #[test]
    fn prop_expands_like_a_sorted_list(
        grid in layout(10),
        flat in any::<bool>(),
        heuristic_weight in prop::sample::select(vec![1.0, 3.0]),
    ) {
        let grid = if flat { uniform(grid) } else { rounded(grid) };
        let finder = run(&grid, heuristic_weight);
        let (order, path) = sorted_list_search(&grid, heuristic_weight);

        prop_assert_eq!(finder.visit_order(), order.as_slice());
        prop_assert_eq!(finder.result().map(|r| r.path.clone()), path);
    }

    #[test]
    fn prop_runs_are_deterministic(grid in layout(10), heuristic_weight in 1.0..4.0f64) {
        let first = run(&grid, heuristic_weight);
        let second = run(&grid, heuristic_weight);

        prop_assert_eq!(first.visit_order(), second.visit_order());
        prop_assert_eq!(first.result(), second.result());
        prop_assert_eq!(first.state(), second.state());
    }
}
