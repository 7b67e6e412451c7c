use std::{fmt::Display, str::FromStr};

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Upper (exclusive) bound of randomly generated cell weights
pub const MAX_RANDOM_WEIGHT: f64 = 10.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub col: usize,
    pub row: usize,
}

impl Point {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

impl FromStr for Point {
    type Err = Error;

    /// Parses `"col,row"`
    fn from_str(s: &str) -> Result<Self> {
        let (col, row) = s
            .split_once(',')
            .ok_or_else(|| Error::InvalidPoint(s.to_string()))?;

        let col = col
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPoint(s.to_string()))?;
        let row = row
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPoint(s.to_string()))?;

        Ok(Point { col, row })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// The order in which neighbors are cached, and therefore expanded
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Moves one cell in this direction, returns `None` when leaving the grid
    fn step(self, point: Point, columns: usize, rows: usize) -> Option<Point> {
        match self {
            Direction::Up if point.row > 0 => Some(Point::new(point.col, point.row - 1)),
            Direction::Right if point.col + 1 < columns => {
                Some(Point::new(point.col + 1, point.row))
            }
            Direction::Down if point.row + 1 < rows => Some(Point::new(point.col, point.row + 1)),
            Direction::Left if point.col > 0 => Some(Point::new(point.col - 1, point.row)),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub blocked: bool,
    /// Cost charged when leaving this cell towards one of its neighbors
    pub weight: f64,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            blocked: false,
            weight: 1.0,
        }
    }
}

/// How the weights of a freshly built grid are chosen
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WeightMode {
    Uniform { weight: f64 },
    /// Uniformly distributed in `[0, MAX_RANDOM_WEIGHT)`. A fixed seed gives
    /// the same weights on every reset.
    Random { seed: Option<u64> },
}

impl Default for WeightMode {
    fn default() -> Self {
        WeightMode::Uniform { weight: 1.0 }
    }
}

impl WeightMode {
    pub fn is_random(&self) -> bool {
        matches!(self, WeightMode::Random { .. })
    }

    fn generate(&self, count: usize) -> Vec<f64> {
        match self {
            WeightMode::Uniform { weight } => vec![*weight; count],
            WeightMode::Random { seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(*seed),
                    None => StdRng::from_entropy(),
                };
                (0..count)
                    .map(|_| rng.gen_range(0.0..MAX_RANDOM_WEIGHT))
                    .collect()
            }
        }
    }
}

/// The (at most four) orthogonal neighbors of a cell, up/right/down/left
#[derive(Copy, Clone, Debug)]
struct Adjacency {
    points: [Point; 4],
    len: u8,
}

impl Adjacency {
    fn as_slice(&self) -> &[Point] {
        &self.points[..self.len as usize]
    }
}

/// A rectangular lattice of cells stored row by row
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
    adjacency: Vec<Adjacency>,
    start: Point,
    goal: Point,
}

impl Grid {
    /// Creates an open grid, start in the top left and goal in the bottom right corner
    pub fn new(rows: usize, columns: usize, weights: &WeightMode) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(Error::EmptyGrid { columns, rows });
        }

        let cells = weights
            .generate(rows * columns)
            .into_iter()
            .map(|weight| Cell {
                blocked: false,
                weight,
            })
            .collect();

        Ok(Self::from_cells(rows, columns, cells))
    }

    /// Builds the grid in two passes: all cells first, the neighbor lists afterwards
    pub(crate) fn from_cells(rows: usize, columns: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), rows * columns);

        let mut grid = Self {
            rows,
            columns,
            cells,
            adjacency: Vec::new(),
            start: Point::new(0, 0),
            goal: Point::new(columns - 1, rows - 1),
        };
        grid.adjacency = grid.points().map(|p| grid.adjacency_of(p)).collect();
        grid
    }

    fn adjacency_of(&self, point: Point) -> Adjacency {
        let mut adjacency = Adjacency {
            points: [point; 4],
            len: 0,
        };
        for direction in Direction::ALL {
            if let Some(neighbor) = direction.step(point, self.columns, self.rows) {
                adjacency.points[adjacency.len as usize] = neighbor;
                adjacency.len += 1;
            }
        }
        adjacency
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.col < self.columns && point.row < self.rows
    }

    /// Checked conversion from a point to its index in the cell storage
    pub fn index_of(&self, point: Point) -> Result<usize> {
        if self.contains(point) {
            Ok(self.idx(point))
        } else {
            Err(Error::OutOfBounds {
                point,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    pub(crate) fn idx(&self, point: Point) -> usize {
        point.row * self.columns + point.col
    }

    pub fn point_at(&self, index: usize) -> Point {
        Point::new(index % self.columns, index / self.columns)
    }

    /// All points in row-major order
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let columns = self.columns;
        (0..self.rows * self.columns).map(move |i| Point::new(i % columns, i / columns))
    }

    pub fn cell(&self, point: Point) -> Result<&Cell> {
        let index = self.index_of(point)?;
        Ok(&self.cells[index])
    }

    pub(crate) fn cell_at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn is_blocked(&self, point: Point) -> Result<bool> {
        Ok(self.cell(point)?.blocked)
    }

    pub fn weight(&self, point: Point) -> Result<f64> {
        Ok(self.cell(point)?.weight)
    }

    pub fn set_weight(&mut self, point: Point, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidWeight(weight));
        }
        let index = self.index_of(point)?;
        self.cells[index].weight = weight;
        Ok(())
    }

    /// Replaces every weight according to `weights`, walls are kept
    pub fn apply_weights(&mut self, weights: &WeightMode) {
        let generated = weights.generate(self.cells.len());
        for (cell, weight) in self.cells.iter_mut().zip(generated) {
            cell.weight = weight;
        }
    }

    /// The cached orthogonal neighbors, in up/right/down/left order.
    /// Walls are included, adjacency never changes.
    pub fn neighbors(&self, point: Point) -> Result<&[Point]> {
        let index = self.index_of(point)?;
        Ok(self.adjacency[index].as_slice())
    }

    pub(crate) fn neighbors_at(&self, index: usize) -> &[Point] {
        self.adjacency[index].as_slice()
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn is_endpoint(&self, point: Point) -> bool {
        point == self.start || point == self.goal
    }

    pub fn set_start(&mut self, point: Point) -> Result<()> {
        self.check_endpoint(point)?;
        self.start = point;
        Ok(())
    }

    pub fn set_goal(&mut self, point: Point) -> Result<()> {
        self.check_endpoint(point)?;
        self.goal = point;
        Ok(())
    }

    fn check_endpoint(&self, point: Point) -> Result<()> {
        if self.is_blocked(point)? {
            return Err(Error::Blocked(point));
        }
        Ok(())
    }

    /// Flips the wall state of a cell and returns the new state.
    /// Start and goal can never become walls, toggling them does nothing.
    pub fn toggle_wall(&mut self, point: Point) -> Result<bool> {
        let index = self.index_of(point)?;
        let blocked = !self.cells[index].blocked;
        self.set_wall(point, blocked)
    }

    /// Sets the wall state of a cell and returns the resulting state
    pub fn set_wall(&mut self, point: Point, blocked: bool) -> Result<bool> {
        let index = self.index_of(point)?;
        if self.is_endpoint(point) {
            debug!("ignoring wall edit on endpoint {}", point);
            return Ok(self.cells[index].blocked);
        }
        self.cells[index].blocked = blocked;
        Ok(blocked)
    }

    pub fn clear_walls(&mut self) {
        for cell in &mut self.cells {
            cell.blocked = false;
        }
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|c| c.blocked).count()
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.columns {
                let point = Point::new(col, row);
                let c = if point == self.start {
                    'S'
                } else if point == self.goal {
                    'G'
                } else if self.cells[self.idx(point)].blocked {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl FromStr for Grid {
    type Err = Error;

    /// Parses a text layout, one line per row: `#` wall, `.` free cell of
    /// weight 1, `0`-`9` free cell of that weight, `S` start and `G` goal.
    /// Without `S` or `G` the corners are used.
    fn from_str(s: &str) -> Result<Self> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let rows = lines.len();
        let columns = lines.first().map_or(0, |l| l.chars().count());
        if rows == 0 || columns == 0 {
            return Err(Error::EmptyGrid { columns, rows });
        }

        let mut cells = Vec::with_capacity(rows * columns);
        let mut start = None;
        let mut goal = None;

        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != columns {
                return Err(Error::InvalidLayout(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    columns
                )));
            }
            for (col, c) in line.chars().enumerate() {
                let cell = match c {
                    '#' => Cell {
                        blocked: true,
                        weight: 1.0,
                    },
                    '.' => Cell::default(),
                    'S' | 'G' => {
                        let slot = if c == 'S' { &mut start } else { &mut goal };
                        if slot.replace(Point::new(col, row)).is_some() {
                            return Err(Error::InvalidLayout(format!("more than one '{}'", c)));
                        }
                        Cell::default()
                    }
                    d if d.is_ascii_digit() => Cell {
                        blocked: false,
                        weight: f64::from(d as u8 - b'0'),
                    },
                    other => {
                        return Err(Error::InvalidLayout(format!(
                            "unexpected character '{}' at ({}, {})",
                            other, col, row
                        )))
                    }
                };
                cells.push(cell);
            }
        }

        let mut grid = Grid::from_cells(rows, columns, cells);
        if let Some(start) = start {
            grid.set_start(start)?;
        }
        if let Some(goal) = goal {
            grid.set_goal(goal)?;
        }
        if grid.is_blocked(grid.start)? || grid.is_blocked(grid.goal)? {
            return Err(Error::InvalidLayout(
                "start and goal must not be walls".to_string(),
            ));
        }

        Ok(grid)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_empty_grid_rejected() {
        assert!(matches!(
            Grid::new(0, 5, &WeightMode::default()),
            Err(Error::EmptyGrid { rows: 0, columns: 5 })
        ));
        assert!(matches!(
            Grid::new(5, 0, &WeightMode::default()),
            Err(Error::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_default_endpoints() {
        let grid = Grid::new(4, 6, &WeightMode::default()).unwrap();
        assert_eq!(grid.start(), Point::new(0, 0));
        assert_eq!(grid.goal(), Point::new(5, 3));
        assert_eq!(grid.len(), 24);
        assert!(grid.points().all(|p| grid.weight(p).unwrap() == 1.0));
    }

    #[test]
    fn test_neighbor_order() {
        let grid = Grid::new(3, 3, &WeightMode::default()).unwrap();

        assert_eq!(
            grid.neighbors(Point::new(1, 1)).unwrap(),
            &[
                Point::new(1, 0),
                Point::new(2, 1),
                Point::new(1, 2),
                Point::new(0, 1)
            ]
        );
        // corners only have two neighbors
        assert_eq!(
            grid.neighbors(Point::new(0, 0)).unwrap(),
            &[Point::new(1, 0), Point::new(0, 1)]
        );
        assert_eq!(
            grid.neighbors(Point::new(2, 2)).unwrap(),
            &[Point::new(2, 1), Point::new(1, 2)]
        );
    }

    #[test]
    fn test_walls_keep_adjacency() {
        let mut grid = Grid::new(3, 3, &WeightMode::default()).unwrap();
        assert!(grid.toggle_wall(Point::new(1, 0)).unwrap());
        assert_eq!(grid.neighbors(Point::new(0, 0)).unwrap().len(), 2);
        assert!(!grid.toggle_wall(Point::new(1, 0)).unwrap());
        assert!(!grid.is_blocked(Point::new(1, 0)).unwrap());
    }

    #[test]
    fn test_endpoints_cannot_be_walls() {
        let mut grid = Grid::new(3, 3, &WeightMode::default()).unwrap();
        assert!(!grid.toggle_wall(grid.start()).unwrap());
        assert!(!grid.set_wall(grid.goal(), true).unwrap());
        assert_eq!(grid.wall_count(), 0);

        grid.set_wall(Point::new(1, 1), true).unwrap();
        assert!(matches!(
            grid.set_start(Point::new(1, 1)),
            Err(Error::Blocked(_))
        ));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::new(2, 3, &WeightMode::default()).unwrap();
        let outside = Point::new(3, 0);

        assert!(matches!(
            grid.toggle_wall(outside),
            Err(Error::OutOfBounds {
                columns: 3,
                rows: 2,
                ..
            })
        ));
        assert!(grid.neighbors(Point::new(0, 2)).is_err());
        assert!(grid.set_goal(outside).is_err());
        assert!(grid.cell(outside).is_err());
    }

    #[test]
    fn test_random_weights() {
        let mode = WeightMode::Random { seed: Some(17) };
        let a = Grid::new(10, 10, &mode).unwrap();
        let b = Grid::new(10, 10, &mode).unwrap();

        for p in a.points() {
            let w = a.weight(p).unwrap();
            assert!((0.0..MAX_RANDOM_WEIGHT).contains(&w));
            assert_eq!(w, b.weight(p).unwrap());
        }
    }

    #[test]
    fn test_apply_weights_keeps_walls() {
        let mut grid: Grid = "S.#\n#..\n..G".parse().unwrap();
        grid.apply_weights(&WeightMode::Random { seed: Some(5) });

        assert_eq!(grid.wall_count(), 2);
        assert!(grid.is_blocked(Point::new(2, 0)).unwrap());
        assert!(grid.is_blocked(Point::new(0, 1)).unwrap());
        assert!(grid.points().any(|p| grid.weight(p).unwrap() != 1.0));

        let reference = Grid::new(3, 3, &WeightMode::Random { seed: Some(5) }).unwrap();
        for p in grid.points() {
            assert_eq!(grid.weight(p).unwrap(), reference.weight(p).unwrap());
        }

        grid.apply_weights(&WeightMode::default());
        assert!(grid.points().all(|p| grid.weight(p).unwrap() == 1.0));
        assert_eq!(grid.wall_count(), 2);
    }

    #[test]
    fn test_invalid_weight() {
        let mut grid = Grid::new(2, 2, &WeightMode::default()).unwrap();
        assert!(matches!(
            grid.set_weight(Point::new(0, 0), -1.0),
            Err(Error::InvalidWeight(_))
        ));
        assert!(grid.set_weight(Point::new(0, 0), f64::NAN).is_err());
        grid.set_weight(Point::new(0, 0), 0.0).unwrap();
    }

    #[test]
    fn test_layout_roundtrip() {
        let layout = "S..#\n.#.#\n...G\n";
        let grid: Grid = layout.parse().unwrap();

        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.wall_count(), 3);
        assert_eq!(grid.goal(), Point::new(3, 2));
        assert_eq!(grid.to_string(), layout);
    }

    #[test]
    fn test_layout_weights_and_errors() {
        let grid: Grid = "S5\n0G".parse().unwrap();
        assert_eq!(grid.weight(Point::new(1, 0)).unwrap(), 5.0);
        assert_eq!(grid.weight(Point::new(0, 1)).unwrap(), 0.0);

        assert!(matches!(
            "S..\n..".parse::<Grid>(),
            Err(Error::InvalidLayout(_))
        ));
        assert!(matches!(
            "SS.\n..G".parse::<Grid>(),
            Err(Error::InvalidLayout(_))
        ));
        assert!(matches!(
            "S.x\n..G".parse::<Grid>(),
            Err(Error::InvalidLayout(_))
        ));
        // default goal in the corner is a wall
        assert!("S.\n.#".parse::<Grid>().is_err());
        assert!("".parse::<Grid>().is_err());
    }

    #[test]
    fn test_parse_point() {
        assert_eq!("3,4".parse::<Point>().unwrap(), Point::new(3, 4));
        assert_eq!(" 0 , 12 ".parse::<Point>().unwrap(), Point::new(0, 12));
        assert!("3".parse::<Point>().is_err());
        assert!("a,b".parse::<Point>().is_err());
    }
}
