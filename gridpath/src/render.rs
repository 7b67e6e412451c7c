use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Point};

/// What a cell currently shows. Presentations map roles to colors or glyphs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CellRole {
    Start,
    Goal,
    Wall,
    Frontier,
    Visited,
    Path,
    Empty,
}

impl CellRole {
    pub fn glyph(self) -> char {
        match self {
            CellRole::Start => 'S',
            CellRole::Goal => 'G',
            CellRole::Wall => '#',
            CellRole::Frontier => 'o',
            CellRole::Visited => 'x',
            CellRole::Path => '*',
            CellRole::Empty => '.',
        }
    }
}

/// Something search progress can be drawn on
pub trait Surface {
    fn render(&mut self, point: Point, role: CellRole);
}

impl<F: FnMut(Point, CellRole)> Surface for F {
    fn render(&mut self, point: Point, role: CellRole) {
        self(point, role)
    }
}

/// A retained buffer of cell roles, updated incrementally through [`Surface`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    rows: usize,
    columns: usize,
    roles: Vec<CellRole>,
}

impl Canvas {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            roles: vec![CellRole::Empty; rows * columns],
        }
    }

    /// A blank canvas with the dimensions of `grid`
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.rows(), grid.columns())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn role(&self, point: Point) -> Option<CellRole> {
        if point.col < self.columns && point.row < self.rows {
            Some(self.roles[point.row * self.columns + point.col])
        } else {
            None
        }
    }

    pub fn count(&self, role: CellRole) -> usize {
        self.roles.iter().filter(|r| **r == role).count()
    }
}

impl Surface for Canvas {
    fn render(&mut self, point: Point, role: CellRole) {
        if point.col < self.columns && point.row < self.rows {
            self.roles[point.row * self.columns + point.col] = role;
        }
    }
}

impl Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.roles.chunks(self.columns.max(1)) {
            for role in row {
                write!(f, "{}", role.glyph())?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
