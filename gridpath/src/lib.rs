pub mod config;
pub mod cost;
pub mod error;
pub mod find;
pub mod frontier;
pub mod grid;
pub mod render;
pub mod session;
pub mod util;

pub use config::{Config, Preset};
pub use cost::{heuristic, NodeRecord};
pub use error::{Error, Result};
pub use find::{PathFinder, PathFinderState, PathResult, SearchEvent};
pub use frontier::Frontier;
pub use grid::{Cell, Direction, Grid, Point, WeightMode};
pub use render::{Canvas, CellRole, Surface};
pub use session::{RunState, Session};
pub use util::parse_img;
