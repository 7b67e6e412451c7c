use thiserror::Error;

use crate::grid::Point;

#[derive(Error, Debug)]
pub enum Error {
    #[error("point {point} is outside the {columns}x{rows} grid")]
    OutOfBounds {
        point: Point,
        columns: usize,
        rows: usize,
    },

    #[error("grid dimensions must be non-zero, got {columns}x{rows}")]
    EmptyGrid { columns: usize, rows: usize },

    #[error("cell {0} is a wall")]
    Blocked(Point),

    #[error("invalid cell weight {0}: weights must be finite and non-negative")]
    InvalidWeight(f64),

    #[error("the grid cannot be edited while a search is running")]
    SearchRunning,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid grid layout: {0}")]
    InvalidLayout(String),

    #[error("invalid point {0:?}, expected \"col,row\"")]
    InvalidPoint(String),

    #[error("image does not contain a single free cell")]
    NoFreeCell,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
