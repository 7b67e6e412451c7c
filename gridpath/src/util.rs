use image::{DynamicImage, GenericImageView};

use crate::{
    grid::{Cell, Grid},
    Error, Result,
};

/// Builds a grid from a black and white image: dark pixels (red channel below
/// 128) are walls, everything else is a free cell of weight 1.
///
/// The start is placed on the first free cell in row order and the goal on
/// the last one.
pub fn parse_img(img: &DynamicImage) -> Result<Grid> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    if width == 0 || height == 0 {
        return Err(Error::EmptyGrid {
            columns: width,
            rows: height,
        });
    }

    let mut cells = vec![Cell::default(); width * height];

    for row in 0..height {
        for col in 0..width {
            let p = img.get_pixel(col as u32, row as u32);
            cells[row * width + col].blocked = p.0[0] < 128;
        }
    }

    let mut grid = Grid::from_cells(height, width, cells);

    let mut free = grid.points().filter(|p| !grid.cell_at(grid.idx(*p)).blocked);
    let first = free.next().ok_or(Error::NoFreeCell)?;
    let last = free.last().unwrap_or(first);

    grid.set_start(first)?;
    grid.set_goal(last)?;
    Ok(grid)
}
