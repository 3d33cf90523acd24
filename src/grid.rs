use tracing::debug;

use crate::error::{GridError, Result};
use crate::geometry::{Line, Point, Quad};

/// Number of rows and columns the boundary is partitioned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: u32,
    pub cols: u32,
}

impl GridShape {
    pub fn new(rows: u32, cols: u32) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidShape { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// Row-major matrix of perspective-following cell quadrilaterals
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    shape: GridShape,
    cells: Vec<Quad>,
}

impl Grid {
    pub fn cells(&self) -> &[Quad] {
        &self.cells
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Quad> {
        if row >= self.shape.rows || col >= self.shape.cols {
            return None;
        }
        self.cells.get((row * self.shape.cols + col) as usize)
    }
}

/// Point at `step / steps` of the way from `from` to `to`, floored to whole pixels
fn lerp_floor(from: Point, to: Point, step: u32, steps: u32) -> Point {
    let (i, n) = (step as f64, steps as f64);
    Point::new(
        (from.x + (to.x - from.x) * i / n).floor(),
        (from.y + (to.y - from.y) * i / n).floor(),
    )
}

/// Boundary lines obtained by interpolating matching points on two opposite edges
fn boundary_lines(a: (Point, Point), b: (Point, Point), steps: u32) -> Vec<Line> {
    (0..=steps)
        .map(|i| Line::new(lerp_floor(a.0, a.1, i, steps), lerp_floor(b.0, b.1, i, steps)))
        .collect()
}

/// Partition a quadrilateral into `rows x cols` cells
///
/// Row lines join matching points on the left and right edges, column lines
/// join matching points on the top and bottom edges. Every cell corner is the
/// intersection of one row line with one column line, so the cells follow the
/// boundary's perspective distortion instead of being axis aligned.
pub fn interpolate_grid(quad: &Quad, shape: GridShape) -> Result<Grid> {
    let row_lines = boundary_lines(
        (quad.top_left, quad.bottom_left),
        (quad.top_right, quad.bottom_right),
        shape.rows,
    );
    let col_lines = boundary_lines(
        (quad.top_left, quad.top_right),
        (quad.bottom_left, quad.bottom_right),
        shape.cols,
    );

    let mut cells = Vec::with_capacity(shape.cell_count());
    for r in 0..shape.rows as usize {
        for c in 0..shape.cols as usize {
            let (row, next_row) = (&row_lines[r], &row_lines[r + 1]);
            let (col, next_col) = (&col_lines[c], &col_lines[c + 1]);
            cells.push(Quad {
                top_left: row.intersect(col)?,
                bottom_left: next_row.intersect(col)?,
                bottom_right: next_row.intersect(next_col)?,
                top_right: row.intersect(next_col)?,
            });
        }
    }

    debug!(rows = shape.rows, cols = shape.cols, cells = cells.len(), "interpolated grid");
    Ok(Grid { shape, cells })
}
