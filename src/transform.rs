use tracing::{debug, warn};

use crate::error::{GridError, Result};
use crate::geometry::Quad;
use crate::grid::Grid;
use crate::raster::{Raster, Region};

/// Axis-aligned footprint of a cell, clipped to the image
///
/// Only the top-left and bottom-right corners are used, so the perspective
/// shape of the cell is not modelled here.
pub fn cell_footprint(cell: &Quad, bounds: (u32, u32)) -> Option<Region> {
    let (tl, br) = (cell.top_left, cell.bottom_right);
    Region::clipped(
        tl.x as i64,
        tl.y as i64,
        (br.x - tl.x) as i64,
        (br.y - tl.y) as i64,
        bounds,
    )
}

/// Top-left position that centres a `size` buffer on `region`, kept inside `bounds`
fn centered_placement(region: Region, size: (u32, u32), bounds: (u32, u32)) -> (i64, i64) {
    let (w, h) = (size.0 as f64, size.1 as f64);
    let (cx, cy) = region.center();
    let x = cx - w / 2.0;
    let y = cy - h / 2.0;
    let x = x.min(bounds.0 as f64 - w).max(0.0).floor();
    let y = y.min(bounds.1 as f64 - h).max(0.0).floor();
    (x as i64, y as i64)
}

/// Rotate the content of every grid cell 90 degrees clockwise in place
///
/// Each cell is read from the untouched `source` and written into a working
/// copy, so the result does not depend on cell order.
pub fn reorient_cells<R: Raster>(source: &R, grid: &Grid) -> R {
    let bounds = source.size();
    let mut working = source.clone();

    for (index, cell) in grid.cells().iter().enumerate() {
        let Some(region) = cell_footprint(cell, bounds) else {
            warn!(cell = index, "cell footprint is empty or off-image, leaving it unchanged");
            continue;
        };
        let rotated = source.crop(region).rotate_cw();
        let (x, y) = centered_placement(region, rotated.size(), bounds);
        working.paste(&rotated, x, y);
    }

    working
}

/// Crop to the grid extent (top-left to bottom-right corner) and rotate the
/// crop 90 degrees counter-clockwise
pub fn crop_and_orient<R: Raster>(image: &R, quad: &Quad) -> Result<R> {
    let (tl, br) = (quad.top_left, quad.bottom_right);
    let region = Region::clipped(
        tl.x as i64,
        tl.y as i64,
        (br.x - tl.x) as i64,
        (br.y - tl.y) as i64,
        image.size(),
    )
    .ok_or(GridError::EmptyGridExtent)?;

    debug!(?region, "cropping to grid extent");
    Ok(image.crop(region).rotate_ccw())
}
