use image::RgbaImage;
use tracing::debug;

use crate::detection::{BoundaryDetector, ContourDetector};
use crate::error::Result;
use crate::geometry::{normalize_corners, Point, Quad};
use crate::grid::{interpolate_grid, Grid, GridShape};
use crate::raster::Raster;
use crate::transform::{crop_and_orient, reorient_cells};

/// Everything located in an image before any pixels are moved
#[derive(Debug, Clone)]
pub struct GridLayout {
    /// Approximated boundary polygon as returned by the detector
    pub polygon: Vec<Point>,
    /// Ordered outer corners of the grid
    pub quad: Quad,
    pub grid: Grid,
}

/// Detect the grid boundary and partition it into cells
pub fn analyze<R, D>(detector: &D, image: &R, shape: GridShape) -> Result<GridLayout>
where
    R: Raster,
    D: BoundaryDetector<R>,
{
    let polygon = detector.detect(image);
    debug!(vertices = polygon.len(), "detected boundary polygon");

    let quad = normalize_corners(&polygon)?;
    let grid = interpolate_grid(&quad, shape)?;
    Ok(GridLayout {
        polygon,
        quad,
        grid,
    })
}

/// Reorient every cell of `layout` and crop the result to the grid extent
pub fn render<R: Raster>(image: &R, layout: &GridLayout) -> Result<R> {
    let composited = reorient_cells(image, &layout.grid);
    crop_and_orient(&composited, &layout.quad)
}

/// Full pipeline with an explicit detector
pub fn process_with<R, D>(detector: &D, image: &R, shape: GridShape) -> Result<R>
where
    R: Raster,
    D: BoundaryDetector<R>,
{
    let layout = analyze(detector, image, shape)?;
    render(image, &layout)
}

/// Locate the grid in `image`, split it into `rows x cols` cells, rotate each
/// cell in place and return the cropped, reoriented grid
pub fn process_image(image: &RgbaImage, rows: u32, cols: u32) -> Result<RgbaImage> {
    let shape = GridShape::new(rows, cols)?;
    process_with(&ContourDetector::default(), image, shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use image::{GrayImage, Luma};

    /// Detector that reports a fixed polygon regardless of the image
    struct FixedPolygon(Vec<Point>);

    impl<R> BoundaryDetector<R> for FixedPolygon {
        fn detect(&self, _image: &R) -> Vec<Point> {
            self.0.clone()
        }
    }

    fn pts(coords: &[(f64, f64)]) -> FixedPolygon {
        FixedPolygon(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn labelled(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 13) % 251) as u8]))
    }

    #[test]
    fn test_three_corners_is_unclear() {
        let detector = pts(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let result = process_with(&detector, &labelled(20, 20), GridShape::new(2, 2).unwrap());
        assert_eq!(result, Err(GridError::BoundaryUnclear { corners: 3 }));
    }

    #[test]
    fn test_no_boundary_is_unclear() {
        let detector = FixedPolygon(Vec::new());
        let result = process_with(&detector, &labelled(20, 20), GridShape::new(1, 1).unwrap());
        assert_eq!(result, Err(GridError::BoundaryUnclear { corners: 0 }));
    }

    #[test]
    fn test_analyze_orders_quad() {
        let detector = pts(&[(60.0, 2.0), (4.0, 58.0), (2.0, 4.0), (58.0, 60.0)]);
        let layout = analyze(&detector, &labelled(64, 64), GridShape::new(3, 2).unwrap()).unwrap();
        assert_eq!(layout.polygon.len(), 4);
        assert_eq!(layout.quad.top_left, Point::new(2.0, 4.0));
        assert_eq!(layout.quad.bottom_right, Point::new(58.0, 60.0));
        assert_eq!(layout.grid.cells().len(), 6);
    }

    #[test]
    fn test_output_is_grid_extent_rotated() {
        let detector = pts(&[(4.0, 2.0), (44.0, 2.0), (44.0, 22.0), (4.0, 22.0)]);
        let out = process_with(&detector, &labelled(50, 30), GridShape::new(2, 4).unwrap()).unwrap();
        // 40x20 extent, rotated counter-clockwise
        assert_eq!(out.dimensions(), (20, 40));
    }

    #[test]
    fn test_single_square_cell_round_trips() {
        // A single square cell is rotated clockwise, then the crop rotated back
        let src = labelled(30, 30);
        let detector = pts(&[(5.0, 5.0), (25.0, 5.0), (25.0, 25.0), (5.0, 25.0)]);
        let out = process_with(&detector, &src, GridShape::new(1, 1).unwrap()).unwrap();
        assert_eq!(out.dimensions(), (20, 20));
        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(out.get_pixel(x, y), src.get_pixel(5 + x, 5 + y));
            }
        }
    }

    #[test]
    fn test_render_leaves_input_untouched() {
        let src = labelled(30, 30);
        let before = src.clone();
        let detector = pts(&[(0.0, 0.0), (30.0, 0.0), (30.0, 30.0), (0.0, 30.0)]);
        let layout = analyze(&detector, &src, GridShape::new(3, 3).unwrap()).unwrap();
        render(&src, &layout).unwrap();
        assert_eq!(src, before);
    }

    #[test]
    fn test_process_image_rejects_zero_rows() {
        let img = RgbaImage::new(10, 10);
        assert_eq!(
            process_image(&img, 0, 2),
            Err(GridError::InvalidShape { rows: 0, cols: 2 })
        );
    }
}
