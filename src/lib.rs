pub mod cli;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod overlay;
pub mod pipeline;
pub mod raster;
pub mod transform;

pub use cli::Cli;
pub use detection::{BoundaryDetector, ContourDetector, DetectionParams};
pub use error::GridError;
pub use geometry::{normalize_corners, order_corners, Line, Point, Quad};
pub use grid::{interpolate_grid, Grid, GridShape};
pub use overlay::draw_layout;
pub use pipeline::{analyze, process_image, process_with, render, GridLayout};
pub use raster::{Raster, Region};
pub use transform::{crop_and_orient, reorient_cells};
