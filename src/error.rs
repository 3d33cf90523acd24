use thiserror::Error;

/// Failures surfaced by the grid pipeline
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    /// Fewer than four usable corners were recovered from the boundary
    #[error("grid boundary unclear: found {corners} usable corner(s), need 4")]
    BoundaryUnclear { corners: usize },

    /// Two grid lines are parallel, so a cell corner cannot be computed
    #[error("lines do not intersect")]
    DegenerateGeometry,

    /// The grid extent does not overlap the image
    #[error("grid extent lies outside the image")]
    EmptyGridExtent,

    #[error("invalid grid shape {rows}x{cols}: rows and cols must both be at least 1")]
    InvalidShape { rows: u32, cols: u32 },

    #[error("invalid detection parameters: {0}")]
    InvalidParams(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
