use nalgebra::{Point2, Vector3};
use tracing::{debug, warn};

use crate::error::{GridError, Result};

/// A real-valued coordinate in image pixel space (y grows downward)
pub type Point = Point2<f64>;

/// Infinite line through two points, used for grid boundary lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Homogeneous line parameters (a, b, c) with a·x + b·y + c = 0
    pub fn homogeneous(&self) -> Vector3<f64> {
        self.start.to_homogeneous().cross(&self.end.to_homogeneous())
    }

    /// Intersect two infinite lines
    ///
    /// The cross product of the homogeneous line parameters gives the
    /// intersection in homogeneous form; its last component is the 2x2
    /// determinant of the line directions and is zero exactly when the lines
    /// are parallel (or one of them is degenerate).
    pub fn intersect(&self, other: &Line) -> Result<Point> {
        let p = self.homogeneous().cross(&other.homogeneous());
        if p.z == 0.0 {
            return Err(GridError::DegenerateGeometry);
        }
        Ok(Point::new(p.x / p.z, p.y / p.z))
    }
}

/// Semantic corner slots of a quadrilateral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Quadrant of `p` relative to `center`
    ///
    /// Strict comparisons on both axes; anything not strictly in one of the
    /// first three quadrants lands in `TopRight`.
    pub fn classify(p: &Point, center: &Point) -> Self {
        if p.x > center.x && p.y > center.y {
            Corner::BottomRight
        } else if p.x < center.x && p.y > center.y {
            Corner::BottomLeft
        } else if p.x < center.x && p.y < center.y {
            Corner::TopLeft
        } else {
            Corner::TopRight
        }
    }
}

/// Four points in fixed semantic order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl Quad {
    /// Corners in winding order: top-left, bottom-left, bottom-right, top-right
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.bottom_left,
            self.bottom_right,
            self.top_right,
        ]
    }
}

/// Arithmetic mean of a non-empty point set
pub fn centroid(points: &[Point]) -> Point {
    let n = points.len().max(1) as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Absolute enclosed area of a closed polygon (shoelace formula)
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice.abs() / 2.0
}

/// Axis-aligned bounding rectangle of integer pixel positions, as its four
/// corners in the order top-left, top-right, bottom-right, bottom-left
///
/// The extent is inclusive, so the far edges sit one pixel past the largest
/// coordinate.
pub fn bounding_rect(points: &[Point]) -> Option<[Point; 4]> {
    if points.is_empty() {
        return None;
    }
    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min).floor();
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max).floor() + 1.0;
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min).floor();
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max).floor() + 1.0;

    Some([
        Point::new(min_x, min_y),
        Point::new(max_x, min_y),
        Point::new(max_x, max_y),
        Point::new(min_x, max_y),
    ])
}

/// Assign four corners to their semantic slots by quadrant around the centroid
///
/// Independent of input order. If two corners fall into the same quadrant the
/// later one wins, and the resulting empty slot is reported as an unclear
/// boundary.
pub fn order_corners(corners: &[Point; 4]) -> Result<Quad> {
    let center = centroid(corners);
    let mut slots: [Option<Point>; 4] = [None; 4];

    for p in corners {
        let idx = match Corner::classify(p, &center) {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        };
        slots[idx] = Some(*p);
    }

    match slots {
        [Some(top_left), Some(top_right), Some(bottom_left), Some(bottom_right)] => Ok(Quad {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }),
        _ => Err(GridError::BoundaryUnclear {
            corners: slots.iter().flatten().count(),
        }),
    }
}

/// Reduce an approximated boundary polygon to an ordered quadrilateral
///
/// Fewer than four vertices is fatal. More than four falls back to the
/// bounding rectangle of all vertices.
pub fn normalize_corners(polygon: &[Point]) -> Result<Quad> {
    let corners: [Point; 4] = match polygon.len() {
        n if n < 4 => return Err(GridError::BoundaryUnclear { corners: n }),
        4 => [polygon[0], polygon[1], polygon[2], polygon[3]],
        n => {
            warn!(
                vertices = n,
                "boundary polygon has more than 4 vertices, using its bounding rectangle"
            );
            bounding_rect(polygon).ok_or(GridError::BoundaryUnclear { corners: 0 })?
        }
    };

    let quad = order_corners(&corners)?;
    debug!(
        tl = ?(quad.top_left.x, quad.top_left.y),
        tr = ?(quad.top_right.x, quad.top_right.y),
        bl = ?(quad.bottom_left.x, quad.bottom_left.y),
        br = ?(quad.bottom_right.x, quad.bottom_right.y),
        "ordered grid corners"
    );
    Ok(quad)
}
