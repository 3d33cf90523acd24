use image::{imageops, GrayImage, ImageBuffer, Luma, Pixel};
use imageproc::contours::find_contours;
use imageproc::filter::separable_filter_equal;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point as PixelPoint;
use tracing::debug;

use crate::error::{GridError, Result};
use crate::geometry::{polygon_area, Point};

/// Tunables of the boundary detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Side of the local neighbourhood used for the threshold (odd)
    pub block_size: u32,
    /// Subtracted from the local mean before comparing
    pub offset: f32,
    /// Polygon approximation tolerance as a fraction of the contour length
    pub epsilon_ratio: f64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            block_size: 57,
            offset: 5.0,
            epsilon_ratio: 0.01,
        }
    }
}

impl DetectionParams {
    pub fn validate(&self) -> Result<()> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(GridError::InvalidParams(format!(
                "block size must be odd and at least 3, got {}",
                self.block_size
            )));
        }
        if self.epsilon_ratio.is_nan() || self.epsilon_ratio <= 0.0 {
            return Err(GridError::InvalidParams(format!(
                "epsilon ratio must be positive, got {}",
                self.epsilon_ratio
            )));
        }
        Ok(())
    }

    /// Gaussian sigma used for a kernel of `block_size` taps
    pub fn sigma(&self) -> f32 {
        0.3 * ((self.block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }

    /// Normalized 1-D Gaussian of exactly `block_size` taps
    pub fn kernel(&self) -> Vec<f32> {
        let radius = (self.block_size / 2) as i32;
        let two_sigma_sq = 2.0 * self.sigma() * self.sigma();
        let weights: Vec<f32> = (-radius..=radius)
            .map(|i| (-((i * i) as f32) / two_sigma_sq).exp())
            .collect();
        let total: f32 = weights.iter().sum();
        weights.into_iter().map(|w| w / total).collect()
    }
}

/// Single-channel float raster holding local means
pub type MeanImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Source of the outer boundary polygon of a grid image
pub trait BoundaryDetector<R> {
    /// Vertices of the approximated outer boundary, ideally four; empty when
    /// nothing was found
    fn detect(&self, image: &R) -> Vec<Point>;
}

/// Detector built on adaptive thresholding and contour tracing
#[derive(Debug, Clone, Default)]
pub struct ContourDetector {
    params: DetectionParams,
}

impl ContourDetector {
    pub fn new(params: DetectionParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

}

impl<P> BoundaryDetector<ImageBuffer<P, Vec<u8>>> for ContourDetector
where
    P: Pixel<Subpixel = u8> + 'static,
{
    fn detect(&self, image: &ImageBuffer<P, Vec<u8>>) -> Vec<Point> {
        let gray = imageops::grayscale(image);
        let binary = adaptive_threshold_inv(&gray, &self.params);

        let Some(contour) = largest_contour(&binary) else {
            debug!("no contours found");
            return Vec::new();
        };

        let epsilon = self.params.epsilon_ratio * arc_length(&contour, true);
        let polygon = approximate_polygon_dp(&contour, epsilon, true);
        debug!(
            contour_points = contour.len(),
            epsilon,
            vertices = polygon.len(),
            "approximated boundary polygon"
        );

        polygon
            .iter()
            .map(|p| Point::new(p.x as f64, p.y as f64))
            .collect()
    }
}

/// Gaussian-weighted mean over a `block_size x block_size` neighbourhood
pub fn local_mean(gray: &GrayImage, params: &DetectionParams) -> MeanImage {
    let levels = MeanImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([gray.get_pixel(x, y)[0] as f32])
    });
    separable_filter_equal(&levels, &params.kernel())
}

/// Inverse binary threshold against a Gaussian-weighted local mean
///
/// A pixel becomes foreground (255) unless it is brighter than its
/// neighbourhood mean minus `offset`.
pub fn adaptive_threshold_inv(gray: &GrayImage, params: &DetectionParams) -> GrayImage {
    let mean = local_mean(gray, params);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let src = gray.get_pixel(x, y)[0] as f32;
        let local = mean.get_pixel(x, y)[0];
        if src > local - params.offset {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// Points of the contour enclosing the largest area, searching the whole
/// contour hierarchy (outer borders and holes)
pub fn largest_contour(binary: &GrayImage) -> Option<Vec<PixelPoint<i32>>> {
    let contours = find_contours::<i32>(binary);
    debug!(contours = contours.len(), "traced contours");

    let mut best: Option<(f64, Vec<PixelPoint<i32>>)> = None;
    for contour in contours {
        let outline: Vec<Point> = contour
            .points
            .iter()
            .map(|p| Point::new(p.x as f64, p.y as f64))
            .collect();
        let area = polygon_area(&outline);
        if best.as_ref().map_or(true, |(max, _)| area > *max) {
            best = Some((area, contour.points));
        }
    }

    best.map(|(area, points)| {
        debug!(area, "selected largest contour");
        points
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn dark_square_on_white() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255]));
        draw_filled_rect_mut(&mut img, Rect::at(50, 50).of_size(100, 100), Rgba([0, 0, 0, 255]));
        img
    }

    #[test]
    fn test_default_params() {
        let params = DetectionParams::default();
        assert!(params.validate().is_ok());
        assert!((params.sigma() - 8.9).abs() < 1e-4);
    }

    #[test]
    fn test_kernel_spans_block_size() {
        let kernel = DetectionParams::default().kernel();
        assert_eq!(kernel.len(), 57);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert_eq!(kernel[0], kernel[56]);
        assert!(kernel[28] > kernel[27]);
    }

    #[test]
    fn test_local_mean_window_width() {
        // Dark on the left, white from x = 100
        let gray = GrayImage::from_fn(200, 60, |x, _| Luma([if x < 100 { 0 } else { 255 }]));
        let mean = local_mean(&gray, &DetectionParams::default());

        // Dark pixels 25 px away still fall inside the 57 px window
        assert!(mean.get_pixel(124, 30)[0] < 254.9);
        // At 31 px they are outside it
        assert!((mean.get_pixel(130, 30)[0] - 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_params() {
        let even = DetectionParams {
            block_size: 56,
            ..Default::default()
        };
        assert!(matches!(even.validate(), Err(GridError::InvalidParams(_))));

        let eps = DetectionParams {
            epsilon_ratio: 0.0,
            ..Default::default()
        };
        assert!(ContourDetector::new(eps).is_err());
    }

    #[test]
    fn test_threshold_marks_dark_edges() {
        let gray = imageops::grayscale(&dark_square_on_white());
        let binary = adaptive_threshold_inv(&gray, &DetectionParams::default());

        // Dark pixels at the border of the square are foreground
        assert_eq!(binary.get_pixel(50, 100)[0], 255);
        assert_eq!(binary.get_pixel(100, 50)[0], 255);
        // White background and the flat dark interior are not
        assert_eq!(binary.get_pixel(10, 10)[0], 0);
        assert_eq!(binary.get_pixel(49, 100)[0], 0);
        assert_eq!(binary.get_pixel(100, 100)[0], 0);
    }

    #[test]
    fn test_detects_square_boundary() {
        let detector = ContourDetector::default();
        let polygon = detector.detect(&dark_square_on_white());
        assert!(polygon.len() >= 4, "polygon: {:?}", polygon);

        let min_x = polygon.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = polygon.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = polygon.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = polygon.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        assert!((min_x - 50.0).abs() <= 1.0 && (min_y - 50.0).abs() <= 1.0);
        assert!((max_x - 149.0).abs() <= 1.0 && (max_y - 149.0).abs() <= 1.0);
    }

    #[test]
    fn test_blank_image_has_no_boundary() {
        let img = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255]));
        assert!(ContourDetector::default().detect(&img).is_empty());
    }
}
