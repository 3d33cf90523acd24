use image::{imageops, ImageBuffer, Pixel};

/// Integer pixel rectangle lying fully inside some image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Clip a possibly out-of-bounds rectangle to an image of size `bounds`
    ///
    /// Returns `None` when nothing of the rectangle remains.
    pub fn clipped(x: i64, y: i64, width: i64, height: i64, bounds: (u32, u32)) -> Option<Self> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width).min(bounds.0 as i64);
        let y1 = (y + height).min(bounds.1 as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// Raster operations the grid pipeline needs from an image backend
///
/// Every operation hands back an owned buffer, so intermediate rasters are
/// released when they leave scope on every path, including `?` returns.
pub trait Raster: Clone {
    /// (width, height)
    fn size(&self) -> (u32, u32);

    /// Copy of a sub-region; the region must lie inside the image
    fn crop(&self, region: Region) -> Self;

    /// Rotate 90 degrees clockwise
    fn rotate_cw(&self) -> Self;

    /// Rotate 90 degrees counter-clockwise
    fn rotate_ccw(&self) -> Self;

    /// Overwrite pixels with `src` placed at (x, y); parts outside are dropped
    fn paste(&mut self, src: &Self, x: i64, y: i64);
}

impl<P> Raster for ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
{
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn crop(&self, region: Region) -> Self {
        // The view borrows `self` and is gone before this returns
        imageops::crop_imm(self, region.x, region.y, region.width, region.height).to_image()
    }

    fn rotate_cw(&self) -> Self {
        imageops::rotate90(self)
    }

    fn rotate_ccw(&self) -> Self {
        imageops::rotate270(self)
    }

    fn paste(&mut self, src: &Self, x: i64, y: i64) {
        imageops::replace(self, src, x, y);
    }
}
