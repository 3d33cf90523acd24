use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::geometry::Point;
use crate::pipeline::GridLayout;

const BOUNDARY_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const CELL_COLOR: Rgba<u8> = Rgba([0, 128, 255, 255]);
const CORNER_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Draw a closed polyline, `thickness` pixels wide
fn draw_closed(canvas: &mut RgbaImage, points: &[Point], color: Rgba<u8>, thickness: i32) {
    if points.len() < 2 {
        return;
    }
    let half = thickness / 2;
    for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
        for d in -half..=half {
            for (dx, dy) in [(d, 0), (0, d)] {
                draw_line_segment_mut(
                    canvas,
                    ((a.x as i32 + dx) as f32, (a.y as i32 + dy) as f32),
                    ((b.x as i32 + dx) as f32, (b.y as i32 + dy) as f32),
                    color,
                );
            }
        }
    }
}

/// Render the detected boundary, cell outlines and ordered corners on a copy
/// of `image`
pub fn draw_layout(image: &RgbaImage, layout: &GridLayout) -> RgbaImage {
    let mut canvas = image.clone();

    for cell in layout.grid.cells() {
        draw_closed(&mut canvas, &cell.corners(), CELL_COLOR, 1);
    }
    draw_closed(&mut canvas, &layout.polygon, BOUNDARY_COLOR, 3);
    for corner in layout.quad.corners() {
        draw_filled_circle_mut(
            &mut canvas,
            (corner.x as i32, corner.y as i32),
            5,
            CORNER_COLOR,
        );
    }

    canvas
}
