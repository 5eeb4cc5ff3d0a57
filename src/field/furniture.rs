//! Map furniture drawn around the field: the robot's field-of-view fog,
//! the ruler sidebars and the compass.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::element::Direction;

/// Opacity of the black fog laid over everything the camera cannot see.
pub const FOG_OPACITY: f64 = 0.75;
/// Compass side as a fraction of the canvas's shorter side.
pub const COMPASS_SCALE: f64 = 0.23;
/// Ruler sidebar thickness as a fraction of the canvas's shorter side.
pub const RULER_THICKNESS: f64 = 0.025;

/// Darken every pixel outside the view cone of a camera at `eye` (canvas
/// pixels) facing `heading_deg` (clockwise from canvas up) with a
/// horizontal field of view of `fov_deg`.
pub fn draw_fog(canvas: &mut RgbaImage, eye: (f64, f64), heading_deg: f64, fov_deg: f64) {
    if fov_deg >= 360.0 {
        return;
    }
    let heading = heading_deg.to_radians();
    let (facing_x, facing_y) = (heading.sin(), -heading.cos());
    let min_cos = (fov_deg / 2.0).to_radians().cos();
    let keep = 1.0 - FOG_OPACITY;

    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let dx = x as f64 + 0.5 - eye.0;
        let dy = y as f64 + 0.5 - eye.1;
        let distance = dx.hypot(dy);
        if distance < 0.5 || (dx * facing_x + dy * facing_y) / distance >= min_cos {
            continue;
        }
        for channel in &mut pixel.0[..3] {
            *channel = (*channel as f64 * keep).round() as u8;
        }
    }
}

/// The ruler texture laid out along `direction`, with the canvas offset it
/// is drawn at. `X` runs along the bottom edge, `Y` up the left edge.
pub fn ruler_strip(
    texture: &RgbaImage,
    direction: Direction,
    width: u32,
    height: u32,
) -> (RgbaImage, i64, i64) {
    let thickness = (RULER_THICKNESS * width.min(height) as f64)
        .round()
        .max(1.0) as u32;
    match direction {
        Direction::X => (
            imageops::resize(texture, width, thickness, FilterType::Triangle),
            0,
            height.saturating_sub(thickness) as i64,
        ),
        Direction::Y => (
            imageops::resize(
                &imageops::rotate270(texture),
                thickness,
                height,
                FilterType::Triangle,
            ),
            0,
            0,
        ),
    }
}

pub fn draw_rulers(canvas: &mut RgbaImage, texture: &RgbaImage) {
    let (width, height) = canvas.dimensions();
    for direction in [Direction::X, Direction::Y] {
        let (strip, left, top) = ruler_strip(texture, direction, width, height);
        imageops::overlay(canvas, &strip, left, top);
    }
}

/// Compass in the top-right corner.
pub fn draw_compass(canvas: &mut RgbaImage, texture: &RgbaImage) {
    let (width, height) = canvas.dimensions();
    let side = (COMPASS_SCALE * width.min(height) as f64).round().max(1.0) as u32;
    let compass = imageops::resize(texture, side, side, FilterType::Triangle);
    imageops::overlay(canvas, &compass, width.saturating_sub(side) as i64, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const FOGGED: Rgba<u8> = Rgba([64, 64, 64, 255]);

    #[test]
    fn fog_covers_everything_outside_the_cone() {
        let mut canvas = RgbaImage::from_pixel(40, 40, WHITE);
        draw_fog(&mut canvas, (20.0, 20.0), 0.0, 50.0);
        assert_eq!(canvas.get_pixel(20, 5), &WHITE);
        assert_eq!(canvas.get_pixel(20, 35), &FOGGED);
        assert_eq!(canvas.get_pixel(35, 20), &FOGGED);
        // About 22 degrees off axis, inside the 25 degree half-angle.
        assert_eq!(canvas.get_pixel(25, 6), &WHITE);
    }

    #[test]
    fn fog_follows_heading() {
        let mut canvas = RgbaImage::from_pixel(40, 40, WHITE);
        draw_fog(&mut canvas, (20.0, 20.0), 90.0, 50.0);
        assert_eq!(canvas.get_pixel(35, 20), &WHITE);
        assert_eq!(canvas.get_pixel(20, 5), &FOGGED);
    }

    #[test]
    fn full_circle_fov_leaves_the_map_clear() {
        let mut canvas = RgbaImage::from_pixel(10, 10, WHITE);
        draw_fog(&mut canvas, (5.0, 5.0), 0.0, 360.0);
        assert!(canvas.pixels().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn rulers_run_along_bottom_and_left_edges() {
        let ruler = RgbaImage::from_pixel(10, 2, Rgba([200, 150, 0, 255]));
        let (strip, left, top) = ruler_strip(&ruler, Direction::X, 100, 80);
        assert_eq!((strip.dimensions(), left, top), ((100, 2), 0, 78));
        let (strip, left, top) = ruler_strip(&ruler, Direction::Y, 100, 80);
        assert_eq!((strip.dimensions(), left, top), ((2, 80), 0, 0));

        let mut canvas = RgbaImage::from_pixel(100, 80, WHITE);
        draw_rulers(&mut canvas, &ruler);
        assert_eq!(canvas.get_pixel(50, 79), &Rgba([200, 150, 0, 255]));
        assert_eq!(canvas.get_pixel(0, 40), &Rgba([200, 150, 0, 255]));
        assert_eq!(canvas.get_pixel(50, 40), &WHITE);
    }

    #[test]
    fn compass_sits_in_the_top_right_corner() {
        let mut canvas = RgbaImage::from_pixel(100, 100, WHITE);
        let compass = RgbaImage::from_pixel(4, 4, Rgba([250, 220, 0, 255]));
        draw_compass(&mut canvas, &compass);
        assert_eq!(canvas.get_pixel(90, 10), &Rgba([250, 220, 0, 255]));
        assert_eq!(canvas.get_pixel(77, 22), &Rgba([250, 220, 0, 255]));
        assert_eq!(canvas.get_pixel(70, 10), &WHITE);
        assert_eq!(canvas.get_pixel(90, 30), &WHITE);
    }
}
