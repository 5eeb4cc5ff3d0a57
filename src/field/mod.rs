//! Top-down field map.
//!
//! World coordinates are meters on the field plane with the origin at the
//! field centre. The canvas places that origin at its own centre.

pub mod furniture;
pub mod layer;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use crate::assets::{AssetRegistry, TextureId};
use crate::config::{FieldSettings, RobotSettings};
use crate::detection::RobotPosition;
use crate::palette::Palette;

pub use layer::{FieldLayer, Sprite};

/// Robot footprint on the canvas, relative to the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RobotSprite {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub length: f64,
    /// Clockwise heading, degrees.
    pub heading: f64,
}

impl RobotSprite {
    pub fn place(position: &RobotPosition, robot: &RobotSettings, scale: f64) -> Self {
        Self {
            x: position.x * scale,
            y: position.y * scale * -1.0,
            width: robot.width * scale * robot.scale,
            length: robot.length * scale * robot.scale,
            heading: position.azimuth,
        }
    }
}

/// Field canvas of `width` x `height` pixels.
#[derive(Clone, Copy, Debug)]
pub struct FieldMap {
    pub width: u32,
    pub height: u32,
    /// Margin past each canvas edge before a sprite counts as out of bounds,
    /// as a fraction of half the canvas extent on that axis.
    pub oov: f64,
    /// Robot camera field of view, degrees.
    pub fov: f64,
}

impl FieldMap {
    pub fn new(width: u32, height: u32, settings: &FieldSettings) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            oov: settings.oov,
            fov: settings.robot.fov,
        }
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn is_out_of_bounds(&self, sprite: &Sprite) -> bool {
        let (half_width, half_height) = self.origin();
        let limit_x = half_width * (1.0 + self.oov);
        let limit_y = half_height * (1.0 + self.oov);
        sprite.x.abs() > limit_x || sprite.y.abs() > limit_y
    }

    /// Draw the field background, the fog outside the robot's field of view,
    /// the robot, element sprites in order, then the rulers and compass.
    ///
    /// A sprite whose texture is not loaded keeps its slot but draws nothing.
    /// Without a robot position there is no view cone and no fog.
    pub fn render(
        &self,
        assets: &AssetRegistry,
        robot: Option<RobotSprite>,
        sprites: &[Sprite],
    ) -> RgbaImage {
        let mut canvas = match assets.texture(TextureId::Field) {
            Some(field) => imageops::resize(field, self.width, self.height, FilterType::Triangle),
            None => RgbaImage::from_pixel(self.width, self.height, Palette::DARK_GRAY.to_rgba()),
        };
        let (origin_x, origin_y) = self.origin();

        if let Some(robot) = robot {
            furniture::draw_fog(
                &mut canvas,
                (origin_x + robot.x, origin_y + robot.y),
                robot.heading,
                self.fov,
            );
        }
        if let (Some(robot), Some(texture)) = (robot, assets.texture(TextureId::Robot)) {
            let rotated = rotated_robot(texture, &robot);
            let left = origin_x + robot.x - rotated.width() as f64 / 2.0;
            let top = origin_y + robot.y - rotated.height() as f64 / 2.0;
            let (width, height) = (rotated.width() as f64, rotated.height() as f64);
            if self.overlaps(left, top, width, height) {
                imageops::overlay(&mut canvas, &rotated, left.round() as i64, top.round() as i64);
            }
        }

        for sprite in sprites {
            let Some(texture) = assets.texture(sprite.texture) else {
                continue;
            };
            let (left, top) = sprite.top_left();
            let (left, top) = (origin_x + left, origin_y + top);
            if !self.overlaps(left, top, sprite.width, sprite.height) {
                continue;
            }
            let width = sprite.width.round().max(1.0) as u32;
            let height = sprite.height.round().max(1.0) as u32;
            let scaled = imageops::resize(texture, width, height, FilterType::Triangle);
            imageops::overlay(&mut canvas, &scaled, left.round() as i64, top.round() as i64);
        }

        if let Some(ruler) = assets.texture(TextureId::Ruler) {
            furniture::draw_rulers(&mut canvas, ruler);
        }
        if let Some(compass) = assets.texture(TextureId::Compass) {
            furniture::draw_compass(&mut canvas, compass);
        }
        canvas
    }

    /// Whether a finite canvas-space rect touches the canvas.
    fn overlaps(&self, left: f64, top: f64, width: f64, height: f64) -> bool {
        [left, top, width, height].iter().all(|value| value.is_finite())
            && left < self.width as f64
            && top < self.height as f64
            && left + width.max(1.0) > 0.0
            && top + height.max(1.0) > 0.0
    }
}

fn rotated_robot(texture: &RgbaImage, robot: &RobotSprite) -> RgbaImage {
    let width = robot.width.round().max(1.0) as u32;
    let length = robot.length.round().max(1.0) as u32;
    let body = imageops::resize(texture, width, length, FilterType::Triangle);
    // Pad to the diagonal so rotation does not clip the corners.
    let side = (width as f64).hypot(length as f64).ceil() as u32;
    let mut padded = RgbaImage::new(side, side);
    imageops::overlay(
        &mut padded,
        &body,
        ((side - width) / 2) as i64,
        ((side - length) / 2) as i64,
    );
    rotate_about_center(
        &padded,
        robot.heading.to_radians() as f32,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::detection::{Detection, MapLocation, ScreenLocation};
    use crate::element::ElementClass;

    fn settings() -> FieldSettings {
        DashboardConfig::default().field
    }

    fn sprite_at(x: f64, y: f64) -> Sprite {
        let detection = Detection::new(
            ElementClass::BallRed,
            1.0,
            ScreenLocation::default(),
            MapLocation::at(0.0, 0.0),
        );
        let mut sprite = FieldLayer::sprites(&[detection], 10.0)[0];
        sprite.x = x;
        sprite.y = y;
        sprite
    }

    #[test]
    fn out_of_bounds_includes_margin() {
        let map = FieldMap::new(100, 100, &settings());
        assert!(!map.is_out_of_bounds(&sprite_at(50.0, 0.0)));
        assert!(!map.is_out_of_bounds(&sprite_at(54.9, -54.9)));
        assert!(map.is_out_of_bounds(&sprite_at(0.0, -56.0)));
    }

    #[test]
    fn oov_margin_scales_with_each_half_extent() {
        let mut field = settings();
        field.oov = 0.5;
        // Half extents 100 and 20: limits 150 and 30.
        let map = FieldMap::new(200, 40, &field);
        assert!(!map.is_out_of_bounds(&sprite_at(149.0, 0.0)));
        assert!(map.is_out_of_bounds(&sprite_at(151.0, 0.0)));
        assert!(!map.is_out_of_bounds(&sprite_at(0.0, -29.0)));
        assert!(map.is_out_of_bounds(&sprite_at(0.0, 31.0)));
    }

    #[test]
    fn sprites_draw_at_canvas_centre_offset() {
        let mut assets = AssetRegistry::empty();
        assets.insert(
            TextureId::Field,
            RgbaImage::from_pixel(4, 4, Rgba([0, 128, 0, 255])),
        );
        assets.insert(
            TextureId::BallRed,
            RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])),
        );
        let map = FieldMap::new(40, 40, &settings());
        let mut sprite = sprite_at(10.0, -10.0);
        sprite.width = 4.0;
        sprite.height = 4.0;
        sprite.offset_x = 2.0;
        sprite.offset_y = 2.0;

        let image = map.render(&assets, None, &[sprite]);
        assert_eq!(image.dimensions(), (40, 40));
        assert_eq!(image.get_pixel(30, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(image.get_pixel(5, 35), &Rgba([0, 128, 0, 255]));
    }

    #[test]
    fn far_and_non_finite_sprites_are_skipped() {
        let mut assets = AssetRegistry::empty();
        assets.insert(
            TextureId::BallRed,
            RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])),
        );
        let map = FieldMap::new(20, 20, &settings());
        let mut far = sprite_at(1e15, -1e15);
        far.width = 4.0;
        far.height = 4.0;
        let mut nan = sprite_at(f64::NAN, 0.0);
        nan.width = 4.0;
        nan.height = 4.0;
        let image = map.render(&assets, None, &[far, nan]);
        assert!(image
            .pixels()
            .all(|pixel| *pixel == Palette::DARK_GRAY.to_rgba()));
    }

    #[test]
    fn missing_texture_draws_nothing() {
        let assets = AssetRegistry::empty();
        let map = FieldMap::new(20, 20, &settings());
        let mut sprite = sprite_at(0.0, 0.0);
        sprite.width = 6.0;
        sprite.height = 6.0;
        let image = map.render(&assets, None, &[sprite]);
        assert_eq!(image.get_pixel(10, 10), &Palette::DARK_GRAY.to_rgba());
    }

    #[test]
    fn robot_is_drawn_at_its_position() {
        let mut assets = AssetRegistry::empty();
        assets.insert(
            TextureId::Robot,
            RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255])),
        );
        let map = FieldMap::new(60, 60, &settings());
        let robot = RobotSprite::place(
            &RobotPosition {
                x: 1.0,
                y: 1.0,
                z: 0.0,
                azimuth: 0.0,
            },
            &settings().robot,
            10.0,
        );
        assert!((robot.y - -10.0).abs() < 1e-12);
        let image = map.render(&assets, Some(robot), &[]);
        let body = image.get_pixel(40, 20);
        assert!(body[2] > 240 && body[0] < 16, "robot pixel {:?}", body);
        // Facing up: ahead is clear, behind is fogged.
        assert_eq!(image.get_pixel(40, 3), &Palette::DARK_GRAY.to_rgba());
        let behind = image.get_pixel(5, 55);
        assert!(behind[0] < Palette::DARK_GRAY.r / 2, "fogged pixel {:?}", behind);
    }

    #[test]
    fn rulers_and_compass_draw_over_sprites() {
        let mut assets = AssetRegistry::empty();
        assets.insert(TextureId::Ruler, RgbaImage::from_pixel(8, 2, Rgba([200, 150, 0, 255])));
        assets.insert(TextureId::Compass, RgbaImage::from_pixel(4, 4, Rgba([250, 220, 0, 255])));
        assets.insert(TextureId::BallRed, RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));
        let map = FieldMap::new(100, 100, &settings());
        // A sprite in the bottom-left corner, under both rulers.
        let mut sprite = sprite_at(-48.0, 48.0);
        sprite.width = 4.0;
        sprite.height = 4.0;
        sprite.offset_x = 2.0;
        sprite.offset_y = 2.0;

        let image = map.render(&assets, None, &[sprite]);
        assert_eq!(image.get_pixel(1, 99), &Rgba([200, 150, 0, 255]));
        assert_eq!(image.get_pixel(4, 98), &Rgba([200, 150, 0, 255]));
        assert_eq!(image.get_pixel(90, 10), &Rgba([250, 220, 0, 255]));
        assert_eq!(image.get_pixel(50, 50), &Palette::DARK_GRAY.to_rgba());
    }
}
