//! Box layout for the camera overlay.
//!
//! Upstream boxes are in source-camera pixels. Sizes scale by the
//! displayed/original ratio; positions scale the same way and are then
//! divided by the configured source resolution (`SCALE_X`/`SCALE_Y`), the
//! normalisation the upstream producer bakes into its coordinates.

use crate::config::SourceSettings;
use crate::detection::{Detection, ScreenLocation};
use crate::element::{ElementClass, LABEL_TEXT_COLOR};
use crate::palette::{Color, Palette};
use crate::text::{HAlign, TextBlock, VAlign};

/// Label box height as a fraction of the bounding box height.
pub const LABEL_HEIGHT_RATIO: f64 = 0.23;
/// Gap factor between the label box and the bounding box.
pub const LABEL_GAP_RATIO: f64 = 1.04;
pub const LABEL_FONT_RATIO: f64 = 0.6;
pub const DETAIL_FONT_RATIO: f64 = 0.15;
pub const DETAIL_PADDING: f64 = 8.0;
pub const STROKE_WIDTH: u32 = 2;
pub const LABEL_FILL: Color = Color::rgba(95, 95, 95, 191);
pub const LABEL_STROKE: Color = Palette::BLACK;
pub const TEXT_COLOR: Color = LABEL_TEXT_COLOR;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width.max(1) as f64, height.max(1) as f64)
    }
}

/// Divisors applied to box positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl From<SourceSettings> for Normalization {
    fn from(source: SourceSettings) -> Self {
        Self {
            scale_x: source.width as f64,
            scale_y: source.height as f64,
        }
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            scale_x: 640.0,
            scale_y: 480.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Bounding box in displayed-image pixels, before clamping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxGeometry {
    pub fn compute(
        screen: &ScreenLocation,
        original: Dimensions,
        displayed: Dimensions,
        normalization: Normalization,
    ) -> Self {
        let width_factor = displayed.width / original.width;
        let height_factor = displayed.height / original.height;
        Self {
            x: screen.x * width_factor / normalization.scale_x,
            y: screen.y * height_factor / normalization.scale_y,
            width: screen.width * width_factor,
            height: screen.height * height_factor,
        }
    }

    pub fn clamped_width(&self) -> f64 {
        clamp_extent(self.width)
    }

    pub fn clamped_height(&self) -> f64 {
        clamp_extent(self.height)
    }

    /// The drawn rectangle; non-positive extents become one pixel.
    pub fn clamped_rect(&self) -> RectF {
        RectF {
            x: self.x,
            y: self.y,
            width: self.clamped_width(),
            height: self.clamped_height(),
        }
    }
}

fn clamp_extent(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        1.0
    }
}

/// Everything drawn for one detection, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayLayer {
    pub class: ElementClass,
    pub depth: f64,
    pub label_box: RectF,
    pub label: TextBlock,
    pub bbox: RectF,
    pub fill: Color,
    pub border: Color,
    pub coordinates: TextBlock,
    pub distance: TextBlock,
}

impl OverlayLayer {
    pub fn build(detection: &Detection, geometry: BoxGeometry, map_xy: (f64, f64)) -> Self {
        let style = detection.class.style();
        let label_height = geometry.height * LABEL_HEIGHT_RATIO;
        let label_box = RectF {
            x: geometry.x,
            y: geometry.y - label_height * LABEL_GAP_RATIO,
            width: geometry.width,
            height: label_height,
        };
        let label = TextBlock {
            text: style.label.to_string(),
            x: geometry.x,
            y: geometry.y - label_height,
            width: geometry.width,
            height: label_height,
            font_size: label_height * LABEL_FONT_RATIO,
            padding: 0.0,
            h_align: HAlign::Center,
            v_align: VAlign::Middle,
            bold: true,
        };
        let detail = |text: String, h_align, v_align| TextBlock {
            text,
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            font_size: geometry.height * DETAIL_FONT_RATIO,
            padding: DETAIL_PADDING,
            h_align,
            v_align,
            bold: false,
        };
        Self {
            class: detection.class,
            depth: detection.depth,
            label_box,
            label,
            bbox: geometry.clamped_rect(),
            fill: style.fill,
            border: style.border,
            coordinates: detail(coordinates_text(map_xy), HAlign::Left, VAlign::Top),
            distance: detail(distance_text(detection.depth), HAlign::Right, VAlign::Bottom),
        }
    }
}

pub fn coordinates_text((x, y): (f64, f64)) -> String {
    format!("X {:.2}m\nY {:.2}m", x, y)
}

pub fn distance_text(depth: f64) -> String {
    if depth >= 0.0 {
        format!("Distance\n{:.2}m", depth)
    } else {
        "Distance\nUnknown".to_string()
    }
}
