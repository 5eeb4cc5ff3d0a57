//! Text rasterisation on top of `ab_glyph`.

use ab_glyph::{FontArc, PxScale};
use anyhow::{anyhow, Result};
use image::Rgba;
use imageproc::drawing::{draw_text_mut, text_size, Canvas};
use std::path::Path;

/// Loaded label font. Rendering without one skips text and keeps shapes.
#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
}

impl LabelFont {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow!("failed to read font {}: {}", path.display(), e))?;
        Self::from_bytes(bytes)
            .map_err(|e| anyhow!("invalid font {}: {}", path.display(), e))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| anyhow!("{}", e))?;
        Ok(Self { font })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// A block of (possibly multi-line) text laid out inside a box.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub padding: f64,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub bold: bool,
}

impl TextBlock {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

/// Draw `block` onto `canvas`.
///
/// Blocks with a font size under one pixel, or taller than the canvas, are
/// skipped, as are lines that fall entirely outside the canvas.
pub fn draw_block<C>(canvas: &mut C, font: &LabelFont, block: &TextBlock, color: Rgba<u8>)
where
    C: Canvas<Pixel = Rgba<u8>>,
{
    let (canvas_width, canvas_height) = canvas.dimensions();
    let (canvas_width, canvas_height) = (canvas_width as f64, canvas_height as f64);
    if !(block.font_size >= 1.0 && block.font_size <= canvas_width.max(canvas_height)) {
        return;
    }
    let scale = PxScale::from(block.font_size as f32);
    let line_height = block.font_size;
    let line_count = block.lines().count() as f64;
    let inner_top = block.y + block.padding;
    let inner_height = (block.height - 2.0 * block.padding).max(0.0);
    let text_height = line_height * line_count;
    let top = match block.v_align {
        VAlign::Top => inner_top,
        VAlign::Middle => inner_top + (inner_height - text_height) / 2.0,
        VAlign::Bottom => inner_top + inner_height - text_height,
    };
    let inner_left = block.x + block.padding;
    let inner_width = (block.width - 2.0 * block.padding).max(0.0);

    for (index, line) in block.lines().enumerate() {
        let (line_width, _) = text_size(scale, &font.font, line);
        let line_width = line_width as f64;
        let left = match block.h_align {
            HAlign::Left => inner_left,
            HAlign::Center => inner_left + (inner_width - line_width) / 2.0,
            HAlign::Right => inner_left + inner_width - line_width,
        };
        let line_top = top + line_height * index as f64;
        if !(left < canvas_width
            && left + line_width + 1.0 > 0.0
            && line_top < canvas_height
            && line_top + line_height > 0.0)
        {
            continue;
        }
        let x = left.round() as i32;
        let y = line_top.round() as i32;
        draw_text_mut(canvas, color, x, y, scale, &font.font, line);
        if block.bold {
            // Faux bold: one extra pass shifted a pixel right.
            draw_text_mut(canvas, color, x.saturating_add(1), y, scale, &font.font, line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_font_bytes() {
        assert!(LabelFont::from_bytes(b"definitely not a font".to_vec()).is_err());
    }

    #[test]
    fn missing_font_file_is_reported_with_path() {
        let err = LabelFont::load(Path::new("/nonexistent/label.ttf"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("/nonexistent/label.ttf"));
    }

    #[test]
    fn splits_multiline_text() {
        let block = TextBlock {
            text: "X 1.00m\nY 2.00m".to_string(),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            font_size: 4.0,
            padding: 0.0,
            h_align: HAlign::Left,
            v_align: VAlign::Top,
            bold: false,
        };
        assert_eq!(block.lines().collect::<Vec<_>>(), vec!["X 1.00m", "Y 2.00m"]);
    }
}
