use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, Blend};
use imageproc::rect::Rect;

use super::geometry::{OverlayLayer, RectF, LABEL_FILL, LABEL_STROKE, STROKE_WIDTH, TEXT_COLOR};
use super::DisplaySize;
use crate::palette::{Color, Theme};
use crate::text::{draw_block, HAlign, LabelFont, TextBlock, VAlign};

const PLACEHOLDER_TEXT: &str = "Connecting to camera...";

/// Rasterise overlay layers onto a transparent canvas at display size.
///
/// Layers paint in slice order, so pass them far-to-near.
pub fn rasterize_overlay(
    layers: &[OverlayLayer],
    displayed: DisplaySize,
    font: Option<&LabelFont>,
) -> RgbaImage {
    let mut canvas = Blend(RgbaImage::new(displayed.width, displayed.height));
    let bounds = (displayed.width, displayed.height);
    for layer in layers {
        draw_box(&mut canvas, bounds, &layer.label_box, LABEL_FILL, LABEL_STROKE);
        if let Some(font) = font {
            draw_block(&mut canvas, font, &layer.label, TEXT_COLOR.to_rgba());
        }
        draw_box(&mut canvas, bounds, &layer.bbox, layer.fill, layer.border);
        if let Some(font) = font {
            draw_block(&mut canvas, font, &layer.coordinates, TEXT_COLOR.to_rgba());
            draw_block(&mut canvas, font, &layer.distance, TEXT_COLOR.to_rgba());
        }
    }
    canvas.0
}

/// Full-panel placeholder shown while no camera frame has arrived.
pub fn render_placeholder(
    theme: &Theme,
    displayed: DisplaySize,
    font: Option<&LabelFont>,
) -> RgbaImage {
    let mut canvas = Blend(RgbaImage::from_pixel(
        displayed.width,
        displayed.height,
        theme.component_background.to_rgba(),
    ));
    if let Some(font) = font {
        let block = TextBlock {
            text: PLACEHOLDER_TEXT.to_string(),
            x: 0.0,
            y: 0.0,
            width: displayed.width as f64,
            height: displayed.height as f64,
            font_size: (displayed.height as f64 * 0.05).max(12.0),
            padding: 0.0,
            h_align: HAlign::Center,
            v_align: VAlign::Middle,
            bold: false,
        };
        draw_block(&mut canvas, font, &block, theme.font.to_rgba());
    }
    canvas.0
}

fn draw_box(
    canvas: &mut Blend<RgbaImage>,
    bounds: (u32, u32),
    rect: &RectF,
    fill: Color,
    stroke: Color,
) {
    let Some(inner) = pixel_rect(rect, bounds) else {
        return;
    };
    draw_filled_rect_mut(canvas, inner, fill.to_rgba());
    draw_stroke(canvas, inner, stroke.to_rgba());
}

/// Stroke centred on the edge: one ring on the edge, the rest outside it.
fn draw_stroke(canvas: &mut Blend<RgbaImage>, rect: Rect, color: Rgba<u8>) {
    for ring in 0..STROKE_WIDTH {
        let grow = 2u32.saturating_mul(ring);
        let ring_rect = Rect::at(
            rect.left().saturating_sub(ring as i32),
            rect.top().saturating_sub(ring as i32),
        )
        .of_size(
            rect.width().saturating_add(grow),
            rect.height().saturating_add(grow),
        );
        draw_hollow_rect_mut(canvas, ring_rect, color);
    }
}

/// Snap a float rect to pixels, clipped to `bounds` grown by the stroke
/// width. Non-positive extents produce nothing; any positive extent covers
/// at least one pixel. Edges clipped away land outside the canvas, so their
/// stroke is never drawn.
pub(crate) fn pixel_rect(rect: &RectF, bounds: (u32, u32)) -> Option<Rect> {
    if !(rect.width > 0.0 && rect.height > 0.0) || !rect.x.is_finite() || !rect.y.is_finite() {
        return None;
    }
    let margin = STROKE_WIDTH as f64;
    let x = rect.x.round();
    let y = rect.y.round();
    let left = x.max(-margin);
    let top = y.max(-margin);
    let right = (x + rect.width.round().max(1.0)).min(bounds.0 as f64 + margin);
    let bottom = (y + rect.height.round().max(1.0)).min(bounds.1 as f64 + margin);
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::at(left as i32, top as i32).of_size((right - left) as u32, (bottom - top) as u32))
}
