//! Text layer rasterization.
//!
//! Glyph coverage is accumulated into a canvas-sized mask which is then
//! filled with the layer color, so overlapping glyphs never double-blend.

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use compositor_core::{TextAlign, TextLayer};
use tiny_skia::{Mask, Paint, Pixmap, Rect, Transform};

use crate::error::{RenderError, RenderResult};
use crate::fonts::em_scale;

/// A glyph placed on the canvas: id plus pen position on the baseline.
pub type PlacedGlyph = (GlyphId, f32, f32);

/// Lay out one run centered on `center_x` with its baseline at `baseline`.
fn layout_run(
    font: &FontArc,
    text: &str,
    font_size: f32,
    center_x: f32,
    baseline: f32,
) -> Vec<PlacedGlyph> {
    let scaled = font.as_scaled(em_scale(font, font_size));
    let mut glyphs = Vec::with_capacity(text.len());
    let mut pen_x = 0.0f32;
    let mut last: Option<GlyphId> = None;

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = last {
            pen_x += scaled.kern(prev, id);
        }
        glyphs.push((id, pen_x, baseline));
        pen_x += scaled.h_advance(id);
        last = Some(id);
    }

    let offset = center_x - pen_x * 0.5;
    for glyph in &mut glyphs {
        glyph.1 += offset;
    }
    glyphs
}

/// Glyph positions for a text layer.
///
/// Horizontal text is one run. Vertical text draws character `i` as its own
/// run with baseline `y + i * font_size`.
#[must_use]
pub fn layout_layer(font: &FontArc, layer: &TextLayer) -> Vec<PlacedGlyph> {
    match layer.align {
        TextAlign::Horizontal => {
            layout_run(font, &layer.content, layer.font_size, layer.x, layer.y)
        }
        TextAlign::Vertical => {
            let mut buf = [0u8; 4];
            layer
                .content
                .chars()
                .enumerate()
                .flat_map(|(i, ch)| {
                    #[allow(clippy::cast_precision_loss)]
                    let baseline = layer.y + i as f32 * layer.font_size;
                    let run = ch.encode_utf8(&mut buf);
                    layout_run(font, run, layer.font_size, layer.x, baseline)
                })
                .collect()
        }
    }
}

/// Whether glyph pixel bounds overlap a `width` x `height` surface.
#[allow(clippy::cast_precision_loss)]
fn intersects_surface(bounds: ab_glyph::Rect, width: u32, height: u32) -> bool {
    bounds.max.x > 0.0
        && bounds.max.y > 0.0
        && bounds.min.x < width as f32
        && bounds.min.y < height as f32
}

/// Draw a text layer onto `pixmap` with `font`.
///
/// # Errors
///
/// Returns [`RenderError::Surface`] if the coverage mask cannot be allocated.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn draw_text_layer(
    pixmap: &mut Pixmap,
    font: &FontArc,
    layer: &TextLayer,
) -> RenderResult<()> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut mask = Mask::new(width, height)
        .ok_or_else(|| RenderError::Surface(format!("cannot allocate {width}x{height} mask")))?;
    let scale = em_scale(font, layer.font_size);

    let mut covered = false;
    {
        let data = mask.data_mut();
        for (id, x, y) in layout_layer(font, layer) {
            let glyph = id.with_scale_and_position(scale, point(x, y));
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            if !intersects_surface(bounds, width, height) {
                continue;
            }
            let (x0, y0) = (bounds.min.x as i32, bounds.min.y as i32);
            outlined.draw(|gx, gy, coverage| {
                let px = x0 + gx as i32;
                let py = y0 + gy as i32;
                if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                    return;
                }
                let idx = py as usize * width as usize + px as usize;
                let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                if value > data[idx] {
                    data[idx] = value;
                    covered = true;
                }
            });
        }
    }

    if !covered {
        return Ok(());
    }

    let c = layer.color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = false;

    let full = Rect::from_xywh(0.0, 0.0, width as f32, height as f32)
        .ok_or_else(|| RenderError::Surface("empty surface".to_string()))?;
    pixmap.fill_rect(full, &paint, Transform::identity(), Some(&mask));
    Ok(())
}
