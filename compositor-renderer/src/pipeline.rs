//! The render pass shared by the live preview and export.
//!
//! ```text
//! clear → background → image layers (bottom first) → text layers (bottom first)
//! ```
//!
//! The output is a pure function of the document, the stored pixels, the
//! registered fonts and the pending policy.

use compositor_core::{DecodeState, Document, ImageLayer, LayerId};
use serde::{Deserialize, Serialize};
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::cache::ImageStore;
use crate::error::{RenderError, RenderResult};
use crate::fonts::{FontMatch, FontRegistry};
use crate::text::draw_text_layer;

/// What to draw for an image layer whose pixels are still decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingPolicy {
    /// Draw nothing.
    Skip,
    /// Draw a gray checkerboard over the layer's bounds.
    #[default]
    Placeholder,
}

/// What a render pass did and did not draw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderReport {
    /// Image layers drawn from decoded pixels.
    pub images_drawn: usize,
    /// Text layers drawn.
    pub texts_drawn: usize,
    /// Image layers still decoding.
    pub pending: Vec<LayerId>,
    /// Image layers that could not be drawn because decoding failed.
    pub failed: Vec<LayerId>,
    /// Font families that were not registered, deduplicated.
    pub missing_fonts: Vec<String>,
}

impl RenderReport {
    /// Whether every layer was drawn as intended.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty() && self.failed.is_empty() && self.missing_fonts.is_empty()
    }
}

fn color(c: compositor_core::Color) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Render `doc` onto `pixmap`, which must match the canvas size.
///
/// # Errors
///
/// Returns [`RenderError::Surface`] if the surface size does not match the
/// canvas or a scratch surface cannot be allocated.
pub fn render_document(
    pixmap: &mut Pixmap,
    doc: &Document,
    images: &mut ImageStore,
    fonts: &FontRegistry,
    policy: PendingPolicy,
) -> RenderResult<RenderReport> {
    let canvas = doc.canvas();
    if (pixmap.width(), pixmap.height()) != (canvas.width, canvas.height) {
        return Err(RenderError::Surface(format!(
            "surface is {}x{} but canvas is {}x{}",
            pixmap.width(),
            pixmap.height(),
            canvas.width,
            canvas.height
        )));
    }

    let mut report = RenderReport::default();
    let mut placeholders_used = Vec::new();

    pixmap.fill(Color::TRANSPARENT);
    pixmap.fill(color(canvas.background));

    for layer in doc.images() {
        match &layer.decode {
            DecodeState::Ready => {
                if draw_image(pixmap, layer, images) {
                    report.images_drawn += 1;
                } else {
                    tracing::warn!("Image layer {} is ready but has no pixels", layer.id);
                    report.failed.push(layer.id);
                }
            }
            DecodeState::Pending => {
                tracing::debug!("Image layer {} still decoding", layer.id);
                if policy == PendingPolicy::Placeholder {
                    if let Some(size) = draw_placeholder(pixmap, layer, images)? {
                        placeholders_used.push(size);
                    }
                }
                report.pending.push(layer.id);
            }
            DecodeState::Failed(reason) => {
                tracing::trace!("Skipping failed image layer {}: {reason}", layer.id);
                report.failed.push(layer.id);
            }
        }
    }

    let dropped = images.retain_placeholders(&placeholders_used);
    if dropped > 0 {
        tracing::trace!("Dropped {dropped} stale placeholder(s)");
    }

    for layer in doc.texts() {
        let font = match fonts.resolve(&layer.font) {
            FontMatch::Exact(font) => Some(font),
            FontMatch::Fallback(font) => {
                note_missing(&mut report, &layer.font);
                Some(font)
            }
            FontMatch::Missing => {
                note_missing(&mut report, &layer.font);
                None
            }
        };
        if let Some(font) = font {
            tracing::trace!("Drawing text layer {}", layer.id);
            draw_text_layer(pixmap, font, layer)?;
            report.texts_drawn += 1;
        }
    }

    Ok(report)
}

fn note_missing(report: &mut RenderReport, family: &str) {
    if !report.missing_fonts.iter().any(|f| f == family) {
        tracing::debug!("Font family '{family}' is not registered");
        report.missing_fonts.push(family.to_string());
    }
}

/// Draw decoded pixels scaled to the layer's bounds. Returns `false` if the
/// store has no pixels for the layer.
#[allow(clippy::cast_precision_loss)]
fn draw_image(pixmap: &mut Pixmap, layer: &ImageLayer, images: &mut ImageStore) -> bool {
    let Some(src) = images.get(layer.id) else {
        return false;
    };
    tracing::trace!("Drawing image layer {}", layer.id);

    let sx = layer.width / src.width() as f32;
    let sy = layer.height / src.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(
        0,
        0,
        src.as_ref(),
        &paint,
        Transform::from_row(sx, 0.0, 0.0, sy, layer.x, layer.y),
        None,
    );
    true
}

/// Draw a checkerboard over the visible part of the layer's bounds.
///
/// Returns the placeholder size drawn, or `None` if the layer is off-canvas.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn draw_placeholder(
    pixmap: &mut Pixmap,
    layer: &ImageLayer,
    images: &mut ImageStore,
) -> RenderResult<Option<(u32, u32)>> {
    let (cw, ch) = (pixmap.width() as f32, pixmap.height() as f32);
    let left = layer.x.max(0.0).floor();
    let top = layer.y.max(0.0).floor();
    let right = (layer.x + layer.width).min(cw).ceil();
    let bottom = (layer.y + layer.height).min(ch).ceil();
    if right <= left || bottom <= top {
        return Ok(None);
    }

    let size = ((right - left) as u32, (bottom - top) as u32);
    let placeholder = images.placeholder(size.0, size.1)?;
    pixmap.draw_pixmap(
        left as i32,
        top as i32,
        placeholder.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(Some(size))
}
