//! Document export to PNG.
//!
//! Export renders the document onto a fresh off-screen surface sized exactly
//! to the canvas, using the same pass as the live preview, then encodes it.

use compositor_core::Document;
use tiny_skia::Pixmap;

use crate::cache::ImageStore;
use crate::error::{RenderError, RenderResult};
use crate::fonts::FontRegistry;
use crate::pipeline::{render_document, PendingPolicy, RenderReport};

/// File name offered for the exported image.
pub const EXPORT_FILE_NAME: &str = "image.png";

/// An encoded export.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// Suggested file name.
    pub file_name: &'static str,
    /// PNG bytes.
    pub bytes: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// What the render pass drew.
    pub report: RenderReport,
}

/// Allocate a transparent surface of the given size.
///
/// # Errors
///
/// Returns [`RenderError::Surface`] if the size is zero or too large.
pub fn new_surface(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| RenderError::Surface(format!("cannot allocate {width}x{height} surface")))
}

/// Encode a surface as PNG.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if encoding fails.
pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
}

/// Render `doc` off-screen and encode it as PNG.
///
/// # Errors
///
/// Returns an error if the surface cannot be allocated, rendering fails or
/// encoding fails.
pub fn export_png(
    doc: &Document,
    images: &mut ImageStore,
    fonts: &FontRegistry,
    policy: PendingPolicy,
) -> RenderResult<ExportOutput> {
    let canvas = doc.canvas();
    let mut pixmap = new_surface(canvas.width, canvas.height)?;
    let report = render_document(&mut pixmap, doc, images, fonts, policy)?;
    if !report.is_complete() {
        tracing::warn!(
            "Exporting with {} pending, {} failed image(s) and {} missing font(s)",
            report.pending.len(),
            report.failed.len(),
            report.missing_fonts.len()
        );
    }

    let bytes = encode_png(&pixmap)?;
    tracing::info!(
        "Exported {}x{} PNG ({} bytes)",
        canvas.width,
        canvas.height,
        bytes.len()
    );

    Ok(ExportOutput {
        file_name: EXPORT_FILE_NAME,
        bytes,
        width: canvas.width,
        height: canvas.height,
        report,
    })
}
