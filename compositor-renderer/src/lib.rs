//! # Compositor Renderer
//!
//! CPU raster renderer for compositor documents, built on tiny-skia.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Renderer                      │
//! ├──────────────┬──────────────┬───────────────┤
//! │ Image store  │ Font registry│ Decode queue  │
//! │ (pixels)     │ (ab_glyph)   │ (tokio)       │
//! ├──────────────┴──────────────┴───────────────┤
//! │  render_document → preview surface / PNG    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The preview and the export run the same pass, so an export is
//! pixel-identical to the preview for the same document state.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod decode;
pub mod error;
pub mod export;
pub mod fonts;
pub mod image;
pub mod pipeline;
pub mod text;

pub use cache::{ImageStore, StoreStats};
pub use decode::{DecodeOutcome, DecodeQueue};
pub use error::{RenderError, RenderResult};
pub use export::{ExportOutput, EXPORT_FILE_NAME};
pub use fonts::{FontMatch, FontRegistry};
pub use pipeline::{render_document, PendingPolicy, RenderReport};

use compositor_core::Document;
use tiny_skia::Pixmap;

/// Configuration for the renderer.
#[derive(Debug, Clone, Default)]
pub struct RendererConfig {
    /// What to draw for images that are still decoding.
    pub pending_policy: PendingPolicy,
}

/// Owns the resources needed to draw a document and the live preview surface.
#[derive(Debug)]
pub struct Renderer {
    config: RendererConfig,
    fonts: FontRegistry,
    images: ImageStore,
    preview: Option<Pixmap>,
    rendered_revision: Option<u64>,
    last_report: RenderReport,
    frame_count: u64,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl Renderer {
    /// Create a renderer with no fonts and no decoded images.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            fonts: FontRegistry::new(),
            images: ImageStore::new(),
            preview: None,
            rendered_revision: None,
            last_report: RenderReport::default(),
            frame_count: 0,
        }
    }

    /// Renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Change what pending images look like. Forces a redraw.
    pub fn set_pending_policy(&mut self, policy: PendingPolicy) {
        if self.config.pending_policy != policy {
            self.config.pending_policy = policy;
            self.invalidate();
        }
    }

    /// Registered fonts.
    #[must_use]
    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// Mutable access to the fonts. Forces a redraw, since any text may change.
    pub fn fonts_mut(&mut self) -> &mut FontRegistry {
        self.invalidate();
        &mut self.fonts
    }

    /// Decoded image pixels.
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Mutable access to the decoded pixels. Forces a redraw.
    pub fn images_mut(&mut self) -> &mut ImageStore {
        self.invalidate();
        &mut self.images
    }

    /// Make the next [`render_preview`](Self::render_preview) redraw.
    pub fn invalidate(&mut self) {
        self.rendered_revision = None;
    }

    /// Redraw the preview if the document changed since the last draw.
    ///
    /// Returns `true` if a frame was drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated or rendering fails.
    pub fn render_preview(&mut self, doc: &Document) -> RenderResult<bool> {
        let canvas = doc.canvas();
        let size_matches = self
            .preview
            .as_ref()
            .is_some_and(|p| (p.width(), p.height()) == (canvas.width, canvas.height));
        if size_matches && self.rendered_revision == Some(doc.revision()) {
            return Ok(false);
        }

        let mut surface = match self.preview.take() {
            Some(surface) if size_matches => surface,
            _ => {
                tracing::debug!("Allocating {}x{} preview surface", canvas.width, canvas.height);
                export::new_surface(canvas.width, canvas.height)?
            }
        };

        let result = render_document(
            &mut surface,
            doc,
            &mut self.images,
            &self.fonts,
            self.config.pending_policy,
        );
        self.preview = Some(surface);
        self.last_report = result?;
        self.rendered_revision = Some(doc.revision());
        self.frame_count += 1;
        tracing::trace!("Rendered preview frame {}", self.frame_count);
        Ok(true)
    }

    /// The preview surface as of the last draw.
    #[must_use]
    pub fn preview(&self) -> Option<&Pixmap> {
        self.preview.as_ref()
    }

    /// The preview as straight RGBA8 bytes, suitable for an HTML `ImageData`.
    #[must_use]
    pub fn preview_rgba(&self) -> Option<Vec<u8>> {
        let preview = self.preview.as_ref()?;
        Some(
            preview
                .pixels()
                .iter()
                .flat_map(|p| {
                    let c = p.demultiply();
                    [c.red(), c.green(), c.blue(), c.alpha()]
                })
                .collect(),
        )
    }

    /// Report from the last preview draw.
    #[must_use]
    pub fn last_report(&self) -> &RenderReport {
        &self.last_report
    }

    /// Number of preview frames drawn.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Render `doc` onto a fresh off-screen surface and encode it as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn export(&mut self, doc: &Document) -> RenderResult<ExportOutput> {
        export::export_png(doc, &mut self.images, &self.fonts, self.config.pending_policy)
    }
}
