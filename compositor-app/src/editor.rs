//! The editor facade: editor state, renderer and decode queue in one place.

use std::path::{Path, PathBuf};

use compositor_core::{
    CanvasConfig, DecodeState, EditorState, ImageLayer, LayerId, TextAlign, TextLayer, TouchEvent,
};
use compositor_renderer::image::{bytes_from_data_uri, probe_dimensions};
use compositor_renderer::{
    DecodeOutcome, DecodeQueue, ExportOutput, Renderer, RendererConfig, EXPORT_FILE_NAME,
};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// A file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// File name as reported by the picker.
    pub name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Create an upload from a name and its contents.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Create an upload from a `data:` URI, as produced by a browser
    /// `FileReader`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is malformed.
    pub fn from_data_uri(name: impl Into<String>, uri: &str) -> AppResult<Self> {
        Ok(Self::new(name, bytes_from_data_uri(uri)?))
    }

    /// Read an upload from disk, named after the file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] if the file cannot be read.
    pub fn read(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| AppError::io(path, e))?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(name, bytes))
    }
}

/// An editing session.
///
/// Owns the editable state, the renderer's resources (fonts and decoded
/// pixels) and the queue of in-flight image decodes.
#[derive(Debug)]
pub struct Editor {
    state: EditorState,
    renderer: Renderer,
    decodes: DecodeQueue,
}

impl Default for Editor {
    fn default() -> Self {
        Self::from_parts(EditorState::default(), Renderer::default())
    }
}

impl Editor {
    /// Create an editor over an empty canvas configured by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured canvas size is out of range.
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let canvas = CanvasConfig::new(config.width, config.height)?;
        let mut state = EditorState::new(canvas, config.resize_mode);
        state.set_background(config.background);
        if let Some(preset) = config.aspect {
            state.apply_aspect_preset(preset)?;
        }

        #[allow(unused_mut)]
        let mut renderer = Renderer::new(RendererConfig {
            pending_policy: config.pending_policy,
        });
        #[cfg(feature = "system-fonts")]
        {
            let loaded = renderer.fonts_mut().load_system_presets();
            tracing::info!("Loaded {loaded} preset font families from the system");
        }

        let canvas = state.document().canvas();
        tracing::info!("Editor ready on {}x{} canvas", canvas.width, canvas.height);
        Ok(Self::from_parts(state, renderer))
    }

    fn from_parts(state: EditorState, renderer: Renderer) -> Self {
        Self {
            state,
            renderer,
            decodes: DecodeQueue::new(),
        }
    }

    /// Editor state.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Mutable editor state, for toolbar operations.
    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Mutable renderer.
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Add an uploaded image as a new selected layer.
    ///
    /// The header is read immediately so the layer has its final geometry;
    /// the pixels are decoded in the background and the layer stays
    /// [`DecodeState::Pending`] until [`poll_decodes`](Self::poll_decodes)
    /// picks them up. `None` (no file chosen) is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be read. Nothing is added.
    pub fn upload_image(&mut self, file: Option<FileUpload>) -> AppResult<Option<LayerId>> {
        let Some(file) = file else {
            return Ok(None);
        };
        let (width, height) = probe_dimensions(&file.bytes).inspect_err(|e| {
            tracing::warn!("Rejected image upload '{}': {e}", file.name);
        })?;

        let id = self.state.add_image(file.name.as_str(), width, height);
        tracing::info!("Uploaded image '{}' ({width}x{height}) as layer {id}", file.name);
        self.decodes.submit(id, file.bytes);
        self.poll_decodes();
        Ok(Some(id))
    }

    /// Register an uploaded font, select it and apply it to the selected
    /// text. `None` (no file chosen) is a no-op.
    ///
    /// The first uploaded font also becomes the fallback for text whose
    /// family is not available.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a usable font. Nothing changes.
    pub fn upload_font(&mut self, file: Option<FileUpload>) -> AppResult<Option<String>> {
        let Some(file) = file else {
            return Ok(None);
        };
        let fonts = self.renderer.fonts_mut();
        let family = fonts.register_file(&file.name, file.bytes).inspect_err(|e| {
            tracing::warn!("Rejected font upload '{}': {e}", file.name);
        })?;
        if fonts.fallback().is_none() {
            fonts.set_fallback(&family)?;
        }

        self.state.select_font(family.as_str());
        Ok(Some(family))
    }

    // ------------------------------------------------------------------
    // Decodes
    // ------------------------------------------------------------------

    /// Apply every decode that has finished. Returns how many were applied.
    pub fn poll_decodes(&mut self) -> usize {
        let mut applied = 0;
        for outcome in self.decodes.drain() {
            if self.apply_decode(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait until no decode is outstanding, applying each as it finishes.
    pub async fn wait_for_decodes(&mut self) {
        while let Some(outcome) = self.decodes.next().await {
            self.apply_decode(outcome);
        }
    }

    /// Number of image decodes still in flight.
    #[must_use]
    pub fn pending_decodes(&self) -> usize {
        self.decodes.outstanding()
    }

    fn apply_decode(&mut self, outcome: DecodeOutcome) -> bool {
        let DecodeOutcome { layer, result } = outcome;
        if self.state.document().image(layer).is_none() {
            tracing::debug!("Discarding decode for deleted layer {layer}");
            return false;
        }

        let images = self.renderer.images_mut();
        let stored = result.and_then(|decoded| images.insert_decoded(layer, &decoded));
        let state = match stored {
            Ok(()) => {
                tracing::debug!("Image layer {layer} decoded");
                DecodeState::Ready
            }
            Err(e) => {
                tracing::warn!("Image layer {layer} failed to decode: {e}");
                DecodeState::Failed(e.to_string())
            }
        };
        self.state.set_decode_state(layer, state)
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Route a touch event to the gesture engine. Returns `true` if the
    /// document changed.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> bool {
        self.state.handle_touch(event, self.renderer.fonts())
    }

    /// Delete the selected text layer.
    pub fn delete_selected_text(&mut self) -> Option<TextLayer> {
        self.state.delete_selected_text()
    }

    /// Delete the selected image layer and release its pixels.
    pub fn delete_selected_image(&mut self) -> Option<ImageLayer> {
        let removed = self.state.delete_selected_image()?;
        self.renderer.images_mut().remove(removed.id);
        Some(removed)
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Apply finished decodes and redraw the preview if anything changed.
    ///
    /// Returns `true` if a frame was drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the preview cannot be drawn.
    pub fn frame(&mut self) -> AppResult<bool> {
        self.poll_decodes();

        let doc = self.state.document();
        if self.renderer.images().len() > doc.image_count() {
            let dropped = self
                .renderer
                .images_mut()
                .retain(|id| doc.image(id).is_some());
            tracing::debug!("Released pixels of {dropped} removed image layer(s)");
        }

        Ok(self.renderer.render_preview(doc)?)
    }

    /// Export the current state as PNG. Pending layers are drawn per the
    /// renderer's pending policy and listed in the report.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn export(&mut self) -> AppResult<ExportOutput> {
        self.poll_decodes();
        Ok(self.renderer.export(self.state.document())?)
    }

    /// Wait for every outstanding decode, then export.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub async fn export_when_ready(&mut self) -> AppResult<ExportOutput> {
        self.wait_for_decodes().await;
        self.export()
    }

    /// Export and write the PNG to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the export fails or the file cannot be written.
    pub fn write_png(&mut self, path: &Path) -> AppResult<ExportOutput> {
        let output = self.export()?;
        std::fs::write(path, &output.bytes).map_err(|e| AppError::io(path, e))?;
        tracing::info!("Wrote {}", path.display());
        Ok(output)
    }

    /// Export into `dir` under the standard file name (`image.png`).
    ///
    /// # Errors
    ///
    /// Returns an error if the export fails or the file cannot be written.
    pub fn export_to(&mut self, dir: &Path) -> AppResult<PathBuf> {
        let path = dir.join(EXPORT_FILE_NAME);
        self.write_png(&path)?;
        Ok(path)
    }
}

/// Build a composition headlessly from `config`.
///
/// Registers the font file, adds the image layers (bottom first) and then
/// the text layers, and waits for every image to decode.
///
/// # Errors
///
/// Returns an error if the canvas is invalid, an input cannot be read, or a
/// font or image is rejected.
pub async fn compose(config: &AppConfig) -> AppResult<Editor> {
    let mut editor = Editor::new(config)?;

    if let Some(path) = &config.font_file {
        editor.upload_font(Some(FileUpload::read(path)?))?;
    }
    if let Some(family) = &config.font {
        editor.state_mut().select_font(family.as_str());
    }

    for path in &config.images {
        editor.upload_image(Some(FileUpload::read(path)?))?;
    }

    for content in &config.texts {
        let state = editor.state_mut();
        state.add_text();
        state.set_text_content(content.as_str());
        if let Some(size) = config.text_size {
            state.set_text_size(size)?;
        }
        if let Some(color) = config.text_color {
            state.set_text_color(color);
        }
        if config.vertical {
            state.set_text_align(TextAlign::Vertical);
        }
    }

    editor.wait_for_decodes().await;
    Ok(editor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use compositor_core::Selection;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 255, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_no_file_is_a_noop() {
        let mut editor = Editor::default();
        assert_eq!(editor.upload_image(None).unwrap(), None);
        assert_eq!(editor.upload_font(None).unwrap(), None);
        assert!(editor.state().document().is_empty());
    }

    #[test]
    fn test_bad_image_adds_nothing() {
        let mut editor = Editor::default();
        let result = editor.upload_image(Some(FileUpload::new("notes.png", b"hello".to_vec())));
        assert!(result.is_err());
        assert_eq!(editor.state().document().image_count(), 0);
    }

    #[test]
    fn test_bad_font_changes_nothing() {
        let mut editor = Editor::default();
        let result = editor.upload_font(Some(FileUpload::new("Broken.ttf", vec![0; 32])));
        assert!(result.is_err());
        assert_eq!(editor.state().current_font(), "Arial");
    }

    #[test]
    fn test_upload_outside_runtime_decodes_inline() {
        let mut editor = Editor::default();
        let id = editor
            .upload_image(Some(FileUpload::new("blue.png", png(4, 2))))
            .unwrap()
            .unwrap();

        let layer = editor.state().document().image(id).unwrap();
        assert_eq!(layer.decode, DecodeState::Ready);
        assert_eq!((layer.width, layer.height), (300.0, 150.0));
        assert_eq!(editor.state().selection(), Selection::Image(id));
        assert_eq!(editor.pending_decodes(), 0);
    }

    #[test]
    fn test_delete_image_releases_pixels() {
        let mut editor = Editor::default();
        let id = editor
            .upload_image(Some(FileUpload::new("blue.png", png(2, 2))))
            .unwrap()
            .unwrap();
        assert!(editor.renderer().images().contains(id));

        let removed = editor.delete_selected_image().unwrap();
        assert_eq!(removed.id, id);
        assert!(!editor.renderer().images().contains(id));
        assert!(editor.delete_selected_image().is_none());
    }

    #[test]
    fn test_data_uri_upload() {
        let upload = FileUpload::from_data_uri("dot.txt", "data:text/plain,a%20b").unwrap();
        assert_eq!(upload.bytes, b"a b");
        assert!(FileUpload::from_data_uri("x", "not a uri").is_err());
    }
}
