//! WASM bindings for the editor.
//!
//! ```javascript
//! import init, { WasmEditor } from './pkg/compositor_app.js';
//!
//! await init();
//! const editor = new WasmEditor(300, 300);
//!
//! function frame() {
//!     if (editor.render()) {
//!         const rgba = editor.frameRgba();
//!         ctx.putImageData(new ImageData(rgba, editor.width(), editor.height()), 0, 0);
//!     }
//!     requestAnimationFrame(frame);
//! }
//! frame();
//! ```

use compositor_core::{AspectPreset, Color, ResizeMode, TextAlign, TouchEvent, TouchPhase};
use wasm_bindgen::prelude::*;

use crate::config::AppConfig;
use crate::editor::{Editor, FileUpload};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Compositor WASM initialized");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Browser-facing editor session.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor over an empty white canvas.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is out of range.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Result<WasmEditor, JsValue> {
        let config = AppConfig {
            width,
            height,
            ..AppConfig::default()
        };
        let editor = Editor::new(&config).map_err(js_err)?;
        Ok(Self { editor })
    }

    // ------------------------------------------------------------------
    // Touch input
    // ------------------------------------------------------------------

    fn touch(&mut self, phase: TouchPhase, x: f32, y: f32) -> bool {
        self.editor.handle_touch(&TouchEvent::single(phase, x, y))
    }

    /// Finger down at `(x, y)` in canvas coordinates.
    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, x: f32, y: f32) -> bool {
        self.touch(TouchPhase::Start, x, y)
    }

    /// Finger moved. Returns `true` if a layer moved or resized.
    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self, x: f32, y: f32) -> bool {
        self.touch(TouchPhase::Move, x, y)
    }

    /// Finger up.
    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self, x: f32, y: f32) -> bool {
        self.touch(TouchPhase::End, x, y)
    }

    /// Gesture cancelled by the browser.
    #[wasm_bindgen(js_name = touchCancel)]
    pub fn touch_cancel(&mut self) -> bool {
        let event = TouchEvent::new(TouchPhase::Cancel, Vec::new(), 0);
        self.editor.handle_touch(&event)
    }

    // ------------------------------------------------------------------
    // Canvas controls
    // ------------------------------------------------------------------

    /// Set the canvas width.
    ///
    /// # Errors
    ///
    /// Returns an error if the width is out of range.
    #[wasm_bindgen(js_name = setCanvasWidth)]
    pub fn set_canvas_width(&mut self, width: u32) -> Result<(), JsValue> {
        self.editor
            .state_mut()
            .set_canvas_width(width)
            .map_err(js_err)
    }

    /// Set the canvas height.
    ///
    /// # Errors
    ///
    /// Returns an error if the height is out of range.
    #[wasm_bindgen(js_name = setCanvasHeight)]
    pub fn set_canvas_height(&mut self, height: u32) -> Result<(), JsValue> {
        self.editor
            .state_mut()
            .set_canvas_height(height)
            .map_err(js_err)
    }

    /// Recompute the height from the width for `"1:1"`, `"16:9"` or `"9:16"`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown preset.
    #[wasm_bindgen(js_name = applyAspectPreset)]
    pub fn apply_aspect_preset(&mut self, preset: &str) -> Result<(), JsValue> {
        let preset: AspectPreset = preset.parse().map_err(js_err)?;
        self.editor
            .state_mut()
            .apply_aspect_preset(preset)
            .map_err(js_err)
    }

    /// Set the background from a hex color.
    ///
    /// # Errors
    ///
    /// Returns an error if the color does not parse.
    #[wasm_bindgen(js_name = setBackground)]
    pub fn set_background(&mut self, color: &str) -> Result<(), JsValue> {
        let color: Color = color.parse().map_err(js_err)?;
        self.editor.state_mut().set_background(color);
        Ok(())
    }

    /// Switch between `"anchored"` and `"incremental"` image resizing.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown mode.
    #[wasm_bindgen(js_name = setResizeMode)]
    pub fn set_resize_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: ResizeMode = mode.parse().map_err(js_err)?;
        self.editor.state_mut().set_resize_mode(mode);
        Ok(())
    }

    /// Canvas width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.editor.state().document().canvas().width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.editor.state().document().canvas().height
    }

    // ------------------------------------------------------------------
    // Text toolbar
    // ------------------------------------------------------------------

    /// Add a centered text layer and select it. Returns its id.
    #[wasm_bindgen(js_name = addText)]
    pub fn add_text(&mut self) -> String {
        self.editor.state_mut().add_text().to_string()
    }

    /// Select a font family and apply it to the selected text.
    #[wasm_bindgen(js_name = selectFont)]
    pub fn select_font(&mut self, family: &str) {
        self.editor.state_mut().select_font(family);
    }

    /// Replace the selected text's content.
    #[wasm_bindgen(js_name = setTextContent)]
    pub fn set_text_content(&mut self, content: &str) -> bool {
        self.editor.state_mut().set_text_content(content)
    }

    /// Set the selected text's font size.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is below 1 or not finite.
    #[wasm_bindgen(js_name = setTextSize)]
    pub fn set_text_size(&mut self, size: f32) -> Result<bool, JsValue> {
        self.editor.state_mut().set_text_size(size).map_err(js_err)
    }

    /// Set the selected text's color from a hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if the color does not parse.
    #[wasm_bindgen(js_name = setTextColor)]
    pub fn set_text_color(&mut self, color: &str) -> Result<bool, JsValue> {
        let color: Color = color.parse().map_err(js_err)?;
        Ok(self.editor.state_mut().set_text_color(color))
    }

    /// Set the selected text's alignment (`"horizontal"` or `"vertical"`).
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown alignment.
    #[wasm_bindgen(js_name = setTextAlign)]
    pub fn set_text_align(&mut self, align: &str) -> Result<bool, JsValue> {
        let align: TextAlign = align.parse().map_err(js_err)?;
        Ok(self.editor.state_mut().set_text_align(align))
    }

    /// Delete the selected text layer.
    #[wasm_bindgen(js_name = deleteSelectedText)]
    pub fn delete_selected_text(&mut self) -> bool {
        self.editor.delete_selected_text().is_some()
    }

    /// Delete the selected image layer.
    #[wasm_bindgen(js_name = deleteSelectedImage)]
    pub fn delete_selected_image(&mut self) -> bool {
        self.editor.delete_selected_image().is_some()
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Add an image from file bytes. `undefined` bytes (no file chosen)
    /// is a no-op. Returns the new layer id.
    ///
    /// # Errors
    ///
    /// Returns an error if the image header cannot be read.
    #[wasm_bindgen(js_name = uploadImage)]
    pub fn upload_image(
        &mut self,
        name: &str,
        bytes: Option<Vec<u8>>,
    ) -> Result<Option<String>, JsValue> {
        let file = bytes.map(|bytes| FileUpload::new(name, bytes));
        let id = self.editor.upload_image(file).map_err(js_err)?;
        Ok(id.as_ref().map(ToString::to_string))
    }

    /// Add an image from a `data:` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI or the image header is malformed.
    #[wasm_bindgen(js_name = uploadImageDataUri)]
    pub fn upload_image_data_uri(
        &mut self,
        name: &str,
        uri: &str,
    ) -> Result<Option<String>, JsValue> {
        let file = FileUpload::from_data_uri(name, uri).map_err(js_err)?;
        let id = self.editor.upload_image(Some(file)).map_err(js_err)?;
        Ok(id.as_ref().map(ToString::to_string))
    }

    /// Register a font from file bytes and select it. Returns the family.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a usable font.
    #[wasm_bindgen(js_name = uploadFont)]
    pub fn upload_font(
        &mut self,
        name: &str,
        bytes: Option<Vec<u8>>,
    ) -> Result<Option<String>, JsValue> {
        let file = bytes.map(|bytes| FileUpload::new(name, bytes));
        self.editor.upload_font(file).map_err(js_err)
    }

    /// Apply finished image decodes. Returns how many were applied.
    #[wasm_bindgen(js_name = pollDecodes)]
    pub fn poll_decodes(&mut self) -> usize {
        self.editor.poll_decodes()
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Redraw the preview if anything changed. Returns `true` if a frame
    /// was drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the preview cannot be drawn.
    pub fn render(&mut self) -> Result<bool, JsValue> {
        self.editor.frame().map_err(js_err)
    }

    /// The last preview frame as straight RGBA, ready for `ImageData`.
    #[wasm_bindgen(js_name = frameRgba)]
    #[must_use]
    pub fn frame_rgba(&self) -> Option<js_sys::Uint8ClampedArray> {
        let rgba = self.editor.renderer().preview_rgba()?;
        Some(js_sys::Uint8ClampedArray::from(rgba.as_slice()))
    }

    /// Number of preview frames drawn.
    #[wasm_bindgen(js_name = frameCount)]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.editor.renderer().frame_count()
    }

    /// Export the canvas as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[wasm_bindgen(js_name = exportPng)]
    pub fn export_png(&mut self) -> Result<Vec<u8>, JsValue> {
        let output = self.editor.export().map_err(js_err)?;
        Ok(output.bytes)
    }

    /// Suggested download name for the export.
    #[wasm_bindgen(js_name = exportFileName)]
    #[must_use]
    pub fn export_file_name(&self) -> String {
        compositor_renderer::EXPORT_FILE_NAME.to_string()
    }

    /// Toolbar snapshot as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = toolbarJson)]
    pub fn toolbar_json(&self) -> Result<String, JsValue> {
        self.editor.state().toolbar().to_json().map_err(js_err)
    }

    /// Available font families as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = fontsJson)]
    pub fn fonts_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.editor.renderer().fonts().families()).map_err(js_err)
    }

    /// Report of the last preview draw as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = reportJson)]
    pub fn report_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.editor.renderer().last_report()).map_err(js_err)
    }
}
