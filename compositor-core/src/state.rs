//! Editor state: the document plus selection, gesture and toolbar state.

use serde::{Deserialize, Serialize};

use crate::canvas::validate_dimension;
use crate::gesture::{GestureEngine, GestureState, ResizeMode, TextMeasure};
use crate::{
    AspectPreset, CanvasConfig, Color, CompositorError, CompositorResult, DecodeState, Document,
    ImageLayer, LayerId, Selection, TextAlign, TextLayer, TouchEvent, TouchPhase, MAX_FONT_SIZE,
};

/// Font families offered before any custom font is uploaded.
pub const PRESET_FONTS: [&str; 13] = [
    "Arial",
    "Helvetica",
    "Times New Roman",
    "Courier New",
    "Verdana",
    "Georgia",
    "Palatino",
    "Garamond",
    "Bookman",
    "Comic Sans MS",
    "Trebuchet MS",
    "Arial Black",
    "Impact",
];

/// Font selected when the editor starts.
pub const DEFAULT_FONT: &str = "Arial";

/// The complete editor state, owned by the host view.
#[derive(Debug, Clone)]
pub struct EditorState {
    document: Document,
    selection: Selection,
    gesture: GestureEngine,
    current_font: String,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(CanvasConfig::default(), ResizeMode::default())
    }
}

impl EditorState {
    /// Create an editor over an empty canvas.
    #[must_use]
    pub fn new(canvas: CanvasConfig, resize_mode: ResizeMode) -> Self {
        Self {
            document: Document::new(canvas),
            selection: Selection::None,
            gesture: GestureEngine::new(resize_mode),
            current_font: DEFAULT_FONT.to_string(),
        }
    }

    /// The document being edited.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Current gesture state.
    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    /// Resize mode used by image resize gestures.
    #[must_use]
    pub fn resize_mode(&self) -> ResizeMode {
        self.gesture.resize_mode()
    }

    /// Font family used for new text layers.
    #[must_use]
    pub fn current_font(&self) -> &str {
        &self.current_font
    }

    /// Selected text layer, if any.
    #[must_use]
    pub fn selected_text(&self) -> Option<&TextLayer> {
        self.selection.text().and_then(|id| self.document.text(id))
    }

    /// Selected image layer, if any.
    #[must_use]
    pub fn selected_image(&self) -> Option<&ImageLayer> {
        self.selection.image().and_then(|id| self.document.image(id))
    }

    /// Select a layer directly (for hosts with a layer list).
    ///
    /// # Errors
    ///
    /// Returns an error if the selected layer does not exist.
    pub fn select(&mut self, selection: Selection) -> CompositorResult<()> {
        let exists = match selection {
            Selection::None => true,
            Selection::Text(id) => self.document.text(id).is_some(),
            Selection::Image(id) => self.document.image(id).is_some(),
        };
        if !exists {
            return Err(CompositorError::LayerNotFound(format!("{selection:?}")));
        }
        self.selection = selection;
        Ok(())
    }

    /// Change the resize mode used from the next gesture on.
    pub fn set_resize_mode(&mut self, mode: ResizeMode) {
        self.gesture.set_resize_mode(mode);
    }

    // ------------------------------------------------------------------
    // Canvas controls
    // ------------------------------------------------------------------

    /// Set both canvas dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::InvalidDimension`] if either side is out of range.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> CompositorResult<()> {
        let canvas = CanvasConfig {
            width: validate_dimension("width", width)?,
            height: validate_dimension("height", height)?,
            ..*self.document.canvas()
        };
        self.document.set_canvas(canvas);
        Ok(())
    }

    /// Set the canvas width, keeping the height.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::InvalidDimension`] if out of range.
    pub fn set_canvas_width(&mut self, width: u32) -> CompositorResult<()> {
        self.set_canvas_size(width, self.document.canvas().height)
    }

    /// Set the canvas height, keeping the width.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::InvalidDimension`] if out of range.
    pub fn set_canvas_height(&mut self, height: u32) -> CompositorResult<()> {
        self.set_canvas_size(self.document.canvas().width, height)
    }

    /// Recompute the canvas height from the current width and `preset`.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::InvalidDimension`] if the new height is out of range.
    pub fn apply_aspect_preset(&mut self, preset: AspectPreset) -> CompositorResult<()> {
        let height = preset.height_for(self.document.canvas().width);
        self.set_canvas_height(height)
    }

    /// Set the background color.
    pub fn set_background(&mut self, color: Color) {
        let canvas = CanvasConfig {
            background: color,
            ..*self.document.canvas()
        };
        self.document.set_canvas(canvas);
    }

    // ------------------------------------------------------------------
    // Text controls
    // ------------------------------------------------------------------

    /// Add a default text layer at the canvas center and select it.
    pub fn add_text(&mut self) -> LayerId {
        let layer = TextLayer::new(self.document.canvas().center(), self.current_font.clone());
        let id = self.document.add_text(layer);
        self.selection = Selection::Text(id);
        tracing::debug!("Added text layer {id}");
        id
    }

    /// Choose the font for new text; also applied to the selected text layer.
    pub fn select_font(&mut self, family: impl Into<String>) {
        self.current_font = family.into();
        if let Some(id) = self.selection.text() {
            let font = self.current_font.clone();
            if let Err(e) = self.document.update_text(id, |text| text.font = font) {
                tracing::debug!("Selected text vanished before font change: {e}");
            }
        }
    }

    /// Replace the selected text's content. Returns `false` if no text is selected.
    pub fn set_text_content(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        self.update_selected_text(|text| text.content = content)
    }

    /// Set the selected text's font size in pixels.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::InvalidDimension`] unless `size` is in
    /// `1..=MAX_FONT_SIZE`.
    pub fn set_text_size(&mut self, size: f32) -> CompositorResult<bool> {
        if !(1.0..=MAX_FONT_SIZE).contains(&size) {
            return Err(CompositorError::InvalidDimension(format!(
                "font size {size} must be between 1 and {MAX_FONT_SIZE}"
            )));
        }
        Ok(self.update_selected_text(|text| text.font_size = size))
    }

    /// Set the selected text's color. Returns `false` if no text is selected.
    pub fn set_text_color(&mut self, color: Color) -> bool {
        self.update_selected_text(|text| text.color = color)
    }

    /// Set the selected text's alignment. Returns `false` if no text is selected.
    pub fn set_text_align(&mut self, align: TextAlign) -> bool {
        self.update_selected_text(|text| text.align = align)
    }

    fn update_selected_text(&mut self, f: impl FnOnce(&mut TextLayer)) -> bool {
        match self.selection.text() {
            Some(id) => self.document.update_text(id, f).is_ok(),
            None => false,
        }
    }

    /// Delete the selected text layer and clear the selection.
    pub fn delete_selected_text(&mut self) -> Option<TextLayer> {
        let id = self.selection.text()?;
        self.selection = Selection::None;
        let removed = self.document.remove_text(id).ok();
        tracing::debug!("Deleted text layer {id}");
        removed
    }

    // ------------------------------------------------------------------
    // Image controls
    // ------------------------------------------------------------------

    /// Add an image layer fitted to the canvas and select it.
    ///
    /// The layer starts in [`DecodeState::Pending`].
    pub fn add_image(&mut self, name: impl Into<String>, width: u32, height: u32) -> LayerId {
        let canvas = *self.document.canvas();
        let layer = ImageLayer::fit_to_canvas(name, width, height, canvas.width, canvas.height);
        let id = self.document.add_image(layer);
        self.selection = Selection::Image(id);
        tracing::debug!("Added image layer {id} ({width}x{height})");
        id
    }

    /// Record the outcome of decoding an image layer's pixels.
    ///
    /// Returns `false` if the layer no longer exists.
    pub fn set_decode_state(&mut self, id: LayerId, state: DecodeState) -> bool {
        self.document
            .update_image(id, |image| image.decode = state)
            .is_ok()
    }

    /// Delete the selected image layer and clear the selection.
    pub fn delete_selected_image(&mut self) -> Option<ImageLayer> {
        let id = self.selection.image()?;
        self.selection = Selection::None;
        let removed = self.document.remove_image(id).ok();
        tracing::debug!("Deleted image layer {id}");
        removed
    }

    // ------------------------------------------------------------------
    // Touch input
    // ------------------------------------------------------------------

    /// Process a touch event. Returns `true` if the document changed.
    ///
    /// Only the first touch point is used.
    pub fn handle_touch(&mut self, event: &TouchEvent, measure: &dyn TextMeasure) -> bool {
        match event.phase {
            TouchPhase::Start => {
                let Some(touch) = event.primary_touch() else {
                    return false;
                };
                self.selection = self.gesture.begin(&self.document, touch.position(), measure);
                false
            }
            TouchPhase::Move => match event.primary_touch() {
                Some(touch) => self.gesture.update(&mut self.document, touch.position()),
                None => false,
            },
            TouchPhase::End | TouchPhase::Cancel => {
                self.gesture.end();
                false
            }
        }
    }

    /// Snapshot of what the toolbar should display.
    #[must_use]
    pub fn toolbar(&self) -> ToolbarState {
        ToolbarState {
            canvas: *self.document.canvas(),
            selection: self.selection,
            current_font: self.current_font.clone(),
            text: self.selected_text().map(|text| TextFields {
                content: text.content.clone(),
                font_size: text.font_size,
                color: text.color,
                align: text.align,
            }),
            can_delete_text: self.selected_text().is_some(),
            can_delete_image: self.selected_image().is_some(),
        }
    }
}

/// Field values of the selected text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFields {
    /// Text content.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Fill color.
    pub color: Color,
    /// Character layout.
    pub align: TextAlign,
}

/// What the toolbar shows and which controls are enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolbarState {
    /// Canvas settings.
    pub canvas: CanvasConfig,
    /// Current selection.
    pub selection: Selection,
    /// Font for new text.
    pub current_font: String,
    /// Selected text fields, `None` disables the text controls.
    pub text: Option<TextFields>,
    /// Whether the delete-text button is shown.
    pub can_delete_text: bool,
    /// Whether the delete-image button is shown.
    pub can_delete_image: bool,
}

impl ToolbarState {
    /// Serialize for a JavaScript host.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CompositorResult<String> {
        serde_json::to_string(self).map_err(CompositorError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    struct FixedWidth(f32);

    impl TextMeasure for FixedWidth {
        fn text_width(&self, _text: &str, _font: &str, _font_size: f32) -> f32 {
            self.0
        }
    }

    #[test]
    fn test_add_text_uses_center_and_current_font() {
        let mut state = EditorState::default();
        state.select_font("Georgia");
        let id = state.add_text();

        let text = state.document().text(id).unwrap();
        assert_eq!(text.position(), Point::new(150.0, 150.0));
        assert_eq!(text.font, "Georgia");
        assert_eq!(state.selection(), Selection::Text(id));
    }

    #[test]
    fn test_font_change_applies_to_selected_text_only() {
        let mut state = EditorState::default();
        let first = state.add_text();
        let second = state.add_text();
        state.select_font("Impact");

        assert_eq!(state.document().text(first).unwrap().font, DEFAULT_FONT);
        assert_eq!(state.document().text(second).unwrap().font, "Impact");
    }

    #[test]
    fn test_text_controls_require_selection() {
        let mut state = EditorState::default();
        assert!(!state.set_text_content("x"));
        assert!(!state.set_text_color(Color::WHITE));
        assert!(!state.set_text_size(12.0).unwrap());
        assert!(state.delete_selected_text().is_none());
        assert!(state.delete_selected_image().is_none());
    }

    #[test]
    fn test_text_size_validation() {
        let mut state = EditorState::default();
        state.add_text();
        assert!(state.set_text_size(0.0).is_err());
        assert!(state.set_text_size(f32::NAN).is_err());
        assert!(state.set_text_size(f32::INFINITY).is_err());
        assert!(matches!(
            state.set_text_size(40_000.0),
            Err(CompositorError::InvalidDimension(_))
        ));
        assert!(state.set_text_size(MAX_FONT_SIZE).unwrap());
        assert!(state.set_text_size(48.0).unwrap());
        assert!((state.selected_text().unwrap().font_size - 48.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_adding_image_selects_it_and_clears_text_selection() {
        let mut state = EditorState::default();
        state.add_text();
        let image = state.add_image("photo.jpg", 800, 600);
        assert_eq!(state.selection(), Selection::Image(image));
        assert!(state.selected_text().is_none());
    }

    #[test]
    fn test_aspect_preset_uses_current_width() {
        let mut state = EditorState::default();
        state.set_canvas_width(320).unwrap();
        state.apply_aspect_preset(AspectPreset::Landscape).unwrap();
        assert_eq!(state.document().canvas().height, 180);
        assert!(state.set_canvas_width(0).is_err());
        assert_eq!(state.document().canvas().width, 320);
    }

    #[test]
    fn test_touch_cycle_selects_moves_and_keeps_selection() {
        let mut state = EditorState::default();
        let id = state.add_text();
        state.select(Selection::None).unwrap();
        let measure = FixedWidth(40.0);

        assert!(!state.handle_touch(&TouchEvent::single(TouchPhase::Start, 155.0, 150.0), &measure));
        assert_eq!(state.selection(), Selection::Text(id));

        assert!(state.handle_touch(&TouchEvent::single(TouchPhase::Move, 205.0, 100.0), &measure));
        assert_eq!(state.document().text(id).unwrap().position(), Point::new(200.0, 100.0));

        state.handle_touch(&TouchEvent::single(TouchPhase::End, 205.0, 100.0), &measure);
        assert_eq!(state.gesture_state(), GestureState::Idle);
        assert_eq!(state.selection(), Selection::Text(id));

        state.handle_touch(&TouchEvent::single(TouchPhase::Start, 5.0, 5.0), &measure);
        assert_eq!(state.selection(), Selection::None);
    }

    #[test]
    fn test_select_unknown_layer_fails() {
        let mut state = EditorState::default();
        assert!(state.select(Selection::Text(LayerId::new())).is_err());
    }

    #[test]
    fn test_toolbar_snapshot() {
        let mut state = EditorState::default();
        let toolbar = state.toolbar();
        assert!(toolbar.text.is_none());
        assert!(!toolbar.can_delete_text);

        state.add_text();
        state.set_text_align(TextAlign::Vertical);
        let toolbar = state.toolbar();
        let fields = toolbar.text.clone().unwrap();
        assert_eq!(fields.align, TextAlign::Vertical);
        assert!(toolbar.can_delete_text);

        let json = toolbar.to_json().unwrap();
        assert!(json.contains("\"align\":\"vertical\""));
        assert!(json.contains("\"kind\":\"text\""));
    }
}
