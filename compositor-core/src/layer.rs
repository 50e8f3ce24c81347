//! Layers - the building blocks of a composition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Bounds, Point};
use crate::Color;

/// Placeholder content of a freshly added text layer.
pub const DEFAULT_TEXT_CONTENT: &str = "新文本";

/// Font size (px) of a freshly added text layer.
pub const DEFAULT_FONT_SIZE: f32 = 30.0;

/// Largest accepted font size (px).
pub const MAX_FONT_SIZE: f32 = 1000.0;

/// Unique identifier for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    /// Create a new unique layer ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the characters of a text layer are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// The whole string on one baseline.
    #[default]
    Horizontal,
    /// One character per line, advancing downwards by the font size.
    Vertical,
}

impl std::str::FromStr for TextAlign {
    type Err = crate::CompositorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            other => Err(crate::CompositorError::InvalidOperation(format!(
                "unknown text alignment '{other}'"
            ))),
        }
    }
}

/// A text layer.
///
/// `(x, y)` is the anchor the text is centered on horizontally; vertically it
/// is the alphabetic baseline of the first line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    /// Unique identifier.
    pub id: LayerId,
    /// Text content.
    pub content: String,
    /// Anchor X position.
    pub x: f32,
    /// Anchor Y position (baseline).
    pub y: f32,
    /// Font size in pixels (em size).
    pub font_size: f32,
    /// Fill color.
    pub color: Color,
    /// Font family identifier.
    pub font: String,
    /// Character layout.
    pub align: TextAlign,
}

impl TextLayer {
    /// Create a text layer with default content, size, color and alignment.
    #[must_use]
    pub fn new(position: Point, font: impl Into<String>) -> Self {
        Self {
            id: LayerId::new(),
            content: DEFAULT_TEXT_CONTENT.to_string(),
            x: position.x,
            y: position.y,
            font_size: DEFAULT_FONT_SIZE,
            color: Color::BLACK,
            font: font.into(),
            align: TextAlign::Horizontal,
        }
    }

    /// Set the content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Anchor position.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The box used for hit-testing: `text_width` wide, one font size tall,
    /// centered on the anchor.
    #[must_use]
    pub fn hit_bounds(&self, text_width: f32) -> Bounds {
        Bounds::centered(self.position(), text_width, self.font_size)
    }
}

/// Decode progress of an image layer's pixel source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum DecodeState {
    /// Decode submitted, pixels not yet available.
    #[default]
    Pending,
    /// Pixels decoded and available to the renderer.
    Ready,
    /// Decoding failed; the layer cannot be drawn.
    Failed(String),
}

/// An image layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    /// Unique identifier.
    pub id: LayerId,
    /// Source name (usually the uploaded file name).
    pub name: String,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Displayed width.
    pub width: f32,
    /// Displayed height.
    pub height: f32,
    /// Intrinsic width of the source image.
    pub original_width: u32,
    /// Intrinsic height of the source image.
    pub original_height: u32,
    /// Decode progress.
    pub decode: DecodeState,
}

impl ImageLayer {
    /// Create an image layer scaled uniformly to fit the canvas and centered.
    ///
    /// `scale = min(canvas_w / img_w, canvas_h / img_h)`; images smaller than
    /// the canvas are scaled up.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fit_to_canvas(
        name: impl Into<String>,
        original_width: u32,
        original_height: u32,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Self {
        let (iw, ih) = (original_width.max(1) as f32, original_height.max(1) as f32);
        let (cw, ch) = (canvas_width as f32, canvas_height as f32);
        let scale = (cw / iw).min(ch / ih);
        let width = iw * scale;
        let height = ih * scale;

        Self {
            id: LayerId::new(),
            name: name.into(),
            x: cw / 2.0 - width / 2.0,
            y: ch / 2.0 - height / 2.0,
            width,
            height,
            original_width,
            original_height,
            decode: DecodeState::Pending,
        }
    }

    /// Top-left position.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Displayed bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Intrinsic width / height ratio used for aspect-locked resizing.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.original_width.max(1) as f32 / self.original_height.max(1) as f32
    }

    /// Whether the pixels are ready to draw.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.decode == DecodeState::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_landscape_into_square_canvas() {
        let layer = ImageLayer::fit_to_canvas("photo.png", 800, 600, 300, 300);
        assert!((layer.width - 300.0).abs() < f32::EPSILON);
        assert!((layer.height - 225.0).abs() < f32::EPSILON);
        assert!(layer.x.abs() < f32::EPSILON);
        assert!((layer.y - 37.5).abs() < f32::EPSILON);
        assert_eq!(layer.decode, DecodeState::Pending);
    }

    #[test]
    fn test_small_image_is_scaled_up() {
        let layer = ImageLayer::fit_to_canvas("icon.png", 10, 20, 300, 300);
        assert!((layer.height - 300.0).abs() < f32::EPSILON);
        assert!((layer.width - 150.0).abs() < f32::EPSILON);
        assert!((layer.x - 75.0).abs() < f32::EPSILON);
        assert!(layer.y.abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_defaults() {
        let text = TextLayer::new(Point::new(150.0, 150.0), "Arial");
        assert_eq!(text.content, DEFAULT_TEXT_CONTENT);
        assert!((text.font_size - DEFAULT_FONT_SIZE).abs() < f32::EPSILON);
        assert_eq!(text.color, Color::BLACK);
        assert_eq!(text.align, TextAlign::Horizontal);
        assert_eq!(text.font, "Arial");
    }

    #[test]
    fn test_text_hit_bounds_centered_on_anchor() {
        let text = TextLayer::new(Point::new(100.0, 50.0), "Arial");
        let b = text.hit_bounds(60.0);
        assert_eq!(b, Bounds::new(70.0, 35.0, 60.0, 30.0));
    }

    #[test]
    fn test_align_parse() {
        assert_eq!("vertical".parse::<TextAlign>().unwrap(), TextAlign::Vertical);
        assert_eq!(" Horizontal ".parse::<TextAlign>().unwrap(), TextAlign::Horizontal);
        assert!("diagonal".parse::<TextAlign>().is_err());
    }

    #[test]
    fn test_decode_state_serializes_tagged() {
        let json = serde_json::to_string(&DecodeState::Failed("bad header".into())).unwrap();
        assert_eq!(json, r#"{"state":"failed","reason":"bad header"}"#);
    }
}
