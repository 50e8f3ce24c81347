//! Canvas configuration: output size and background.

use serde::{Deserialize, Serialize};

use crate::{Color, CompositorError, CompositorResult};

/// Smallest accepted canvas side, in pixels.
pub const MIN_CANVAS_DIMENSION: u32 = 1;

/// Largest accepted canvas side, in pixels.
pub const MAX_CANVAS_DIMENSION: u32 = 16_384;

/// Default canvas width and height.
pub const DEFAULT_CANVAS_SIZE: u32 = 300;

/// Global canvas settings. Any change requires a full redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Background fill.
    pub background: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_SIZE,
            height: DEFAULT_CANVAS_SIZE,
            background: Color::WHITE,
        }
    }
}

impl CanvasConfig {
    /// Create a config with the given size and a white background.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::InvalidDimension`] if either side is out of range.
    pub fn new(width: u32, height: u32) -> CompositorResult<Self> {
        validate_dimension("width", width)?;
        validate_dimension("height", height)?;
        Ok(Self {
            width,
            height,
            background: Color::WHITE,
        })
    }

    /// Canvas center point.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self) -> crate::Point {
        crate::Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

/// Check that a canvas side is within `[MIN_CANVAS_DIMENSION, MAX_CANVAS_DIMENSION]`.
///
/// # Errors
///
/// Returns [`CompositorError::InvalidDimension`] naming the offending side.
pub fn validate_dimension(side: &str, value: u32) -> CompositorResult<u32> {
    if (MIN_CANVAS_DIMENSION..=MAX_CANVAS_DIMENSION).contains(&value) {
        Ok(value)
    } else {
        Err(CompositorError::InvalidDimension(format!(
            "canvas {side} {value} outside {MIN_CANVAS_DIMENSION}..={MAX_CANVAS_DIMENSION}"
        )))
    }
}

/// Aspect-ratio presets offered by the canvas toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectPreset {
    /// 1:1
    #[serde(rename = "1:1")]
    Square,
    /// 16:9
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectPreset {
    /// All presets in toolbar order.
    pub const ALL: [Self; 3] = [Self::Square, Self::Landscape, Self::Portrait];

    /// `(width, height)` ratio terms.
    #[must_use]
    pub fn ratio(self) -> (u32, u32) {
        match self {
            Self::Square => (1, 1),
            Self::Landscape => (16, 9),
            Self::Portrait => (9, 16),
        }
    }

    /// Height for the given width, truncated to whole pixels and at least 1.
    #[must_use]
    pub fn height_for(self, width: u32) -> u32 {
        let (w, h) = self.ratio();
        let height = u64::from(width) * u64::from(h) / u64::from(w);
        u32::try_from(height).unwrap_or(u32::MAX).max(MIN_CANVAS_DIMENSION)
    }

    /// Label as shown in the selector.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

impl std::str::FromStr for AspectPreset {
    type Err = CompositorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == s.trim())
            .ok_or_else(|| CompositorError::InvalidOperation(format!("unknown aspect ratio '{s}'")))
    }
}

impl std::fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CanvasConfig::default();
        assert_eq!((config.width, config.height), (300, 300));
        assert_eq!(config.background, Color::WHITE);
        assert_eq!(config.center(), crate::Point::new(150.0, 150.0));
    }

    #[test]
    fn test_dimension_bounds() {
        assert!(CanvasConfig::new(0, 10).is_err());
        assert!(CanvasConfig::new(10, MAX_CANVAS_DIMENSION + 1).is_err());
        assert!(CanvasConfig::new(1, 1).is_ok());
    }

    #[test]
    fn test_aspect_presets_recompute_height() {
        assert_eq!(AspectPreset::Square.height_for(300), 300);
        assert_eq!(AspectPreset::Landscape.height_for(300), 168);
        assert_eq!(AspectPreset::Portrait.height_for(300), 533);
        assert_eq!(AspectPreset::Landscape.height_for(1), 1);
    }

    #[test]
    fn test_aspect_parse() {
        assert_eq!("16:9".parse::<AspectPreset>().unwrap(), AspectPreset::Landscape);
        assert!("4:3".parse::<AspectPreset>().is_err());
    }
}
