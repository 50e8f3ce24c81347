//! Hit-testing and the drag/resize gesture state machine.
//!
//! ```text
//!            start on text / image body          end | cancel
//!   Idle ─────────────────────────────► Dragging ───────────► Idle
//!     │      start on image resize handle        end | cancel
//!     └─────────────────────────────────► Resizing ──────────► Idle
//! ```
//!
//! A gesture start that hits nothing clears the selection and stays `Idle`.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};
use crate::{CompositorError, Document, LayerId, Selection};

/// Side length of the square resize handle at an image's bottom-right corner.
pub const RESIZE_HANDLE_SIZE: f32 = 10.0;

/// Smallest width or height an image can be resized to.
pub const MIN_LAYER_SIZE: f32 = 1.0;

/// Measures rendered text so text layers can be hit-tested.
pub trait TextMeasure {
    /// Advance width in pixels of `text` set in `font` at `font_size` px.
    fn text_width(&self, text: &str, font: &str, font_size: f32) -> f32;
}

/// How successive move events feed into an image resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Size is computed from the size and touch point at gesture start.
    #[default]
    Anchored,
    /// Each move adds its delta since the previous move to the current size.
    Incremental,
}

impl std::str::FromStr for ResizeMode {
    type Err = CompositorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anchored" => Ok(Self::Anchored),
            "incremental" => Ok(Self::Incremental),
            other => Err(CompositorError::InvalidOperation(format!(
                "unknown resize mode '{other}'"
            ))),
        }
    }
}

/// What a point landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Inside a text layer's box.
    Text(LayerId),
    /// On an image's resize handle.
    ImageHandle(LayerId),
    /// Inside an image's bounds but not on its handle.
    ImageBody(LayerId),
}

impl HitTarget {
    /// The selection this hit produces.
    #[must_use]
    pub fn selection(self) -> Selection {
        match self {
            Self::Text(id) => Selection::Text(id),
            Self::ImageHandle(id) | Self::ImageBody(id) => Selection::Image(id),
        }
    }
}

/// Bounds of an image's resize handle, anchored at its bottom-right corner.
#[must_use]
pub fn resize_handle_bounds(image: &Bounds) -> Bounds {
    Bounds::new(
        image.right() - RESIZE_HANDLE_SIZE,
        image.bottom() - RESIZE_HANDLE_SIZE,
        RESIZE_HANDLE_SIZE,
        RESIZE_HANDLE_SIZE,
    )
}

/// Find the topmost layer under `point`.
///
/// Text layers are checked first, topmost first, then image layers topmost
/// first. For each image the resize handle takes precedence over its body.
#[must_use]
pub fn hit_test(doc: &Document, point: Point, measure: &dyn TextMeasure) -> Option<HitTarget> {
    let text_hit = doc.texts().rev().find(|text| {
        let width = measure.text_width(&text.content, &text.font, text.font_size);
        text.hit_bounds(width).contains(point)
    });
    if let Some(text) = text_hit {
        return Some(HitTarget::Text(text.id));
    }

    doc.images().rev().find_map(|image| {
        let bounds = image.bounds();
        if resize_handle_bounds(&bounds).contains(point) {
            Some(HitTarget::ImageHandle(image.id))
        } else if bounds.contains(point) {
            Some(HitTarget::ImageBody(image.id))
        } else {
            None
        }
    })
}

/// New `(width, height)` for an aspect-locked resize.
///
/// The raw size `base + delta` is corrected so neither side shrinks below
/// what `aspect_ratio` (width / height) demands of the other:
/// `width = max(w, h * ar)`, `height = max(h, w / ar)`.
#[must_use]
pub fn aspect_locked_size(base: (f32, f32), delta: Point, aspect_ratio: f32) -> (f32, f32) {
    let new_width = base.0 + delta.x;
    let new_height = base.1 + delta.y;
    let width = new_width.max(new_height * aspect_ratio);
    let height = new_height.max(new_width / aspect_ratio);
    (width.max(MIN_LAYER_SIZE), height.max(MIN_LAYER_SIZE))
}

/// Current gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving a layer.
    Dragging {
        /// Layer being moved.
        target: Selection,
        /// Touch point minus layer position at gesture start.
        offset: Point,
    },
    /// Resizing an image through its handle.
    Resizing {
        /// Image being resized.
        layer: LayerId,
        /// Reference touch point for the next delta.
        anchor: Point,
        /// Reference size for the next delta.
        base: (f32, f32),
    },
}

/// Drives drag and resize gestures against a [`Document`].
#[derive(Debug, Clone, Default)]
pub struct GestureEngine {
    state: GestureState,
    mode: ResizeMode,
}

impl GestureEngine {
    /// Create an idle engine with the given resize mode.
    #[must_use]
    pub fn new(mode: ResizeMode) -> Self {
        Self {
            state: GestureState::Idle,
            mode,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Resize mode in use.
    #[must_use]
    pub fn resize_mode(&self) -> ResizeMode {
        self.mode
    }

    /// Change the resize mode. Takes effect from the next gesture.
    pub fn set_resize_mode(&mut self, mode: ResizeMode) {
        self.mode = mode;
    }

    /// Whether a drag or resize is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Start a gesture at `point` and return the resulting selection.
    ///
    /// Any gesture already in progress is abandoned.
    pub fn begin(&mut self, doc: &Document, point: Point, measure: &dyn TextMeasure) -> Selection {
        let Some(hit) = hit_test(doc, point, measure) else {
            tracing::debug!("Gesture start at ({}, {}) hit nothing", point.x, point.y);
            self.state = GestureState::Idle;
            return Selection::None;
        };

        self.state = match hit {
            HitTarget::Text(id) => doc.text(id).map_or(GestureState::Idle, |text| {
                GestureState::Dragging {
                    target: Selection::Text(id),
                    offset: point - text.position(),
                }
            }),
            HitTarget::ImageBody(id) => doc.image(id).map_or(GestureState::Idle, |image| {
                GestureState::Dragging {
                    target: Selection::Image(id),
                    offset: point - image.position(),
                }
            }),
            HitTarget::ImageHandle(id) => doc.image(id).map_or(GestureState::Idle, |image| {
                GestureState::Resizing {
                    layer: id,
                    anchor: point,
                    base: (image.width, image.height),
                }
            }),
        };

        tracing::debug!("Gesture start on {hit:?}: {:?}", self.state);
        hit.selection()
    }

    /// Feed a move event. Returns `true` if the document changed.
    ///
    /// If the target layer disappeared mid-gesture the gesture ends.
    pub fn update(&mut self, doc: &mut Document, point: Point) -> bool {
        let result = match self.state {
            GestureState::Idle => return false,
            GestureState::Dragging { target, offset } => {
                let position = point - offset;
                match target {
                    Selection::Text(id) => doc.update_text(id, |text| {
                        text.x = position.x;
                        text.y = position.y;
                    }),
                    Selection::Image(id) => doc.update_image(id, |image| {
                        image.x = position.x;
                        image.y = position.y;
                    }),
                    Selection::None => Ok(()),
                }
            }
            GestureState::Resizing {
                layer,
                anchor,
                base,
            } => {
                let mode = self.mode;
                let resized = doc.update_image(layer, |image| {
                    let base = match mode {
                        ResizeMode::Anchored => base,
                        ResizeMode::Incremental => (image.width, image.height),
                    };
                    let (width, height) =
                        aspect_locked_size(base, point - anchor, image.aspect_ratio());
                    image.width = width;
                    image.height = height;
                });
                if resized.is_ok() && mode == ResizeMode::Incremental {
                    self.state = GestureState::Resizing {
                        layer,
                        anchor: point,
                        base,
                    };
                }
                resized
            }
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Gesture target lost, ending gesture: {e}");
                self.state = GestureState::Idle;
                false
            }
        }
    }

    /// End the current gesture. The selection is left untouched.
    pub fn end(&mut self) {
        if self.is_active() {
            tracing::debug!("Gesture end: {:?}", self.state);
        }
        self.state = GestureState::Idle;
    }
}
