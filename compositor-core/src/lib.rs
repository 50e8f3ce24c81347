//! # Compositor Core
//!
//! Document model and interaction logic for a single-canvas image and text
//! compositor. Free of any rendering backend, so it runs natively and in WASM.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              compositor-core                │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Gesture Engine          │
//! │  - Canvas config │  - Hit testing           │
//! │  - Image layers  │  - Drag with grab offset │
//! │  - Text layers   │  - Aspect-locked resize  │
//! ├─────────────────────────────────────────────┤
//! │  Editor State    │  Selection               │
//! │  - Toolbar ops   │  - None / Text / Image   │
//! │  - Touch input   │  - Toolbar snapshot      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod color;
pub mod document;
pub mod error;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod layer;
pub mod selection;
pub mod state;

pub use canvas::{
    AspectPreset, CanvasConfig, DEFAULT_CANVAS_SIZE, MAX_CANVAS_DIMENSION, MIN_CANVAS_DIMENSION,
};
pub use color::Color;
pub use document::Document;
pub use error::{CompositorError, CompositorResult};
pub use event::{TouchEvent, TouchPhase, TouchPoint};
pub use geometry::{Bounds, Point};
pub use gesture::{GestureEngine, GestureState, HitTarget, ResizeMode, TextMeasure};
pub use layer::{DecodeState, ImageLayer, LayerId, TextAlign, TextLayer, MAX_FONT_SIZE};
pub use selection::Selection;
pub use state::{EditorState, TextFields, ToolbarState, DEFAULT_FONT, PRESET_FONTS};

/// Compositor core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
