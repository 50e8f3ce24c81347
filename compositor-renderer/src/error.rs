//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while decoding resources or rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource loading failed (bad data URI, unreadable bytes).
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Image bytes could not be probed or decoded.
    #[error("Image decode failed: {0}")]
    Decode(String),

    /// Font bytes could not be parsed.
    #[error("Font load failed: {0}")]
    Font(String),

    /// Pixel surface could not be allocated.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Encoding the surface failed.
    #[error("Export failed: {0}")]
    Export(String),
}
