//! Error types for compositor operations.

use thiserror::Error;

/// Result type for compositor operations.
pub type CompositorResult<T> = Result<T, CompositorError>;

/// Errors that can occur while editing a composition.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// Layer not found in the document.
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    /// Invalid layer operation.
    #[error("Invalid operation on layer: {0}")]
    InvalidOperation(String),

    /// A color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A size or dimension is out of range.
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// Snapshot serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
