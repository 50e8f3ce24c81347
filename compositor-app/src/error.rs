//! Application error types.

use std::path::PathBuf;

use compositor_core::CompositorError;
use compositor_renderer::RenderError;
use thiserror::Error;

/// Result type for editor operations.
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by the editor facade.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document or editor-state error.
    #[error(transparent)]
    Core(#[from] CompositorError),

    /// Decode, font, render or export error.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Reading an input or writing the export failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// Wrap an I/O error with the path it concerns.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
