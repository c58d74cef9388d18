//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
///
/// Per-entity problems (an image that fails to decode, a missing font) are
/// logged and skipped, not returned.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Surface allocation failed.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Font data could not be parsed.
    #[error("Invalid font: {0}")]
    Font(String),

    /// Encoding the output failed.
    #[error("Export failed: {0}")]
    Export(String),
}
