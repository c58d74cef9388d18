//! Error types for editor operations.
//!
//! Interactive operations never fail: out-of-range input is clamped and
//! forbidden mutations are ignored. Errors only surface when parsing
//! external input or when a caller asks for a strict lookup.

use thiserror::Error;

use crate::EntityId;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity not found in the scene.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A shape kind name is not recognised.
    #[error("Unknown shape kind: {0}")]
    UnknownShapeKind(String),

    /// The host environment refused a request (e.g. full-screen).
    #[error("Environment request failed: {0}")]
    Environment(String),

    /// Snapshot serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
