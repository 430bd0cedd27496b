//! Engine error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported to the immediate caller of an engine operation.
///
/// The game loop never produces these itself: it only iterates objects it
/// already holds.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An engine is already alive in this process.
    #[error("an engine instance is already active")]
    AlreadyActive,

    /// The engine behind a host handle has been dropped.
    #[error("no engine instance is active")]
    NotActive,

    /// No registered object carries this name.
    #[error("game object not found: {0}")]
    EntityNotFound(String),

    /// Another registered object already carries this name.
    #[error("duplicate game object name: {0}")]
    DuplicateName(String),

    /// Lookup of an asset that was never loaded.
    #[error("{kind} not found: {name}")]
    AssetNotFound { kind: &'static str, name: String },

    /// A source could not be turned into an asset.
    #[error("failed to load {}: {reason}", path.display())]
    AssetLoad { path: PathBuf, reason: String },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Mouse buttons are indexed 0 (left), 1 (middle), 2 (right).
    #[error("invalid mouse button index: {0}")]
    InvalidMouseButton(usize),

    /// The audio output device could not be opened.
    #[error("audio output error: {0}")]
    Audio(String),

    /// A collider must hold at least one rectangle.
    #[error("collider must contain at least one rectangle")]
    EmptyCollider,
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
