//! Error types for extraction and composition

use thiserror::Error;

/// Errors that abort an export.
///
/// Per-message problems are not errors; see [`crate::extract::MalformedMessage`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The conversation container landmark is missing from the page.
    #[error("conversation container not found (looked for {landmark})")]
    ContainerNotFound { landmark: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}
