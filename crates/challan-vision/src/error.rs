//! Error types for the vision model layer.

use thiserror::Error;

use crate::credential::CredentialError;

/// Errors that can occur when calling a vision model backend.
#[derive(Error, Debug)]
pub enum VisionError {
    /// The API credential is missing or malformed. Surfaced verbatim to the
    /// caller; the pipeline never degrades this into a fallback run.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// The declared media type is not accepted by the vision path.
    #[error("unsupported input type: {mime_type}")]
    UnsupportedInput { mime_type: String },

    /// Network failure, timeout, or a non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The model responded but produced no answer text.
    #[error("model returned no answer text")]
    EmptyAnswer,
}
