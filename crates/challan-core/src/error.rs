//! Error types for the challan-core library.

use thiserror::Error;

/// Main error type for the challan library.
#[derive(Error, Debug)]
pub enum ChallanError {
    /// Field schema lookup error.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Error from the vision model layer.
    #[error("model error: {0}")]
    Vision(#[from] challan_vision::VisionError),

    /// Model response could not be turned into a record.
    #[error("response error: {0}")]
    Response(#[from] ResponseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to the field schema registry.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Requested field id is not part of the registry.
    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// Errors related to model answer normalization and mapping.
#[derive(Error, Debug)]
pub enum ResponseError {
    /// The model answer is not a JSON object, even after fence stripping.
    /// Carries the original text so the caller can decide on fallback.
    #[error("model answer is not a JSON object")]
    MalformedAnswer { raw: String },

    /// A mapped value failed kind coercion.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },
}

/// Result type for the challan library.
pub type Result<T> = std::result::Result<T, ChallanError>;
