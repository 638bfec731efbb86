//! Generative vision model layer for challan.
//!
//! This crate provides a unified interface for sending a document image plus
//! an extraction prompt to a generative vision model and getting raw answer
//! text back:
//! - credential validation before any bytes leave the machine
//! - a Gemini `generateContent` backend over HTTPS

mod backend;
mod credential;
mod error;

pub use backend::gemini::{API_KEY_VAR, GeminiBackend, GeminiOptions, REQUIRED_KEY_PREFIX};
pub use backend::{VisionBackend, VisionRequest, supported_media};
pub use credential::{ApiCredential, CredentialError};
pub use error::VisionError;

/// Result type for vision model operations.
pub type Result<T> = std::result::Result<T, VisionError>;
