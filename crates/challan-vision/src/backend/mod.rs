//! Vision backend implementations.

pub mod gemini;

use crate::Result;

/// One model call: document bytes plus the declared media type.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl VisionRequest {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Whether the vision path accepts this media type.
pub fn supported_media(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type == "application/pdf"
}

/// Trait for generative vision model backends.
///
/// A backend takes document bytes plus an extraction prompt and returns the
/// model's raw answer text. Parsing that text into a record is the caller's
/// concern.
#[allow(async_fn_in_trait)]
pub trait VisionBackend {
    /// Send a single extraction call. One attempt, no retries.
    async fn extract(&self, request: &VisionRequest, prompt: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_media() {
        assert!(supported_media("image/jpeg"));
        assert!(supported_media("image/png"));
        assert!(supported_media("application/pdf"));
        assert!(!supported_media("text/plain"));
        assert!(!supported_media("application/zip"));
    }
}
