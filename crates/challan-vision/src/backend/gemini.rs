//! Gemini `generateContent` backend.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::{VisionBackend, VisionRequest, supported_media};
use crate::credential::ApiCredential;
use crate::error::VisionError;
use crate::Result;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Gemini keys are issued with this prefix. Anything else is rejected
/// before any document bytes leave the machine.
pub const REQUIRED_KEY_PREFIX: &str = "AI";

/// Backend calling the Gemini `generateContent` REST endpoint.
pub struct GeminiBackend {
    client: Client,
    credential: ApiCredential,
    endpoint: String,
    model: String,
    timeout: Duration,
    max_output_tokens: u32,
    temperature: f32,
}

/// Construction options mirrored from the caller's model configuration.
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl GeminiBackend {
    /// Build a backend from a validated credential.
    pub fn new(credential: ApiCredential, options: GeminiOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| VisionError::Transport(e.without_url().to_string()))?;

        Ok(Self {
            client,
            credential,
            endpoint: options.endpoint,
            model: options.model,
            timeout: options.timeout,
            max_output_tokens: options.max_output_tokens,
            temperature: options.temperature,
        })
    }

    /// Read `GEMINI_API_KEY` from the environment, validate its prefix, and
    /// build a backend.
    pub fn from_env(options: GeminiOptions) -> Result<Self> {
        let credential = ApiCredential::from_env(API_KEY_VAR, REQUIRED_KEY_PREFIX)?;
        Self::new(credential, options)
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            self.credential.reveal()
        )
    }

    fn build_payload(&self, request: &VisionRequest, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.mime_type.clone(),
                            data: BASE64.encode(&request.bytes),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

impl VisionBackend for GeminiBackend {
    async fn extract(&self, request: &VisionRequest, prompt: &str) -> Result<String> {
        if !supported_media(&request.mime_type) {
            return Err(VisionError::UnsupportedInput {
                mime_type: request.mime_type.clone(),
            });
        }

        let payload = self.build_payload(request, prompt);

        debug!(
            model = %self.model,
            mime_type = %request.mime_type,
            bytes = request.bytes.len(),
            "sending generateContent request"
        );

        // Single attempt, no retries. Note that the URL carries the key as a
        // query parameter, so reqwest errors are stripped of it before they
        // reach any log or error message.
        let response = self
            .client
            .post(self.request_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VisionError::Transport(format!(
                        "request timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    VisionError::Transport(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "generateContent call failed");
            return Err(VisionError::Transport(format!("HTTP {status}: {body}")));
        }

        let answer: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Transport(e.without_url().to_string()))?;

        answer
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(VisionError::EmptyAnswer)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
