//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the challan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallanConfig {
    /// Vision model configuration.
    pub model: ModelConfig,

    /// Record extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Vision model endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier.
    pub model: String,

    /// API base URL.
    pub endpoint: String,

    /// Request timeout in seconds. The provider is not assumed to have one.
    pub timeout_secs: u64,

    /// Maximum answer tokens.
    pub max_output_tokens: u32,

    /// Sampling temperature. Low for consistent extraction.
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 120,
            max_output_tokens: 4096,
            temperature: 0.1,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Reformat date fields to DD/MM/YYYY when unambiguous.
    pub normalize_dates: bool,

    /// Keywords used to locate the product row in fallback OCR text.
    pub line_item_keywords: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            normalize_dates: true,
            line_item_keywords: vec![
                "eco".to_string(),
                "material".to_string(),
                "cool".to_string(),
            ],
        }
    }
}

impl ChallanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
