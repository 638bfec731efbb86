//! Extraction pipeline: the model path with deterministic fallback.
//!
//! One call sends the document to the vision backend, normalizes the answer,
//! and maps it onto the canonical record. When the model path cannot produce
//! a record and the request carries OCR text, the regex fallback takes over.
//! Credential and unsupported-input errors always propagate; they are
//! configuration problems, not document problems.

use tracing::{info, warn};

use challan_vision::{VisionBackend, VisionError, VisionRequest, supported_media};

use crate::config::ChallanConfig;
use crate::error::{ChallanError, ResponseError, Result};
use crate::fallback;
use crate::mapper;
use crate::normalize;
use crate::prompt;
use crate::record::{ExtractionRequest, ExtractionResult, ExtractionSource, InventoryRecord};

/// Orchestrates one document extraction end to end.
pub struct DocumentPipeline<B> {
    backend: B,
    config: ChallanConfig,
}

impl<B: VisionBackend> DocumentPipeline<B> {
    pub fn new(backend: B, config: ChallanConfig) -> Self {
        Self { backend, config }
    }

    /// Extract a record from a document.
    ///
    /// Transport failures and unusable model answers degrade to fallback
    /// extraction when the request carries OCR text blocks. Without OCR
    /// text, a transport failure propagates and an unusable answer becomes
    /// a default record with the raw answer preserved.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult> {
        if !supported_media(&request.mime_type) {
            return Err(ChallanError::Vision(VisionError::UnsupportedInput {
                mime_type: request.mime_type.clone(),
            }));
        }

        let prompt_text = prompt::default_prompt();
        let vision_request = VisionRequest::new(request.bytes.clone(), request.mime_type.clone());

        let answer = match self.backend.extract(&vision_request, &prompt_text).await {
            Ok(answer) => answer,
            Err(err @ VisionError::Credential(_)) => return Err(err.into()),
            Err(err @ VisionError::UnsupportedInput { .. }) => return Err(err.into()),
            Err(err) => {
                if request.text_blocks.is_empty() {
                    return Err(err.into());
                }
                warn!(error = %err, "model call failed, switching to fallback extraction");
                return Ok(self.run_fallback(request, format!("model call failed: {err}")));
            }
        };

        match normalize::normalize(&answer) {
            Ok(parsed) => {
                let (record, warnings) = mapper::map_record(&parsed, &self.config.extraction);
                info!(warnings = warnings.len(), "record extracted via model");
                Ok(ExtractionResult {
                    record,
                    source: ExtractionSource::Model,
                    warnings,
                    raw_text: None,
                })
            }
            Err(ResponseError::MalformedAnswer { raw }) => {
                if request.text_blocks.is_empty() {
                    warn!("model answer is not a JSON object and no OCR text is available");
                    return Ok(ExtractionResult {
                        record: InventoryRecord::default(),
                        source: ExtractionSource::Model,
                        warnings: vec!["model answer is not a JSON object".to_string()],
                        raw_text: Some(raw),
                    });
                }
                warn!("model answer is not a JSON object, switching to fallback extraction");
                let mut result =
                    self.run_fallback(request, "model answer is not a JSON object".to_string());
                result.raw_text = Some(raw);
                Ok(result)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Regex-only extraction over OCR text, bypassing the model entirely.
    pub fn extract_from_text(&self, blocks: &[String]) -> ExtractionResult {
        let (record, warnings) = fallback::extract_fallback(blocks, &self.config.extraction);
        ExtractionResult {
            record,
            source: ExtractionSource::Fallback,
            warnings,
            raw_text: None,
        }
    }

    fn run_fallback(&self, request: &ExtractionRequest, reason: String) -> ExtractionResult {
        let (record, mut fallback_warnings) =
            fallback::extract_fallback(&request.text_blocks, &self.config.extraction);
        let mut warnings = vec![reason];
        warnings.append(&mut fallback_warnings);
        ExtractionResult {
            record,
            source: ExtractionSource::Fallback,
            warnings,
            raw_text: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use challan_vision::CredentialError;
    use pretty_assertions::assert_eq;

    use crate::record::SourceKind;

    struct FakeBackend<F>(F);

    impl<F: Fn() -> challan_vision::Result<String>> VisionBackend for FakeBackend<F> {
        async fn extract(
            &self,
            _request: &VisionRequest,
            _prompt: &str,
        ) -> challan_vision::Result<String> {
            (self.0)()
        }
    }

    fn pipeline<F: Fn() -> challan_vision::Result<String>>(reply: F) -> DocumentPipeline<FakeBackend<F>> {
        DocumentPipeline::new(FakeBackend(reply), ChallanConfig::default())
    }

    fn image_request() -> ExtractionRequest {
        ExtractionRequest::new(vec![1, 2, 3], "image/png", SourceKind::Image)
    }

    fn image_request_with_text() -> ExtractionRequest {
        image_request().with_text_blocks(vec!["Order No: INV-9".to_string()])
    }

    #[tokio::test]
    async fn test_model_answer_becomes_record() {
        let pipeline = pipeline(|| {
            Ok("```json\n{\"orderNo\": \"INV-1\", \"netPayable\": \"\u{20b9}5,900\"}\n```"
                .to_string())
        });

        let result = pipeline.extract(&image_request()).await.unwrap();
        assert_eq!(result.source, ExtractionSource::Model);
        assert_eq!(result.record.order_no, "INV-1");
        assert_eq!(result.record.net_payable, 5900.0);
        assert_eq!(result.raw_text, None);
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_to_fallback() {
        let pipeline = pipeline(|| Err(VisionError::Transport("connection refused".to_string())));

        let result = pipeline.extract(&image_request_with_text()).await.unwrap();
        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(result.record.order_no, "INV-9");
        assert!(result.warnings[0].contains("model call failed"));
    }

    #[tokio::test]
    async fn test_transport_failure_without_text_propagates() {
        let pipeline = pipeline(|| Err(VisionError::Transport("connection refused".to_string())));

        let err = pipeline.extract(&image_request()).await.unwrap_err();
        assert!(matches!(
            err,
            ChallanError::Vision(VisionError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_credential_error_never_degrades() {
        let pipeline = pipeline(|| {
            Err(VisionError::Credential(CredentialError::Missing {
                var: "GEMINI_API_KEY".to_string(),
            }))
        });

        let err = pipeline.extract(&image_request_with_text()).await.unwrap_err();
        assert!(matches!(
            err,
            ChallanError::Vision(VisionError::Credential(_))
        ));
    }

    #[tokio::test]
    async fn test_prose_answer_degrades_to_fallback_with_raw_text() {
        let pipeline = pipeline(|| Ok("I could not read this document.".to_string()));

        let result = pipeline.extract(&image_request_with_text()).await.unwrap();
        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(result.record.order_no, "INV-9");
        assert_eq!(
            result.raw_text.as_deref(),
            Some("I could not read this document.")
        );
    }

    #[tokio::test]
    async fn test_prose_answer_without_text_yields_default_record() {
        let pipeline = pipeline(|| Ok("I could not read this document.".to_string()));

        let result = pipeline.extract(&image_request()).await.unwrap();
        assert_eq!(result.source, ExtractionSource::Model);
        assert_eq!(result.record, InventoryRecord::default());
        assert_eq!(
            result.raw_text.as_deref(),
            Some("I could not read this document.")
        );
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_media_rejected_before_model_call() {
        let pipeline = pipeline(|| unreachable!("backend must not be called"));

        let request = ExtractionRequest::new(vec![0u8; 4], "text/plain", SourceKind::Document);
        let err = pipeline.extract(&request).await.unwrap_err();
        assert!(matches!(
            err,
            ChallanError::Vision(VisionError::UnsupportedInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_text_only_extraction() {
        let pipeline = pipeline(|| unreachable!("backend must not be called"));

        let result = pipeline.extract_from_text(&["Net Payable: 1234".to_string()]);
        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(result.record.net_payable, 1234.0);
    }
}
