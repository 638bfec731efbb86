//! Core library for invoice/challan field extraction.
//!
//! This crate provides:
//! - the canonical 17-field record schema for invoices and delivery challans
//! - prompt construction for generative vision model extraction
//! - answer normalization (fence stripping, strict JSON parsing) and total
//!   field mapping with kind defaults
//! - a deterministic regex fallback over recognized OCR text
//! - the extraction pipeline tying the model path and the fallback together

pub mod config;
pub mod error;
pub mod fallback;
pub mod mapper;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod record;
pub mod schema;

pub use config::{ChallanConfig, ExtractionConfig, ModelConfig};
pub use error::{ChallanError, ResponseError, Result, SchemaError};
pub use pipeline::DocumentPipeline;
pub use record::{
    ExtractionRequest, ExtractionResult, ExtractionSource, FieldValue, InventoryRecord, SourceKind,
};
pub use schema::{FieldKind, FieldSpec, fields};

/// Re-export vision layer types.
pub use challan_vision::{
    ApiCredential, CredentialError, GeminiBackend, GeminiOptions, VisionBackend, VisionError,
    VisionRequest, supported_media,
};
