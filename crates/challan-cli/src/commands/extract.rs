//! Extract command - run one document through the vision model pipeline.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use challan_core::{
    ChallanConfig, DocumentPipeline, ExtractionRequest, ExtractionResult, ExtractionSource,
    GeminiBackend, GeminiOptions, SourceKind, schema,
};

use super::{load_config, mime_for_path};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (image or PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// OCR text file whose lines feed the regex fallback
    #[arg(short, long)]
    text: Option<PathBuf>,

    /// Override the configured model identifier
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model) = &args.model {
        config.model.model = model.clone();
    }

    // The credential is checked before the input is even read. A bad key
    // must never turn into a silent fallback run.
    let backend = build_backend(&config)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let Some(mime_type) = mime_for_path(&args.input) else {
        anyhow::bail!(
            "Unsupported file format: {}",
            args.input.display()
        );
    };

    info!("Processing file: {}", args.input.display());

    let bytes = fs::read(&args.input)?;
    let mut request = ExtractionRequest::new(bytes, mime_type, source_kind(mime_type));

    if let Some(text_path) = &args.text {
        let text = fs::read_to_string(text_path)?;
        let blocks: Vec<String> = text.lines().map(str::to_string).collect();
        debug!("Loaded {} OCR text blocks from {}", blocks.len(), text_path.display());
        request = request.with_text_blocks(blocks);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting fields...");

    let pipeline = DocumentPipeline::new(backend, config);
    let result = pipeline.extract(&request).await?;

    pb.finish_and_clear();

    if result.source == ExtractionSource::Fallback {
        eprintln!(
            "{} Model path unavailable, record produced by regex fallback",
            style("ℹ").blue()
        );
    }

    for warning in &result.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{output}");
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build the Gemini backend from the model configuration.
pub fn build_backend(config: &ChallanConfig) -> anyhow::Result<GeminiBackend> {
    let backend = GeminiBackend::from_env(GeminiOptions {
        endpoint: config.model.endpoint.clone(),
        model: config.model.model.clone(),
        timeout: Duration::from_secs(config.model.timeout_secs),
        max_output_tokens: config.model.max_output_tokens,
        temperature: config.model.temperature,
    })?;
    Ok(backend)
}

pub fn source_kind(mime_type: &str) -> SourceKind {
    if mime_type == "application/pdf" {
        SourceKind::Document
    } else {
        SourceKind::Image
    }
}

/// Render an extraction result in the requested format.
pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.serialize(&result.record)?;
            writer.flush()?;
            Ok(String::from_utf8(writer.into_inner()?)?)
        }
        OutputFormat::Text => {
            let values = serde_json::to_value(&result.record)?;
            let mut lines = Vec::with_capacity(schema::fields().len());
            for spec in schema::fields() {
                let rendered = match &values[spec.id] {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                lines.push(format!("{:<22} {}", spec.id, rendered));
            }
            Ok(lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use challan_core::InventoryRecord;

    fn sample_result() -> ExtractionResult {
        let mut record = InventoryRecord::default();
        record.order_no = "INV-1".to_string();
        record.net_payable = 5900.0;
        ExtractionResult {
            record,
            source: ExtractionSource::Model,
            warnings: Vec::new(),
            raw_text: None,
        }
    }

    #[test]
    fn test_json_output_contains_all_fields() {
        let output = format_result(&sample_result(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["record"]["orderNo"], "INV-1");
        assert_eq!(value["record"]["netPayable"], 5900.0);
        assert_eq!(value["source"], "model");
    }

    #[test]
    fn test_csv_output_has_header_and_row() {
        let output = format_result(&sample_result(), OutputFormat::Csv).unwrap();
        let mut lines = output.lines();
        let header = lines.next().unwrap();
        let row = lines.next().unwrap();
        assert!(header.starts_with("orderNo,"));
        assert!(header.ends_with("netPayable"));
        assert!(row.starts_with("INV-1,"));
        assert!(row.ends_with("5900.0"));
    }

    #[test]
    fn test_text_output_one_line_per_field() {
        let output = format_result(&sample_result(), OutputFormat::Text).unwrap();
        assert_eq!(output.lines().count(), 17);
        assert!(output.lines().next().unwrap().starts_with("orderNo"));
    }
}
