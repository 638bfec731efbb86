//! Batch processing command for multiple documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use challan_core::{DocumentPipeline, ExtractionRequest, ExtractionResult};

use super::extract::{OutputFormat, build_backend, format_result, source_kind};
use super::{load_config, mime_for_path};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Directory holding OCR text sidecars (<stem>.txt) for the fallback
    #[arg(long)]
    text_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct BatchItem {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let backend = build_backend(&config)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| mime_for_path(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let pipeline = DocumentPipeline::new(backend, config);
    let mut items = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &pipeline, args.text_dir.as_deref()).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(extraction) => {
                items.push(BatchItem {
                    path: path.clone(),
                    result: Some(extraction),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    items.push(BatchItem {
                        path: path.clone(),
                        result: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let successful = items.iter().filter(|i| i.result.is_some()).count();
    let failed = items.iter().filter(|i| i.error.is_some()).count();

    // Write per-file outputs
    if let Some(ref output_dir) = args.output_dir {
        for item in &items {
            let Some(ref result) = item.result else {
                continue;
            };
            let stem = item
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("record");
            let extension = match args.format {
                OutputFormat::Json => "json",
                OutputFormat::Csv => "csv",
                OutputFormat::Text => "txt",
            };
            let output_path = output_dir.join(format!("{stem}.{extension}"));
            fs::write(&output_path, format_result(result, args.format)?)?;
            debug!("Wrote {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("summary.csv");
        write_summary(&summary_path, &items)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!(
        "{} Processed {} files ({} ok, {} failed) in {:.1}s",
        style("✓").green(),
        items.len(),
        successful,
        failed,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

async fn process_single_file<B: challan_core::VisionBackend>(
    path: &Path,
    pipeline: &DocumentPipeline<B>,
    text_dir: Option<&Path>,
) -> anyhow::Result<ExtractionResult> {
    let Some(mime_type) = mime_for_path(path) else {
        anyhow::bail!("Unsupported file format: {}", path.display());
    };

    let bytes = fs::read(path)?;
    let mut request = ExtractionRequest::new(bytes, mime_type, source_kind(mime_type));

    if let Some(sidecar) = find_sidecar(path, text_dir) {
        let text = fs::read_to_string(&sidecar)?;
        debug!("Using OCR sidecar {}", sidecar.display());
        request = request.with_text_blocks(text.lines().map(str::to_string).collect());
    }

    Ok(pipeline.extract(&request).await?)
}

/// Look for `<stem>.txt` next to the document, or in the given directory.
fn find_sidecar(path: &Path, text_dir: Option<&Path>) -> Option<PathBuf> {
    let stem = path.file_stem()?;
    let name = format!("{}.txt", stem.to_str()?);

    let candidate = match text_dir {
        Some(dir) => dir.join(&name),
        None => path.with_file_name(&name),
    };

    candidate.exists().then_some(candidate)
}

fn write_summary(path: &Path, items: &[BatchItem]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "file",
        "status",
        "source",
        "orderNo",
        "netPayable",
        "warnings",
        "time_ms",
    ])?;

    for item in items {
        match (&item.result, &item.error) {
            (Some(result), _) => {
                writer.write_record([
                    item.path.display().to_string(),
                    "ok".to_string(),
                    match result.source {
                        challan_core::ExtractionSource::Model => "model".to_string(),
                        challan_core::ExtractionSource::Fallback => "fallback".to_string(),
                    },
                    result.record.order_no.clone(),
                    result.record.net_payable.to_string(),
                    result.warnings.len().to_string(),
                    item.processing_time_ms.to_string(),
                ])?;
            }
            (None, Some(error)) => {
                writer.write_record([
                    item.path.display().to_string(),
                    "error".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    error.clone(),
                    item.processing_time_ms.to_string(),
                ])?;
            }
            (None, None) => {}
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sidecar_next_to_document() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("scan.png");
        let txt = dir.path().join("scan.txt");
        fs::write(&doc, b"img").unwrap();
        fs::write(&txt, "Order No: INV-1").unwrap();

        assert_eq!(find_sidecar(&doc, None), Some(txt));
    }

    #[test]
    fn test_find_sidecar_in_text_dir() {
        let docs = tempfile::tempdir().unwrap();
        let texts = tempfile::tempdir().unwrap();
        let doc = docs.path().join("scan.png");
        let txt = texts.path().join("scan.txt");
        fs::write(&doc, b"img").unwrap();
        fs::write(&txt, "Order No: INV-1").unwrap();

        assert_eq!(find_sidecar(&doc, Some(texts.path())), Some(txt));
    }

    #[test]
    fn test_find_sidecar_missing() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("scan.png");
        fs::write(&doc, b"img").unwrap();

        assert_eq!(find_sidecar(&doc, None), None);
    }
}
