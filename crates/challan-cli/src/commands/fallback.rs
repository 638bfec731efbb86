//! Fallback command - regex extraction over an OCR text file, no model.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use challan_core::fallback::extract_fallback;
use challan_core::{ExtractionResult, ExtractionSource};

use super::extract::{OutputFormat, format_result};
use super::load_config;

/// Arguments for the fallback command.
#[derive(Args)]
pub struct FallbackArgs {
    /// Input OCR text file (one block per line)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: FallbackArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = fs::read_to_string(&args.input)?;
    let blocks: Vec<String> = text.lines().map(str::to_string).collect();

    info!("Running fallback extraction over {} text blocks", blocks.len());

    let (record, warnings) = extract_fallback(&blocks, &config.extraction);
    let result = ExtractionResult {
        record,
        source: ExtractionSource::Fallback,
        warnings,
        raw_text: None,
    };

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

    Ok(())
}
