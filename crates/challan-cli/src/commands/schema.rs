//! Schema command - show the canonical field registry.

use clap::Args;
use console::style;
use serde_json::json;

use challan_core::schema;

/// Arguments for the schema command.
#[derive(Args)]
pub struct SchemaArgs {
    /// Emit the registry as JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub async fn run(args: SchemaArgs) -> anyhow::Result<()> {
    if args.json {
        let entries: Vec<_> = schema::fields()
            .iter()
            .map(|spec| {
                json!({
                    "id": spec.id,
                    "kind": spec.kind.prompt_name(),
                    "description": spec.description,
                    "format": spec.format,
                    "example": spec.example,
                    "labels": spec.labels,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{:<22} {:<8} {}",
        style("FIELD").bold(),
        style("KIND").bold(),
        style("DESCRIPTION").bold()
    );
    for spec in schema::fields() {
        println!(
            "{:<22} {:<8} {}",
            spec.id,
            spec.kind.prompt_name(),
            spec.description
        );
    }

    Ok(())
}
