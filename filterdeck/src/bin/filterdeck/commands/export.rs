use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use filterdeck::AppConfig;
use filterdeck::export::{ExportSummary, export_csv, json_columns};
use filterdeck::filters::QueryObject;
use filterdeck::listing::StaticPages;

use super::{read_json, read_object};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::FILE;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Bulk Export",
    commands: &[
        "filterdeck export webinars --input docs.json --columns title,speaker.name,fee",
        "filterdeck export institutes --input docs.json --columns name,location.city --out exports/",
    ],
}];

#[derive(Args)]
pub struct ExportArgs {
    /// Resource being exported (names the file)
    pub resource: String,

    /// JSON array of documents, or a list response with `docs`
    #[arg(long)]
    pub input: PathBuf,

    /// Comma-separated dot-paths to export as columns
    #[arg(long, value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Applied query (filters and sort) to send with every page request
    #[arg(long)]
    pub query: Option<PathBuf>,

    /// Directory to write the CSV file into
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Serialize)]
struct ExportReport {
    file: PathBuf,
    #[serde(flatten)]
    summary: ExportSummary,
}

impl TableDisplay for ExportReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.table(&[]);
        table.add_row(vec![Cell::new("File"), Cell::new(self.file.display())]);
        table.add_row(vec![Cell::new("Rows"), Cell::new(self.summary.rows)]);
        table.add_row(vec![Cell::new("Placeholder rows"), Cell::new(self.summary.failed_rows)]);
        table.add_row(vec![Cell::new("Pages"), Cell::new(self.summary.pages)]);
        table
    }

    fn to_compact(&self) -> String {
        format!("{} rows={} failed={}", self.file.display(), self.summary.rows, self.summary.failed_rows)
    }
}

pub async fn handle_export(args: ExportArgs, config: &AppConfig, output: &OutputManager) -> Result<()> {
    let resource = config.resource(&args.resource)?;
    let source: StaticPages<Value> = StaticPages::from_json(read_json(&args.input).await?)?;
    let query = match &args.query {
        Some(path) => QueryObject::from_map(read_object(path).await?),
        None => resource.compile(&Default::default()),
    };

    let export = config.csv_export(&resource.name, &args.columns);
    let file = args.out.join(export.file_name(Local::now().date_naive()));
    output.verbose(&format!("{} {} documents -> {}", FILE, source.len(), file.display()));

    let mut buffer = Vec::new();
    let summary = export_csv(&source, &query, &export, json_columns(args.columns.as_slice()), &mut buffer).await?;
    tokio::fs::write(&file, buffer)
        .await
        .with_context(|| format!("Failed to write {}", file.display()))?;

    if summary.failed_rows > 0 {
        output.warning(&format!("{} row(s) could not be formatted", summary.failed_rows));
    }
    output.display(&ExportReport { file, summary })?;
    output.success("Export complete");
    Ok(())
}
