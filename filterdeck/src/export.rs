//! Bulk CSV export of a filtered resource list.
//!
//! The export walks every page of a [`ListSource`] with the table's current filters and sort,
//! formats each document with a caller-supplied function and streams rows to a CSV writer.
//! A document that fails to format becomes a placeholder row; fetch and write errors abort.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::io;

use crate::errors::{FilterError, RowFormatError};
use crate::filters::QueryObject;
use crate::listing::{ListRequest, ListSource};

pub const DEFAULT_BATCH_SIZE: u64 = 100;
pub const DEFAULT_PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_stem: String,
    pub headers: Vec<String>,
    pub batch_size: u64,
    pub placeholder: String,
}

impl CsvExport {
    pub fn new<S: Into<String>>(file_stem: impl Into<String>, headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            file_stem: file_stem.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            batch_size: DEFAULT_BATCH_SIZE,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    #[inline]
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[inline]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// `webinars_2024-05-01.csv`
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}_{}.csv", self.file_stem, date.format("%Y-%m-%d"))
    }

    fn placeholder_row(&self) -> Vec<&str> {
        vec![self.placeholder.as_str(); self.headers.len()]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Data rows written, placeholders included.
    pub rows: u64,
    /// Rows replaced by a placeholder.
    pub failed_rows: u64,
    /// List requests issued.
    pub pages: u64,
}

pub async fn export_csv<S, F, W>(
    source: &S,
    query: &QueryObject,
    export: &CsvExport,
    mut format_row: F,
    writer: W,
) -> Result<ExportSummary, FilterError>
where
    S: ListSource,
    F: FnMut(&S::Item) -> Result<Vec<String>, RowFormatError>,
    W: io::Write,
{
    if export.headers.is_empty() {
        return Err(FilterError::invalid_config("csv export requires at least one column"));
    }

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&export.headers)?;

    let mut summary = ExportSummary::default();
    let mut consumed: u64 = 0;
    let mut page = 1;
    loop {
        let request = ListRequest::from_query(query, page, export.batch_size);
        let response = source.fetch(&request).await?;
        summary.pages += 1;
        log::debug!(
            "export {}: page {page} returned {} of {} docs",
            export.file_stem,
            response.docs.len(),
            response.total_docs
        );

        if response.docs.is_empty() {
            break;
        }
        consumed = consumed.saturating_add(response.docs.len() as u64);

        for doc in &response.docs {
            let row = format_row(doc).and_then(|row| {
                if row.len() == export.headers.len() {
                    Ok(row)
                } else {
                    Err(RowFormatError::new(format!(
                        "expected {} columns, got {}",
                        export.headers.len(),
                        row.len()
                    )))
                }
            });
            match row {
                Ok(row) => csv.write_record(&row)?,
                Err(err) => {
                    log::warn!("export {}: row {} replaced by placeholder: {err}", export.file_stem, summary.rows + 1);
                    csv.write_record(export.placeholder_row())?;
                    summary.failed_rows += 1;
                }
            }
            summary.rows += 1;
        }

        // Stop on documents received, not on the page number the backend echoes.
        if consumed >= response.total_docs {
            break;
        }
        page += 1;
    }

    csv.flush()?;
    log::info!(
        "export {}: wrote {} rows ({} placeholders) from {} pages",
        export.file_stem,
        summary.rows,
        summary.failed_rows,
        summary.pages
    );
    Ok(summary)
}

/// Row formatter for JSON documents: each column is a dot-path into the document.
/// Scalars are rendered as text, arrays of scalars are joined with `; `, a missing or null
/// value renders empty, and a non-object document is a formatting error.
pub fn json_columns<S: AsRef<str>>(columns: &[S]) -> impl FnMut(&Value) -> Result<Vec<String>, RowFormatError> + '_ {
    move |doc: &Value| {
        if !doc.is_object() {
            return Err(RowFormatError::new("document is not an object"));
        }
        columns
            .iter()
            .map(|column| render_cell(lookup_path(doc, column.as_ref()), column.as_ref()))
            .collect()
    }
}

fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, segment| current.get(segment))
}

fn render_cell(value: Option<&Value>, column: &str) -> Result<String, RowFormatError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Bool(flag)) => Ok(flag.to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(_) | Value::Array(_) => {
                    Err(RowFormatError::new(format!("column {column} holds nested values")))
                }
                scalar => render_cell(Some(scalar), column),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|cells| cells.join("; ")),
        Some(Value::Object(_)) => Err(RowFormatError::new(format!("column {column} holds an object"))),
    }
}
