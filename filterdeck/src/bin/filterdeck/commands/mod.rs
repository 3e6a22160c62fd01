pub mod access;
pub mod export;
pub mod filters;
pub mod resources;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Read a JSON document from a file, or from stdin when the path is `-`.
pub async fn read_json(path: &Path) -> Result<Value> {
    let raw = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .context("Failed to read JSON from stdin")?;
        buffer
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Read a JSON object (form values, queries, filter maps).
pub async fn read_object(path: &Path) -> Result<Map<String, Value>> {
    match read_json(path).await? {
        Value::Object(map) => Ok(map),
        other => bail!("Expected a JSON object in {}, found {}", path.display(), kind(&other)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Render a JSON value for a table cell: strings unquoted, everything else compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
