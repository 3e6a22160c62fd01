use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned by filterdeck configuration, listing and export operations.
///
/// The filter compiler itself never fails; malformed input is skipped instead.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Configuration was syntactically valid but semantically wrong.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The same field key was declared twice in a filter set.
    #[error("duplicate filter field '{key}'")]
    DuplicateField { key: String },

    /// A multi-select field was declared without any options.
    #[error("multi-select field '{key}' requires options")]
    MissingOptions { key: String },

    /// Options were declared on a field type that does not use them.
    #[error("field '{key}' declares options but is not a multi-select")]
    UnexpectedOptions { key: String },

    /// A sort token is malformed or declared twice.
    #[error("invalid sort option '{value}': {reason}")]
    InvalidSort { value: String, reason: Cow<'static, str> },

    /// No resource profile with the given name is configured.
    #[error("unknown resource '{name}'")]
    UnknownResource { name: String },

    /// The list collaborator failed to return a page.
    #[error("fetch failed: {message}")]
    Fetch { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl FilterError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }
}

/// Failure while turning a single document into a CSV row.
///
/// Export treats this as recoverable and writes a placeholder row instead.
#[derive(Debug, Clone, Error)]
#[error("row formatting failed: {message}")]
pub struct RowFormatError {
    pub message: String,
}

impl RowFormatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type FilterResult<T> = Result<T, FilterError>;
