//! Declarative filter model shared by every "Search & Filter" drawer.
//!
//! A [`FilterSet`] describes which fields can be filtered and how, a [`SortOptions`] list
//! describes the mutually exclusive sort choices, and the [`compiler`] turns user-entered
//! [`FormValues`] into a backend [`QueryObject`] and back.
//!
//! | Field type     | Form value                      | Query constraint                          |
//! |----------------|---------------------------------|-------------------------------------------|
//! | `text`         | `FormValue::Text`               | `{"$regex": v, "$options": "i"}`          |
//! | `multi-select` | `FormValue::Many`               | `{"$in": [..]}`                           |
//! | `boolean`      | `FormValue::Bool`               | `v`                                       |
//! | `number`       | `FormValue::Number`             | `v`                                       |
//! | `number-range` | `{key}From` / `{key}To` numbers | `{"$gte": from, "$lte": to}`              |
//! | `date-range`   | `FormValue::DateRange`          | `{"$gte": start-of-day, "$lt": end-of-day}` |
//! | `date`         | `FormValue::Date`               | `{"$gte": start-of-day}`                  |

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::errors::FilterError;

pub mod compiler;
pub mod form;
pub mod normalizers;
pub mod query;

pub use compiler::{FilterCompiler, compile, decompile};
pub use form::{FormValue, FormValues, range_from_key, range_to_key};
pub use normalizers::*;
pub use query::QueryObject;

static SORT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("sort token pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    MultiSelect,
    Boolean,
    Number,
    NumberRange,
    DateRange,
    Date,
}

impl FieldType {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::MultiSelect => "multi-select",
            FieldType::Boolean => "boolean",
            FieldType::Number => "number",
            FieldType::NumberRange => "number-range",
            FieldType::DateRange => "date-range",
            FieldType::Date => "date",
        }
    }
}

/// A selectable choice of a multi-select field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: Value,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// One filterable field. `key` is the backend field name and may be a dot-path
/// such as `location.city`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FilterOption>,
}

impl FieldConfig {
    pub fn new(key: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field_type,
            label: label.into(),
            options: Vec::new(),
        }
    }

    #[inline]
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, FieldType::Text, label)
    }

    #[inline]
    pub fn multi_select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = FilterOption>,
    ) -> Self {
        Self {
            options: options.into_iter().collect(),
            ..Self::new(key, FieldType::MultiSelect, label)
        }
    }

    #[inline]
    pub fn boolean(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, FieldType::Boolean, label)
    }

    #[inline]
    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, FieldType::Number, label)
    }

    #[inline]
    pub fn number_range(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, FieldType::NumberRange, label)
    }

    #[inline]
    pub fn date_range(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, FieldType::DateRange, label)
    }

    #[inline]
    pub fn date(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, FieldType::Date, label)
    }

    fn validate(&self) -> Result<(), FilterError> {
        match (self.field_type, self.options.is_empty()) {
            (FieldType::MultiSelect, true) => Err(FilterError::MissingOptions { key: self.key.clone() }),
            (FieldType::MultiSelect, false) | (_, true) => Ok(()),
            (_, false) => Err(FilterError::UnexpectedOptions { key: self.key.clone() }),
        }
    }
}

/// Ordered set of filterable fields. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldConfig>", into = "Vec<FieldConfig>")]
pub struct FilterSet {
    fields: Vec<FieldConfig>,
}

impl FilterSet {
    pub fn new(fields: impl IntoIterator<Item = FieldConfig>) -> Result<Self, FilterError> {
        let fields: Vec<FieldConfig> = fields.into_iter().collect();
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.key.as_str()) {
                return Err(FilterError::DuplicateField { key: field.key.clone() });
            }
            field.validate()?;
        }
        Ok(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.key.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<FieldConfig>> for FilterSet {
    type Error = FilterError;

    fn try_from(fields: Vec<FieldConfig>) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

impl From<FilterSet> for Vec<FieldConfig> {
    fn from(set: FilterSet) -> Self {
        set.fields
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a FieldConfig;
    type IntoIter = std::slice::Iter<'a, FieldConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// A single sort choice. `value` is the backend token, e.g. `-createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    pub label: String,
    pub value: String,
}

impl SortOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Field the token sorts on, without the direction prefix.
    pub fn field(&self) -> &str {
        self.value.strip_prefix('-').unwrap_or(&self.value)
    }

    #[inline]
    pub fn is_descending(&self) -> bool {
        self.value.starts_with('-')
    }
}

/// Mutually exclusive sort choices (radio-button semantics).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SortOption>", into = "Vec<SortOption>")]
pub struct SortOptions {
    options: Vec<SortOption>,
}

impl SortOptions {
    pub fn new(options: impl IntoIterator<Item = SortOption>) -> Result<Self, FilterError> {
        let options: Vec<SortOption> = options.into_iter().collect();
        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !SORT_TOKEN.is_match(&option.value) {
                return Err(FilterError::InvalidSort {
                    value: option.value.clone(),
                    reason: "expected an optional '-' followed by a field path".into(),
                });
            }
            if !seen.insert(option.value.as_str()) {
                return Err(FilterError::InvalidSort {
                    value: option.value.clone(),
                    reason: "declared more than once".into(),
                });
            }
        }
        Ok(Self { options })
    }

    /// Find the option carrying the given backend token.
    pub fn resolve(&self, value: &str) -> Option<&SortOption> {
        self.options.iter().find(|option| option.value == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortOption> {
        self.options.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl TryFrom<Vec<SortOption>> for SortOptions {
    type Error = FilterError;

    fn try_from(options: Vec<SortOption>) -> Result<Self, Self::Error> {
        Self::new(options)
    }
}

impl From<SortOptions> for Vec<SortOption> {
    fn from(options: SortOptions) -> Self {
        options.options
    }
}
