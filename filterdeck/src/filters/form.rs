//! Typed values held by a filter drawer form.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use super::{FieldType, FilterSet};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Key holding the lower bound of a number-range field.
#[inline]
pub fn range_from_key(key: &str) -> String {
    format!("{key}From")
}

/// Key holding the upper bound of a number-range field.
#[inline]
pub fn range_to_key(key: &str) -> String {
    format!("{key}To")
}

/// A single UI-native form value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    Many(Vec<Value>),
    Bool(bool),
    Number(Number),
    Date(NaiveDate),
    DateRange(NaiveDate, NaiveDate),
}

impl FormValue {
    #[inline]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[inline]
    pub fn many<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Many(values.into_iter().map(Into::into).collect())
    }

    #[inline]
    pub fn number(value: impl Into<Number>) -> Self {
        Self::Number(value.into())
    }

    /// Empty strings and empty selections do not constrain anything.
    pub fn is_empty(&self) -> bool {
        match self {
            FormValue::Text(text) => text.is_empty(),
            FormValue::Many(values) => values.is_empty(),
            FormValue::Bool(_) | FormValue::Number(_) | FormValue::Date(_) | FormValue::DateRange(..) => false,
        }
    }
}

/// The contents of a filter drawer: field values keyed by field key (or the derived
/// `{key}From` / `{key}To` keys for number ranges) plus the selected sort token.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormValues {
    #[serde(flatten)]
    values: BTreeMap<String, FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[inline]
    pub fn with(mut self, key: impl Into<String>, value: FormValue) -> Self {
        self.insert(key, value);
        self
    }

    #[inline]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FormValue) -> Option<FormValue> {
        self.values.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.values.get(key)
    }

    pub fn set_sort(&mut self, sort: Option<String>) {
        self.sort = sort;
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.sort.is_none()
    }

    /// Drop empty strings and empty selections, keeping only values that constrain something.
    pub fn without_empty(mut self) -> Self {
        self.values.retain(|_, value| !value.is_empty());
        if self.sort.as_deref().is_some_and(str::is_empty) {
            self.sort = None;
        }
        self
    }

    /// Coerce a raw JSON form (as submitted by a client or read from disk) into typed values,
    /// guided by the declared field types. Entries that do not fit their field type are
    /// skipped; keys the filter set does not declare are ignored.
    pub fn from_json(raw: &Map<String, Value>, filter_set: &FilterSet) -> Self {
        let mut form = FormValues::new();

        for field in filter_set {
            let key = field.key.as_str();
            if field.field_type == FieldType::NumberRange {
                for bound_key in [range_from_key(key), range_to_key(key)] {
                    match raw.get(&bound_key) {
                        Some(Value::Number(n)) => {
                            form.insert(bound_key, FormValue::Number(n.clone()));
                        }
                        Some(Value::Null) | None => {}
                        Some(other) => log::debug!("skipping non-numeric bound {bound_key}={other}"),
                    }
                }
                continue;
            }

            let Some(value) = raw.get(key) else { continue };
            match coerce(field.field_type, value) {
                Some(coerced) => {
                    form.insert(key, coerced);
                }
                None if value.is_null() => {}
                None => log::debug!("skipping {} value for field {key}: {value}", field.field_type.as_str()),
            }
        }

        form.sort = raw.get("sort").and_then(Value::as_str).map(str::to_string);
        form
    }
}

fn coerce(field_type: FieldType, value: &Value) -> Option<FormValue> {
    match (field_type, value) {
        (FieldType::Text, Value::String(text)) => Some(FormValue::Text(text.clone())),
        (FieldType::MultiSelect, Value::Array(values)) => Some(FormValue::Many(values.clone())),
        (FieldType::MultiSelect, Value::String(_) | Value::Number(_) | Value::Bool(_)) => {
            Some(FormValue::Many(vec![value.clone()]))
        }
        (FieldType::Boolean, Value::Bool(flag)) => Some(FormValue::Bool(*flag)),
        (FieldType::Boolean, Value::String(text)) => match text.as_str() {
            "true" | "True" => Some(FormValue::Bool(true)),
            "false" | "False" => Some(FormValue::Bool(false)),
            _ => None,
        },
        (FieldType::Number, Value::Number(n)) => Some(FormValue::Number(n.clone())),
        (FieldType::Date, Value::String(text)) => parse_date(text).map(FormValue::Date),
        (FieldType::DateRange, Value::Array(bounds)) if bounds.len() == 2 => {
            let start = bounds[0].as_str().and_then(parse_date)?;
            let end = bounds[1].as_str().and_then(parse_date)?;
            Some(FormValue::DateRange(start, end))
        }
        _ => None,
    }
}

/// Accepts plain `YYYY-MM-DD` dates as well as full RFC 3339 timestamps (date part only).
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .or_else(|| chrono::DateTime::parse_from_rfc3339(text).ok().map(|ts| ts.date_naive()))
}
