//! Bidirectional mapping between drawer [`FormValues`] and backend [`QueryObject`]s.
//!
//! Both directions are best-effort: a value that does not match its declared field type is
//! skipped (and logged at debug level) rather than reported, so applying filters can never
//! block the user from seeing an unfiltered list.

use chrono::{FixedOffset, Offset, Utc};
use serde_json::{Map, Number, Value, json};

use super::normalizers::{end_of_day, parse_iso_date, start_of_day, to_iso_millis};
use super::{FieldConfig, FieldType, FilterSet, FormValue, FormValues, QueryObject, range_from_key, range_to_key};

const REGEX: &str = "$regex";
const OPTIONS: &str = "$options";
const CASE_INSENSITIVE: &str = "i";
const IN: &str = "$in";
const EQ: &str = "$eq";
const GTE: &str = "$gte";
const LTE: &str = "$lte";
const LT: &str = "$lt";

/// Compile a form with UTC day boundaries and no discriminator.
pub fn compile(form: &FormValues, filter_set: &FilterSet) -> QueryObject {
    FilterCompiler::new(filter_set).compile(form)
}

/// Reverse-map a query with UTC day boundaries and no discriminator.
pub fn decompile(query: &QueryObject, filter_set: &FilterSet) -> FormValues {
    FilterCompiler::new(filter_set).decompile(query)
}

/// Stateless compiler bound to one filter set.
///
/// The optional discriminator holds constant constraints (e.g. `{"type": 2}` for carousels)
/// that are forced into every compiled query and never shown in the form.
#[derive(Debug, Clone)]
pub struct FilterCompiler<'a> {
    filter_set: &'a FilterSet,
    discriminator: Option<&'a Map<String, Value>>,
    offset: FixedOffset,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(filter_set: &'a FilterSet) -> Self {
        Self {
            filter_set,
            discriminator: None,
            offset: utc(),
        }
    }

    #[inline]
    pub fn with_discriminator(mut self, discriminator: &'a Map<String, Value>) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    /// Offset used to compute start/end of day for date filters.
    #[inline]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn filter_set(&self) -> &FilterSet {
        self.filter_set
    }

    pub fn discriminator_keys(&self) -> Vec<&str> {
        self.discriminator
            .map(|d| d.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn is_discriminator(&self, key: &str) -> bool {
        self.discriminator.is_some_and(|d| d.contains_key(key))
    }

    pub fn compile(&self, form: &FormValues) -> QueryObject {
        let mut query = QueryObject::new();

        for field in self.filter_set {
            if let Some(constraint) = self.compile_field(field, form) {
                query.insert(field.key.clone(), constraint);
            }
        }

        if let Some(sort) = form.sort()
            && !sort.is_empty()
        {
            query.set_sort(sort);
        }

        if let Some(discriminator) = self.discriminator {
            for (key, value) in discriminator {
                query.insert(key.clone(), value.clone());
            }
        }

        query
    }

    fn compile_field(&self, field: &FieldConfig, form: &FormValues) -> Option<Value> {
        let key = field.key.as_str();

        if field.field_type == FieldType::NumberRange {
            let from = number_bound(form, &range_from_key(key));
            let to = number_bound(form, &range_to_key(key));
            if from.is_none() && to.is_none() {
                return None;
            }
            let mut bounds = Map::new();
            if let Some(from) = from {
                bounds.insert(GTE.to_string(), Value::Number(from));
            }
            if let Some(to) = to {
                bounds.insert(LTE.to_string(), Value::Number(to));
            }
            return Some(Value::Object(bounds));
        }

        let value = form.get(key)?;
        match (field.field_type, value) {
            (FieldType::Text, FormValue::Text(text)) if !text.is_empty() => {
                Some(json!({ REGEX: text, OPTIONS: CASE_INSENSITIVE }))
            }
            (FieldType::MultiSelect, FormValue::Many(values)) if !values.is_empty() => Some(json!({ IN: values })),
            (FieldType::Boolean, FormValue::Bool(flag)) => Some(Value::Bool(*flag)),
            (FieldType::Number, FormValue::Number(n)) => Some(Value::Number(n.clone())),
            (FieldType::DateRange, FormValue::DateRange(start, end)) => Some(json!({
                GTE: to_iso_millis(start_of_day(*start, &self.offset)),
                LT: to_iso_millis(end_of_day(*end, &self.offset)),
            })),
            (FieldType::Date, FormValue::Date(date)) => {
                Some(json!({ GTE: to_iso_millis(start_of_day(*date, &self.offset)) }))
            }
            (FieldType::Text, FormValue::Text(_)) | (FieldType::MultiSelect, FormValue::Many(_)) => None,
            (field_type, other) => {
                log::debug!("skipping {key}: {other:?} does not fit a {} field", field_type.as_str());
                None
            }
        }
    }

    pub fn decompile(&self, query: &QueryObject) -> FormValues {
        let mut form = FormValues::new();

        for field in self.filter_set {
            let key = field.key.as_str();
            if self.is_discriminator(key) {
                continue;
            }
            let Some(value) = query.get(key) else { continue };

            match field.field_type {
                FieldType::Text => {
                    if let Some(pattern) = value.get(REGEX).and_then(Value::as_str) {
                        form.insert(key, FormValue::Text(pattern.to_string()));
                    }
                }
                FieldType::MultiSelect => {
                    if let Some(Value::Array(values)) = value.get(IN) {
                        form.insert(key, FormValue::Many(values.clone()));
                    }
                }
                FieldType::Boolean => {
                    if let Value::Bool(flag) = value {
                        form.insert(key, FormValue::Bool(*flag));
                    }
                }
                FieldType::Number => {
                    let number = match value {
                        Value::Number(n) => Some(n),
                        Value::Object(_) => as_number(value.get(EQ)),
                        _ => None,
                    };
                    if let Some(n) = number {
                        form.insert(key, FormValue::Number(n.clone()));
                    }
                }
                FieldType::NumberRange => {
                    if let Some(from) = as_number(value.get(GTE)) {
                        form.insert(range_from_key(key), FormValue::Number(from.clone()));
                    }
                    if let Some(to) = as_number(value.get(LTE)) {
                        form.insert(range_to_key(key), FormValue::Number(to.clone()));
                    }
                }
                FieldType::DateRange => {
                    let start = self.iso_date(value.get(GTE));
                    let end = self.iso_date(value.get(LT));
                    if let (Some(start), Some(end)) = (start, end) {
                        form.insert(key, FormValue::DateRange(start, end));
                    }
                }
                FieldType::Date => {
                    if let Some(date) = self.iso_date(value.get(GTE)) {
                        form.insert(key, FormValue::Date(date));
                    }
                }
            }

            if !form_has_field(&form, field) {
                log::debug!("query value for {key} has an unrecognized shape: {value}");
            }
        }

        if !query.sort().is_empty() {
            form.set_sort(Some(query.sort().to_string()));
        }

        form
    }

    fn iso_date(&self, value: Option<&Value>) -> Option<chrono::NaiveDate> {
        value
            .and_then(Value::as_str)
            .and_then(|text| parse_iso_date(text, &self.offset))
    }
}

fn form_has_field(form: &FormValues, field: &FieldConfig) -> bool {
    match field.field_type {
        FieldType::NumberRange => {
            form.get(&range_from_key(&field.key)).is_some() || form.get(&range_to_key(&field.key)).is_some()
        }
        _ => form.get(&field.key).is_some(),
    }
}

fn number_bound(form: &FormValues, key: &str) -> Option<Number> {
    match form.get(key)? {
        FormValue::Number(n) => Some(n.clone()),
        other => {
            log::debug!("skipping range bound {key}: {other:?} is not a number");
            None
        }
    }
}

fn as_number(value: Option<&Value>) -> Option<&Number> {
    match value {
        Some(Value::Number(n)) => Some(n),
        _ => None,
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterOption;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    fn single(field: FieldConfig) -> FilterSet {
        FilterSet::new([field]).expect("valid filter set")
    }

    #[test]
    fn text_compiles_to_case_insensitive_regex() {
        let set = single(FieldConfig::text("title", "Title"));
        let query = compile(&FormValues::new().with("title", FormValue::text("abc")), &set);
        assert_eq!(query, QueryObject::new().with("title", json!({"$regex": "abc", "$options": "i"})));
    }

    #[test]
    fn multi_select_compiles_to_in() {
        let set = single(FieldConfig::multi_select(
            "status",
            "Status",
            [FilterOption::new(1, "Active"), FilterOption::new(-1, "Inactive")],
        ));
        let query = compile(&FormValues::new().with("status", FormValue::many([1, -1])), &set);
        assert_eq!(query.get("status"), Some(&json!({"$in": [1, -1]})));
    }

    #[test]
    fn number_range_emits_only_present_bounds() {
        let set = single(FieldConfig::number_range("age", "Age"));
        let both = FormValues::new()
            .with("ageFrom", FormValue::number(10))
            .with("ageTo", FormValue::number(20));
        assert_eq!(compile(&both, &set).get("age"), Some(&json!({"$gte": 10, "$lte": 20})));

        let lower = FormValues::new().with("ageFrom", FormValue::number(10));
        assert_eq!(compile(&lower, &set).get("age"), Some(&json!({"$gte": 10})));

        let upper = FormValues::new().with("ageTo", FormValue::number(20));
        assert_eq!(compile(&upper, &set).get("age"), Some(&json!({"$lte": 20})));
    }

    #[test]
    fn scalar_types_compile_to_plain_values() {
        let set = FilterSet::new([FieldConfig::boolean("featured", "Featured"), FieldConfig::number("rank", "Rank")])
            .expect("valid filter set");
        let form = FormValues::new()
            .with("featured", FormValue::Bool(false))
            .with("rank", FormValue::number(3));
        let query = compile(&form, &set);
        assert_eq!(query.get("featured"), Some(&json!(false)));
        assert_eq!(query.get("rank"), Some(&json!(3)));
    }

    #[test]
    fn dates_compile_to_day_bounds() {
        let set = FilterSet::new([
            FieldConfig::date_range("createdAt", "Created"),
            FieldConfig::date("startsAt", "Starts"),
        ])
        .expect("valid filter set");
        let form = FormValues::new()
            .with("createdAt", FormValue::DateRange(date(2024, 1, 1), date(2024, 1, 31)))
            .with("startsAt", FormValue::Date(date(2024, 2, 1)));
        let query = compile(&form, &set);
        assert_eq!(
            query.get("createdAt"),
            Some(&json!({"$gte": "2024-01-01T00:00:00.000Z", "$lt": "2024-01-31T23:59:59.999Z"}))
        );
        assert_eq!(query.get("startsAt"), Some(&json!({"$gte": "2024-02-01T00:00:00.000Z"})));
    }

    #[test]
    fn empty_form_compiles_to_empty_query() {
        let set = FilterSet::new([
            FieldConfig::text("title", "Title"),
            FieldConfig::number_range("age", "Age"),
            FieldConfig::date("startsAt", "Starts"),
        ])
        .expect("valid filter set");
        assert_eq!(compile(&FormValues::new(), &set), QueryObject::new());

        let blanks = FormValues::new()
            .with("title", FormValue::text(""))
            .with("startsAt", FormValue::text("not a date"));
        assert_eq!(compile(&blanks, &set), QueryObject::new());
    }

    #[test]
    fn sort_stays_at_top_level() {
        let set = single(FieldConfig::text("title", "Title"));
        let form = FormValues::new().with_sort("-createdAt");
        let query = compile(&form, &set);
        assert_eq!(query.sort(), "-createdAt");
        assert!(query.get("sort").is_none());
        assert_eq!(query.to_value(), json!({"sort": "-createdAt"}));
    }

    #[test]
    fn discriminator_is_forced_and_hidden() {
        let set = FilterSet::new([FieldConfig::text("title", "Title"), FieldConfig::number("type", "Type")])
            .expect("valid filter set");
        let discriminator = object(json!({"type": 2}));
        let compiler = FilterCompiler::new(&set).with_discriminator(&discriminator);

        let form = FormValues::new().with("type", FormValue::number(7));
        let query = compiler.compile(&form);
        assert_eq!(query.get("type"), Some(&json!(2)));
        assert_eq!(compiler.compile(&FormValues::new()), QueryObject::new().with("type", json!(2)));

        let reopened = compiler.decompile(&query);
        assert!(reopened.get("type").is_none());
        assert_eq!(compiler.discriminator_keys(), ["type"]);
    }

    #[test]
    fn decompile_accepts_hand_built_and_legacy_shapes() {
        let set = FilterSet::new([
            FieldConfig::text("title", "Title"),
            FieldConfig::number("rank", "Rank"),
            FieldConfig::multi_select("status", "Status", [FilterOption::new("open", "Open")]),
            FieldConfig::date_range("createdAt", "Created"),
        ])
        .expect("valid filter set");
        let query = QueryObject::from_map(object(json!({
            "title": {"$regex": "abc"},
            "rank": {"$eq": 4},
            "status": "open",
            "createdAt": {"$gte": "garbage", "$lt": "2024-01-31T23:59:59.999Z"},
            "sort": "title",
        })));

        let form = decompile(&query, &set);
        assert_eq!(form.get("title"), Some(&FormValue::text("abc")));
        assert_eq!(form.get("rank"), Some(&FormValue::number(4)));
        assert!(form.get("status").is_none());
        assert!(form.get("createdAt").is_none());
        assert_eq!(form.sort(), Some("title"));
    }

    #[test]
    fn offset_shifts_day_bounds_and_round_trips() {
        let set = single(FieldConfig::date_range("createdAt", "Created"));
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).expect("offset");
        let compiler = FilterCompiler::new(&set).with_offset(ist);
        let form = FormValues::new().with("createdAt", FormValue::DateRange(date(2024, 1, 1), date(2024, 1, 2)));

        let query = compiler.compile(&form);
        assert_eq!(
            query.get("createdAt"),
            Some(&json!({"$gte": "2023-12-31T18:30:00.000Z", "$lt": "2024-01-02T18:29:59.999Z"}))
        );
        assert_eq!(compiler.decompile(&query), form);
    }
}
