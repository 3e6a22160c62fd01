//! Cleanup and date helpers shared by the compiler, listing and export code.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};

use super::QueryObject;

/// Returns `true` for `null`, `""`, `[]`, and objects whose own values are all empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.values().all(is_empty_value),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Recursively drops empty entries (see [`is_empty_value`]). Surviving nested objects are
/// pruned as well, so `{"$gte": 1, "$lte": null}` becomes `{"$gte": 1}`.
pub fn prune_empty(map: &Map<String, Value>) -> Map<String, Value> {
    let mut pruned = Map::new();
    for (key, value) in map {
        if is_empty_value(value) {
            continue;
        }
        let kept = match value {
            Value::Object(inner) => Value::Object(prune_empty(inner)),
            other => other.clone(),
        };
        pruned.insert(key.clone(), kept);
    }
    pruned
}

/// Number of meaningful constraints in a query, ignoring forced discriminator keys.
pub fn active_filter_count(query: &QueryObject, ignored_keys: &[&str]) -> usize {
    query
        .constraints()
        .iter()
        .filter(|(key, value)| !ignored_keys.contains(&key.as_str()) && !is_empty_value(value))
        .count()
}

/// First instant of `date` in the given offset.
pub fn start_of_day(date: NaiveDate, offset: &FixedOffset) -> DateTime<Utc> {
    at_local(date, NaiveTime::default(), offset)
}

/// Last millisecond of `date` in the given offset.
pub fn end_of_day(date: NaiveDate, offset: &FixedOffset) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or_default();
    at_local(date, last, offset)
}

fn at_local(date: NaiveDate, time: NaiveTime, offset: &FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(time);
    match offset.from_local_datetime(&local).single() {
        Some(ts) => ts.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&local),
    }
}

/// `2024-01-05T00:00:00.000Z`, matching what browsers emit for `Date#toISOString`.
pub fn to_iso_millis(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Calendar date of an ISO timestamp as seen from `offset`.
pub fn parse_iso_date(text: &str, offset: &FixedOffset) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|ts| ts.with_timezone(offset).date_naive())
}
