use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend-bound query: a sort token plus field constraints, serialized as one flat object
/// (`{"sort": "-createdAt", "title": {"$regex": ..}}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryObject {
    #[serde(default)]
    sort: String,
    #[serde(flatten)]
    constraints: Map<String, Value>,
}

impl QueryObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object, splitting a top-level string `sort` out of the constraints.
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let sort = match map.remove("sort") {
            Some(Value::String(sort)) => sort,
            _ => String::new(),
        };
        Self { sort, constraints: map }
    }

    #[inline]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Builder-style constraint insert.
    #[inline]
    pub fn with(mut self, key: impl Into<String>, constraint: Value) -> Self {
        self.insert(key, constraint);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, constraint: Value) -> Option<Value> {
        self.constraints.insert(key.into(), constraint)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.constraints.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.constraints.get(key)
    }

    pub fn set_sort(&mut self, sort: impl Into<String>) {
        self.sort = sort.into();
    }

    /// Sort token; empty when the backend default applies.
    pub fn sort(&self) -> &str {
        &self.sort
    }

    pub fn constraints(&self) -> &Map<String, Value> {
        &self.constraints
    }

    /// True when no field constraint is present (the sort token is not a constraint).
    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Flat JSON object, with `sort` alongside the constraints.
    pub fn to_value(&self) -> Value {
        let mut map = self.constraints.clone();
        map.insert("sort".to_string(), Value::String(self.sort.clone()));
        Value::Object(map)
    }
}
