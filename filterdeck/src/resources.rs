//! Per-resource filter profiles.
//!
//! Every admin resource (carousels, webinars, ...) is described once: which fields its filter
//! drawer offers, which sort choices exist, and which constant constraints are forced into
//! every query it issues.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::filters::{
    FilterCompiler, FilterSet, FormValues, QueryObject, SortOption, SortOptions, active_filter_count,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceFilters {
    pub name: String,
    #[serde(default)]
    pub fields: FilterSet,
    #[serde(default)]
    pub sorts: SortOptions,
    /// Constant constraints (e.g. `type = 2`) added to every query and hidden from the form.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub discriminator: Map<String, Value>,
}

impl ResourceFilters {
    pub fn new(name: impl Into<String>, fields: FilterSet, sorts: SortOptions) -> Self {
        Self {
            name: name.into(),
            fields,
            sorts,
            discriminator: Map::new(),
        }
    }

    #[inline]
    pub fn with_discriminator(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.discriminator.insert(key.into(), value.into());
        self
    }

    /// Compiler carrying this resource's discriminator, with UTC day boundaries.
    pub fn compiler(&self) -> FilterCompiler<'_> {
        FilterCompiler::new(&self.fields).with_discriminator(&self.discriminator)
    }

    pub fn compile(&self, form: &FormValues) -> QueryObject {
        self.compiler().compile(form)
    }

    pub fn decompile(&self, query: &QueryObject) -> FormValues {
        self.compiler().decompile(query)
    }

    /// Count shown on the "filters active" badge; discriminator keys never count.
    pub fn active_filter_count(&self, query: &QueryObject) -> usize {
        let ignored: Vec<&str> = self.discriminator.keys().map(String::as_str).collect();
        active_filter_count(query, &ignored)
    }

    /// First declared sort option; the drawer preselects it.
    pub fn default_sort(&self) -> Option<&SortOption> {
        self.sorts.iter().next()
    }
}
