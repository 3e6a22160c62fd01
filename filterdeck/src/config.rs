//! TOML configuration: resource profiles, role grants and listing/export defaults.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::errors::FilterError;
use crate::export::{CsvExport, DEFAULT_BATCH_SIZE, DEFAULT_PLACEHOLDER};
use crate::filters::FilterCompiler;
use crate::listing::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, TableState};
use crate::permissions::RoleGrants;
use crate::resources::ResourceFilters;

/// Environment variable naming the configuration file used by the CLI.
pub const CONFIG_ENV: &str = "FILTERDECK_CONFIG";

const BUILTIN: &str = include_str!("../config/filterdeck.toml");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub compiler: CompilerSettings,
    #[serde(default)]
    pub listing: ListingSettings,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub resources: Vec<ResourceFilters>,
    #[serde(default)]
    pub roles: RoleGrants,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSettings {
    /// Offset east of UTC used for start/end of day in date filters.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl CompilerSettings {
    pub fn offset(&self) -> Result<FixedOffset, FilterError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            FilterError::invalid_config(format!("utc_offset_minutes out of range: {}", self.utc_offset_minutes))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSettings {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u64 {
    MAX_PAGE_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_batch_size() -> u64 {
    DEFAULT_BATCH_SIZE
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, FilterError> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FilterError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        log::debug!("loaded {} resources from {}", config.resources.len(), path.display());
        Ok(config)
    }

    /// Configuration bundled with the crate.
    pub fn builtin() -> Result<Self, FilterError> {
        Self::from_toml_str(BUILTIN)
    }

    /// Explicit path, then `FILTERDECK_CONFIG`, then the bundled configuration.
    pub fn discover(path: Option<&Path>) -> Result<Self, FilterError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(path),
            _ => Self::builtin(),
        }
    }

    fn validate(&self) -> Result<(), FilterError> {
        self.compiler.offset()?;
        if self.listing.max_page_size == 0 || self.listing.default_page_size == 0 {
            return Err(FilterError::invalid_config("page sizes must be positive"));
        }
        if self.listing.default_page_size > self.listing.max_page_size {
            return Err(FilterError::invalid_config("default_page_size exceeds max_page_size"));
        }
        if self.export.batch_size == 0 {
            return Err(FilterError::invalid_config("export batch_size must be positive"));
        }
        let mut names = HashSet::with_capacity(self.resources.len());
        for resource in &self.resources {
            if resource.name.trim().is_empty() {
                return Err(FilterError::invalid_config("resource name must not be empty"));
            }
            if !names.insert(resource.name.as_str()) {
                return Err(FilterError::invalid_config(format!("resource '{}' declared twice", resource.name)));
            }
        }
        Ok(())
    }

    pub fn resource(&self, name: &str) -> Result<&ResourceFilters, FilterError> {
        self.resources
            .iter()
            .find(|resource| resource.name == name)
            .ok_or_else(|| FilterError::UnknownResource { name: name.to_string() })
    }

    /// Compiler for `name` with the configured day-boundary offset.
    pub fn compiler(&self, name: &str) -> Result<FilterCompiler<'_>, FilterError> {
        let offset = self.compiler.offset()?;
        Ok(self.resource(name)?.compiler().with_offset(offset))
    }

    pub fn table_state(&self) -> TableState {
        TableState::with_max(self.listing.default_page_size, self.listing.max_page_size)
    }

    pub fn csv_export<S: Into<String>>(&self, file_stem: &str, headers: impl IntoIterator<Item = S>) -> CsvExport {
        CsvExport::new(file_stem, headers)
            .with_batch_size(self.export.batch_size)
            .with_placeholder(self.export.placeholder.clone())
    }
}
