//! filterdeck core library.
//!
//! Declarative "Search & Filter" support for admin back-office resources: a filter compiler
//! that maps drawer form values to Mongo-style list queries and back, per-resource filter
//! profiles, the list endpoint contract, an injected permission policy and bulk CSV export.

pub mod config;
pub mod errors;
pub mod export;
pub mod filters;
pub mod listing;
pub mod permissions;
pub mod resources;

pub use config::AppConfig;
pub use errors::*;
pub use export::{CsvExport, ExportSummary, export_csv, json_columns};
pub use filters::{
    FieldConfig, FieldType, FilterCompiler, FilterOption, FilterSet, FormValue, FormValues, QueryObject, SortOption,
    SortOptions, compile, decompile, prune_empty,
};
pub use listing::{ListRequest, ListResponse, ListSource, StaticPages, TableState};
pub use permissions::{PermissionPolicy, RoleGrants, SessionPermissions};
pub use resources::ResourceFilters;
