use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

use filterdeck::AppConfig;
use filterdeck::filters::{FormValues, QueryObject, active_filter_count, prune_empty};

use super::{cell_text, read_object};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const COMPILE_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Compile Drawer Values",
    commands: &[
        "filterdeck compile webinars --form form.json       # Print the list query for a form",
        "echo '{\"title\":\"rust\"}' | filterdeck compile carousels --form -",
        "filterdeck --output json compile institutes --form form.json",
    ],
}];

pub const DECOMPILE_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Reopen A Drawer",
    commands: &["filterdeck decompile webinars --query active.json   # Show form values for a query"],
}];

pub const CLEAN_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Clean Filter State",
    commands: &[
        "filterdeck clean --input filters.json                 # Drop empty constraints",
        "filterdeck clean --input filters.json --ignore type   # Exclude a discriminator from the count",
    ],
}];

#[derive(Args)]
pub struct CompileArgs {
    /// Resource whose filter profile to use
    pub resource: String,

    /// JSON file with the drawer's form values ('-' for stdin)
    #[arg(long)]
    pub form: PathBuf,
}

#[derive(Args)]
pub struct DecompileArgs {
    /// Resource whose filter profile to use
    pub resource: String,

    /// JSON file with a previously applied query ('-' for stdin)
    #[arg(long)]
    pub query: PathBuf,
}

#[derive(Args)]
pub struct CleanArgs {
    /// JSON file with an arbitrary filter mapping ('-' for stdin)
    #[arg(long)]
    pub input: PathBuf,

    /// Keys that never count as active filters
    #[arg(long, value_delimiter = ',')]
    pub ignore: Vec<String>,
}

#[derive(Serialize)]
struct QueryReport<'a> {
    resource: &'a str,
    active_filters: usize,
    query: Value,
}

impl TableDisplay for QueryReport<'_> {
    fn to_table(&self, output: &OutputManager) -> Table {
        constraint_table(output, self.query.as_object())
    }

    fn to_compact(&self) -> String {
        self.query.to_string()
    }
}

#[derive(Serialize)]
struct FormReport<'a> {
    resource: &'a str,
    form: &'a FormValues,
}

impl TableDisplay for FormReport<'_> {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.table(&["Field", "Value"]);
        for (key, value) in self.form.iter() {
            let rendered = serde_json::to_value(value).map(|v| cell_text(&v)).unwrap_or_default();
            table.add_row(vec![Cell::new(key), Cell::new(rendered)]);
        }
        if let Some(sort) = self.form.sort() {
            table.add_row(vec![Cell::new("sort"), Cell::new(sort)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        serde_json::to_string(self.form).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct CleanReport {
    active_filters: usize,
    filters: Map<String, Value>,
}

impl TableDisplay for CleanReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        constraint_table(output, Some(&self.filters))
    }

    fn to_compact(&self) -> String {
        format!("active={} {}", self.active_filters, Value::Object(self.filters.clone()))
    }
}

fn constraint_table(output: &OutputManager, constraints: Option<&Map<String, Value>>) -> Table {
    let mut table = output.table(&["Key", "Constraint"]);
    for (key, value) in constraints.into_iter().flatten() {
        table.add_row(vec![Cell::new(key), Cell::new(cell_text(value))]);
    }
    table
}

pub async fn handle_compile(args: CompileArgs, config: &AppConfig, output: &OutputManager) -> Result<()> {
    let resource = config.resource(&args.resource)?;
    let raw = read_object(&args.form).await?;
    let form = FormValues::from_json(&raw, &resource.fields);
    output.verbose(&format!("{} of {} form entries recognized", form.len(), raw.len()));

    let query = config.compiler(&args.resource)?.compile(&form);
    let report = QueryReport {
        resource: &resource.name,
        active_filters: resource.active_filter_count(&query),
        query: query.to_value(),
    };

    output.heading(&format!("Query for {}", resource.name));
    output.display(&report)?;
    output.key_value("Active filters", &report.active_filters.to_string());
    Ok(())
}

pub async fn handle_decompile(args: DecompileArgs, config: &AppConfig, output: &OutputManager) -> Result<()> {
    let resource = config.resource(&args.resource)?;
    let query = QueryObject::from_map(read_object(&args.query).await?);
    let form = config.compiler(&args.resource)?.decompile(&query);

    if form.is_empty() {
        output.info("No active filters to restore");
        return Ok(());
    }

    output.heading(&format!("Form values for {}", resource.name));
    output.display(&FormReport {
        resource: &resource.name,
        form: &form,
    })
}

pub async fn handle_clean(args: CleanArgs, output: &OutputManager) -> Result<()> {
    let raw = read_object(&args.input).await?;
    let filters = prune_empty(&raw);
    let ignored: Vec<&str> = args.ignore.iter().map(String::as_str).collect();
    let active_filters = active_filter_count(&QueryObject::from_map(filters.clone()), &ignored);

    output.display(&CleanReport { active_filters, filters })?;
    output.success(&format!("{active_filters} active filter(s)"));
    Ok(())
}
