use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use filterdeck::AppConfig;
use filterdeck::resources::ResourceFilters;

use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inspect Profiles",
    commands: &[
        "filterdeck resources                          # List bundled resource profiles",
        "filterdeck --config admin.toml resources      # List profiles from a config file",
    ],
}];

#[derive(Serialize)]
#[serde(transparent)]
struct ResourceList<'a>(&'a [ResourceFilters]);

impl TableDisplay for ResourceList<'_> {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.table(&["Resource", "Fields", "Sorts", "Discriminator"]);
        for resource in self.0 {
            let fields: Vec<String> = resource
                .fields
                .iter()
                .map(|field| format!("{} ({})", field.key, field.field_type.as_str()))
                .collect();
            let sorts: Vec<&str> = resource.sorts.iter().map(|sort| sort.value.as_str()).collect();
            let discriminator = if resource.discriminator.is_empty() {
                String::from("-")
            } else {
                serde_json::Value::Object(resource.discriminator.clone()).to_string()
            };
            table.add_row(vec![
                Cell::new(&resource.name),
                Cell::new(fields.join("\n")),
                Cell::new(sorts.join("\n")),
                Cell::new(discriminator),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|resource| resource.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub async fn handle_resources(config: &AppConfig, output: &OutputManager) -> Result<()> {
    if config.resources.is_empty() {
        output.warning("No resources configured");
        return Ok(());
    }
    output.heading("Resources");
    output.display(&ResourceList(&config.resources))
}
