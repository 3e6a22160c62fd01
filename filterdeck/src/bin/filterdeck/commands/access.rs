use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use std::sync::Arc;

use filterdeck::AppConfig;
use filterdeck::permissions::SessionPermissions;

use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::Tone;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Check Permissions",
    commands: &[
        "filterdeck can admin webinars export        # Single check",
        "filterdeck can counsellor job-applications   # All actions for a module",
    ],
}];

#[derive(Args)]
pub struct CanArgs {
    /// Role of the authenticated session
    pub role: String,

    /// Module (resource) name
    pub module: String,

    /// Action to check; all standard actions when omitted
    pub action: Option<String>,
}

#[derive(Serialize)]
struct PermissionReport<'a> {
    role: &'a str,
    module: &'a str,
    checks: Vec<(String, bool)>,
}

impl TableDisplay for PermissionReport<'_> {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.table(&["Action", "Allowed"]);
        for (action, allowed) in &self.checks {
            let tone = if *allowed { Tone::Success } else { Tone::Error };
            table.add_row(vec![Cell::new(action), Cell::new(output.paint(tone.icon(), tone.color()))]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.checks
            .iter()
            .map(|(action, allowed)| format!("{action}={allowed}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub async fn handle_can(args: CanArgs, config: &AppConfig, output: &OutputManager) -> Result<()> {
    let session = SessionPermissions::new(args.role.as_str(), Arc::new(config.roles.clone()));
    let actions: Vec<String> = match args.action {
        Some(action) => vec![action],
        None => filterdeck::permissions::actions::ALL
            .iter()
            .map(|action| action.to_string())
            .collect(),
    };
    let checks: Vec<(String, bool)> = actions
        .into_iter()
        .map(|action| {
            let allowed = session.can(&args.module, &action);
            (action, allowed)
        })
        .collect();

    if !config.roles.roles().any(|role| role == session.subject()) {
        output.warning(&format!("Role '{}' has no grants", session.subject()));
    }

    output.display(&PermissionReport {
        role: session.subject(),
        module: &args.module,
        checks,
    })
}
