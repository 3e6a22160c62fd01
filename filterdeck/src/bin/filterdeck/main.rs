mod commands;
mod examples;
mod output;
mod theme;

use anyhow::{Context, Result};
use clap::{
    ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Style},
    },
};

use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};
use std::fmt::Write;
use std::path::PathBuf;

use commands::{
    access::{CanArgs, handle_can},
    export::{ExportArgs, handle_export},
    filters::{CleanArgs, CompileArgs, DecompileArgs, handle_clean, handle_compile, handle_decompile},
    resources::handle_resources,
};
use examples::{ExampleGroup, command_examples};
use filterdeck::AppConfig;
use filterdeck::config::CONFIG_ENV;
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ARROW, PALETTE};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    (CONFIG_ENV, "Path to a filterdeck.toml (defaults to the bundled profiles)"),
    ("RUST_LOG", "Log filter, e.g. filterdeck=debug"),
];

#[derive(Parser)]
#[command(name = "filterdeck")]
#[command(version)]
#[command(
    about = "Filter compiler and list tooling for admin back-office resources",
    long_about = r#"Declarative filter tooling for admin back-office resources:

• Compile filter-drawer values into list queries and back
• Clean filter state and count active filters
• Check role permissions per module and action
• Bulk-export filtered lists to CSV

Commands:
  resources  List configured resource profiles
  compile    Form values -> list query
  decompile  List query -> form values
  clean      Drop empty constraints
  can        Evaluate role permissions
  export     Write documents to CSV
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured resource profiles
    Resources,

    /// Compile filter-drawer form values into a list query
    Compile(CompileArgs),

    /// Reverse-map an applied list query into form values
    Decompile(DecompileArgs),

    /// Drop empty constraints from a filter mapping
    Clean(CleanArgs),

    /// Check whether a role may perform actions on a module
    Can(CanArgs),

    /// Export documents to a CSV file
    Export(ExportArgs),
}

fn parse_cli() -> Cli {
    let use_color = ShouldColorize::from_env().should_colorize();
    let mut command = Cli::command()
        .styles(help_styles())
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .after_long_help(environment_help(use_color));
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand.clone().after_long_help(examples_help(example.groups, use_color));
        }
    }
    let matches = command.get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

fn paint(text: &str, color: ThemeColor, use_color: bool) -> String {
    if use_color { text.color(color).bold().to_string() } else { text.to_string() }
}

fn examples_help(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut help = paint("Examples:", PALETTE.heading, use_color);
    for group in groups {
        let _ = write!(help, "\n  {}", paint(group.title, PALETTE.key, use_color));
        for command in group.commands {
            let _ = write!(help, "\n    {ARROW} {command}");
        }
        help.push('\n');
    }
    help
}

fn environment_help(use_color: bool) -> String {
    let mut help = paint("Environment Variables:", PALETTE.heading, use_color);
    for (key, description) in ENVIRONMENT_VARIABLES {
        let _ = write!(help, "\n  {}  {description}", paint(key, PALETTE.key, use_color));
    }
    let _ = write!(
        help,
        "\n\n{} Use 'filterdeck <command> --help' to view examples for each command.",
        paint("Tip:", PALETTE.heading, use_color)
    );
    help
}

fn help_styles() -> Styles {
    let ansi = |color: ThemeColor| {
        let ansi = match color {
            ThemeColor::Red => AnsiColor::Red,
            ThemeColor::Green => AnsiColor::Green,
            ThemeColor::Yellow => AnsiColor::Yellow,
            ThemeColor::Blue => AnsiColor::Blue,
            ThemeColor::Magenta => AnsiColor::Magenta,
            ThemeColor::Cyan => AnsiColor::Cyan,
            ThemeColor::BrightBlack => AnsiColor::BrightBlack,
            ThemeColor::BrightCyan => AnsiColor::BrightCyan,
            _ => AnsiColor::White,
        };
        Style::new().fg_color(Some(ansi.into()))
    };
    Styles::styled()
        .usage(ansi(PALETTE.key).bold())
        .header(ansi(PALETTE.heading).bold())
        .literal(ansi(PALETTE.command))
        .placeholder(ansi(PALETTE.muted))
        .valid(ansi(PALETTE.success))
        .invalid(ansi(PALETTE.warning))
        .error(ansi(PALETTE.error).bold())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = parse_cli();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let options = GlobalOptions {
        output_format: cli.output.clone(),
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };
    let output = OutputManager::new(options);

    if let Err(err) = execute(cli, &output).await {
        output.error(&format!("Error: {err:#}"));
        std::process::exit(1);
    }
}

async fn execute(cli: Cli, output: &OutputManager) -> Result<()> {
    let config = AppConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;
    output.verbose(&format!("{} resource profile(s) loaded", config.resources.len()));

    match cli.command {
        Commands::Resources => handle_resources(&config, output).await?,
        Commands::Compile(args) => handle_compile(args, &config, output).await?,
        Commands::Decompile(args) => handle_decompile(args, &config, output).await?,
        Commands::Clean(args) => handle_clean(args, output).await?,
        Commands::Can(args) => handle_can(args, &config, output).await?,
        Commands::Export(args) => handle_export(args, &config, output).await?,
    }

    Ok(())
}
