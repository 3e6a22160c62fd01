use anyhow::Result;
use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{Attribute, Cell, Color as TableColor, Table, presets};
use serde::Serialize;

use crate::theme::{PALETTE, Tone};

#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Bordered tables
    #[default]
    Table,
    /// Pretty-printed JSON, for scripts
    Json,
    /// One line per result
    Compact,
}

#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// A command result that can be rendered in every [`OutputFormat`].
pub trait TableDisplay {
    fn to_table(&self, output: &OutputManager) -> Table;
    fn to_compact(&self) -> String;
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }
        match self.options.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Table => println!("{}", data.to_table(self)),
            OutputFormat::Compact => println!("{}", data.to_compact()),
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        self.status(Tone::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.status(Tone::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.status(Tone::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.status(Tone::Info, message);
    }

    pub fn verbose(&self, message: &str) {
        self.status(Tone::Detail, message);
    }

    fn shows(&self, tone: Tone) -> bool {
        match tone {
            Tone::Error => true,
            Tone::Detail => self.options.verbose && !self.options.quiet,
            _ => !self.options.quiet,
        }
    }

    fn status(&self, tone: Tone, message: &str) {
        if !self.shows(tone) {
            return;
        }
        let line = format!("{} {}", self.paint(tone.icon(), tone.color()), self.paint(message, tone.color()));
        if tone.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    /// `text` in `color`, or unchanged with `--no-color`.
    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.options.no_color {
            text.to_string()
        } else {
            text.color(color).to_string()
        }
    }

    pub fn heading(&self, text: &str) {
        if self.options.quiet {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", text.color(PALETTE.heading).bold());
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if self.options.quiet {
            return;
        }
        let key = if self.options.no_color { key.normal() } else { key.color(PALETTE.key).bold() };
        println!("{key}: {}", self.paint(value, PALETTE.value));
    }

    /// Table with the themed preset and, when `headers` is non-empty, a bold header row.
    pub fn table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(if self.options.no_color {
            presets::ASCII_FULL
        } else {
            presets::UTF8_FULL_CONDENSED
        });
        if !headers.is_empty() {
            table.set_header(headers.iter().map(|header| {
                let cell = Cell::new(header).add_attribute(Attribute::Bold);
                if self.options.no_color { cell } else { cell.fg(TableColor::Cyan) }
            }));
        }
        table
    }
}
