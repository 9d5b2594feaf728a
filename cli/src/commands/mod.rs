pub mod config;
pub mod inventory;
pub mod labs;
pub mod metrics;
pub mod recordings;

use crate::config::OutputFormat;
use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::*;
use prettytable::{Cell, Row, Table};
use serde::Serialize;
use std::fmt::Display;

/// Format output based on user preference. `rows` renders the table and text
/// layouts; JSON always prints the full value.
pub fn format_output<T: Serialize>(
    data: &T,
    format: &OutputFormat,
    title: &str,
    header: &[&str],
    rows: Vec<Vec<String>>,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => {
            println!("{}", title.bold().green());
            println!("{}", "=".repeat(title.len()));
            for row in rows {
                let line: Vec<String> = header
                    .iter()
                    .zip(row)
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect();
                println!("{}", line.join("  "));
            }
        }
        OutputFormat::Table => {
            println!("\n{}", title.bold().green());
            println!("{}", "=".repeat(title.len().max(40)));
            if rows.is_empty() {
                print_info("Nothing to show");
                return Ok(());
            }
            table(header, rows).printstd();
        }
    }
    Ok(())
}

pub fn table(header: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(
        header
            .iter()
            .map(|name| Cell::new(name).style_spec("bFg"))
            .collect(),
    ));
    for row in rows {
        table.add_row(Row::new(row.iter().map(|value| Cell::new(value)).collect()));
    }
    table
}

/// Render an optional value, keeping "not reported" visible.
pub fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn timestamp(value: Option<DateTime<Utc>>) -> String {
    or_dash(value.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC")))
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message.blue());
}
