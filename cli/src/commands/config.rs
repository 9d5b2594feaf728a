use crate::commands::{print_info, print_success, print_warning};
use crate::config::{Config, OutputFormat};
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::*;
use prettytable::{Cell, Row, Table};
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set configuration value. The password is prompted for when omitted.
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: Option<String>,
    },
    /// Reset to defaults
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn execute(command: ConfigCommand, config: &Config) -> Result<()> {
    let path = Config::config_path()?;
    match command {
        ConfigCommand::Show => show(config, &path),
        ConfigCommand::Set { key, value } => {
            let value = match value {
                Some(value) => value,
                None if is_password(&key) => rpassword::prompt_password("Password: ")
                    .context("Failed to read password")?,
                None => bail!("Missing value for {key}"),
            };
            let mut stored = Config::load_from(&path)?;
            let message = apply(&mut stored, &key, &value)?;
            stored.save_to(&path)?;
            print_success(&message);
            Ok(())
        }
        ConfigCommand::Reset { yes } => {
            print_warning("This will reset all configuration to default values.");
            if !yes
                && !dialoguer::Confirm::new()
                    .with_prompt("Are you sure?")
                    .default(false)
                    .interact()?
            {
                println!("Reset cancelled.");
                return Ok(());
            }
            let config = Config::default();
            config.save_to(&path)?;
            print_success("Configuration reset to defaults");
            show(&config, &path)
        }
    }
}

fn show(config: &Config, path: &Path) -> Result<()> {
    if config.output_format == OutputFormat::Json {
        let mut shown = config.clone();
        shown.password = shown.password.map(|_| "********".to_string());
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!("\n{}", "Current Configuration".bold().green());
    println!("{}", "=".repeat(50));

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Setting").style_spec("bFg"),
        Cell::new("Value").style_spec("bFg"),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Management URL"),
        Cell::new(&config.management_url).style_spec("Fy"),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Metrics URL"),
        Cell::new(&config.metrics_url).style_spec("Fy"),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Timeout"),
        Cell::new(&format!("{} seconds", config.timeout)),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Username"),
        Cell::new(config.username.as_deref().unwrap_or("(none)")),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Password"),
        Cell::new(if config.password.is_some() { "********" } else { "(none)" }),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Debug Mode"),
        Cell::new(if config.debug { "Enabled" } else { "Disabled" })
            .style_spec(if config.debug { "Fy" } else { "Fr" }),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Output Format"),
        Cell::new(&format!("{:?}", config.output_format)),
    ]));
    table.printstd();

    println!("\nConfig file: {}", path.display().to_string().cyan());
    Ok(())
}

fn is_password(key: &str) -> bool {
    matches!(key.to_lowercase().as_str(), "password" | "pass")
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Apply one `key = value` change and describe it.
pub fn apply(config: &mut Config, key: &str, value: &str) -> Result<String> {
    let message = match key.to_lowercase().as_str() {
        "url" | "management_url" => {
            config.management_url = value.to_string();
            format!("Set management URL to: {value}")
        }
        "metrics_url" => {
            config.metrics_url = value.to_string();
            format!("Set metrics URL to: {value}")
        }
        "timeout" => {
            let timeout: u64 = value
                .parse()
                .ok()
                .filter(|t| *t > 0)
                .context("Invalid timeout value. Must be a positive number.")?;
            config.timeout = timeout;
            format!("Set timeout to: {timeout} seconds")
        }
        "username" | "user" => {
            config.username = Some(value.to_string()).filter(|v| !v.is_empty());
            format!("Set username to: {value}")
        }
        "password" | "pass" => {
            config.password = Some(value.to_string()).filter(|v| !v.is_empty());
            "Password updated".to_string()
        }
        "debug" => {
            let debug = parse_flag(value)
                .context("Invalid debug value. Use: true/false, on/off, yes/no, 1/0")?;
            config.debug = debug;
            format!("Debug mode {}", if debug { "enabled" } else { "disabled" })
        }
        "format" | "output" | "output_format" => {
            config.output_format = value.parse().map_err(anyhow::Error::msg)?;
            format!("Output format set to: {value}")
        }
        _ => {
            print_info(
                "Valid keys: management_url, metrics_url, timeout, username, password, debug, output_format",
            );
            bail!("Unknown configuration key: {key}");
        }
    };
    Ok(message)
}
