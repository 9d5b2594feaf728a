use crate::commands::{format_output, or_dash, print_info, timestamp};
use crate::config::{Config, OutputFormat};
use anyhow::{anyhow, Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::*;
use snmpsim_client::{Filters, MessageMetrics, PacketMetrics, ProcessMetrics};

#[derive(Subcommand, Debug)]
pub enum MetricsCommand {
    /// Transport packet counters
    Packets {
        /// Narrow the query, e.g. local_address=127.0.0.1:1161
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },
    /// SNMP message counters and variation modules
    Messages {
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },
    /// Filter keys, or the values seen for KEY
    Filters {
        #[arg(value_enum)]
        activity: Activity,
        key: Option<String>,
    },
    /// Simulator process statistics
    Processes {
        /// A single process
        id: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    Packets,
    Messages,
}

pub fn parse_filters(pairs: &[String]) -> Result<Filters> {
    Filters::parse_pairs(pairs).map_err(|e| anyhow!(e))
}

const COUNTER_HEADER: [&str; 2] = ["Counter", "Value"];

pub fn packet_rows(packets: &PacketMetrics) -> Vec<Vec<String>> {
    vec![
        vec!["First hit".into(), timestamp(packets.first_hit)],
        vec!["Last hit".into(), timestamp(packets.last_hit)],
        vec!["Total".into(), or_dash(packets.total)],
        vec!["Parse failures".into(), or_dash(packets.parse_failures)],
        vec!["Auth failures".into(), or_dash(packets.auth_failures)],
        vec!["Context failures".into(), or_dash(packets.context_failures)],
    ]
}

pub fn message_rows(messages: &MessageMetrics) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec!["First hit".into(), timestamp(messages.first_hit)],
        vec!["Last hit".into(), timestamp(messages.last_hit)],
        vec!["PDUs".into(), or_dash(messages.pdus)],
        vec!["Var-binds".into(), or_dash(messages.var_binds)],
        vec!["Failures".into(), or_dash(messages.failures)],
    ];
    for variation in &messages.variations {
        let name = variation.name.as_deref().unwrap_or("unnamed");
        rows.push(vec![
            format!("Variation {name}"),
            format!(
                "{} total, {} failed",
                or_dash(variation.total),
                or_dash(variation.failures)
            ),
        ]);
    }
    rows
}

fn process_row(index: usize, process: &ProcessMetrics) -> Vec<String> {
    let lifecycle = process.lifecycle.as_ref();
    vec![
        index.to_string(),
        or_dash(process.cmdline.as_deref()),
        or_dash(process.uptime),
        or_dash(process.memory),
        or_dash(process.cpu),
        or_dash(lifecycle.and_then(|l| l.restarts)),
    ]
}

fn title(base: &str, filters: &Filters) -> String {
    if filters.is_empty() {
        return base.to_string();
    }
    let scope: Vec<String> = filters.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{base} ({})", scope.join(", "))
}

pub async fn execute(command: MetricsCommand, config: &Config) -> Result<()> {
    let client = config.metrics_client()?;
    match command {
        MetricsCommand::Packets { filters } => {
            let filters = parse_filters(&filters)?;
            let packets = client
                .packet_metrics(&filters)
                .await
                .context("Failed to fetch packet metrics")?;
            let title = title("Packet metrics", &filters);
            format_output(&packets, &config.output_format, &title, &COUNTER_HEADER, packet_rows(&packets))?;
            if config.output_format != OutputFormat::Json {
                if let Some(ok) = packets.successes() {
                    println!("{} {}", "Processed cleanly:".bold(), ok.to_string().green());
                }
            }
        }
        MetricsCommand::Messages { filters } => {
            let filters = parse_filters(&filters)?;
            let messages = client
                .message_metrics(&filters)
                .await
                .context("Failed to fetch message metrics")?;
            let title = title("Message metrics", &filters);
            format_output(&messages, &config.output_format, &title, &COUNTER_HEADER, message_rows(&messages))?;
        }
        MetricsCommand::Filters { activity, key } => {
            let values = match (activity, key.as_deref()) {
                (Activity::Packets, None) => client.packet_filters().await,
                (Activity::Messages, None) => client.message_filters().await,
                (Activity::Packets, Some(key)) => client.packet_filter_values(key).await,
                (Activity::Messages, Some(key)) => client.message_filter_values(key).await,
            }
            .context("Failed to fetch filters")?;
            let (title, column) = match &key {
                Some(key) => (format!("Values seen for {key}"), "Value"),
                None => ("Filter keys".to_string(), "Key"),
            };
            if values.is_empty() && config.output_format != OutputFormat::Json {
                print_info("No traffic recorded yet");
                return Ok(());
            }
            let rows = values.iter().map(|v| vec![v.clone()]).collect();
            format_output(&values, &config.output_format, &title, &[column], rows)?;
        }
        MetricsCommand::Processes { id } => {
            let header = ["#", "Command", "Uptime (s)", "Memory", "CPU", "Restarts"];
            match id {
                Some(id) => {
                    let process = client
                        .process(id)
                        .await
                        .with_context(|| format!("Failed to fetch process {id}"))?;
                    let rows = vec![process_row(id as usize, &process)];
                    format_output(&process, &config.output_format, "Process", &header, rows)?;
                }
                None => {
                    let processes = client.processes().await.context("Failed to fetch processes")?;
                    let rows = processes
                        .iter()
                        .enumerate()
                        .map(|(i, p)| process_row(i + 1, p))
                        .collect();
                    format_output(&processes, &config.output_format, "Processes", &header, rows)?;
                }
            }
        }
    }
    Ok(())
}
