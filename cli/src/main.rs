// snmpsim CLI client
// Command-line access to the simulator management and metrics REST APIs

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::debug;
use snmpsim_cli::commands::config::ConfigCommand;
use snmpsim_cli::commands::inventory::{AgentCommand, EndpointCommand, EngineCommand, UserCommand};
use snmpsim_cli::commands::labs::LabCommand;
use snmpsim_cli::commands::metrics::MetricsCommand;
use snmpsim_cli::commands::recordings::RecordingCommand;
use snmpsim_cli::commands::{self, print_error};
use snmpsim_cli::config::{Config, OutputFormat};

#[derive(Parser)]
#[command(name = "snmpsim-cli")]
#[command(about = "SNMP simulator management and metrics CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Management API base URL
    #[arg(long, env = "SNMPSIM_URL", global = true)]
    url: Option<String>,

    /// Metrics API base URL
    #[arg(long, env = "SNMPSIM_METRICS_URL", global = true)]
    metrics_url: Option<String>,

    #[arg(short = 'u', long, env = "SNMPSIM_USERNAME", global = true)]
    username: Option<String>,

    #[arg(short = 'p', long, env = "SNMPSIM_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format: json, table or text
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lab management
    #[command(subcommand)]
    Labs(LabCommand),

    /// Agent management
    #[command(subcommand)]
    Agents(AgentCommand),

    /// SNMP engine management
    #[command(subcommand)]
    Engines(EngineCommand),

    /// Transport endpoint management
    #[command(subcommand)]
    Endpoints(EndpointCommand),

    /// SNMP user management
    #[command(subcommand)]
    Users(UserCommand),

    /// Simulation data files
    #[command(subcommand)]
    Recordings(RecordingCommand),

    /// Activity and process metrics
    #[command(subcommand)]
    Metrics(MetricsCommand),

    /// CLI configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logger
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("info")
    };
    env_logger::init_from_env(env);

    if let Err(err) = run(cli).await {
        print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let mut config = Config::load()?;

    // Override with CLI arguments
    if let Some(url) = cli.url {
        config.management_url = url;
    }
    if let Some(url) = cli.metrics_url {
        config.metrics_url = url;
    }
    if cli.username.is_some() {
        config.username = cli.username;
    }
    if cli.password.is_some() {
        config.password = cli.password;
    }
    if let Some(format) = cli.format {
        config.output_format = format;
    }
    if cli.debug {
        config.debug = true;
    }
    debug!(
        "management API at {}, metrics API at {}",
        config.management_url, config.metrics_url
    );

    match cli.command {
        Commands::Labs(cmd) => commands::labs::execute(cmd, &config).await,
        Commands::Agents(cmd) => commands::inventory::agents(cmd, &config).await,
        Commands::Engines(cmd) => commands::inventory::engines(cmd, &config).await,
        Commands::Endpoints(cmd) => commands::inventory::endpoints(cmd, &config).await,
        Commands::Users(cmd) => commands::inventory::users(cmd, &config).await,
        Commands::Recordings(cmd) => commands::recordings::execute(cmd, &config).await,
        Commands::Metrics(cmd) => commands::metrics::execute(cmd, &config).await,
        Commands::Config(cmd) => commands::config::execute(cmd, &config).await,
    }
}
