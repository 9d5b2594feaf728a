use anyhow::{Context, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use snmpsim_client::{ClientConfig, ManagementClient, MetricsClient};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Management API base URL
    pub management_url: String,

    /// Metrics API base URL, often the same server
    pub metrics_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Basic auth user
    pub username: Option<String>,

    /// Basic auth password
    pub password: Option<String>,

    /// Enable debug logging
    pub debug: bool,

    /// Output format (json, table, text)
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Table,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            "text" => Ok(OutputFormat::Text),
            other => Err(format!(
                "invalid output format '{other}', must be json, table or text"
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            management_url: "http://127.0.0.1:8000".to_string(),
            metrics_url: "http://127.0.0.1:8000".to_string(),
            timeout: 30,
            username: None,
            password: None,
            debug: false,
            output_format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = home_dir().context("Failed to get home directory")?;
        Ok(home.join(".snmpsim").join("cli").join("config.toml"))
    }

    /// CLI settings, overridden by any `SNMPSIM_*` client variables
    /// (`SNMPSIM_BASE_URL`, `SNMPSIM_TIMEOUT_SECS`, ...).
    pub fn client_config(&self, base_url: &str) -> Result<ClientConfig> {
        let base = ClientConfig {
            base_url: base_url.to_string(),
            timeout_secs: self.timeout,
            username: self.username.clone(),
            password: self.password.clone(),
        };
        ClientConfig::load_over(&base, None).context("Invalid client configuration")
    }

    pub fn management_client(&self) -> Result<ManagementClient> {
        let config = self.client_config(&self.management_url)?;
        ManagementClient::from_config(&config).context("Failed to create management client")
    }

    pub fn metrics_client(&self) -> Result<MetricsClient> {
        let config = self.client_config(&self.metrics_url)?;
        MetricsClient::from_config(&config).context("Failed to create metrics client")
    }
}
