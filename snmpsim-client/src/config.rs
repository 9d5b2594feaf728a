use crate::error::{ClientError, Result};
use crate::transport::Credentials;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Prefix of the environment variables overriding [`ClientConfig`] fields,
/// e.g. `SNMPSIM_BASE_URL`.
pub const ENV_PREFIX: &str = "SNMPSIM";

/// Connection settings shared by the management and metrics clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL of the REST API, without the `snmpsim/...` path
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// HTTP basic auth user name
    pub username: Option<String>,

    /// HTTP basic auth password
    pub password: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            username: None,
            password: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Layer defaults, an optional TOML file and `SNMPSIM_*` environment variables.
    pub fn load(path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        Self::load_over(&Self::default(), path)
    }

    /// Like [`load`](Self::load), with `base` in place of the built-in defaults.
    pub fn load_over(base: &ClientConfig, path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(base)?);

        if let Some(path) = path {
            if path.exists() {
                info!("Loading client configuration from: {:?}", path);
                builder = builder.add_source(File::from(path).required(false));
            } else {
                debug!("Client configuration file {:?} not found, using defaults", path);
            }
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigError::Message(format!("Configuration validation error: {e}")))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::invalid_argument(format!(
                "base_url must use http or https, got {}",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::invalid_argument("timeout_secs must be > 0"));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(ClientError::invalid_argument(
                "username and password must be set together",
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}
