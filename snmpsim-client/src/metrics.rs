//! Read-only client for the simulator's metrics API.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::model::filter::Filters;
use crate::model::metrics::{MessageMetrics, PacketMetrics, ProcessMetrics};
use crate::transport::{Credentials, HttpTransport};

/// Path of the metrics API under the base URL.
pub const METRICS_API_PREFIX: &str = "snmpsim/metrics/v1";

/// Metrics activity scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Raw transport endpoint counters
    Packets,
    /// SNMP message and PDU counters
    Messages,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Packets => "packets",
            Activity::Messages => "messages",
        }
    }
}

/// Queries aggregate counters from the simulator.
///
/// Every call is one independent, idempotent GET; nothing is cached. The client
/// is cheap to clone and safe to share between tasks.
#[derive(Debug, Clone)]
pub struct MetricsClient {
    transport: HttpTransport,
}

impl MetricsClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config, METRICS_API_PREFIX)?,
        })
    }

    /// Enable HTTP basic auth for subsequent calls. Both values must be non-empty.
    pub fn set_username_and_password(&mut self, username: &str, password: &str) -> Result<()> {
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::invalid_argument(
                "username and password must not be empty",
            ));
        }
        self.transport.set_credentials(Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }));
        Ok(())
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Packet counters for the traffic matching every filter pair. Empty filters
    /// return global totals.
    pub async fn packet_metrics(&self, filters: &Filters) -> Result<PacketMetrics> {
        self.activity(Activity::Packets, filters).await
    }

    /// Message counters for the traffic matching every filter pair.
    pub async fn message_metrics(&self, filters: &Filters) -> Result<MessageMetrics> {
        self.activity(Activity::Messages, filters).await
    }

    /// Filter keys accepted by [`MetricsClient::packet_metrics`], in server order.
    pub async fn packet_filters(&self) -> Result<Vec<String>> {
        self.filters(Activity::Packets).await
    }

    /// Values currently known to the server for one packet filter key.
    pub async fn packet_filter_values(&self, key: &str) -> Result<Vec<String>> {
        self.filter_values(Activity::Packets, key).await
    }

    pub async fn message_filters(&self) -> Result<Vec<String>> {
        self.filters(Activity::Messages).await
    }

    pub async fn message_filter_values(&self, key: &str) -> Result<Vec<String>> {
        self.filter_values(Activity::Messages, key).await
    }

    /// Metrics of every simulator process.
    pub async fn processes(&self) -> Result<Vec<ProcessMetrics>> {
        let url = self.transport.url(&["processes"])?;
        self.transport.get(url).await
    }

    pub async fn process(&self, id: u64) -> Result<ProcessMetrics> {
        let url = self.transport.url(&["processes".to_string(), id.to_string()])?;
        self.transport.get(url).await
    }

    async fn activity<T: serde::de::DeserializeOwned>(
        &self,
        activity: Activity,
        filters: &Filters,
    ) -> Result<T> {
        let url = self.transport.url(&["activity", activity.as_str()])?;
        self.transport.get_with_query(url, filters.iter()).await
    }

    async fn filters(&self, activity: Activity) -> Result<Vec<String>> {
        let url = self
            .transport
            .url(&["activity", activity.as_str(), "filters"])?;
        self.transport.get(url).await
    }

    async fn filter_values(&self, activity: Activity, key: &str) -> Result<Vec<String>> {
        if key.is_empty() {
            return Err(ClientError::invalid_argument("filter key must not be empty"));
        }
        let url = self
            .transport
            .url(&["activity", activity.as_str(), "filters", key])?;
        self.transport.get(url).await
    }
}
