//! Client for the SNMP simulator REST API.
//!
//! Two clients share one HTTP transport:
//!
//! - [`ManagementClient`] creates, relates and deletes labs, agents, engines,
//!   endpoints, users and recordings.
//! - [`MetricsClient`] queries aggregate packet and message counters, optionally
//!   narrowed by server-defined [`Filters`].
//!
//! ```rust,no_run
//! use snmpsim_client::{Filters, MetricsClient};
//!
//! # async fn run() -> snmpsim_client::Result<()> {
//! let metrics = MetricsClient::new("http://127.0.0.1:8000")?;
//! let all = metrics.packet_metrics(&Filters::new()).await?;
//! let one = metrics
//!     .packet_metrics(&Filters::new().with("local_address", "127.0.0.1:1161"))
//!     .await?;
//! assert!(one.bounded_by(&all));
//! # Ok(())
//! # }
//! ```

// Enforce panic-free code in production
#![cfg_attr(not(test), warn(clippy::unwrap_used))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(test), warn(clippy::panic))]
// Test-specific allows
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod management;
pub mod metrics;
pub mod model;
pub mod transport;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use management::ManagementClient;
pub use metrics::MetricsClient;
pub use model::entities::{
    Agent, Endpoint, Engine, Lab, NewAgent, NewEndpoint, NewEngine, NewLab, NewUser, Power,
    Protocol, Recording, Selector, User,
};
pub use model::filter::Filters;
pub use model::metrics::{
    MessageMetrics, PacketMetrics, ProcessLifeCycle, ProcessMetrics, Variation,
};
pub use transport::Credentials;
