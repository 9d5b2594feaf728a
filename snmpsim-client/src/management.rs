//! Client for the simulator's management API.
//!
//! Entities are created, related and deleted here; the server is the only
//! source of truth. A missing resource surfaces as an HTTP 404, which cleanup
//! code usually treats as success via [`ClientError::is_not_found`].

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::model::entities::{
    Agent, Endpoint, Engine, Id, Lab, NewAgent, NewEndpoint, NewEngine, NewLab, NewUser, Power,
    Recording, Selector, User,
};
use crate::transport::{Credentials, HttpTransport};
use std::path::Path;
use tracing::info;
use url::Url;

/// Path of the management API under the base URL.
pub const MANAGEMENT_API_PREFIX: &str = "snmpsim/mgmt/v1";

#[derive(Debug, Clone)]
pub struct ManagementClient {
    transport: HttpTransport,
}

impl ManagementClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config, MANAGEMENT_API_PREFIX)?,
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

    fn collection(&self, kind: &str) -> Result<Url> {
        self.transport.url(&[kind])
    }

    fn item(&self, kind: &str, id: Id) -> Result<Url> {
        self.transport.url(&[kind.to_string(), id.to_string()])
    }

    /// `{kind}/{id}/{relation}/{other}`
    fn relation(&self, kind: &str, id: Id, relation: &str, other: Id) -> Result<Url> {
        self.transport.url(&[
            kind.to_string(),
            id.to_string(),
            relation.to_string(),
            other.to_string(),
        ])
    }

    // Labs

    pub async fn labs(&self) -> Result<Vec<Lab>> {
        self.transport.get(self.collection("labs")?).await
    }

    pub async fn lab(&self, id: Id) -> Result<Lab> {
        self.transport.get(self.item("labs", id)?).await
    }

    pub async fn create_lab(&self, lab: &NewLab) -> Result<Lab> {
        lab.validate()?;
        let created: Lab = self
            .transport
            .post_json(self.collection("labs")?, lab)
            .await?;
        info!(id = created.id, name = %created.name, "created lab");
        Ok(created)
    }

    pub async fn delete_lab(&self, id: Id) -> Result<()> {
        self.transport.delete(self.item("labs", id)?).await
    }

    pub async fn add_agent_to_lab(&self, lab: Id, agent: Id) -> Result<()> {
        self.transport
            .put(self.relation("labs", lab, "agent", agent)?)
            .await
    }

    pub async fn remove_agent_from_lab(&self, lab: Id, agent: Id) -> Result<()> {
        self.transport
            .delete(self.relation("labs", lab, "agent", agent)?)
            .await
    }

    /// Start or stop every agent in the lab.
    pub async fn set_lab_power(&self, lab: Id, power: impl Into<Power>) -> Result<()> {
        let power = power.into();
        let url = self.transport.url(&[
            "labs".to_string(),
            lab.to_string(),
            "power".to_string(),
            power.to_string(),
        ])?;
        self.transport.put(url).await?;
        info!(lab, %power, "set lab power");
        Ok(())
    }

    // Agents

    pub async fn agents(&self) -> Result<Vec<Agent>> {
        self.transport.get(self.collection("agents")?).await
    }

    pub async fn agent(&self, id: Id) -> Result<Agent> {
        self.transport.get(self.item("agents", id)?).await
    }

    pub async fn create_agent(&self, agent: &NewAgent) -> Result<Agent> {
        agent.validate()?;
        let created: Agent = self
            .transport
            .post_json(self.collection("agents")?, agent)
            .await?;
        info!(id = created.id, name = %created.name, "created agent");
        Ok(created)
    }

    pub async fn delete_agent(&self, id: Id) -> Result<()> {
        self.transport.delete(self.item("agents", id)?).await
    }

    pub async fn add_engine_to_agent(&self, agent: Id, engine: Id) -> Result<()> {
        self.transport
            .put(self.relation("agents", agent, "engine", engine)?)
            .await
    }

    pub async fn remove_engine_from_agent(&self, agent: Id, engine: Id) -> Result<()> {
        self.transport
            .delete(self.relation("agents", agent, "engine", engine)?)
            .await
    }

    // Engines

    pub async fn engines(&self) -> Result<Vec<Engine>> {
        self.transport.get(self.collection("engines")?).await
    }

    pub async fn engine(&self, id: Id) -> Result<Engine> {
        self.transport.get(self.item("engines", id)?).await
    }

    pub async fn create_engine(&self, engine: &NewEngine) -> Result<Engine> {
        engine.validate()?;
        let created: Engine = self
            .transport
            .post_json(self.collection("engines")?, engine)
            .await?;
        info!(id = created.id, engine_id = %created.engine_id, "created engine");
        Ok(created)
    }

    pub async fn delete_engine(&self, id: Id) -> Result<()> {
        self.transport.delete(self.item("engines", id)?).await
    }

    pub async fn add_endpoint_to_engine(&self, engine: Id, endpoint: Id) -> Result<()> {
        self.transport
            .put(self.relation("engines", engine, "endpoint", endpoint)?)
            .await
    }

    pub async fn remove_endpoint_from_engine(&self, engine: Id, endpoint: Id) -> Result<()> {
        self.transport
            .delete(self.relation("engines", engine, "endpoint", endpoint)?)
            .await
    }

    pub async fn add_user_to_engine(&self, engine: Id, user: Id) -> Result<()> {
        self.transport
            .put(self.relation("engines", engine, "user", user)?)
            .await
    }

    pub async fn remove_user_from_engine(&self, engine: Id, user: Id) -> Result<()> {
        self.transport
            .delete(self.relation("engines", engine, "user", user)?)
            .await
    }

    // Endpoints

    pub async fn endpoints(&self) -> Result<Vec<Endpoint>> {
        self.transport.get(self.collection("endpoints")?).await
    }

    pub async fn endpoint(&self, id: Id) -> Result<Endpoint> {
        self.transport.get(self.item("endpoints", id)?).await
    }

    pub async fn create_endpoint(&self, endpoint: &NewEndpoint) -> Result<Endpoint> {
        endpoint.validate()?;
        let created: Endpoint = self
            .transport
            .post_json(self.collection("endpoints")?, endpoint)
            .await?;
        info!(id = created.id, address = %created.address, "created endpoint");
        Ok(created)
    }

    pub async fn delete_endpoint(&self, id: Id) -> Result<()> {
        self.transport.delete(self.item("endpoints", id)?).await
    }

    // Users

    pub async fn users(&self) -> Result<Vec<User>> {
        self.transport.get(self.collection("users")?).await
    }

    pub async fn user(&self, id: Id) -> Result<User> {
        self.transport.get(self.item("users", id)?).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        user.validate()?;
        let created: User = self
            .transport
            .post_json(self.collection("users")?, user)
            .await?;
        info!(id = created.id, user = %created.user, "created user");
        Ok(created)
    }

    pub async fn delete_user(&self, id: Id) -> Result<()> {
        self.transport.delete(self.item("users", id)?).await
    }

    // Selectors are configured server-side only

    pub async fn selectors(&self) -> Result<Vec<Selector>> {
        self.transport.get(self.collection("selectors")?).await
    }

    pub async fn selector(&self, id: Id) -> Result<Selector> {
        self.transport.get(self.item("selectors", id)?).await
    }

    // Recordings

    pub async fn recordings(&self) -> Result<Vec<Recording>> {
        self.transport.get(self.collection("recordings")?).await
    }

    /// Upload a local simulation data file to `remote_path` under the data root.
    pub async fn upload_record_file(&self, local_path: &Path, remote_path: &str) -> Result<()> {
        let data = tokio::fs::read(local_path).await?;
        self.upload_record_data(remote_path, data).await
    }

    pub async fn upload_record_data(&self, remote_path: &str, data: Vec<u8>) -> Result<()> {
        let url = self.recording_url(remote_path)?;
        let size = data.len();
        self.transport.post_bytes(url, data).await?;
        info!(path = remote_path, size, "uploaded record file");
        Ok(())
    }

    pub async fn delete_record_file(&self, remote_path: &str) -> Result<()> {
        self.transport
            .delete(self.recording_url(remote_path)?)
            .await
    }

    fn recording_url(&self, remote_path: &str) -> Result<Url> {
        let mut segments = vec!["recordings"];
        segments.extend(remote_path.split('/').filter(|s| !s.is_empty()));
        if segments.len() == 1 {
            return Err(ClientError::invalid_argument(
                "record file path must not be empty",
            ));
        }
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return Err(ClientError::invalid_argument(format!(
                "record file path {remote_path} must not contain relative segments"
            )));
        }
        self.transport.url(&segments)
    }
}
