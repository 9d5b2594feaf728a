//! Management entities: labs, agents, engines, endpoints, users, recordings
//! and selectors.
//!
//! Relations are carried as nested containers (an agent lists its engines and
//! labs, an engine lists its agents, endpoints and users). The client keeps no
//! copy of these; every read goes back to the server.

use super::null_as_default;
use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned entity identifier.
pub type Id = u64;

/// Group of SNMP agents belonging to the same virtual laboratory. Some
/// operations, like powering on, apply to all of them at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Lab {
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: Vec<Agent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub power: Power,
}

/// A unique, independent SNMP engine, bound to endpoints and users.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Engine {
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub engine_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: Vec<Agent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub endpoints: Vec<Endpoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
}

/// SNMP agent: one or more engines plus the data directory serving them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_dir: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub engines: Vec<Engine>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub endpoints: Vec<Endpoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labs: Vec<Lab>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub selectors: Vec<Selector>,
}

/// Transport endpoint. Each endpoint is bound by exactly one engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Endpoint {
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protocol: Protocol,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub engines: Vec<Engine>,
}

/// SNMPv3 USM user. `user` is the security name, `name` a display label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub auth_key: Option<String>,
    #[serde(default)]
    pub auth_proto: Option<String>,
    #[serde(default)]
    pub priv_key: Option<String>,
    #[serde(default)]
    pub priv_proto: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub engines: Vec<Engine>,
}

/// A simulation data file under the simulator's data root.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recording {
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
}

/// Template expanded per request into a recording path relative to the agent's
/// data directory. Known templates include `${context-engine-id}`,
/// `${context-name}`, `${endpoint-id}` and `${source-address}`.
///
/// Selectors are configured server-side; the client only reads them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selector {
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub template: String,
}

/// Lab power state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    #[default]
    Off,
}

impl Power {
    pub fn as_str(&self) -> &'static str {
        match self {
            Power::On => "on",
            Power::Off => "off",
        }
    }
}

impl From<bool> for Power {
    fn from(on: bool) -> Self {
        if on {
            Power::On
        } else {
            Power::Off
        }
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Power {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "on" | "true" => Ok(Power::On),
            "off" | "false" => Ok(Power::Off),
            other => Err(ClientError::invalid_argument(format!(
                "unknown power state: {other}"
            ))),
        }
    }
}

/// Transport protocol of an endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Udpv4,
    Udpv6,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Udpv4 => f.write_str("udpv4"),
            Protocol::Udpv6 => f.write_str("udpv6"),
        }
    }
}

impl FromStr for Protocol {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "udpv4" | "udp" => Ok(Protocol::Udpv4),
            "udpv6" => Ok(Protocol::Udpv6),
            other => Err(ClientError::invalid_argument(format!(
                "unknown endpoint protocol: {other}"
            ))),
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::invalid_argument(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

/// Body of a lab creation request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewLab {
    pub name: String,
}

impl NewLab {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<()> {
        require("lab name", &self.name)
    }
}

/// Body of an agent creation request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewAgent {
    pub name: String,
    pub data_dir: String,
}

impl NewAgent {
    pub fn new(name: impl Into<String>, data_dir: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("agent name", &self.name)?;
        require("agent data_dir", &self.data_dir)
    }
}

/// Body of an engine creation request. `engine_id` is the hex SNMP engine ID.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewEngine {
    pub name: String,
    pub engine_id: String,
}

impl NewEngine {
    pub fn new(name: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine_id: engine_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("engine name", &self.name)?;
        require("engine_id", &self.engine_id)
    }
}

/// Body of an endpoint creation request. `address` is `host:port`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewEndpoint {
    pub name: String,
    pub address: String,
    pub protocol: Protocol,
}

impl NewEndpoint {
    pub fn new(name: impl Into<String>, address: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            protocol,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("endpoint name", &self.name)?;
        require("endpoint address", &self.address)
    }
}

/// Body of a user creation request. Unset keys and protocols are omitted from
/// the request so the server applies its own defaults.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct NewUser {
    pub user: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_proto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priv_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priv_proto: Option<String>,
}

impl NewUser {
    pub fn new(user: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_auth(mut self, proto: impl Into<String>, key: impl Into<String>) -> Self {
        self.auth_proto = non_empty(proto.into());
        self.auth_key = non_empty(key.into());
        self
    }

    pub fn with_privacy(mut self, proto: impl Into<String>, key: impl Into<String>) -> Self {
        self.priv_proto = non_empty(proto.into());
        self.priv_key = non_empty(key.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        require("user", &self.user)?;
        require("user name", &self.name)?;
        if self.priv_key.is_some() && self.auth_key.is_none() {
            return Err(ClientError::invalid_argument(
                "privacy key requires an authentication key",
            ));
        }
        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
