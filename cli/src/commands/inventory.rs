//! Agents, engines, endpoints and users.

use crate::commands::{format_output, or_dash, print_success};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Subcommand;
use snmpsim_client::model::entities::Id;
use snmpsim_client::{
    Agent, Endpoint, Engine, ManagementClient, NewAgent, NewEndpoint, NewEngine, NewUser,
    Protocol, User,
};

#[derive(Subcommand, Debug)]
pub enum AgentCommand {
    /// List agents
    List,
    /// Create an agent serving recordings from DATA_DIR
    Create { name: String, data_dir: String },
    /// Delete an agent
    Delete { id: Id },
    /// Attach an engine to an agent
    LinkEngine {
        agent: Id,
        engine: Id,
        /// Detach instead
        #[arg(long)]
        remove: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum EngineCommand {
    /// List engines
    List,
    /// Create an engine with a hex SNMP engine ID
    Create { name: String, engine_id: String },
    /// Delete an engine
    Delete { id: Id },
    /// Bind an endpoint to an engine
    LinkEndpoint {
        engine: Id,
        endpoint: Id,
        /// Unbind instead
        #[arg(long)]
        remove: bool,
    },
    /// Bind a user to an engine
    LinkUser {
        engine: Id,
        user: Id,
        /// Unbind instead
        #[arg(long)]
        remove: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum EndpointCommand {
    /// List endpoints
    List,
    /// Create a transport endpoint listening on ADDRESS (host:port)
    Create {
        name: String,
        address: String,
        #[arg(long, default_value = "udpv4")]
        protocol: Protocol,
    },
    /// Delete an endpoint
    Delete { id: Id },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List users
    List,
    /// Create an SNMP user
    Create {
        user: String,
        name: String,
        #[arg(long)]
        auth_proto: Option<String>,
        #[arg(long)]
        auth_key: Option<String>,
        #[arg(long)]
        priv_proto: Option<String>,
        #[arg(long)]
        priv_key: Option<String>,
    },
    /// Delete a user
    Delete { id: Id },
}

/// Empty protocol or key arguments are left unset.
pub fn new_user(
    user: String,
    name: String,
    auth_proto: Option<String>,
    auth_key: Option<String>,
    priv_proto: Option<String>,
    priv_key: Option<String>,
) -> NewUser {
    NewUser::new(user, name)
        .with_auth(auth_proto.unwrap_or_default(), auth_key.unwrap_or_default())
        .with_privacy(priv_proto.unwrap_or_default(), priv_key.unwrap_or_default())
}

fn names<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

pub fn agent_row(agent: &Agent) -> Vec<String> {
    vec![
        agent.id.to_string(),
        agent.name.clone(),
        agent.data_dir.clone(),
        names(agent.engines.iter().map(|e| e.name.as_str())),
    ]
}

pub fn engine_row(engine: &Engine) -> Vec<String> {
    vec![
        engine.id.to_string(),
        engine.name.clone(),
        engine.engine_id.clone(),
        names(engine.endpoints.iter().map(|e| e.address.as_str())),
        names(engine.users.iter().map(|u| u.user.as_str())),
    ]
}

pub fn endpoint_row(endpoint: &Endpoint) -> Vec<String> {
    vec![
        endpoint.id.to_string(),
        endpoint.name.clone(),
        endpoint.protocol.to_string(),
        endpoint.address.clone(),
    ]
}

pub fn user_row(user: &User) -> Vec<String> {
    vec![
        user.id.to_string(),
        user.user.clone(),
        user.name.clone(),
        or_dash(user.auth_proto.as_deref()),
        or_dash(user.priv_proto.as_deref()),
    ]
}

fn management(config: &Config) -> Result<ManagementClient> {
    config.management_client()
}

pub async fn agents(command: AgentCommand, config: &Config) -> Result<()> {
    let client = management(config)?;
    match command {
        AgentCommand::List => {
            let agents = client.agents().await.context("Failed to list agents")?;
            let rows = agents.iter().map(agent_row).collect();
            let header = ["ID", "Name", "Data dir", "Engines"];
            format_output(&agents, &config.output_format, "Agents", &header, rows)?;
        }
        AgentCommand::Create { name, data_dir } => {
            let agent = client
                .create_agent(&NewAgent::new(name, data_dir))
                .await
                .context("Failed to create agent")?;
            print_success(&format!("Created agent {} with ID {}", agent.name, agent.id));
        }
        AgentCommand::Delete { id } => {
            client
                .delete_agent(id)
                .await
                .with_context(|| format!("Failed to delete agent {id}"))?;
            print_success(&format!("Deleted agent {id}"));
        }
        AgentCommand::LinkEngine { agent, engine, remove } => {
            if remove {
                client
                    .remove_engine_from_agent(agent, engine)
                    .await
                    .context("Failed to detach engine")?;
                print_success(&format!("Detached engine {engine} from agent {agent}"));
            } else {
                client
                    .add_engine_to_agent(agent, engine)
                    .await
                    .context("Failed to attach engine")?;
                print_success(&format!("Attached engine {engine} to agent {agent}"));
            }
        }
    }
    Ok(())
}

pub async fn engines(command: EngineCommand, config: &Config) -> Result<()> {
    let client = management(config)?;
    match command {
        EngineCommand::List => {
            let engines = client.engines().await.context("Failed to list engines")?;
            let rows = engines.iter().map(engine_row).collect();
            let header = ["ID", "Name", "Engine ID", "Endpoints", "Users"];
            format_output(&engines, &config.output_format, "Engines", &header, rows)?;
        }
        EngineCommand::Create { name, engine_id } => {
            let engine = client
                .create_engine(&NewEngine::new(name, engine_id))
                .await
                .context("Failed to create engine")?;
            print_success(&format!("Created engine {} with ID {}", engine.name, engine.id));
        }
        EngineCommand::Delete { id } => {
            client
                .delete_engine(id)
                .await
                .with_context(|| format!("Failed to delete engine {id}"))?;
            print_success(&format!("Deleted engine {id}"));
        }
        EngineCommand::LinkEndpoint { engine, endpoint, remove } => {
            if remove {
                client
                    .remove_endpoint_from_engine(engine, endpoint)
                    .await
                    .context("Failed to unbind endpoint")?;
                print_success(&format!("Unbound endpoint {endpoint} from engine {engine}"));
            } else {
                client
                    .add_endpoint_to_engine(engine, endpoint)
                    .await
                    .context("Failed to bind endpoint")?;
                print_success(&format!("Bound endpoint {endpoint} to engine {engine}"));
            }
        }
        EngineCommand::LinkUser { engine, user, remove } => {
            if remove {
                client
                    .remove_user_from_engine(engine, user)
                    .await
                    .context("Failed to unbind user")?;
                print_success(&format!("Unbound user {user} from engine {engine}"));
            } else {
                client
                    .add_user_to_engine(engine, user)
                    .await
                    .context("Failed to bind user")?;
                print_success(&format!("Bound user {user} to engine {engine}"));
            }
        }
    }
    Ok(())
}

pub async fn endpoints(command: EndpointCommand, config: &Config) -> Result<()> {
    let client = management(config)?;
    match command {
        EndpointCommand::List => {
            let endpoints = client.endpoints().await.context("Failed to list endpoints")?;
            let rows = endpoints.iter().map(endpoint_row).collect();
            let header = ["ID", "Name", "Protocol", "Address"];
            format_output(&endpoints, &config.output_format, "Endpoints", &header, rows)?;
        }
        EndpointCommand::Create { name, address, protocol } => {
            let endpoint = client
                .create_endpoint(&NewEndpoint::new(name, address, protocol))
                .await
                .context("Failed to create endpoint")?;
            print_success(&format!(
                "Created endpoint {} ({} {}) with ID {}",
                endpoint.name, endpoint.protocol, endpoint.address, endpoint.id
            ));
        }
        EndpointCommand::Delete { id } => {
            client
                .delete_endpoint(id)
                .await
                .with_context(|| format!("Failed to delete endpoint {id}"))?;
            print_success(&format!("Deleted endpoint {id}"));
        }
    }
    Ok(())
}

pub async fn users(command: UserCommand, config: &Config) -> Result<()> {
    let client = management(config)?;
    match command {
        UserCommand::List => {
            let users = client.users().await.context("Failed to list users")?;
            let rows = users.iter().map(user_row).collect();
            let header = ["ID", "User", "Name", "Auth", "Privacy"];
            format_output(&users, &config.output_format, "Users", &header, rows)?;
        }
        UserCommand::Create {
            user,
            name,
            auth_proto,
            auth_key,
            priv_proto,
            priv_key,
        } => {
            let new_user = new_user(user, name, auth_proto, auth_key, priv_proto, priv_key);
            let user = client
                .create_user(&new_user)
                .await
                .context("Failed to create user")?;
            print_success(&format!("Created user {} with ID {}", user.user, user.id));
        }
        UserCommand::Delete { id } => {
            client
                .delete_user(id)
                .await
                .with_context(|| format!("Failed to delete user {id}"))?;
            print_success(&format!("Deleted user {id}"));
        }
    }
    Ok(())
}
