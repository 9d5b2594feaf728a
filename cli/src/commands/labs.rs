use crate::commands::{format_output, print_success};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Subcommand;
use snmpsim_client::model::entities::Id;
use snmpsim_client::{Lab, NewLab, Power};

#[derive(Subcommand, Debug)]
pub enum LabCommand {
    /// List labs
    List,
    /// Show one lab with its agents
    Show { id: Id },
    /// Create a lab
    Create { name: String },
    /// Delete a lab
    Delete { id: Id },
    /// Switch a lab on or off
    Power {
        id: Id,
        /// on or off
        state: Power,
    },
    /// Add an agent to a lab
    AddAgent { lab: Id, agent: Id },
    /// Remove an agent from a lab
    RemoveAgent { lab: Id, agent: Id },
}

const HEADER: [&str; 4] = ["ID", "Name", "Power", "Agents"];

pub fn lab_row(lab: &Lab) -> Vec<String> {
    let agents: Vec<&str> = lab.agents.iter().map(|a| a.name.as_str()).collect();
    vec![
        lab.id.to_string(),
        lab.name.clone(),
        lab.power.to_string(),
        agents.join(", "),
    ]
}

pub async fn execute(command: LabCommand, config: &Config) -> Result<()> {
    let client = config.management_client()?;
    match command {
        LabCommand::List => {
            let labs = client.labs().await.context("Failed to list labs")?;
            let rows = labs.iter().map(lab_row).collect();
            format_output(&labs, &config.output_format, "Labs", &HEADER, rows)?;
        }
        LabCommand::Show { id } => {
            let lab = client.lab(id).await.with_context(|| format!("Failed to fetch lab {id}"))?;
            let title = format!("Lab {}", lab.name);
            format_output(&lab, &config.output_format, &title, &HEADER, vec![lab_row(&lab)])?;
        }
        LabCommand::Create { name } => {
            let lab = client
                .create_lab(&NewLab::new(name))
                .await
                .context("Failed to create lab")?;
            print_success(&format!("Created lab {} with ID {}", lab.name, lab.id));
        }
        LabCommand::Delete { id } => {
            client
                .delete_lab(id)
                .await
                .with_context(|| format!("Failed to delete lab {id}"))?;
            print_success(&format!("Deleted lab {id}"));
        }
        LabCommand::Power { id, state } => {
            client
                .set_lab_power(id, state)
                .await
                .with_context(|| format!("Failed to power {state} lab {id}"))?;
            print_success(&format!("Lab {id} powered {state}"));
        }
        LabCommand::AddAgent { lab, agent } => {
            client
                .add_agent_to_lab(lab, agent)
                .await
                .with_context(|| format!("Failed to add agent {agent} to lab {lab}"))?;
            print_success(&format!("Added agent {agent} to lab {lab}"));
        }
        LabCommand::RemoveAgent { lab, agent } => {
            client
                .remove_agent_from_lab(lab, agent)
                .await
                .with_context(|| format!("Failed to remove agent {agent} from lab {lab}"))?;
            print_success(&format!("Removed agent {agent} from lab {lab}"));
        }
    }
    Ok(())
}
