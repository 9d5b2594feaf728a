use crate::commands::{format_output, print_success, print_warning};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Subcommand;
use snmpsim_client::Recording;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum RecordingCommand {
    /// List simulation data files
    List,
    /// Upload a local .snmprec file to REMOTE under the data root
    Upload {
        local: PathBuf,
        remote: String,
        /// Delete an existing file at REMOTE first
        #[arg(long)]
        replace: bool,
    },
    /// Delete a simulation data file
    Delete {
        remote: String,
        /// Succeed when the file does not exist
        #[arg(long)]
        if_exists: bool,
    },
}

pub fn recording_row(recording: &Recording) -> Vec<String> {
    vec![
        recording.id.to_string(),
        recording.name.clone(),
        recording.path.clone(),
    ]
}

/// Whether the file was deleted; a 404 is `Ok(false)` when `missing_ok`.
pub fn deleted(result: snmpsim_client::Result<()>, missing_ok: bool) -> snmpsim_client::Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if missing_ok && err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

pub async fn execute(command: RecordingCommand, config: &Config) -> Result<()> {
    let client = config.management_client()?;
    match command {
        RecordingCommand::List => {
            let recordings = client
                .recordings()
                .await
                .context("Failed to list recordings")?;
            let rows = recordings.iter().map(recording_row).collect();
            let header = ["ID", "Name", "Path"];
            format_output(&recordings, &config.output_format, "Recordings", &header, rows)?;
        }
        RecordingCommand::Upload { local, remote, replace } => {
            if replace {
                deleted(client.delete_record_file(&remote).await, true)
                    .with_context(|| format!("Failed to replace {remote}"))?;
            }
            client
                .upload_record_file(&local, &remote)
                .await
                .with_context(|| format!("Failed to upload {}", local.display()))?;
            print_success(&format!("Uploaded {} to {remote}", local.display()));
        }
        RecordingCommand::Delete { remote, if_exists } => {
            let removed = deleted(client.delete_record_file(&remote).await, if_exists)
                .with_context(|| format!("Failed to delete {remote}"))?;
            if removed {
                print_success(&format!("Deleted {remote}"));
            } else {
                print_warning(&format!("{remote} does not exist"));
            }
        }
    }
    Ok(())
}
