//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod evaluate;
mod job;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use assay_client::ClientError;
use clap::Subcommand;
use uuid::Uuid;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a document and follow its evaluation
    Evaluate {
        /// Text file holding the extracted document
        file: PathBuf,

        /// Language of the findings (en or ar)
        #[arg(short, long, default_value = "en")]
        locale: String,

        /// Print the job ID and return without following progress
        #[arg(long)]
        no_follow: bool,

        /// Print the final evaluation as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow the progress of a running job
    Watch {
        /// Job ID or unambiguous prefix
        id: String,

        /// Print the final evaluation as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current state of a job
    Status {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// List all live jobs
    Jobs,
}

/// Handle a CLI command
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Evaluate {
            file,
            locale,
            no_follow,
            json,
        } => evaluate::evaluate(config, &file, &locale, no_follow, json).await,
        Commands::Watch { id, json } => evaluate::watch(config, &id, json).await,
        Commands::Status { id } => job::status(config, &id).await,
        Commands::Jobs => job::list_jobs(config).await,
    }
}

/// Explains a missing job instead of echoing the raw 404
///
/// Jobs are evicted after a period of inactivity, so a job that existed a
/// few minutes ago may be gone.
pub(crate) fn job_error(err: ClientError, job_id: Uuid) -> anyhow::Error {
    if err.is_not_found() {
        anyhow!("Job {} not found (it may have expired)", job_id)
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_explains_missing_job() {
        let id = Uuid::new_v4();

        let missing = job_error(ClientError::NotFound(format!("Job {} not found", id)), id);
        assert_eq!(
            missing.to_string(),
            format!("Job {} not found (it may have expired)", id)
        );

        let other = job_error(ClientError::api_error(500, "boom"), id);
        assert_eq!(other.to_string(), "API error (status 500): boom");
    }
}
