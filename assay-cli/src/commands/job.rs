//! Job inspection commands

use anyhow::Result;
use assay_client::AssayClient;
use colored::*;

use super::job_error;
use crate::config::Config;
use crate::display::{print_job_details, print_job_summary};
use crate::id_resolver::resolve_job_id;

/// Show one job
pub async fn status(config: &Config, id: &str) -> Result<()> {
    let client = AssayClient::new(&config.server_url);
    let job_id = resolve_job_id(&client, id).await?;

    let job = client
        .get_job(job_id)
        .await
        .map_err(|e| job_error(e, job_id))?;
    print_job_details(&job);

    Ok(())
}

/// List all live jobs
pub async fn list_jobs(config: &Config) -> Result<()> {
    let client = AssayClient::new(&config.server_url);
    let jobs = client.list_jobs().await?;

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs {
            print_job_summary(&job);
        }
    }

    Ok(())
}
