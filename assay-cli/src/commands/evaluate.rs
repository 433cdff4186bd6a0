//! Submission and progress following

use std::path::Path;

use anyhow::{Context, Result, bail};
use assay_client::AssayClient;
use assay_core::domain::evaluation::{Evaluation, Locale};
use assay_core::dto::evaluate::SubmitEvaluation;
use assay_core::dto::stream::StreamMessage;
use colored::*;
use uuid::Uuid;

use super::job_error;
use crate::config::Config;
use crate::display::{print_evaluation, progress_line};
use crate::id_resolver::resolve_job_id;

/// Submit a document, then follow it unless told not to
pub async fn evaluate(
    config: &Config,
    file: &Path,
    locale: &str,
    no_follow: bool,
    json: bool,
) -> Result<()> {
    let locale: Locale = locale.parse().map_err(anyhow::Error::msg)?;
    let document = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let client = AssayClient::new(&config.server_url);
    let accepted = client
        .submit(&SubmitEvaluation::new(document, locale))
        .await?;

    if no_follow {
        println!("{}", accepted.job_id);
        return Ok(());
    }

    println!(
        "{} {}",
        "✓ Submitted job".green(),
        accepted.job_id.to_string().cyan()
    );
    follow(&client, accepted.job_id, json).await
}

/// Follow an existing job
pub async fn watch(config: &Config, id: &str, json: bool) -> Result<()> {
    let client = AssayClient::new(&config.server_url);
    let job_id = resolve_job_id(&client, id).await?;

    follow(&client, job_id, json).await
}

async fn follow(client: &AssayClient, job_id: Uuid, json: bool) -> Result<()> {
    let mut subscription = client
        .stream(job_id)
        .await
        .map_err(|e| job_error(e, job_id))?;

    while let Some(message) = subscription.next().await? {
        match message {
            StreamMessage::Progress(progress) => println!("{}", progress_line(&progress)),
            StreamMessage::Done(done) => return report(&done.evaluation, json),
            StreamMessage::Error(error) if error.expired => {
                println!("{}", format!("⚠ {}", error.message).yellow());
                bail!("job {} expired before finishing", job_id);
            }
            StreamMessage::Error(error) => {
                println!("{}", format!("✗ {}", error.message).red());
                bail!("evaluation of job {} failed", job_id);
            }
        }
    }

    Ok(())
}

fn report(evaluation: &Evaluation, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(evaluation)?);
    } else {
        println!("{}", "✓ Evaluation complete".green().bold());
        println!();
        print_evaluation(evaluation);
    }
    Ok(())
}
