//! ID resolver module
//!
//! Lets users type a short, unambiguous prefix instead of a full job UUID.

use anyhow::{Context, Result, anyhow};
use assay_client::AssayClient;
use uuid::Uuid;

/// Resolve a job ID or prefix to a full UUID
///
/// A full UUID is returned as-is; anything else is matched against the
/// server's live jobs.
pub async fn resolve_job_id(client: &AssayClient, input: &str) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(input) {
        return Ok(uuid);
    }

    let jobs = client
        .list_jobs()
        .await
        .context("Failed to fetch jobs for ID resolution")?;

    match_prefix(jobs.iter().map(|job| job.id), input)
}

fn match_prefix(ids: impl IntoIterator<Item = Uuid>, input: &str) -> Result<Uuid> {
    let prefix = input.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(anyhow!("Job ID cannot be empty"));
    }

    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No job found with ID starting with '{}'", prefix)),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple jobs: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<Uuid> {
        [
            "3f2a9c1e-0000-4000-8000-000000000001",
            "3f2b0000-0000-4000-8000-000000000002",
            "a1b2c3d4-0000-4000-8000-000000000003",
        ]
        .iter()
        .map(|s| Uuid::parse_str(s).unwrap())
        .collect()
    }

    #[test]
    fn test_unique_prefix_resolves() {
        assert_eq!(match_prefix(ids(), "A1B2").unwrap(), ids()[2]);
        assert_eq!(match_prefix(ids(), "3f2a").unwrap(), ids()[0]);
    }

    #[test]
    fn test_ambiguous_and_unknown_prefixes() {
        let err = match_prefix(ids(), "3f2").unwrap_err();
        assert!(err.to_string().contains("Ambiguous"));

        let err = match_prefix(ids(), "ffff").unwrap_err();
        assert!(err.to_string().contains("No job found"));

        assert!(match_prefix(ids(), "  ").is_err());
    }
}
