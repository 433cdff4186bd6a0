//! Remote analysis stages
//!
//! Each stage is executed by the analysis service at
//! `POST {base_url}/stages/{stage-id}`. The service receives the document,
//! the locale, every earlier output and the reference guidance, and answers
//! with one JSON object per stage.

use anyhow::Context;
use assay_core::domain::stage::StageId;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

use crate::pipeline::{Stage, StageInput};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StageRequest<'a> {
    document: &'a str,
    locale: &'static str,
    prior_outputs: JsonValue,
    guidance: String,
}

/// Stage executed by the remote analysis service
#[derive(Debug, Clone)]
pub struct HttpStage {
    id: StageId,
    client: Client,
    base_url: String,
}

impl HttpStage {
    pub fn new(id: StageId, client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            id,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/stages/{}", self.base_url, self.id)
    }
}

/// One `HttpStage` per stage, in pipeline order
pub fn http_stages(client: Client, base_url: &str) -> Vec<Arc<dyn Stage>> {
    StageId::ALL
        .iter()
        .map(|id| Arc::new(HttpStage::new(*id, client.clone(), base_url)) as Arc<dyn Stage>)
        .collect()
}

/// Checks that a stage answered with an object carrying its required keys
pub fn validate_stage_output(stage: StageId, output: &JsonValue) -> anyhow::Result<()> {
    let object = output
        .as_object()
        .with_context(|| format!("expected a JSON object from {}", stage))?;

    let missing: Vec<&str> = stage
        .required_fields()
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();

    if !missing.is_empty() {
        anyhow::bail!("response is missing field(s): {}", missing.join(", "));
    }

    Ok(())
}

#[async_trait]
impl Stage for HttpStage {
    fn id(&self) -> StageId {
        self.id
    }

    async fn run(&self, input: StageInput<'_>) -> anyhow::Result<JsonValue> {
        let request = StageRequest {
            document: input.document,
            locale: input.locale.as_str(),
            prior_outputs: input.outputs.to_json(),
            guidance: input.context.joined(),
        };

        let url = self.url();
        debug!("Calling analysis service at {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("analysis service unreachable at {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("analysis service returned {}: {}", status, body.trim());
        }

        let output: JsonValue = response
            .json()
            .await
            .context("analysis service returned invalid JSON")?;

        validate_stage_output(self.id, &output)?;
        Ok(output)
    }
}
