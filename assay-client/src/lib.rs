//! Assay HTTP Client
//!
//! Type-safe client for the Assay evaluation server: submit documents,
//! inspect jobs and follow their progress stream.
//!
//! # Example
//!
//! ```no_run
//! use assay_client::AssayClient;
//! use assay_core::domain::evaluation::Locale;
//! use assay_core::dto::evaluate::SubmitEvaluation;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AssayClient::new("http://localhost:8080");
//!     let accepted = client
//!         .submit(&SubmitEvaluation::new("...document text...", Locale::En))
//!         .await?;
//!
//!     let mut progress = client.stream(accepted.job_id).await?;
//!     while let Some(message) = progress.next().await? {
//!         println!("{:?}", message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod evaluations;
mod stream;

pub use error::{ClientError, Result};
pub use stream::ProgressSubscription;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// HTTP client for the Assay server API
#[derive(Debug, Clone)]
pub struct AssayClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl AssayClient {
    /// Create a new client for the server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// Do not set a total request timeout on `client` if it will be used
    /// for progress streams; those stay open until the job finishes.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Turn a non-success response into the matching error
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = error_message(&error_text);

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(message));
        }
        Err(ClientError::api_error(status.as_u16(), message))
    }
}

/// Extracts `error` from a `{"error": ...}` body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
