//! Server configuration
//!
//! Defines all configurable parameters of the evaluation service including
//! job expiry, stream polling, pipeline limits and collaborator locations.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration
///
/// All timeouts and intervals are configurable so the service can be tuned
/// for development (fast expiry, local fakes) and production.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Idle time after which a job record is evicted, whatever its status
    pub job_ttl: Duration,

    /// How often the store sweeps expired jobs
    pub sweep_interval: Duration,

    /// How often a progress stream re-reads its job
    pub poll_interval: Duration,

    /// Wall-clock ceiling for one pipeline run
    pub pipeline_timeout: Duration,

    /// Directory holding the reference guidance text
    pub guidance_dir: PathBuf,

    /// Base URL of the analysis service that executes stages
    pub analysis_url: String,

    /// Guideline version recorded in every evaluation
    pub guideline_version: String,

    /// Largest accepted document, in bytes
    pub max_document_bytes: usize,

    /// Smallest accepted document, in characters of trimmed text
    pub min_document_chars: usize,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Every variable is optional and falls back to its default:
    /// - ASSAY_BIND_ADDR (default: 0.0.0.0:8080)
    /// - ASSAY_JOB_TTL (seconds, default: 600)
    /// - ASSAY_SWEEP_INTERVAL (seconds, default: 60)
    /// - ASSAY_POLL_INTERVAL_MS (milliseconds, default: 100)
    /// - ASSAY_PIPELINE_TIMEOUT (seconds, default: 300)
    /// - ASSAY_GUIDANCE_DIR (default: ./guidance)
    /// - ASSAY_ANALYSIS_URL (default: http://localhost:9090)
    /// - ASSAY_GUIDELINE_VERSION (default: v6.3)
    /// - ASSAY_MAX_DOCUMENT_BYTES (default: 10485760)
    /// - ASSAY_MIN_DOCUMENT_CHARS (default: 100)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            bind_addr: std::env::var("ASSAY_BIND_ADDR").unwrap_or(defaults.bind_addr),
            job_ttl: env_parse::<u64>("ASSAY_JOB_TTL")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.job_ttl),
            sweep_interval: env_parse::<u64>("ASSAY_SWEEP_INTERVAL")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            poll_interval: env_parse::<u64>("ASSAY_POLL_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            pipeline_timeout: env_parse::<u64>("ASSAY_PIPELINE_TIMEOUT")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.pipeline_timeout),
            guidance_dir: std::env::var("ASSAY_GUIDANCE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.guidance_dir),
            analysis_url: std::env::var("ASSAY_ANALYSIS_URL").unwrap_or(defaults.analysis_url),
            guideline_version: std::env::var("ASSAY_GUIDELINE_VERSION")
                .unwrap_or(defaults.guideline_version),
            max_document_bytes: env_parse("ASSAY_MAX_DOCUMENT_BYTES")?
                .unwrap_or(defaults.max_document_bytes),
            min_document_chars: env_parse("ASSAY_MIN_DOCUMENT_CHARS")?
                .unwrap_or(defaults.min_document_chars),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.job_ttl.is_zero() {
            anyhow::bail!("job_ttl must be greater than 0");
        }

        if self.sweep_interval.is_zero() {
            anyhow::bail!("sweep_interval must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.pipeline_timeout.is_zero() {
            anyhow::bail!("pipeline_timeout must be greater than 0");
        }

        if self.pipeline_timeout >= self.job_ttl {
            anyhow::bail!("pipeline_timeout must be shorter than job_ttl");
        }

        if !self.analysis_url.starts_with("http://") && !self.analysis_url.starts_with("https://")
        {
            anyhow::bail!("analysis_url must start with http:// or https://");
        }

        if self.min_document_chars > self.max_document_bytes {
            anyhow::bail!("min_document_chars cannot exceed max_document_bytes");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            job_ttl: Duration::from_secs(10 * 60),
            sweep_interval: Duration::from_secs(60),
            poll_interval: Duration::from_millis(100),
            pipeline_timeout: Duration::from_secs(5 * 60),
            guidance_dir: PathBuf::from("./guidance"),
            analysis_url: "http://localhost:9090".to_string(),
            guideline_version: "v6.3".to_string(),
            max_document_bytes: 10 * 1024 * 1024,
            min_document_chars: 100,
        }
    }
}

/// Reads and parses an optional environment variable
fn env_parse<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid value for {}: {} ({})", name, raw, e)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.job_ttl, Duration::from_secs(600));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.pipeline_timeout, Duration::from_secs(300));
        assert_eq!(config.max_document_bytes, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.poll_interval = Duration::from_millis(50);

        config.analysis_url = "localhost:9090".to_string();
        assert!(config.validate().is_err());
        config.analysis_url = "https://analysis.internal".to_string();

        // A run must be able to finish before its job can expire
        config.pipeline_timeout = config.job_ttl;
        assert!(config.validate().is_err());
        config.pipeline_timeout = Duration::from_secs(30);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_parse_missing_and_invalid() {
        let missing: Option<u64> = env_parse("ASSAY_TEST_SURELY_UNSET_VARIABLE").unwrap();
        assert!(missing.is_none());

        // SAFETY: this variable is only touched by this test
        unsafe { std::env::set_var("ASSAY_TEST_INVALID_NUMBER", "ten") };
        let invalid = env_parse::<u64>("ASSAY_TEST_INVALID_NUMBER");
        assert!(invalid.is_err());
        unsafe { std::env::remove_var("ASSAY_TEST_INVALID_NUMBER") };
    }
}
