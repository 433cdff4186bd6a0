//! Evaluation result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::stage::StageId;

/// Final output of a successful pipeline run
///
/// Stage outputs are opaque to the service: they are kept in declaration
/// order exactly as the analysis stages produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub outputs: Vec<StageOutput>,
    pub locale: Locale,
    pub evaluated_at: DateTime<Utc>,
    pub guideline_version: String,
}

impl Evaluation {
    /// Looks up the output of a given stage
    pub fn output(&self, stage: StageId) -> Option<&serde_json::Value> {
        self.outputs
            .iter()
            .find(|entry| entry.stage == stage)
            .map(|entry| &entry.output)
    }
}

/// Output of one stage as recorded in an evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage: StageId,
    pub output: serde_json::Value,
}

/// Language the analysis stages should write their findings in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ar" => Ok(Locale::Ar),
            other => Err(format!("Unsupported locale: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_lookup_by_stage() {
        let evaluation = Evaluation {
            outputs: vec![
                StageOutput {
                    stage: StageId::DocumentStructureExtraction,
                    output: json!({"productName": "Paracetamol 500mg"}),
                },
                StageOutput {
                    stage: StageId::RiskAssessment,
                    output: json!({"overallRisk": "Low"}),
                },
            ],
            locale: Locale::En,
            evaluated_at: Utc::now(),
            guideline_version: "v6.3".to_string(),
        };

        assert_eq!(
            evaluation.output(StageId::RiskAssessment),
            Some(&json!({"overallRisk": "Low"}))
        );
        assert!(evaluation.output(StageId::ReportSynthesis).is_none());
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("en".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("AR".parse::<Locale>(), Ok(Locale::Ar));
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(Locale::default(), Locale::En);
    }
}
