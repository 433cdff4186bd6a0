//! Analysis stage identifiers
//!
//! The evaluation pipeline is a fixed sequence of six analysis stages.
//! Their identifiers appear in job progress and in the evaluation result.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the six analysis stages, in pipeline declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    DocumentStructureExtraction,
    ChangeClassification,
    RequirementComplianceCheck,
    DocumentationCompletenessCheck,
    RiskAssessment,
    ReportSynthesis,
}

impl StageId {
    /// All stages in declaration order
    pub const ALL: [StageId; 6] = [
        StageId::DocumentStructureExtraction,
        StageId::ChangeClassification,
        StageId::RequirementComplianceCheck,
        StageId::DocumentationCompletenessCheck,
        StageId::RiskAssessment,
        StageId::ReportSynthesis,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageId::DocumentStructureExtraction => "document-structure-extraction",
            StageId::ChangeClassification => "change-classification",
            StageId::RequirementComplianceCheck => "requirement-compliance-check",
            StageId::DocumentationCompletenessCheck => "documentation-completeness-check",
            StageId::RiskAssessment => "risk-assessment",
            StageId::ReportSynthesis => "report-synthesis",
        }
    }

    /// Top-level fields a stage output must carry to be accepted
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            StageId::DocumentStructureExtraction => {
                &["productName", "submissionDate", "detectedSections"]
            }
            StageId::ChangeClassification => &["variationType", "confidence", "reasoning"],
            StageId::RequirementComplianceCheck => {
                &["sections", "overallCompliance", "compliancePercentage"]
            }
            StageId::DocumentationCompletenessCheck => {
                &["missingDocuments", "documentationCompleteness"]
            }
            StageId::RiskAssessment => &["overallRisk", "risks", "approvalProbability"],
            StageId::ReportSynthesis => &["recommendations", "summary"],
        }
    }

    /// Human-readable label used when displaying progress
    pub fn label(self) -> &'static str {
        match self {
            StageId::DocumentStructureExtraction => "Parsing document structure",
            StageId::ChangeClassification => "Classifying variation",
            StageId::RequirementComplianceCheck => "Checking regulatory requirements",
            StageId::DocumentationCompletenessCheck => "Validating documentation",
            StageId::RiskAssessment => "Assessing risks",
            StageId::ReportSynthesis => "Synthesizing report",
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageId::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("Unknown stage: {}", s))
    }
}
