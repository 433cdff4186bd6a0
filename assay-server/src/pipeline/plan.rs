//! Progress checkpoints

use super::runner::PipelineError;

/// Percent reported at each stage boundary, indexed by completion order
///
/// Checkpoints are fixed per pipeline position rather than derived from
/// how long stages take. They strictly increase and the last one is 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressPlan {
    checkpoints: Vec<u8>,
}

impl ProgressPlan {
    /// Creates a plan from explicit checkpoints
    pub fn new(checkpoints: Vec<u8>) -> Result<Self, PipelineError> {
        if checkpoints.is_empty() {
            return Err(PipelineError::InvalidPlan(
                "progress plan cannot be empty".to_string(),
            ));
        }

        if checkpoints[0] == 0 {
            return Err(PipelineError::InvalidPlan(
                "first checkpoint must be above 0%".to_string(),
            ));
        }

        if let Some(pair) = checkpoints.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(PipelineError::InvalidPlan(format!(
                "checkpoints must strictly increase ({}% then {}%)",
                pair[0], pair[1]
            )));
        }

        if checkpoints.last() != Some(&100) {
            return Err(PipelineError::InvalidPlan(
                "last checkpoint must be 100%".to_string(),
            ));
        }

        Ok(Self { checkpoints })
    }

    /// Spreads checkpoints evenly over `stage_count` stages
    pub fn even(stage_count: usize) -> Result<Self, PipelineError> {
        let checkpoints = (1..=stage_count)
            .map(|i| {
                let rounded = (i * 200 + stage_count) / (2 * stage_count);
                u8::try_from(rounded).unwrap_or(100)
            })
            .collect();
        Self::new(checkpoints)
    }

    /// Percent reached once the stage at `index` has completed
    pub fn checkpoint(&self, index: usize) -> u8 {
        self.checkpoints.get(index).copied().unwrap_or(100)
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}
