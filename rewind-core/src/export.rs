//! Portable JSON export of a replay session.

use crate::enums::StepType;
use crate::identity::Timestamp;
use crate::step::ReplayStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One exported step. `step_number` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExportedStep {
    pub step_number: usize,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub agent_role: Option<String>,
    pub title: String,
    pub description: String,
    /// The raw source record.
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub data: Value,
}

impl From<&ReplayStep> for ExportedStep {
    fn from(step: &ReplayStep) -> Self {
        Self {
            step_number: step.index + 1,
            timestamp: step.timestamp.clone(),
            step_type: step.step_type,
            agent_role: step.agent_role.clone(),
            title: step.title.clone(),
            description: step.description.clone(),
            data: step.data.raw_json(),
        }
    }
}

/// Full replay history plus cursor position of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReplayExport {
    pub run_id: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub exported_at: Timestamp,
    /// 1-based number of the current step; 0 when the timeline is empty.
    pub current_step: usize,
    pub total_steps: usize,
    pub steps: Vec<ExportedStep>,
}

impl ReplayExport {
    pub fn new(
        run_id: impl Into<String>,
        exported_at: Timestamp,
        steps: &[ReplayStep],
        current_step_index: usize,
    ) -> Self {
        let current_step = if steps.is_empty() {
            0
        } else {
            current_step_index.min(steps.len() - 1) + 1
        };
        Self {
            run_id: run_id.into(),
            exported_at,
            current_step,
            total_steps: steps.len(),
            steps: steps.iter().map(ExportedStep::from).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
