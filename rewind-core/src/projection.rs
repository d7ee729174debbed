//! "State of the world as of step N" projections over a built timeline.

use crate::enums::StepType;
use crate::records::{ComplianceEvent, MemoryEntry, RunData, SourceEvent, ToolCallEvent, X402Request};
use crate::step::ReplayStep;
use serde::{Deserialize, Serialize};

/// Original records of every step with `index <= cursor`, partitioned by type.
///
/// Records appear in timeline order within each list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepData<'a> {
    pub memory: Vec<&'a MemoryEntry>,
    pub compliance: Vec<&'a ComplianceEvent>,
    pub x402: Vec<&'a X402Request>,
    pub tool_calls: Vec<&'a ToolCallEvent>,
}

impl<'a> StepData<'a> {
    /// Project `steps[..=cursor]`. A cursor past the end covers every step.
    pub fn up_to(steps: &'a [ReplayStep], cursor: usize) -> Self {
        let end = cursor.saturating_add(1).min(steps.len());
        let mut data = StepData::default();
        for step in &steps[..end] {
            match &step.data {
                SourceEvent::Memory(m) => data.memory.push(m),
                SourceEvent::Compliance(c) => data.compliance.push(c),
                SourceEvent::X402(x) => data.x402.push(x),
                SourceEvent::ToolCall(t) => data.tool_calls.push(t),
            }
        }
        data
    }

    pub fn counts(&self) -> StepCounts {
        StepCounts {
            memory: self.memory.len(),
            compliance: self.compliance.len(),
            x402: self.x402.len(),
            tool_calls: self.tool_calls.len(),
            errors: self.compliance.iter().filter(|c| c.is_failure()).count()
                + self.tool_calls.iter().filter(|t| t.is_failure()).count(),
        }
    }

    pub fn len(&self) -> usize {
        self.memory.len() + self.compliance.len() + self.x402.len() + self.tool_calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone the referenced records out into an owned bundle.
    pub fn to_owned_data(&self) -> RunData {
        RunData {
            memory: self.memory.iter().map(|m| (*m).clone()).collect(),
            compliance: self.compliance.iter().map(|c| (*c).clone()).collect(),
            x402: self.x402.iter().map(|x| (*x).clone()).collect(),
            tool_calls: self.tool_calls.iter().map(|t| (*t).clone()).collect(),
        }
    }
}

/// Per-type counts of the steps replayed so far, for KPI panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCounts {
    pub memory: usize,
    pub compliance: usize,
    pub x402: usize,
    pub tool_calls: usize,
    /// Failed compliance checks plus failed tool calls.
    pub errors: usize,
}

impl StepCounts {
    pub fn total(&self) -> usize {
        self.memory + self.compliance + self.x402 + self.tool_calls
    }

    pub fn for_type(&self, step_type: StepType) -> usize {
        match step_type {
            StepType::Memory => self.memory,
            StepType::Compliance => self.compliance,
            StepType::X402 => self.x402,
            StepType::ToolCall => self.tool_calls,
        }
    }
}
