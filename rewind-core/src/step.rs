//! The normalized replay step and its per-type summaries.

use crate::enums::StepType;
use crate::records::{ComplianceEvent, MemoryEntry, SourceEvent, ToolCallEvent, X402Request};
use serde::{Deserialize, Serialize};

/// Agent role given to every compliance step.
pub const COMPLIANCE_ROLE: &str = "compliance";
/// Agent role given to every X402 step.
pub const TRANSACTION_ROLE: &str = "transaction";

/// One normalized unit of a replay timeline, wrapping exactly one source record.
///
/// Steps are immutable once a timeline is built. `index` is a position, not an
/// identity: it can change across rebuilds while `id` stays put.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    pub id: String,
    /// Raw timestamp string copied from the source record (empty when absent).
    pub timestamp: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_role: Option<String>,
    pub title: String,
    pub description: String,
    pub data: SourceEvent,
    pub index: usize,
}

impl ReplayStep {
    /// Normalize one record. `position` is the record's index inside its own
    /// input array and only feeds the fallback id.
    pub fn from_event(event: SourceEvent, position: usize, summary_chars: usize) -> Self {
        let step_type = event.step_type();
        let id = match event.native_id() {
            Some(id) => id.to_string(),
            None => fallback_id(step_type, position),
        };
        let timestamp = event.event_time().unwrap_or_default().to_string();
        let (title, description) = summarize(&event, summary_chars);

        Self {
            id,
            timestamp,
            step_type,
            agent_role: agent_role(&event),
            title,
            description,
            data: event,
            index: 0,
        }
    }

    /// Error steps are failed compliance checks and failed tool calls.
    pub fn is_error(&self) -> bool {
        self.data.is_failure()
    }

    /// Case-insensitive agent role match.
    pub fn matches_role(&self, role: &str) -> bool {
        self.agent_role
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == role.to_lowercase())
    }
}

/// Synthesized id for records without a native identity.
///
/// Positional, so it is only stable while the input array order is.
pub fn fallback_id(step_type: StepType, position: usize) -> String {
    format!("{}-{}", step_type.as_str(), position)
}

fn agent_role(event: &SourceEvent) -> Option<String> {
    match event {
        SourceEvent::Memory(m) => m.agent_role.clone(),
        SourceEvent::Compliance(_) => Some(COMPLIANCE_ROLE.to_string()),
        SourceEvent::X402(_) => Some(TRANSACTION_ROLE.to_string()),
        SourceEvent::ToolCall(t) => t.payload.agent_id.clone(),
    }
}

// ============================================================================
// SUMMARIES
// ============================================================================

fn summarize(event: &SourceEvent, summary_chars: usize) -> (String, String) {
    match event {
        SourceEvent::Memory(m) => summarize_memory(m, summary_chars),
        SourceEvent::Compliance(c) => summarize_compliance(c),
        SourceEvent::X402(x) => summarize_x402(x),
        SourceEvent::ToolCall(t) => summarize_tool_call(t),
    }
}

fn summarize_memory(entry: &MemoryEntry, summary_chars: usize) -> (String, String) {
    let title = match entry.namespace.as_deref().filter(|ns| !ns.is_empty()) {
        Some(namespace) => format!("Memory: {}", namespace),
        None => "Memory".to_string(),
    };
    (title, truncate_chars(&entry.content, summary_chars))
}

fn summarize_compliance(event: &ComplianceEvent) -> (String, String) {
    let title = match event.passed {
        Some(true) => "Compliance check passed",
        Some(false) => "Compliance check failed",
        None => "Compliance check recorded",
    };
    let score = match event.risk_score {
        Some(score) => format!("Risk score {}", score),
        None => "Risk score n/a".to_string(),
    };
    let description = if event.reason_codes.is_empty() {
        score
    } else {
        format!("{}: {}", score, event.reason_codes.join(", "))
    };
    (title.to_string(), description)
}

fn summarize_x402(request: &X402Request) -> (String, String) {
    (
        format!("X402 request {}", request.status),
        format!(
            "{} memory / {} compliance links",
            request.linked_memory_ids.len(),
            request.linked_compliance_ids.len()
        ),
    )
}

fn summarize_tool_call(event: &ToolCallEvent) -> (String, String) {
    let payload = &event.payload;
    let tool = if payload.tool_name.is_empty() {
        "unknown"
    } else {
        payload.tool_name.as_str()
    };
    let description = match (&payload.error, payload.duration_ms, payload.success) {
        (Some(error), _, _) if !error.is_empty() => error.clone(),
        (_, Some(ms), _) => format!("Completed in {} ms", ms),
        (_, None, Some(true)) => "Completed".to_string(),
        (_, None, Some(false)) => "Failed".to_string(),
        _ => "Invoked".to_string(),
    };
    (format!("Tool call: {}", tool), description)
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}
