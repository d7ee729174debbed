//! Source record types for the four replayed event streams.
//!
//! Records arrive already fetched from whatever REST or contract boundary the
//! host application talks to. Every field that real data may omit is optional
//! or defaulted, so a malformed record still deserializes into a degraded
//! record instead of failing the whole batch.

use crate::enums::{StepType, X402Status};
use crate::error::LoadError;
use crate::identity::first_timestamp;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Structured detail/payload map carried by compliance and X402 records.
pub type JsonMap = Map<String, Value>;

// ============================================================================
// LENIENT FIELD DECODING
// ============================================================================

/// Accept identities and timestamps encoded as strings or numbers.
///
/// Anything else (objects, arrays, booleans, null) degrades to `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Decode a field through `Value`, degrading null or a wrong type to the default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode a record array one element at a time.
///
/// An element that is not a usable record becomes a default (degraded) record
/// and keeps its slot. A non-array degrades to an empty batch.
fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

// ============================================================================
// MEMORY
// ============================================================================

/// A note an agent persisted during the run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryEntry {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient",
        alias = "agentRole",
        skip_serializing_if = "Option::is_none"
    )]
    pub agent_role: Option<String>,
}

// ============================================================================
// COMPLIANCE
// ============================================================================

/// Result of one risk check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplianceEvent {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    /// Conventionally 0..=100 but never bounded.
    #[serde(
        default,
        deserialize_with = "lenient",
        alias = "riskScore",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonMap>,
    #[serde(
        default,
        deserialize_with = "lenient",
        alias = "reasonCodes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub reason_codes: Vec<String>,
}

impl ComplianceEvent {
    /// A check counts as failed only when it explicitly reports `passed: false`.
    pub fn is_failure(&self) -> bool {
        self.passed == Some(false)
    }
}

// ============================================================================
// X402 REQUESTS
// ============================================================================

/// A cryptographically signed transaction request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct X402Request {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: X402Status,
    #[serde(
        default,
        deserialize_with = "lenient",
        alias = "memory_ids",
        alias = "linkedMemoryIds",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub linked_memory_ids: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        alias = "compliance_ids",
        alias = "linkedComplianceIds",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub linked_compliance_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub signature: String,
    #[serde(default, deserialize_with = "lenient")]
    pub payload: JsonMap,
}

impl X402Request {
    /// Effective event time: `timestamp` first, then `created_at`.
    pub fn event_time(&self) -> Option<&str> {
        first_timestamp(&[self.timestamp.as_deref(), self.created_at.as_deref()])
    }
}

// ============================================================================
// TOOL CALLS
// ============================================================================

/// Nested payload describing a single tool invocation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolCallPayload {
    #[serde(
        default,
        deserialize_with = "lenient",
        alias = "agentId",
        alias = "agent",
        skip_serializing_if = "Option::is_none"
    )]
    pub agent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", alias = "toolName", alias = "tool")]
    pub tool_name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub parameters: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub result: Value,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        alias = "durationMs",
        alias = "duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_ms: Option<u64>,
}

/// A tool-call event emitted by an agent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolCallEvent {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub payload: ToolCallPayload,
}

impl ToolCallEvent {
    /// Effective event time: `timestamp` first, then `created_at`.
    pub fn event_time(&self) -> Option<&str> {
        first_timestamp(&[self.timestamp.as_deref(), self.created_at.as_deref()])
    }

    /// A call counts as failed only when it explicitly reports `success: false`.
    pub fn is_failure(&self) -> bool {
        self.payload.success == Some(false)
    }
}

// ============================================================================
// SOURCE EVENT UNION
// ============================================================================

/// One record from any of the four streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "record", rename_all = "snake_case")]
pub enum SourceEvent {
    Memory(MemoryEntry),
    Compliance(ComplianceEvent),
    X402(X402Request),
    ToolCall(ToolCallEvent),
}

impl SourceEvent {
    pub fn step_type(&self) -> StepType {
        match self {
            SourceEvent::Memory(_) => StepType::Memory,
            SourceEvent::Compliance(_) => StepType::Compliance,
            SourceEvent::X402(_) => StepType::X402,
            SourceEvent::ToolCall(_) => StepType::ToolCall,
        }
    }

    /// The record's own identity, if it carries a non-blank one.
    pub fn native_id(&self) -> Option<&str> {
        let id = match self {
            SourceEvent::Memory(m) => m.id.as_deref(),
            SourceEvent::Compliance(c) => c.id.as_deref(),
            SourceEvent::X402(x) => x.id.as_deref(),
            SourceEvent::ToolCall(t) => t.id.as_deref(),
        };
        id.filter(|id| !id.trim().is_empty())
    }

    /// The raw timestamp string the timeline orders by.
    pub fn event_time(&self) -> Option<&str> {
        match self {
            SourceEvent::Memory(m) => first_timestamp(&[m.created_at.as_deref()]),
            SourceEvent::Compliance(c) => first_timestamp(&[c.created_at.as_deref()]),
            SourceEvent::X402(x) => x.event_time(),
            SourceEvent::ToolCall(t) => t.event_time(),
        }
    }

    pub fn is_failure(&self) -> bool {
        match self {
            SourceEvent::Compliance(c) => c.is_failure(),
            SourceEvent::ToolCall(t) => t.is_failure(),
            SourceEvent::Memory(_) | SourceEvent::X402(_) => false,
        }
    }

    /// The untouched record as plain JSON, without the union tag.
    pub fn raw_json(&self) -> Value {
        let value = match self {
            SourceEvent::Memory(m) => serde_json::to_value(m),
            SourceEvent::Compliance(c) => serde_json::to_value(c),
            SourceEvent::X402(x) => serde_json::to_value(x),
            SourceEvent::ToolCall(t) => serde_json::to_value(t),
        };
        value.unwrap_or(Value::Null)
    }
}

// ============================================================================
// RUN DATA
// ============================================================================

/// The four record arrays of one run, as fetched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunData {
    #[serde(default, deserialize_with = "lenient_records")]
    pub memory: Vec<MemoryEntry>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub compliance: Vec<ComplianceEvent>,
    #[serde(
        default,
        deserialize_with = "lenient_records",
        alias = "x402_requests",
        alias = "x402Requests"
    )]
    pub x402: Vec<X402Request>,
    #[serde(default, deserialize_with = "lenient_records", alias = "toolCalls")]
    pub tool_calls: Vec<ToolCallEvent>,
}

impl RunData {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, LoadError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_slice(&bytes)
    }

    pub fn len(&self) -> usize {
        self.memory.len() + self.compliance.len() + self.x402.len() + self.tool_calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_sources(self) -> RunSources {
        RunSources::new(self.memory, self.compliance, self.x402, self.tool_calls)
    }
}

/// Shared, immutable handles to the four source arrays.
///
/// Array identity is pointer identity: replacing any one array with a new
/// allocation is what tells a controller to rebuild its timeline.
#[derive(Debug, Clone)]
pub struct RunSources {
    pub memory: Arc<[MemoryEntry]>,
    pub compliance: Arc<[ComplianceEvent]>,
    pub x402: Arc<[X402Request]>,
    pub tool_calls: Arc<[ToolCallEvent]>,
}

impl RunSources {
    pub fn new(
        memory: impl Into<Arc<[MemoryEntry]>>,
        compliance: impl Into<Arc<[ComplianceEvent]>>,
        x402: impl Into<Arc<[X402Request]>>,
        tool_calls: impl Into<Arc<[ToolCallEvent]>>,
    ) -> Self {
        Self {
            memory: memory.into(),
            compliance: compliance.into(),
            x402: x402.into(),
            tool_calls: tool_calls.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(
            Vec::<MemoryEntry>::new(),
            Vec::<ComplianceEvent>::new(),
            Vec::<X402Request>::new(),
            Vec::<ToolCallEvent>::new(),
        )
    }

    /// True when every array is the very same allocation as in `other`.
    pub fn same_identity(&self, other: &RunSources) -> bool {
        Arc::ptr_eq(&self.memory, &other.memory)
            && Arc::ptr_eq(&self.compliance, &other.compliance)
            && Arc::ptr_eq(&self.x402, &other.x402)
            && Arc::ptr_eq(&self.tool_calls, &other.tool_calls)
    }

    pub fn with_memory(mut self, memory: impl Into<Arc<[MemoryEntry]>>) -> Self {
        self.memory = memory.into();
        self
    }

    pub fn with_compliance(mut self, compliance: impl Into<Arc<[ComplianceEvent]>>) -> Self {
        self.compliance = compliance.into();
        self
    }

    pub fn with_x402(mut self, x402: impl Into<Arc<[X402Request]>>) -> Self {
        self.x402 = x402.into();
        self
    }

    pub fn with_tool_calls(mut self, tool_calls: impl Into<Arc<[ToolCallEvent]>>) -> Self {
        self.tool_calls = tool_calls.into();
        self
    }

    pub fn len(&self) -> usize {
        self.memory.len() + self.compliance.len() + self.x402.len() + self.tool_calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RunSources {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<RunData> for RunSources {
    fn from(data: RunData) -> Self {
        data.into_sources()
    }
}
