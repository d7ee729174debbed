//! Enum types for REWIND records and steps

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CORE ENUMS
// ============================================================================

/// Discriminator for the four event streams merged into a timeline.
///
/// The declaration order is also the concatenation order the timeline builder
/// uses, which decides ties between equal timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Memory,
    Compliance,
    X402,
    ToolCall,
}

impl StepType {
    /// All step types in concatenation order.
    pub fn all() -> &'static [StepType] {
        &[
            StepType::Memory,
            StepType::Compliance,
            StepType::X402,
            StepType::ToolCall,
        ]
    }

    /// Wire name, also used as the prefix of synthesized step ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Memory => "memory",
            StepType::Compliance => "compliance",
            StepType::X402 => "x402",
            StepType::ToolCall => "tool_call",
        }
    }

    /// Human-facing label for list rows and KPI panels.
    pub fn label(&self) -> &'static str {
        match self {
            StepType::Memory => "Memory",
            StepType::Compliance => "Compliance",
            StepType::X402 => "X402",
            StepType::ToolCall => "Tool Call",
        }
    }
}

/// Lifecycle status of a signed X402 request.
///
/// Unrecognised status strings deserialize to `Unknown` so one odd record
/// cannot fail a whole fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum X402Status {
    #[default]
    Pending,
    Approved,
    Rejected,
    Expired,
    Completed,
    #[serde(other)]
    Unknown,
}

impl X402Status {
    /// Whether the request reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            X402Status::Rejected | X402Status::Expired | X402Status::Completed
        )
    }
}

// ============================================================================
// DISPLAY / FROMSTR
// ============================================================================

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "memory" | "mem" => Ok(StepType::Memory),
            "compliance" => Ok(StepType::Compliance),
            "x402" | "transaction" => Ok(StepType::X402),
            "toolcall" | "tool" => Ok(StepType::ToolCall),
            _ => Err(format!("Invalid StepType: {}", s)),
        }
    }
}

impl fmt::Display for X402Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            X402Status::Pending => "pending",
            X402Status::Approved => "approved",
            X402Status::Rejected => "rejected",
            X402Status::Expired => "expired",
            X402Status::Completed => "completed",
            X402Status::Unknown => "unknown",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for X402Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "pending" => Ok(X402Status::Pending),
            "approved" => Ok(X402Status::Approved),
            "rejected" | "denied" => Ok(X402Status::Rejected),
            "expired" => Ok(X402Status::Expired),
            "completed" | "complete" => Ok(X402Status::Completed),
            "unknown" => Ok(X402Status::Unknown),
            _ => Err(format!("Invalid X402Status: {}", s)),
        }
    }
}
