//! REWIND Core - Workflow Replay Types
//!
//! Pure data and pure functions, no I/O beyond loading a run file. The
//! player, the TUI and the test utilities all depend on this crate.
//!
//! # Key Types
//!
//! - [`MemoryEntry`], [`ComplianceEvent`], [`X402Request`], [`ToolCallEvent`]:
//!   the four source record shapes, unified by [`SourceEvent`]
//! - [`ReplayStep`]: one normalized timeline entry
//! - [`Timeline`]: a built, immutable timeline with role/error lookups
//! - [`StepData`] / [`StepCounts`]: projections "as of step N"
//! - [`ReplayExport`]: the portable JSON export document

pub mod config;
pub mod enums;
pub mod error;
pub mod export;
pub mod identity;
pub mod projection;
pub mod records;
pub mod step;
pub mod timeline;

pub use config::{ReplayConfig, BASE_TICK_INTERVAL_MS, MAX_PLAYBACK_SPEED, MIN_PLAYBACK_SPEED, SUMMARY_CHARS};
pub use enums::{StepType, X402Status};
pub use error::{ConfigError, LoadError, RewindError, RewindResult};
pub use export::{ExportedStep, ReplayExport};
pub use identity::{parse_timestamp, parse_timestamp_millis, EpochMillis, Timestamp};
pub use projection::{StepCounts, StepData};
pub use records::{
    ComplianceEvent, JsonMap, MemoryEntry, RunData, RunSources, SourceEvent, ToolCallEvent,
    ToolCallPayload, X402Request,
};
pub use step::{fallback_id, truncate_chars, ReplayStep, COMPLIANCE_ROLE, TRANSACTION_ROLE};
pub use timeline::{build_timeline, build_timeline_with, Timeline};
