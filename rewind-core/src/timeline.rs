//! Timeline Builder
//!
//! Merges the four source streams into one chronologically ordered sequence
//! of [`ReplayStep`]s:
//!
//! 1. map each input array to steps independently (placeholder index 0)
//! 2. concatenate in the fixed order memory → compliance → x402 → tool_call
//! 3. stable-sort by parsed timestamp, ascending
//! 4. re-assign dense indices 0..n-1
//!
//! Equal timestamps keep concatenation order, so a memory step always precedes
//! a compliance step with the same time. Records whose timestamp is missing or
//! unparsable sort after every parsable one and keep their relative order; the
//! builder never drops or rejects a record.

use crate::config::ReplayConfig;
use crate::identity::{parse_timestamp_millis, EpochMillis};
use crate::records::{
    ComplianceEvent, MemoryEntry, RunSources, SourceEvent, ToolCallEvent, X402Request,
};
use crate::step::ReplayStep;
use std::collections::HashMap;
use std::sync::Arc;

/// Build a timeline with the default summary length.
pub fn build_timeline(
    memory: &[MemoryEntry],
    compliance: &[ComplianceEvent],
    x402: &[X402Request],
    tool_calls: &[ToolCallEvent],
) -> Vec<ReplayStep> {
    build_timeline_with(
        memory,
        compliance,
        x402,
        tool_calls,
        ReplayConfig::default().summary_chars,
    )
}

/// Build a timeline, truncating memory summaries to `summary_chars`.
pub fn build_timeline_with(
    memory: &[MemoryEntry],
    compliance: &[ComplianceEvent],
    x402: &[X402Request],
    tool_calls: &[ToolCallEvent],
    summary_chars: usize,
) -> Vec<ReplayStep> {
    let total = memory.len() + compliance.len() + x402.len() + tool_calls.len();
    let mut steps: Vec<ReplayStep> = Vec::with_capacity(total);

    steps.extend(memory.iter().enumerate().map(|(pos, m)| {
        ReplayStep::from_event(SourceEvent::Memory(m.clone()), pos, summary_chars)
    }));
    steps.extend(compliance.iter().enumerate().map(|(pos, c)| {
        ReplayStep::from_event(SourceEvent::Compliance(c.clone()), pos, summary_chars)
    }));
    steps.extend(x402.iter().enumerate().map(|(pos, x)| {
        ReplayStep::from_event(SourceEvent::X402(x.clone()), pos, summary_chars)
    }));
    steps.extend(tool_calls.iter().enumerate().map(|(pos, t)| {
        ReplayStep::from_event(SourceEvent::ToolCall(t.clone()), pos, summary_chars)
    }));

    let mut keyed: Vec<(SortKey, ReplayStep)> = steps
        .into_iter()
        .map(|step| (SortKey::of(&step.timestamp), step))
        .collect();

    // `sort_by_key` is stable: ties keep concatenation order.
    keyed.sort_by_key(|(key, _)| *key);

    keyed
        .into_iter()
        .enumerate()
        .map(|(index, (_, mut step))| {
            step.index = index;
            step
        })
        .collect()
}

/// Ordering key: parsable timestamps first by time, unparsable ones last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    unparsable: bool,
    millis: EpochMillis,
}

impl SortKey {
    fn of(raw: &str) -> Self {
        match parse_timestamp_millis(raw) {
            Some(millis) => Self {
                unparsable: false,
                millis,
            },
            None => Self {
                unparsable: true,
                millis: 0,
            },
        }
    }
}

// ============================================================================
// TIMELINE WITH LOOKUP INDEX
// ============================================================================

/// Lookup tables built once per rebuild.
#[derive(Debug, Default)]
struct TimelineIndex {
    /// Lowercased agent role → first step index carrying it.
    first_by_role: HashMap<String, usize>,
    /// Ascending indices of error steps.
    errors: Vec<usize>,
}

/// An immutable built timeline plus its role/error lookup index.
///
/// Cloning shares the underlying steps. A rebuild produces a new `Timeline`;
/// holders of an older one keep a consistent snapshot.
#[derive(Debug, Clone)]
pub struct Timeline {
    steps: Arc<[ReplayStep]>,
    index: Arc<TimelineIndex>,
}

impl Timeline {
    pub fn empty() -> Self {
        Self::from_steps(Vec::new())
    }

    pub fn from_steps(steps: Vec<ReplayStep>) -> Self {
        let mut index = TimelineIndex::default();
        for step in &steps {
            if let Some(role) = &step.agent_role {
                index
                    .first_by_role
                    .entry(role.to_lowercase())
                    .or_insert(step.index);
            }
            if step.is_error() {
                index.errors.push(step.index);
            }
        }

        Self {
            steps: steps.into(),
            index: Arc::new(index),
        }
    }

    pub fn from_sources(sources: &RunSources, config: &ReplayConfig) -> Self {
        Self::from_steps(build_timeline_with(
            &sources.memory,
            &sources.compliance,
            &sources.x402,
            &sources.tool_calls,
            config.summary_chars,
        ))
    }

    pub fn steps(&self) -> &Arc<[ReplayStep]> {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReplayStep> {
        self.steps.get(index)
    }

    /// Index of the last step, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    /// Clamp any integer position into `[0, len - 1]` (0 for an empty timeline).
    pub fn clamp_index(&self, index: i64) -> usize {
        match self.last_index() {
            Some(last) => {
                let last = i64::try_from(last).unwrap_or(i64::MAX);
                usize::try_from(index.clamp(0, last)).unwrap_or(0)
            }
            None => 0,
        }
    }

    /// First step, in timeline order, whose role matches case-insensitively.
    pub fn first_for_role(&self, role: &str) -> Option<usize> {
        self.index.first_by_role.get(&role.to_lowercase()).copied()
    }

    /// Next error strictly after `current`, wrapping to the first error.
    pub fn next_error_after(&self, current: usize) -> Option<usize> {
        let errors = &self.index.errors;
        let after = errors.partition_point(|&i| i <= current);
        errors.get(after).or_else(|| errors.first()).copied()
    }

    pub fn error_indices(&self) -> &[usize] {
        &self.index.errors
    }

    /// Whether both handles point at the same built steps.
    pub fn ptr_eq(&self, other: &Timeline) -> bool {
        Arc::ptr_eq(&self.steps, &other.steps)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::empty()
    }
}
