//! REWIND Test Utilities
//!
//! Centralized test infrastructure for the REWIND workspace:
//! - Proptest generators for every source record type
//! - Test fixtures for common replay scenarios
//! - Custom assertions for timeline invariants

// Re-export core types for convenience
pub use rewind_core::{
    parse_timestamp_millis, ComplianceEvent, MemoryEntry, ReplayConfig, ReplayStep, RunData,
    RunSources, StepType, Timeline, ToolCallEvent, ToolCallPayload, X402Request, X402Status,
};

use chrono::{DateTime, SecondsFormat, Utc};

/// Base instant every fixture timestamp is offset from (2024-05-01T10:00:00Z).
pub const FIXTURE_EPOCH_SECS: i64 = 1_714_557_600;

/// RFC 3339 timestamp `offset_secs` seconds after [`FIXTURE_EPOCH_SECS`].
pub fn ts(offset_secs: i64) -> String {
    ts_millis((FIXTURE_EPOCH_SECS + offset_secs) * 1000)
}

/// RFC 3339 timestamp (millisecond precision, `Z` suffix) for epoch millis.
pub fn ts_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating REWIND record types.

    use super::*;
    use chrono::FixedOffset;
    use proptest::prelude::*;

    // === Primitive Generators ===

    /// Generate epoch millis within a reasonable range (2020-2030).
    pub fn arb_epoch_millis() -> impl Strategy<Value = i64> {
        1_577_836_800_000i64..1_893_456_000_000i64
    }

    /// Generate a UTC RFC 3339 timestamp string.
    pub fn arb_timestamp() -> impl Strategy<Value = String> {
        arb_epoch_millis().prop_map(ts_millis)
    }

    /// Generate a timestamp drawn from a small window so ties are common.
    pub fn arb_clustered_timestamp() -> impl Strategy<Value = String> {
        (0i64..8).prop_map(ts)
    }

    /// Generate an RFC 3339 timestamp with an arbitrary UTC offset.
    pub fn arb_offset_timestamp() -> impl Strategy<Value = String> {
        (arb_epoch_millis(), -12i32..=14).prop_map(|(millis, hours)| {
            let offset = FixedOffset::east_opt(hours * 3600);
            match (DateTime::<Utc>::from_timestamp_millis(millis), offset) {
                (Some(dt), Some(offset)) => dt
                    .with_timezone(&offset)
                    .to_rfc3339_opts(SecondsFormat::Millis, false),
                _ => ts_millis(millis),
            }
        })
    }

    /// Generate a well-formed timestamp in any supported shape.
    pub fn arb_valid_timestamp() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => arb_timestamp(),
            2 => arb_clustered_timestamp(),
            2 => arb_offset_timestamp(),
        ]
    }

    /// Generate a timestamp field that may be missing or malformed.
    pub fn arb_maybe_timestamp() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            8 => arb_valid_timestamp().prop_map(Some),
            1 => Just(None),
            1 => prop_oneof![
                Just(String::new()),
                Just("not-a-date".to_string()),
                Just("2024-13-45T99:00:00Z".to_string()),
            ]
            .prop_map(Some),
        ]
    }

    /// Generate an optional record identity.
    pub fn arb_record_id() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            4 => "[a-z]{1,3}-[0-9]{1,5}".prop_map(Some),
            1 => Just(None),
        ]
    }

    /// Generate an optional agent role, with varied casing.
    pub fn arb_agent_role() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("planner".to_string())),
            Just(Some("Planner".to_string())),
            Just(Some("researcher".to_string())),
            Just(Some("EXECUTOR".to_string())),
        ]
    }

    // === Enum Generators ===

    /// Generate an X402Status variant.
    pub fn arb_x402_status() -> impl Strategy<Value = X402Status> {
        prop_oneof![
            Just(X402Status::Pending),
            Just(X402Status::Approved),
            Just(X402Status::Rejected),
            Just(X402Status::Expired),
            Just(X402Status::Completed),
        ]
    }

    /// Generate a StepType variant.
    pub fn arb_step_type() -> impl Strategy<Value = StepType> {
        prop_oneof![
            Just(StepType::Memory),
            Just(StepType::Compliance),
            Just(StepType::X402),
            Just(StepType::ToolCall),
        ]
    }

    // === Record Generators ===

    /// Generate a MemoryEntry.
    pub fn arb_memory_entry() -> impl Strategy<Value = MemoryEntry> {
        (
            arb_record_id(),
            arb_maybe_timestamp(),
            ".{0,160}",
            prop::option::of("[a-z]{3,10}"),
            arb_agent_role(),
        )
            .prop_map(|(id, created_at, content, namespace, agent_role)| MemoryEntry {
                id,
                created_at,
                content,
                namespace,
                metadata: None,
                agent_role,
            })
    }

    /// Generate a ComplianceEvent.
    pub fn arb_compliance_event() -> impl Strategy<Value = ComplianceEvent> {
        (
            arb_record_id(),
            arb_maybe_timestamp(),
            prop::option::of(0.0f64..100.0),
            prop::option::of(any::<bool>()),
            prop::collection::vec("[A-Z_]{3,12}", 0..3),
        )
            .prop_map(|(id, created_at, risk_score, passed, reason_codes)| ComplianceEvent {
                id,
                created_at,
                risk_score,
                passed,
                details: None,
                reason_codes,
            })
    }

    /// Generate an X402Request.
    pub fn arb_x402_request() -> impl Strategy<Value = X402Request> {
        (
            arb_record_id(),
            arb_maybe_timestamp(),
            prop::option::of(arb_valid_timestamp()),
            arb_x402_status(),
            prop::collection::vec("m-[0-9]{1,3}", 0..3),
            prop::collection::vec("c-[0-9]{1,3}", 0..3),
            "[0-9a-f]{16}",
        )
            .prop_map(
                |(id, created_at, timestamp, status, memory_ids, compliance_ids, signature)| {
                    X402Request {
                        id,
                        created_at,
                        timestamp,
                        status,
                        linked_memory_ids: memory_ids,
                        linked_compliance_ids: compliance_ids,
                        signature,
                        payload: Default::default(),
                    }
                },
            )
    }

    /// Generate a ToolCallEvent.
    pub fn arb_tool_call_event() -> impl Strategy<Value = ToolCallEvent> {
        (
            arb_record_id(),
            prop::option::of(arb_valid_timestamp()),
            arb_maybe_timestamp(),
            arb_agent_role(),
            "[a-z_]{3,12}",
            prop::option::of(any::<bool>()),
            prop::option::of(0u64..60_000),
        )
            .prop_map(
                |(id, timestamp, created_at, agent_id, tool_name, success, duration_ms)| {
                    ToolCallEvent {
                        id,
                        timestamp,
                        created_at,
                        payload: ToolCallPayload {
                            agent_id,
                            tool_name,
                            success,
                            error: success
                                .filter(|ok| !ok)
                                .map(|_| "tool failed".to_string()),
                            duration_ms,
                            ..Default::default()
                        },
                    }
                },
            )
    }

    /// Generate a RunData bundle with up to `max_per_stream` records per stream.
    pub fn arb_run_data(max_per_stream: usize) -> impl Strategy<Value = RunData> {
        (
            prop::collection::vec(arb_memory_entry(), 0..=max_per_stream),
            prop::collection::vec(arb_compliance_event(), 0..=max_per_stream),
            prop::collection::vec(arb_x402_request(), 0..=max_per_stream),
            prop::collection::vec(arb_tool_call_event(), 0..=max_per_stream),
        )
            .prop_map(|(memory, compliance, x402, tool_calls)| RunData {
                memory,
                compliance,
                x402,
                tool_calls,
            })
    }

    /// Generate a valid ReplayConfig.
    pub fn arb_valid_config() -> impl Strategy<Value = ReplayConfig> {
        (0.05f64..1.0, 1.0f64..8.0, 50u64..5_000, 1usize..500).prop_map(
            |(min_speed, max_speed, tick_ms, summary_chars)| ReplayConfig {
                min_speed,
                max_speed,
                default_speed: 1.0,
                base_tick_interval: std::time::Duration::from_millis(tick_ms),
                summary_chars,
            },
        )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records and runs for common replay scenarios.

    use super::*;

    /// Memory entry with an id and a creation time.
    pub fn memory_at(id: &str, created_at: &str) -> MemoryEntry {
        MemoryEntry {
            id: Some(id.to_string()),
            created_at: Some(created_at.to_string()),
            content: format!("memory {}", id),
            namespace: Some("run".to_string()),
            ..Default::default()
        }
    }

    /// Memory entry written by a specific agent role.
    pub fn memory_with_role(id: &str, created_at: &str, role: &str) -> MemoryEntry {
        MemoryEntry {
            agent_role: Some(role.to_string()),
            ..memory_at(id, created_at)
        }
    }

    /// Compliance check with an explicit pass/fail outcome.
    pub fn compliance_at(id: &str, created_at: &str, passed: bool) -> ComplianceEvent {
        ComplianceEvent {
            id: Some(id.to_string()),
            created_at: Some(created_at.to_string()),
            risk_score: Some(if passed { 12.0 } else { 91.0 }),
            passed: Some(passed),
            details: None,
            reason_codes: if passed {
                Vec::new()
            } else {
                vec!["HIGH_RISK".to_string()]
            },
        }
    }

    /// X402 request carrying only `created_at`.
    pub fn x402_at(id: &str, created_at: &str, status: X402Status) -> X402Request {
        X402Request {
            id: Some(id.to_string()),
            created_at: Some(created_at.to_string()),
            status,
            signature: "0xsig".to_string(),
            ..Default::default()
        }
    }

    /// Tool call by `agent`, succeeding or failing.
    pub fn tool_call_at(id: &str, timestamp: &str, agent: &str, success: bool) -> ToolCallEvent {
        ToolCallEvent {
            id: Some(id.to_string()),
            timestamp: Some(timestamp.to_string()),
            created_at: None,
            payload: ToolCallPayload {
                agent_id: Some(agent.to_string()),
                tool_name: "search".to_string(),
                parameters: serde_json::json!({ "query": id }),
                result: serde_json::Value::Null,
                success: Some(success),
                error: if success {
                    None
                } else {
                    Some("tool failed".to_string())
                },
                duration_ms: Some(120),
            },
        }
    }

    /// `n` memory entries one second apart, ids `m-0..m-{n-1}`.
    pub fn sequential_memory_run(n: usize) -> RunData {
        RunData {
            memory: (0..n)
                .map(|i| memory_at(&format!("m-{}", i), &ts(i as i64)))
                .collect(),
            ..Default::default()
        }
    }

    /// Tool calls one second apart; `false` entries are failures.
    pub fn tool_call_outcomes(outcomes: &[bool]) -> RunData {
        RunData {
            tool_calls: outcomes
                .iter()
                .enumerate()
                .map(|(i, ok)| tool_call_at(&format!("t-{}", i), &ts(i as i64), "executor", *ok))
                .collect(),
            ..Default::default()
        }
    }

    /// A small run touching every stream, agent role, and error kind.
    ///
    /// Timeline order:
    /// 0 memory(planner) 1 compliance(pass) 2 tool(researcher ok)
    /// 3 x402(approved) 4 compliance(fail) 5 memory(executor) 6 tool(executor fail)
    pub fn mixed_run() -> RunData {
        RunData {
            memory: vec![
                memory_with_role("m-plan", &ts(0), "planner"),
                memory_with_role("m-exec", &ts(5), "executor"),
            ],
            compliance: vec![
                compliance_at("c-ok", &ts(1), true),
                compliance_at("c-fail", &ts(4), false),
            ],
            x402: vec![x402_at("x-1", &ts(3), X402Status::Approved)],
            tool_calls: vec![
                tool_call_at("t-ok", &ts(2), "researcher", true),
                tool_call_at("t-fail", &ts(6), "executor", false),
            ],
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for timeline invariants.

    use super::*;

    /// Assert every adjacent pair is in non-decreasing time order, with
    /// unparsable timestamps only at the tail.
    #[track_caller]
    pub fn assert_chronological(steps: &[ReplayStep]) {
        let keys: Vec<Option<i64>> = steps
            .iter()
            .map(|s| parse_timestamp_millis(&s.timestamp))
            .collect();
        for (i, pair) in keys.windows(2).enumerate() {
            match (pair[0], pair[1]) {
                (Some(a), Some(b)) => assert!(
                    a <= b,
                    "Steps {} and {} out of order: {} > {}",
                    i,
                    i + 1,
                    steps[i].timestamp,
                    steps[i + 1].timestamp
                ),
                (None, Some(_)) => panic!(
                    "Unparsable timestamp at step {} precedes a parsable one",
                    i
                ),
                _ => {}
            }
        }
    }

    /// Assert indices are exactly 0..n-1 in order.
    #[track_caller]
    pub fn assert_dense_indices(steps: &[ReplayStep]) {
        for (position, step) in steps.iter().enumerate() {
            assert_eq!(
                step.index, position,
                "Step {} has index {}",
                position, step.index
            );
        }
    }

    /// Assert a cursor is valid for a timeline of `total` steps.
    #[track_caller]
    pub fn assert_cursor_in_bounds(cursor: usize, total: usize) {
        if total == 0 {
            assert_eq!(cursor, 0, "Cursor must stay at 0 on an empty timeline");
        } else {
            assert!(
                cursor < total,
                "Cursor {} outside timeline of {} steps",
                cursor,
                total
            );
        }
    }

    /// Assert a ReplayConfig is valid.
    #[track_caller]
    pub fn assert_config_valid(config: &ReplayConfig) {
        if let Err(e) = config.validate() {
            panic!("Config validation failed: {:?}", e);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
