use proptest::prelude::*;
use rewind_core::{
    build_timeline, parse_timestamp_millis, ReplayConfig, RunData, StepType, Timeline,
};
use rewind_test_utils::assertions::{assert_chronological, assert_dense_indices};
use rewind_test_utils::fixtures::{compliance_at, memory_at};
use rewind_test_utils::generators::{arb_clustered_timestamp, arb_run_data};
use std::collections::HashSet;

fn build(run: &RunData) -> Vec<rewind_core::ReplayStep> {
    build_timeline(&run.memory, &run.compliance, &run.x402, &run.tool_calls)
}

proptest! {
    // ========================================================================
    // Total length: every record yields exactly one step
    // ========================================================================

    #[test]
    fn timeline_length_is_sum_of_inputs(run in arb_run_data(12)) {
        let steps = build(&run);
        prop_assert_eq!(
            steps.len(),
            run.memory.len() + run.compliance.len() + run.x402.len() + run.tool_calls.len()
        );

        let count = |t: StepType| steps.iter().filter(|s| s.step_type == t).count();
        prop_assert_eq!(count(StepType::Memory), run.memory.len());
        prop_assert_eq!(count(StepType::Compliance), run.compliance.len());
        prop_assert_eq!(count(StepType::X402), run.x402.len());
        prop_assert_eq!(count(StepType::ToolCall), run.tool_calls.len());
    }

    // ========================================================================
    // Chronological ordering, unparsable timestamps trailing
    // ========================================================================

    #[test]
    fn timeline_is_chronological(run in arb_run_data(12)) {
        let steps = build(&run);
        assert_chronological(&steps);
    }

    #[test]
    fn parsable_steps_come_first(run in arb_run_data(10)) {
        let steps = build(&run);
        let first_bad = steps
            .iter()
            .position(|s| parse_timestamp_millis(&s.timestamp).is_none())
            .unwrap_or(steps.len());
        prop_assert!(steps[first_bad..]
            .iter()
            .all(|s| parse_timestamp_millis(&s.timestamp).is_none()));
    }

    // ========================================================================
    // Dense indexing
    // ========================================================================

    #[test]
    fn timeline_indices_are_dense(run in arb_run_data(12)) {
        let steps = build(&run);
        assert_dense_indices(&steps);
        let unique: HashSet<usize> = steps.iter().map(|s| s.index).collect();
        prop_assert_eq!(unique.len(), steps.len());
    }

    // ========================================================================
    // Stable tie-break: memory before compliance at equal time
    // ========================================================================

    #[test]
    fn memory_precedes_compliance_on_tie(ts in arb_clustered_timestamp(), passed in any::<bool>()) {
        let run = RunData {
            compliance: vec![compliance_at("c", &ts, passed)],
            memory: vec![memory_at("m", &ts)],
            ..Default::default()
        };
        let steps = build(&run);
        prop_assert_eq!(steps[0].step_type, StepType::Memory);
        prop_assert_eq!(steps[1].step_type, StepType::Compliance);
    }

    #[test]
    fn ties_keep_stream_order(run in arb_run_data(8)) {
        let steps = build(&run);
        for pair in steps.windows(2) {
            let a = parse_timestamp_millis(&pair[0].timestamp);
            let b = parse_timestamp_millis(&pair[1].timestamp);
            if a.is_some() && a == b {
                prop_assert!(pair[0].step_type <= pair[1].step_type);
            }
        }
    }

    // ========================================================================
    // Rebuilding is deterministic
    // ========================================================================

    #[test]
    fn rebuild_is_deterministic(run in arb_run_data(8)) {
        prop_assert_eq!(build(&run), build(&run));
    }

    // ========================================================================
    // Index lookups agree with a linear scan
    // ========================================================================

    #[test]
    fn error_lookup_matches_scan(run in arb_run_data(10), cursor in 0usize..48) {
        let timeline = Timeline::from_sources(&run.clone().into_sources(), &ReplayConfig::default());
        let steps = timeline.steps();

        let scanned = steps
            .iter()
            .skip(cursor.saturating_add(1))
            .find(|s| s.is_error())
            .or_else(|| steps.iter().find(|s| s.is_error()))
            .map(|s| s.index);
        prop_assert_eq!(timeline.next_error_after(cursor), scanned);
    }

    #[test]
    fn role_lookup_matches_scan(run in arb_run_data(10), role in "(planner|PLANNER|researcher|executor|compliance|transaction|nobody)") {
        let timeline = Timeline::from_sources(&run.into_sources(), &ReplayConfig::default());
        let scanned = timeline
            .steps()
            .iter()
            .find(|s| s.matches_role(&role))
            .map(|s| s.index);
        prop_assert_eq!(timeline.first_for_role(&role), scanned);
    }

    #[test]
    fn clamp_index_stays_in_bounds(run in arb_run_data(6), target in any::<i64>()) {
        let timeline = Timeline::from_sources(&run.into_sources(), &ReplayConfig::default());
        let clamped = timeline.clamp_index(target);
        match timeline.last_index() {
            Some(last) => prop_assert!(clamped <= last),
            None => prop_assert_eq!(clamped, 0),
        }
    }
}

#[test]
fn malformed_json_records_degrade_instead_of_failing() {
    let json = br#"{
        "memory": [
            {"id": 7, "created_at": "2024-05-01T10:00:02Z", "content": "numeric id"},
            {"content": "no id, no time"}
        ],
        "compliance": [{"created_at": "garbage", "passed": false}],
        "x402_requests": [{"id": "x", "createdAt": "2024-05-01T10:00:01Z", "status": "weird"}],
        "toolCalls": [{"timestamp": "2024-05-01T10:00:00Z", "payload": {"tool": "fetch", "success": false}}]
    }"#;

    let run = RunData::from_json_slice(json).unwrap();
    let steps = build(&run);
    let ids: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();

    assert_eq!(ids, vec!["tool_call-0", "x", "7", "memory-1", "compliance-0"]);
    assert_chronological(&steps);
    assert_dense_indices(&steps);
}

#[test]
fn wrongly_typed_fields_degrade_one_record_not_the_run() {
    let json = br#"{
        "memory": [
            {"id": "m-ok", "created_at": "2024-05-01T10:00:00Z", "content": "fine"},
            {"id": "m-bad", "created_at": "2024-05-01T10:00:01Z", "content": null, "namespace": 3},
            17
        ],
        "compliance": [
            {"id": "c-bad", "created_at": "2024-05-01T10:00:02Z", "risk_score": "high", "passed": "false"}
        ],
        "x402_requests": [
            {"id": "x-bad", "created_at": "2024-05-01T10:00:03Z", "status": null, "signature": null, "memory_ids": "m-ok"}
        ],
        "toolCalls": [
            {"id": "t-bad", "timestamp": "2024-05-01T10:00:04Z", "payload": null},
            {"id": "t-neg", "timestamp": "2024-05-01T10:00:05Z", "payload": {"tool": "fetch", "duration_ms": -3, "success": false}}
        ]
    }"#;

    let run = RunData::from_json_slice(json).unwrap();
    assert_eq!(run.len(), 7);
    assert_eq!(run.memory[0].content, "fine");
    assert_eq!(run.memory[1].content, "");
    assert!(run.memory[1].namespace.is_none());
    assert!(run.compliance[0].risk_score.is_none());
    assert!(!run.compliance[0].is_failure());
    assert!(run.x402[0].linked_memory_ids.is_empty());
    assert_eq!(run.tool_calls[1].payload.tool_name, "fetch");
    assert!(run.tool_calls[1].payload.duration_ms.is_none());

    let steps = build(&run);
    assert_eq!(steps.len(), 7);
    assert_eq!(steps[0].id, "m-ok");
    assert_eq!(steps.last().map(|s| s.id.as_str()), Some("memory-2"));
    assert_eq!(steps.iter().filter(|s| s.is_error()).count(), 1);
    assert_dense_indices(&steps);
}
