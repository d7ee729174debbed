//! Fuzz test for run loading and timeline building
//!
//! Feeds arbitrary bytes through the JSON loader and, when they decode, builds
//! a timeline and checks its ordering invariants.
//!
//! Run with: cargo +nightly fuzz run timeline_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use rewind_core::{build_timeline, parse_timestamp_millis, RunData};

fuzz_target!(|data: &[u8]| {
    let Ok(run) = RunData::from_json_slice(data) else {
        return;
    };

    let steps = build_timeline(&run.memory, &run.compliance, &run.x402, &run.tool_calls);
    assert_eq!(steps.len(), run.len());

    // Indices are dense and positional
    for (position, step) in steps.iter().enumerate() {
        assert_eq!(step.index, position);
    }

    // Parsable timestamps come first, in non-decreasing order
    let keys: Vec<Option<i64>> = steps
        .iter()
        .map(|s| parse_timestamp_millis(&s.timestamp))
        .collect();
    let first_unparsable = keys.iter().position(Option::is_none).unwrap_or(keys.len());
    assert!(keys[first_unparsable..].iter().all(Option::is_none));
    for pair in keys[..first_unparsable].windows(2) {
        assert!(pair[0] <= pair[1]);
    }

    // Building twice gives the same timeline
    let again = build_timeline(&run.memory, &run.compliance, &run.x402, &run.tool_calls);
    assert_eq!(steps, again);
});
