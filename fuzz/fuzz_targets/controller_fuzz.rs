//! Fuzz test for the replay controller
//!
//! Interprets the input as a run payload followed by a stream of operations,
//! and checks the cursor stays inside the timeline after every one.
//!
//! Input layout: `[payload_len: u16 LE][payload][ops...]`
//!
//! Run with: cargo +nightly fuzz run controller_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use rewind_core::{ReplayConfig, RunData};
use rewind_player::ReplayController;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let payload_len = u16::from_le_bytes([data[0], data[1]]) as usize;
    let rest = &data[2..];
    let split = payload_len.min(rest.len());
    let (payload, ops) = rest.split_at(split);

    let Ok(run) = RunData::from_json_slice(payload) else {
        return;
    };
    let Ok(mut controller) = ReplayController::with_sources(ReplayConfig::default(), run.into_sources()) else {
        return;
    };

    for (i, op) in ops.iter().enumerate() {
        match op % 10 {
            0 => controller.play(),
            1 => controller.pause(),
            2 => controller.step_forward(),
            3 => controller.step_backward(),
            4 => {
                controller.jump_to_step(i64::from(*op as i8) * (i as i64 + 1));
            }
            5 => {
                controller.jump_to_next_error();
            }
            6 => {
                controller.jump_to_agent("planner");
            }
            7 => {
                controller.tick(controller.playback_epoch());
            }
            8 => {
                controller.set_playback_speed(f64::from(*op) / 32.0);
            }
            _ => controller.reset(),
        }

        let total = controller.total_steps();
        let cursor = controller.current_step_index();
        assert!(cursor == 0 || cursor < total);

        let speed = controller.playback_speed();
        assert!((0.25..=4.0).contains(&speed));
    }
});
