//! Timer-driven playback against tokio's paused clock.

use proptest::prelude::*;
use rewind_core::{ReplayConfig, RunSources};
use rewind_player::{ReplayController, ReplaySession, TickOutcome, TickScheduler, TokioScheduler};
use rewind_test_utils::assertions::assert_cursor_in_bounds;
use rewind_test_utils::fixtures::{mixed_run, sequential_memory_run};
use rewind_test_utils::generators::arb_run_data;
use std::time::Duration;
use tokio::time::sleep;

fn tokio_session(steps: usize) -> ReplaySession<TokioScheduler> {
    ReplaySession::new(
        ReplayConfig::default(),
        sequential_memory_run(steps).into_sources(),
        TokioScheduler::new().unwrap(),
    )
    .unwrap()
}

// ============================================================================
// Autoplay
// ============================================================================

#[tokio::test(start_paused = true)]
async fn autoplay_advances_once_per_second_at_1x() {
    let mut session = tokio_session(10);
    session.play();

    sleep(Duration::from_millis(999)).await;
    assert_eq!(session.snapshot().current_step_index, 0);

    sleep(Duration::from_millis(2_002)).await;
    assert_eq!(session.snapshot().current_step_index, 3);
}

#[tokio::test(start_paused = true)]
async fn autoplay_halts_at_last_step() {
    let mut session = tokio_session(5);
    session.play();

    sleep(Duration::from_millis(5_500)).await;
    let snapshot = session.snapshot();
    assert!(!snapshot.is_playing);
    assert_eq!(snapshot.current_step_index, 4);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(session.snapshot().current_step_index, 4);
    assert!(!session.scheduler().is_active());
}

#[tokio::test(start_paused = true)]
async fn double_speed_doubles_tick_rate() {
    let mut normal = tokio_session(50);
    let mut fast = tokio_session(50);
    fast.set_playback_speed(2.0);
    normal.play();
    fast.play();

    sleep(Duration::from_millis(10_100)).await;
    let normal_steps = normal.snapshot().current_step_index;
    let fast_steps = fast.snapshot().current_step_index;

    assert_eq!(normal_steps, 10);
    assert_eq!(fast_steps, 20);
}

#[tokio::test(start_paused = true)]
async fn quarter_speed_ticks_every_four_seconds() {
    let mut session = tokio_session(10);
    session.set_playback_speed(0.25);
    session.play();

    sleep(Duration::from_millis(3_900)).await;
    assert_eq!(session.snapshot().current_step_index, 0);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(session.snapshot().current_step_index, 1);
}

#[tokio::test(start_paused = true)]
async fn speed_change_while_playing_takes_effect() {
    let mut session = tokio_session(50);
    session.play();
    sleep(Duration::from_millis(2_100)).await;
    assert_eq!(session.snapshot().current_step_index, 2);

    session.set_playback_speed(4.0);
    sleep(Duration::from_millis(1_050)).await;
    assert_eq!(session.snapshot().current_step_index, 6);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn pause_cancels_pending_tick() {
    let mut session = tokio_session(10);
    session.play();
    sleep(Duration::from_millis(1_500)).await;
    session.pause();
    assert_eq!(session.snapshot().current_step_index, 1);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(session.snapshot().current_step_index, 1);
}

#[tokio::test(start_paused = true)]
async fn seek_cancels_autoplay() {
    let mut session = tokio_session(10);
    session.play();
    session.jump_to_step(6);

    sleep(Duration::from_secs(5)).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.current_step_index, 6);
    assert!(!snapshot.is_playing);
}

#[tokio::test(start_paused = true)]
async fn rebuild_during_playback_continues_on_new_timeline() {
    let mut session = tokio_session(3);
    session.play();
    sleep(Duration::from_millis(1_100)).await;

    assert!(session.update_sources(sequential_memory_run(6).into_sources()));
    sleep(Duration::from_millis(2_000)).await;
    let snapshot = session.snapshot();
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.current_step_index, 3);
    assert_eq!(snapshot.total_steps, 6);
}

#[tokio::test(start_paused = true)]
async fn rebuild_shrink_then_empty_timeline() {
    let mut session = tokio_session(10);
    session.jump_to_step(9);
    assert!(session.update_sources(sequential_memory_run(5).into_sources()));
    assert_eq!(session.snapshot().current_step_index, 4);

    assert!(session.update_sources(RunSources::empty()));
    session.play();
    sleep(Duration::from_secs(2)).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.current_step_index, 0);
    assert_eq!(snapshot.total_steps, 0);
    assert!(!snapshot.is_playing);
}

#[tokio::test(start_paused = true)]
async fn error_jump_on_mixed_run() {
    let mut session = ReplaySession::new(
        ReplayConfig::default(),
        mixed_run().into_sources(),
        TokioScheduler::new().unwrap(),
    )
    .unwrap();
    session.play();
    assert!(session.jump_to_next_error().moved());
    assert_eq!(session.snapshot().current_step_index, 4);
    sleep(Duration::from_secs(3)).await;
    assert_eq!(session.snapshot().current_step_index, 4);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn seek_always_lands_in_bounds(run in arb_run_data(6), target in any::<i64>()) {
        let mut controller =
            ReplayController::with_sources(ReplayConfig::default(), run.into_sources()).unwrap();
        let landed = controller.jump_to_step(target);
        prop_assert_eq!(landed, controller.current_step_index());
        assert_cursor_in_bounds(landed, controller.total_steps());
        prop_assert!(!controller.is_playing());
    }

    #[test]
    fn uninterrupted_playback_terminates(n in 1usize..40) {
        let mut controller = ReplayController::with_sources(
            ReplayConfig::default(),
            sequential_memory_run(n).into_sources(),
        )
        .unwrap();
        controller.play();
        let epoch = controller.playback_epoch();

        let mut ticks = 0;
        while controller.tick(epoch) != TickOutcome::Finished {
            ticks += 1;
            prop_assert!(ticks < n);
        }
        prop_assert!(!controller.is_playing());
        prop_assert_eq!(controller.current_step_index(), n - 1);
    }

    #[test]
    fn cursor_survives_any_operation_sequence(
        run in arb_run_data(5),
        ops in prop::collection::vec(0u8..9, 0..40),
        replacement in arb_run_data(3),
    ) {
        let mut controller =
            ReplayController::with_sources(ReplayConfig::default(), run.into_sources()).unwrap();
        let replacement = replacement.into_sources();

        for op in ops {
            match op {
                0 => controller.play(),
                1 => controller.pause(),
                2 => controller.step_forward(),
                3 => controller.step_backward(),
                4 => { controller.jump_to_next_error(); }
                5 => { controller.jump_to_agent("planner"); }
                6 => { controller.tick(controller.playback_epoch()); }
                7 => { controller.update_sources(replacement.clone()); }
                _ => controller.reset(),
            }
            assert_cursor_in_bounds(controller.current_step_index(), controller.total_steps());
        }
    }
}
