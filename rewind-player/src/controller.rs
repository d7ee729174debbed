//! Replay Controller
//!
//! A synchronous state machine over one built [`Timeline`]: a cursor, a
//! playing flag and a speed multiplier. It owns no timer. Autoplay is driven
//! from outside by calling [`ReplayController::tick`] with the playback epoch
//! that was current when the timer was armed; see [`crate::session`].
//!
//! Every operation is total. Out-of-range seeks clamp, unmatched jumps are
//! no-ops reported through [`JumpOutcome`], and an empty timeline keeps the
//! cursor at 0.

use crate::error::PlayerResult;
use rewind_core::{
    ReplayConfig, ReplayExport, ReplayStep, RunSources, StepCounts, StepData, Timeline, Timestamp,
};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// OUTCOMES
// ============================================================================

/// Result of a navigation that may find nothing to jump to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    /// The cursor now sits at this index.
    Moved(usize),
    /// Nothing matched; cursor and playback are unchanged.
    NoMatch,
}

impl JumpOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, JumpOutcome::Moved(_))
    }
}

/// Result of one autoplay tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Advanced to this index and playback continues.
    Advanced(usize),
    /// Playback halted on this tick at the last step (or on an empty timeline).
    Finished,
    /// The tick belongs to a cancelled timer and was ignored.
    Stale,
}

/// Read-only view of controller state for renderers.
#[derive(Debug, Clone)]
pub struct ReplaySnapshot {
    pub current_step_index: usize,
    pub total_steps: usize,
    pub is_playing: bool,
    pub playback_speed: f64,
    pub current_step: Option<ReplayStep>,
    /// The whole immutable timeline, shared with the controller.
    pub steps_history: Arc<[ReplayStep]>,
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Cursor and playback state for one replay session.
#[derive(Debug, Clone)]
pub struct ReplayController {
    config: ReplayConfig,
    sources: RunSources,
    timeline: Timeline,
    current_step_index: usize,
    is_playing: bool,
    playback_speed: f64,
    /// Bumped on every change of `is_playing`.
    playback_epoch: u64,
}

impl Default for ReplayController {
    fn default() -> Self {
        Self::from_parts(ReplayConfig::default(), RunSources::empty())
    }
}

impl ReplayController {
    /// Create a controller over empty sources after validating `config`.
    pub fn new(config: ReplayConfig) -> PlayerResult<Self> {
        Self::with_sources(config, RunSources::empty())
    }

    /// Create a controller and build its first timeline from `sources`.
    pub fn with_sources(config: ReplayConfig, sources: RunSources) -> PlayerResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, sources))
    }

    fn from_parts(config: ReplayConfig, sources: RunSources) -> Self {
        let timeline = Timeline::from_sources(&sources, &config);
        Self {
            playback_speed: config.default_speed,
            config,
            sources,
            timeline,
            current_step_index: 0,
            is_playing: false,
            playback_epoch: 0,
        }
    }

    // === Accessors ===

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn sources(&self) -> &RunSources {
        &self.sources
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn total_steps(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn playback_speed(&self) -> f64 {
        self.playback_speed
    }

    /// Epoch a newly armed timer must present to [`Self::tick`].
    pub fn playback_epoch(&self) -> u64 {
        self.playback_epoch
    }

    pub fn current_step(&self) -> Option<&ReplayStep> {
        self.timeline.get(self.current_step_index)
    }

    /// Interval between autoplay ticks at the current speed.
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval(self.playback_speed)
    }

    pub fn at_last_step(&self) -> bool {
        self.timeline.last_index() == Some(self.current_step_index)
    }

    // === Playback ===

    /// Start autoplay, rewinding first when parked on the last step.
    pub fn play(&mut self) {
        if self.at_last_step() {
            self.current_step_index = 0;
        }
        self.set_playing(true);
    }

    pub fn pause(&mut self) {
        self.set_playing(false);
    }

    pub fn toggle_playback(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    fn set_playing(&mut self, playing: bool) {
        if self.is_playing != playing {
            self.is_playing = playing;
            self.playback_epoch = self.playback_epoch.wrapping_add(1);
        }
    }

    /// Advance one step on behalf of a timer armed at `epoch`.
    ///
    /// Reaching the last step stops playback on the same tick.
    pub fn tick(&mut self, epoch: u64) -> TickOutcome {
        if !self.is_playing || epoch != self.playback_epoch {
            return TickOutcome::Stale;
        }

        let Some(last) = self.timeline.last_index() else {
            self.set_playing(false);
            return TickOutcome::Finished;
        };

        if self.current_step_index < last {
            self.current_step_index += 1;
        }

        if self.current_step_index >= last {
            self.current_step_index = last;
            self.set_playing(false);
            TickOutcome::Finished
        } else {
            TickOutcome::Advanced(self.current_step_index)
        }
    }

    /// Clamp and apply a playback speed. `NaN` is ignored.
    ///
    /// Returns the effective speed.
    pub fn set_playback_speed(&mut self, speed: f64) -> f64 {
        if let Some(clamped) = self.config.clamp_speed(speed) {
            self.playback_speed = clamped;
        }
        self.playback_speed
    }

    // === Navigation ===

    pub fn step_forward(&mut self) {
        if let Some(last) = self.timeline.last_index() {
            self.current_step_index = (self.current_step_index + 1).min(last);
        }
    }

    pub fn step_backward(&mut self) {
        self.current_step_index = self.current_step_index.saturating_sub(1);
    }

    /// Seek to `index`, clamped into the timeline. Always stops autoplay.
    pub fn jump_to_step(&mut self, index: i64) -> usize {
        self.current_step_index = self.timeline.clamp_index(index);
        self.set_playing(false);
        self.current_step_index
    }

    /// Seek to the first step whose agent role matches `role`, ignoring case.
    pub fn jump_to_agent(&mut self, role: &str) -> JumpOutcome {
        match self.timeline.first_for_role(role) {
            Some(index) => self.land(index),
            None => JumpOutcome::NoMatch,
        }
    }

    /// Seek to the next error after the cursor, wrapping to the first error.
    pub fn jump_to_next_error(&mut self) -> JumpOutcome {
        match self.timeline.next_error_after(self.current_step_index) {
            Some(index) => self.land(index),
            None => JumpOutcome::NoMatch,
        }
    }

    fn land(&mut self, index: usize) -> JumpOutcome {
        self.current_step_index = index;
        self.set_playing(false);
        JumpOutcome::Moved(index)
    }

    /// Cursor to 0 and stop.
    pub fn reset(&mut self) {
        self.current_step_index = 0;
        self.set_playing(false);
    }

    // === Sources ===

    /// Replace the sources, rebuilding the timeline when their identity changed.
    ///
    /// A shrinking timeline pulls the cursor back to its last step. Playback
    /// state and speed carry over. Returns whether a rebuild happened.
    pub fn update_sources(&mut self, sources: RunSources) -> bool {
        if self.sources.same_identity(&sources) {
            return false;
        }

        self.timeline = Timeline::from_sources(&sources, &self.config);
        self.sources = sources;
        self.current_step_index = match self.timeline.last_index() {
            Some(last) => self.current_step_index.min(last),
            None => 0,
        };
        true
    }

    // === Projections ===

    /// Original records of every step up to and including the cursor.
    pub fn current_step_data(&self) -> StepData<'_> {
        StepData::up_to(self.timeline.steps(), self.current_step_index)
    }

    /// Per-type counts of [`Self::current_step_data`].
    pub fn step_counts(&self) -> StepCounts {
        self.current_step_data().counts()
    }

    pub fn snapshot(&self) -> ReplaySnapshot {
        ReplaySnapshot {
            current_step_index: self.current_step_index,
            total_steps: self.timeline.len(),
            is_playing: self.is_playing,
            playback_speed: self.playback_speed,
            current_step: self.current_step().cloned(),
            steps_history: Arc::clone(self.timeline.steps()),
        }
    }

    pub fn export(&self, run_id: &str, exported_at: Timestamp) -> ReplayExport {
        ReplayExport::new(
            run_id,
            exported_at,
            self.timeline.steps(),
            self.current_step_index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_test_utils::fixtures::{mixed_run, sequential_memory_run, tool_call_outcomes};
    use rewind_test_utils::assertions::assert_cursor_in_bounds;

    fn controller(run: rewind_core::RunData) -> ReplayController {
        ReplayController::with_sources(ReplayConfig::default(), run.into_sources()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ReplayConfig {
            min_speed: 0.0,
            ..ReplayConfig::default()
        };
        assert!(ReplayController::new(config).is_err());
    }

    #[test]
    fn test_empty_timeline_play() {
        let mut c = ReplayController::default();
        c.play();
        assert_eq!(c.current_step_index(), 0);
        assert_eq!(c.total_steps(), 0);

        let epoch = c.playback_epoch();
        assert_eq!(c.tick(epoch), TickOutcome::Finished);
        assert!(!c.is_playing());
        assert_eq!(c.current_step_index(), 0);
        assert!(c.current_step().is_none());
    }

    #[test]
    fn test_empty_timeline_navigation_is_total() {
        let mut c = ReplayController::default();
        c.step_forward();
        c.step_backward();
        assert_eq!(c.jump_to_step(42), 0);
        assert_eq!(c.jump_to_agent("planner"), JumpOutcome::NoMatch);
        assert_eq!(c.jump_to_next_error(), JumpOutcome::NoMatch);
        assert_eq!(c.step_counts(), StepCounts::default());
        assert_eq!(c.export("run", chrono::Utc::now()).current_step, 0);
    }

    #[test]
    fn test_single_type_timeline_seek_clamps() {
        let mut c = controller(sequential_memory_run(3));
        let indices: Vec<usize> = c.timeline().steps().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        assert_eq!(c.jump_to_step(5), 2);
        assert_eq!(c.jump_to_step(-5), 0);
        assert_eq!(c.jump_to_step(i64::MAX), 2);
        assert_eq!(c.jump_to_step(i64::MIN), 0);
    }

    #[test]
    fn test_step_forward_and_backward_saturate() {
        let mut c = controller(sequential_memory_run(2));
        c.step_backward();
        assert_eq!(c.current_step_index(), 0);
        c.step_forward();
        c.step_forward();
        assert_eq!(c.current_step_index(), 1);
    }

    #[test]
    fn test_play_at_end_rewinds() {
        let mut c = controller(sequential_memory_run(4));
        c.jump_to_step(3);
        c.play();
        assert!(c.is_playing());
        assert_eq!(c.current_step_index(), 0);
    }

    #[test]
    fn test_playback_terminates_at_last_step() {
        let mut c = controller(sequential_memory_run(4));
        c.play();
        let epoch = c.playback_epoch();

        assert_eq!(c.tick(epoch), TickOutcome::Advanced(1));
        assert_eq!(c.tick(epoch), TickOutcome::Advanced(2));
        assert_eq!(c.tick(epoch), TickOutcome::Finished);
        assert!(!c.is_playing());
        assert_eq!(c.current_step_index(), 3);
        assert_eq!(c.tick(epoch), TickOutcome::Stale);
        assert_eq!(c.current_step_index(), 3);
    }

    #[test]
    fn test_pause_invalidates_pending_ticks() {
        let mut c = controller(sequential_memory_run(5));
        c.play();
        let armed = c.playback_epoch();
        c.pause();
        assert_eq!(c.tick(armed), TickOutcome::Stale);

        c.play();
        assert_eq!(c.tick(armed), TickOutcome::Stale);
        assert_eq!(c.current_step_index(), 0);
        assert_eq!(c.tick(c.playback_epoch()), TickOutcome::Advanced(1));
    }

    #[test]
    fn test_seeks_stop_playback() {
        let mut c = controller(mixed_run());
        c.play();
        c.jump_to_step(2);
        assert!(!c.is_playing());

        c.play();
        assert!(c.jump_to_agent("executor").moved());
        assert!(!c.is_playing());

        c.play();
        assert!(c.jump_to_next_error().moved());
        assert!(!c.is_playing());

        c.play();
        c.reset();
        assert!(!c.is_playing());
        assert_eq!(c.current_step_index(), 0);
    }

    #[test]
    fn test_error_jump_wraps_around() {
        let mut c = controller(tool_call_outcomes(&[true, true, false, true]));
        c.jump_to_step(3);
        assert_eq!(c.jump_to_next_error(), JumpOutcome::Moved(2));
        assert_eq!(c.jump_to_next_error(), JumpOutcome::Moved(2));
    }

    #[test]
    fn test_error_jump_without_errors_is_noop() {
        let mut c = controller(tool_call_outcomes(&[true, true]));
        c.jump_to_step(1);
        c.play();
        assert_eq!(c.jump_to_next_error(), JumpOutcome::NoMatch);
        assert_eq!(c.current_step_index(), 0);
        assert!(c.is_playing());
    }

    #[test]
    fn test_agent_jump_is_case_insensitive() {
        let mut c = controller(mixed_run());
        assert_eq!(c.jump_to_agent("EXECUTOR"), JumpOutcome::Moved(5));
        assert_eq!(c.jump_to_agent("Compliance"), JumpOutcome::Moved(1));
        assert_eq!(c.jump_to_agent("transaction"), JumpOutcome::Moved(3));
    }

    #[test]
    fn test_agent_jump_no_match_keeps_state() {
        let mut c = controller(mixed_run());
        c.jump_to_step(4);
        c.play();
        let epoch = c.playback_epoch();

        assert_eq!(c.jump_to_agent("nonexistent"), JumpOutcome::NoMatch);
        assert_eq!(c.current_step_index(), 4);
        assert!(c.is_playing());
        assert_eq!(c.playback_epoch(), epoch);
    }

    #[test]
    fn test_speed_clamps_and_ignores_nan() {
        let mut c = ReplayController::default();
        assert_eq!(c.set_playback_speed(10.0), 4.0);
        assert_eq!(c.set_playback_speed(0.01), 0.25);
        assert_eq!(c.set_playback_speed(f64::NAN), 0.25);
        assert_eq!(c.set_playback_speed(f64::INFINITY), 4.0);
        assert_eq!(c.set_playback_speed(2.0), 2.0);
        assert_eq!(c.tick_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_rebuild_shrink_clamps_cursor() {
        let mut c = controller(sequential_memory_run(10));
        c.jump_to_step(9);
        c.play();
        c.jump_to_step(9);
        c.set_playback_speed(2.0);

        let smaller = sequential_memory_run(5).into_sources();
        assert!(c.update_sources(smaller));
        assert_eq!(c.current_step_index(), 4);
        assert_eq!(c.total_steps(), 5);
        assert_eq!(c.playback_speed(), 2.0);
    }

    #[test]
    fn test_rebuild_keeps_playback_running() {
        let mut c = controller(sequential_memory_run(3));
        c.play();
        let epoch = c.playback_epoch();

        assert!(c.update_sources(sequential_memory_run(6).into_sources()));
        assert!(c.is_playing());
        assert_eq!(c.tick(epoch), TickOutcome::Advanced(1));
    }

    #[test]
    fn test_rebuild_to_empty_resets_cursor() {
        let mut c = controller(sequential_memory_run(3));
        c.jump_to_step(2);
        assert!(c.update_sources(RunSources::empty()));
        assert_eq!(c.current_step_index(), 0);
        assert_cursor_in_bounds(c.current_step_index(), c.total_steps());
    }

    #[test]
    fn test_same_identity_skips_rebuild() {
        let sources = sequential_memory_run(3).into_sources();
        let mut c =
            ReplayController::with_sources(ReplayConfig::default(), sources.clone()).unwrap();
        let before = c.timeline().clone();

        assert!(!c.update_sources(sources.clone()));
        assert!(c.timeline().ptr_eq(&before));

        let replaced = sources.with_memory(sequential_memory_run(3).memory);
        assert!(c.update_sources(replaced));
        assert!(!c.timeline().ptr_eq(&before));
    }

    #[test]
    fn test_snapshot_shares_history() {
        let mut c = controller(mixed_run());
        c.jump_to_step(2);
        let snapshot = c.snapshot();

        assert_eq!(snapshot.current_step_index, 2);
        assert_eq!(snapshot.total_steps, 7);
        assert_eq!(snapshot.current_step.map(|s| s.id), Some("t-ok".to_string()));
        assert!(Arc::ptr_eq(&snapshot.steps_history, c.timeline().steps()));

        c.update_sources(sequential_memory_run(1).into_sources());
        assert_eq!(snapshot.steps_history.len(), 7);
    }

    #[test]
    fn test_current_step_data_projects_prefix() {
        let mut c = controller(mixed_run());
        c.jump_to_step(4);
        let data = c.current_step_data();
        assert_eq!(data.memory.len(), 1);
        assert_eq!(data.compliance.len(), 2);
        assert_eq!(data.x402.len(), 1);
        assert_eq!(data.tool_calls.len(), 1);

        let counts = c.step_counts();
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.errors, 1);
    }

    #[test]
    fn test_export_reports_cursor() {
        let mut c = controller(mixed_run());
        c.jump_to_step(3);
        let export = c.export("run-1", chrono::Utc::now());
        assert_eq!(export.current_step, 4);
        assert_eq!(export.total_steps, 7);
        assert_eq!(export.steps[6].step_number, 7);
    }
}
