//! Replay sessions
//!
//! [`ReplaySession`] binds one [`ReplayController`] to one [`TickScheduler`].
//! Every operation locks the controller, applies the change, releases the lock
//! and then brings the scheduler in line with the new playback state:
//!
//! - not playing: the timer is stopped
//! - playing under a new epoch: the timer is re-armed with a callback bound to
//!   that epoch
//! - playing under the same epoch at a new speed: the timer is rescheduled
//!
//! Ticks from a timer armed under an older epoch are ignored by the
//! controller, so a cancelled timer can never move the cursor. Dropping the
//! session stops the timer.

use crate::controller::{JumpOutcome, ReplayController, ReplaySnapshot, TickOutcome};
use crate::error::PlayerResult;
use crate::scheduler::{TickControl, TickFn, TickScheduler};
use rewind_core::{ReplayConfig, ReplayExport, RunSources, StepCounts, Timestamp};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// Session identifier using UUIDv7 for timestamp-sortable IDs.
pub type SessionId = Uuid;

/// Generate a new UUIDv7 SessionId.
pub fn new_session_id() -> SessionId {
    Uuid::now_v7()
}

/// Epoch and period the scheduler was last armed with.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Armed {
    epoch: u64,
    period: Duration,
}

/// A controller plus the timer that drives its autoplay.
pub struct ReplaySession<S: TickScheduler> {
    id: SessionId,
    controller: Arc<Mutex<ReplayController>>,
    scheduler: S,
    armed: Option<Armed>,
}

fn lock(controller: &Mutex<ReplayController>) -> MutexGuard<'_, ReplayController> {
    // Controller updates never leave partial state behind, so a poisoned
    // lock still guards a consistent value.
    controller.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: TickScheduler> ReplaySession<S> {
    pub fn new(config: ReplayConfig, sources: RunSources, scheduler: S) -> PlayerResult<Self> {
        let controller = ReplayController::with_sources(config, sources)?;
        Ok(Self::from_controller(controller, scheduler))
    }

    pub fn from_controller(controller: ReplayController, scheduler: S) -> Self {
        let id = new_session_id();
        tracing::info!(
            session_id = %id,
            total_steps = controller.total_steps(),
            "Replay session started"
        );

        let mut session = Self {
            id,
            controller: Arc::new(Mutex::new(controller)),
            scheduler,
            armed: None,
        };
        session.sync_scheduler();
        session
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access for hosts that drive a manual scheduler themselves.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Read controller state under the lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&ReplayController) -> R) -> R {
        f(&lock(&self.controller))
    }

    fn apply<R>(&mut self, f: impl FnOnce(&mut ReplayController) -> R) -> R {
        let result = f(&mut lock(&self.controller));
        self.sync_scheduler();
        result
    }

    fn sync_scheduler(&mut self) {
        let (playing, epoch, period) = self.inspect(|c| {
            (c.is_playing(), c.playback_epoch(), c.tick_interval())
        });

        if !playing {
            if self.armed.take().is_some() || self.scheduler.is_active() {
                self.scheduler.stop();
            }
            return;
        }

        match self.armed {
            Some(armed) if armed.epoch == epoch && self.scheduler.is_active() => {
                if armed.period != period {
                    self.scheduler.reschedule(period);
                    self.armed = Some(Armed { epoch, period });
                    tracing::debug!(
                        session_id = %self.id,
                        period_ms = period.as_millis() as u64,
                        "Playback rescheduled"
                    );
                }
            }
            _ => {
                self.scheduler.stop();
                self.scheduler.start(period, self.tick_fn(epoch));
                self.armed = Some(Armed { epoch, period });
            }
        }
    }

    fn tick_fn(&self, epoch: u64) -> TickFn {
        let controller = Arc::clone(&self.controller);
        let id = self.id;
        Arc::new(move || {
            let mut controller = lock(&controller);
            match controller.tick(epoch) {
                TickOutcome::Advanced(index) => {
                    tracing::trace!(session_id = %id, index, "Playback tick");
                    TickControl::Continue
                }
                TickOutcome::Finished => {
                    tracing::info!(
                        session_id = %id,
                        index = controller.current_step_index(),
                        "Playback reached the last step"
                    );
                    TickControl::Stop
                }
                TickOutcome::Stale => TickControl::Stop,
            }
        })
    }

    // === Playback ===

    pub fn play(&mut self) {
        let index = self.apply(|c| {
            c.play();
            c.current_step_index()
        });
        tracing::info!(session_id = %self.id, index, "Playback started");
    }

    pub fn pause(&mut self) {
        let index = self.apply(|c| {
            c.pause();
            c.current_step_index()
        });
        tracing::info!(session_id = %self.id, index, "Playback paused");
    }

    /// Play when paused, pause when playing. Returns the new playing state.
    pub fn toggle_playback(&mut self) -> bool {
        let playing = self.apply(|c| {
            c.toggle_playback();
            c.is_playing()
        });
        tracing::info!(session_id = %self.id, playing, "Playback toggled");
        playing
    }

    pub fn set_playback_speed(&mut self, speed: f64) -> f64 {
        let effective = self.apply(|c| c.set_playback_speed(speed));
        tracing::debug!(session_id = %self.id, requested = speed, effective, "Playback speed set");
        effective
    }

    // === Navigation ===

    pub fn step_forward(&mut self) -> usize {
        self.apply(|c| {
            c.step_forward();
            c.current_step_index()
        })
    }

    pub fn step_backward(&mut self) -> usize {
        self.apply(|c| {
            c.step_backward();
            c.current_step_index()
        })
    }

    pub fn jump_to_step(&mut self, index: i64) -> usize {
        let landed = self.apply(|c| c.jump_to_step(index));
        tracing::debug!(session_id = %self.id, requested = index, landed, "Seek");
        landed
    }

    pub fn jump_to_agent(&mut self, role: &str) -> JumpOutcome {
        let outcome = self.apply(|c| c.jump_to_agent(role));
        tracing::debug!(session_id = %self.id, role, ?outcome, "Jump to agent");
        outcome
    }

    pub fn jump_to_next_error(&mut self) -> JumpOutcome {
        let outcome = self.apply(|c| c.jump_to_next_error());
        tracing::debug!(session_id = %self.id, ?outcome, "Jump to next error");
        outcome
    }

    pub fn reset(&mut self) {
        self.apply(|c| c.reset());
        tracing::debug!(session_id = %self.id, "Replay reset");
    }

    /// Restore a saved cursor and speed, leaving playback paused.
    pub fn restore(&mut self, index: usize, speed: f64) -> usize {
        let target = i64::try_from(index).unwrap_or(i64::MAX);
        self.apply(|c| {
            c.set_playback_speed(speed);
            c.jump_to_step(target)
        })
    }

    // === Sources ===

    /// Hand new sources to the controller. Returns whether it rebuilt.
    pub fn update_sources(&mut self, sources: RunSources) -> bool {
        let (rebuilt, total_steps, index) = self.apply(|c| {
            let rebuilt = c.update_sources(sources);
            (rebuilt, c.total_steps(), c.current_step_index())
        });
        if rebuilt {
            tracing::debug!(session_id = %self.id, total_steps, index, "Timeline rebuilt");
        }
        rebuilt
    }

    // === Views ===

    pub fn snapshot(&self) -> ReplaySnapshot {
        self.inspect(|c| c.snapshot())
    }

    pub fn step_counts(&self) -> StepCounts {
        self.inspect(|c| c.step_counts())
    }

    pub fn export(&self, run_id: &str, exported_at: Timestamp) -> ReplayExport {
        self.inspect(|c| c.export(run_id, exported_at))
    }
}

impl<S: TickScheduler> Drop for ReplaySession<S> {
    fn drop(&mut self) {
        self.scheduler.stop();
        tracing::info!(session_id = %self.id, "Replay session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use rewind_test_utils::fixtures::sequential_memory_run;

    fn session(steps: usize) -> ReplaySession<ManualScheduler> {
        ReplaySession::new(
            ReplayConfig::default(),
            sequential_memory_run(steps).into_sources(),
            ManualScheduler::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_play_arms_and_pause_stops() {
        let mut s = session(5);
        assert!(!s.scheduler().is_active());

        s.play();
        assert!(s.scheduler().is_active());
        assert_eq!(s.scheduler().period(), Some(Duration::from_secs(1)));

        s.pause();
        assert!(!s.scheduler().is_active());
        assert_eq!(s.scheduler_mut().fire(), None);
        assert_eq!(s.snapshot().current_step_index, 0);
    }

    #[test]
    fn test_ticks_run_to_the_end() {
        let mut s = session(4);
        s.play();
        assert_eq!(s.scheduler_mut().run(100), 3);

        let snapshot = s.snapshot();
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.current_step_index, 3);
        assert!(!s.scheduler().is_active());
    }

    #[test]
    fn test_speed_change_reschedules() {
        let mut s = session(4);
        s.play();
        s.set_playback_speed(2.0);
        assert_eq!(s.scheduler().starts(), 1);
        assert_eq!(s.scheduler().reschedules(), 1);
        assert_eq!(s.scheduler().period(), Some(Duration::from_millis(500)));

        s.set_playback_speed(2.0);
        assert_eq!(s.scheduler().reschedules(), 1);
    }

    #[test]
    fn test_speed_change_while_paused_does_not_arm() {
        let mut s = session(4);
        s.set_playback_speed(4.0);
        assert!(!s.scheduler().is_active());

        s.play();
        assert_eq!(s.scheduler().period(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_seek_cancels_timer() {
        let mut s = session(6);
        s.play();
        s.jump_to_step(3);
        assert!(!s.scheduler().is_active());
        assert!(!s.snapshot().is_playing);
    }

    #[test]
    fn test_no_match_jump_keeps_timer() {
        let mut s = session(3);
        s.play();
        assert_eq!(s.jump_to_agent("nonexistent"), JumpOutcome::NoMatch);
        assert!(s.scheduler().is_active());
        assert_eq!(s.scheduler().starts(), 1);
    }

    #[test]
    fn test_replay_after_finish_rearms() {
        let mut s = session(2);
        s.play();
        s.scheduler_mut().run(10);
        assert!(!s.snapshot().is_playing);

        s.play();
        assert_eq!(s.snapshot().current_step_index, 0);
        assert!(s.scheduler().is_active());
        assert_eq!(s.scheduler().starts(), 2);
    }

    #[test]
    fn test_rebuild_while_playing_keeps_timer() {
        let mut s = session(3);
        s.play();
        assert!(s.update_sources(sequential_memory_run(8).into_sources()));
        assert!(s.scheduler().is_active());
        assert_eq!(s.scheduler().starts(), 1);
        assert_eq!(s.scheduler_mut().run(100), 7);
        assert_eq!(s.snapshot().current_step_index, 7);
    }

    #[test]
    fn test_restore_applies_cursor_and_speed() {
        let mut s = session(5);
        assert_eq!(s.restore(99, 0.5), 4);
        let snapshot = s.snapshot();
        assert_eq!(snapshot.playback_speed, 0.5);
        assert!(!snapshot.is_playing);
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(session(1).id(), session(1).id());
    }
}
