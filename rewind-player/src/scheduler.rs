//! Autoplay tick scheduling
//!
//! A [`TickScheduler`] fires a callback at a fixed period until stopped or
//! until the callback returns [`TickControl::Stop`]. The session arms it when
//! playback starts and cancels it on pause, seek and teardown.

use crate::error::{PlayerError, PlayerResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// What the scheduler should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Callback invoked on every tick.
pub type TickFn = Arc<dyn Fn() -> TickControl + Send + Sync>;

/// Recurring timer with explicit start/stop/reschedule.
pub trait TickScheduler: Send {
    /// Arm the timer, replacing any running one. The first tick fires one
    /// `period` after this call.
    fn start(&mut self, period: Duration, on_tick: TickFn);

    /// Cancel the timer. No tick fires after this returns.
    fn stop(&mut self);

    /// Re-arm the current callback with a new period.
    fn reschedule(&mut self, period: Duration);

    fn is_active(&self) -> bool;

    /// Period of the armed timer, if any.
    fn period(&self) -> Option<Duration>;
}

// ============================================================================
// TOKIO SCHEDULER
// ============================================================================

/// Drives ticks from a spawned tokio task.
pub struct TokioScheduler {
    handle: Handle,
    task: Option<JoinHandle<()>>,
    on_tick: Option<TickFn>,
    period: Option<Duration>,
}

impl TokioScheduler {
    /// Bind to the runtime of the calling context.
    pub fn new() -> PlayerResult<Self> {
        Handle::try_current()
            .map(Self::with_handle)
            .map_err(|_| PlayerError::NoRuntime)
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            task: None,
            on_tick: None,
            period: None,
        }
    }
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("active", &self.is_active())
            .field("period", &self.period)
            .finish()
    }
}

impl TickScheduler for TokioScheduler {
    fn start(&mut self, period: Duration, on_tick: TickFn) {
        self.stop();

        let tick = Arc::clone(&on_tick);
        let task = self.handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tick() == TickControl::Stop {
                    break;
                }
            }
        });

        self.task = Some(task);
        self.on_tick = Some(on_tick);
        self.period = Some(period);
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.on_tick = None;
        self.period = None;
    }

    fn reschedule(&mut self, period: Duration) {
        if let Some(on_tick) = self.on_tick.clone() {
            self.start(period, on_tick);
        }
    }

    fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn period(&self) -> Option<Duration> {
        self.period
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// MANUAL SCHEDULER
// ============================================================================

/// Fires ticks only when asked to.
///
/// For hosts that run their own frame loop, and for tests.
#[derive(Default)]
pub struct ManualScheduler {
    on_tick: Option<TickFn>,
    period: Option<Duration>,
    starts: usize,
    reschedules: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire one tick. Returns `None` when nothing is armed.
    pub fn fire(&mut self) -> Option<TickControl> {
        let on_tick = self.on_tick.clone()?;
        let control = on_tick();
        if control == TickControl::Stop {
            self.on_tick = None;
            self.period = None;
        }
        Some(control)
    }

    /// Fire until the callback stops or `max` ticks ran. Returns ticks fired.
    pub fn run(&mut self, max: usize) -> usize {
        let mut fired = 0;
        while fired < max {
            match self.fire() {
                Some(TickControl::Continue) => fired += 1,
                Some(TickControl::Stop) => return fired + 1,
                None => break,
            }
        }
        fired
    }

    /// Number of times the timer was armed by `start`.
    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn reschedules(&self) -> usize {
        self.reschedules
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("active", &self.is_active())
            .field("period", &self.period)
            .field("starts", &self.starts)
            .field("reschedules", &self.reschedules)
            .finish()
    }
}

impl TickScheduler for ManualScheduler {
    fn start(&mut self, period: Duration, on_tick: TickFn) {
        self.on_tick = Some(on_tick);
        self.period = Some(period);
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.on_tick = None;
        self.period = None;
    }

    fn reschedule(&mut self, period: Duration) {
        if self.on_tick.is_some() {
            self.period = Some(period);
            self.reschedules += 1;
        }
    }

    fn is_active(&self) -> bool {
        self.on_tick.is_some()
    }

    fn period(&self) -> Option<Duration> {
        self.period
    }
}
