//! REWIND Player - Replay Controller and Playback
//!
//! The synchronous [`ReplayController`] holds cursor and playback state over
//! a built timeline. A [`ReplaySession`] pairs it with a [`TickScheduler`]
//! that drives autoplay, and cancels that scheduler when playback stops or
//! the session is dropped.
//!
//! ```ignore
//! let scheduler = TokioScheduler::new()?;
//! let mut session = ReplaySession::new(ReplayConfig::default(), sources, scheduler)?;
//! session.set_playback_speed(2.0);
//! session.play();
//! ```

pub mod controller;
pub mod error;
pub mod scheduler;
pub mod session;

pub use controller::{JumpOutcome, ReplayController, ReplaySnapshot, TickOutcome};
pub use error::{PlayerError, PlayerResult};
pub use scheduler::{ManualScheduler, TickControl, TickFn, TickScheduler, TokioScheduler};
pub use session::{new_session_id, ReplaySession, SessionId};
