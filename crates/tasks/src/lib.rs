//! Frame scheduling: listeners invoked once per frame by a central loop.
//!
//! # Invariants
//! - Listeners run in registration order and to completion.
//! - A listener leaves the manager only by returning `FrameControl::Stop`
//!   or by explicit removal.
//! - Intervals are pure functions of time; playing one twice at the same
//!   time yields the same scene state.
//! - Each pass of a looped sequence starts from the state the previous pass
//!   ended in, however coarse the frames.

mod animation;
mod interval;
mod task;

pub use animation::ActorAnimator;
pub use interval::{LerpInterval, LerpProperty, PlayMode, Sequence, SequencePlayer};
pub use task::{FrameContext, FrameControl, FrameListener, FrameTime, TaskError, TaskManager};
