//! Transcode run lifecycle.
//!
//! Argument assembly, child process supervision, progress parsing and the
//! partial-output cleanup policy. One [`Transcoder`] instance is one run;
//! a queue of transcodes is a sequence of independent instances.

mod progress;
mod runner;
mod types;

pub use progress::ProgressTracker;
pub use runner::Transcoder;
pub use types::{Outcome, Progress, StatusCallback, TranscodeEvent};
