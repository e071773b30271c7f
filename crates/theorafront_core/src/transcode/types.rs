//! Event and progress types for transcode runs.

use serde::{Deserialize, Serialize};

/// Running progress parsed from the encoder's `{...}` records.
///
/// Every field starts at -1 and keeps its last reported value for the
/// rest of the run. `pass` is -1 for single-pass runs, 0 while the first
/// pass of a two-pass run produces no output and 1 once the second pass
/// has been inferred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Input duration in seconds.
    pub duration: f64,
    /// Position reached in the input, seconds.
    pub position: f64,
    /// Encoder's estimate of remaining time, seconds.
    pub eta: f64,
    /// Current audio bitrate in kbit/s.
    pub audio_kbps: f64,
    /// Current video bitrate in kbit/s.
    pub video_kbps: f64,
    /// Two-pass pass number (-1 single pass, 0 first, 1 second).
    pub pass: i32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            duration: -1.0,
            position: -1.0,
            eta: -1.0,
            audio_kbps: -1.0,
            video_kbps: -1.0,
            pass: -1,
        }
    }
}

impl Progress {
    /// Fraction of the input processed, when both ends are known.
    pub fn fraction(&self) -> Option<f64> {
        if self.duration > 0.0 && self.position >= 0.0 {
            Some((self.position / self.duration).min(1.0))
        } else {
            None
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The encoder exited cleanly with status 0.
    Completed,
    /// The encoder failed to start, crashed, or exited nonzero.
    Failed,
    /// The caller requested a stop.
    Stopped,
}

/// Events emitted during a run, in the order the lines were produced.
#[derive(Debug, Clone)]
pub enum TranscodeEvent {
    /// One line of encoder output plus the progress state after it.
    ///
    /// `{`-prefixed lines are decoded progress records; anything else is
    /// human-readable status text forwarded verbatim.
    Status { line: String, progress: Progress },
    /// Terminal event, emitted exactly once per run.
    ///
    /// `kept` reports whether the output file survived the cleanup
    /// policy: success always keeps it, a stop keeps it when the caller
    /// asked to, and a failure leaves the partial file for the caller.
    Finished { outcome: Outcome, kept: bool },
}

/// Callback receiving every event of one run.
///
/// Invoked by the run's single worker thread, one event at a time, so
/// delivery order matches output order. The callback decides how events
/// reach the caller's own execution context (channel, queued message,
/// direct rendering).
pub type StatusCallback = Box<dyn Fn(TranscodeEvent) + Send>;
