//! Incremental progress parsing for a running encode.

use crate::protocol::parse_progress_record;

use super::types::Progress;

/// Accumulates progress from encoder output lines.
///
/// Only `{`-prefixed lines carry progress records; anything else is
/// status text and leaves the state untouched. The encoder never
/// announces the first-to-second pass transition of a two-pass run, so it
/// is inferred: while `pass` is 0, the first record leaving a positive
/// audio or video bitrate advances it to 1, and it never reverts.
pub struct ProgressTracker {
    progress: Progress,
}

impl ProgressTracker {
    /// Tracker for a new run; `two_pass` starts the pass counter at 0.
    pub fn new(two_pass: bool) -> Self {
        Self {
            progress: Progress {
                pass: if two_pass { 0 } else { -1 },
                ..Progress::default()
            },
        }
    }

    /// Current progress snapshot.
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Feed one output line; returns the snapshot after applying it.
    pub fn ingest(&mut self, line: &str) -> Progress {
        let line = line.trim();
        if line.starts_with('{') {
            let fields = parse_progress_record(line);
            if let Some(v) = fields.get("duration") {
                self.progress.duration = *v;
            }
            if let Some(v) = fields.get("position") {
                self.progress.position = *v;
            }
            if let Some(v) = fields.get("remaining") {
                self.progress.eta = *v;
            }
            if let Some(v) = fields.get("audio_kbps") {
                self.progress.audio_kbps = *v;
            }
            if let Some(v) = fields.get("video_kbps") {
                self.progress.video_kbps = *v;
            }
            if self.progress.pass == 0
                && (self.progress.audio_kbps > 0.0 || self.progress.video_kbps > 0.0)
            {
                self.progress.pass = 1;
            }
        }
        self.progress
    }
}
