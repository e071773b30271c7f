//! Media description records produced by a probe.
//!
//! Numeric fields use `-1` for "unknown"; the encoder's info output only
//! mentions what it could determine. Text fields that may be fractions
//! (frame rate, aspect ratios) are kept as raw strings.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One audio stream as reported by the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStream {
    /// Stream index as reported by the encoder.
    pub id: i32,
    /// Codec name, e.g. "vorbis" or "mp3".
    pub codec: String,
    /// Stream bitrate in kbit/s.
    pub bitrate: f64,
    /// Sample rate in Hz.
    pub sample_rate: i32,
    /// Channel count.
    pub channels: i32,
}

impl Default for AudioStream {
    fn default() -> Self {
        Self {
            id: -1,
            codec: String::new(),
            bitrate: -1.0,
            sample_rate: -1,
            channels: -1,
        }
    }
}

/// One video stream as reported by the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    /// Stream index as reported by the encoder.
    pub id: i32,
    /// Codec name, e.g. "theora" or "h264".
    pub codec: String,
    /// Stream bitrate in kbit/s.
    pub bitrate: f64,
    /// Pixel format, e.g. "yuv420p".
    pub pixel_format: String,
    /// Frame width in pixels.
    pub width: i32,
    /// Frame height in pixels.
    pub height: i32,
    /// Frame rate as reported, possibly a fraction like "30000/1001".
    pub frame_rate: String,
    /// Pixel aspect ratio as reported.
    pub pixel_aspect_ratio: String,
    /// Display aspect ratio as reported.
    pub display_aspect_ratio: String,
}

impl Default for VideoStream {
    fn default() -> Self {
        Self {
            id: -1,
            codec: String::new(),
            bitrate: -1.0,
            pixel_format: String::new(),
            width: -1,
            height: -1,
            frame_rate: String::new(),
            pixel_aspect_ratio: String::new(),
            display_aspect_ratio: String::new(),
        }
    }
}

/// Everything the encoder reports about one input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Container duration in seconds.
    pub duration: f64,
    /// Overall bitrate in kbit/s.
    pub bitrate: f64,
    /// File size in bytes.
    pub size: i64,
    /// Audio streams in reported order.
    pub audio_streams: Vec<AudioStream>,
    /// Video streams in reported order.
    pub video_streams: Vec<VideoStream>,
}

impl Default for MediaInfo {
    fn default() -> Self {
        Self {
            duration: -1.0,
            bitrate: -1.0,
            size: -1,
            audio_streams: Vec::new(),
            video_streams: Vec::new(),
        }
    }
}

impl MediaInfo {
    /// Whether the file has at least one audio stream.
    pub fn has_audio(&self) -> bool {
        !self.audio_streams.is_empty()
    }

    /// Whether the file has at least one video stream.
    pub fn has_video(&self) -> bool {
        !self.video_streams.is_empty()
    }
}

/// Errors from probing a file.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The encoder process could not be launched.
    #[error("failed to launch {tool}: {source}")]
    StartFailed {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The encoder ran but rejected the input (nonzero or abnormal exit).
    #[error("{tool} exited with status {code:?} while probing {path:?}")]
    ExitFailure {
        tool: String,
        path: PathBuf,
        code: Option<i32>,
    },

    /// Reading the encoder's output failed.
    #[error("failed to read probe output: {0}")]
    Io(#[from] io::Error),
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;
