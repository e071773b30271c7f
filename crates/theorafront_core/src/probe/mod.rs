//! Media probing via the encoder's `--info` mode.
//!
//! The encoder prints a sequence of `"key": "value",` lines describing the
//! container and its streams. [`FileProber`] feeds them through a small
//! state machine: `audio` / `video` announce the kind of the next stream,
//! `codec` creates it, and later stream-level keys fill in the stream most
//! recently created. Older encoder builds collapse the first two steps
//! into `audio_codec` / `video_codec`; both encodings are accepted.
//! Unknown keys are skipped so newer encoder builds keep working.

mod types;

pub use types::{AudioStream, MediaInfo, ProbeError, ProbeResult, VideoStream};

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::protocol::parse_pair;

/// Probes input files by running the encoder in info mode.
pub struct FileProber {
    encoder: PathBuf,
}

impl FileProber {
    /// Create a prober that invokes the given encoder executable.
    pub fn new(encoder: impl Into<PathBuf>) -> Self {
        Self {
            encoder: encoder.into(),
        }
    }

    /// Run `<encoder> --info <path>` and collect the reported media info.
    ///
    /// Fails with [`ProbeError::StartFailed`] when the encoder cannot be
    /// launched and [`ProbeError::ExitFailure`] when it exits nonzero or
    /// crashes; a failed probe yields no media info. The child is killed
    /// if this call unwinds before the process is reaped.
    pub fn retrieve(&self, path: &Path) -> ProbeResult<MediaInfo> {
        tracing::debug!(
            "probing {} with {} --info",
            path.display(),
            self.encoder.display()
        );

        let child = Command::new(&self.encoder)
            .arg("--info")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ProbeError::StartFailed {
                tool: self.encoder.display().to_string(),
                source: e,
            })?;
        let mut child = KillOnDrop(child);

        let mut info = MediaInfo::default();
        let mut state = ParseState::new();

        if let Some(stdout) = child.0.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                let line = line?;
                if let Some((key, value)) = parse_pair(&line) {
                    state.apply(&mut info, &key, &value);
                }
            }
        }

        let status = child.0.wait()?;
        if !status.success() {
            return Err(ProbeError::ExitFailure {
                tool: self.encoder.display().to_string(),
                path: path.to_path_buf(),
                code: status.code(),
            });
        }

        tracing::debug!(
            "probe of {}: {} audio / {} video stream(s)",
            path.display(),
            info.audio_streams.len(),
            info.video_streams.len()
        );
        Ok(info)
    }
}

/// Kills the probe child if `retrieve` unwinds before reaping it.
struct KillOnDrop(Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

/// Stream kind announced by an `audio` / `video` key, pending creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    None,
    Audio,
    Video,
}

/// Cursor to the stream currently being populated.
///
/// An index into the owning vector rather than a reference, so the
/// growing sequences stay exclusively owned by the `MediaInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    None,
    Audio(usize),
    Video(usize),
}

/// Incremental parse state for one probe.
struct ParseState {
    pending: PendingKind,
    cursor: Cursor,
}

impl ParseState {
    fn new() -> Self {
        Self {
            pending: PendingKind::None,
            cursor: Cursor::None,
        }
    }

    /// Route one key/value pair into `info`.
    ///
    /// Pairs that don't apply in the current state (stream-level key with
    /// no matching stream, unknown key) are ignored.
    fn apply(&mut self, info: &mut MediaInfo, key: &str, value: &str) {
        match key {
            "audio" => self.pending = PendingKind::Audio,
            "video" => self.pending = PendingKind::Video,
            "codec" => match self.pending {
                PendingKind::Audio => self.push_audio(info, value),
                PendingKind::Video => self.push_video(info, value),
                PendingKind::None => {}
            },
            // combined kind+codec keys emitted by older encoder builds
            "audio_codec" => {
                self.pending = PendingKind::Audio;
                self.push_audio(info, value);
            }
            "video_codec" => {
                self.pending = PendingKind::Video;
                self.push_video(info, value);
            }

            "duration" => info.duration = parse_f64(value),
            "bitrate" => info.bitrate = parse_f64(value),
            "size" => info.size = parse_i64(value),

            "id" => match self.cursor {
                Cursor::Audio(i) => {
                    if let Some(s) = info.audio_streams.get_mut(i) {
                        s.id = parse_i32(value);
                    }
                }
                Cursor::Video(i) => {
                    if let Some(s) = info.video_streams.get_mut(i) {
                        s.id = parse_i32(value);
                    }
                }
                Cursor::None => {}
            },

            "samplerate" => {
                if let Some(s) = self.audio_mut(info) {
                    s.sample_rate = parse_i32(value);
                }
            }
            "channels" => {
                if let Some(s) = self.audio_mut(info) {
                    s.channels = parse_i32(value);
                }
            }
            "audio_bitrate" => {
                if let Some(s) = self.audio_mut(info) {
                    s.bitrate = parse_f64(value);
                }
            }

            "pixel_format" => {
                if let Some(s) = self.video_mut(info) {
                    s.pixel_format = value.to_string();
                }
            }
            "width" => {
                if let Some(s) = self.video_mut(info) {
                    s.width = parse_i32(value);
                }
            }
            "height" => {
                if let Some(s) = self.video_mut(info) {
                    s.height = parse_i32(value);
                }
            }
            "framerate" => {
                if let Some(s) = self.video_mut(info) {
                    s.frame_rate = value.to_string();
                }
            }
            "pixel_aspect_ratio" => {
                if let Some(s) = self.video_mut(info) {
                    s.pixel_aspect_ratio = value.to_string();
                }
            }
            "display_aspect_ratio" => {
                if let Some(s) = self.video_mut(info) {
                    s.display_aspect_ratio = value.to_string();
                }
            }
            "video_bitrate" => {
                if let Some(s) = self.video_mut(info) {
                    s.bitrate = parse_f64(value);
                }
            }

            _ => {}
        }
    }

    fn push_audio(&mut self, info: &mut MediaInfo, codec: &str) {
        info.audio_streams.push(AudioStream {
            codec: codec.to_string(),
            ..AudioStream::default()
        });
        self.cursor = Cursor::Audio(info.audio_streams.len() - 1);
    }

    fn push_video(&mut self, info: &mut MediaInfo, codec: &str) {
        info.video_streams.push(VideoStream {
            codec: codec.to_string(),
            ..VideoStream::default()
        });
        self.cursor = Cursor::Video(info.video_streams.len() - 1);
    }

    fn audio_mut<'a>(&self, info: &'a mut MediaInfo) -> Option<&'a mut AudioStream> {
        match self.cursor {
            Cursor::Audio(i) => info.audio_streams.get_mut(i),
            _ => None,
        }
    }

    fn video_mut<'a>(&self, info: &'a mut MediaInfo) -> Option<&'a mut VideoStream> {
        match self.cursor {
            Cursor::Video(i) => info.video_streams.get_mut(i),
            _ => None,
        }
    }
}

fn parse_f64(s: &str) -> f64 {
    s.parse().unwrap_or(-1.0)
}

fn parse_i64(s: &str) -> i64 {
    s.parse().unwrap_or(-1)
}

fn parse_i32(s: &str) -> i32 {
    s.parse().unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(pairs: &[(&str, &str)]) -> MediaInfo {
        let mut info = MediaInfo::default();
        let mut state = ParseState::new();
        for (key, value) in pairs {
            state.apply(&mut info, key, value);
        }
        info
    }

    #[test]
    fn fresh_info_is_unknown() {
        let info = MediaInfo::default();
        assert_eq!(info.duration, -1.0);
        assert_eq!(info.bitrate, -1.0);
        assert_eq!(info.size, -1);
        assert!(!info.has_audio());
        assert!(!info.has_video());
    }

    #[test]
    fn file_level_keys_create_no_streams() {
        let info = feed(&[
            ("duration", "125.40"),
            ("bitrate", "900.5"),
            ("size", "12345678"),
            ("width", "640"),
            ("samplerate", "44100"),
        ]);
        assert_eq!(info.duration, 125.40);
        assert_eq!(info.bitrate, 900.5);
        assert_eq!(info.size, 12345678);
        assert!(info.audio_streams.is_empty());
        assert!(info.video_streams.is_empty());
    }

    #[test]
    fn two_step_video_stream() {
        let info = feed(&[
            ("video", ""),
            ("codec", "theora"),
            ("width", "640"),
            ("height", "480"),
        ]);
        assert_eq!(info.video_streams.len(), 1);
        assert!(info.audio_streams.is_empty());
        let v = &info.video_streams[0];
        assert_eq!(v.codec, "theora");
        assert_eq!(v.width, 640);
        assert_eq!(v.height, 480);
    }

    #[test]
    fn combined_key_matches_two_step() {
        let two_step = feed(&[("video", ""), ("codec", "theora")]);
        let combined = feed(&[("video_codec", "theora")]);
        assert_eq!(two_step, combined);
    }

    #[test]
    fn codec_without_kind_is_ignored() {
        let info = feed(&[("codec", "theora")]);
        assert!(info.audio_streams.is_empty());
        assert!(info.video_streams.is_empty());
    }

    #[test]
    fn stream_keys_route_to_matching_kind_only() {
        let info = feed(&[
            ("audio_codec", "vorbis"),
            ("samplerate", "44100"),
            ("channels", "2"),
            ("width", "640"),
        ]);
        assert_eq!(info.audio_streams.len(), 1);
        let a = &info.audio_streams[0];
        assert_eq!(a.sample_rate, 44100);
        assert_eq!(a.channels, 2);
        // width had no video stream to land on
        assert!(info.video_streams.is_empty());
    }

    #[test]
    fn id_goes_to_current_stream() {
        let info = feed(&[
            ("audio_codec", "vorbis"),
            ("id", "1"),
            ("video_codec", "theora"),
            ("id", "0"),
        ]);
        assert_eq!(info.audio_streams[0].id, 1);
        assert_eq!(info.video_streams[0].id, 0);
    }

    #[test]
    fn multiple_streams_in_order() {
        let info = feed(&[
            ("audio", ""),
            ("codec", "vorbis"),
            ("audio", ""),
            ("codec", "mp3"),
            ("video_codec", "theora"),
        ]);
        assert_eq!(info.audio_streams.len(), 2);
        assert_eq!(info.audio_streams[0].codec, "vorbis");
        assert_eq!(info.audio_streams[1].codec, "mp3");
        assert_eq!(info.video_streams.len(), 1);
    }

    #[test]
    fn unknown_keys_and_bad_numbers_are_tolerated() {
        let info = feed(&[
            ("flavour", "strawberry"),
            ("video_codec", "theora"),
            ("width", "not-a-number"),
            ("framerate", "30000/1001"),
        ]);
        let v = &info.video_streams[0];
        assert_eq!(v.width, -1);
        assert_eq!(v.frame_rate, "30000/1001");
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};

        fn fake_encoder(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake2theora");
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            let mut perms = fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[test]
        fn retrieve_parses_info_output() {
            let dir = tempfile::tempdir().unwrap();
            let encoder = fake_encoder(
                dir.path(),
                concat!(
                    "printf '%s\\n' '\"duration\": \"125.40\",'\n",
                    "printf '%s\\n' '\"bitrate\": \"900.00\",'\n",
                    "printf '%s\\n' '\"size\": \"1048576\",'\n",
                    "printf '%s\\n' '\"audio_codec\": \"vorbis\",'\n",
                    "printf '%s\\n' '\"samplerate\": \"44100\",'\n",
                    "printf '%s\\n' '\"channels\": \"2\",'\n",
                    "printf '%s\\n' '\"video_codec\": \"theora\",'\n",
                    "printf '%s\\n' '\"width\": \"1280\",'\n",
                    "printf '%s\\n' '\"height\": \"720\",'\n",
                    "exit 0"
                ),
            );

            let info = FileProber::new(&encoder)
                .retrieve(Path::new("input.avi"))
                .unwrap();
            assert_eq!(info.duration, 125.40);
            assert_eq!(info.size, 1048576);
            assert_eq!(info.audio_streams.len(), 1);
            assert_eq!(info.audio_streams[0].sample_rate, 44100);
            assert_eq!(info.video_streams.len(), 1);
            assert_eq!(info.video_streams[0].width, 1280);
            assert_eq!(info.video_streams[0].height, 720);
        }

        #[test]
        fn nonzero_exit_is_failure() {
            let dir = tempfile::tempdir().unwrap();
            let encoder = fake_encoder(dir.path(), "printf '%s\\n' 'bogus'\nexit 1");

            let err = FileProber::new(&encoder)
                .retrieve(Path::new("input.avi"))
                .unwrap_err();
            assert!(matches!(err, ProbeError::ExitFailure { code: Some(1), .. }));
        }

        #[test]
        fn missing_encoder_is_start_failure() {
            let err = FileProber::new("/nonexistent/ffmpeg2theora")
                .retrieve(Path::new("input.avi"))
                .unwrap_err();
            assert!(matches!(err, ProbeError::StartFailed { .. }));
        }
    }
}
