//! The transcode process runner.
//!
//! One [`Transcoder`] owns one encoder run: it assembles the argument
//! vector, launches the child on a worker thread, feeds every output line
//! through the progress tracker and reports ordered events through the
//! caller's callback. `stop()` kills the child; the terminal event is
//! emitted once the child has actually exited.

use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::Mutex;

use super::progress::ProgressTracker;
use super::types::{Outcome, StatusCallback, TranscodeEvent};

/// Tells the encoder to emit machine-readable progress output.
const FRONTEND_FLAG: &str = "--frontend";

/// State shared between the owner and the worker thread.
struct Shared {
    stopping: AtomicBool,
    keep_on_stop: AtomicBool,
    child: Mutex<Option<Child>>,
}

/// Drives one encoder run; not reusable once started.
///
/// `start()` returns immediately and all further progress and the single
/// terminal notification arrive through the callback, in output order.
pub struct Transcoder {
    encoder: PathBuf,
    input: PathBuf,
    output: PathBuf,
    extra_args: Vec<String>,
    callback: Mutex<Option<StatusCallback>>,
    shared: Arc<Shared>,
    started: AtomicBool,
    started_at: Mutex<Option<Instant>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Transcoder {
    /// Create a transcoder for one input/output pair.
    ///
    /// `extra_args` are the caller's option tokens; they are passed to
    /// the encoder unmodified, between the frontend flag and the output
    /// path.
    pub fn new(
        encoder: impl Into<PathBuf>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        extra_args: Vec<String>,
        callback: StatusCallback,
    ) -> Self {
        Self {
            encoder: encoder.into(),
            input: input.into(),
            output: output.into(),
            extra_args,
            callback: Mutex::new(Some(callback)),
            shared: Arc::new(Shared {
                stopping: AtomicBool::new(false),
                keep_on_stop: AtomicBool::new(true),
                child: Mutex::new(None),
            }),
            started: AtomicBool::new(false),
            started_at: Mutex::new(None),
            worker: Mutex::new(None),
        }
    }

    /// Input file of this run.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Output file of this run.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Launch the encoder.
    ///
    /// Returns immediately; events arrive through the callback. A launch
    /// failure is reported as a status line plus a terminal `Failed`
    /// event. Calling `start` again (running or finished) does nothing.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("transcode already started, ignoring start()");
            return;
        }
        *self.started_at.lock() = Some(Instant::now());

        let callback = match self.callback.lock().take() {
            Some(callback) => callback,
            None => return,
        };

        let args = self.args();
        tracing::debug!("running {} {}", self.encoder.display(), args.join(" "));

        let encoder = self.encoder.clone();
        let output = self.output.clone();
        let two_pass = self.extra_args.iter().any(|a| a == "--two-pass");
        let shared = Arc::clone(&self.shared);

        let handle = thread::spawn(move || {
            run_encode(&encoder, &args, &output, two_pass, &shared, &callback);
        });
        *self.worker.lock() = Some(handle);
    }

    /// Argument vector: frontend flag, caller options, output, input.
    fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.extra_args.len() + 4);
        args.push(FRONTEND_FLAG.to_string());
        args.extend(self.extra_args.iter().cloned());
        args.push("--output".to_string());
        args.push(self.output.to_string_lossy().into_owned());
        args.push(self.input.to_string_lossy().into_owned());
        args
    }

    /// Request termination and return immediately.
    ///
    /// `keep` decides whether the partial output file survives once the
    /// run reports `Stopped`. A no-op when no encoder is running.
    pub fn stop(&self, keep: bool) {
        let mut child = self.shared.child.lock();
        if let Some(child) = child.as_mut() {
            self.shared.keep_on_stop.store(keep, Ordering::SeqCst);
            self.shared.stopping.store(true, Ordering::SeqCst);
            if let Err(e) = child.kill() {
                tracing::debug!("kill failed, child probably exited already: {}", e);
            }
        }
    }

    /// Seconds of wall-clock time since `start()`; 0 before that.
    pub fn elapsed(&self) -> f64 {
        let started_at = *self.started_at.lock();
        started_at.map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0)
    }

    /// Block until the run has emitted its terminal event.
    pub fn wait(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

/// Worker body: supervise the child and stream events to the callback.
fn run_encode(
    encoder: &Path,
    args: &[String],
    output: &Path,
    two_pass: bool,
    shared: &Shared,
    callback: &StatusCallback,
) {
    let mut tracker = ProgressTracker::new(two_pass);

    let spawned = Command::new(encoder)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!("failed to launch {}: {}", encoder.display(), e);
            callback(TranscodeEvent::Status {
                line: "Encoding failed to start".to_string(),
                progress: tracker.progress(),
            });
            callback(TranscodeEvent::Finished {
                outcome: Outcome::Failed,
                kept: false,
            });
            return;
        }
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    *shared.child.lock() = Some(child);

    // A stop() that raced the spawn is honored here.
    if shared.stopping.load(Ordering::SeqCst) {
        if let Some(child) = shared.child.lock().as_mut() {
            let _ = child.kill();
        }
    }

    // Both streams feed one channel; each reader preserves its own order.
    let (tx, rx) = mpsc::channel::<String>();
    let mut readers = Vec::new();
    if let Some(stream) = stdout {
        readers.push(spawn_line_reader(stream, tx.clone()));
    }
    if let Some(stream) = stderr {
        readers.push(spawn_line_reader(stream, tx.clone()));
    }
    drop(tx);

    for line in rx {
        let line = line.trim().to_string();
        let progress = tracker.ingest(&line);
        callback(TranscodeEvent::Status { line, progress });
    }
    for reader in readers {
        let _ = reader.join();
    }

    let reaped = shared.child.lock().take();
    let status = match reaped {
        Some(mut child) => child.wait(),
        None => return,
    };

    let (outcome, keep) = if shared.stopping.load(Ordering::SeqCst) {
        (Outcome::Stopped, shared.keep_on_stop.load(Ordering::SeqCst))
    } else {
        match status {
            Ok(status) if status.success() => (Outcome::Completed, true),
            Ok(status) => {
                tracing::warn!("encoder exited with {}", status);
                (Outcome::Failed, true)
            }
            Err(e) => {
                tracing::warn!("failed to reap encoder: {}", e);
                (Outcome::Failed, true)
            }
        }
    };

    let kept = if keep { true } else { remove_output(output) };
    callback(TranscodeEvent::Finished { outcome, kept });
}

/// Best-effort removal; returns whether the file is still there.
fn remove_output(output: &Path) -> bool {
    match fs::remove_file(output) {
        Ok(()) => false,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!(
                "could not remove partial output {}: {}",
                output.display(),
                e
            );
            true
        }
    }
}

/// Forward lines of one stream into the shared channel.
fn spawn_line_reader<R: Read + Send + 'static>(
    stream: R,
    tx: mpsc::Sender<String>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(stream).lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;

    fn collector() -> (StatusCallback, std_mpsc::Receiver<TranscodeEvent>) {
        let (tx, rx) = std_mpsc::channel();
        let callback: StatusCallback = Box::new(move |event| {
            let _ = tx.send(event);
        });
        (callback, rx)
    }

    #[test]
    fn args_order_is_flag_options_output_input() {
        let (callback, _rx) = collector();
        let t = Transcoder::new(
            "ffmpeg2theora",
            "in.avi",
            "out.ogv",
            vec!["--novideo".to_string()],
            callback,
        );
        assert_eq!(
            t.args(),
            vec!["--frontend", "--novideo", "--output", "out.ogv", "in.avi"]
        );
    }

    #[test]
    fn stop_before_start_is_noop() {
        let (callback, rx) = collector();
        let t = Transcoder::new("ffmpeg2theora", "in.avi", "out.ogv", Vec::new(), callback);
        t.stop(false);
        t.wait();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn failed_launch_reports_failed() {
        let (callback, rx) = collector();
        let t = Transcoder::new(
            "/nonexistent/ffmpeg2theora",
            "in.avi",
            "out.ogv",
            Vec::new(),
            callback,
        );
        t.start();
        t.wait();

        let events: Vec<_> = rx.iter().collect();
        assert!(matches!(
            events.first(),
            Some(TranscodeEvent::Status { line, .. }) if line == "Encoding failed to start"
        ));
        assert!(matches!(
            events.last(),
            Some(TranscodeEvent::Finished {
                outcome: Outcome::Failed,
                kept: false,
            })
        ));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::time::Duration;

        fn fake_encoder(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake2theora");
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            let mut perms = fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[test]
        fn completed_run_reports_progress_and_keeps_output() {
            let dir = tempfile::tempdir().unwrap();
            // args: --frontend --novideo --output <out> <in>; output is $4
            let encoder = fake_encoder(
                dir.path(),
                concat!(
                    ": > \"$4\"\n",
                    "printf '%s\\n' '{\"position\": 10, \"duration\": 125.4, \"audio_kbps\": 128}'\n",
                    "exit 0"
                ),
            );
            let output = dir.path().join("out.ogv");

            let (callback, rx) = collector();
            let t = Transcoder::new(
                &encoder,
                "in.avi",
                &output,
                vec!["--novideo".to_string()],
                callback,
            );
            t.start();
            t.wait();

            let events: Vec<_> = rx.iter().collect();
            let last_progress = events
                .iter()
                .filter_map(|e| match e {
                    TranscodeEvent::Status { progress, .. } => Some(*progress),
                    TranscodeEvent::Finished { .. } => None,
                })
                .last()
                .unwrap();
            assert_eq!(last_progress.position, 10.0);
            assert_eq!(last_progress.duration, 125.4);
            assert_eq!(last_progress.audio_kbps, 128.0);

            assert!(matches!(
                events.last(),
                Some(TranscodeEvent::Finished {
                    outcome: Outcome::Completed,
                    kept: true,
                })
            ));
            assert!(output.exists());
            assert!(t.elapsed() > 0.0);
        }

        #[test]
        fn nonzero_exit_reports_failed_and_keeps_partial() {
            let dir = tempfile::tempdir().unwrap();
            let encoder = fake_encoder(dir.path(), ": > \"$3\"\nexit 2");
            let output = dir.path().join("out.ogv");

            let (callback, rx) = collector();
            let t = Transcoder::new(&encoder, "in.avi", &output, Vec::new(), callback);
            t.start();
            t.wait();

            let events: Vec<_> = rx.iter().collect();
            assert!(matches!(
                events.last(),
                Some(TranscodeEvent::Finished {
                    outcome: Outcome::Failed,
                    kept: true,
                })
            ));
            assert!(output.exists());
        }

        #[test]
        fn stopped_run_deletes_output_when_asked() {
            let dir = tempfile::tempdir().unwrap();
            // create the output, then block until killed
            let encoder = fake_encoder(dir.path(), ": > \"$3\"\nexec sleep 30");
            let output = dir.path().join("out.ogv");

            let (callback, rx) = collector();
            let t = Transcoder::new(&encoder, "in.avi", &output, Vec::new(), callback);
            t.start();

            for _ in 0..250 {
                if output.exists() {
                    break;
                }
                thread::sleep(Duration::from_millis(20));
            }
            assert!(output.exists());

            t.stop(false);
            t.wait();

            let events: Vec<_> = rx.iter().collect();
            assert!(matches!(
                events.last(),
                Some(TranscodeEvent::Finished {
                    outcome: Outcome::Stopped,
                    kept: false,
                })
            ));
            assert!(!output.exists());
        }

        #[test]
        fn stopped_run_keeps_output_when_asked() {
            let dir = tempfile::tempdir().unwrap();
            let encoder = fake_encoder(dir.path(), ": > \"$3\"\nexec sleep 30");
            let output = dir.path().join("out.ogv");

            let (callback, rx) = collector();
            let t = Transcoder::new(&encoder, "in.avi", &output, Vec::new(), callback);
            t.start();

            for _ in 0..250 {
                if output.exists() {
                    break;
                }
                thread::sleep(Duration::from_millis(20));
            }

            t.stop(true);
            t.wait();

            let events: Vec<_> = rx.iter().collect();
            assert!(matches!(
                events.last(),
                Some(TranscodeEvent::Finished {
                    outcome: Outcome::Stopped,
                    kept: true,
                })
            ));
            assert!(output.exists());
        }

        #[test]
        fn second_start_is_ignored() {
            let dir = tempfile::tempdir().unwrap();
            let encoder = fake_encoder(
                dir.path(),
                "printf '%s\\n' 'one run'\nexit 0",
            );

            let (callback, rx) = collector();
            let t = Transcoder::new(
                &encoder,
                "in.avi",
                dir.path().join("out.ogv"),
                Vec::new(),
                callback,
            );
            t.start();
            t.start();
            t.wait();

            let events: Vec<_> = rx.iter().collect();
            let finishes = events
                .iter()
                .filter(|e| matches!(e, TranscodeEvent::Finished { .. }))
                .count();
            assert_eq!(finishes, 1);
        }
    }
}
