//! Locating the ffmpeg2theora executable.

use std::env;
use std::path::{Path, PathBuf};

/// Base name of the encoder executable.
pub const ENCODER_NAME: &str = "ffmpeg2theora";

/// Resolve the encoder executable.
///
/// An explicit override (from configuration) wins; otherwise a copy
/// bundled next to the running executable is preferred, and failing
/// that the bare name is returned for `PATH` lookup at spawn time.
pub fn locate_encoder(override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        if !path.as_os_str().is_empty() {
            return path.to_path_buf();
        }
    }

    let name = format!("{}{}", ENCODER_NAME, env::consts::EXE_SUFFIX);
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            let bundled = dir.join(&name);
            if bundled.exists() {
                tracing::debug!("using bundled encoder at {}", bundled.display());
                return bundled;
            }
        }
    }

    PathBuf::from(name)
}
