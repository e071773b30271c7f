//! Settings struct with TOML-based sections.
//!
//! Every field is serde-defaulted so a partial or missing config file
//! still yields usable settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// External tool settings.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Encoding defaults.
    #[serde(default)]
    pub encoding: EncodingSettings,
}

/// Path configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for encoded output files; empty means "next to the input".
    #[serde(default)]
    pub output_folder: String,
}

/// External tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Path to the ffmpeg2theora executable; empty means auto-discovery.
    #[serde(default)]
    pub ffmpeg2theora: String,
}

impl ToolSettings {
    /// Configured encoder path, when one is set.
    pub fn encoder_override(&self) -> Option<&Path> {
        if self.ffmpeg2theora.is_empty() {
            None
        } else {
            Some(Path::new(&self.ffmpeg2theora))
        }
    }
}

/// Encoding defaults applied when no flag says otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// Default to two-pass encoding.
    #[serde(default)]
    pub two_pass: bool,
}
