//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Front-end for the ffmpeg2theora video encoder.
#[derive(Debug, Parser)]
#[command(name = "theorafront", version, about)]
pub struct Cli {
    /// Path to the settings file.
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        default_value = ".config/theorafront.toml"
    )]
    pub config: PathBuf,

    /// Verbose diagnostics on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe a media file and print its stream layout.
    Info(InfoArgs),
    /// Transcode one or more files to Ogg Theora/Vorbis.
    Encode(EncodeArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// File to probe.
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Input file(s); each gets its own encoder run.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file (single input only); defaults to the input name with
    /// an .ogv extension in the configured output folder.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub encoding: EncodeFlags,
}

/// Encoder options forwarded to ffmpeg2theora.
///
/// These map one-to-one onto the encoder's own flags; the core passes
/// the rendered tokens through without interpreting them.
#[derive(Debug, Default, Args)]
pub struct EncodeFlags {
    /// Start encoding at this time offset (seconds).
    #[arg(long, value_name = "SECONDS")]
    pub starttime: Option<f64>,

    /// Stop encoding at this time offset (seconds).
    #[arg(long, value_name = "SECONDS")]
    pub endtime: Option<f64>,

    /// Keep audio/video in sync.
    #[arg(long)]
    pub sync: bool,

    /// Do not write an Ogg Skeleton track.
    #[arg(long)]
    pub no_skeleton: bool,

    /// Disable audio in the output.
    #[arg(long)]
    pub noaudio: bool,

    /// Disable video in the output.
    #[arg(long)]
    pub novideo: bool,

    /// Audio stream id to encode.
    #[arg(long, value_name = "ID")]
    pub audiostream: Option<i32>,

    /// Output channel count.
    #[arg(long, value_name = "N")]
    pub channels: Option<i32>,

    /// Output sample rate in Hz.
    #[arg(long, value_name = "HZ")]
    pub samplerate: Option<i32>,

    /// Vorbis quality (-2..10).
    #[arg(long, value_name = "QUALITY", allow_hyphen_values = true)]
    pub audioquality: Option<f64>,

    /// Audio bitrate in kbit/s.
    #[arg(long, value_name = "KBPS")]
    pub audiobitrate: Option<i32>,

    /// Video stream id to encode.
    #[arg(long, value_name = "ID")]
    pub videostream: Option<i32>,

    /// Theora quality (0..10).
    #[arg(long, value_name = "QUALITY")]
    pub videoquality: Option<i32>,

    /// Video bitrate in kbit/s.
    #[arg(long, value_name = "KBPS")]
    pub videobitrate: Option<i32>,

    /// Two-pass encoding.
    #[arg(long)]
    pub two_pass: bool,

    /// Keep the video bitrate a soft target (with --videobitrate).
    #[arg(long)]
    pub soft_target: bool,

    /// Output width in pixels.
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<i32>,

    /// Output height in pixels.
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<i32>,

    /// Crop this many pixels from the top.
    #[arg(long, value_name = "PIXELS")]
    pub croptop: Option<i32>,

    /// Crop this many pixels from the bottom.
    #[arg(long, value_name = "PIXELS")]
    pub cropbottom: Option<i32>,

    /// Crop this many pixels from the left.
    #[arg(long, value_name = "PIXELS")]
    pub cropleft: Option<i32>,

    /// Crop this many pixels from the right.
    #[arg(long, value_name = "PIXELS")]
    pub cropright: Option<i32>,

    /// Optimize the encode (slower).
    #[arg(long)]
    pub optimize: bool,

    /// Force deinterlacing.
    #[arg(long)]
    pub deinterlace: bool,

    /// Output display aspect ratio, e.g. 16:9.
    #[arg(long, value_name = "RATIO")]
    pub aspect: Option<String>,

    /// Override the input frame rate.
    #[arg(long, value_name = "FPS")]
    pub inputfps: Option<String>,

    /// Output frame rate.
    #[arg(long, value_name = "FPS")]
    pub framerate: Option<String>,

    /// Contrast correction (0.1..10.0).
    #[arg(long, value_name = "VALUE")]
    pub contrast: Option<f64>,

    /// Brightness correction (-1.0..1.0).
    #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
    pub brightness: Option<f64>,

    /// Gamma correction (0.1..10.0).
    #[arg(long, value_name = "VALUE")]
    pub gamma: Option<f64>,

    /// Saturation correction (0.1..10.0).
    #[arg(long, value_name = "VALUE")]
    pub saturation: Option<f64>,

    /// Keyframe interval in frames.
    #[arg(long, value_name = "FRAMES")]
    pub keyint: Option<i32>,

    /// Input format name, when the encoder can't detect it.
    #[arg(long, value_name = "NAME")]
    pub format: Option<String>,

    /// Rate-control buffer delay in frames.
    #[arg(long, value_name = "FRAMES")]
    pub buf_delay: Option<i32>,

    /// Artist metadata tag.
    #[arg(long, value_name = "TEXT")]
    pub artist: Option<String>,

    /// Title metadata tag.
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Date metadata tag.
    #[arg(long, value_name = "TEXT")]
    pub date: Option<String>,

    /// Location metadata tag.
    #[arg(long, value_name = "TEXT")]
    pub location: Option<String>,

    /// Organization metadata tag.
    #[arg(long, value_name = "TEXT")]
    pub organization: Option<String>,

    /// Copyright metadata tag.
    #[arg(long, value_name = "TEXT")]
    pub copyright: Option<String>,

    /// License metadata tag.
    #[arg(long, value_name = "TEXT")]
    pub license: Option<String>,

    /// Contact metadata tag.
    #[arg(long, value_name = "TEXT")]
    pub contact: Option<String>,
}
