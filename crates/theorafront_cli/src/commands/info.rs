//! `theorafront info` - probe a file and print its stream layout.

use std::path::Path;

use anyhow::Result;

use theorafront_core::config::Settings;
use theorafront_core::probe::{FileProber, MediaInfo};
use theorafront_core::tool;

use crate::args::InfoArgs;

use super::format_time;

pub fn run(cmd: InfoArgs, settings: &Settings) -> Result<()> {
    let encoder = tool::locate_encoder(settings.tools.encoder_override());
    let prober = FileProber::new(encoder);
    let info = prober.retrieve(&cmd.file)?;
    print_info(&cmd.file, &info);
    Ok(())
}

fn print_info(path: &Path, info: &MediaInfo) {
    println!("{}", path.display());
    if info.duration >= 0.0 {
        println!("  duration: {}", format_time(info.duration));
    }
    if info.bitrate >= 0.0 {
        println!("  bitrate:  {:.1} kbit/s", info.bitrate);
    }
    if info.size >= 0 {
        println!("  size:     {} bytes", info.size);
    }

    for (i, video) in info.video_streams.iter().enumerate() {
        let mut details = vec![video.codec.clone()];
        if video.width >= 0 && video.height >= 0 {
            details.push(format!("{}x{}", video.width, video.height));
        }
        if !video.frame_rate.is_empty() {
            details.push(format!("{} fps", video.frame_rate));
        }
        if !video.display_aspect_ratio.is_empty() {
            details.push(video.display_aspect_ratio.clone());
        }
        if video.bitrate >= 0.0 {
            details.push(format!("{:.0} kbit/s", video.bitrate));
        }
        println!("  video #{}: {}", i, details.join(", "));
    }

    for (i, audio) in info.audio_streams.iter().enumerate() {
        let mut details = vec![audio.codec.clone()];
        if audio.sample_rate >= 0 {
            details.push(format!("{} Hz", audio.sample_rate));
        }
        if audio.channels >= 0 {
            details.push(format!("{} ch", audio.channels));
        }
        if audio.bitrate >= 0.0 {
            details.push(format!("{:.0} kbit/s", audio.bitrate));
        }
        println!("  audio #{}: {}", i, details.join(", "));
    }

    if !info.has_audio() && !info.has_video() {
        println!("  no streams reported");
    }
}
