//! `theorafront encode` - run the encoder with live progress.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{bail, Result};

use theorafront_core::config::Settings;
use theorafront_core::tool;
use theorafront_core::transcode::{Outcome, TranscodeEvent, Transcoder};

use crate::args::EncodeArgs;
use crate::options::build_encoder_args;

use super::format_time;

pub fn run(cmd: EncodeArgs, settings: &Settings) -> Result<()> {
    if cmd.output.is_some() && cmd.inputs.len() > 1 {
        bail!("--output is only valid with a single input");
    }

    let encoder = tool::locate_encoder(settings.tools.encoder_override());
    let args = build_encoder_args(&cmd.encoding, settings);

    let mut failures = 0;
    for input in &cmd.inputs {
        let output = match &cmd.output {
            Some(path) => path.clone(),
            None => default_output(input, settings),
        };
        println!("{} -> {}", input.display(), output.display());
        if !encode_one(&encoder, input, &output, args.clone()) {
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} of {} runs failed", failures, cmd.inputs.len());
    }
    Ok(())
}

/// Run one transcode to completion; returns whether it succeeded.
fn encode_one(encoder: &Path, input: &Path, output: &Path, args: Vec<String>) -> bool {
    let (tx, rx) = mpsc::channel();
    let transcoder = Transcoder::new(
        encoder,
        input,
        output,
        args,
        Box::new(move |event| {
            let _ = tx.send(event);
        }),
    );
    transcoder.start();

    let mut result = None;
    for event in rx {
        match event {
            TranscodeEvent::Status { line, progress } => {
                if let Some(fraction) = progress.fraction() {
                    let eta = if progress.eta >= 0.0 {
                        format_time(progress.eta)
                    } else {
                        "-".to_string()
                    };
                    let pass = match progress.pass {
                        0 => " pass 1/2",
                        1 => " pass 2/2",
                        _ => "",
                    };
                    print!("\r{:5.1}%  eta {}{}   ", fraction * 100.0, eta, pass);
                    let _ = io::stdout().flush();
                } else if !line.is_empty() && !line.starts_with('{') {
                    println!("{}", line);
                }
            }
            TranscodeEvent::Finished { outcome, kept } => {
                result = Some((outcome, kept));
            }
        }
    }
    transcoder.wait();
    println!();

    match result {
        Some((Outcome::Completed, _)) => {
            println!(
                "Encoding finished successfully ({})",
                format_time(transcoder.elapsed())
            );
            true
        }
        Some((Outcome::Stopped, kept)) => {
            println!(
                "Encoding cancelled. Partial result {}",
                if kept { "kept" } else { "deleted" }
            );
            false
        }
        Some((Outcome::Failed, kept)) => {
            println!(
                "Encoding failed. Partial file {}",
                if kept { "kept" } else { "deleted" }
            );
            false
        }
        None => false,
    }
}

/// Default output: the input name with an .ogv extension, placed in the
/// configured output folder (next to the input when none is set).
fn default_output(input: &Path, settings: &Settings) -> PathBuf {
    if settings.paths.output_folder.is_empty() {
        input.with_extension("ogv")
    } else {
        let mut name = PathBuf::from(input.file_name().unwrap_or_default());
        name.set_extension("ogv");
        Path::new(&settings.paths.output_folder).join(name)
    }
}
