//! Assembly of the encoder's option tokens.
//!
//! The core passes these through untouched; what each flag means is the
//! encoder's business, so this stays a flat flag-to-token mapping.

use theorafront_core::config::Settings;

use crate::args::EncodeFlags;

/// Render the user's choices into the encoder's argument tokens.
///
/// Settings supply defaults for the few flags they cover (currently
/// two-pass); an explicit flag always wins.
pub fn build_encoder_args(flags: &EncodeFlags, settings: &Settings) -> Vec<String> {
    let mut args = Vec::new();

    push_value(&mut args, "--starttime", flags.starttime.as_ref());
    push_value(&mut args, "--endtime", flags.endtime.as_ref());
    push_flag(&mut args, "--sync", flags.sync);
    push_flag(&mut args, "--no-skeleton", flags.no_skeleton);

    push_flag(&mut args, "--noaudio", flags.noaudio);
    push_value(&mut args, "--audiostream", flags.audiostream.as_ref());
    push_value(&mut args, "--channels", flags.channels.as_ref());
    push_value(&mut args, "--samplerate", flags.samplerate.as_ref());
    push_value(&mut args, "--audioquality", flags.audioquality.as_ref());
    push_value(&mut args, "--audiobitrate", flags.audiobitrate.as_ref());

    push_flag(&mut args, "--novideo", flags.novideo);
    push_value(&mut args, "--videostream", flags.videostream.as_ref());
    push_value(&mut args, "--videoquality", flags.videoquality.as_ref());
    push_value(&mut args, "--videobitrate", flags.videobitrate.as_ref());
    push_flag(
        &mut args,
        "--two-pass",
        flags.two_pass || settings.encoding.two_pass,
    );
    push_flag(&mut args, "--soft-target", flags.soft_target);

    push_value(&mut args, "--width", flags.width.as_ref());
    push_value(&mut args, "--height", flags.height.as_ref());
    push_value(&mut args, "--croptop", flags.croptop.as_ref());
    push_value(&mut args, "--cropbottom", flags.cropbottom.as_ref());
    push_value(&mut args, "--cropleft", flags.cropleft.as_ref());
    push_value(&mut args, "--cropright", flags.cropright.as_ref());
    push_flag(&mut args, "--optimize", flags.optimize);
    push_flag(&mut args, "--deinterlace", flags.deinterlace);
    push_value(&mut args, "--aspect", flags.aspect.as_ref());
    push_value(&mut args, "--inputfps", flags.inputfps.as_ref());
    push_value(&mut args, "--framerate", flags.framerate.as_ref());
    push_value(&mut args, "--contrast", flags.contrast.as_ref());
    push_value(&mut args, "--brightness", flags.brightness.as_ref());
    push_value(&mut args, "--gamma", flags.gamma.as_ref());
    push_value(&mut args, "--saturation", flags.saturation.as_ref());
    push_value(&mut args, "--keyint", flags.keyint.as_ref());
    push_value(&mut args, "--format", flags.format.as_ref());
    push_value(&mut args, "--buf-delay", flags.buf_delay.as_ref());

    push_value(&mut args, "--artist", flags.artist.as_ref());
    push_value(&mut args, "--title", flags.title.as_ref());
    push_value(&mut args, "--date", flags.date.as_ref());
    push_value(&mut args, "--location", flags.location.as_ref());
    push_value(&mut args, "--organization", flags.organization.as_ref());
    push_value(&mut args, "--copyright", flags.copyright.as_ref());
    push_value(&mut args, "--license", flags.license.as_ref());
    push_value(&mut args, "--contact", flags.contact.as_ref());

    args
}

fn push_flag(args: &mut Vec<String>, flag: &str, on: bool) {
    if on {
        args.push(flag.to_string());
    }
}

fn push_value<T: ToString>(args: &mut Vec<String>, flag: &str, value: Option<&T>) {
    if let Some(value) = value {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}
