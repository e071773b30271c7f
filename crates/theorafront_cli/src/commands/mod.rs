//! CLI subcommand implementations.

pub mod encode;
pub mod info;

/// Format seconds as H:MM:SS.
pub(crate) fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
