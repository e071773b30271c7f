//! Parsing for the encoder's line-oriented frontend protocol.
//!
//! `ffmpeg2theora` reports file info and progress as lines of loosely
//! JSON-shaped text: either a single `"key": "value",` pair, or a one-line
//! `{...}` record of comma-separated pairs. The format is not actual JSON
//! (bare numbers, trailing commas, no nesting), so it is decoded by hand.
//! Malformed input is dropped, never an error.

use std::collections::HashMap;

/// Strip one trailing `c` from a trimmed view of `s`.
fn untail(s: &str, c: char) -> &str {
    let t = s.trim();
    t.strip_suffix(c).unwrap_or(t)
}

/// Strip one matching pair of surrounding double quotes.
fn unquote(s: &str) -> &str {
    let t = s.trim();
    t.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(t)
}

/// Decode one `"key": "value",` line.
///
/// Surrounding whitespace, one trailing comma and the quotes around the
/// key and value are all optional. Returns `None` when the line has no
/// `": "` separator or splits into more than two parts. Values are not
/// unescaped beyond quote stripping.
pub fn parse_pair(line: &str) -> Option<(String, String)> {
    let line = untail(line, ',');
    let parts: Vec<&str> = line.split(": ").collect();
    if parts.len() != 2 {
        return None;
    }
    Some((unquote(parts[0]).to_string(), unquote(parts[1]).to_string()))
}

/// Decode a one-line `{...}` progress record into its numeric fields.
///
/// The line is split on `{`, `,` and `}`; each fragment is decoded like a
/// pair line. Fragments that are not pairs are skipped, and a value that
/// does not parse as a number maps to the `-1.0` sentinel. Fields the
/// record does not mention are simply absent.
pub fn parse_progress_record(line: &str) -> HashMap<String, f64> {
    let mut fields = HashMap::new();
    for fragment in line.split(['{', ',', '}']) {
        if fragment.trim().is_empty() {
            continue;
        }
        if let Some((key, value)) = parse_pair(fragment) {
            fields.insert(key, value.parse().unwrap_or(-1.0));
        }
    }
    fields
}
