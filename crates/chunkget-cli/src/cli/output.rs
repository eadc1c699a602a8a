//! Output filename derived from the URL.

use percent_encoding::percent_decode_str;

/// Used when the URL path has no usable last segment.
pub const FALLBACK_OUTPUT_NAME: &str = "index.html";

/// Last non-empty path segment of `url`, or [`FALLBACK_OUTPUT_NAME`] for a
/// root/empty path or a `.`/`..` segment. The segment is percent-decoded;
/// query and fragment are ignored.
pub fn default_output_name(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or("").to_string(),
    };
    let segment = path
        .split('/')
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned());
    match segment {
        Some(s) if !s.is_empty() && s != "." && s != ".." && !s.contains('/') => s,
        _ => FALLBACK_OUTPUT_NAME.to_string(),
    }
}
