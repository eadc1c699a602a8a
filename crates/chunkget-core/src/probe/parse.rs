//! Parse HTTP response header lines into ResourceMetadata.

use super::ResourceMetadata;

/// Header names match case-insensitively, and so does the `bytes` token
/// (range units are case-insensitive tokens). When `Accept-Ranges` repeats,
/// the first occurrence decides.
pub(crate) fn parse_headers(lines: &[String]) -> ResourceMetadata {
    let mut total_size = 0;
    let mut accept_ranges: Option<bool> = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                total_size = value.parse::<u64>().unwrap_or(0);
            }
            if name.eq_ignore_ascii_case("accept-ranges") && accept_ranges.is_none() {
                accept_ranges = Some(value.eq_ignore_ascii_case("bytes"));
            }
        }
    }

    ResourceMetadata {
        total_size,
        supports_range: accept_ranges.unwrap_or(false),
    }
}
