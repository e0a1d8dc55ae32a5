//! Parse raw response header lines collected by curl.

use crate::http::Headers;

/// Headers of the final response. With redirects followed, curl reports every
/// hop's header block; each status line starts a new block.
pub(crate) fn final_headers(lines: &[String]) -> Headers {
    let mut headers = Headers::new();
    for line in lines {
        let line = line.trim();
        if line.starts_with("HTTP/") {
            headers.clear();
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    headers
}
