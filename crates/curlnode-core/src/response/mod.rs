//! Raw HTTP response parsing: status line, folded headers, verbatim body.
//!
//! Input is the text a curl run with `--include` writes to stdout. Malformed
//! input degrades silently (null status code, empty message) instead of
//! erroring; the original response is never required to be well-formed.

mod cookies;
mod headers;

pub use cookies::{breakdown, CookieAttr, CookieBreakdown};
pub use headers::{HeaderMap, HeaderValue};

use serde::Serialize;

/// Structured result of one curl invocation's captured stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResponse {
    /// Response body, verbatim (embedded blank lines and CR bytes kept).
    #[serde(rename = "data")]
    pub body: String,
    /// Numeric status code; None (JSON null) when the status line is malformed.
    pub status_code: Option<u16>,
    /// Status message; empty when the status line carries none.
    pub status_message: String,
    /// Lower-cased header names, duplicates folded into ordered lists.
    pub headers: HeaderMap,
    /// Present only when the response carried a `set-cookie` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_cookie: Option<CookieBreakdown>,
}

/// Parses raw response text: status line, then header lines until the first
/// blank line, then the body.
pub fn parse(raw_output: &str) -> ParsedResponse {
    let mut lines = raw_output.split('\n');

    let status_line = lines.next().unwrap_or("");
    let status_line = status_line.strip_suffix('\r').unwrap_or(status_line);
    let mut tokens = status_line.split(' ');
    let _protocol = tokens.next();
    let status_code = tokens.next().and_then(|token| token.parse::<u16>().ok());
    let status_message = tokens.collect::<Vec<_>>().join(" ");

    let mut headers = HeaderMap::new();
    let mut saw_terminator = false;
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            saw_terminator = true;
            break;
        }
        match line.split_once(':') {
            Some((name, value)) => headers.insert(name, value.trim()),
            None => headers.insert(line, ""),
        }
    }

    // Everything after the blank terminator is body, re-joined verbatim.
    let body = if saw_terminator {
        lines.collect::<Vec<_>>().join("\n")
    } else {
        String::new()
    };

    let set_cookie = headers
        .get("set-cookie")
        .map(|value| breakdown(value.as_slice()));

    ParsedResponse {
        body,
        status_code,
        status_message,
        headers,
        set_cookie,
    }
}
