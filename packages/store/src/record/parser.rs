// packages/store/src/record/parser.rs
//! Raw HTTP/1.x response parser
//!
//! Turns captured wire bytes into a [`ResponseRecord`]. Both CRLF and bare LF
//! line endings are accepted. The body honors `Transfer-Encoding: chunked`
//! and `Content-Length`; without either, everything after the header block is
//! the body.

use crate::record::method::Method;
use crate::record::response::ResponseRecord;
use crate::utils::errors::{Result, StoreError};
use std::collections::HashMap;
use tracing::debug;

/// Parse raw response bytes captured for `url`
pub fn parse_raw_response(data: &[u8], url: &str) -> Result<ResponseRecord> {
    if data.is_empty() {
        return Err(StoreError::EmptyInput("empty response data".to_string()));
    }

    let (head, body_section) = split_head(data);
    let head = std::str::from_utf8(head)
        .map_err(|_| StoreError::ParseFailed("header block is not valid UTF-8".to_string()))?;

    let mut lines = head.lines();
    let status_line = lines
        .next()
        .ok_or_else(|| StoreError::ParseFailed("missing status line".to_string()))?;
    let status_code = parse_status_line(status_line)?;

    let mut headers: HashMap<String, String> = HashMap::new();
    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        let (name, value) = parse_header_line(line)?;
        headers
            .entry(canonical_header_name(name))
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    let body = read_body(&headers, body_section)?;
    let host = host_from_url(url)?;

    debug!(
        "Parsed raw response for {}: status {}, {} headers, {} body bytes",
        url,
        status_code,
        headers.len(),
        body.len()
    );

    let body_length = body.len() as u64;
    ResponseRecord::new(
        url,
        host,
        Method::Get,
        status_code,
        Some(headers),
        Some(body),
        body_length,
        Some(data.to_vec()),
    )
}

/// Parse a raw response held as text
pub fn parse_str_response(data: &str, url: &str) -> Result<ResponseRecord> {
    parse_raw_response(data.as_bytes(), url)
}

/// Split at the first blank line; the separator itself belongs to neither part
fn split_head(data: &[u8]) -> (&[u8], &[u8]) {
    let crlf = find(data, b"\r\n\r\n").map(|pos| (pos, pos + 4));
    let lf = find(data, b"\n\n").map(|pos| (pos, pos + 2));

    let separator = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match separator {
        Some((head_end, body_start)) => (&data[..head_end], &data[body_start..]),
        None => (data, &data[data.len()..]),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parses lines like "HTTP/1.1 200 OK"
fn parse_status_line(line: &str) -> Result<u16> {
    let mut parts = line.trim_end_matches('\r').splitn(3, ' ');

    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(StoreError::ParseFailed(format!(
            "malformed status line: {:?}",
            line
        )));
    }

    let code = parts.next().unwrap_or_default();
    if code.len() != 3 {
        return Err(StoreError::ParseFailed(format!(
            "malformed status code: {:?}",
            code
        )));
    }

    code.parse::<u16>()
        .map_err(|_| StoreError::ParseFailed(format!("malformed status code: {:?}", code)))
}

fn parse_header_line(line: &str) -> Result<(&str, &str)> {
    let line = line.trim_end_matches('\r');
    let colon = line
        .find(':')
        .ok_or_else(|| StoreError::ParseFailed(format!("malformed header line: {:?}", line)))?;

    let name = line[..colon].trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(StoreError::ParseFailed(format!(
            "malformed header name: {:?}",
            name
        )));
    }

    Ok((name, line[colon + 1..].trim()))
}

/// "content-type" becomes "Content-Type"
fn canonical_header_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut upper = true;
    for ch in name.chars() {
        if upper {
            canonical.push(ch.to_ascii_uppercase());
        } else {
            canonical.push(ch.to_ascii_lowercase());
        }
        upper = ch == '-';
    }
    canonical
}

fn read_body(headers: &HashMap<String, String>, section: &[u8]) -> Result<Vec<u8>> {
    let chunked = headers
        .get("Transfer-Encoding")
        .map(|value| value.to_ascii_lowercase().contains("chunked"))
        .unwrap_or(false);
    if chunked {
        return decode_chunked(section);
    }

    match headers.get("Content-Length") {
        Some(value) => {
            let length: usize = value.parse().map_err(|_| {
                StoreError::ParseFailed(format!("invalid Content-Length: {:?}", value))
            })?;
            if section.len() < length {
                return Err(StoreError::ParseFailed(format!(
                    "unexpected end of body: expected {} bytes, got {}",
                    length,
                    section.len()
                )));
            }
            Ok(section[..length].to_vec())
        }
        None => Ok(section.to_vec()),
    }
}

fn decode_chunked(mut section: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::new();

    loop {
        let line_end = find(section, b"\n")
            .ok_or_else(|| StoreError::ParseFailed("truncated chunk header".to_string()))?;
        let size_line = std::str::from_utf8(&section[..line_end])
            .map_err(|_| StoreError::ParseFailed("chunk header is not valid UTF-8".to_string()))?;
        let size_hex = size_line
            .trim_end_matches('\r')
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| StoreError::ParseFailed(format!("invalid chunk size: {:?}", size_hex)))?;

        section = &section[line_end + 1..];
        if size == 0 {
            // Trailers are dropped
            return Ok(body);
        }

        if section.len() < size {
            return Err(StoreError::ParseFailed("truncated chunk data".to_string()));
        }
        body.extend_from_slice(&section[..size]);
        section = &section[size..];

        if section.starts_with(b"\r\n") {
            section = &section[2..];
        } else if section.starts_with(b"\n") {
            section = &section[1..];
        }
    }
}

/// Host (with port) for http(s) URLs, otherwise the input itself
fn host_from_url(url: &str) -> Result<String> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Ok(url.to_string());
    }

    let parsed = url::Url::parse(url)
        .map_err(|e| StoreError::ParseFailed(format!("invalid URL {:?}: {}", url, e)))?;
    let host = parsed.host_str().unwrap_or_default();

    Ok(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
