//! HTTP/1.1 wire-format dumps of requests and responses.
//!
//! Dumps are meant for humans reading a trace: lines end in CRLF, header
//! values and bodies are rendered as lossy UTF-8.

use std::fmt::Write as _;

use http::header::{CONTENT_LENGTH, HOST};
use http::HeaderMap;

use crate::error::{Result, TransportError};
use crate::transport::{HttpRequest, HttpResponse};

/// Renders the full outgoing request: request line, `Host`, headers and body.
///
/// # Errors
///
/// Fails if the URI has no host.
pub fn dump_request(request: &HttpRequest) -> Result<String> {
    let uri = request.uri();
    let host = uri
        .authority()
        .map(|authority| authority.as_str().rsplit('@').next().unwrap_or_default().to_string())
        .filter(|host| !host.is_empty())
        .ok_or_else(|| {
            TransportError::Dump(format!("URL {uri} has no host"))
        })?;
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());

    let mut out = String::new();
    let _ = write!(out, "{} {} HTTP/1.1\r\n", request.method(), target);
    if !request.headers().contains_key(HOST) {
        let _ = write!(out, "Host: {host}\r\n");
    }
    write_headers(&mut out, request.headers(), request.body().len());
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(request.body()));
    Ok(out)
}

/// Renders the full response: status line, headers and body.
#[must_use]
pub fn dump_response(response: &HttpResponse) -> String {
    let status = response.status();

    let mut out = String::new();
    let _ = write!(
        out,
        "{:?} {} {}\r\n",
        response.version(),
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    write_headers(&mut out, response.headers(), response.body().len());
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(response.body()));
    out
}

// Header values may carry obs-text; those bytes are shown, not rejected.
fn write_headers(out: &mut String, headers: &HeaderMap, body_len: usize) {
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        let _ = write!(out, "{}: {value}\r\n", canonical_name(name.as_str()));
    }
    if body_len > 0 && !headers.contains_key(CONTENT_LENGTH) {
        let _ = write!(out, "Content-Length: {body_len}\r\n");
    }
}

/// `content-type` -> `Content-Type`.
fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}
