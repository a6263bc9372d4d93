//! Upstream failure classification
//!
//! The Booker API reports failures in several disguises: structured JSON
//! error arrays, bare HTML pages served by a fronting proxy, and leaked
//! .NET stack traces with a 200 or 500 status. This module sniffs the
//! status/body pair into the [`BookerError`] taxonomy so call sites only
//! ever reason about typed errors.

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{BookerError, TransportKind};

/// Maximum characters of a raw body carried inside an error detail;
/// full bodies go to the debug log instead
const BODY_SNIPPET_LEN: usize = 300;

/// Body fragments that identify the dispatch vendor's leaked .NET faults
///
/// These pages surface when a required payload field is omitted; the
/// backend faults before producing a structured error.
const STACK_TRACE_SIGNATURES: [&str; 3] = [
    "NullReferenceException",
    "Object reference not set to an instance of an object",
    "Server Error in '/' Application",
];

/// Whether a body is an HTML page rather than an API response
#[must_use]
pub fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(512).collect();
    let head = head.to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.contains("<html")
}

/// Whether a body carries a known upstream stack-trace signature
#[must_use]
pub fn looks_like_stack_trace(body: &str) -> bool {
    STACK_TRACE_SIGNATURES.iter().any(|sig| body.contains(sig))
}

/// Classify a non-success response into a typed error
///
/// Body sniffing runs first: a stack trace or HTML page is more telling
/// than whatever status code travelled with it (the vendor's fault pages
/// arrive with assorted codes).
#[must_use]
pub fn classify_response(status: StatusCode, body: &str) -> BookerError {
    if looks_like_stack_trace(body) {
        return BookerError::UpstreamInternalError(snippet(body));
    }
    if looks_like_html(body) {
        return BookerError::ServiceUnavailable(format!(
            "HTTP {status} served an HTML page: {}",
            snippet(body)
        ));
    }

    match status.as_u16() {
        400 => BookerError::ValidationFailed(validation_detail(body)),
        401 => BookerError::AuthenticationFailed(snippet(body)),
        403 => BookerError::AccessDenied(snippet(body)),
        404 => BookerError::NotFound(snippet(body)),
        code => BookerError::UpstreamServerError {
            status: code,
            detail: snippet(body),
        },
    }
}

/// Map a network-level failure into a typed transport error
#[must_use]
pub fn classify_transport(err: &reqwest::Error, timeout_secs: u64) -> BookerError {
    if err.is_timeout() {
        BookerError::Transport {
            kind: TransportKind::Timeout,
            detail: format!("no response within {timeout_secs} seconds"),
        }
    } else if err.is_connect() {
        BookerError::Transport {
            kind: TransportKind::Connect,
            detail: err.to_string(),
        }
    } else {
        BookerError::Transport {
            kind: TransportKind::Request,
            detail: err.to_string(),
        }
    }
}

/// Pull the human-readable messages out of a 400 body
///
/// The structured shape is `{ "errors": [...] }` with string or
/// `{ "message": ... }` entries; single `error`/`message` fields and
/// unstructured bodies degrade to a truncated snippet.
fn validation_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return snippet(body);
    };

    if let Some(errors) = value.get("errors").and_then(Value::as_array) {
        let messages: Vec<String> = errors
            .iter()
            .map(|entry| match entry {
                Value::String(message) => message.clone(),
                other => other
                    .get("message")
                    .or_else(|| other.get("detail"))
                    .and_then(Value::as_str)
                    .map_or_else(|| other.to_string(), ToString::to_string),
            })
            .collect();

        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    value
        .get("error")
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map_or_else(|| snippet(body), ToString::to_string)
}

/// Truncate a raw body for inclusion in an error detail
pub(crate) fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_SNIPPET_LEN {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(BODY_SNIPPET_LEN).collect();
    format!("{head}…")
}
