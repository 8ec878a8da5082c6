//! Traffic logging for completion requests
//!
//! Emits a summary of every request/response under the `traffic` target.
//! Content is truncated to avoid leaking private data in logs.

use serde::Serialize;

/// Maximum characters to log for content (to protect privacy)
const MAX_CONTENT_LOG_CHARS: usize = 200;

/// Truncate a string for logging, adding ellipsis if truncated
fn truncate_for_log(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars total)", truncated, char_count)
    }
}

fn summarize(payload: &impl Serialize) -> String {
    let json =
        serde_json::to_string(payload).unwrap_or_else(|_| "<serialization error>".to_string());
    truncate_for_log(&json, MAX_CONTENT_LOG_CHARS)
}

pub fn log_request(model: &str, request: &impl Serialize) {
    tracing::debug!(target: "traffic", model, request = %summarize(request), "REQUEST");
}

pub fn log_response(model: &str, response: &impl Serialize) {
    tracing::debug!(target: "traffic", model, response = %summarize(response), "RESPONSE");
}

pub fn log_error(model: &str, error: &anyhow::Error) {
    tracing::warn!(target: "traffic", model, error = %error, "ERROR");
}
