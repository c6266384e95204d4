//! Payload decoding
//!
//! The upstream endpoint answers with JSONP:
//!
//! ```text
//! get_members_success({"rows": [{"sid": "10125", "sname": "刘增艳", ...}, ...]})
//! ```
//!
//! Decoding strips the callback wrapper, accepts either `{"rows": [...]}` or
//! a bare array, and validates the records into a [`Dataset`].

use roster_core::{Dataset, Record};
use serde::Deserialize;

use crate::error::FetchError;

/// Envelope used by the upstream API.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Wrapped { rows: Vec<Record> },
    Bare(Vec<Record>),
}

/// Strip a JSONP callback wrapper.
///
/// A body that already starts with `{` or `[` is returned unchanged.
/// Otherwise the payload is the text between the first `(` and the last `)`.
pub fn unwrap_jsonp(body: &str) -> Result<&str, FetchError> {
    let trimmed = body.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    let start = trimmed.find('(');
    let end = trimmed.rfind(')');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(trimmed[start + 1..end].trim()),
        _ => Err(FetchError::Malformed(
            "JSONP body has no callback parentheses".to_string(),
        )),
    }
}

/// Decode and validate a roster payload (JSON or JSONP).
pub fn decode_payload(body: &str) -> Result<Dataset, FetchError> {
    let json = unwrap_jsonp(body)?;
    let payload: Payload = serde_json::from_str(json).map_err(|e| {
        FetchError::Malformed(format!("expected a roster array or {{\"rows\": [...]}}: {}", e))
    })?;
    let records = match payload {
        Payload::Wrapped { rows } => rows,
        Payload::Bare(rows) => rows,
    };
    Ok(Dataset::new(records)?)
}
