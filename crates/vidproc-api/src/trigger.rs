//! Trigger notification decoding.
//!
//! Inbound messages arrive as a push envelope whose `message.data` field is
//! base64-encoded JSON naming the newly arrived raw object.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Push notification envelope.
#[derive(Debug, Deserialize)]
pub struct PubSubEnvelope {
    pub message: Option<PubSubMessage>,
}

/// Inner message carrying the base64-encoded payload.
#[derive(Debug, Deserialize)]
pub struct PubSubMessage {
    pub data: Option<String>,
}

/// A new raw video landed in the raw bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct FileArrivalEvent {
    /// Object key of the raw video. Never empty after decoding.
    #[serde(default)]
    pub name: String,
}

/// Decode a trigger body into a file arrival event.
///
/// Every failure mode (malformed envelope, missing message, bad base64,
/// invalid UTF-8 or JSON, missing or empty `name`) collapses into the single
/// uniform [`ApiError::Validation`]; callers only see pass or fail.
pub fn decode_trigger(body: serde_json::Value) -> ApiResult<FileArrivalEvent> {
    let envelope: PubSubEnvelope = serde_json::from_value(body).map_err(|e| {
        debug!(error = %e, "Trigger envelope has an unexpected shape");
        ApiError::Validation
    })?;

    let data = envelope
        .message
        .and_then(|m| m.data)
        .ok_or(ApiError::Validation)?;

    let bytes = STANDARD.decode(data.as_bytes()).map_err(|e| {
        debug!(error = %e, "Trigger payload is not valid base64");
        ApiError::Validation
    })?;

    let text = String::from_utf8(bytes).map_err(|e| {
        debug!(error = %e, "Trigger payload is not valid UTF-8");
        ApiError::Validation
    })?;

    let event: FileArrivalEvent = serde_json::from_str(&text).map_err(|e| {
        debug!(error = %e, "Trigger payload is not valid JSON");
        ApiError::Validation
    })?;

    if event.name.is_empty() {
        debug!("Trigger payload has a missing or empty name");
        return Err(ApiError::Validation);
    }

    if !is_safe_object_name(&event.name) {
        debug!(name = %event.name, "Trigger payload names an unsafe object key");
        return Err(ApiError::Validation);
    }

    Ok(event)
}

/// Reject keys that could escape the scratch directories.
fn is_safe_object_name(name: &str) -> bool {
    !name.contains('/') && !name.contains('\\') && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(data: Option<&str>) -> serde_json::Value {
        match data {
            Some(data) => serde_json::json!({ "message": { "data": data } }),
            None => serde_json::json!({ "message": {} }),
        }
    }

    fn encode(payload: &str) -> String {
        STANDARD.encode(payload)
    }

    #[test]
    fn test_decodes_valid_trigger() {
        let event = decode_trigger(envelope(Some(&encode(r#"{"name":"vid1.mp4"}"#)))).unwrap();
        assert_eq!(event.name, "vid1.mp4");
    }

    #[test]
    fn test_rejects_missing_message() {
        let result = decode_trigger(serde_json::json!({}));
        assert!(matches!(result, Err(ApiError::Validation)));
    }

    #[test]
    fn test_rejects_malformed_envelope() {
        let result = decode_trigger(serde_json::json!({ "message": 42 }));
        assert!(matches!(result, Err(ApiError::Validation)));
    }

    #[test]
    fn test_rejects_missing_data() {
        let result = decode_trigger(envelope(None));
        assert!(matches!(result, Err(ApiError::Validation)));
    }

    #[test]
    fn test_rejects_bad_base64() {
        let result = decode_trigger(envelope(Some("not base64!!!")));
        assert!(matches!(result, Err(ApiError::Validation)));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let result = decode_trigger(envelope(Some(&encode("{not json"))));
        assert!(matches!(result, Err(ApiError::Validation)));
    }

    #[test]
    fn test_rejects_missing_name() {
        let result = decode_trigger(envelope(Some(&encode(r#"{"other":"field"}"#))));
        assert!(matches!(result, Err(ApiError::Validation)));
    }

    #[test]
    fn test_rejects_empty_name() {
        let result = decode_trigger(envelope(Some(&encode(r#"{"name":""}"#))));
        assert!(matches!(result, Err(ApiError::Validation)));
    }

    #[test]
    fn test_rejects_path_traversal_names() {
        for name in ["../secret.mp4", "a/b.mp4", "..", "a\\b.mp4"] {
            let payload = format!(r#"{{"name":"{}"}}"#, name.replace('\\', "\\\\"));
            let result = decode_trigger(envelope(Some(&encode(&payload))));
            assert!(matches!(result, Err(ApiError::Validation)), "{}", name);
        }
    }
}
