//! Wire types for the enhancement endpoint.
//!
//! Requests and responses are JSON. The response body is decoded explicitly
//! into a [`Reply`] so callers never inspect optional fields themselves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the `POST` sent to the enhancement endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceRequest {
    /// The user's original text.
    pub text: String,
    /// Action label, e.g. "Fix Grammar".
    pub action: String,
    /// Instruction prompt for the action.
    pub prompt: String,
}

impl EnhanceRequest {
    pub fn new(text: &str, action: &str, prompt: &str) -> Self {
        Self {
            text: text.to_string(),
            action: action.to_string(),
            prompt: prompt.to_string(),
        }
    }
}

/// Successful response body as sent by the endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnhanceResponse {
    #[serde(
        rename = "enhancedText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub enhanced_text: Option<String>,
}

/// Outcome of a 2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The endpoint returned enhanced text.
    Enhanced(String),
    /// The endpoint answered but the enhanced-text field was absent or empty.
    Missing,
}

/// Why a 2xx body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("response is not valid JSON: {0}")]
    Json(String),
    #[error("response body is null")]
    Null,
}

impl Reply {
    /// Decode a successful response body.
    ///
    /// A missing, null, non-string or empty `enhancedText` all decode to
    /// [`Reply::Missing`], as does any JSON value that is not an object. Only
    /// unparseable JSON and a bare `null` body are errors.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| DecodeError::Json(e.to_string()))?;
        match value {
            Value::Null => Err(DecodeError::Null),
            Value::Object(_) => Ok(Self::from_value(value)),
            _ => Ok(Reply::Missing),
        }
    }

    fn from_value(value: Value) -> Self {
        // A wrongly-typed field is treated as absent rather than a failure.
        let response: EnhanceResponse = serde_json::from_value(value).unwrap_or_default();
        match response.enhanced_text {
            Some(text) if !text.is_empty() => Reply::Enhanced(text),
            _ => Reply::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_field_names() {
        let req = EnhanceRequest::new("I has a apple.", "Fix Grammar", "Fix it:");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["text"], "I has a apple.");
        assert_eq!(json["action"], "Fix Grammar");
        assert_eq!(json["prompt"], "Fix it:");
    }

    #[test]
    fn test_decode_enhanced() {
        let reply = Reply::decode(br#"{"enhancedText": "Hello world"}"#).unwrap();
        assert_eq!(reply, Reply::Enhanced("Hello world".to_string()));
    }

    #[test]
    fn test_decode_missing_field() {
        let reply = Reply::decode(br#"{"other": 1}"#).unwrap();
        assert_eq!(reply, Reply::Missing);
    }

    #[test]
    fn test_decode_empty_and_null() {
        assert_eq!(Reply::decode(br#"{"enhancedText": ""}"#).unwrap(), Reply::Missing);
        assert_eq!(Reply::decode(br#"{"enhancedText": null}"#).unwrap(), Reply::Missing);
    }

    #[test]
    fn test_decode_wrong_type() {
        let reply = Reply::decode(br#"{"enhancedText": 42}"#).unwrap();
        assert_eq!(reply, Reply::Missing);
    }

    #[test]
    fn test_decode_not_json() {
        assert!(matches!(
            Reply::decode(b"<html>oops</html>"),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_decode_non_object_is_missing() {
        assert_eq!(Reply::decode(b"[1, 2]").unwrap(), Reply::Missing);
        assert_eq!(Reply::decode(br#""x""#).unwrap(), Reply::Missing);
        assert_eq!(Reply::decode(b"7").unwrap(), Reply::Missing);
    }

    #[test]
    fn test_decode_null_body() {
        assert_eq!(Reply::decode(b"null"), Err(DecodeError::Null));
    }
}
