//! Error types for REST API operations

use coinbase_auth::AuthError;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::transport::TransportError;

/// Tag placed in [`ApiErrorEnvelope::error`] when a failure body could not be
/// parsed as an envelope
pub const UNEXPECTED_API_RESPONSE: &str =
    "coinbase API returned a response outside the API documentation";

/// One entry of an error envelope's `details`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Identifies the type of the serialized message
    #[serde(default)]
    pub type_url: String,
    /// Serialized payload
    #[serde(default)]
    pub value: u8,
}

/// Structured failure payload returned with non-success statuses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    /// Short error tag
    #[serde(default)]
    pub error: Option<String>,
    /// Error code
    #[serde(default)]
    pub code: Option<i32>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Additional detail records, in server order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub details: Vec<ErrorDetail>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ErrorDetail>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ErrorDetail>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ApiErrorEnvelope {
    /// Build the envelope used when a failure body is not an envelope
    pub fn unexpected(status: StatusCode, body: &[u8]) -> Self {
        Self {
            error: Some(UNEXPECTED_API_RESPONSE.to_string()),
            code: Some(i32::from(status.as_u16())),
            message: Some(String::from_utf8_lossy(body).into_owned()),
            details: Vec::new(),
        }
    }

    /// Error code, or 0 when absent
    pub fn code(&self) -> i32 {
        self.code.unwrap_or_default()
    }

    /// Message, or an empty string when absent
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// Error tag, or an empty string when absent
    pub fn error_tag(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }

    /// Check if this envelope was synthesized from an unparseable body
    pub fn is_unexpected(&self) -> bool {
        self.error.as_deref() == Some(UNEXPECTED_API_RESPONSE)
    }
}

impl fmt::Display for ApiErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"{{"error": "{}", "code": {}, "message": "{}", "details": ["#,
            self.error_tag(),
            self.code(),
            self.message()
        )?;
        for (i, detail) in self.details.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                r#"{{"type_url": "{}", "value": {}}}"#,
                detail.type_url, detail.value
            )?;
        }
        f.write_str("]}")
    }
}

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Client could not be constructed from the given configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Signing a request failed; the request was not sent
    #[error("Signing error: {0}")]
    Signing(#[source] AuthError),

    /// Network-level failure executing the request
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The API answered with a non-success status
    #[error("API error ({status}): {envelope}")]
    Api {
        /// HTTP status of the response
        status: StatusCode,
        /// Parsed or synthesized error body
        envelope: ApiErrorEnvelope,
    },

    /// A success response did not match the expected shape
    #[error("failed to decode response '{body}' into '{type_name}': {source}")]
    Decode {
        /// Target type name
        type_name: &'static str,
        /// Raw response body
        body: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A request could not be built from the given parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// An operation failed; `source` holds the cause
    #[error("{context}: {source}")]
    Context {
        /// Operation and identifiers
        context: String,
        /// Underlying error
        #[source]
        source: Box<RestError>,
    },
}

impl RestError {
    /// Map an authentication error raised while building a client
    pub(crate) fn configuration(err: AuthError) -> Self {
        Self::Configuration(err.to_string())
    }

    /// The innermost error, skipping context layers
    pub fn root(&self) -> &RestError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// The API error envelope, if the server rejected the request
    pub fn api_error(&self) -> Option<&ApiErrorEnvelope> {
        match self.root() {
            Self::Api { envelope, .. } => Some(envelope),
            _ => None,
        }
    }

    /// HTTP status of a rejected request
    pub fn status_code(&self) -> Option<StatusCode> {
        match self.root() {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the request was cancelled by the caller
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Self::Transport(TransportError::Cancelled))
    }

    /// Check if this is a construction-time error
    pub fn is_configuration(&self) -> bool {
        matches!(self.root(), Self::Configuration(_))
    }

    /// Check if the server rejected the request for rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.status_code() == Some(StatusCode::TOO_MANY_REQUESTS)
    }
}

/// Attach operation context to errors
pub trait ResultExt<T> {
    /// Wrap the error with a fixed message
    fn context(self, context: &str) -> RestResult<T>;

    /// Wrap the error with a lazily built message
    fn with_context<F: FnOnce() -> String>(self, f: F) -> RestResult<T>;
}

impl<T> ResultExt<T> for RestResult<T> {
    fn context(self, context: &str) -> RestResult<T> {
        self.with_context(|| context.to_string())
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> RestResult<T> {
        self.map_err(|source| RestError::Context {
            context: f(),
            source: Box::new(source),
        })
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses_without_details() {
        let envelope: ApiErrorEnvelope =
            serde_json::from_str(r#"{"error":"X","code":400,"message":"bad"}"#).unwrap();
        assert_eq!(envelope.error.as_deref(), Some("X"));
        assert_eq!(envelope.code, Some(400));
        assert_eq!(envelope.message.as_deref(), Some("bad"));
        assert!(envelope.details.is_empty());
    }

    #[test]
    fn test_envelope_null_details() {
        let envelope: ApiErrorEnvelope =
            serde_json::from_str(r#"{"error":null,"code":5,"message":null,"details":null}"#)
                .unwrap();
        assert!(envelope.details.is_empty());
        assert_eq!(envelope.error_tag(), "");
    }

    #[test]
    fn test_envelope_display() {
        let envelope = ApiErrorEnvelope {
            error: Some("INVALID_ARGUMENT".into()),
            code: Some(3),
            message: Some("bad limit".into()),
            details: vec![ErrorDetail {
                type_url: "type.googleapis.com/x".into(),
                value: 7,
            }],
        };
        assert_eq!(
            envelope.to_string(),
            r#"{"error": "INVALID_ARGUMENT", "code": 3, "message": "bad limit", "details": [{"type_url": "type.googleapis.com/x", "value": 7}]}"#
        );
    }

    #[test]
    fn test_unexpected_envelope() {
        let envelope = ApiErrorEnvelope::unexpected(StatusCode::BAD_GATEWAY, b"<html>oops</html>");
        assert!(envelope.is_unexpected());
        assert_eq!(envelope.code(), 502);
        assert_eq!(envelope.message(), "<html>oops</html>");
    }

    #[test]
    fn test_context_accessors_reach_root() {
        let err: RestResult<()> = Err(RestError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            envelope: ApiErrorEnvelope::default(),
        });
        let err = err.context("failed to list accounts").unwrap_err();

        assert!(err.to_string().starts_with("failed to list accounts: API error"));
        assert!(err.api_error().is_some());
        assert!(err.is_rate_limited());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_classification() {
        let err = RestError::from(TransportError::Cancelled);
        assert!(err.is_cancelled());
        assert!(err.api_error().is_none());
    }
}
