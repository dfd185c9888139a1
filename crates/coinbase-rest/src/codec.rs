//! Response decoding
//!
//! Success bodies decode into the caller's type. Failure bodies decode into
//! an [`ApiErrorEnvelope`]; anything that is not an envelope still produces
//! one, carrying the status and the raw body.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{ApiErrorEnvelope, RestError, RestResult};

/// Decode a failure body into an error envelope
///
/// Never fails.
pub fn decode_error(status: StatusCode, body: &[u8]) -> ApiErrorEnvelope {
    match serde_json::from_slice::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(_) => ApiErrorEnvelope::unexpected(status, body),
    }
}

/// Decode a success body into `T`
pub fn decode_success<T: DeserializeOwned>(body: &[u8]) -> RestResult<T> {
    serde_json::from_slice(body).map_err(|source| RestError::Decode {
        type_name: std::any::type_name::<T>(),
        body: String::from_utf8_lossy(body).into_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        name: String,
        count: u32,
    }

    #[test]
    fn test_decode_error_envelope() {
        let envelope = decode_error(
            StatusCode::BAD_REQUEST,
            br#"{"error":"X","code":400,"message":"bad"}"#,
        );
        assert_eq!(envelope.error.as_deref(), Some("X"));
        assert_eq!(envelope.code, Some(400));
        assert_eq!(envelope.message.as_deref(), Some("bad"));
        assert!(envelope.details.is_empty());
        assert!(!envelope.is_unexpected());
    }

    #[test]
    fn test_decode_error_with_details() {
        let envelope = decode_error(
            StatusCode::BAD_REQUEST,
            br#"{"error":"INVALID_ARGUMENT","code":3,"message":"m","details":[{"type_url":"t1","value":1},{"type_url":"t2","value":2}]}"#,
        );
        let urls: Vec<_> = envelope.details.iter().map(|d| d.type_url.as_str()).collect();
        assert_eq!(urls, ["t1", "t2"]);
    }

    #[test]
    fn test_decode_error_non_json() {
        for (status, body) in [
            (StatusCode::UNAUTHORIZED, &b"Unauthorized\n"[..]),
            (StatusCode::BAD_GATEWAY, &b"<html><body>502</body></html>"[..]),
            (StatusCode::INTERNAL_SERVER_ERROR, &b""[..]),
            (StatusCode::NOT_FOUND, &b"[1,2,3]"[..]),
        ] {
            let envelope = decode_error(status, body);
            assert!(envelope.is_unexpected());
            assert_eq!(envelope.code(), i32::from(status.as_u16()));
            assert_eq!(envelope.message().as_bytes(), body);
        }
    }

    #[test]
    fn test_decode_success() {
        let widget: Widget = decode_success(br#"{"name":"bolt","count":3}"#).unwrap();
        assert_eq!(
            widget,
            Widget {
                name: "bolt".into(),
                count: 3
            }
        );
    }

    #[test]
    fn test_decode_success_shape_mismatch() {
        let err = decode_success::<Widget>(br#"{"name":"bolt","count":"three"}"#).unwrap_err();
        match err {
            RestError::Decode {
                type_name, body, ..
            } => {
                assert!(type_name.ends_with("Widget"));
                assert_eq!(body, r#"{"name":"bolt","count":"three"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_success_invalid_json() {
        let err = decode_success::<Widget>(b"not json").unwrap_err();
        assert!(err.to_string().contains("not json"));
    }
}
