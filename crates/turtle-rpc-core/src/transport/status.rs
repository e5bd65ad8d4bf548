//! Status-code mapping and body decoding shared by every client.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RpcError;

/// Map an HTTP status to `Ok(())` or a [`RpcError::Protocol`].
///
/// `200`, `201` and `202` are success. A `400` carries the service's own
/// explanation in the body's `errorMessage` field when there is one.
pub fn check_status(status: u16, body: &str) -> Result<(), RpcError> {
    let message = match status {
        200..=202 => return Ok(()),
        400 => error_message(body).unwrap_or_else(|| "bad request".to_owned()),
        401 => "credential missing or invalid".to_owned(),
        403 => "a wallet is already open; close it first".to_owned(),
        404 => "resource/transaction not found".to_owned(),
        500 => "internal error; consult service logs".to_owned(),
        other => format!("unhandled status {other}"),
    };
    Err(RpcError::Protocol { status, message })
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("errorMessage")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

/// Decode a response body into an untyped JSON value.
///
/// An empty (or whitespace-only) body is "no content" and decodes to
/// [`Value::Null`], the same as an explicit `null`.
pub fn decode(body: &str) -> Result<Value, RpcError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
        .map_err(|e| RpcError::Decode(format!("{e}; body={}", body_excerpt(body))))
}

/// Bytes of a malformed body quoted in a `Decode` error.
const BODY_EXCERPT_LEN: usize = 128;

fn body_excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_LEN {
        return body.to_owned();
    }
    let mut end = BODY_EXCERPT_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes)", &body[..end], body.len())
}

/// Convert a decoded value into a caller-chosen typed structure.
pub fn decode_into<T: DeserializeOwned>(value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|e| RpcError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol_message(status: u16, body: &str) -> String {
        match check_status(status, body) {
            Err(RpcError::Protocol { status: s, message }) => {
                assert_eq!(s, status);
                message
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn success_statuses_pass() {
        for status in [200, 201, 202] {
            assert!(check_status(status, "").is_ok(), "status {status} must pass");
        }
    }

    #[test]
    fn bad_request_uses_error_message_field() {
        let body = r#"{"errorCode":7,"errorMessage":"Wallet file does not exist"}"#;
        assert_eq!(protocol_message(400, body), "Wallet file does not exist");
    }

    #[test]
    fn bad_request_without_error_message_falls_back() {
        assert_eq!(protocol_message(400, "not json"), "bad request");
        assert_eq!(protocol_message(400, r#"{"other":1}"#), "bad request");
    }

    #[test]
    fn unauthorized_mentions_credential() {
        assert!(protocol_message(401, "").contains("credential"));
    }

    #[test]
    fn forbidden_means_wallet_already_open() {
        assert!(protocol_message(403, "").contains("already open"));
    }

    #[test]
    fn not_found_and_internal_error() {
        assert!(protocol_message(404, "").contains("not found"));
        assert!(protocol_message(500, "").contains("service logs"));
    }

    #[test]
    fn unknown_status_is_unhandled() {
        assert_eq!(protocol_message(418, ""), "unhandled status 418");
        assert_eq!(protocol_message(204, ""), "unhandled status 204");
    }

    #[test]
    fn decode_empty_body_is_null() {
        assert_eq!(decode("").expect("empty body is not an error"), Value::Null);
        assert_eq!(decode(" \n").expect("blank body is not an error"), Value::Null);
        assert_eq!(decode("null").expect("explicit null"), Value::Null);
    }

    #[test]
    fn decode_invalid_json_is_decode_error() {
        let err = decode("{invalid").expect_err("must reject malformed JSON");
        assert!(matches!(err, RpcError::Decode(_)));
    }

    #[test]
    fn decode_error_quotes_only_a_prefix_of_large_bodies() {
        let body = format!("<html>{}</html>", "é".repeat(4096));
        let err = decode(&body).expect_err("html is not JSON");
        let message = err.to_string();
        assert!(message.contains("<html>"));
        assert!(message.contains(&format!("({} bytes)", body.len())));
        assert!(message.len() < 300, "message too long: {}", message.len());
    }

    #[test]
    fn decode_error_quotes_small_bodies_whole() {
        let err = decode("{oops").expect_err("malformed");
        assert!(err.to_string().ends_with("body={oops"));
    }

    #[test]
    fn decode_into_typed_struct() {
        #[derive(serde::Deserialize)]
        struct Count {
            count: u64,
        }

        let value = decode(r#"{"count":1234}"#).expect("valid JSON");
        let count: Count = decode_into(value).expect("shape matches");
        assert_eq!(count.count, 1234);
    }

    #[test]
    fn decode_into_shape_mismatch_is_decode_error() {
        let err = decode_into::<Vec<u64>>(serde_json::json!({"count": 1})).expect_err("mismatch");
        assert!(matches!(err, RpcError::Decode(_)));
    }
}
