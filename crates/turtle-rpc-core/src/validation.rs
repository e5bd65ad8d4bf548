//! Local argument checks run before any request is built.

use crate::error::RpcError;

/// Length, in hex characters, of a spend/view key.
pub const KEY_HEX_LEN: usize = 64;

pub(crate) fn require_non_empty(value: &str, what: &str) -> Result<(), RpcError> {
    if value.trim().is_empty() {
        return Err(RpcError::Validation(format!("{what} is required")));
    }
    Ok(())
}

/// A value interpolated into a REST path must be exactly one segment.
///
/// URL normalization resolves `.` and `..` against the parent path, and a
/// `%` would let an escaped separator through, so both are refused along
/// with raw separators and whitespace.
pub(crate) fn require_path_segment(value: &str, what: &str) -> Result<(), RpcError> {
    require_non_empty(value, what)?;
    if value == "." || value == ".." {
        return Err(RpcError::Validation(format!(
            "{what} must not be a dot segment"
        )));
    }
    if value.contains(['/', '\\', '?', '#', '%']) || value.chars().any(char::is_whitespace) {
        return Err(RpcError::Validation(format!(
            "{what} must not contain whitespace or any of '/', '\\', '?', '#', '%'"
        )));
    }
    Ok(())
}

/// `None` for an absent or empty optional string parameter.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// `skip_serializing_if` companion of [`present`].
pub(crate) fn is_unset(value: &Option<String>) -> bool {
    present(value).is_none()
}

/// Spend and view keys are 32 bytes, hex encoded.
pub(crate) fn require_key(value: &str, what: &str) -> Result<(), RpcError> {
    if value.len() != KEY_HEX_LEN {
        return Err(RpcError::Validation(format!(
            "{what} must be {KEY_HEX_LEN} hex characters, got {}",
            value.len()
        )));
    }
    hex::decode(value)
        .map_err(|e| RpcError::Validation(format!("{what} is not valid hex: {e}")))?;
    Ok(())
}

/// At most one of two mutually exclusive optional parameters may be set.
pub(crate) fn require_exclusive<A, B>(
    a: Option<A>,
    a_name: &str,
    b: Option<B>,
    b_name: &str,
) -> Result<(), RpcError> {
    if a.is_some() && b.is_some() {
        return Err(RpcError::Validation(format!(
            "`{a_name}` and `{b_name}` cannot be set together"
        )));
    }
    Ok(())
}
