/// Every failure a binding can return.
///
/// The variants separate "never reached the service" ([`RpcError::Transport`])
/// from "service rejected the request" ([`RpcError::Protocol`],
/// [`RpcError::Remote`]) from "service answered with unparsable data"
/// ([`RpcError::Decode`]). Local checks fail with [`RpcError::Config`] or
/// [`RpcError::Validation`] before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Protocol { status: u16, message: String },

    #[error("JSON-RPC error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

impl RpcError {
    /// `true` when the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// `true` when the failure was detected locally and nothing was sent.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Validation(_))
    }
}
