//! HTTP transport seam.
//!
//! Requests and responses cross the [`Transport`] trait as plain data so the
//! clients can be driven by [`ReqwestTransport`] in production and by a fake
//! in tests. Status mapping and body decoding live in [`status`] and are the
//! same for every client.

mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod status;

pub use http::ReqwestTransport;
pub use status::{check_status, decode, decode_into};

use async_trait::async_trait;

use crate::error::RpcError;

/// Header carrying the wallet-api credential.
pub const API_KEY_HEADER: &str = "X-API-KEY";

// ==============================================================================
// Request / Response
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound HTTP request, fully built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw status and body as received; interpretation happens in [`status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

// ==============================================================================
// Transport Trait
// ==============================================================================

/// Executes one HTTP round trip.
///
/// Implementations must be safe for concurrent use and must surface every
/// connection-level failure as [`RpcError::Transport`] without retrying.
/// Non-success statuses are *not* errors at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RpcError>;
}
