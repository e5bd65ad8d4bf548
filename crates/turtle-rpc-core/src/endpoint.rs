//! One service endpoint: base URL, credential placement and transport.
//!
//! Every client funnels its calls through an [`Endpoint`], which builds the
//! request, places the credential according to [`Auth`], runs the round trip
//! and applies the shared status mapping and decoding.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::ConnectionConfig;
use crate::error::RpcError;
use crate::protocol::{reject_jsonrpc_error, JsonRpcRequest, JSON_RPC_PATH};
use crate::transport::{
    check_status, decode, HttpMethod, HttpRequest, Transport, API_KEY_HEADER,
};

/// Where the credential travels.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    /// `password` field inside the JSON-RPC envelope (walletd).
    EnvelopePassword(String),
    /// `X-API-KEY` request header on every verb (wallet-api).
    ApiKeyHeader(String),
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::EnvelopePassword(_) => f.write_str("EnvelopePassword(<redacted>)"),
            Self::ApiKeyHeader(_) => f.write_str("ApiKeyHeader(<redacted>)"),
        }
    }
}

#[derive(Clone)]
pub struct Endpoint {
    base_url: String,
    auth: Auth,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl Endpoint {
    pub fn new(
        config: &ConnectionConfig,
        auth: Auth,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, RpcError> {
        Ok(Self {
            base_url: config.base_url()?,
            auth,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<Value, RpcError> {
        let mut headers = Vec::new();
        if let Auth::ApiKeyHeader(key) = &self.auth {
            headers.push((API_KEY_HEADER.to_owned(), key.clone()));
        }

        let request = HttpRequest {
            method,
            url: self.url(path),
            headers,
            body,
        };
        debug!(http.method = %method, http.url = %request.url, "http request");

        let response = self.transport.send(request).await?;
        trace!(
            status = response.status,
            body = loggable_body(&response.body),
            "http response"
        );
        check_status(response.status, &response.body)?;
        decode(&response.body)
    }

    pub async fn get(&self, path: &str) -> Result<Value, RpcError> {
        self.execute(HttpMethod::Get, path, None).await
    }

    /// POST `body` as a flat JSON object (or no body at all).
    pub async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, RpcError> {
        let body = encode_body(path, body)?;
        self.execute(HttpMethod::Post, path, body).await
    }

    pub async fn put<B: Serialize + Sync>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, RpcError> {
        let body = encode_body(path, body)?;
        self.execute(HttpMethod::Put, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, RpcError> {
        self.execute(HttpMethod::Delete, path, None).await
    }

    /// POST a JSON-RPC envelope to `/json_rpc`.
    ///
    /// With [`Auth::EnvelopePassword`] the envelope carries `id` and
    /// `password`. A body holding a JSON-RPC `error` member fails with
    /// [`RpcError::Remote`]; any other body is returned unchanged.
    pub async fn json_rpc<P: Serialize + Sync>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<Value, RpcError> {
        let mut envelope = JsonRpcRequest::new(method, params);
        if let Auth::EnvelopePassword(password) = &self.auth {
            envelope = envelope.with_password(password);
        }
        let body = envelope.to_body()?;
        debug!(rpc.method = method, "rpc call");

        let decoded = self.execute(HttpMethod::Post, JSON_RPC_PATH, Some(body)).await?;
        reject_jsonrpc_error(decoded)
    }
}

/// Response fields that carry key material or seeds.
const SECRET_FIELDS: [&str; 6] = [
    "privateSpendKey",
    "privateViewKey",
    "spendSecretKey",
    "viewSecretKey",
    "mnemonicSeed",
    "transactionPrivateKey",
];

/// The body as it may appear in logs: bodies holding secrets are withheld.
fn loggable_body(body: &str) -> &str {
    if SECRET_FIELDS.iter().any(|field| body.contains(field)) {
        "<redacted>"
    } else {
        body
    }
}

fn encode_body<B: Serialize>(path: &str, body: Option<&B>) -> Result<Option<String>, RpcError> {
    body.map(|body| {
        serde_json::to_string(body)
            .map_err(|e| RpcError::Validation(format!("encode body for `{path}`: {e}")))
    })
    .transpose()
}
