//! JSON-RPC 2.0 envelope shared by the daemon and walletd clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;

pub const JSON_RPC_VERSION: &str = "2.0";
pub const JSON_RPC_PATH: &str = "/json_rpc";

/// Request id walletd envelopes carry. The daemon envelope has none.
pub const WALLETD_REQUEST_ID: u64 = 1;

/// `{jsonrpc, id?, method, params, password?}`, built fresh for every call.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub method: &'a str,
    pub params: &'a P,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
}

impl<'a, P: Serialize> JsonRpcRequest<'a, P> {
    pub fn new(method: &'a str, params: &'a P) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION,
            id: None,
            method,
            params,
            password: None,
        }
    }

    /// Attach the walletd id and password.
    pub fn with_password(mut self, password: &'a str) -> Self {
        self.id = Some(WALLETD_REQUEST_ID);
        self.password = Some(password);
        self
    }

    pub fn to_body(&self) -> Result<String, RpcError> {
        serde_json::to_string(self)
            .map_err(|e| RpcError::Validation(format!("encode `{}` params: {e}", self.method)))
    }
}

/// Parameters of a method that takes none: serializes as `{}`.
#[derive(Debug, Default, Serialize)]
pub struct NoParams {}

/// Fail with [`RpcError::Remote`] when a decoded JSON-RPC body carries a
/// non-null `error` member; otherwise hand the body back untouched.
pub fn reject_jsonrpc_error(body: Value) -> Result<Value, RpcError> {
    match body.get("error") {
        None | Some(Value::Null) => Ok(body),
        Some(err) => Err(parse_jsonrpc_error(err)),
    }
}

/// `{"code", "message"}` maps onto [`RpcError::Remote`] as is. walletd and
/// the daemon both use that shape; anything else keeps code `0` and carries
/// the raw member so the caller still sees what the service said.
fn parse_jsonrpc_error(err: &Value) -> RpcError {
    #[derive(serde::Deserialize)]
    struct RemoteError {
        code: i64,
        message: String,
    }

    match RemoteError::deserialize(err) {
        Ok(RemoteError { code, message }) => RpcError::Remote { code, message },
        Err(_) => RpcError::Remote {
            code: 0,
            message: format!("unrecognized error member: {err}"),
        },
    }
}
