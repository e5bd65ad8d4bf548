//! TurtleCoind client.
//!
//! Read-only node queries go through plain GETs on named paths; everything
//! else is a JSON-RPC call on `/json_rpc`. Responses are returned as decoded
//! JSON without interpretation; the daemon is the only validator of values.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::ConnectionConfig;
use crate::endpoint::{Auth, Endpoint};
use crate::error::RpcError;
use crate::protocol::NoParams;
use crate::transport::{ReqwestTransport, Transport};
use crate::validation::require_non_empty;

#[derive(Debug, Clone)]
pub struct DaemonClient {
    endpoint: Endpoint,
}

impl DaemonClient {
    /// Client over the default `reqwest` transport. The config's credential,
    /// if any, is ignored: the daemon RPC is unauthenticated.
    pub fn new(config: &ConnectionConfig) -> Result<Self, RpcError> {
        let transport = ReqwestTransport::for_config(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: &ConnectionConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, RpcError> {
        Ok(Self {
            endpoint: Endpoint::new(config, Auth::None, transport)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    // ==========================================================================
    // Named GET paths
    // ==========================================================================

    /// Network and connection information (`/getinfo`).
    pub async fn info(&self) -> Result<Value, RpcError> {
        self.endpoint.get("getinfo").await
    }

    /// Current chain height (`/getheight`).
    pub async fn height(&self) -> Result<Value, RpcError> {
        self.endpoint.get("getheight").await
    }

    /// Fee address and amount configured on the node (`/feeinfo`).
    pub async fn fee(&self) -> Result<Value, RpcError> {
        self.endpoint.get("feeinfo").await
    }

    /// Peers the node is connected to (`/getpeers`).
    pub async fn peers(&self) -> Result<Value, RpcError> {
        self.endpoint.get("getpeers").await
    }

    pub async fn transactions(&self) -> Result<Value, RpcError> {
        self.endpoint.get("gettransactions").await
    }

    // ==========================================================================
    // JSON-RPC methods
    // ==========================================================================

    /// Up to 30 blocks ending at `height` (inclusive).
    pub async fn blocks(&self, height: u64) -> Result<Value, RpcError> {
        self.endpoint
            .json_rpc("f_blocks_list_json", &json!({ "height": height }))
            .await
    }

    pub async fn block(&self, hash: &str) -> Result<Value, RpcError> {
        require_non_empty(hash, "block hash")?;
        self.endpoint
            .json_rpc("f_block_json", &json!({ "hash": hash }))
            .await
    }

    pub async fn transaction(&self, hash: &str) -> Result<Value, RpcError> {
        require_non_empty(hash, "transaction hash")?;
        self.endpoint
            .json_rpc("f_transaction_json", &json!({ "hash": hash }))
            .await
    }

    /// Unconfirmed transactions sitting in the mempool.
    pub async fn transaction_pool(&self) -> Result<Value, RpcError> {
        self.endpoint
            .json_rpc("f_on_transactions_pool_json", &NoParams::default())
            .await
    }

    pub async fn block_count(&self) -> Result<Value, RpcError> {
        self.endpoint
            .json_rpc("getblockcount", &NoParams::default())
            .await
    }

    pub async fn block_hash(&self, height: u64) -> Result<Value, RpcError> {
        self.endpoint.json_rpc("on_getblockhash", &[height]).await
    }

    pub async fn block_template(
        &self,
        reserve_size: u64,
        wallet_address: &str,
    ) -> Result<Value, RpcError> {
        require_non_empty(wallet_address, "wallet address")?;
        self.endpoint
            .json_rpc(
                "getblocktemplate",
                &json!({
                    "reserve_size": reserve_size,
                    "wallet_address": wallet_address,
                }),
            )
            .await
    }

    pub async fn currency_id(&self) -> Result<Value, RpcError> {
        self.endpoint
            .json_rpc("getcurrencyid", &NoParams::default())
            .await
    }

    pub async fn submit_block(&self, block_blob: &str) -> Result<Value, RpcError> {
        require_non_empty(block_blob, "block blob")?;
        self.endpoint.json_rpc("submitblock", &[block_blob]).await
    }

    pub async fn last_block_header(&self) -> Result<Value, RpcError> {
        self.endpoint
            .json_rpc("getlastblockheader", &NoParams::default())
            .await
    }

    pub async fn block_header_by_hash(&self, hash: &str) -> Result<Value, RpcError> {
        require_non_empty(hash, "block hash")?;
        self.endpoint
            .json_rpc("getblockheaderbyhash", &json!({ "hash": hash }))
            .await
    }

    pub async fn block_header_by_height(&self, height: u64) -> Result<Value, RpcError> {
        self.endpoint
            .json_rpc("getblockheaderbyheight", &json!({ "height": height }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use crate::transport::HttpMethod;

    fn client(mock: Arc<MockTransport>) -> DaemonClient {
        DaemonClient::with_transport(&ConnectionConfig::new("127.0.0.1", 11898), mock)
            .expect("valid config")
    }

    #[tokio::test]
    async fn block_count_end_to_end() {
        let mock = MockTransport::builder()
            .respond(200, r#"{"count":1234}"#)
            .build_arc();
        let daemon = client(mock.clone());

        let result = daemon.block_count().await.expect("block count");
        assert_eq!(result["count"], 1234);

        let request = mock.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "http://127.0.0.1:11898/json_rpc");
        assert_eq!(
            mock.last_body(),
            json!({"jsonrpc": "2.0", "method": "getblockcount", "params": {}})
        );
    }

    #[tokio::test]
    async fn named_paths_use_get() {
        let mock = MockTransport::ok();
        let daemon = client(mock.clone());

        daemon.info().await.expect("info");
        daemon.height().await.expect("height");
        daemon.fee().await.expect("fee");
        daemon.peers().await.expect("peers");
        daemon.transactions().await.expect("transactions");

        let requests = mock.requests();
        assert!(requests.iter().all(|r| r.method == HttpMethod::Get && r.body.is_none()));
        let urls: Vec<_> = requests.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://127.0.0.1:11898/getinfo",
                "http://127.0.0.1:11898/getheight",
                "http://127.0.0.1:11898/feeinfo",
                "http://127.0.0.1:11898/getpeers",
                "http://127.0.0.1:11898/gettransactions",
            ]
        );
    }

    #[tokio::test]
    async fn positional_params_methods() {
        let mock = MockTransport::ok();
        let daemon = client(mock.clone());

        daemon.block_hash(100).await.expect("block hash");
        let body = mock.last_body();
        assert_eq!(body["method"], "on_getblockhash");
        assert_eq!(body["params"], json!([100]));

        daemon.submit_block("0100ab").await.expect("submit");
        let body = mock.last_body();
        assert_eq!(body["method"], "submitblock");
        assert_eq!(body["params"], json!(["0100ab"]));
    }

    #[tokio::test]
    async fn keyed_params_methods() {
        let mock = MockTransport::ok();
        let daemon = client(mock.clone());

        daemon.block_template(8, "TRTLminer").await.expect("template");
        assert_eq!(
            mock.last_body()["params"],
            json!({"reserve_size": 8, "wallet_address": "TRTLminer"})
        );

        daemon.block_header_by_height(42).await.expect("header");
        let body = mock.last_body();
        assert_eq!(body["method"], "getblockheaderbyheight");
        assert_eq!(body["params"], json!({"height": 42}));

        daemon.blocks(30).await.expect("blocks");
        assert_eq!(mock.last_body()["method"], "f_blocks_list_json");
    }

    #[tokio::test]
    async fn daemon_never_sends_credentials() {
        let mock = MockTransport::ok();
        let config = ConnectionConfig::daemon_default().with_credential("unused");
        let daemon = DaemonClient::with_transport(&config, mock.clone()).expect("valid config");

        daemon.last_block_header().await.expect("header");
        let request = mock.last_request();
        assert!(request.headers.is_empty());
        assert!(mock.last_body().get("password").is_none());
    }

    #[tokio::test]
    async fn empty_hash_fails_without_request() {
        let mock = MockTransport::ok();
        let daemon = client(mock.clone());

        let err = daemon.block("").await.expect_err("empty hash");
        assert!(matches!(err, RpcError::Validation(_)));
        let err = daemon.submit_block(" ").await.expect_err("empty blob");
        assert!(err.is_local());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn jsonrpc_error_member_is_remote_error() {
        let mock = MockTransport::builder()
            .respond(
                200,
                r#"{"jsonrpc":"2.0","error":{"code":-5,"message":"Block not found"}}"#,
            )
            .build_arc();
        let daemon = client(mock);

        let err = daemon.block("ff").await.expect_err("remote error");
        assert!(matches!(err, RpcError::Remote { code: -5, .. }));
    }

    #[tokio::test]
    async fn http_status_is_protocol_error() {
        let mock = MockTransport::builder().respond(500, "").build_arc();
        let daemon = client(mock);

        let err = daemon.height().await.expect_err("500");
        assert!(matches!(err, RpcError::Protocol { status: 500, .. }));
    }
}
