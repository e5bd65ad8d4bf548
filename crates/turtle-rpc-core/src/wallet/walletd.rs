use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::ConnectionConfig;
use crate::endpoint::{Auth, Endpoint};
use crate::error::RpcError;
use crate::protocol::NoParams;
use crate::transport::{ReqwestTransport, Transport};
use crate::validation::{is_unset, present, require_exclusive, require_key, require_non_empty};

use super::WalletClient;

// ==============================================================================
// Request Types
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub address: String,
    pub amount: u64,
}

impl Transfer {
    pub fn new(address: impl Into<String>, amount: u64) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }
}

/// Parameters of `sendTransaction` and `createDelayedTransaction`.
///
/// `extra` and `payment_id` are mutually exclusive; an empty string counts as
/// unset. Empty `addresses` lets walletd pick the source addresses.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
    pub transfers: Vec<Transfer>,
    pub fee: u64,
    pub unlock_time: u64,
    #[serde(skip_serializing_if = "is_unset")]
    pub change_address: Option<String>,
    #[serde(skip_serializing_if = "is_unset")]
    pub extra: Option<String>,
    #[serde(skip_serializing_if = "is_unset")]
    pub payment_id: Option<String>,
}

impl TransferRequest {
    fn validate(&self) -> Result<(), RpcError> {
        if self.transfers.is_empty() {
            return Err(RpcError::Validation(
                "at least one transfer is required".to_owned(),
            ));
        }
        for transfer in &self.transfers {
            require_non_empty(&transfer.address, "transfer address")?;
        }
        require_exclusive(
            present(&self.extra),
            "extra",
            present(&self.payment_id),
            "paymentId",
        )
    }
}

/// Parameters of `createAddress`. With neither key set walletd generates a
/// random address; a secret key imports a spendable address and a public key
/// a view-only one.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddress {
    #[serde(skip_serializing_if = "is_unset")]
    pub spend_secret_key: Option<String>,
    #[serde(skip_serializing_if = "is_unset")]
    pub spend_public_key: Option<String>,
}

impl CreateAddress {
    fn validate(&self) -> Result<(), RpcError> {
        let secret = present(&self.spend_secret_key);
        let public = present(&self.spend_public_key);
        require_exclusive(secret, "spendSecretKey", public, "spendPublicKey")?;
        if let Some(key) = secret {
            require_key(key, "spend secret key")?;
        }
        if let Some(key) = public {
            require_key(key, "spend public key")?;
        }
        Ok(())
    }
}

// ==============================================================================
// Client
// ==============================================================================

/// walletd client: JSON-RPC envelopes with the RPC password in the body.
#[derive(Debug, Clone)]
pub struct WalletdClient {
    endpoint: Endpoint,
}

impl WalletdClient {
    /// Fails with [`RpcError::Config`] when the config carries no RPC password.
    pub fn new(config: &ConnectionConfig) -> Result<Self, RpcError> {
        config.require_credential("RPC password")?;
        let transport = ReqwestTransport::for_config(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: &ConnectionConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, RpcError> {
        let password = config.require_credential("RPC password")?.to_owned();
        Ok(Self {
            endpoint: Endpoint::new(config, Auth::EnvelopePassword(password), transport)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    async fn call<P: Serialize + Sync>(&self, method: &str, params: &P) -> Result<Value, RpcError> {
        self.endpoint.json_rpc(method, params).await
    }

    /// Resync the container. With a view secret key, replace the container
    /// with one built from that key instead.
    pub async fn reset(&self, view_secret_key: Option<&str>) -> Result<Value, RpcError> {
        match view_secret_key {
            Some(key) => {
                require_key(key, "view secret key")?;
                self.call("reset", &json!({ "viewSecretKey": key })).await
            }
            None => self.call("reset", &NoParams::default()).await,
        }
    }

    /// `createAddress` with an explicit spend key.
    pub async fn create_address_with(&self, params: &CreateAddress) -> Result<Value, RpcError> {
        params.validate()?;
        self.call("createAddress", params).await
    }

    pub async fn block_hashes(
        &self,
        first_block_index: u64,
        block_count: u64,
    ) -> Result<Value, RpcError> {
        self.call("getBlockHashes", &block_range(first_block_index, block_count))
            .await
    }

    pub async fn transaction_hashes(
        &self,
        first_block_index: u64,
        block_count: u64,
    ) -> Result<Value, RpcError> {
        self.call(
            "getTransactionHashes",
            &block_range(first_block_index, block_count),
        )
        .await
    }

    pub async fn transactions(
        &self,
        first_block_index: u64,
        block_count: u64,
    ) -> Result<Value, RpcError> {
        self.call("getTransactions", &block_range(first_block_index, block_count))
            .await
    }

    pub async fn send_transaction(&self, request: &TransferRequest) -> Result<Value, RpcError> {
        request.validate()?;
        self.call("sendTransaction", request).await
    }

    /// Build a transaction without relaying it; push it later with
    /// [`WalletdClient::send_delayed_transaction`].
    pub async fn create_delayed_transaction(
        &self,
        request: &TransferRequest,
    ) -> Result<Value, RpcError> {
        request.validate()?;
        self.call("createDelayedTransaction", request).await
    }

    pub async fn delayed_transaction_hashes(&self) -> Result<Value, RpcError> {
        self.call("getDelayedTransactionHashes", &NoParams::default())
            .await
    }

    pub async fn delete_delayed_transaction(&self, hash: &str) -> Result<Value, RpcError> {
        require_non_empty(hash, "transaction hash")?;
        self.call("deleteDelayedTransaction", &json!({ "transactionHash": hash }))
            .await
    }

    pub async fn send_delayed_transaction(&self, hash: &str) -> Result<Value, RpcError> {
        require_non_empty(hash, "transaction hash")?;
        self.call("sendDelayedTransaction", &json!({ "transactionHash": hash }))
            .await
    }

    /// Consolidate outputs below `threshold` of `addresses` into
    /// `destination`. walletd answers with an error when nothing can be fused.
    pub async fn send_fusion_transaction(
        &self,
        threshold: u64,
        addresses: &[&str],
        destination: Option<&str>,
    ) -> Result<Value, RpcError> {
        let mut params = json!({ "threshold": threshold, "addresses": addresses });
        if let Some(destination) = destination {
            require_non_empty(destination, "destination address")?;
            params["destinationAddress"] = json!(destination);
        }
        self.call("sendFusionTransaction", &params).await
    }

    /// Number of outputs a fusion with `threshold` could optimize.
    pub async fn estimate_fusion(
        &self,
        threshold: u64,
        addresses: &[&str],
    ) -> Result<Value, RpcError> {
        self.call(
            "estimateFusion",
            &json!({ "threshold": threshold, "addresses": addresses }),
        )
        .await
    }

    /// Fee walletd picked up from its daemon.
    pub async fn fee_info(&self) -> Result<Value, RpcError> {
        self.call("getFeeInfo", &NoParams::default()).await
    }
}

fn block_range(first_block_index: u64, block_count: u64) -> Value {
    json!({ "firstBlockIndex": first_block_index, "blockCount": block_count })
}

#[async_trait]
impl WalletClient for WalletdClient {
    async fn status(&self) -> Result<Value, RpcError> {
        self.call("getStatus", &NoParams::default()).await
    }

    async fn save(&self) -> Result<Value, RpcError> {
        self.call("save", &NoParams::default()).await
    }

    async fn addresses(&self) -> Result<Value, RpcError> {
        self.call("getAddresses", &NoParams::default()).await
    }

    async fn create_address(&self) -> Result<Value, RpcError> {
        self.create_address_with(&CreateAddress::default()).await
    }

    async fn delete_address(&self, address: &str) -> Result<Value, RpcError> {
        require_non_empty(address, "address")?;
        self.call("deleteAddress", &json!({ "address": address }))
            .await
    }

    async fn balance(&self, address: Option<&str>) -> Result<Value, RpcError> {
        match address {
            Some(address) => {
                require_non_empty(address, "address")?;
                self.call("getBalance", &json!({ "address": address })).await
            }
            None => self.call("getBalance", &NoParams::default()).await,
        }
    }

    async fn view_key(&self) -> Result<Value, RpcError> {
        self.call("getViewKey", &NoParams::default()).await
    }

    async fn spend_keys(&self, address: &str) -> Result<Value, RpcError> {
        require_non_empty(address, "address")?;
        self.call("getSpendKeys", &json!({ "address": address }))
            .await
    }

    async fn mnemonic_seed(&self, address: &str) -> Result<Value, RpcError> {
        require_non_empty(address, "address")?;
        self.call("getMnemonicSeed", &json!({ "address": address }))
            .await
    }

    async fn transaction(&self, hash: &str) -> Result<Value, RpcError> {
        require_non_empty(hash, "transaction hash")?;
        self.call("getTransaction", &json!({ "transactionHash": hash }))
            .await
    }

    async fn unconfirmed_transactions(&self, address: Option<&str>) -> Result<Value, RpcError> {
        match address {
            Some(address) => {
                require_non_empty(address, "address")?;
                self.call(
                    "getUnconfirmedTransactionHashes",
                    &json!({ "address": address }),
                )
                .await
            }
            None => {
                self.call("getUnconfirmedTransactionHashes", &NoParams::default())
                    .await
            }
        }
    }

    async fn create_integrated_address(
        &self,
        address: &str,
        payment_id: &str,
    ) -> Result<Value, RpcError> {
        require_non_empty(address, "address")?;
        require_non_empty(payment_id, "payment id")?;
        self.call(
            "createIntegratedAddress",
            &json!({ "address": address, "paymentId": payment_id }),
        )
        .await
    }
}
