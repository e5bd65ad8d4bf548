use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::{ConnectionConfig, DaemonNode};
use crate::endpoint::{Auth, Endpoint};
use crate::error::RpcError;
use crate::transport::{ReqwestTransport, Transport};
use crate::validation::{
    is_unset, present, require_exclusive, require_key, require_non_empty, require_path_segment,
};

use super::walletd::Transfer;
use super::WalletClient;

// ==============================================================================
// Request Types
// ==============================================================================

#[derive(Serialize)]
struct WalletFile<'a> {
    filename: &'a str,
    password: &'a str,
}

/// Restore a wallet from its private spend and view keys.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportKey {
    pub filename: String,
    pub password: String,
    pub scan_height: u64,
    pub private_spend_key: String,
    pub private_view_key: String,
}

/// Restore a wallet from its mnemonic seed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSeed {
    pub filename: String,
    pub password: String,
    pub scan_height: u64,
    pub mnemonic_seed: String,
}

/// Restore a view-only wallet from the private view key and its address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportViewOnly {
    pub filename: String,
    pub password: String,
    pub scan_height: u64,
    pub private_view_key: String,
    pub address: String,
}

/// Body of `/transactions/send/advanced`. Unset options fall back to the
/// service defaults.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedTransaction {
    pub destinations: Vec<Transfer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixin: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_addresses: Vec<String>,
    #[serde(rename = "paymentID", skip_serializing_if = "is_unset")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "is_unset")]
    pub change_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_time: Option<u64>,
    #[serde(skip_serializing_if = "is_unset")]
    pub extra: Option<String>,
}

impl AdvancedTransaction {
    fn validate(&self) -> Result<(), RpcError> {
        if self.destinations.is_empty() {
            return Err(RpcError::Validation(
                "at least one destination is required".to_owned(),
            ));
        }
        for destination in &self.destinations {
            require_non_empty(&destination.address, "address of every destination")?;
            if destination.amount == 0 {
                return Err(RpcError::Validation(
                    "amount must be greater than 0 in every destination".to_owned(),
                ));
            }
        }
        require_exclusive(
            present(&self.extra),
            "extra",
            present(&self.payment_id),
            "paymentID",
        )
    }
}

/// Body of `/transactions/send/fusion/advanced`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedFusion {
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixin: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_addresses: Vec<String>,
}

// ==============================================================================
// Client
// ==============================================================================

/// wallet-api client: resource paths, API key in the `X-API-KEY` header.
///
/// `daemon` is the node sent along when a wallet is created, opened or
/// imported. It is part of the client's read-only configuration;
/// [`WalletApiClient::set_node`] re-points the running service but leaves it
/// untouched.
#[derive(Debug, Clone)]
pub struct WalletApiClient {
    endpoint: Endpoint,
    daemon: DaemonNode,
}

impl WalletApiClient {
    /// Fails with [`RpcError::Config`] when the config carries no API key.
    pub fn new(config: &ConnectionConfig, daemon: DaemonNode) -> Result<Self, RpcError> {
        config.require_credential("API key")?;
        let transport = ReqwestTransport::for_config(config)?;
        Self::with_transport(config, daemon, Arc::new(transport))
    }

    pub fn with_transport(
        config: &ConnectionConfig,
        daemon: DaemonNode,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, RpcError> {
        let api_key = config.require_credential("API key")?.to_owned();
        Ok(Self {
            endpoint: Endpoint::new(config, Auth::ApiKeyHeader(api_key), transport)?,
            daemon,
        })
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    pub fn daemon(&self) -> &DaemonNode {
        &self.daemon
    }

    /// Daemon settings merged with a wallet-file request body.
    fn wallet_body<T: Serialize>(&self, request: &T) -> Result<Value, RpcError> {
        let encode = |e: serde_json::Error| RpcError::Validation(format!("encode wallet body: {e}"));
        let mut body = serde_json::to_value(&self.daemon).map_err(encode)?;
        let request = serde_json::to_value(request).map_err(encode)?;
        if let (Some(body), Value::Object(fields)) = (body.as_object_mut(), request) {
            body.extend(fields);
        }
        Ok(body)
    }

    // ==========================================================================
    // Wallet file operations
    // ==========================================================================

    pub async fn create_wallet(&self, filename: &str, password: &str) -> Result<Value, RpcError> {
        require_wallet_file(filename, password)?;
        let body = self.wallet_body(&WalletFile { filename, password })?;
        self.endpoint.post("wallet/create", Some(&body)).await
    }

    pub async fn import_key(&self, request: &ImportKey) -> Result<Value, RpcError> {
        require_wallet_file(&request.filename, &request.password)?;
        require_key(&request.private_spend_key, "private spend key")?;
        require_key(&request.private_view_key, "private view key")?;
        let body = self.wallet_body(request)?;
        self.endpoint.post("wallet/import/key", Some(&body)).await
    }

    pub async fn import_seed(&self, request: &ImportSeed) -> Result<Value, RpcError> {
        require_wallet_file(&request.filename, &request.password)?;
        require_non_empty(&request.mnemonic_seed, "mnemonic seed")?;
        let body = self.wallet_body(request)?;
        self.endpoint.post("wallet/import/seed", Some(&body)).await
    }

    pub async fn import_view_only(&self, request: &ImportViewOnly) -> Result<Value, RpcError> {
        require_wallet_file(&request.filename, &request.password)?;
        require_key(&request.private_view_key, "private view key")?;
        require_non_empty(&request.address, "address")?;
        let body = self.wallet_body(request)?;
        self.endpoint.post("wallet/import/view", Some(&body)).await
    }

    /// Open an existing wallet file. The service answers `403` while another
    /// wallet is open.
    pub async fn open_wallet(&self, filename: &str, password: &str) -> Result<Value, RpcError> {
        require_wallet_file(filename, password)?;
        let body = self.wallet_body(&WalletFile { filename, password })?;
        self.endpoint.post("wallet/open", Some(&body)).await
    }

    /// Save and close the open wallet.
    pub async fn close_wallet(&self) -> Result<Value, RpcError> {
        self.endpoint.delete("wallet").await
    }

    // ==========================================================================
    // Addresses
    // ==========================================================================

    /// First address of the container; the default change address.
    pub async fn primary_address(&self) -> Result<Value, RpcError> {
        self.endpoint.get("addresses/primary").await
    }

    /// Add a spendable subwallet from its private spend key.
    pub async fn import_address(
        &self,
        scan_height: u64,
        private_spend_key: &str,
    ) -> Result<Value, RpcError> {
        require_key(private_spend_key, "private spend key")?;
        let body = json!({ "scanHeight": scan_height, "privateSpendKey": private_spend_key });
        self.endpoint.post("addresses/import", Some(&body)).await
    }

    /// Add a view-only subwallet from its public spend key.
    pub async fn import_view_address(
        &self,
        scan_height: u64,
        public_spend_key: &str,
    ) -> Result<Value, RpcError> {
        require_key(public_spend_key, "public spend key")?;
        let body = json!({ "scanHeight": scan_height, "publicSpendKey": public_spend_key });
        self.endpoint.post("addresses/import/view", Some(&body)).await
    }

    /// Break an address down and check it belongs to this network.
    pub async fn validate_address(&self, address: &str) -> Result<Value, RpcError> {
        require_non_empty(address, "address")?;
        let body = json!({ "address": address });
        self.endpoint.post("addresses/validate", Some(&body)).await
    }

    // ==========================================================================
    // Node
    // ==========================================================================

    /// Daemon address, port, fee and fee address the service is using.
    pub async fn node_details(&self) -> Result<Value, RpcError> {
        self.endpoint.get("node").await
    }

    pub async fn set_node(&self, node: &DaemonNode) -> Result<Value, RpcError> {
        require_non_empty(&node.host, "daemon host")?;
        if node.port == 0 {
            return Err(RpcError::Validation("daemon port is required".to_owned()));
        }
        self.endpoint.put("node", Some(node)).await
    }

    // ==========================================================================
    // Balances & maintenance
    // ==========================================================================

    /// Balance of every address in the container.
    pub async fn balances(&self) -> Result<Value, RpcError> {
        self.endpoint.get("balances").await
    }

    /// Rescan from `scan_height` and save.
    pub async fn reset(&self, scan_height: u64) -> Result<Value, RpcError> {
        let body = json!({ "scanHeight": scan_height });
        self.endpoint.put("reset", Some(&body)).await
    }

    // ==========================================================================
    // Transactions
    // ==========================================================================

    /// Transactions from `start_height`; `end_height` only applies when it is
    /// above the start. Without a start height every transaction is listed.
    pub async fn transactions(
        &self,
        start_height: Option<u64>,
        end_height: Option<u64>,
    ) -> Result<Value, RpcError> {
        let mut path = "transactions".to_owned();
        if let Some(start) = start_height {
            path.push_str(&height_range(start, end_height));
        }
        self.endpoint.get(&path).await
    }

    pub async fn transactions_by_address(
        &self,
        address: &str,
        start_height: u64,
        end_height: Option<u64>,
    ) -> Result<Value, RpcError> {
        require_path_segment(address, "address")?;
        let path = format!(
            "transactions/address/{address}{}",
            height_range(start_height, end_height)
        );
        self.endpoint.get(&path).await
    }

    /// Transaction private key, for auditing.
    pub async fn transaction_private_key(&self, hash: &str) -> Result<Value, RpcError> {
        require_path_segment(hash, "transaction hash")?;
        self.endpoint
            .get(&format!("transactions/privatekey/{hash}"))
            .await
    }

    pub async fn send_basic_transaction(
        &self,
        destination: &str,
        amount: u64,
        payment_id: Option<&str>,
    ) -> Result<Value, RpcError> {
        require_non_empty(destination, "destination address")?;
        if amount == 0 {
            return Err(RpcError::Validation(
                "amount must be greater than 0".to_owned(),
            ));
        }
        let mut body = json!({ "destination": destination, "amount": amount });
        if let Some(payment_id) = payment_id.filter(|p| !p.is_empty()) {
            body["paymentID"] = json!(payment_id);
        }
        self.endpoint
            .post("transactions/send/basic", Some(&body))
            .await
    }

    pub async fn send_advanced_transaction(
        &self,
        request: &AdvancedTransaction,
    ) -> Result<Value, RpcError> {
        request.validate()?;
        self.endpoint
            .post("transactions/send/advanced", Some(request))
            .await
    }

    /// Send one fusion transaction if the container has outputs to fuse.
    pub async fn send_basic_fusion(&self) -> Result<Value, RpcError> {
        self.endpoint
            .post("transactions/send/fusion/basic", None::<&Value>)
            .await
    }

    pub async fn send_advanced_fusion(&self, request: &AdvancedFusion) -> Result<Value, RpcError> {
        require_non_empty(&request.destination, "destination address")?;
        self.endpoint
            .post("transactions/send/fusion/advanced", Some(request))
            .await
    }
}

fn require_wallet_file(filename: &str, password: &str) -> Result<(), RpcError> {
    require_non_empty(filename, "filename of the wallet")?;
    require_non_empty(password, "password of the wallet")
}

fn height_range(start: u64, end: Option<u64>) -> String {
    match end {
        Some(end) if end > start => format!("/{start}/{end}"),
        _ => format!("/{start}"),
    }
}

#[async_trait]
impl WalletClient for WalletApiClient {
    async fn status(&self) -> Result<Value, RpcError> {
        self.endpoint.get("status").await
    }

    async fn save(&self) -> Result<Value, RpcError> {
        self.endpoint.put("save", None::<&Value>).await
    }

    async fn addresses(&self) -> Result<Value, RpcError> {
        self.endpoint.get("addresses").await
    }

    async fn create_address(&self) -> Result<Value, RpcError> {
        self.endpoint.post("addresses/create", None::<&Value>).await
    }

    /// The primary address cannot be deleted; the service rejects it.
    async fn delete_address(&self, address: &str) -> Result<Value, RpcError> {
        require_path_segment(address, "address")?;
        self.endpoint.delete(&format!("addresses/{address}")).await
    }

    async fn balance(&self, address: Option<&str>) -> Result<Value, RpcError> {
        match address {
            Some(address) => {
                require_path_segment(address, "address")?;
                self.endpoint.get(&format!("balance/{address}")).await
            }
            None => self.endpoint.get("balance").await,
        }
    }

    async fn view_key(&self) -> Result<Value, RpcError> {
        self.endpoint.get("keys").await
    }

    async fn spend_keys(&self, address: &str) -> Result<Value, RpcError> {
        require_path_segment(address, "address")?;
        self.endpoint.get(&format!("keys/{address}")).await
    }

    async fn mnemonic_seed(&self, address: &str) -> Result<Value, RpcError> {
        require_path_segment(address, "address")?;
        self.endpoint.get(&format!("keys/mnemonic/{address}")).await
    }

    async fn transaction(&self, hash: &str) -> Result<Value, RpcError> {
        require_path_segment(hash, "transaction hash")?;
        self.endpoint.get(&format!("transactions/hash/{hash}")).await
    }

    async fn unconfirmed_transactions(&self, address: Option<&str>) -> Result<Value, RpcError> {
        match address {
            Some(address) => {
                require_path_segment(address, "address")?;
                self.endpoint
                    .get(&format!("transactions/unconfirmed/{address}"))
                    .await
            }
            None => self.endpoint.get("transactions/unconfirmed").await,
        }
    }

    async fn create_integrated_address(
        &self,
        address: &str,
        payment_id: &str,
    ) -> Result<Value, RpcError> {
        require_path_segment(address, "address")?;
        require_path_segment(payment_id, "payment id")?;
        self.endpoint
            .get(&format!("addresses/{address}/{payment_id}"))
            .await
    }
}
