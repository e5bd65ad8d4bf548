//! Wallet service clients.
//!
//! Two services manage wallet containers and their wire contracts are
//! incompatible, so each gets its own client:
//!
//! - [`WalletdClient`] talks to `walletd`: every call is a JSON-RPC envelope
//!   POSTed to `/json_rpc` with the RPC password inside the body.
//! - [`WalletApiClient`] talks to `wallet-api`: resource paths with
//!   GET/POST/PUT/DELETE and the API key in the `X-API-KEY` header.
//!
//! The operations both services offer are exposed through [`WalletClient`].

mod wallet_api;
mod walletd;

pub use wallet_api::{
    AdvancedFusion, AdvancedTransaction, ImportKey, ImportSeed, ImportViewOnly, WalletApiClient,
};
pub use walletd::{CreateAddress, Transfer, TransferRequest, WalletdClient};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RpcError;

/// Capabilities shared by both wallet services.
///
/// Every method returns the service's decoded response unchanged. Calls that
/// the service answers with no content yield [`Value::Null`].
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Sync state of the container and the known top block height.
    async fn status(&self) -> Result<Value, RpcError>;

    /// Persist the container without closing it.
    async fn save(&self) -> Result<Value, RpcError>;

    async fn addresses(&self) -> Result<Value, RpcError>;

    /// Add a new random address to the container.
    async fn create_address(&self) -> Result<Value, RpcError>;

    async fn delete_address(&self, address: &str) -> Result<Value, RpcError>;

    /// Balance of `address`, or of the whole container when `None`.
    async fn balance(&self, address: Option<&str>) -> Result<Value, RpcError>;

    /// Shared private view key of the container.
    async fn view_key(&self) -> Result<Value, RpcError>;

    /// Public and private spend keys of `address`.
    async fn spend_keys(&self, address: &str) -> Result<Value, RpcError>;

    async fn mnemonic_seed(&self, address: &str) -> Result<Value, RpcError>;

    async fn transaction(&self, hash: &str) -> Result<Value, RpcError>;

    /// Unconfirmed transactions of `address`, or of the whole container.
    async fn unconfirmed_transactions(&self, address: Option<&str>) -> Result<Value, RpcError>;

    async fn create_integrated_address(
        &self,
        address: &str,
        payment_id: &str,
    ) -> Result<Value, RpcError>;
}
