pub mod config;
pub mod daemon;
pub mod endpoint;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod validation;
pub mod wallet;

pub use config::{ConnectionConfig, DaemonNode};
pub use daemon::DaemonClient;
pub use error::RpcError;
pub use transport::{ReqwestTransport, Transport};
pub use wallet::{WalletApiClient, WalletClient, WalletdClient};
