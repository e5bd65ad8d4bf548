//! Connection settings supplied by the embedding application.
//!
//! Nothing here reads the environment or the filesystem; the caller builds a
//! [`ConnectionConfig`] once and hands it to a client, which keeps it
//! read-only for its whole lifetime.

use std::fmt;
use std::net::Ipv6Addr;
use std::time::Duration;

use reqwest::Url;

use crate::error::RpcError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_DAEMON_PORT: u16 = 11898;
pub const DEFAULT_WALLET_PORT: u16 = 8070;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ==============================================================================
// Connection Config
// ==============================================================================

/// Where a service lives and how to authenticate against it.
///
/// The credential is interpreted by the client that consumes the config: the
/// walletd client sends it as the envelope `password`, the wallet-api client
/// sends it as the `X-API-KEY` header and the daemon client ignores it.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub credential: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            tls: false,
            credential: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Local TurtleCoind on its default RPC port.
    pub fn daemon_default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_DAEMON_PORT)
    }

    /// Local walletd / wallet-api on their default RPC port.
    pub fn wallet_default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_WALLET_PORT)
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    fn scheme(&self) -> &'static str {
        if self.tls {
            "https"
        } else {
            "http"
        }
    }

    /// Render and validate `scheme://host:port` (no trailing slash).
    pub fn base_url(&self) -> Result<String, RpcError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(RpcError::Config("host must not be empty".to_owned()));
        }
        if self.port == 0 {
            return Err(RpcError::Config("port must be non-zero".to_owned()));
        }

        let base = match host.parse::<Ipv6Addr>() {
            Ok(_) => format!("{}://[{}]:{}", self.scheme(), host, self.port),
            Err(_) => format!("{}://{}:{}", self.scheme(), host, self.port),
        };
        let parsed = Url::parse(&base)
            .map_err(|e| RpcError::Config(format!("invalid host `{host}`: {e}")))?;
        if parsed.path() != "/" || parsed.query().is_some() {
            return Err(RpcError::Config(format!(
                "host `{host}` must not contain a path or query"
            )));
        }
        Ok(base)
    }

    /// The credential, or a `Config` error naming what it is used for.
    pub(crate) fn require_credential(&self, what: &str) -> Result<&str, RpcError> {
        match self.credential.as_deref() {
            Some(credential) if !credential.is_empty() => Ok(credential),
            _ => Err(RpcError::Config(format!("{what} not specified"))),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

// ==============================================================================
// Daemon Node
// ==============================================================================

/// The daemon a wallet-api instance attaches to when a wallet is created,
/// opened or imported.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DaemonNode {
    #[serde(rename = "daemonHost")]
    pub host: String,
    #[serde(rename = "daemonPort")]
    pub port: u16,
    #[serde(rename = "daemonSSL")]
    pub ssl: bool,
}

impl Default for DaemonNode {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_DAEMON_PORT,
            ssl: false,
        }
    }
}
