mod cli;

use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde_json::Value;

use turtle_rpc_core::config::{DEFAULT_DAEMON_PORT, DEFAULT_WALLET_PORT};
use turtle_rpc_core::{
    ConnectionConfig, DaemonClient, DaemonNode, RpcError, WalletApiClient, WalletClient,
    WalletdClient,
};

use cli::{Cli, Connection, DaemonCommand, Service, WalletCommand};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let (config, result) = match args.service {
        Service::Daemon { command } => {
            let config = connection_config(&args.connection, DEFAULT_DAEMON_PORT);
            let daemon = DaemonClient::new(&config).context("build daemon client")?;
            tracing::debug!(url = daemon.base_url(), "querying daemon");
            (config, run_daemon(&daemon, command).await)
        }
        Service::Walletd { password, command } => {
            let config = connection_config(&args.connection, DEFAULT_WALLET_PORT)
                .with_credential(password);
            let wallet = WalletdClient::new(&config).context("build walletd client")?;
            (config, run_wallet(&wallet, command).await)
        }
        Service::WalletApi { api_key, command } => {
            let config = connection_config(&args.connection, DEFAULT_WALLET_PORT)
                .with_credential(api_key);
            let wallet = WalletApiClient::new(&config, DaemonNode::default())
                .context("build wallet-api client")?;
            (config, run_wallet(&wallet, command).await)
        }
    };

    let value = result.map_err(|err| {
        let url = config.base_url().unwrap_or_else(|_| config.host.clone());
        eyre!(format_rpc_error(&url, &err)).wrap_err("RPC request failed")
    })?;

    let rendered = serde_json::to_string_pretty(&value).context("render response")?;
    println!("{rendered}");
    Ok(())
}

fn connection_config(connection: &Connection, default_port: u16) -> ConnectionConfig {
    ConnectionConfig::new(
        connection.host.clone(),
        connection.port.unwrap_or(default_port),
    )
    .with_tls(connection.tls)
    .with_timeout(Duration::from_secs(connection.timeout_secs))
}

async fn run_daemon(daemon: &DaemonClient, command: DaemonCommand) -> Result<Value, RpcError> {
    match command {
        DaemonCommand::Info => daemon.info().await,
        DaemonCommand::Height => daemon.height().await,
        DaemonCommand::Fee => daemon.fee().await,
        DaemonCommand::Peers => daemon.peers().await,
        DaemonCommand::BlockCount => daemon.block_count().await,
        DaemonCommand::LastBlockHeader => daemon.last_block_header().await,
        DaemonCommand::BlockHeader { height, hash } => match (height, hash) {
            (Some(height), _) => daemon.block_header_by_height(height).await,
            (None, Some(hash)) => daemon.block_header_by_hash(&hash).await,
            (None, None) => Err(RpcError::Validation(
                "height or hash not specified".to_owned(),
            )),
        },
        DaemonCommand::Block { hash } => daemon.block(&hash).await,
        DaemonCommand::Transaction { hash } => daemon.transaction(&hash).await,
        DaemonCommand::Pool => daemon.transaction_pool().await,
    }
}

async fn run_wallet(wallet: &dyn WalletClient, command: WalletCommand) -> Result<Value, RpcError> {
    match command {
        WalletCommand::Status => wallet.status().await,
        WalletCommand::Addresses => wallet.addresses().await,
        WalletCommand::Balance { address } => wallet.balance(address.as_deref()).await,
        WalletCommand::ViewKey => wallet.view_key().await,
        WalletCommand::Unconfirmed { address } => {
            wallet.unconfirmed_transactions(address.as_deref()).await
        }
        WalletCommand::Save => wallet.save().await,
    }
}

fn format_rpc_error(url: &str, err: &RpcError) -> String {
    let source_error = err.to_string();
    let mut lines = vec![
        format!("request to `{url}` failed"),
        format!("RPC error: {source_error}"),
    ];

    match err {
        RpcError::Transport(_) => {
            if source_error.contains("dns error") {
                lines.push(
                    "hint: hostname resolution failed; verify --host and your DNS/network".into(),
                );
            } else if source_error.contains("tls") || source_error.contains("certificate") {
                lines.push(
                    "hint: TLS handshake failed; check whether the service actually serves HTTPS"
                        .into(),
                );
            } else if source_error.contains("error sending request") {
                lines.push(
                    "hint: service is unreachable; verify --host, --port and that it is running"
                        .into(),
                );
            }
        }
        RpcError::Protocol { status: 401, .. } => {
            lines.push("hint: authentication failed; verify --password or --api-key".into());
        }
        RpcError::Protocol { status: 404, .. } => {
            lines.push(
                "hint: endpoint not found; verify --port points at the right service".into(),
            );
        }
        _ => {}
    }

    lines.join("\n")
}
