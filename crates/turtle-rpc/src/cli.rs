use clap::{Args, Parser, Subcommand};

/// turtle-rpc: query a TurtleCoind daemon, a walletd container or a
/// wallet-api instance from the command line.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(flatten)]
    pub connection: Connection,

    #[command(subcommand)]
    pub service: Service,
}

#[derive(Args)]
pub struct Connection {
    /// Service host.
    #[arg(long, global = true, default_value = "127.0.0.1", env = "TURTLE_RPC_HOST")]
    pub host: String,

    /// Service port. Defaults to 11898 for the daemon and 8070 for wallets.
    #[arg(long, global = true, env = "TURTLE_RPC_PORT")]
    pub port: Option<u16>,

    /// Connect over HTTPS.
    #[arg(long, global = true)]
    pub tls: bool,

    /// Request timeout in seconds.
    #[arg(long, global = true, default_value = "30")]
    pub timeout_secs: u64,
}

#[derive(Subcommand)]
pub enum Service {
    /// TurtleCoind node queries.
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },

    /// walletd JSON-RPC (password sent in the request envelope).
    Walletd {
        /// walletd RPC password.
        #[arg(long, env = "TURTLE_RPC_PASSWORD", hide_env_values = true)]
        password: String,

        #[command(subcommand)]
        command: WalletCommand,
    },

    /// wallet-api REST (key sent in the X-API-KEY header).
    WalletApi {
        /// wallet-api key.
        #[arg(long, env = "TURTLE_RPC_API_KEY", hide_env_values = true)]
        api_key: String,

        #[command(subcommand)]
        command: WalletCommand,
    },
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Network and connection information.
    Info,
    /// Current chain height.
    Height,
    /// Node fee address and amount.
    Fee,
    /// Connected peers.
    Peers,
    /// Height of the top block.
    BlockCount,
    /// Header of the last block.
    LastBlockHeader,
    /// Block header by height or by hash.
    BlockHeader {
        #[arg(long, conflicts_with = "hash", required_unless_present = "hash")]
        height: Option<u64>,
        #[arg(long)]
        hash: Option<String>,
    },
    /// Block details by hash.
    Block {
        hash: String,
    },
    /// Transaction details by hash.
    Transaction {
        hash: String,
    },
    /// Unconfirmed transactions in the mempool.
    Pool,
}

#[derive(Subcommand)]
pub enum WalletCommand {
    /// Sync status of the container.
    Status,
    /// Addresses in the container.
    Addresses,
    /// Balance of one address or of the whole container.
    Balance {
        #[arg(long)]
        address: Option<String>,
    },
    /// Private view key of the container.
    ViewKey,
    /// Unconfirmed transactions, optionally for one address.
    Unconfirmed {
        #[arg(long)]
        address: Option<String>,
    },
    /// Persist the container.
    Save,
}
