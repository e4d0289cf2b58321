mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::info;
use vc_chain_eip1193::{ConfirmationPolicy, Eip1193Wallet, HttpTransport};
use vc_session_core::{ContractConfig, SessionController};

type HttpWallet = Eip1193Wallet<HttpTransport>;

/// Connect to a node-managed account, then read or update the stored number.
#[derive(Debug, Parser)]
#[command(name = "vc-session", version)]
pub(crate) struct Cli {
    /// JSON-RPC endpoint of the node holding the signing account.
    #[arg(long, env = "VC_RPC_URL")]
    rpc_url: Option<String>,

    /// Contract deployment file (address, optional chain_id, abi).
    #[arg(long, env = "VC_CONTRACT_CONFIG")]
    config: PathBuf,

    /// Give up on an unmined write after this many seconds.
    #[arg(long)]
    confirm_timeout: Option<u64>,

    /// Milliseconds between receipt polls.
    #[arg(long, default_value_t = 1000)]
    poll_interval: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Connect and print the session summary.
    Status,
    /// Fetch the stored number.
    Read,
    /// Store a new number and wait for confirmation.
    Write { value: String },
}

impl Cli {
    fn confirmation(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            poll_interval: Duration::from_millis(self.poll_interval),
            timeout: self.confirm_timeout.map(Duration::from_secs),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ContractConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let transport = HttpTransport::new(cli.rpc_url.clone());
    info!("using JSON-RPC endpoint {}", transport.endpoint());
    let wallet = Rc::new(HttpWallet::with_policy(transport, cli.confirmation()));
    let controller = SessionController::new(Some(wallet), config);

    let outcome = commands::run(&controller, &cli.command).await;
    println!("{}", serde_json::to_string_pretty(&controller.snapshot().summary())?);
    outcome
}
