mod gateway;
mod repl;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gateway::ChainGateway;
use migra_core::{validate_module_address, AssetSession, Command, ModuleId};

#[derive(Parser)]
#[command(name = "migra", about = "Console for the test faucet's Coin and FA representations", version)]
struct Cli {
    /// Fullnode REST endpoint
    #[arg(
        long,
        env = "MIGRA_NODE_URL",
        default_value = "https://fullnode.testnet.aptoslabs.com"
    )]
    node: String,

    /// Wallet bridge endpoint for signing and broadcast (read-only without it)
    #[arg(long, env = "MIGRA_BRIDGE_URL")]
    bridge: Option<String>,

    /// Address of the deployed test_faucet module
    #[arg(long, env = "MIGRA_MODULE_ADDRESS")]
    module_address: String,

    /// Account address to connect on startup
    #[arg(long)]
    account: Option<String>,

    /// Run a single command and exit
    #[arg(long)]
    cmd: Option<String>,

    /// Allow connecting to non-HTTPS endpoints
    #[arg(long)]
    insecure: bool,

    /// Verbose tracing output on stderr
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    validate_module_address(&cli.module_address)?;
    let gateway = Arc::new(ChainGateway::new(
        &cli.node,
        cli.bridge.as_deref(),
        cli.insecure,
    )?);
    if !gateway.has_bridge() {
        tracing::warn!("no wallet bridge configured; mutating actions are disabled");
    }

    let session = Arc::new(AssetSession::new(
        gateway.clone(),
        gateway.clone(),
        ModuleId::new(cli.module_address.clone()),
    ));
    if let Some(account) = &cli.account {
        session.set_account(Some(account.clone())).await;
    }

    if let Some(cmd_str) = &cli.cmd {
        run_oneshot(&session, cmd_str).await
    } else {
        repl::run_repl(session).await
    }
}

async fn run_oneshot(session: &Arc<AssetSession>, cmd_str: &str) -> Result<()> {
    let command = Command::parse(cmd_str)?;
    if command == Command::Exit {
        return Ok(());
    }

    let output = command.execute(session).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
