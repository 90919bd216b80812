mod aggregator;
mod app;
mod config;
mod errors;
mod math;
mod report;
mod tokens;
mod wallet;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Jupiter self-swap poller for Solana")]
struct Args {
    /// RPC endpoint URL
    #[arg(long)]
    rpc_url: Option<String>,

    /// Aggregator API base URL
    #[arg(long)]
    aggregator_url: Option<String>,

    /// Token list URL
    #[arg(long)]
    token_list_url: Option<String>,

    /// Cluster name (mainnet-beta, devnet, testnet)
    #[arg(long)]
    cluster: Option<String>,

    /// Mint address of the traded token
    #[arg(long)]
    mint: Option<String>,

    /// Amount to swap each cycle, in UI units
    #[arg(long)]
    amount: Option<f64>,

    /// Slippage tolerance in basis points
    #[arg(long)]
    slippage_bps: Option<u32>,

    /// Number of polling cycles to run
    #[arg(long)]
    iterations: Option<u32>,

    /// Seconds between polling cycles
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Quote routes without executing swaps
    #[arg(long)]
    dry_run: bool,

    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // SECRET_KEY may live in a local .env
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    // Load base configuration from file if provided
    let base_config = if let Some(config_path) = &args.config {
        config::Config::from_file(config_path)?
    } else {
        config::Config::default()
    };

    // Create AppCfg with priority: CLI args > Config file > Defaults
    let mut app_cfg = app::AppCfg::from_config(base_config, args.dry_run)?;

    if let Some(rpc_url) = args.rpc_url {
        app_cfg.rpc_url = rpc_url;
    }
    if let Some(aggregator_url) = args.aggregator_url {
        app_cfg.aggregator_url = aggregator_url;
    }
    if let Some(token_list_url) = args.token_list_url {
        app_cfg.token_list_url = token_list_url;
    }
    if let Some(cluster) = args.cluster {
        app_cfg.cluster = cluster.parse()?;
    }
    if let Some(mint) = args.mint {
        app_cfg.mint = mint;
    }
    if let Some(amount) = args.amount {
        app_cfg.amount = amount;
    }
    if let Some(slippage_bps) = args.slippage_bps {
        app_cfg.slippage_bps = slippage_bps;
    }
    if let Some(iterations) = args.iterations {
        app_cfg.iterations = iterations;
    }
    if let Some(interval_secs) = args.interval_secs {
        app_cfg.interval_secs = interval_secs;
    }

    app::run(app_cfg).await
}
