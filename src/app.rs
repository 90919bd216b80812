// src/app.rs
use anyhow::Result;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::aggregator::{Aggregator, Cluster, JupiterClient, Route, RouteParams};
use crate::config::Config;
use crate::math;
use crate::report::SwapReport;
use crate::tokens::{self, Token};
use crate::wallet;

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub dry_run: bool,
    pub rpc_url: String,
    pub aggregator_url: String,
    pub token_list_url: String,
    pub cluster: Cluster,
    pub mint: String,
    pub amount: f64,
    pub slippage_bps: u32,
    pub iterations: u32,
    pub interval_secs: u64,
}

impl AppCfg {
    pub fn from_config(cfg: Config, override_dry_run: bool) -> Result<Self> {
        Ok(Self {
            dry_run: if override_dry_run {
                true
            } else {
                cfg.trade.dry_run.unwrap_or(false)
            },
            rpc_url: cfg.rpc.url,
            aggregator_url: cfg.aggregator.base_url,
            token_list_url: cfg.aggregator.token_list_url,
            cluster: cfg.aggregator.cluster.parse()?,
            mint: cfg.trade.mint,
            amount: cfg.trade.amount,
            slippage_bps: cfg.trade.slippage_bps,
            iterations: cfg.trade.iterations,
            interval_secs: cfg.trade.interval_secs,
        })
    }
}

fn validate(cfg: &AppCfg) -> Result<()> {
    if let Err(e) = cfg.mint.parse::<Pubkey>() {
        return Err(anyhow::anyhow!("Invalid mint address {}: {}", cfg.mint, e));
    }
    if cfg.amount <= 0.0 {
        return Err(anyhow::anyhow!("Trade amount must be positive"));
    }
    if cfg.iterations == 0 {
        return Err(anyhow::anyhow!("Iteration count must be at least 1"));
    }
    if cfg.interval_secs == 0 {
        return Err(anyhow::anyhow!("Polling interval must be at least 1 second"));
    }
    Ok(())
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    info!("Starting Jupiter self-swap poller");
    info!("Configuration: {:?}", app_cfg);

    validate(&app_cfg)?;

    // Load keypair
    let keypair = Arc::new(wallet::read_keypair_from_env()?);
    info!("Loaded keypair: {}", keypair.pubkey());

    // Initialize RPC client
    let rpc_client = Arc::new(RpcClient::new(app_cfg.rpc_url.clone()));

    // Resolve the traded token from the aggregator token list
    let http = reqwest::Client::new();
    let registry = tokens::fetch_token_list(&http, &app_cfg.token_list_url).await?;
    let token = registry.require_by_mint(&app_cfg.mint)?.clone();
    info!("Trading token: {} ({} decimals)", token.symbol, token.decimals);

    let aggregator = JupiterClient::new(
        rpc_client,
        keypair,
        app_cfg.cluster,
        &app_cfg.aggregator_url,
    )?;

    run_polling_loop(&app_cfg, &aggregator, &token).await
}

async fn run_polling_loop(
    cfg: &AppCfg,
    aggregator: &dyn Aggregator,
    token: &Token,
) -> Result<()> {
    info!("Running in polling mode");

    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(cfg.interval_secs));

    for cycle in 1..=cfg.iterations {
        interval.tick().await;

        // One failed cycle must not take the poller down
        match swap_cycle(cfg, aggregator, token, cycle).await {
            Ok(true) => info!("✅ Cycle {} executed a swap", cycle),
            Ok(false) => {}
            Err(e) => error!("❌ Cycle {} failed: {}", cycle, e),
        }
    }

    Ok(())
}

/// One polling cycle: quote the round trip and execute the best route
/// when it beats the input after slippage. Returns whether a swap ran.
async fn swap_cycle(
    cfg: &AppCfg,
    aggregator: &dyn Aggregator,
    token: &Token,
    cycle: u32,
) -> Result<bool> {
    let routes = get_routes(aggregator, token, cfg.amount, cfg.slippage_bps).await?;

    let best = match routes.first() {
        Some(best) => best,
        None => return Ok(false),
    };

    let input_amount = math::to_smallest_units(cfg.amount, token.decimals);
    if best.out_amount_with_slippage <= input_amount {
        info!(
            "Best route below break-even, skipping (after slippage: {}, input: {})",
            best.out_amount_with_slippage, input_amount
        );
        return Ok(false);
    }

    if cfg.dry_run {
        info!("Dry run - not executing swap");
        return Ok(false);
    }

    execute_swap(aggregator, token, cfg.cluster, best, cycle).await?;
    Ok(true)
}

async fn get_routes(
    aggregator: &dyn Aggregator,
    token: &Token,
    amount: f64,
    slippage_bps: u32,
) -> Result<Vec<Route>> {
    info!("Getting routes for {} {} -> {}...", amount, token.symbol, token.symbol);

    let mint: Pubkey = token.address.parse()?;
    let params = RouteParams {
        input_mint: mint,
        output_mint: mint,
        amount: math::to_smallest_units(amount, token.decimals),
        slippage_bps,
    };

    let routes = aggregator.compute_routes(&params).await?;
    info!("Possible number of routes: {}", routes.len());
    if let Some(best) = routes.first() {
        info!(
            "Best quote: {} ({})",
            math::from_smallest_units(best.out_amount, token.decimals),
            token.symbol
        );
        debug!(
            "Best route: price impact {}, venues {}",
            best.price_impact_pct,
            best.venues()
        );
    }

    Ok(routes)
}

async fn execute_swap(
    aggregator: &dyn Aggregator,
    token: &Token,
    cluster: Cluster,
    route: &Route,
    cycle: u32,
) -> Result<()> {
    info!("Executing swap via {}", route.venues());

    let result = aggregator.execute_swap(route).await?;

    info!("Swap succeeded: {}", result.txid);
    info!(
        "inputAddress={} outputAddress={}",
        result.input_address, result.output_address
    );
    info!(
        "inputAmount={} outputAmount={}",
        math::format_amount(result.input_amount, token.decimals),
        math::format_amount(result.output_amount, token.decimals)
    );

    let report = SwapReport::new(cycle, token, cluster, &result);
    info!("Swap report: {}", report.to_json()?);

    Ok(())
}
