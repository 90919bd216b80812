// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

pub const DEFAULT_RPC_URL: &str = "https://solana-api.projectserum.com";
pub const DEFAULT_AGGREGATOR_URL: &str = "https://quote-api.jup.ag/v2";
pub const DEFAULT_TOKEN_LIST_URL: &str = "https://cache.jup.ag/tokens";
pub const DEFAULT_CLUSTER: &str = "mainnet-beta";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const DEFAULT_AMOUNT: f64 = 1000.0;
pub const DEFAULT_SLIPPAGE_BPS: u32 = 100;
pub const DEFAULT_ITERATIONS: u32 = 1000;
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct RpcCfg {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorCfg {
    pub base_url: String,
    pub token_list_url: String,
    pub cluster: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeCfg {
    pub mint: String,
    pub amount: f64,
    pub slippage_bps: u32,
    pub iterations: u32,
    pub interval_secs: u64,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcCfg,
    pub aggregator: AggregatorCfg,
    pub trade: TradeCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: Self = toml::from_str(&s).context("parse Config.toml")?;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcCfg {
                url: DEFAULT_RPC_URL.to_string(),
            },
            aggregator: AggregatorCfg {
                base_url: DEFAULT_AGGREGATOR_URL.to_string(),
                token_list_url: DEFAULT_TOKEN_LIST_URL.to_string(),
                cluster: DEFAULT_CLUSTER.to_string(),
            },
            trade: TradeCfg {
                mint: USDC_MINT.to_string(),
                amount: DEFAULT_AMOUNT,
                slippage_bps: DEFAULT_SLIPPAGE_BPS,
                iterations: DEFAULT_ITERATIONS,
                interval_secs: DEFAULT_INTERVAL_SECS,
                dry_run: None,
            },
        }
    }
}
