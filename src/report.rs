// src/report.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregator::{Cluster, SwapResult};
use crate::math;
use crate::tokens::Token;

/// Structured record of one executed swap, logged as JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct SwapReport {
    pub id: String,
    pub cycle: u32,
    pub mint: String,
    pub symbol: String,
    pub txid: String,
    pub explorer_url: String,
    pub input_address: String,
    pub output_address: String,
    pub input_amount: u64,
    pub output_amount: u64,
    pub input_amount_ui: f64,
    pub output_amount_ui: f64,
    pub timestamp: DateTime<Utc>,
}

impl SwapReport {
    pub fn new(cycle: u32, token: &Token, cluster: Cluster, result: &SwapResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            cycle,
            mint: token.address.clone(),
            symbol: token.symbol.clone(),
            txid: result.txid.clone(),
            explorer_url: cluster.explorer_tx_url(&result.txid),
            input_address: result.input_address.to_string(),
            output_address: result.output_address.to_string(),
            input_amount: result.input_amount,
            output_amount: result.output_amount,
            input_amount_ui: math::from_smallest_units(result.input_amount, token.decimals),
            output_amount_ui: math::from_smallest_units(result.output_amount, token.decimals),
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
