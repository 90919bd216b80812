use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Solana cluster the aggregator operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cluster {
    #[serde(rename = "mainnet-beta")]
    MainnetBeta,
    #[serde(rename = "devnet")]
    Devnet,
    #[serde(rename = "testnet")]
    Testnet,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
        }
    }

    /// Explorer link for a transaction on this cluster
    pub fn explorer_tx_url(&self, txid: &str) -> String {
        match self {
            Cluster::MainnetBeta => format!("https://explorer.solana.com/tx/{}", txid),
            _ => format!(
                "https://explorer.solana.com/tx/{}?cluster={}",
                txid,
                self.as_str()
            ),
        }
    }
}

impl FromStr for Cluster {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            _ => Err(anyhow::anyhow!("Unknown cluster: {}", s)),
        }
    }
}

/// Parameters of one quote request
#[derive(Debug, Clone)]
pub struct RouteParams {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    /// Input amount in smallest units
    pub amount: u64,
    pub slippage_bps: u32,
}

/// One venue hop inside a quoted route
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInfo {
    pub label: String,
    #[serde(default)]
    pub input_mint: Option<String>,
    #[serde(default)]
    pub output_mint: Option<String>,
}

/// One route candidate from the aggregator quote endpoint.
/// Amount fields arrive as JSON numbers or strings depending on API age,
/// so both are accepted. `raw` keeps the untouched payload because the
/// swap endpoint expects the quoted route verbatim.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(deserialize_with = "amount_from_json")]
    pub in_amount: u64,
    #[serde(deserialize_with = "amount_from_json")]
    pub out_amount: u64,
    #[serde(deserialize_with = "amount_from_json")]
    pub out_amount_with_slippage: u64,
    #[serde(default, deserialize_with = "pct_from_json")]
    pub price_impact_pct: f64,
    #[serde(default)]
    pub market_infos: Vec<MarketInfo>,
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl Route {
    /// Parse a route object while keeping the raw payload
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut route: Route = serde_json::from_value(value.clone())?;
        route.raw = value;
        Ok(route)
    }

    /// Venue labels joined for display, e.g. "Orca x Raydium"
    pub fn venues(&self) -> String {
        self.market_infos
            .iter()
            .map(|m| m.label.as_str())
            .collect::<Vec<_>>()
            .join(" x ")
    }

    /// Input mint of the first hop
    pub fn input_mint(&self) -> Option<Pubkey> {
        self.market_infos.first()?.input_mint.as_ref()?.parse().ok()
    }

    /// Output mint of the last hop
    pub fn output_mint(&self) -> Option<Pubkey> {
        self.market_infos.last()?.output_mint.as_ref()?.parse().ok()
    }
}

/// Outcome of an executed swap
#[derive(Debug, Clone)]
pub struct SwapResult {
    pub txid: String,
    pub input_address: Pubkey,
    pub output_address: Pubkey,
    /// Realized amounts in smallest units
    pub input_amount: u64,
    pub output_amount: u64,
}

fn amount_from_json<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse::<u64>().map_err(de::Error::custom),
    }
}

fn pct_from_json<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse::<f64>().map_err(de::Error::custom),
    }
}
