// src/tokens.rs
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::TokenError;

/// One entry of the aggregator token list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(rename = "logoURI")]
    pub logo_uri: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// In-memory token list with mint lookup
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
}

impl TokenRegistry {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// First entry whose address equals the given mint
    pub fn find_by_mint(&self, mint: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.address == mint)
    }

    /// Like `find_by_mint`, but a missing mint is an error so startup fails fast
    pub fn require_by_mint(&self, mint: &str) -> Result<&Token, TokenError> {
        self.find_by_mint(mint)
            .ok_or_else(|| TokenError::MintNotFound(mint.to_string()))
    }
}

/// Fetch the token metadata list from the aggregator cache
pub async fn fetch_token_list(http: &Client, url: &str) -> Result<TokenRegistry, TokenError> {
    info!("Fetching token list from {}", url);

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| TokenError::FetchFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(TokenError::BadStatus(response.status().as_u16()));
    }

    let tokens: Vec<Token> = response
        .json()
        .await
        .map_err(|e| TokenError::FetchFailed(e.to_string()))?;

    let registry = TokenRegistry::new(tokens);
    if registry.is_empty() {
        warn!("Token list at {} is empty", url);
    }
    info!("Token list loaded: {} entries", registry.len());
    Ok(registry)
}
