//! Jupiter aggregator client: quote, swap, sign, submit, settle

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::VersionedTransaction;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{UiTransactionEncoding, UiTransactionTokenBalance};
use tracing::{debug, info, warn};

use super::{Aggregator, Cluster, Route, RouteParams, SwapResult};
use crate::errors::AggregatorError;

/// SPL Token program ID
const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Associated Token Account program ID
const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Quote endpoint response
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
    error: Option<String>,
    message: Option<String>,
}

/// Swap endpoint response. Setup and cleanup legs are optional and
/// precede/follow the swap itself when present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    setup_transaction: Option<String>,
    swap_transaction: Option<String>,
    cleanup_transaction: Option<String>,
    error: Option<String>,
}

/// HTTP client for the Jupiter quote/swap API, bound to one RPC
/// connection, one cluster and one signing keypair
pub struct JupiterClient {
    http: Client,
    base_url: String,
    cluster: Cluster,
    rpc: Arc<RpcClient>,
    user: Arc<Keypair>,
}

impl JupiterClient {
    pub fn new(
        rpc: Arc<RpcClient>,
        user: Arc<Keypair>,
        cluster: Cluster,
        base_url: &str,
    ) -> Result<Self, AggregatorError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AggregatorError::QuoteFailed(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cluster,
            rpc,
            user,
        })
    }

    /// Decode a base64 transaction payload, sign it with the user keypair
    /// and submit it, waiting for confirmation
    async fn sign_and_send(&self, encoded: &str) -> Result<Signature, AggregatorError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| AggregatorError::DecodeFailed(e.to_string()))?;

        let unsigned: VersionedTransaction = bincode::deserialize(&bytes)
            .map_err(|e| AggregatorError::DecodeFailed(e.to_string()))?;

        let signed = VersionedTransaction::try_new(unsigned.message, &[self.user.as_ref()])
            .map_err(|e| AggregatorError::SigningFailed(e.to_string()))?;

        let signature = self
            .rpc
            .send_and_confirm_transaction(&signed)
            .await
            .map_err(|e| AggregatorError::RpcFailed(e.to_string()))?;

        Ok(signature)
    }

    /// Realized input/output amounts of the confirmed swap, taken from its
    /// pre/post token balances. Falls back to the quoted amounts when the
    /// node does not return usable metadata.
    async fn realized_amounts(
        &self,
        signature: &Signature,
        route: &Route,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
    ) -> Result<(u64, u64), AggregatorError> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        let tx = match self.rpc.get_transaction_with_config(signature, config).await {
            Ok(tx) => tx,
            Err(e) => {
                warn!("Could not fetch transaction {}: {}", signature, e);
                return Ok((route.in_amount, route.out_amount));
            }
        };

        let meta = match tx.transaction.meta {
            Some(meta) => meta,
            None => return Ok((route.in_amount, route.out_amount)),
        };

        if let Some(err) = meta.err {
            return Err(AggregatorError::SwapFailed(format!(
                "transaction {} failed on-chain: {:?}",
                signature, err
            )));
        }

        let owner = self.user.pubkey().to_string();
        let amounts = match (&meta.pre_token_balances, &meta.post_token_balances) {
            (OptionSerializer::Some(pre), OptionSerializer::Some(post)) => realized_from_balances(
                pre,
                post,
                &owner,
                &input_mint.to_string(),
                &output_mint.to_string(),
                route.in_amount,
                route.out_amount,
            ),
            _ => (route.in_amount, route.out_amount),
        };

        Ok(amounts)
    }
}

#[async_trait]
impl Aggregator for JupiterClient {
    async fn compute_routes(&self, params: &RouteParams) -> Result<Vec<Route>, AggregatorError> {
        let url = format!("{}/quote", self.base_url);
        // the quote endpoint takes slippage as a percentage
        let slippage_pct = params.slippage_bps as f64 / 100.0;

        debug!(
            "Requesting quote: {} {} -> {} (slippage {}%)",
            params.amount, params.input_mint, params.output_mint, slippage_pct
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("inputMint", params.input_mint.to_string()),
                ("outputMint", params.output_mint.to_string()),
                ("amount", params.amount.to_string()),
                ("slippage", slippage_pct.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AggregatorError::QuoteFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AggregatorError::QuoteFailed(format!(
                "quote request returned status: {}",
                response.status()
            )));
        }

        let quote: QuoteResponse = response
            .json()
            .await
            .map_err(|e| AggregatorError::QuoteFailed(e.to_string()))?;

        if let Some(error) = quote.error.or(quote.message) {
            return Err(AggregatorError::ApiError(error));
        }

        quote
            .data
            .into_iter()
            .map(|v| Route::from_value(v).map_err(|e| AggregatorError::MalformedRoute(e.to_string())))
            .collect()
    }

    async fn execute_swap(&self, route: &Route) -> Result<SwapResult, AggregatorError> {
        let input_mint = route
            .input_mint()
            .ok_or_else(|| AggregatorError::MalformedRoute("route has no input mint".to_string()))?;
        let output_mint = route
            .output_mint()
            .ok_or_else(|| AggregatorError::MalformedRoute("route has no output mint".to_string()))?;

        let user_pubkey = self.user.pubkey();
        let body = serde_json::json!({
            "route": route.raw,
            "userPublicKey": user_pubkey.to_string(),
            "wrapUnwrapSOL": true,
        });

        debug!("Requesting swap transaction for route via {}", route.venues());

        let response = self
            .http
            .post(format!("{}/swap", self.base_url))
            .json(&body)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| AggregatorError::SwapFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AggregatorError::SwapFailed(format!(
                "swap request returned status: {}",
                response.status()
            )));
        }

        let swap: SwapResponse = response
            .json()
            .await
            .map_err(|e| AggregatorError::SwapFailed(e.to_string()))?;

        if let Some(error) = swap.error {
            return Err(AggregatorError::ApiError(error));
        }

        let swap_tx = swap
            .swap_transaction
            .ok_or(AggregatorError::MissingTransaction)?;

        if let Some(encoded) = swap.setup_transaction {
            let signature = self.sign_and_send(&encoded).await?;
            info!("Setup transaction confirmed: {}", signature);
        }

        let signature = self.sign_and_send(&swap_tx).await?;
        info!(
            "🚀 Swap transaction confirmed: {}",
            self.cluster.explorer_tx_url(&signature.to_string())
        );

        if let Some(encoded) = swap.cleanup_transaction {
            let cleanup_sig = self.sign_and_send(&encoded).await?;
            info!("Cleanup transaction confirmed: {}", cleanup_sig);
        }

        let (input_amount, output_amount) = self
            .realized_amounts(&signature, route, &input_mint, &output_mint)
            .await?;

        Ok(SwapResult {
            txid: signature.to_string(),
            input_address: derive_token_account(&user_pubkey, &input_mint)?,
            output_address: derive_token_account(&user_pubkey, &output_mint)?,
            input_amount,
            output_amount,
        })
    }
}

/// Associated token account of `owner` for `mint`
fn derive_token_account(owner: &Pubkey, mint: &Pubkey) -> Result<Pubkey, AggregatorError> {
    let token_program = Pubkey::from_str(TOKEN_PROGRAM_ID)
        .map_err(|e| AggregatorError::SwapFailed(format!("invalid token program ID: {}", e)))?;
    let ata_program = Pubkey::from_str(ASSOCIATED_TOKEN_PROGRAM_ID)
        .map_err(|e| AggregatorError::SwapFailed(format!("invalid ATA program ID: {}", e)))?;

    let seeds = &[owner.as_ref(), token_program.as_ref(), mint.as_ref()];
    let (address, _bump) = Pubkey::find_program_address(seeds, &ata_program);

    Ok(address)
}

/// Net balance change of `owner`'s accounts holding `mint`, in smallest units
fn owner_mint_delta(
    pre: &[UiTransactionTokenBalance],
    post: &[UiTransactionTokenBalance],
    owner: &str,
    mint: &str,
) -> i128 {
    let sum = |balances: &[UiTransactionTokenBalance]| -> i128 {
        balances
            .iter()
            .filter(|b| {
                b.mint == mint
                    && matches!(&b.owner, OptionSerializer::Some(o) if o.as_str() == owner)
            })
            .filter_map(|b| b.ui_token_amount.amount.parse::<i128>().ok())
            .sum()
    };
    sum(post) - sum(pre)
}

/// Derive realized (input, output) amounts from token balance changes.
/// For a round trip on a single mint the two legs collapse into one net
/// change, so the realized output is the quoted input plus that change.
fn realized_from_balances(
    pre: &[UiTransactionTokenBalance],
    post: &[UiTransactionTokenBalance],
    owner: &str,
    input_mint: &str,
    output_mint: &str,
    quoted_in: u64,
    quoted_out: u64,
) -> (u64, u64) {
    if input_mint == output_mint {
        let net = owner_mint_delta(pre, post, owner, input_mint);
        let output = (quoted_in as i128 + net).max(0) as u64;
        return (quoted_in, output);
    }

    let spent = -owner_mint_delta(pre, post, owner, input_mint);
    let received = owner_mint_delta(pre, post, owner, output_mint);
    if spent <= 0 && received <= 0 {
        // owner accounts absent from the balance lists
        return (quoted_in, quoted_out);
    }
    (spent.max(0) as u64, received.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_account_decoder::parse_token::UiTokenAmount;

    const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
    const OWNER: &str = "7xLk17EQQ5KLDLDe44wCmupJKJjTGd8hs3eSVVhCx932";

    fn balance(mint: &str, owner: &str, amount: &str) -> UiTransactionTokenBalance {
        UiTransactionTokenBalance {
            account_index: 1,
            mint: mint.to_string(),
            ui_token_amount: UiTokenAmount {
                ui_amount: None,
                decimals: 6,
                amount: amount.to_string(),
                ui_amount_string: String::new(),
            },
            owner: OptionSerializer::Some(owner.to_string()),
            program_id: OptionSerializer::Skip,
        }
    }

    #[test]
    fn test_quote_response_parsing_keeps_route_order() {
        let json = r#"{
            "data": [
                {"inAmount": "1000000", "outAmount": "1010000", "outAmountWithSlippage": "1000001"},
                {"inAmount": "1000000", "outAmount": "1005000", "outAmountWithSlippage": "995000"}
            ],
            "timeTaken": 0.05
        }"#;

        let quote: QuoteResponse = serde_json::from_str(json).unwrap();
        assert!(quote.error.is_none());

        let routes: Vec<Route> = quote
            .data
            .into_iter()
            .map(|v| Route::from_value(v).unwrap())
            .collect();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].out_amount_with_slippage, 1_000_001);
        assert_eq!(routes[1].out_amount_with_slippage, 995_000);
    }

    #[test]
    fn test_quote_response_without_data_is_empty() {
        let quote: QuoteResponse = serde_json::from_str(r#"{"timeTaken": 0.01}"#).unwrap();
        assert!(quote.data.is_empty());
    }

    #[test]
    fn test_quote_response_error_field() {
        let quote: QuoteResponse =
            serde_json::from_str(r#"{"error": "No routes found"}"#).unwrap();
        assert_eq!(quote.error.as_deref(), Some("No routes found"));
    }

    #[test]
    fn test_swap_response_parsing() {
        let json = r#"{
            "setupTransaction": "c2V0dXA=",
            "swapTransaction": "c3dhcA==",
            "cleanupTransaction": "Y2xlYW51cA=="
        }"#;
        let swap: SwapResponse = serde_json::from_str(json).unwrap();
        assert!(swap.setup_transaction.is_some());
        assert_eq!(swap.swap_transaction.as_deref(), Some("c3dhcA=="));
        assert!(swap.cleanup_transaction.is_some());

        let bare: SwapResponse =
            serde_json::from_str(r#"{"swapTransaction": "c3dhcA=="}"#).unwrap();
        assert!(bare.setup_transaction.is_none());
        assert!(bare.cleanup_transaction.is_none());
    }

    #[test]
    fn test_derive_token_account_is_deterministic() {
        let owner: Pubkey = OWNER.parse().unwrap();
        let usdc: Pubkey = USDC_MINT.parse().unwrap();
        let sol: Pubkey = SOL_MINT.parse().unwrap();

        let a = derive_token_account(&owner, &usdc).unwrap();
        let b = derive_token_account(&owner, &usdc).unwrap();
        assert_eq!(a, b);

        let c = derive_token_account(&owner, &sol).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_realized_amounts_for_distinct_mints() {
        let pre = vec![
            balance(USDC_MINT, OWNER, "5000000"),
            balance(SOL_MINT, OWNER, "0"),
        ];
        let post = vec![
            balance(USDC_MINT, OWNER, "4000000"),
            balance(SOL_MINT, OWNER, "990000"),
        ];

        let (input, output) =
            realized_from_balances(&pre, &post, OWNER, USDC_MINT, SOL_MINT, 1_000_000, 985_000);
        assert_eq!(input, 1_000_000);
        assert_eq!(output, 990_000);
    }

    #[test]
    fn test_realized_amounts_for_round_trip_mint() {
        let pre = vec![balance(USDC_MINT, OWNER, "5000000000")];
        let post = vec![balance(USDC_MINT, OWNER, "5000400000")];

        let (input, output) = realized_from_balances(
            &pre,
            &post,
            OWNER,
            USDC_MINT,
            USDC_MINT,
            1_000_000_000,
            1_000_500_000,
        );
        assert_eq!(input, 1_000_000_000);
        assert_eq!(output, 1_000_400_000);
    }

    #[test]
    fn test_realized_amounts_ignore_other_owners() {
        let pre = vec![balance(USDC_MINT, "somebody-else", "1000")];
        let post = vec![balance(USDC_MINT, "somebody-else", "2000")];

        let (input, output) =
            realized_from_balances(&pre, &post, OWNER, USDC_MINT, SOL_MINT, 500, 400);
        assert_eq!((input, output), (500, 400));
    }
}
