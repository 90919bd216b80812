//! Error handling for the application

use thiserror::Error;

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("SECRET_KEY environment variable is not set")]
    MissingSecretKey,

    #[error("Secret key is not valid base58: {0}")]
    InvalidEncoding(String),

    #[error("Secret key must decode to 64 bytes, got {0}")]
    InvalidLength(usize),

    #[error("Secret key bytes are not a valid keypair: {0}")]
    InvalidKeypair(String),
}

/// Token list errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token list request failed: {0}")]
    FetchFailed(String),

    #[error("Token list request returned status: {0}")]
    BadStatus(u16),

    #[error("No token with mint {0} in the token list")]
    MintNotFound(String),
}

/// Aggregator-related errors
#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Quote request failed: {0}")]
    QuoteFailed(String),

    #[error("Aggregator API error: {0}")]
    ApiError(String),

    #[error("Malformed route in quote response: {0}")]
    MalformedRoute(String),

    #[error("Swap endpoint returned no transaction")]
    MissingTransaction,

    #[error("Transaction decode failed: {0}")]
    DecodeFailed(String),

    #[error("Transaction signing failed: {0}")]
    SigningFailed(String),

    #[error("RPC request failed: {0}")]
    RpcFailed(String),

    #[error("Swap execution failed: {0}")]
    SwapFailed(String),
}
