// src/wallet.rs
use solana_sdk::signature::Keypair;

use crate::errors::WalletError;

/// Environment variable holding the base58-encoded secret key
pub const SECRET_KEY_ENV: &str = "SECRET_KEY";

/// Decode a base58 secret key into a signing keypair.
/// Expects the 64-byte secret||public concatenation of an ed25519 keypair.
pub fn keypair_from_base58(encoded: &str) -> Result<Keypair, WalletError> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| WalletError::InvalidEncoding(e.to_string()))?;

    if bytes.len() != 64 {
        return Err(WalletError::InvalidLength(bytes.len()));
    }

    Keypair::from_bytes(&bytes).map_err(|e| WalletError::InvalidKeypair(e.to_string()))
}

/// Read the signing keypair from the SECRET_KEY environment variable
pub fn read_keypair_from_env() -> Result<Keypair, WalletError> {
    let encoded = std::env::var(SECRET_KEY_ENV).map_err(|_| WalletError::MissingSecretKey)?;
    keypair_from_base58(&encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Signer;

    #[test]
    fn test_keypair_round_trip() {
        let keypair = Keypair::new();
        let encoded = bs58::encode(keypair.to_bytes()).into_string();

        let decoded = keypair_from_base58(&encoded).unwrap();
        assert_eq!(decoded.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_keypair_round_trip_with_whitespace() {
        let keypair = Keypair::new();
        let encoded = format!("  {}\n", bs58::encode(keypair.to_bytes()).into_string());

        let decoded = keypair_from_base58(&encoded).unwrap();
        assert_eq!(decoded.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_rejects_wrong_length() {
        // 32-byte seed alone is not the 64-byte secret||public form
        let seed = [7u8; 32];
        let encoded = bs58::encode(seed).into_string();

        match keypair_from_base58(&encoded) {
            Err(WalletError::InvalidLength(32)) => {}
            other => panic!("expected InvalidLength(32), got {:?}", other.map(|k| k.pubkey())),
        }
    }

    #[test]
    fn test_rejects_bad_encoding() {
        // '0', 'O', 'I' and 'l' are outside the base58 alphabet
        let result = keypair_from_base58("0OIl");
        assert!(matches!(result, Err(WalletError::InvalidEncoding(_))));
    }
}
