/*
[INPUT]:  EVM private key (hex string)
[OUTPUT]: Personal-message signatures and checksummed wallet address
[POS]:    Auth layer - local private key signer
[UPDATE]: When signing logic or EVM address formatting changes
*/

use std::fmt;
use std::str::FromStr;

use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use crate::auth::MessageSigner;
use crate::http::{HydroError, Result};

/// Signer holding a local secp256k1 key
///
/// Messages are signed as EIP-191 personal messages, the scheme the
/// exchange verifies for `Hydro-Authentication` and order signatures.
/// A `0x`-prefixed hex message (such as an order id) is signed as the bytes
/// it encodes; any other message is signed as its UTF-8 text.
pub struct EvmWalletSigner {
    signer: PrivateKeySigner,
    address: String,
}

impl EvmWalletSigner {
    /// Create a new EVM wallet signer from a hex-encoded private key
    ///
    /// Supports both "0x"-prefixed and non-prefixed hex strings.
    pub fn new(private_key_hex: &str) -> Result<Self> {
        let private_key_hex = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);
        let signer = PrivateKeySigner::from_str(private_key_hex)
            .map_err(|e| HydroError::Config(format!("Invalid EVM private key: {}", e)))?;

        let address = signer.address().to_checksum(None);

        Ok(Self { signer, address })
    }
}

impl fmt::Debug for EvmWalletSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmWalletSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageSigner for EvmWalletSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        let signature = self
            .signer
            .sign_message(&message_bytes(message))
            .await
            .map_err(|e| HydroError::auth(format!("Failed to sign message: {}", e)))?;

        // [r, s, v] with v in {27, 28}
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}

/// Payload bytes for `message`, hex-decoding `0x` strings
fn message_bytes(message: &str) -> Vec<u8> {
    message
        .strip_prefix("0x")
        .filter(|digits| digits.len() % 2 == 0)
        .and_then(|digits| hex::decode(digits).ok())
        .unwrap_or_else(|| message.as_bytes().to_vec())
}
