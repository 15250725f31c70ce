/*
[INPUT]:  Message to sign and a caller-provided signing capability
[OUTPUT]: Signature string for authentication
[POS]:    Auth layer - signer abstraction
[UPDATE]: When adding new signer types or changing signature format
*/

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::http::Result;

/// Capability that signs text messages on behalf of an account
///
/// The trait is async to support hardware wallets and remote signers.
/// Implementations are shared across concurrent requests, so `sign_message`
/// must be safe to call re-entrantly.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Address of the account that owns the signing key
    fn address(&self) -> &str;

    /// Sign a message and return the signature
    async fn sign_message(&self, message: &str) -> Result<String>;
}

type SignFn = dyn Fn(String) -> BoxFuture<'static, Result<String>> + Send + Sync;

/// Signer backed by a caller-supplied async function
///
/// Use this to plug in a wallet or external service without handing the
/// client any key material.
#[derive(Clone)]
pub struct CustomSigner {
    address: String,
    sign: Arc<SignFn>,
}

impl CustomSigner {
    pub fn new<F, Fut>(address: impl Into<String>, sign: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Self {
            address: address.into(),
            sign: Arc::new(move |message| -> BoxFuture<'static, Result<String>> {
                Box::pin(sign(message))
            }),
        }
    }
}

impl fmt::Debug for CustomSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageSigner for CustomSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        (self.sign)(message.to_string()).await
    }
}

/// Mock signer for testing
#[derive(Debug, Clone)]
pub struct MockWalletSigner {
    address: String,
    signature: String,
}

impl MockWalletSigner {
    /// Create a new mock signer with predetermined signature
    pub fn new(address: &str, signature: &str) -> Self {
        Self {
            address: address.to_string(),
            signature: signature.to_string(),
        }
    }
}

#[async_trait]
impl MessageSigner for MockWalletSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, _message: &str) -> Result<String> {
        Ok(self.signature.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HydroError;

    #[tokio::test]
    async fn test_mock_signer() {
        let signer = MockWalletSigner::new("0x1234567890abcdef", "0xmock_signature");

        assert_eq!(signer.address(), "0x1234567890abcdef");

        let signature = signer.sign_message("test message").await.unwrap();
        assert_eq!(signature, "0xmock_signature");
    }

    #[tokio::test]
    async fn test_custom_signer_receives_message() {
        let signer = CustomSigner::new("0xabc", |message: String| async move {
            Ok(format!("signed:{message}"))
        });

        assert_eq!(signer.address(), "0xabc");
        let signature = signer.sign_message("HYDRO-AUTHENTICATION@1").await.unwrap();
        assert_eq!(signature, "signed:HYDRO-AUTHENTICATION@1");
    }

    #[tokio::test]
    async fn test_custom_signer_propagates_failure() {
        let signer = CustomSigner::new("0xabc", |_message: String| async move {
            Err(HydroError::auth("hardware wallet locked"))
        });

        let err = signer.sign_message("hello").await.unwrap_err();
        assert!(err.is_auth_error());
    }
}
