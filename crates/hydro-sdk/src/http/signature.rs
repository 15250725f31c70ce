/*
[INPUT]:  Message signer and the current time
[OUTPUT]: Hydro-Authentication header values for private endpoints
[POS]:    HTTP layer - credential construction for authenticated requests
[UPDATE]: When changing the auth message or header format
*/

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::auth::MessageSigner;
use crate::http::Result;

/// Header carrying the signed credential
pub const AUTH_HEADER: &str = "Hydro-Authentication";

/// Fixed prefix of the signed message
pub const AUTH_MESSAGE_PREFIX: &str = "HYDRO-AUTHENTICATION";

const HEADER_DELIMITER: &str = "#";

/// Builds the signed credential attached to private requests
#[derive(Clone)]
pub struct RequestSigner {
    signer: Arc<dyn MessageSigner>,
}

impl RequestSigner {
    /// Create a new request signer around the given capability
    pub fn new(signer: Arc<dyn MessageSigner>) -> Self {
        Self { signer }
    }

    /// Address of the signing account
    pub fn address(&self) -> &str {
        self.signer.address()
    }

    /// Sign an arbitrary message with the underlying capability
    pub async fn sign(&self, message: &str) -> Result<String> {
        self.signer.sign_message(message).await
    }

    /// Message signed for a request issued at `timestamp_ms`
    ///
    /// Format: "HYDRO-AUTHENTICATION@{unix millis}"
    pub fn auth_message(timestamp_ms: i64) -> String {
        format!("{AUTH_MESSAGE_PREFIX}@{timestamp_ms}")
    }

    /// Header value for a request issued at `timestamp_ms`
    ///
    /// Format: "{address}#{message}#{signature}"
    pub async fn header_value_at(&self, timestamp_ms: i64) -> Result<String> {
        let message = Self::auth_message(timestamp_ms);
        let signature = self.signer.sign_message(&message).await?;
        Ok([self.signer.address(), message.as_str(), signature.as_str()].join(HEADER_DELIMITER))
    }

    /// Header value for a request issued now
    ///
    /// Never cached: every call signs a new message. Two calls in the same
    /// millisecond can produce identical values.
    pub async fn header_value(&self) -> Result<String> {
        self.header_value_at(Utc::now().timestamp_millis()).await
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CustomSigner, MockWalletSigner};

    #[test]
    fn test_auth_message_format() {
        assert_eq!(
            RequestSigner::auth_message(1_546_300_800_000),
            "HYDRO-AUTHENTICATION@1546300800000"
        );
    }

    #[tokio::test]
    async fn test_header_value_layout() {
        let signer = RequestSigner::new(Arc::new(MockWalletSigner::new("0xabc", "0xsig")));

        let header = signer.header_value_at(42).await.unwrap();
        assert_eq!(header, "0xabc#HYDRO-AUTHENTICATION@42#0xsig");
    }

    #[tokio::test]
    async fn test_header_signs_the_embedded_message() {
        let signer = RequestSigner::new(Arc::new(CustomSigner::new(
            "0xabc",
            |message: String| async move { Ok(format!("sig({message})")) },
        )));

        let header = signer.header_value().await.unwrap();
        let parts: Vec<&str> = header.split('#').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "0xabc");
        assert!(parts[1].starts_with("HYDRO-AUTHENTICATION@"));
        assert!(parts[1]["HYDRO-AUTHENTICATION@".len()..].parse::<i64>().is_ok());
        assert_eq!(parts[2], format!("sig({})", parts[1]));
    }

    #[tokio::test]
    async fn test_same_millisecond_headers_are_identical() {
        let signer = RequestSigner::new(Arc::new(MockWalletSigner::new("0xabc", "0xsig")));

        let first = signer.header_value_at(7).await.unwrap();
        let second = signer.header_value_at(7).await.unwrap();
        assert_eq!(first, second);
    }
}
