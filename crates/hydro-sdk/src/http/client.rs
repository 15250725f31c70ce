/*
[INPUT]:  HTTP configuration (base URL, timeouts) and optional message signer
[OUTPUT]: Classified REST responses (payload, Server Error, API Error, Auth Error)
[POS]:    HTTP layer - core transport implementation
[UPDATE]: When adding connection options or changing response handling
*/

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::auth::{CustomSigner, EvmWalletSigner, MessageSigner};
use crate::http::signature::{AUTH_HEADER, RequestSigner};
use crate::http::{HydroError, Result};
use crate::types::Envelope;

/// Base URL for the Hydro REST API
pub const API_BASE_URL: &str = "https://api.ddex.io/v3/";

const NO_AUTH_MESSAGE: &str = "Cannot authenticate without a private key!";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Whether a request carries the signed credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Private,
}

/// Main HTTP client for the Hydro API
pub struct HydroClient {
    http_client: Client,
    base_url: Url,
    signer: Option<RequestSigner>,
    pub(crate) token_addresses: RwLock<HashMap<String, String>>,
}

impl HydroClient {
    /// Client for public calls only; private calls fail with an auth error
    pub fn without_auth() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Client for public calls only, with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Client signing with a local private key ("0x..." hex)
    pub fn with_private_key(private_key_hex: &str, config: ClientConfig) -> Result<Self> {
        let signer = EvmWalletSigner::new(private_key_hex)?;
        Self::with_signer(Arc::new(signer), config)
    }

    /// Client signing through a caller-supplied function, e.g. a hardware wallet
    pub fn with_custom_auth<F, Fut>(
        address: impl Into<String>,
        sign: F,
        config: ClientConfig,
    ) -> Result<Self>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Self::with_signer(Arc::new(CustomSigner::new(address, sign)), config)
    }

    /// Client signing with any `MessageSigner`
    pub fn with_signer(signer: Arc<dyn MessageSigner>, config: ClientConfig) -> Result<Self> {
        Self::build(config, Some(RequestSigner::new(signer)))
    }

    fn build(config: ClientConfig, signer: Option<RequestSigner>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| HydroError::Config(format!("failed to build HTTP client: {}", e)))?;

        let mut api_url = config.api_url;
        if !api_url.ends_with('/') {
            api_url.push('/');
        }

        Ok(Self {
            http_client,
            base_url: Url::parse(&api_url)?,
            signer,
            token_addresses: RwLock::new(HashMap::new()),
        })
    }

    /// Address of the signing account, if the client has one
    pub fn address(&self) -> Option<&str> {
        self.signer.as_ref().map(RequestSigner::address)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sign a message with the client's signer
    pub async fn sign(&self, message: &str) -> Result<String> {
        self.request_signer()?.sign(message).await
    }

    fn request_signer(&self) -> Result<&RequestSigner> {
        self.signer
            .as_ref()
            .ok_or_else(|| HydroError::auth(NO_AUTH_MESSAGE))
    }

    /// Build full URL for an endpoint relative to the base URL
    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// GET an endpoint, signing it when `access` is private
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        access: Access,
    ) -> Result<T> {
        self.send(Method::GET, endpoint, query, None::<&()>, access)
            .await
    }

    /// POST a JSON body to a private endpoint
    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, endpoint, &[], Some(body), Access::Private)
            .await
    }

    /// DELETE a private endpoint
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.send(Method::DELETE, endpoint, &[], None::<&()>, Access::Private)
            .await
    }

    async fn send<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        access: Access,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        // resolved before any I/O so unsigned clients never reach the network
        let auth_header = match access {
            Access::Public => None,
            Access::Private => Some(self.request_signer()?.header_value().await?),
        };

        let url = self.url(endpoint)?;
        debug!(
            method = %method,
            url = %url,
            private = auth_header.is_some(),
            "hydro request"
        );

        let mut builder = self.http_client.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let Some(header) = auth_header {
            builder = builder.header(AUTH_HEADER, header);
        }

        let response = builder.send().await.map_err(|err| {
            warn!(endpoint, error = %err, "hydro request failed");
            HydroError::from(err)
        })?;

        Self::handle_response(endpoint, response).await
    }

    async fn handle_response<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "hydro server error");
            return Err(HydroError::server_status(status));
        }

        let body = response.bytes().await?;
        let envelope: Envelope = serde_json::from_slice(&body)?;
        if !envelope.is_success() {
            let desc = envelope.desc.unwrap_or_default();
            warn!(endpoint, status = envelope.status, desc = %desc, "hydro api error");
            return Err(HydroError::api(desc));
        }

        Ok(serde_json::from_value(envelope.data)?)
    }
}

impl fmt::Debug for HydroClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HydroClient")
            .field("base_url", &self.base_url.as_str())
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
