/*
[INPUT]:  HTTP client configuration, signer and API endpoints
[OUTPUT]: Classified REST responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod public;
pub mod signature;
pub mod trade;
pub mod user;

pub use error::{HydroError, Result};
pub use signature::{AUTH_HEADER, RequestSigner};

pub use client::{API_BASE_URL, Access, ClientConfig, HydroClient};
