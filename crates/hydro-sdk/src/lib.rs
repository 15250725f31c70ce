/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Hydro exchange client crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod types;
pub mod ws;

// Re-export commonly used types from auth
pub use auth::{CustomSigner, EvmWalletSigner, MessageSigner, MockWalletSigner};

// Re-export commonly used types from http
pub use http::{Access, ClientConfig, HydroClient, HydroError, RequestSigner, Result};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    ChannelListener,
    ConnectionState,
    HydroListener,
    HydroWatcher,
    WatcherConfig,
    WatcherEvent,
};
