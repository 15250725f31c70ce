/*
[INPUT]:  Signing capabilities supplied by the caller
[OUTPUT]: Message signatures used to authenticate private REST calls
[POS]:    Auth layer - signer abstraction and implementations
[UPDATE]: When adding new signer types or changing signature format
*/

pub mod evm_wallet;
pub mod wallet;

pub use evm_wallet::EvmWalletSigner;
pub use wallet::{CustomSigner, MessageSigner, MockWalletSigner};
