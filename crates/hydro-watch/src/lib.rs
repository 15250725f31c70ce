/*
[INPUT]:  Public API exports for hydro-watch crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod listener;

// Re-export main types for convenience
pub use config::{SubscriptionConfig, WatchConfig};
pub use listener::{EventCounts, LogListener};
