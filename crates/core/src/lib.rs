//! Shared building blocks for the cross-venue arbitrage ledger.
//!
//! Holds the venue identifiers every other crate keys on and the layered
//! [`LedgerConfig`] that the sizing and reconciliation code is built from.

pub mod config;
pub mod config_loader;
pub mod venue;

pub use config::{FeeConfig, FeeRule, LedgerConfig, ReconciliationConfig, SizingConfig};
pub use config_loader::ConfigLoader;
pub use venue::Venue;
