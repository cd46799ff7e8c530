//! Error types for the ledger.
//!
//! Missing or partial upstream data is never an error here; it resolves to an
//! open/unresolved state instead. These variants cover misuse of the record
//! API and records that break a structural invariant.

use thiserror::Error;

use crate::lifecycle::{LifecycleEvent, TradeTier};

/// Errors raised by the ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The event is not a legal follow-up for the current tier.
    #[error("invalid lifecycle transition: {event:?} from {from}")]
    InvalidTransition {
        /// Tier the record was in.
        from: TradeTier,
        /// Event that was rejected.
        event: LifecycleEvent,
    },

    /// The record already carries ledger-reconciled P&L and is frozen.
    #[error("trade {trade_id} is reconciled and can no longer change")]
    TerminalRecord {
        /// Id of the frozen trade.
        trade_id: String,
    },

    /// More contracts reported filled than were intended.
    #[error("trade {trade_id}: filled {filled} exceeds intended {intended}")]
    OverFilled {
        /// Id of the offending trade.
        trade_id: String,
        /// Contracts reported filled.
        filled: u32,
        /// Contracts intended.
        intended: u32,
    },

    /// A negative fee was recorded on a leg.
    #[error("trade {trade_id}: negative fee on {venue} leg")]
    NegativeFee {
        /// Id of the offending trade.
        trade_id: String,
        /// Leg venue.
        venue: xvenue_core::Venue,
    },

    /// A tier label that is not part of the closed tier set.
    #[error("unknown trade tier: {0}")]
    UnknownTier(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, LedgerError>;
