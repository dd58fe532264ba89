//! # splitchain-types
//!
//! Shared types, errors, and configuration for the **SplitChain**
//! expense ledger and cross-chain settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`GroupId`], [`ExpenseId`], [`TokenId`], [`ChainId`], [`AttemptId`], [`QuoteId`]
//! - **Hashes**: [`ReceiptHash`], [`IntentHash`], [`OrderHash`], [`TxHash`], [`SecretHash`], [`HashLock`]
//! - **Event model**: [`LedgerEvent`] — the external event-log wire format
//! - **Ledger model**: [`Group`], [`Expense`], [`EdgeKey`], [`DebtEdge`], [`SettlementIntent`], [`Settlement`]
//! - **Venue model**: [`Quote`], [`Preset`], [`SwapOrder`], [`OrderUpdate`], [`OrderPhase`]
//! - **Configuration**: [`SwapConfig`], [`SwapRoute`], [`RouteBook`]
//! - **Errors**: [`SplitchainError`] with `SC_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod ledger;
pub mod venue;

// Re-export all primary types at crate root for ergonomic imports:
//   use splitchain_types::{LedgerEvent, DebtEdge, Quote, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use ledger::*;
pub use venue::*;

// Constants are accessed via `splitchain_types::constants::FOO`
// (not re-exported to avoid name collisions).
