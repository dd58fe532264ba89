//! # splitchain-ledger
//!
//! **Accounting plane**: the deterministic projection from the ledger's
//! event stream to the current debt-edge set.
//!
//! The [`BalanceEngine`] consumes [`splitchain_types::LedgerEvent`]s in the
//! chain/indexer's total order and maintains exactly one canonical
//! [`splitchain_types::DebtEdge`] per (group, debtor, creditor, token). It has:
//!
//! - **Deterministic replay**: same event history -> same edge set, always
//! - **Idempotent settlement**: edge decrements keyed by receipt hash
//! - **Degraded-input tolerance**: malformed events are logged and skipped,
//!   never fatal to processing
//! - **Clamped settlement**: over-settlement clamps at zero and is recorded
//!   as a recoverable inconsistency, never a negative amount

pub mod edge_root;
pub mod engine;
pub mod receipt_guard;

pub use edge_root::{compute_edge_root, verify_edge_root};
pub use engine::{BalanceEngine, OverSettlement};
pub use receipt_guard::ReceiptGuard;
