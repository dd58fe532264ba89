//! # splitchain-coordinator
//!
//! **Coordination plane**: picks a debt edge, confirms the outstanding
//! amount against the event log, drives one settlement attempt, and — only
//! on `Completed` — records `SettlementFinalized` back to the log.
//!
//! Guarantees:
//!
//! - At most one active attempt per debt edge (a second concurrent attempt
//!   is rejected, never queued silently)
//! - The settled amount is snapshotted at initiation, not re-read mid-flight
//! - The ledger is mutated exactly once, on success only; every other
//!   terminal state is reported upward with the ledger untouched

pub mod coordinator;
pub mod event_log;

pub use coordinator::{SettlementCoordinator, SettlementReport};
pub use event_log::{EventLog, MemoryEventLog};
