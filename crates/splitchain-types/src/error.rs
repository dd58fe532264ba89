//! Error types for the SplitChain ledger and settlement engine.
//!
//! All errors use the `SC_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Event errors
//! - 2xx: Debt-edge errors
//! - 3xx: Secret-vault errors
//! - 4xx: Venue errors
//! - 5xx: Settlement-attempt errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Address, EdgeKey, ExpenseId, GroupId};

/// Central error enum for all SplitChain operations.
#[derive(Debug, Error)]
pub enum SplitchainError {
    // =================================================================
    // Event Errors (1xx)
    // =================================================================
    /// The event is malformed or inconsistent with prior history.
    /// Skipped by the replay loop, never fatal to event processing.
    #[error("SC_ERR_100: Invalid event: {reason}")]
    InvalidEvent { reason: String },

    /// The event references a group that was never created.
    #[error("SC_ERR_101: Unknown group: {0}")]
    UnknownGroup(GroupId),

    /// A `GroupCreated` event reused an existing group ID.
    #[error("SC_ERR_102: Duplicate group: {0}")]
    DuplicateGroup(GroupId),

    /// The event references an expense that was never logged.
    #[error("SC_ERR_103: Unknown expense: {0}")]
    UnknownExpense(ExpenseId),

    // =================================================================
    // Debt-Edge Errors (2xx)
    // =================================================================
    /// A settlement references a debt edge that does not exist.
    #[error("SC_ERR_200: Unknown edge: {0}")]
    UnknownEdge(EdgeKey),

    /// A debt edge can never point from a user to themselves.
    #[error("SC_ERR_201: Self edge rejected for {debtor}")]
    SelfEdge { debtor: Address },

    /// There is no outstanding amount on the edge to settle.
    #[error("SC_ERR_202: Nothing to settle on edge: {0}")]
    NothingToSettle(EdgeKey),

    // =================================================================
    // Secret-Vault Errors (3xx)
    // =================================================================
    /// No secret exists for the requested fill index, or the vault was
    /// already swept at the end of the attempt.
    #[error("SC_ERR_300: Secret not found for fill index {index}")]
    SecretNotFound { index: u64 },

    /// A commitment was requested over an empty secret set.
    #[error("SC_ERR_301: Cannot commit to an empty secret set")]
    EmptyVault,

    // =================================================================
    // Venue Errors (4xx)
    // =================================================================
    /// The venue failed to produce a quote for the requested route.
    #[error("SC_ERR_400: Quote failed: {reason}")]
    QuoteFailed { reason: String },

    /// The venue rejected the submitted order.
    #[error("SC_ERR_401: Order rejected: {reason}")]
    OrderRejected { reason: String },

    /// Network-level failure talking to the venue (retried with bounded
    /// backoff at the call site; fatal to the attempt once exhausted).
    #[error("SC_ERR_402: Venue unavailable: {reason}")]
    VenueUnavailable { reason: String },

    /// The venue response did not match the expected typed shape.
    #[error("SC_ERR_403: Invalid venue response: {reason}")]
    InvalidVenueResponse { reason: String },

    // =================================================================
    // Settlement-Attempt Errors (5xx)
    // =================================================================
    /// A settlement attempt is already running for this edge; a second
    /// concurrent attempt would double-spend the same debt.
    #[error("SC_ERR_500: Attempt already in progress for edge: {0}")]
    AttemptInProgress(EdgeKey),

    /// The attempt reached a terminal state other than `Completed`.
    #[error("SC_ERR_501: Attempt failed: {reason}")]
    AttemptFailed { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SC_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SC_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SplitchainError>;
