//! Domain events emitted by the authoritative ledger contract.
//!
//! This is an externally defined wire format — the event log is an ordered,
//! append-only stream made queryable by entity. The BalanceEngine is a pure,
//! replayable projection over it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, ChainId, ExpenseId, GroupId, IntentHash, ReceiptHash, TokenId, TxHash};

/// One event in the ledger's total order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEvent {
    /// A group was created with its full (immutable) member list.
    GroupCreated {
        group_id: GroupId,
        name: String,
        members: Vec<Address>,
        created_at: DateTime<Utc>,
    },

    /// A shared expense was logged by `payer` on behalf of the group.
    ExpenseAdded {
        group_id: GroupId,
        expense_id: ExpenseId,
        payer: Address,
        token: TokenId,
        /// Amount in the token's smallest unit; must be > 0.
        amount: u128,
        content_cid: String,
        memo: String,
        created_at: DateTime<Utc>,
    },

    /// An expense was voided. Does not retroactively adjust debt edges.
    ExpenseVoided { expense_id: ExpenseId },

    /// A settlement attempt was pre-committed before execution.
    SettlementIntentCreated {
        intent_hash: IntentHash,
        group_id: GroupId,
        debtor: Address,
        creditor: Address,
        route: String,
        created_at: DateTime<Utc>,
    },

    /// A cross-chain settlement completed; the edge decrement is keyed by
    /// `receipt_hash` and must never double-apply.
    SettlementFinalized {
        receipt_hash: ReceiptHash,
        group_id: GroupId,
        debtor: Address,
        creditor: Address,
        token: TokenId,
        amount: u128,
        dst_chain: ChainId,
        dst_tx_hash: TxHash,
        finalized_at: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// The group this event belongs to, if any.
    #[must_use]
    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            Self::GroupCreated { group_id, .. }
            | Self::ExpenseAdded { group_id, .. }
            | Self::SettlementIntentCreated { group_id, .. }
            | Self::SettlementFinalized { group_id, .. } => Some(*group_id),
            Self::ExpenseVoided { .. } => None,
        }
    }

    /// Short event name for log lines.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GroupCreated { .. } => "GROUP_CREATED",
            Self::ExpenseAdded { .. } => "EXPENSE_ADDED",
            Self::ExpenseVoided { .. } => "EXPENSE_VOIDED",
            Self::SettlementIntentCreated { .. } => "SETTLEMENT_INTENT_CREATED",
            Self::SettlementFinalized { .. } => "SETTLEMENT_FINALIZED",
        }
    }
}
