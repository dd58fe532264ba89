//! Ledger data model: groups, expenses, debt edges, and settlements.
//!
//! A [`DebtEdge`] is the directed, token-scoped net amount one user owes
//! another within a group. Edges are keyed by [`EdgeKey`] — exactly one
//! canonical edge exists per (group, debtor, creditor, token) tuple.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Address, ChainId, ExpenseId, GroupId, IntentHash, ReceiptHash, Result, SplitchainError,
    TokenId, TxHash,
};

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A group of participants sharing expenses.
///
/// Membership is immutable post-creation; member order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<Address>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_member(&self, addr: &Address) -> bool {
        self.members.contains(addr)
    }
}

// ---------------------------------------------------------------------------
// Expense
// ---------------------------------------------------------------------------

/// A logged shared expense. `voided` is the only post-creation mutation;
/// voiding does not reverse already-applied debt-edge deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub payer: Address,
    pub token: TokenId,
    /// Amount in the token's smallest unit.
    pub amount: u128,
    /// Receipt content reference (CID); storage itself is external.
    pub content_cid: String,
    pub memo: String,
    pub created_at: DateTime<Utc>,
    pub voided: bool,
}

// ---------------------------------------------------------------------------
// EdgeKey / DebtEdge
// ---------------------------------------------------------------------------

/// Canonical key of a debt edge. Direction matters: `debtor` owes `creditor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EdgeKey {
    pub group: GroupId,
    pub debtor: Address,
    pub creditor: Address,
    pub token: TokenId,
}

impl EdgeKey {
    /// Build an edge key, rejecting self-edges.
    ///
    /// # Errors
    /// Returns [`SplitchainError::SelfEdge`] if `debtor == creditor`.
    pub fn new(
        group: GroupId,
        debtor: Address,
        creditor: Address,
        token: TokenId,
    ) -> Result<Self> {
        if debtor == creditor {
            return Err(SplitchainError::SelfEdge { debtor });
        }
        Ok(Self {
            group,
            debtor,
            creditor,
            token,
        })
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}->{}/{}",
            self.group,
            self.debtor.short(),
            self.creditor.short(),
            self.token
        )
    }
}

/// Directed, token-scoped net debt between two group members.
///
/// The amount is monotonically adjusted by expense shares (increase) and
/// settlements (decrease). An edge with amount 0 is logically closed but
/// the record persists for history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DebtEdge {
    /// Accumulated amount owed, in the token's smallest unit. Never negative.
    pub amount: u128,
}

impl DebtEdge {
    /// Whether the edge still carries outstanding debt. Derived, never
    /// set independently.
    #[must_use]
    pub fn open(&self) -> bool {
        self.amount > 0
    }
}

// ---------------------------------------------------------------------------
// SettlementIntent / Settlement
// ---------------------------------------------------------------------------

/// Pre-execution commitment to settle a debt edge via a given route.
/// One intent maps to zero or one finalized [`Settlement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementIntent {
    pub intent_hash: IntentHash,
    pub group_id: GroupId,
    pub debtor: Address,
    pub creditor: Address,
    /// Describes the cross-chain path/venue (e.g. "base->arbitrum").
    pub route: String,
    pub created_at: DateTime<Utc>,
}

/// A finalized settlement, immutable once created. Its application to a
/// [`DebtEdge`] is a one-time, idempotent decrement keyed by receipt hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub receipt_hash: ReceiptHash,
    pub group_id: GroupId,
    pub debtor: Address,
    pub creditor: Address,
    pub token: TokenId,
    pub amount: u128,
    pub dst_chain: ChainId,
    pub dst_tx_hash: TxHash,
    pub finalized_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    #[test]
    fn edge_key_rejects_self_edge() {
        let err = EdgeKey::new(GroupId(1), addr(1), addr(1), TokenId::new("USDC")).unwrap_err();
        assert!(matches!(err, SplitchainError::SelfEdge { .. }));
    }

    #[test]
    fn edge_key_direction_matters() {
        let ab = EdgeKey::new(GroupId(1), addr(1), addr(2), TokenId::new("USDC")).unwrap();
        let ba = EdgeKey::new(GroupId(1), addr(2), addr(1), TokenId::new("USDC")).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn debt_edge_open_is_derived() {
        let mut edge = DebtEdge::default();
        assert!(!edge.open());
        edge.amount = 1;
        assert!(edge.open());
        edge.amount = 0;
        assert!(!edge.open());
    }

    #[test]
    fn group_membership() {
        let group = Group {
            id: GroupId(1),
            name: "trip".into(),
            members: vec![addr(1), addr(2), addr(3)],
            created_at: Utc::now(),
        };
        assert_eq!(group.member_count(), 3);
        assert!(group.is_member(&addr(2)));
        assert!(!group.is_member(&addr(9)));
    }

    #[test]
    fn edge_key_serde_roundtrip() {
        let key = EdgeKey::new(GroupId(5), addr(1), addr(2), TokenId::new("WETH")).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        let back: EdgeKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }
}
